use criterion::{black_box, criterion_group, criterion_main, Criterion};

use carepath::{CaseRecord, Interpreter, RuleSet};

/// Build a rule set that chains `n` decision nodes into a final action,
/// plus a case that routes straight through the chain.
fn build_chain(n: usize) -> (RuleSet, CaseRecord) {
    let mut nodes = String::new();
    for i in 0..n {
        nodes.push_str(&format!(
            r#"{{"id": "d{i}", "type": "decision",
                "when": "qc.fundus_pass == true and macula.edema_prob >= 0.5",
                "goto_true": "d{}", "goto_false": "d{}"}},"#,
            i + 1,
            i + 1
        ));
    }
    nodes.push_str(&format!(
        r#"{{"id": "d{n}", "type": "action",
            "actions": [{{"type": "set_followup", "interval": "12m"}}]}}"#
    ));
    let doc = format!(
        r#"{{"meta": {{"profile": "bench", "version": "1", "entry": "d0"}}, "nodes": [{nodes}]}}"#
    );
    let rules = RuleSet::from_json(&doc).unwrap();

    let case = CaseRecord::new()
        .set("qc.fundus_pass", true)
        .set("macula.edema_prob", 0.75_f64);

    (rules, case)
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_chain");

    for &n in &[5, 20, 50] {
        let (rules, case) = build_chain(n);
        let interpreter = Interpreter::new().max_iterations(n as u32 + 1);
        group.bench_function(format!("{n}_decisions"), |b| {
            b.iter(|| interpreter.run(black_box(&rules), black_box(&case)));
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_and_hash");

    for &n in &[5, 50] {
        let mut nodes = String::new();
        for i in 0..n {
            nodes.push_str(&format!(
                r#"{{"id": "d{i}", "type": "decision", "when": "age > {i}",
                    "goto_true": "d{}", "goto_false": "d{}"}},"#,
                i + 1,
                i + 1
            ));
        }
        nodes.push_str(&format!(
            r#"{{"id": "d{n}", "type": "action",
                "actions": [{{"type": "set_followup", "interval": "12m"}}]}}"#
        ));
        let doc = format!(
            r#"{{"meta": {{"profile": "bench", "version": "1", "entry": "d0"}}, "nodes": [{nodes}]}}"#
        );

        group.bench_function(format!("{n}_nodes"), |b| {
            b.iter(|| RuleSet::from_json(black_box(&doc)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run, bench_load);
criterion_main!(benches);
