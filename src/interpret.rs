//! The rule-graph traversal engine.
//!
//! Walks a [`RuleSet`] from its entry node, consulting the expression
//! evaluator at decision nodes and collecting actions at action nodes,
//! under two unconditional bounds: an iteration budget and a per-node
//! revisit limit. Every abnormal condition -- dangling goto, revisited
//! node, exhausted budget, malformed or ill-typed expression -- is
//! recovered into a terminal `safety_stop` trace entry; the run always
//! returns a valid (possibly empty) action list and a non-empty trace.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eval::{self, EvalError};
use crate::types::{
    ActionDescriptor, CaseRecord, Evaluation, Outcome, RuleNode, RuleSet, StopKind, TraceEntry,
};

/// Default iteration budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Caller misuse, reported as a hard error instead of a safety stop.
///
/// This is the only failure `run` propagates; everything a malformed graph
/// or expression can cause is recovered into the trace. (The "null rule
/// set / null case" misuse of looser runtimes is unrepresentable here.)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("iteration budget must be at least 1")]
    ZeroIterationBudget,

    #[error("revisit limit must be at least 1")]
    ZeroRevisitLimit,
}

/// Interpreter configuration: the iteration budget and the node revisit
/// limit (the default of 1 treats the second sighting of any node id as a
/// cycle, trading re-entrancy for guaranteed termination).
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    max_iterations: u32,
    revisit_limit: u32,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            revisit_limit: 1,
        }
    }
}

/// Traversal state. A run moves from `Running` to exactly one of the
/// terminal states; there is no way back.
#[derive(Debug, Clone, Copy)]
enum RunState<'rs> {
    Running(&'rs str),
    Terminated,
    SafetyStopped(StopKind),
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Set how many times a node may be seen before the revisit counts as
    /// a cycle.
    #[must_use]
    pub fn revisit_limit(mut self, n: u32) -> Self {
        self.revisit_limit = n;
        self
    }

    /// Run one case against one rule set.
    ///
    /// Deterministic: identical (rule set, case) inputs produce identical
    /// actions and identical traces, timestamps aside. The rule set and
    /// case are borrowed read-only; all run state is owned by this call.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation`] if either bound is zero. All
    /// other failures terminate cleanly inside the returned
    /// [`Evaluation`].
    pub fn run(
        &self,
        rules: &RuleSet,
        case: &CaseRecord,
    ) -> Result<Evaluation, PreconditionViolation> {
        if self.max_iterations == 0 {
            return Err(PreconditionViolation::ZeroIterationBudget);
        }
        if self.revisit_limit == 0 {
            return Err(PreconditionViolation::ZeroRevisitLimit);
        }
        Ok(run_loop(rules, case, self.max_iterations, self.revisit_limit))
    }
}

fn run_loop<'rs>(
    rules: &'rs RuleSet,
    case: &CaseRecord,
    max_iterations: u32,
    revisit_limit: u32,
) -> Evaluation {
    let mut actions: Vec<ActionDescriptor> = Vec::new();
    let mut trace: Vec<TraceEntry> = Vec::new();
    let mut visits: HashMap<&'rs str, u32> = HashMap::new();
    let mut iterations: u32 = 0;

    let mut state = RunState::Running(rules.meta().entry.as_str());

    while let RunState::Running(current) = state {
        iterations += 1;
        if iterations > max_iterations {
            state = safety_stop(
                rules,
                &mut trace,
                current,
                StopKind::MaxIterationsExceeded,
                "max_iterations_exceeded".to_owned(),
                &[],
            );
            continue;
        }

        let Some(node) = rules.node(current) else {
            state = safety_stop(
                rules,
                &mut trace,
                current,
                StopKind::MissingNode,
                format!("missing_node:{current}"),
                &[],
            );
            continue;
        };

        let seen = visits.entry(current).or_insert(0);
        *seen += 1;
        if *seen > revisit_limit {
            state = safety_stop(
                rules,
                &mut trace,
                current,
                StopKind::CycleDetected,
                format!("cycle_detected:{current}"),
                node.cite(),
            );
            continue;
        }

        debug!(node = current, kind = node.kind(), "visiting node");

        match node {
            RuleNode::Decision {
                when,
                goto_true,
                goto_false,
                cite,
            } => {
                // Load parses every decision expression into the cache; a
                // miss here means the cache invariant was broken.
                let evaluated = match rules.expr(when) {
                    Some(Ok(ast)) => eval::evaluate(ast, case)
                        .map_err(|e| (stop_kind(&e), e.to_string())),
                    Some(Err(parse_err)) => {
                        Err((StopKind::ParseError, parse_err.to_string()))
                    }
                    None => Err((StopKind::ParseError, format!("unparsed expression: {when}"))),
                };
                match evaluated {
                    Ok(outcome) => {
                        trace.push(trace_entry(
                            rules,
                            current,
                            Outcome::Decision { outcome },
                            cite,
                        ));
                        state = RunState::Running(if outcome { goto_true } else { goto_false });
                    }
                    Err((kind, reason)) => {
                        state = safety_stop(rules, &mut trace, current, kind, reason, cite);
                    }
                }
            }
            RuleNode::Action {
                actions: emitted,
                cite,
            } => {
                actions.extend(emitted.iter().cloned());
                trace.push(trace_entry(
                    rules,
                    current,
                    Outcome::Action {
                        actions: emitted.clone(),
                    },
                    cite,
                ));
                state = RunState::Terminated;
            }
        }
    }

    let stopped = match state {
        RunState::SafetyStopped(kind) => Some(kind),
        RunState::Terminated | RunState::Running(_) => None,
    };
    Evaluation::new(actions, trace, stopped)
}

fn stop_kind(err: &EvalError) -> StopKind {
    match err {
        EvalError::MissingField { .. } => StopKind::MissingField,
        EvalError::TypeMismatch { .. }
        | EvalError::NullOrdering { .. }
        | EvalError::NotBoolean { .. } => StopKind::TypeError,
    }
}

fn safety_stop<'rs>(
    rules: &RuleSet,
    trace: &mut Vec<TraceEntry>,
    node: &str,
    kind: StopKind,
    reason: String,
    cite: &[String],
) -> RunState<'rs> {
    warn!(node, reason = reason.as_str(), "safety stop");
    trace.push(trace_entry(
        rules,
        node,
        Outcome::SafetyStop { stop: kind, reason },
        cite,
    ));
    RunState::SafetyStopped(kind)
}

fn trace_entry(rules: &RuleSet, node: &str, outcome: Outcome, cite: &[String]) -> TraceEntry {
    TraceEntry {
        node: node.to_owned(),
        outcome,
        cite: cite.to_vec(),
        profile: rules.meta().profile.clone(),
        version: rules.meta().version.clone(),
        rule_hash: rules.hash().to_owned(),
        timestamp: Utc::now(),
    }
}
