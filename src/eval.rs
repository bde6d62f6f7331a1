//! Pure evaluation of decision expressions against a case record.
//!
//! Evaluation is a function of (AST, case) with no side effects. All
//! failures are typed; none escape as panics.
//!
//! Null comparison policy, applied uniformly:
//! - ordering operators (`>`, `>=`, `<`, `<=`) never accept a null or
//!   absent operand;
//! - equality operators treat an absent *field* as matching nothing (both
//!   `==` and `!=` yield false);
//! - a `null` *literal* compared for equality against a present value
//!   yields false for `==` and true for `!=`, so `x != null` reads as
//!   "x is present".

use thiserror::Error;

use crate::types::{CaseRecord, CompareOp, Expr, Value};

/// Errors surfaced by expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("cannot compare {lhs} {op} {rhs}")]
    TypeMismatch {
        op: CompareOp,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("ordering comparison '{op}' on a null or missing operand")]
    NullOrdering { op: CompareOp },

    #[error("missing field '{path}'")]
    MissingField { path: String },

    #[error("expected a boolean, found {found}")]
    NotBoolean { found: &'static str },
}

/// A comparison operand after field resolution. An absent field (missing
/// key, broken path, or null value) is distinct from a present `null`
/// literal: the policy treats them differently under equality.
enum Operand {
    Present(Value),
    Absent,
}

/// Evaluate an expression to a boolean.
///
/// # Errors
///
/// Returns [`EvalError`] on type mismatches, ordering against null/absent
/// operands, or a missing field in boolean position.
pub fn evaluate(expr: &Expr, case: &CaseRecord) -> Result<bool, EvalError> {
    eval_bool(expr, case)
}

fn eval_bool(expr: &Expr, case: &CaseRecord) -> Result<bool, EvalError> {
    match expr {
        // `and`/`or` short-circuit left to right.
        Expr::And(a, b) => Ok(eval_bool(a, case)? && eval_bool(b, case)?),
        Expr::Or(a, b) => Ok(eval_bool(a, case)? || eval_bool(b, case)?),
        Expr::Not(inner) => Ok(!eval_bool(inner, case)?),
        Expr::Compare { op, lhs, rhs } => eval_compare(*op, lhs, rhs, case),
        Expr::Literal(_) | Expr::Field(_) => match eval_value(expr, case)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::NotBoolean {
                found: other.kind(),
            }),
        },
    }
}

fn eval_value(expr: &Expr, case: &CaseRecord) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Field(path) => match case.get(path) {
            Some(v) if !v.is_null() => Ok(v.clone()),
            _ => Err(EvalError::MissingField { path: path.clone() }),
        },
        other => eval_bool(other, case).map(Value::Bool),
    }
}

fn operand(expr: &Expr, case: &CaseRecord) -> Result<Operand, EvalError> {
    match eval_value(expr, case) {
        Ok(v) => Ok(Operand::Present(v)),
        Err(EvalError::MissingField { .. }) => Ok(Operand::Absent),
        Err(e) => Err(e),
    }
}

fn eval_compare(
    op: CompareOp,
    lhs: &Expr,
    rhs: &Expr,
    case: &CaseRecord,
) -> Result<bool, EvalError> {
    let lhs = operand(lhs, case)?;
    let rhs = operand(rhs, case)?;

    if op.is_ordering() {
        let (Operand::Present(a), Operand::Present(b)) = (&lhs, &rhs) else {
            return Err(EvalError::NullOrdering { op });
        };
        if a.is_null() || b.is_null() {
            return Err(EvalError::NullOrdering { op });
        }
        if matches!(a, Value::Bool(_)) || matches!(b, Value::Bool(_)) {
            return Err(EvalError::TypeMismatch {
                op,
                lhs: a.kind(),
                rhs: b.kind(),
            });
        }
        let ord = a.partial_cmp_value(b).ok_or(EvalError::TypeMismatch {
            op,
            lhs: a.kind(),
            rhs: b.kind(),
        })?;
        return Ok(op.holds(ord));
    }

    match (lhs, rhs) {
        // An absent field matches nothing, under == and != alike.
        (Operand::Absent, _) | (_, Operand::Absent) => Ok(false),
        (Operand::Present(a), Operand::Present(b)) => {
            if a.is_null() && b.is_null() {
                return Ok(op == CompareOp::Eq);
            }
            if a.is_null() || b.is_null() {
                // A present value never equals the null literal.
                return Ok(op == CompareOp::Neq);
            }
            let ord = a.partial_cmp_value(&b).ok_or(EvalError::TypeMismatch {
                op,
                lhs: a.kind(),
                rhs: b.kind(),
            })?;
            Ok(op.holds(ord))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn eval(expr: &str, case: &CaseRecord) -> Result<bool, EvalError> {
        evaluate(&parse(expr).unwrap(), case)
    }

    fn case() -> CaseRecord {
        CaseRecord::new()
            .set("age", 65_i64)
            .set("vision_reduced", true)
            .set("dr_grade", "moderate_npdr")
            .set("qc.fundus_pass", true)
            .set("qc.macula_view", true)
            .set("macula.edema_prob", 0.75_f64)
    }

    #[test]
    fn numeric_comparisons() {
        let c = case();
        assert_eq!(eval("age > 60", &c), Ok(true));
        assert_eq!(eval("age >= 65", &c), Ok(true));
        assert_eq!(eval("age < 60", &c), Ok(false));
        assert_eq!(eval("age == 65", &c), Ok(true));
        assert_eq!(eval("age != 65", &c), Ok(false));
        assert_eq!(eval("macula.edema_prob >= 0.5", &c), Ok(true));
    }

    #[test]
    fn int_float_cross_comparison() {
        let c = CaseRecord::new().set("score", 10_i64);
        assert_eq!(eval("score == 10.0", &c), Ok(true));
        assert_eq!(eval("score < 10.5", &c), Ok(true));
    }

    #[test]
    fn string_comparison() {
        let c = case();
        assert_eq!(eval(r#"dr_grade == "moderate_npdr""#, &c), Ok(true));
        assert_eq!(eval(r#"dr_grade != "severe_npdr""#, &c), Ok(true));
    }

    #[test]
    fn boolean_comparison() {
        let c = case();
        assert_eq!(eval("qc.fundus_pass == true", &c), Ok(true));
        assert_eq!(eval("qc.fundus_pass != false", &c), Ok(true));
    }

    #[test]
    fn logic_and_or_not() {
        let c = case();
        assert_eq!(
            eval("qc.fundus_pass == true and qc.macula_view == true", &c),
            Ok(true)
        );
        assert_eq!(eval("age < 60 or vision_reduced == true", &c), Ok(true));
        assert_eq!(eval("not age < 60", &c), Ok(true));
    }

    #[test]
    fn bare_boolean_field() {
        let c = case();
        assert_eq!(eval("vision_reduced", &c), Ok(true));
        assert_eq!(eval("not vision_reduced", &c), Ok(false));
    }

    #[test]
    fn short_circuit_skips_right_side_errors() {
        let c = case();
        // Right side would be a type error, but the left side decides first.
        assert_eq!(eval(r#"age < 60 and age > "high""#, &c), Ok(false));
        assert_eq!(eval(r#"age > 60 or age > "high""#, &c), Ok(true));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let c = case();
        assert_eq!(
            eval(r#"age > "high""#, &c),
            Err(EvalError::TypeMismatch {
                op: CompareOp::Gt,
                lhs: "number",
                rhs: "string",
            })
        );
        assert!(matches!(
            eval("age == true", &c),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn ordering_on_booleans_is_an_error() {
        let c = case();
        assert!(matches!(
            eval("vision_reduced > false", &c),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_field_equality_is_false() {
        let c = case();
        assert_eq!(eval("ancestry == \"unknown\"", &c), Ok(false));
        assert_eq!(eval("ancestry != \"unknown\"", &c), Ok(false));
        assert_eq!(eval("ancestry == null", &c), Ok(false));
        assert_eq!(eval("ancestry != null", &c), Ok(false));
    }

    #[test]
    fn null_valued_field_is_treated_as_absent() {
        let c = CaseRecord::new().set("dr_grade", Value::Null);
        assert_eq!(eval("dr_grade != null", &c), Ok(false));
        assert_eq!(eval(r#"dr_grade == "moderate_npdr""#, &c), Ok(false));
    }

    #[test]
    fn present_field_null_literal_presence_idiom() {
        let c = case();
        assert_eq!(eval("dr_grade != null", &c), Ok(true));
        assert_eq!(eval("dr_grade == null", &c), Ok(false));
    }

    #[test]
    fn null_literal_equality() {
        let c = case();
        assert_eq!(eval("null == null", &c), Ok(true));
        assert_eq!(eval("null != null", &c), Ok(false));
    }

    #[test]
    fn ordering_against_missing_or_null_is_an_error() {
        let c = case();
        assert_eq!(
            eval("ancestry > 5", &c),
            Err(EvalError::NullOrdering { op: CompareOp::Gt })
        );
        assert_eq!(
            eval("age <= null", &c),
            Err(EvalError::NullOrdering { op: CompareOp::Lte })
        );
    }

    #[test]
    fn missing_field_in_boolean_position_is_an_error() {
        let c = case();
        assert_eq!(
            eval("ancestry", &c),
            Err(EvalError::MissingField {
                path: "ancestry".to_owned()
            })
        );
        assert!(matches!(
            eval("not ancestry", &c),
            Err(EvalError::MissingField { .. })
        ));
    }

    #[test]
    fn non_boolean_in_boolean_position_is_an_error() {
        let c = case();
        assert_eq!(
            eval("age", &c),
            Err(EvalError::NotBoolean { found: "number" })
        );
        assert_eq!(
            eval("age and vision_reduced", &c),
            Err(EvalError::NotBoolean { found: "number" })
        );
    }

    #[test]
    fn broken_path_is_absent() {
        let c = case();
        // "age" is a leaf; traversing through it finds nothing.
        assert_eq!(eval("age.years == 65", &c), Ok(false));
        assert_eq!(eval("qc.missing_field == true", &c), Ok(false));
    }

    #[test]
    fn literal_only_expressions() {
        let c = CaseRecord::new();
        assert_eq!(eval("true", &c), Ok(true));
        assert_eq!(eval("false or true", &c), Ok(true));
        assert_eq!(eval("1 < 2", &c), Ok(true));
        assert_eq!(eval(r#""a" < "b""#, &c), Ok(true));
    }

    #[test]
    fn parenthesized_comparison_as_equality_operand() {
        let c = case();
        assert_eq!(eval("(age > 60) == true", &c), Ok(true));
    }
}
