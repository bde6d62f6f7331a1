//! Deterministic, auditable evaluation of clinical decision rule graphs.
//!
//! A [`RuleSet`] is loaded once, hashed canonically, and never mutated; the
//! [`Interpreter`] walks it against a [`CaseRecord`] under strict iteration
//! and cycle bounds, producing recommended actions plus a complete
//! [`TraceEntry`] sequence for audit.

mod error;
mod eval;
mod hash;
mod interpret;
mod parse;
mod types;

pub use error::CarepathError;
pub use eval::{evaluate, EvalError};
pub use interpret::{Interpreter, PreconditionViolation, DEFAULT_MAX_ITERATIONS};
pub use parse::{parse, ParseError};
pub use types::{
    ActionDescriptor, CaseDataError, CaseRecord, CompareOp, Evaluation, Expr, LoadError, Outcome,
    RuleMeta, RuleNode, RuleSet, RuleSetSource, SourceNode, StopKind, TraceEntry, Value,
};
