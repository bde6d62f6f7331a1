mod case;
mod error;
mod evaluation;
mod expr;
mod node;
mod ruleset;
mod trace;
mod value;

pub use case::{CaseDataError, CaseRecord};
pub use error::LoadError;
pub use evaluation::Evaluation;
pub use expr::{CompareOp, Expr};
pub use node::{ActionDescriptor, RuleNode};
pub use ruleset::{RuleMeta, RuleSet, RuleSetSource, SourceNode};
pub use trace::{Outcome, StopKind, TraceEntry};
pub use value::Value;
