use chrono::{DateTime, Utc};
use serde::Serialize;

use super::node::ActionDescriptor;

/// Classification of a safety stop, alongside the human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    /// The decision expression failed to parse.
    ParseError,
    /// Incompatible comparison operands, an ordering comparison on a
    /// null/absent field, or a non-boolean where a boolean was required.
    TypeError,
    /// A field was absent where a value was required.
    MissingField,
    /// A goto target did not resolve to any node.
    MissingNode,
    /// A node was revisited past the configured limit.
    CycleDetected,
    /// The iteration budget ran out.
    MaxIterationsExceeded,
}

/// What happened at one trace step. The serde tag doubles as the node kind
/// on the wire, so a `safety_stop` entry is distinguishable from a
/// successful `abstain` action by its `type` field alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Decision { outcome: bool },
    Action { actions: Vec<ActionDescriptor> },
    SafetyStop { stop: StopKind, reason: String },
}

impl Outcome {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Decision { .. } => "decision",
            Outcome::Action { .. } => "action",
            Outcome::SafetyStop { .. } => "safety_stop",
        }
    }
}

/// One record of the execution trace: a node visit (or safety stop) plus
/// the provenance needed to audit it later. The trace is append-only,
/// exclusively owned by one evaluation, and serializable as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// Id of the node this step concerns. For a safety stop this is the id
    /// being processed (or resolved) when the stop fired.
    pub node: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub cite: Vec<String>,
    pub profile: String,
    pub version: String,
    pub rule_hash: String,
    /// Wall-clock metadata only; never part of the determinism contract.
    pub timestamp: DateTime<Utc>,
}

impl TraceEntry {
    #[must_use]
    pub fn is_safety_stop(&self) -> bool {
        matches!(self.outcome, Outcome::SafetyStop { .. })
    }

    #[must_use]
    pub fn stop_kind(&self) -> Option<StopKind> {
        match &self.outcome {
            Outcome::SafetyStop { stop, .. } => Some(*stop),
            _ => None,
        }
    }
}
