use serde::{Deserialize, Serialize};

/// One node in a rule graph.
///
/// The node kinds form a closed set: traversal is an exhaustive match, so an
/// unrecognized node type is unrepresentable in the model (it fails document
/// deserialization instead of being silently skipped at runtime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleNode {
    /// Evaluates a boolean expression and branches on the outcome.
    Decision {
        /// Expression source text, parsed once at load.
        when: String,
        /// Node id to follow when the expression is true.
        goto_true: String,
        /// Node id to follow when the expression is false.
        goto_false: String,
        /// Citation ids attached to this node, resolved by an external
        /// snippet store.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cite: Vec<String>,
    },
    /// Emits recommended actions and terminates the run. Action nodes carry
    /// no goto fields: they are terminal by construction.
    Action {
        actions: Vec<ActionDescriptor>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cite: Vec<String>,
    },
}

impl RuleNode {
    /// The trace label for this node kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RuleNode::Decision { .. } => "decision",
            RuleNode::Action { .. } => "action",
        }
    }

    /// Citations attached to this node.
    #[must_use]
    pub fn cite(&self) -> &[String] {
        match self {
            RuleNode::Decision { cite, .. } | RuleNode::Action { cite, .. } => cite,
        }
    }
}

/// A recommended action emitted by an action node.
///
/// The variants are the complete action vocabulary; anything else fails
/// document deserialization as a structural error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDescriptor {
    SuggestReferral { specialty: String, urgency: String },
    OrderTest { test_type: String },
    SetFollowup { interval: String },
    Abstain { reason: String },
}
