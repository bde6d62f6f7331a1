use thiserror::Error;

/// Errors detected while loading a rule set into the graph model.
///
/// Dangling `goto` targets are deliberately *not* load errors: references
/// may be forward, and unresolvable targets surface at traversal time as a
/// `missing_node` safety stop.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: String },

    #[error("entry node '{entry}' is not defined")]
    MissingEntry { entry: String },

    #[error("rule set has no nodes")]
    Empty,

    #[error("failed to canonicalize rule set: {0}")]
    Canonicalize(#[from] serde_json::Error),
}
