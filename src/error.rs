use thiserror::Error;

use crate::types::LoadError;

/// Unified error type covering document deserialization, loading, and I/O.
///
/// Returned by convenience methods like
/// [`RuleSet::from_json()`](crate::RuleSet::from_json) and
/// [`RuleSet::from_json_file()`](crate::RuleSet::from_json_file).
#[derive(Debug, Error)]
pub enum CarepathError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid rule document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
