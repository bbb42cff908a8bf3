//! Error types for loading catalogs, configs and share codes.

use thiserror::Error;

/// Result type for fallible mastery operations.
pub type Result<T> = std::result::Result<T, MasteryError>;

/// Errors raised while reading external inputs.
///
/// The interactive path (toggling, pruning, recomputing the view) never
/// fails; these only come out of the loaders.
#[derive(Debug, Error)]
pub enum MasteryError {
    /// Branch name is not offense, defense or support
    #[error("unknown branch: {0}")]
    UnknownBranch(String),

    /// Text is not a `<branch>-<tier>-<column>` inside the tree
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    /// Share code is not valid base64url
    #[error("malformed share code: {0}")]
    MalformedEncoding(#[from] base64::DecodeError),

    /// Catalog or config document is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
