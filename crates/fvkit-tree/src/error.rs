use fvkit_types::{Guid, TypeError};

use crate::path::NodePath;

/// Errors from tree operations.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The file does not fit in the size field its volume allows.
    #[error("file {guid} is too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { guid: Guid, size: u64, max: u64 },

    /// The assembled contents of a volume exceed its fixed length.
    #[error("volume overflow: contents need {used} bytes but the volume holds {length}")]
    VolumeOverflow { used: u64, length: u64 },

    /// A buffer ended before a structure was complete.
    #[error("truncated {what}: need {need} bytes, have {have}")]
    Truncated {
        what: &'static str,
        need: usize,
        have: usize,
    },

    /// A path does not resolve to a node in this tree.
    #[error("no node at path {0}")]
    InvalidPath(NodePath),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
