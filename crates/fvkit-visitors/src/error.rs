use std::path::PathBuf;

use fvkit_tree::TreeError;

/// Errors from tree operations and command construction.
#[derive(Debug, thiserror::Error)]
pub enum VisitorError {
    /// The replacement predicate matched no raw file.
    #[error("no matches found for replacement")]
    NoMatches,

    /// More than one file matched while exactly one was required.
    #[error("multiple matches found! There can be only one. Use find to list all matches")]
    MultipleMatches { count: usize },

    /// A node handler failed during traversal.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A file match expression is neither a GUID nor a valid pattern.
    #[error("invalid match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command '{command}' takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for visitor operations.
pub type VisitorResult<T> = Result<T, VisitorError>;
