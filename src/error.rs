use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RTreeError {
    /// A node must be able to hold at least the two seeds of a split.
    #[error("max_elements must be at least 2, got {0}")]
    InvalidMaxElements(usize),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RTreeError>;
