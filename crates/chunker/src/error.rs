use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while planning or assembling chunks
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A boundary points outside the content or into the middle of a character
    #[error("Invalid boundary position {position} (content length {len})")]
    InvalidBoundaries { position: usize, len: usize },

    /// Boundaries are not sorted by position
    #[error("Boundaries out of order: {previous} followed by {next}")]
    UnsortedBoundaries { previous: usize, next: usize },

    /// Malformed file collection
    #[error("Malformed collection: {0}")]
    MalformedCollection(String),
}

impl ChunkerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a malformed collection error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedCollection(msg.into())
    }
}
