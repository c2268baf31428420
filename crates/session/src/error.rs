use filepack_chunker::{Chunk, ChunkerError};
use filepack_xref::XrefError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Chunking failed: {0}")]
    Chunking(#[from] ChunkerError),

    #[error("Cross-reference resolution failed: {0}")]
    CrossReference(#[from] XrefError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// A pipeline pass that did not finish.
///
/// `partial` holds the raw chunks when assembly succeeded before the failure.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PipelineFailure {
    #[source]
    pub error: SessionError,
    pub partial: Option<Vec<Chunk>>,
}

impl PipelineFailure {
    pub fn total(error: impl Into<SessionError>) -> Self {
        Self {
            error: error.into(),
            partial: None,
        }
    }

    pub fn partial(error: impl Into<SessionError>, chunks: Vec<Chunk>) -> Self {
        Self {
            error: error.into(),
            partial: Some(chunks),
        }
    }
}
