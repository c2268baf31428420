use thiserror::Error;

pub type Result<T> = std::result::Result<T, XrefError>;

#[derive(Error, Debug)]
pub enum XrefError {
    #[error("Structure count mismatch: {files} files but {structures} structural results")]
    StructureMismatch { files: usize, structures: usize },

    #[error("File not found in graph: {0}")]
    FileNotFound(String),
}

impl XrefError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}
