use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed loading cases: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed loading cases: unrecognised export shape ({0})")]
    UnrecognizedShape(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("no loaded case with CINO {0}")]
    UnknownCase(String),

    #[error("invalid stage pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
