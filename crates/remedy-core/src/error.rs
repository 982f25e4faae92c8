use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemedyError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid score input: {0}")]
    InvalidScoreInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RemedyError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RemedyError>;
