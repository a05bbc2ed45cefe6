use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Course id {0} is not a 5 digit number")]
    InvalidUid(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("{failed} of {total} deletes failed")]
    PartialDelete { failed: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rejected: {0}")]
    Rejected(String),
}

impl AppError {
    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }
}
