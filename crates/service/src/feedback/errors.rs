use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Unauthorized: You must be logged in.")]
    Unauthorized,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("{0}")]
    Validation(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl FeedbackError {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedbackError::Unauthorized => "unauthorized",
            FeedbackError::InvalidToken => "invalid_token",
            FeedbackError::Validation(_) => "validation_error",
            FeedbackError::Repository(_) => "internal_error",
        }
    }
}
