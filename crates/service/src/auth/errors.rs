use thiserror::Error;

/// Business errors for auth workflows.
///
/// Display strings of the client-facing variants are the messages returned to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already in use")]
    DuplicateIdentity,
    #[error("User not found.")]
    NotFound,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Account not verified. Please check your email.")]
    NotVerified,
    #[error("Account already verified.")]
    AlreadyVerified,
    #[error("Invalid verification code.")]
    InvalidCode,
    #[error("Verification code has expired. Please request a new one.")]
    ExpiredCode,
    #[error("Admin token is required for verification.")]
    AdminCodeRequired,
    #[error("Invalid or expired Admin Token.")]
    InvalidAdminCode,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::DuplicateIdentity => 1002,
            AuthError::NotFound => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::NotVerified => 1005,
            AuthError::AlreadyVerified => 1006,
            AuthError::InvalidCode => 1007,
            AuthError::ExpiredCode => 1008,
            AuthError::AdminCodeRequired => 1009,
            AuthError::InvalidAdminCode => 1010,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Stable snake_case kind for JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::DuplicateIdentity => "duplicate_identity",
            AuthError::NotFound => "not_found",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NotVerified => "not_verified",
            AuthError::AlreadyVerified => "already_verified",
            AuthError::InvalidCode => "invalid_code",
            AuthError::ExpiredCode => "expired_code",
            AuthError::AdminCodeRequired => "admin_code_required",
            AuthError::InvalidAdminCode => "invalid_admin_code",
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => "internal_error",
        }
    }

    /// Failures of the machinery rather than of the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_))
    }
}
