use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::auth::errors::AuthError;
use service::feedback::errors::FeedbackError;

const INTERNAL_MESSAGE: &str = "Internal server error.";

/// Every failure a handler can return; rendered as `{message, error}`.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Feedback(FeedbackError),
    BadRequest(String),
    NotFound(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: &'static str,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::Validation(_)
                | AuthError::DuplicateIdentity
                | AuthError::AlreadyVerified
                | AuthError::InvalidCode
                | AuthError::ExpiredCode => StatusCode::BAD_REQUEST,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials | AuthError::InvalidAdminCode => StatusCode::UNAUTHORIZED,
                AuthError::NotVerified | AuthError::AdminCodeRequired => StatusCode::FORBIDDEN,
                AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Feedback(e) => match e {
                FeedbackError::Unauthorized | FeedbackError::InvalidToken => StatusCode::UNAUTHORIZED,
                FeedbackError::Validation(_) => StatusCode::BAD_REQUEST,
                FeedbackError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Auth(e) if e.is_internal() => {
                error!(code = e.code(), err = %e, "auth request failed internally");
                ErrorBody { message: INTERNAL_MESSAGE.into(), error: e.kind() }
            }
            ApiError::Auth(e) => ErrorBody { message: e.to_string(), error: e.kind() },
            ApiError::Feedback(e @ FeedbackError::Repository(_)) => {
                error!(err = %e, "feedback request failed internally");
                ErrorBody { message: INTERNAL_MESSAGE.into(), error: e.kind() }
            }
            ApiError::Feedback(e) => ErrorBody { message: e.to_string(), error: e.kind() },
            ApiError::BadRequest(msg) => ErrorBody { message: msg.clone(), error: "validation_error" },
            ApiError::NotFound(msg) => ErrorBody { message: msg.clone(), error: "not_found" },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<FeedbackError> for ApiError {
    fn from(e: FeedbackError) -> Self {
        ApiError::Feedback(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Malformed request body: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(format!("Malformed form body: {}", rejection.body_text()))
    }
}
