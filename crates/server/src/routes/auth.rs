use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use common::types::Message;
use service::auth::domain::{
    AdminAccess, AdminAccessInput, AdminCodeRequestInput, AdminLoginInput, AdminUpgradeInput, AuthSession,
    DisplayUser, LoginInput, RegisterInput, ResendOtpInput, VerifyOtpInput,
};

use crate::errors::ApiError;
use crate::extract::Payload;
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct SessionOutput {
    pub message: &'static str,
    pub token: String,
    pub user: DisplayUser,
}

impl SessionOutput {
    fn new(message: &'static str, session: AuthSession) -> Self {
        Self { message, token: session.token, user: session.user }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminSessionOutput {
    pub message: &'static str,
    pub token: String,
}

/// Answer of `/admin/login-check`; `action` tells the client what to do next.
#[derive(Debug, Serialize)]
pub struct AdminCheckOutput {
    pub message: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<DisplayUser>,
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered, OTP sent"), (status = 400, description = "Missing fields or email already in use")))]
pub async fn register(
    State(state): State<ServerState>,
    Payload(input): Payload<RegisterInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    state.auth.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Message::new("Registration successful. Please check your email for a verification code.")),
    ))
}

#[utoipa::path(post, path = "/verify-otp", tag = "auth", request_body = crate::openapi::VerifyOtpRequest, responses((status = 200, description = "Verified, session opened"), (status = 400, description = "Missing fields, already verified, invalid or expired code"), (status = 404, description = "User not found")))]
pub async fn verify_otp(
    State(state): State<ServerState>,
    Payload(input): Payload<VerifyOtpInput>,
) -> Result<Json<SessionOutput>, ApiError> {
    let session = state.auth.verify_otp(input).await?;
    Ok(Json(SessionOutput::new("Account verified successfully!", session)))
}

#[utoipa::path(post, path = "/resend-otp", tag = "auth", request_body = crate::openapi::ResendOtpRequest, responses((status = 200, description = "New code sent"), (status = 400, description = "Missing email or already verified"), (status = 404, description = "User not found")))]
pub async fn resend_otp(
    State(state): State<ServerState>,
    Payload(input): Payload<ResendOtpInput>,
) -> Result<Json<Message>, ApiError> {
    state.auth.resend_otp(input).await?;
    Ok(Json(Message::new("A new verification code has been sent to your email.")))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in"), (status = 400, description = "Missing fields"), (status = 401, description = "Invalid credentials"), (status = 403, description = "Account not verified")))]
pub async fn login(
    State(state): State<ServerState>,
    Payload(input): Payload<LoginInput>,
) -> Result<Json<SessionOutput>, ApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(SessionOutput::new("Login successful!", session)))
}

#[utoipa::path(post, path = "/admin/authenticate", tag = "auth", request_body = crate::openapi::AdminLoginRequest, responses((status = 200, description = "Admin logged in"), (status = 400, description = "Missing fields"), (status = 401, description = "Invalid credentials")))]
pub async fn admin_authenticate(
    State(state): State<ServerState>,
    Payload(input): Payload<AdminLoginInput>,
) -> Result<Json<AdminSessionOutput>, ApiError> {
    let token = state.auth.admin_login(input).await?;
    Ok(Json(AdminSessionOutput { message: "Admin login successful!", token }))
}

#[utoipa::path(post, path = "/admin/login-check", tag = "admin", request_body = crate::openapi::AdminAccessRequest, responses((status = 200, description = "Already an admin, session opened"), (status = 400, description = "Missing fields"), (status = 401, description = "Invalid credentials"), (status = 403, description = "Not verified, or an admin access code is required")))]
pub async fn admin_login_check(
    State(state): State<ServerState>,
    Payload(input): Payload<AdminAccessInput>,
) -> Result<Response, ApiError> {
    let response = match state.auth.check_admin_access(input).await? {
        AdminAccess::Granted(session) => Json(AdminCheckOutput {
            message: "Admin login successful.",
            action: "login_success",
            token: Some(session.token),
            user: Some(session.user),
        })
        .into_response(),
        AdminAccess::CodeRequired => (
            StatusCode::FORBIDDEN,
            Json(AdminCheckOutput {
                message: "Credentials accepted. Token required.",
                action: "require_token",
                token: None,
                user: None,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

#[utoipa::path(post, path = "/admin/send-token", tag = "admin", request_body = crate::openapi::AdminCodeRequest, responses((status = 200, description = "Access code sent to the admin mailbox"), (status = 400, description = "Missing email"), (status = 404, description = "User not found")))]
pub async fn send_admin_token(
    State(state): State<ServerState>,
    Payload(input): Payload<AdminCodeRequestInput>,
) -> Result<Json<Message>, ApiError> {
    let recipient = state.auth.request_admin_code(input).await?;
    Ok(Json(Message::new(format!(
        "Token successfully generated and sent to the primary Admin email: {recipient}"
    ))))
}

#[utoipa::path(post, path = "/admin/login", tag = "admin", request_body = crate::openapi::AdminUpgradeRequest, responses((status = 200, description = "Admin access granted"), (status = 400, description = "Missing fields"), (status = 401, description = "Invalid credentials or invalid/expired access code"), (status = 403, description = "Not verified, or access code missing")))]
pub async fn admin_login(
    State(state): State<ServerState>,
    Payload(input): Payload<AdminUpgradeInput>,
) -> Result<Json<SessionOutput>, ApiError> {
    let grant = state.auth.upgrade_to_admin(input).await?;
    let message = if grant.promoted { "Token verified and Admin access granted." } else { "Admin login successful." };
    Ok(Json(SessionOutput::new(message, grant.session)))
}
