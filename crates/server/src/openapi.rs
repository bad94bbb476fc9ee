use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub full_name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct VerifyOtpRequest { pub email: String, pub otp_code: String }

#[derive(ToSchema)]
pub struct ResendOtpRequest { pub email: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct AdminLoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct AdminAccessRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct AdminCodeRequest { pub email: String }

/// `token` is the access code mailed to the admin recipient.
#[derive(ToSchema)]
pub struct AdminUpgradeRequest { pub email: String, pub password: String, pub token: String }

/// `satisfaction` is 1..=5.
#[derive(ToSchema)]
pub struct FeedbackRequest { pub satisfaction: u8, pub comment: Option<String> }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::verify_otp,
        crate::routes::auth::resend_otp,
        crate::routes::auth::login,
        crate::routes::auth::admin_authenticate,
        crate::routes::auth::admin_login_check,
        crate::routes::auth::send_admin_token,
        crate::routes::auth::admin_login,
        crate::routes::feedback::submit_feedback,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            VerifyOtpRequest,
            ResendOtpRequest,
            LoginRequest,
            AdminLoginRequest,
            AdminAccessRequest,
            AdminCodeRequest,
            AdminUpgradeRequest,
            FeedbackRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth", description = "Student registration, OTP verification and login"),
        (name = "admin", description = "Promotion of verified students to admin with a mailed access code"),
        (name = "feedback", description = "Authenticated feedback submission"),
    )
)]
pub struct ApiDoc;
