use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

/// Unique key of a user record. Students are keyed by email, the admin by username;
/// the two spaces never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    Email(String),
    Username(String),
}

impl Identity {
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Email(v) | Identity::Username(v) => v,
        }
    }
}

/// Stored user (credential store row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub full_name: Option<String>,
    pub identity: Identity,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_issued_at: Option<DateTime<Utc>>,
    /// Pending code that promotes this account to admin.
    pub admin_code: Option<String>,
    pub admin_code_issued_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// A freshly registered student waiting for OTP verification.
    pub fn pending_student(full_name: &str, email: &str, password_hash: String, otp: String) -> Self {
        Self {
            full_name: Some(full_name.to_string()),
            identity: Identity::Email(email.to_string()),
            password_hash,
            role: Role::Student,
            is_verified: false,
            otp: Some(otp),
            otp_issued_at: Some(Utc::now()),
            admin_code: None,
            admin_code_issued_at: None,
        }
    }

    /// Admins need no verification step.
    pub fn admin(username: &str, password_hash: String) -> Self {
        Self {
            full_name: None,
            identity: Identity::Username(username.to_string()),
            password_hash,
            role: Role::Admin,
            is_verified: true,
            otp: None,
            otp_issued_at: None,
            admin_code: None,
            admin_code_issued_at: None,
        }
    }

    pub fn is_student_with_email(&self, email: &str) -> bool {
        self.role == Role::Student && matches!(&self.identity, Identity::Email(e) if e == email)
    }

    /// Any email-keyed account, promoted or not.
    pub fn has_email(&self, email: &str) -> bool {
        matches!(&self.identity, Identity::Email(e) if e == email)
    }

    pub fn is_admin_with_username(&self, username: &str) -> bool {
        self.role == Role::Admin && matches!(&self.identity, Identity::Username(u) if u == username)
    }

    pub fn display(&self) -> DisplayUser {
        DisplayUser {
            full_name: self.full_name.clone().unwrap_or_default(),
            email: self.identity.as_str().to_string(),
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyOtpInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResendOtpInput {
    #[serde(default)]
    pub email: String,
}

/// Student login input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminLoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Credentials of an email-keyed account asking for admin access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminAccessInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminCodeRequestInput {
    #[serde(default)]
    pub email: String,
}

/// Credentials plus the admin access code mailed to the admin recipient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpgradeInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub token: String,
}

/// What the client shows for the signed-in student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUser {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
}

/// Result of a successful verify or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: DisplayUser,
}

/// Answer to an admin access check.
#[derive(Debug, Clone)]
pub enum AdminAccess {
    /// The account is already an admin.
    Granted(AuthSession),
    /// Valid student credentials; an admin access code must be requested.
    CodeRequired,
}

/// Result of a successful admin upgrade. `promoted` is false when the
/// account was already an admin.
#[derive(Debug, Clone)]
pub struct AdminGrant {
    pub session: AuthSession,
    pub promoted: bool,
}
