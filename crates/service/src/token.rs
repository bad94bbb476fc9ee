//! Session token codec: stateless HS256 JWTs carrying identity, role and display name.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::domain::{Identity, Role};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Email for students, username for the admin.
    pub sub: String,
    pub role: Role,
    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token expiring `ttl` after now.
    ///
    /// # Examples
    /// ```
    /// use service::token::TokenCodec;
    /// use service::auth::domain::{Identity, Role};
    /// let codec = TokenCodec::new("secret", chrono::Duration::hours(1));
    /// let token = codec.issue(&Identity::Email("a@x.com".into()), Role::Student, Some("Ann")).unwrap();
    /// let claims = codec.validate(&token).unwrap();
    /// assert_eq!(claims.sub, "a@x.com");
    /// assert_eq!(claims.full_name.as_deref(), Some("Ann"));
    /// ```
    pub fn issue(&self, identity: &Identity, role: Role, full_name: Option<&str>) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry out of range for ttl {}s", self.ttl.num_seconds())))?;
        let claims = SessionClaims {
            sub: identity.as_str().to_string(),
            role,
            full_name: full_name.map(str::to_string),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry and return the embedded claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}
