use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use super::domain::{
    AdminAccess, AdminAccessInput, AdminCodeRequestInput, AdminGrant, AdminLoginInput, AdminUpgradeInput,
    AuthSession, Identity, LoginInput, RegisterInput, ResendOtpInput, Role, UserRecord, VerifyOtpInput,
};
use super::errors::AuthError;
use super::otp::{generate_otp, OtpNotifier};
use super::password::{hash_password, verify_password};
use super::repository::{CredentialStore, Mutation};
use crate::token::TokenCodec;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Age after which a stored OTP stops being accepted; `None` keeps codes valid forever.
    pub otp_ttl: Option<Duration>,
    /// Age after which an admin access code stops being accepted.
    pub admin_code_ttl: Duration,
    /// Mailbox that receives admin access codes.
    pub admin_code_recipient: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl: None,
            admin_code_ttl: Duration::minutes(3),
            admin_code_recipient: "admin@portal.local".to_string(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: CredentialStore> {
    repo: Arc<R>,
    notifier: Arc<dyn OtpNotifier>,
    tokens: TokenCodec,
    cfg: AuthConfig,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl<R: CredentialStore> AuthService<R> {
    pub fn new(repo: Arc<R>, notifier: Arc<dyn OtpNotifier>, tokens: TokenCodec, cfg: AuthConfig) -> Self {
        Self { repo, notifier, tokens, cfg }
    }

    pub fn repo(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    pub fn config(&self) -> &AuthConfig {
        &self.cfg
    }

    /// Seed the admin account. The hash must be an argon2 PHC string.
    #[instrument(skip(self, password_hash))]
    pub async fn seed_admin(&self, username: &str, password_hash: String) -> Result<(), AuthError> {
        self.repo.insert(UserRecord::admin(username, password_hash)).await?;
        info!(%username, "admin_seeded");
        Ok(())
    }

    /// Register a student, store a fresh OTP and hand it to the notifier.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, repository::memory::InMemoryCredentialStore};
    /// use service::auth::{domain::RegisterInput, otp::LogOtpNotifier};
    /// use service::token::TokenCodec;
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryCredentialStore::new());
    /// let tokens = TokenCodec::new("secret", chrono::Duration::hours(1));
    /// let svc = AuthService::new(repo, Arc::new(LogOtpNotifier), tokens, AuthConfig::default());
    /// let input = RegisterInput { full_name: "Ann".into(), email: "a@x.com".into(), password: "pw123456".into() };
    /// tokio_test::block_on(svc.register(input)).unwrap();
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<(), AuthError> {
        if blank(&input.full_name) || blank(&input.email) || input.password.is_empty() {
            return Err(AuthError::Validation("All fields are required".into()));
        }
        let email = input.email.trim().to_string();
        let full_name = input.full_name.trim().to_string();

        // fast path before paying for the hash; insert re-checks atomically
        if self.find_account(&email).await?.is_some() {
            debug!("email already registered");
            return Err(AuthError::DuplicateIdentity);
        }

        let hash = hash_password(input.password).await?;
        let otp = generate_otp();
        self.repo
            .insert(UserRecord::pending_student(&full_name, &email, hash, otp.clone()))
            .await?;
        self.notifier.deliver(&email, &otp).await;
        info!(%email, "user_registered");
        Ok(())
    }

    /// Confirm the stored OTP, mark the student verified and open a session.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn verify_otp(&self, input: VerifyOtpInput) -> Result<AuthSession, AuthError> {
        if blank(&input.email) || blank(&input.otp_code) {
            return Err(AuthError::Validation("Email and OTP code are required.".into()));
        }
        let identity = Identity::Email(input.email.trim().to_string());
        let submitted = input.otp_code.trim().to_string();
        let otp_ttl = self.cfg.otp_ttl;

        let verify: Mutation = Box::new(move |user: &mut UserRecord| -> Result<(), AuthError> {
            if user.is_verified {
                return Err(AuthError::AlreadyVerified);
            }
            if user.otp.as_deref() != Some(submitted.as_str()) {
                return Err(AuthError::InvalidCode);
            }
            if let (Some(ttl), Some(issued_at)) = (otp_ttl, user.otp_issued_at) {
                if Utc::now() - issued_at > ttl {
                    return Err(AuthError::ExpiredCode);
                }
            }
            user.is_verified = true;
            user.otp = None;
            user.otp_issued_at = None;
            Ok(())
        });
        let user = self.repo.mutate(&identity, verify).await?;
        info!(email = %identity.as_str(), "user_verified");
        self.open_session(&user)
    }

    /// Replace a pending student's OTP with a new one and deliver it.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn resend_otp(&self, input: ResendOtpInput) -> Result<(), AuthError> {
        if blank(&input.email) {
            return Err(AuthError::Validation("Email is required.".into()));
        }
        let identity = Identity::Email(input.email.trim().to_string());
        let otp = generate_otp();
        let code = otp.clone();

        let reissue: Mutation = Box::new(move |user: &mut UserRecord| -> Result<(), AuthError> {
            if user.is_verified {
                return Err(AuthError::AlreadyVerified);
            }
            user.otp = Some(code);
            user.otp_issued_at = Some(Utc::now());
            Ok(())
        });
        self.repo.mutate(&identity, reissue).await?;
        self.notifier.deliver(identity.as_str(), &otp).await;
        info!(email = %identity.as_str(), "otp_reissued");
        Ok(())
    }

    /// Authenticate a verified student.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if blank(&input.email) || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".into()));
        }
        let user = self
            .find_student(input.email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }
        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }
        info!(email = %user.identity.as_str(), "user_logged_in");
        self.open_session(&user)
    }

    /// Authenticate the admin and return a bare token.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn admin_login(&self, input: AdminLoginInput) -> Result<String, AuthError> {
        if blank(&input.username) || input.password.is_empty() {
            return Err(AuthError::Validation("Username and password are required.".into()));
        }
        let username = input.username.trim();
        let pred = |u: &UserRecord| u.is_admin_with_username(username);
        let admin = self.repo.find(&pred).await?.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(input.password, admin.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }
        info!(%username, "admin_logged_in");
        self.tokens
            .issue(&admin.identity, Role::Admin, None)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check credentials of an email-keyed account asking for admin access.
    /// Admins are signed in directly; verified students are told to request a code.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn check_admin_access(&self, input: AdminAccessInput) -> Result<AdminAccess, AuthError> {
        if blank(&input.email) || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".into()));
        }
        let user = self.authenticate_account(input.email.trim(), input.password).await?;
        if user.role == Role::Admin {
            info!(email = %user.identity.as_str(), "admin_logged_in");
            return Ok(AdminAccess::Granted(self.open_session(&user)?));
        }
        debug!("admin access code required");
        Ok(AdminAccess::CodeRequired)
    }

    /// Issue an admin access code for `email` and mail it to the admin recipient.
    /// Returns the recipient. Any earlier code for the account is replaced.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn request_admin_code(&self, input: AdminCodeRequestInput) -> Result<String, AuthError> {
        if blank(&input.email) {
            return Err(AuthError::Validation("Missing email for token generation.".into()));
        }
        let identity = Identity::Email(input.email.trim().to_string());
        let code = generate_otp();
        let stored = code.clone();

        let issue: Mutation = Box::new(move |user: &mut UserRecord| -> Result<(), AuthError> {
            user.admin_code = Some(stored);
            user.admin_code_issued_at = Some(Utc::now());
            Ok(())
        });
        self.repo.mutate(&identity, issue).await?;

        let recipient = self.cfg.admin_code_recipient.clone();
        self.notifier.deliver_admin_code(&recipient, identity.as_str(), &code).await;
        info!(email = %identity.as_str(), %recipient, "admin_code_issued");
        Ok(recipient)
    }

    /// Re-check credentials, consume the admin access code and promote the account.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn upgrade_to_admin(&self, input: AdminUpgradeInput) -> Result<AdminGrant, AuthError> {
        if blank(&input.email) || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".into()));
        }
        let user = self.authenticate_account(input.email.trim(), input.password).await?;
        if user.role == Role::Admin {
            return Ok(AdminGrant { session: self.open_session(&user)?, promoted: false });
        }
        if blank(&input.token) {
            return Err(AuthError::AdminCodeRequired);
        }

        let submitted = input.token.trim().to_string();
        let ttl = self.cfg.admin_code_ttl;
        let promote: Mutation = Box::new(move |user: &mut UserRecord| -> Result<(), AuthError> {
            if user.role == Role::Admin {
                return Ok(());
            }
            let fresh = user.admin_code_issued_at.is_some_and(|at| Utc::now() - at <= ttl);
            if user.admin_code.as_deref() != Some(submitted.as_str()) || !fresh {
                return Err(AuthError::InvalidAdminCode);
            }
            user.role = Role::Admin;
            user.admin_code = None;
            user.admin_code_issued_at = None;
            Ok(())
        });
        let promoted = self.repo.mutate(&user.identity, promote).await?;
        info!(email = %promoted.identity.as_str(), "admin_access_granted");
        Ok(AdminGrant { session: self.open_session(&promoted)?, promoted: true })
    }

    /// Verified email-keyed account whose password matches.
    async fn authenticate_account(&self, email: &str, password: String) -> Result<UserRecord, AuthError> {
        let user = self.find_account(email).await?.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }
        Ok(user)
    }

    async fn find_account(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let pred = |u: &UserRecord| u.has_email(email);
        self.repo.find(&pred).await
    }

    async fn find_student(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let pred = |u: &UserRecord| u.is_student_with_email(email);
        self.repo.find(&pred).await
    }

    fn open_session(&self, user: &UserRecord) -> Result<AuthSession, AuthError> {
        let token = self
            .tokens
            .issue(&user.identity, user.role, user.full_name.as_deref())
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(AuthSession { token, user: user.display() })
    }
}
