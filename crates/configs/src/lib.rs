use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";
/// Upper bound for every TTL setting: one year.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub admin: AdminSeed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3000, worker_threads: Some(4) }
    }
}

/// Session token and OTP settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Unset means codes never expire.
    #[serde(default)]
    pub otp_ttl_secs: Option<u64>,
    /// Lifetime of an admin access code.
    #[serde(default = "default_admin_code_ttl")]
    pub admin_code_ttl_secs: u64,
    /// Mailbox that receives admin access codes.
    #[serde(default = "default_admin_code_recipient")]
    pub admin_code_recipient: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            otp_ttl_secs: None,
            admin_code_ttl_secs: default_admin_code_ttl(),
            admin_code_recipient: default_admin_code_recipient(),
        }
    }
}

/// The single admin account seeded into the credential store at boot.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
    /// Precomputed argon2 PHC string; takes precedence over `password`.
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self { username: default_admin_username(), password: default_admin_password(), password_hash: None }
    }
}

fn default_jwt_secret() -> String { DEV_JWT_SECRET.to_string() }
fn default_token_ttl() -> u64 { 3600 }
fn default_admin_code_ttl() -> u64 { 180 }
fn default_admin_code_recipient() -> String { "admin@portal.local".to_string() }
fn default_admin_username() -> String { "admin".to_string() }
fn default_admin_password() -> String { "adminpass123".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env_with(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from a key lookup (normally the process environment).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.auth.token_ttl_secs = ttl;
        }
        if let Some(ttl) = lookup("OTP_TTL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.auth.otp_ttl_secs = Some(ttl);
        }
        if let Some(ttl) = lookup("ADMIN_CODE_TTL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.auth.admin_code_ttl_secs = ttl;
        }
        if let Some(recipient) = lookup("ADMIN_CODE_RECIPIENT") {
            self.auth.admin_code_recipient = recipient;
        }
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Some(hash) = lookup("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.auth.validate()?;
        self.admin.validate()?;
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AuthSettings {
    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        check_ttl("auth.token_ttl_secs", self.token_ttl_secs)?;
        if let Some(ttl) = self.otp_ttl_secs {
            check_ttl("auth.otp_ttl_secs", ttl)?;
        }
        check_ttl("auth.admin_code_ttl_secs", self.admin_code_ttl_secs)?;
        if self.admin_code_recipient.trim().is_empty() {
            return Err(anyhow!("auth.admin_code_recipient is empty"));
        }
        Ok(())
    }
}

fn check_ttl(name: &str, secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_TTL_SECS {
        return Err(anyhow!("{name} must be within 1..={MAX_TTL_SECS}, got {secs}"));
    }
    Ok(())
}

impl AdminSeed {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!("admin.username is empty"));
        }
        if self.password_hash.is_none() && self.password.is_empty() {
            return Err(anyhow!("admin.password or admin.password_hash is required"));
        }
        Ok(())
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .map(|e| e.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_yields_defaults() {
        let mut cfg = from_toml_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert_eq!(cfg.auth.otp_ttl_secs, None);
        assert_eq!(cfg.auth.admin_code_ttl_secs, 180);
        assert_eq!(cfg.admin.username, "admin");
        assert!(cfg.uses_dev_secret());
    }

    #[test]
    fn toml_sections_are_read() {
        let cfg = from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [auth]
            jwt_secret = "s3cret"
            otp_ttl_secs = 180

            [admin]
            username = "root"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.auth.jwt_secret, "s3cret");
        assert_eq!(cfg.auth.otp_ttl_secs, Some(180));
        assert_eq!(cfg.admin.username, "root");
        assert_eq!(cfg.admin.password, "adminpass123");
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("SERVER_PORT", "4000"),
            ("JWT_SECRET", "from-env"),
            ("OTP_TTL_SECS", "60"),
            ("ADMIN_PASSWORD_HASH", "$argon2id$fake"),
            ("TOKEN_TTL_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_env_with(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.auth.jwt_secret, "from-env");
        assert_eq!(cfg.auth.otp_ttl_secs, Some(60));
        assert_eq!(cfg.admin.password_hash.as_deref(), Some("$argon2id$fake"));
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "  ".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.auth.otp_ttl_secs = Some(0);
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.admin.username = String::new();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.auth.admin_code_recipient = " ".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn ttls_are_bounded() {
        let mut cfg = AppConfig::default();
        cfg.auth.token_ttl_secs = MAX_TTL_SECS;
        cfg.auth.otp_ttl_secs = Some(MAX_TTL_SECS);
        cfg.normalize_and_validate().unwrap();

        let mut cfg = AppConfig::default();
        cfg.auth.token_ttl_secs = 1_000_000_000_000_000;
        let err = cfg.normalize_and_validate().unwrap_err();
        assert!(err.to_string().contains("auth.token_ttl_secs"));

        let mut cfg = AppConfig::default();
        cfg.auth.otp_ttl_secs = Some(u64::MAX);
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.auth.admin_code_ttl_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }
}
