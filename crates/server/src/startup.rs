use std::{future::Future, sync::Arc};

use chrono::Duration;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::otp::LogOtpNotifier;
use service::auth::password::hash_password;
use service::auth::AuthConfig;
use service::token::TokenCodec;

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn ttl(name: &str, secs: u64) -> anyhow::Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow::anyhow!("{name} of {secs}s is out of range"))
}

/// Stores, services and the seeded admin account described by `cfg`.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    if cfg.uses_dev_secret() {
        warn!("auth.jwt_secret is the development default; set JWT_SECRET in production");
    }
    let tokens = TokenCodec::new(&cfg.auth.jwt_secret, ttl("auth.token_ttl_secs", cfg.auth.token_ttl_secs)?);
    let auth_cfg = AuthConfig {
        otp_ttl: cfg.auth.otp_ttl_secs.map(|s| ttl("auth.otp_ttl_secs", s)).transpose()?,
        admin_code_ttl: ttl("auth.admin_code_ttl_secs", cfg.auth.admin_code_ttl_secs)?,
        admin_code_recipient: cfg.auth.admin_code_recipient.clone(),
    };
    let state = ServerState::in_memory(tokens, Arc::new(LogOtpNotifier), auth_cfg);

    let admin_hash = match &cfg.admin.password_hash {
        Some(hash) => hash.clone(),
        None => hash_password(cfg.admin.password.clone()).await?,
    };
    state.auth.seed_admin(&cfg.admin.username, admin_hash).await?;
    Ok(state)
}

/// Serve the router on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ServerState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::build_router(state, build_cors());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!(%addr, "Server is running on http://{}", addr);
    serve(listener, state, shutdown_signal()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_conversion_rejects_out_of_range_seconds() {
        assert_eq!(ttl("t", 3600).unwrap(), Duration::hours(1));
        assert!(ttl("t", u64::MAX).is_err());
        assert!(ttl("t", i64::MAX as u64).is_err());
    }

    #[tokio::test]
    async fn state_carries_admin_code_settings() {
        let mut cfg = AppConfig::default();
        cfg.auth.admin_code_recipient = "boss@x.com".into();
        cfg.admin.password_hash = Some(hash_password("pw".into()).await.unwrap());
        let state = build_state(&cfg).await.unwrap();
        assert_eq!(state.auth.config().admin_code_recipient, "boss@x.com");
        assert_eq!(state.auth.config().admin_code_ttl, Duration::minutes(3));
        assert_eq!(state.auth.tokens().ttl(), Duration::hours(1));
    }
}
