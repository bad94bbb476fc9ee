use std::sync::Arc;

use service::auth::otp::OtpNotifier;
use service::auth::repository::memory::InMemoryCredentialStore;
use service::auth::{AuthConfig, AuthService};
use service::feedback::repository::memory::InMemoryFeedbackStore;
use service::feedback::FeedbackService;
use service::token::TokenCodec;

pub type PortalAuth = AuthService<InMemoryCredentialStore>;
pub type PortalFeedback = FeedbackService<InMemoryFeedbackStore>;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<PortalAuth>,
    pub feedback: Arc<PortalFeedback>,
}

impl ServerState {
    /// Fresh, empty in-memory stores sharing one token codec.
    pub fn in_memory(tokens: TokenCodec, notifier: Arc<dyn OtpNotifier>, cfg: AuthConfig) -> Self {
        let users = Arc::new(InMemoryCredentialStore::new());
        let feedback = Arc::new(InMemoryFeedbackStore::new());
        Self {
            auth: Arc::new(AuthService::new(users, notifier, tokens.clone(), cfg)),
            feedback: Arc::new(FeedbackService::new(feedback, tokens)),
        }
    }
}
