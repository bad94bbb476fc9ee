use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::domain::{FeedbackInput, FeedbackRecord, MAX_SATISFACTION, MIN_SATISFACTION};
use super::errors::FeedbackError;
use super::repository::FeedbackStore;
use crate::token::{SessionClaims, TokenCodec};

pub struct FeedbackService<S: FeedbackStore> {
    store: Arc<S>,
    tokens: TokenCodec,
}

impl<S: FeedbackStore> FeedbackService<S> {
    pub fn new(store: Arc<S>, tokens: TokenCodec) -> Self {
        Self { store, tokens }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Claims of a present, valid bearer token.
    pub fn authorize(&self, token: Option<&str>) -> Result<SessionClaims, FeedbackError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(FeedbackError::Unauthorized)?;
        self.tokens.validate(token).map_err(|e| {
            warn!(err = %e, "feedback token rejected");
            FeedbackError::InvalidToken
        })
    }

    /// Append feedback on behalf of the token's holder.
    /// The token is checked before the body.
    #[instrument(skip_all)]
    pub async fn submit(&self, token: Option<&str>, input: FeedbackInput) -> Result<FeedbackRecord, FeedbackError> {
        let claims = self.authorize(token)?;

        let rating = input
            .satisfaction
            .ok_or_else(|| FeedbackError::Validation("Satisfaction rating is required.".into()))?;
        let satisfaction = u8::try_from(rating)
            .ok()
            .filter(|s| (MIN_SATISFACTION..=MAX_SATISFACTION).contains(s))
            .ok_or_else(|| {
                FeedbackError::Validation(format!(
                    "Satisfaction must be between {MIN_SATISFACTION} and {MAX_SATISFACTION}."
                ))
            })?;

        let record = FeedbackRecord {
            user_email: claims.sub,
            satisfaction,
            comment: input.comment,
            date: Utc::now(),
        };
        self.store.append(record.clone()).await?;
        info!(user = %record.user_email, satisfaction, "feedback_received");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{Identity, Role};
    use crate::feedback::repository::memory::InMemoryFeedbackStore;
    use chrono::Duration;

    fn fixture() -> (FeedbackService<InMemoryFeedbackStore>, TokenCodec) {
        let tokens = TokenCodec::new("test-secret", Duration::hours(1));
        let svc = FeedbackService::new(Arc::new(InMemoryFeedbackStore::new()), tokens.clone());
        (svc, tokens)
    }

    fn great() -> FeedbackInput {
        FeedbackInput { satisfaction: Some(5), comment: "great".into() }
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (svc, _) = fixture();
        assert!(matches!(svc.submit(None, great()).await, Err(FeedbackError::Unauthorized)));
        assert!(matches!(svc.submit(Some(""), great()).await, Err(FeedbackError::Unauthorized)));
        assert!(svc.store().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_token_is_invalid() {
        let (svc, _) = fixture();
        let foreign = TokenCodec::new("other", Duration::hours(1))
            .issue(&Identity::Email("a@x.com".into()), Role::Student, None)
            .unwrap();
        assert!(matches!(svc.submit(Some(&foreign), great()).await, Err(FeedbackError::InvalidToken)));
        assert!(svc.store().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_token_appends_exactly_one_record() {
        let (svc, tokens) = fixture();
        let token = tokens.issue(&Identity::Email("a@x.com".into()), Role::Student, Some("Ann")).unwrap();
        let record = svc.submit(Some(&token), great()).await.unwrap();
        assert_eq!(record.user_email, "a@x.com");

        let all = svc.store().all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], record);
        assert_eq!(all[0].satisfaction, 5);
        assert_eq!(all[0].comment, "great");
    }

    #[tokio::test]
    async fn satisfaction_must_be_in_range() {
        let (svc, tokens) = fixture();
        let token = tokens.issue(&Identity::Email("a@x.com".into()), Role::Student, None).unwrap();
        for satisfaction in [None, Some(0), Some(6), Some(-1), Some(261)] {
            let input = FeedbackInput { satisfaction, comment: String::new() };
            assert!(matches!(svc.submit(Some(&token), input).await, Err(FeedbackError::Validation(_))));
        }
        assert!(svc.store().all().await.unwrap().is_empty());
    }

    #[test]
    fn authorize_distinguishes_missing_from_invalid() {
        let (svc, tokens) = fixture();
        assert!(matches!(svc.authorize(None), Err(FeedbackError::Unauthorized)));
        assert!(matches!(svc.authorize(Some("garbage")), Err(FeedbackError::InvalidToken)));
        let token = tokens.issue(&Identity::Email("a@x.com".into()), Role::Student, None).unwrap();
        assert_eq!(svc.authorize(Some(&token)).unwrap().sub, "a@x.com");
    }
}
