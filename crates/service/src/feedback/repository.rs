use async_trait::async_trait;

use super::domain::FeedbackRecord;
use super::errors::FeedbackError;

/// Append-only sink for feedback records.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackError>;
    /// Everything stored so far, oldest first. Not exposed over HTTP.
    async fn all(&self) -> Result<Vec<FeedbackRecord>, FeedbackError>;
}

pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryFeedbackStore {
        records: RwLock<Vec<FeedbackRecord>>,
    }

    impl InMemoryFeedbackStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl FeedbackStore for InMemoryFeedbackStore {
        async fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackError> {
            self.records.write().await.push(record);
            Ok(())
        }

        async fn all(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
            Ok(self.records.read().await.clone())
        }
    }
}
