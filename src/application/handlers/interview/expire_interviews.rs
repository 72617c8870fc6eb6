//! ExpireInterviewsHandler - Sweeps interviews that outlived their maximum age.
//!
//! Covers interviews that were created but never exited, so the store stays
//! bounded no matter how many sessions are opened.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::InterviewStore;

/// Handler for the periodic age sweep.
pub struct ExpireInterviewsHandler {
    store: Arc<dyn InterviewStore>,
    max_age: Duration,
}

impl ExpireInterviewsHandler {
    pub fn new(store: Arc<dyn InterviewStore>, max_age: Duration) -> Self {
        Self { store, max_age }
    }

    /// Removes interviews created more than `max_age` before `now`.
    pub async fn handle(&self, now: Timestamp) -> usize {
        let removed = self
            .store
            .remove_created_before(now.minus(self.max_age))
            .await;
        if removed > 0 {
            let remaining = self.store.len().await;
            tracing::info!(
                removed,
                remaining,
                "Expired interviews swept"
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryInterviewStore;
    use crate::domain::foundation::InterviewId;
    use crate::domain::interview::{Interview, SessionRequest};

    async fn store_with(count: usize) -> Arc<InMemoryInterviewStore> {
        let store = Arc::new(InMemoryInterviewStore::new());
        for _ in 0..count {
            store
                .insert(Interview::new(
                    InterviewId::new(),
                    SessionRequest::from_params(None, None, None, None).unwrap(),
                ))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn young_interviews_survive() {
        let store = store_with(2).await;
        let handler = ExpireInterviewsHandler::new(store.clone(), Duration::from_secs(3600));

        assert_eq!(handler.handle(Timestamp::now()).await, 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn abandoned_interviews_are_swept() {
        let store = store_with(3).await;
        let handler = ExpireInterviewsHandler::new(store.clone(), Duration::from_secs(60));

        let later = Timestamp::from_datetime(
            *Timestamp::now().as_datetime() + chrono::Duration::seconds(120),
        );

        assert_eq!(handler.handle(later).await, 3);
        assert_eq!(store.len().await, 0);
    }
}
