//! In-Memory Interview Store Adapter
//!
//! Holds live interviews until they are removed or swept. Nothing survives a
//! restart; transcripts are made durable by the chat log and the archive.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{InterviewId, Timestamp};
use crate::domain::interview::Interview;
use crate::ports::{InterviewStore, SharedInterview, StoreError};

#[derive(Debug)]
struct Entry {
    interview: SharedInterview,
    /// Copied out of the aggregate so sweeps never wait on a turn's lock.
    created_at: Timestamp,
}

/// In-memory storage for live interviews
#[derive(Debug, Clone, Default)]
pub struct InMemoryInterviewStore {
    interviews: Arc<RwLock<HashMap<InterviewId, Entry>>>,
}

impl InMemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for InMemoryInterviewStore {
    async fn insert(&self, interview: Interview) -> Result<SharedInterview, StoreError> {
        let id = *interview.id();
        let created_at = *interview.created_at();
        let mut interviews = self.interviews.write().await;
        if interviews.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let shared = Arc::new(Mutex::new(interview));
        interviews.insert(
            id,
            Entry {
                interview: Arc::clone(&shared),
                created_at,
            },
        );
        Ok(shared)
    }

    async fn get(&self, id: &InterviewId) -> Result<SharedInterview, StoreError> {
        self.interviews
            .read()
            .await
            .get(id)
            .map(|entry| Arc::clone(&entry.interview))
            .ok_or(StoreError::NotFound(*id))
    }

    async fn remove(&self, id: &InterviewId) -> Result<SharedInterview, StoreError> {
        self.interviews
            .write()
            .await
            .remove(id)
            .map(|entry| entry.interview)
            .ok_or(StoreError::NotFound(*id))
    }

    async fn remove_created_before(&self, cutoff: Timestamp) -> usize {
        let mut interviews = self.interviews.write().await;
        let before = interviews.len();
        interviews.retain(|_, entry| !entry.created_at.is_before(&cutoff));
        before - interviews.len()
    }

    async fn len(&self) -> usize {
        self.interviews.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::{InterviewStatus, SessionRequest};
    use std::time::Duration;

    fn interview() -> Interview {
        Interview::new(
            InterviewId::new(),
            SessionRequest::from_params(None, None, None, None).unwrap(),
        )
    }

    #[tokio::test]
    async fn insert_then_get_returns_same_handle() {
        let store = InMemoryInterviewStore::new();
        let interview = interview();
        let id = *interview.id();

        let inserted = store.insert(interview).await.unwrap();
        let fetched = store.get(&id).await.unwrap();

        assert!(Arc::ptr_eq(&inserted, &fetched));
        assert_eq!(fetched.lock().await.status(), InterviewStatus::NotStarted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryInterviewStore::new();
        let interview = interview();

        store.insert(interview.clone()).await.unwrap();
        assert!(matches!(
            store.insert(interview).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryInterviewStore::new();
        assert!(matches!(
            store.get(&InterviewId::new()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn removed_interview_is_gone_but_handle_survives() {
        let store = InMemoryInterviewStore::new();
        let interview = interview();
        let id = *interview.id();
        let held = store.insert(interview).await.unwrap();

        let removed = store.remove(&id).await.unwrap();

        assert!(Arc::ptr_eq(&held, &removed));
        assert_eq!(store.len().await, 0);
        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.remove(&id).await, Err(StoreError::NotFound(_))));
        assert_eq!(held.lock().await.status(), InterviewStatus::NotStarted);
    }

    #[tokio::test]
    async fn sweep_removes_only_interviews_older_than_cutoff() {
        let store = InMemoryInterviewStore::new();
        for _ in 0..3 {
            store.insert(interview()).await.unwrap();
        }

        assert_eq!(
            store
                .remove_created_before(Timestamp::now().minus(Duration::from_secs(3600)))
                .await,
            0
        );
        assert_eq!(store.len().await, 3);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.remove_created_before(Timestamp::now()).await, 3);
        assert_eq!(store.len().await, 0);
    }
}
