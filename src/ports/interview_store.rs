//! Interview Store Port - Live interviews keyed by interview id.
//!
//! Each interview sits behind its own async mutex. Callers hold the lock only
//! while mutating the aggregate, never across a completion or upload call.
//!
//! Interviews are discarded once their completion code has been issued, and
//! abandoned ones are swept by age.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::foundation::{InterviewId, Timestamp};
use crate::domain::interview::Interview;

/// Handle to one live interview.
pub type SharedInterview = Arc<Mutex<Interview>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("interview not found: {0}")]
    NotFound(InterviewId),

    #[error("interview already exists: {0}")]
    AlreadyExists(InterviewId),
}

/// Port for holding live interviews.
#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Stores a new interview and returns its handle.
    async fn insert(&self, interview: Interview) -> Result<SharedInterview, StoreError>;

    /// Returns the handle of an existing interview.
    async fn get(&self, id: &InterviewId) -> Result<SharedInterview, StoreError>;

    /// Drops an interview. Handles already held by callers stay usable.
    async fn remove(&self, id: &InterviewId) -> Result<SharedInterview, StoreError>;

    /// Drops every interview created before `cutoff` and returns how many.
    async fn remove_created_before(&self, cutoff: Timestamp) -> usize;

    /// Number of live interviews.
    async fn len(&self) -> usize;
}
