//! In-memory TranscriptArchive for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::SessionId;
use crate::domain::interview::ChatMessage;
use crate::ports::{to_ndjson, ArchiveError, TranscriptArchive};

/// Keeps uploaded objects in a map keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    objects: Arc<Mutex<HashMap<String, String>>>,
    uploads: Arc<Mutex<usize>>,
    failures_left: Arc<Mutex<usize>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `count` uploads.
    pub fn failing_times(self, count: usize) -> Self {
        *self.failures_left.lock().unwrap() = count;
        self
    }

    /// Stored object of a session.
    pub fn object(&self, session: &SessionId) -> Option<String> {
        self.objects.lock().unwrap().get(session.as_str()).cloned()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Number of successful uploads.
    pub fn upload_count(&self) -> usize {
        *self.uploads.lock().unwrap()
    }
}

#[async_trait]
impl TranscriptArchive for InMemoryArchive {
    async fn upload(
        &self,
        session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<(), ArchiveError> {
        {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(ArchiveError::Network("simulated failure".to_string()));
            }
        }
        let body = to_ndjson(messages)?;
        self.objects
            .lock()
            .unwrap()
            .insert(session.as_str().to_string(), body);
        *self.uploads.lock().unwrap() += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
