//! In-memory ChatLogger for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::SessionId;
use crate::ports::{ChatLogger, LogEntry, LogError};

/// Records entries in memory. Can be switched to fail every append.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChatLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    fail: bool,
}

impl InMemoryChatLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger whose appends always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All entries in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries of one session in append order.
    pub fn entries_for(&self, session: &SessionId) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.session == session)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChatLogger for InMemoryChatLogger {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogError> {
        if self.fail {
            return Err(LogError::Io {
                path: "memory".to_string(),
                message: "simulated failure".to_string(),
            });
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
