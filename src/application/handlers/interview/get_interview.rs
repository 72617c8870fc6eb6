//! GetInterviewHandler - Query handler for the current interview view.

use std::sync::Arc;

use crate::domain::foundation::InterviewId;
use crate::ports::{InterviewStore, StoreError};

use super::InterviewView;

pub struct GetInterviewHandler {
    store: Arc<dyn InterviewStore>,
}

impl GetInterviewHandler {
    pub fn new(store: Arc<dyn InterviewStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, id: InterviewId) -> Result<InterviewView, StoreError> {
        let shared = self.store.get(&id).await?;
        let interview = shared.lock().await;
        Ok(InterviewView::from(&*interview))
    }
}
