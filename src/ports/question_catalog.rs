//! Question Catalog Port - Lookup of survey questions by external id.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::question::QuestionRecord;

/// Errors raised while looking up a question.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),

    #[error("question asset {path} unavailable: {message}")]
    AssetUnavailable { path: String, message: String },

    #[error("question asset {path} is malformed: {message}")]
    Malformed { path: String, message: String },
}

/// Port for reading question records.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Looks up the question mapped to `question_id`.
    async fn question(&self, question_id: &str) -> Result<QuestionRecord, CatalogError>;
}
