//! In-memory QuestionCatalog for tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::question::QuestionRecord;
use crate::ports::{CatalogError, QuestionCatalog};

#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionCatalog {
    questions: HashMap<String, QuestionRecord>,
}

impl InMemoryQuestionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(
        mut self,
        question_id: impl Into<String>,
        question: impl Into<String>,
        choices: &[&str],
    ) -> Self {
        self.questions.insert(
            question_id.into(),
            QuestionRecord {
                question: question.into(),
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl QuestionCatalog for InMemoryQuestionCatalog {
    async fn question(&self, question_id: &str) -> Result<QuestionRecord, CatalogError> {
        self.questions
            .get(question_id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownQuestion(question_id.to_string()))
    }
}
