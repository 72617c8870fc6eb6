//! InitializeSessionHandler - Derives the session fields of an interview.
//!
//! Looks up the survey question, selects the participant's answer and renders
//! the opening and system messages. Touches no shared state.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::interview::{InterviewSession, ModelArgs, SessionRequest};
use crate::domain::prompt::{PromptTemplate, TemplateArgs, TemplateError};
use crate::ports::{CatalogError, QuestionCatalog};

/// Placeholder for the question wording.
pub const SURVEY_QUESTION_VAR: &str = "surveyQuestion";

/// Placeholder for the selected answer.
pub const RESPONSE_VAL_VAR: &str = "responseVal";

/// Errors that prevent an interview from starting.
#[derive(Debug, Error)]
pub enum InitializeSessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid response: {0}")]
    Response(#[from] ValidationError),

    #[error("failed to render prompt: {0}")]
    Template(#[from] TemplateError),
}

impl InitializeSessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InitializeSessionError::Catalog(CatalogError::UnknownQuestion(_)) => {
                ErrorCode::UnknownQuestion
            }
            InitializeSessionError::Catalog(_) => ErrorCode::AssetUnavailable,
            InitializeSessionError::Response(_) => ErrorCode::ResponseOutOfRange,
            InitializeSessionError::Template(_) => ErrorCode::TemplateMismatch,
        }
    }
}

/// Handler for building an [`InterviewSession`] from request parameters.
pub struct InitializeSessionHandler {
    catalog: Arc<dyn QuestionCatalog>,
    initial_template: PromptTemplate,
    system_template: PromptTemplate,
    model_args: ModelArgs,
}

impl InitializeSessionHandler {
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        initial_template: PromptTemplate,
        system_template: PromptTemplate,
        model_args: ModelArgs,
    ) -> Self {
        Self {
            catalog,
            initial_template,
            system_template,
            model_args,
        }
    }

    pub async fn handle(
        &self,
        request: &SessionRequest,
    ) -> Result<InterviewSession, InitializeSessionError> {
        tracing::info!(
            user = %request.user_id,
            session = %request.session_id,
            "Initializing session"
        );

        // 1. Look up the question and the selected answer
        let record = self.catalog.question(&request.question_id).await?;
        let response_text = record.select_choice(&request.response)?.to_string();

        tracing::info!(
            question_id = %request.question_id,
            question = %record.question,
            response = %response_text,
            "Loaded survey question"
        );

        // 2. Render the prompts
        let initial_message = self
            .initial_template
            .format(TemplateArgs::named([(SURVEY_QUESTION_VAR, record.question.as_str())]))?;
        let system_message = self.system_template.format(TemplateArgs::named([
            (SURVEY_QUESTION_VAR, record.question.as_str()),
            (RESPONSE_VAL_VAR, response_text.as_str()),
        ]))?;

        tracing::info!(%initial_message, "Rendered initial message");
        tracing::info!(%system_message, "Rendered system message");

        Ok(InterviewSession {
            user_id: request.user_id.clone(),
            session_id: request.session_id.clone(),
            question_wording: record.question,
            response_text,
            initial_message,
            system_message,
            model_args: self.model_args.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::assets::InMemoryQuestionCatalog;

    fn handler() -> InitializeSessionHandler {
        let catalog = InMemoryQuestionCatalog::new().with_question(
            "0",
            "How satisfied were you?",
            &["Low", "Medium", "High"],
        );
        InitializeSessionHandler::new(
            Arc::new(catalog),
            PromptTemplate::parse("You answered: {surveyQuestion}. Can you tell me why?").unwrap(),
            PromptTemplate::parse("Question: {surveyQuestion}\nAnswer: {responseVal}").unwrap(),
            ModelArgs::default(),
        )
    }

    fn request(question: &str, response: &str) -> SessionRequest {
        SessionRequest::from_params(
            Some("u1".into()),
            Some("s1".into()),
            Some(question.into()),
            Some(response.into()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn renders_both_messages_from_selected_choice() {
        let session = handler().handle(&request("0", "2")).await.unwrap();

        assert_eq!(session.response_text, "High");
        assert_eq!(session.question_wording, "How satisfied were you?");
        assert_eq!(
            session.initial_message,
            "You answered: How satisfied were you?. Can you tell me why?"
        );
        assert_eq!(
            session.system_message,
            "Question: How satisfied were you?\nAnswer: High"
        );
        assert_eq!(session.session_id.as_str(), "s1");
        assert_eq!(session.model_args, ModelArgs::default());
    }

    #[tokio::test]
    async fn out_of_range_response_fails() {
        let err = handler().handle(&request("0", "3")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ResponseOutOfRange);
    }

    #[tokio::test]
    async fn non_numeric_response_fails() {
        let err = handler().handle(&request("0", "abc")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ResponseOutOfRange);
    }

    #[tokio::test]
    async fn unknown_question_fails() {
        let err = handler().handle(&request("9", "0")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownQuestion);
    }

    #[tokio::test]
    async fn template_with_extra_placeholder_fails() {
        let catalog = InMemoryQuestionCatalog::new().with_question("0", "Q", &["A"]);
        let handler = InitializeSessionHandler::new(
            Arc::new(catalog),
            PromptTemplate::parse("{surveyQuestion} {participantName}").unwrap(),
            PromptTemplate::parse("{surveyQuestion} {responseVal}").unwrap(),
            ModelArgs::default(),
        );

        let err = handler.handle(&request("0", "0")).await.unwrap_err();
        assert!(matches!(err, InitializeSessionError::Template(_)));
        assert_eq!(err.code(), ErrorCode::TemplateMismatch);
    }
}
