//! SendMessage command handler.
//!
//! Runs one participant turn as a single sequential pipeline:
//!
//! 1. append the user text as a pending pair
//! 2. stream the completion, appending every fragment and publishing a
//!    transcript snapshot after each one
//! 3. log the user entry, then the bot entry
//! 4. evaluate the end conditions
//!
//! The interview lock is taken only around each state mutation and never held
//! while waiting on the provider or the log.

use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::foundation::{ErrorCode, InterviewId, SessionId};
use crate::domain::interview::{CompletedTurn, EndCheck, EndReason, InterviewError, TurnRequest};
use crate::ports::{
    AIError, AIProvider, ChatLogger, CompletionRequest, InterviewStore, LogEntry, LogRole,
    RequestMetadata, SharedInterview, StoreError,
};

use super::InterviewView;

/// Command to submit a participant message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub interview_id: InterviewId,
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(interview_id: InterviewId, content: impl Into<String>) -> Self {
        Self {
            interview_id,
            content: content.into(),
        }
    }
}

/// Errors that reject a submission before any turn starts.
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    NotFound(#[from] StoreError),

    #[error(transparent)]
    Interview(#[from] InterviewError),
}

impl SendMessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SendMessageError::NotFound(_) => ErrorCode::InterviewNotFound,
            SendMessageError::Interview(err) => err.code(),
        }
    }
}

/// Why a started turn was retracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnFailure {
    /// Machine-readable kind, e.g. `rate_limited` or `empty_completion`.
    pub kind: String,
    pub message: String,
    /// Whether resubmitting the same text may succeed.
    pub recoverable: bool,
    /// The retracted participant text, for resubmission.
    pub user_text: String,
}

/// How a started turn ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Completed {
        view: InterviewView,
        end_reason: Option<EndReason>,
    },
    Failed {
        failure: TurnFailure,
        view: InterviewView,
    },
}

enum StreamFailure {
    Provider(AIError),
    Empty,
}

impl StreamFailure {
    fn into_turn_failure(self, user_text: String) -> TurnFailure {
        match self {
            StreamFailure::Provider(err) => TurnFailure {
                kind: err.kind().to_string(),
                message: err.to_string(),
                recoverable: err.is_retryable(),
                user_text,
            },
            StreamFailure::Empty => TurnFailure {
                kind: "empty_completion".to_string(),
                message: InterviewError::EmptyCompletion.to_string(),
                recoverable: true,
                user_text,
            },
        }
    }
}

/// Handler for participant turns.
pub struct SendMessageHandler {
    store: Arc<dyn InterviewStore>,
    provider: Arc<dyn AIProvider>,
    logger: Arc<dyn ChatLogger>,
    end_check: EndCheck,
}

impl SendMessageHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        provider: Arc<dyn AIProvider>,
        logger: Arc<dyn ChatLogger>,
        end_check: EndCheck,
    ) -> Self {
        Self {
            store,
            provider,
            logger,
            end_check,
        }
    }

    /// Runs one turn, publishing a snapshot to `updates` after the user text
    /// is appended and after every streamed fragment.
    ///
    /// A dropped receiver does not cancel the turn.
    pub async fn handle(
        &self,
        cmd: SendMessageCommand,
        updates: &mpsc::Sender<InterviewView>,
    ) -> Result<TurnOutcome, SendMessageError> {
        let shared = self.store.get(&cmd.interview_id).await?;

        // 1. Optimistic append of the pending pair
        let (turn, session_id, snapshot) = {
            let mut interview = shared.lock().await;
            let turn = interview.begin_turn(&cmd.content)?;
            (
                turn,
                interview.request().session_id.clone(),
                InterviewView::from(&*interview),
            )
        };
        let _ = updates.send(snapshot).await;

        tracing::debug!(
            interview_id = %cmd.interview_id,
            session = %session_id,
            history = turn.messages.len(),
            "Turn started"
        );

        // 2. Stream the reply
        let completed = match self
            .stream_reply(&shared, cmd.interview_id, &session_id, turn, updates)
            .await
        {
            Ok(completed) => completed,
            Err(failure) => return self.retract(&shared, cmd.interview_id, failure).await,
        };

        // 3. Durable log, user before bot
        self.log(&session_id, LogRole::User, &completed.user_text).await;
        self.log(&session_id, LogRole::Bot, &completed.bot_text).await;

        // 4. End-of-interview evaluation
        let mut interview = shared.lock().await;
        let outcome = interview.complete_turn(&self.end_check)?;
        let view = InterviewView::from(&*interview);
        drop(interview);

        if let Some(reason) = outcome.reason {
            tracing::info!(
                interview_id = %cmd.interview_id,
                session = %session_id,
                ?reason,
                turns = view.transcript.len(),
                "Interview ended"
            );
        }

        Ok(TurnOutcome::Completed {
            view,
            end_reason: outcome.reason,
        })
    }

    async fn stream_reply(
        &self,
        shared: &SharedInterview,
        interview_id: InterviewId,
        session_id: &SessionId,
        turn: TurnRequest,
        updates: &mpsc::Sender<InterviewView>,
    ) -> Result<CompletedTurn, StreamFailure> {
        let request = CompletionRequest::new(RequestMetadata::new(interview_id, session_id.clone()))
            .with_messages(turn.messages)
            .with_model(turn.model_args.model)
            .with_temperature(turn.model_args.temperature);

        let mut stream = self
            .provider
            .stream_complete(request)
            .await
            .map_err(StreamFailure::Provider)?;

        while let Some(item) = stream.next().await {
            let chunk = item.map_err(StreamFailure::Provider)?;
            if chunk.delta.is_empty() {
                continue;
            }
            let snapshot = {
                let mut interview = shared.lock().await;
                interview
                    .append_fragment(&chunk.delta)
                    .map_err(|_| StreamFailure::Empty)?;
                InterviewView::from(&*interview)
            };
            let _ = updates.send(snapshot).await;
        }

        let interview = shared.lock().await;
        interview.completed_turn().map_err(|_| StreamFailure::Empty)
    }

    async fn retract(
        &self,
        shared: &SharedInterview,
        interview_id: InterviewId,
        failure: StreamFailure,
    ) -> Result<TurnOutcome, SendMessageError> {
        let mut interview = shared.lock().await;
        let user_text = interview.fail_turn()?;
        let view = InterviewView::from(&*interview);
        drop(interview);

        let failure = failure.into_turn_failure(user_text);
        tracing::warn!(
            interview_id = %interview_id,
            kind = %failure.kind,
            error = %failure.message,
            "Turn failed, pending message retracted"
        );
        Ok(TurnOutcome::Failed { failure, view })
    }

    async fn log(&self, session: &SessionId, role: LogRole, message: &str) {
        let entry = LogEntry::now(session.clone(), role, message);
        if let Err(e) = self.logger.append(&entry).await {
            tracing::error!(session = %session, ?role, error = %e, "Failed to write chat log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::chat_log::InMemoryChatLogger;
    use crate::adapters::storage::InMemoryInterviewStore;
    use crate::domain::interview::{
        Interview, InterviewSession, InterviewStatus, ModelArgs, Role, SessionRequest, TurnPair,
    };

    struct Fixture {
        store: Arc<InMemoryInterviewStore>,
        provider: Arc<MockAIProvider>,
        logger: Arc<InMemoryChatLogger>,
        handler: SendMessageHandler,
        id: InterviewId,
    }

    async fn fixture_with(
        provider: MockAIProvider,
        logger: InMemoryChatLogger,
        end_check: EndCheck,
    ) -> Fixture {
        let store = Arc::new(InMemoryInterviewStore::new());
        let provider = Arc::new(provider);
        let logger = Arc::new(logger);

        let request = SessionRequest::from_params(
            Some("u1".into()),
            Some("s1".into()),
            None,
            Some("2".into()),
        )
        .unwrap();
        let mut interview = Interview::new(InterviewId::new(), request.clone());
        interview
            .start(InterviewSession {
                user_id: request.user_id,
                session_id: request.session_id,
                question_wording: "How satisfied were you?".into(),
                response_text: "High".into(),
                initial_message: "Why did you answer High?".into(),
                system_message: "You are an interviewer.".into(),
                model_args: ModelArgs::default(),
            })
            .unwrap();
        let id = *interview.id();
        store.insert(interview).await.unwrap();

        let handler = SendMessageHandler::new(
            store.clone(),
            provider.clone(),
            logger.clone(),
            end_check,
        );
        Fixture {
            store,
            provider,
            logger,
            handler,
            id,
        }
    }

    async fn fixture(provider: MockAIProvider) -> Fixture {
        fixture_with(provider, InMemoryChatLogger::new(), EndCheck::default()).await
    }

    async fn send(f: &Fixture, text: &str) -> (Result<TurnOutcome, SendMessageError>, Vec<InterviewView>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = f.handler.handle(SendMessageCommand::new(f.id, text), &tx).await;
        drop(tx);
        let mut snapshots = Vec::new();
        while let Some(view) = rx.recv().await {
            snapshots.push(view);
        }
        (result, snapshots)
    }

    async fn status(f: &Fixture) -> InterviewStatus {
        f.store.get(&f.id).await.unwrap().lock().await.status()
    }

    #[tokio::test]
    async fn completed_turn_streams_snapshots_and_logs_both_roles() {
        let f = fixture(MockAIProvider::new().with_response("Could you say more?")).await;

        let (result, snapshots) = send(&f, "It was quick").await;

        let view = match result.unwrap() {
            TurnOutcome::Completed { view, end_reason } => {
                assert!(end_reason.is_none());
                view
            }
            other => panic!("expected completion, got {:?}", other),
        };
        assert_eq!(view.status, InterviewStatus::Active);
        assert!(view.controls.input_enabled);
        assert_eq!(
            view.transcript.last(),
            Some(&TurnPair::new(
                Some("It was quick".into()),
                Some("Could you say more?".into())
            ))
        );

        // pending append, then one snapshot per fragment ("Could ", "you ", "say ", "more?")
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[0].transcript.last().unwrap().bot, None);
        assert!(!snapshots[0].controls.input_enabled);
        assert_eq!(
            snapshots[2].transcript.last().unwrap().bot.as_deref(),
            Some("Could you ")
        );

        let entries = f.logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, LogRole::User);
        assert_eq!(entries[0].message, "It was quick");
        assert_eq!(entries[1].role, LogRole::Bot);
        assert_eq!(entries[1].message, "Could you say more?");
    }

    #[tokio::test]
    async fn completion_request_carries_system_history_and_user_message() {
        let f = fixture(MockAIProvider::new()).await;

        send(&f, "It was quick").await.0.unwrap();

        let calls = f.provider.get_calls();
        assert_eq!(calls.len(), 1);
        let roles: Vec<Role> = calls[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(calls[0].messages[0].content, "You are an interviewer.");
        assert_eq!(calls[0].messages[1].content, "Why did you answer High?");
        assert_eq!(calls[0].messages[2].content, "It was quick");
        assert_eq!(calls[0].model, "gpt-4o-default");
        assert_eq!(calls[0].temperature, Some(0.0));
    }

    #[tokio::test]
    async fn sentinel_ends_interview_and_is_stripped_from_display_only() {
        let f = fixture(
            MockAIProvider::new().with_response("Thanks, that's everything.<end_of_survey>"),
        )
        .await;

        let (result, _) = send(&f, "Nothing else").await;

        match result.unwrap() {
            TurnOutcome::Completed { view, end_reason } => {
                assert_eq!(end_reason, Some(EndReason::Sentinel));
                assert_eq!(view.status, InterviewStatus::Ended);
                assert!(view.controls.exit_visible);
                assert!(!view.controls.input_visible);
                assert_eq!(
                    view.transcript.last().unwrap().bot.as_deref(),
                    Some("Thanks, that's everything.")
                );
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(
            f.logger.entries()[1].message,
            "Thanks, that's everything.<end_of_survey>"
        );
    }

    #[tokio::test]
    async fn turn_limit_ends_interview() {
        let f = fixture_with(
            MockAIProvider::new().with_response("One").with_response("Two"),
            InMemoryChatLogger::new(),
            EndCheck::new(3, "<end_of_survey>"),
        )
        .await;

        send(&f, "first").await.0.unwrap();
        assert_eq!(status(&f).await, InterviewStatus::Active);

        match send(&f, "second").await.0.unwrap() {
            TurnOutcome::Completed { end_reason, .. } => {
                assert_eq!(end_reason, Some(EndReason::TurnLimit))
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(status(&f).await, InterviewStatus::Ended);
    }

    #[tokio::test]
    async fn provider_error_retracts_pending_pair_without_logging() {
        let f = fixture(MockAIProvider::new().with_error(MockError::RateLimited {
            retry_after_secs: 5,
        }))
        .await;

        let (result, _) = send(&f, "It was quick").await;

        match result.unwrap() {
            TurnOutcome::Failed { failure, view } => {
                assert_eq!(failure.kind, "rate_limited");
                assert!(failure.recoverable);
                assert_eq!(failure.user_text, "It was quick");
                assert_eq!(view.transcript.len(), 1);
                assert!(view.controls.input_enabled);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(status(&f).await, InterviewStatus::Active);
        assert!(f.logger.entries().is_empty());
    }

    #[tokio::test]
    async fn broken_stream_retracts_partial_reply() {
        let f = fixture(MockAIProvider::new().with_broken_stream(
            "Could you ",
            MockError::Network {
                message: "connection reset".into(),
            },
        ))
        .await;

        let (result, snapshots) = send(&f, "It was quick").await;

        match result.unwrap() {
            TurnOutcome::Failed { failure, view } => {
                assert_eq!(failure.kind, "network");
                assert_eq!(view.transcript.len(), 1);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(snapshots.len() > 1);
        assert!(f.logger.entries().is_empty());
    }

    #[tokio::test]
    async fn empty_completion_is_a_failed_turn() {
        let f = fixture(MockAIProvider::new().with_response("")).await;

        match send(&f, "Hello").await.0.unwrap() {
            TurnOutcome::Failed { failure, .. } => {
                assert_eq!(failure.kind, "empty_completion");
                assert_eq!(failure.user_text, "Hello");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(f.logger.entries().is_empty());
    }

    #[tokio::test]
    async fn submission_while_turn_pending_is_rejected() {
        let f = fixture(MockAIProvider::new()).await;
        {
            let shared = f.store.get(&f.id).await.unwrap();
            shared.lock().await.begin_turn("first").unwrap();
        }

        let (result, snapshots) = send(&f, "second").await;

        let err = result.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TurnInProgress);
        assert!(snapshots.is_empty());
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let f = fixture(MockAIProvider::new()).await;
        let err = send(&f, "   ").await.0.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn submission_after_end_is_rejected() {
        let f = fixture(MockAIProvider::new().with_response("Bye<end_of_survey>")).await;
        send(&f, "done").await.0.unwrap();

        let err = send(&f, "one more").await.0.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InterviewEnded);
    }

    #[tokio::test]
    async fn log_failure_does_not_fail_the_turn() {
        let f = fixture_with(
            MockAIProvider::new().with_response("Noted."),
            InMemoryChatLogger::failing(),
            EndCheck::default(),
        )
        .await;

        assert!(matches!(
            send(&f, "Hi").await.0.unwrap(),
            TurnOutcome::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_interview_is_not_found() {
        let f = fixture(MockAIProvider::new()).await;
        let (tx, _rx) = mpsc::channel(1);
        let err = f
            .handler
            .handle(SendMessageCommand::new(InterviewId::new(), "Hi"), &tx)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InterviewNotFound);
    }
}
