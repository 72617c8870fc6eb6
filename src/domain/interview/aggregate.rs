//! Interview aggregate.
//!
//! Owns one participant's transcript and walks it through the
//! NotStarted → Active → Ended lifecycle.
//!
//! # Turn protocol
//!
//! A turn is driven by the application layer in small steps so the
//! aggregate is never locked across the completion call:
//!
//! 1. `begin_turn` appends the pending pair and returns the completion request
//! 2. `append_fragment` is called for every streamed fragment
//! 3. `completed_turn` reads the finished texts for logging
//! 4. `complete_turn` runs the end check and releases the turn
//!
//! `fail_turn` retracts the pending pair instead of steps 3-4.

use super::{
    pairs_to_flat, ChatMessage, CompletionCode, EndCheck, EndOutcome, EndReason,
    InterviewError, InterviewSession, InterviewStatus, ModelArgs, SessionRequest, Transcript,
};
use crate::domain::foundation::{InterviewId, StateMachine, Timestamp};
use serde::Serialize;

/// Maximum length of a participant message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Completion request assembled for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// System message, flattened history, then the new user message.
    pub messages: Vec<ChatMessage>,
    pub model_args: ModelArgs,
}

/// Texts of a finished turn, as streamed (before sentinel stripping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTurn {
    pub user_text: String,
    pub bot_text: String,
}

/// Which interface affordances are visible for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_visible: bool,
    pub input_visible: bool,
    pub input_enabled: bool,
    pub exit_visible: bool,
}

/// One live interview.
///
/// # Invariants
///
/// - `session` is set once the interview is Active
/// - at most one turn is pending, and only while Active
/// - `completion_code` is only set once Ended
#[derive(Debug, Clone)]
pub struct Interview {
    id: InterviewId,
    request: SessionRequest,
    session: Option<InterviewSession>,
    status: InterviewStatus,
    transcript: Transcript,
    turn_pending: bool,
    end_reason: Option<EndReason>,
    completion_code: Option<CompletionCode>,
    created_at: Timestamp,
}

impl Interview {
    /// Creates a NotStarted interview for the given request parameters.
    pub fn new(id: InterviewId, request: SessionRequest) -> Self {
        Self {
            id,
            request,
            session: None,
            status: InterviewStatus::NotStarted,
            transcript: Transcript::new(),
            turn_pending: false,
            end_reason: None,
            completion_code: None,
            created_at: Timestamp::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &InterviewId {
        &self.id
    }

    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn session(&self) -> Option<&InterviewSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> InterviewStatus {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_turn_pending(&self) -> bool {
        self.turn_pending
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn completion_code(&self) -> Option<&CompletionCode> {
        self.completion_code.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Participant-facing completion message, once a code was issued.
    pub fn completion_message(&self) -> Option<String> {
        self.completion_code.as_ref().map(CompletionCode::message)
    }

    pub fn controls(&self) -> Controls {
        let active = self.status == InterviewStatus::Active;
        Controls {
            start_visible: self.status == InterviewStatus::NotStarted,
            input_visible: active,
            input_enabled: active && !self.turn_pending,
            exit_visible: self.status == InterviewStatus::Ended,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Switches to interactive mode with the initial message as the first
    /// bot utterance.
    pub fn start(&mut self, session: InterviewSession) -> Result<(), InterviewError> {
        self.transition(InterviewStatus::Active, "start")?;
        self.transcript = Transcript::opening(session.initial_message.clone());
        self.session = Some(session);
        Ok(())
    }

    /// Appends the user's text as a pending pair and builds the completion
    /// request from the system message and the history before it.
    pub fn begin_turn(&mut self, text: &str) -> Result<TurnRequest, InterviewError> {
        self.ensure_status(InterviewStatus::Active, "send a message")?;
        if self.turn_pending {
            return Err(InterviewError::TurnInProgress);
        }
        if text.trim().is_empty() {
            return Err(InterviewError::EmptyMessage);
        }
        if text.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(InterviewError::MessageTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| InterviewError::invalid_state("send a message", self.status))?;

        let mut messages = Vec::with_capacity(self.transcript.len() * 2 + 2);
        messages.push(ChatMessage::system(session.system_message.clone()));
        messages.extend(pairs_to_flat(self.transcript.pairs()));
        messages.push(ChatMessage::user(text));
        let model_args = session.model_args.clone();

        self.transcript.push_user(text);
        self.turn_pending = true;

        Ok(TurnRequest {
            messages,
            model_args,
        })
    }

    /// Appends a streamed fragment to the pending bot reply.
    pub fn append_fragment(&mut self, fragment: &str) -> Result<(), InterviewError> {
        if !self.turn_pending {
            return Err(InterviewError::NoPendingTurn);
        }
        self.transcript.append_to_last_bot(fragment);
        Ok(())
    }

    /// Returns the finished user and bot texts of the pending turn.
    ///
    /// # Errors
    ///
    /// - `NoPendingTurn` if no turn is in flight
    /// - `EmptyCompletion` if the bot reply has no content
    pub fn completed_turn(&self) -> Result<CompletedTurn, InterviewError> {
        if !self.turn_pending {
            return Err(InterviewError::NoPendingTurn);
        }
        let pair = self.transcript.last().ok_or(InterviewError::NoPendingTurn)?;
        let bot_text = pair
            .bot
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or(InterviewError::EmptyCompletion)?;
        Ok(CompletedTurn {
            user_text: pair.user.clone().unwrap_or_default(),
            bot_text,
        })
    }

    /// Releases the pending turn and evaluates the end conditions, stripping
    /// the sentinel from the displayed reply.
    pub fn complete_turn(&mut self, check: &EndCheck) -> Result<EndOutcome, InterviewError> {
        let turn = self.completed_turn()?;
        let outcome = check.evaluate(self.transcript.len(), &turn.bot_text);

        if outcome.display_text != turn.bot_text {
            self.transcript.set_last_bot(outcome.display_text.clone());
        }
        self.turn_pending = false;

        if let Some(reason) = outcome.reason {
            self.transition(InterviewStatus::Ended, "end")?;
            self.end_reason = Some(reason);
        }
        Ok(outcome)
    }

    /// Retracts the pending pair, returning the user's text.
    pub fn fail_turn(&mut self) -> Result<String, InterviewError> {
        if !self.turn_pending {
            return Err(InterviewError::NoPendingTurn);
        }
        let pair = self.transcript.pop_last().ok_or(InterviewError::NoPendingTurn)?;
        self.turn_pending = false;
        Ok(pair.user.unwrap_or_default())
    }

    /// Fails unless the interview has ended.
    pub fn ensure_can_exit(&self) -> Result<(), InterviewError> {
        self.ensure_status(InterviewStatus::Ended, "exit")
    }

    /// Records the completion code. A code issued earlier is kept.
    pub fn issue_completion_code(
        &mut self,
        code: CompletionCode,
    ) -> Result<&CompletionCode, InterviewError> {
        self.ensure_can_exit()?;
        Ok(self.completion_code.get_or_insert(code))
    }

    fn ensure_status(
        &self,
        expected: InterviewStatus,
        action: &'static str,
    ) -> Result<(), InterviewError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(InterviewError::invalid_state(action, self.status))
        }
    }

    fn transition(
        &mut self,
        target: InterviewStatus,
        action: &'static str,
    ) -> Result<(), InterviewError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| InterviewError::invalid_state(action, self.status))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::interview::{Role, TurnPair};

    fn session() -> InterviewSession {
        InterviewSession {
            user_id: UserId::new("u1").unwrap(),
            session_id: SessionId::new("s1").unwrap(),
            question_wording: "How satisfied were you?".to_string(),
            response_text: "High".to_string(),
            initial_message: "Why did you pick High?".to_string(),
            system_message: "You are an interviewer.".to_string(),
            model_args: ModelArgs::default(),
        }
    }

    fn active() -> Interview {
        let request = SessionRequest::from_params(None, None, None, None).unwrap();
        let mut interview = Interview::new(InterviewId::new(), request);
        interview.start(session()).unwrap();
        interview
    }

    fn run_turn(interview: &mut Interview, user: &str, bot: &str, check: &EndCheck) -> EndOutcome {
        interview.begin_turn(user).unwrap();
        interview.append_fragment(bot).unwrap();
        interview.complete_turn(check).unwrap()
    }

    #[test]
    fn new_interview_is_not_started() {
        let request = SessionRequest::from_params(None, None, None, None).unwrap();
        let interview = Interview::new(InterviewId::new(), request);
        assert_eq!(interview.status(), InterviewStatus::NotStarted);
        assert!(interview.transcript().is_empty());
        assert!(interview.controls().start_visible);
        assert!(!interview.controls().input_visible);
    }

    #[test]
    fn start_renders_initial_message_as_first_bot_turn() {
        let interview = active();
        assert_eq!(interview.status(), InterviewStatus::Active);
        assert_eq!(
            interview.transcript().pairs(),
            &[TurnPair::bot_only("Why did you pick High?")]
        );
        let controls = interview.controls();
        assert!(!controls.start_visible);
        assert!(controls.input_visible && controls.input_enabled);
        assert!(!controls.exit_visible);
    }

    #[test]
    fn start_twice_fails() {
        let mut interview = active();
        assert!(matches!(
            interview.start(session()),
            Err(InterviewError::InvalidState { .. })
        ));
    }

    #[test]
    fn begin_turn_builds_request_from_prior_history() {
        let mut interview = active();
        let request = interview.begin_turn("Because it was fast").unwrap();

        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(request.messages[0].content, "You are an interviewer.");
        assert_eq!(request.messages[1].content, "Why did you pick High?");
        assert_eq!(request.messages[2].content, "Because it was fast");
        assert_eq!(request.model_args, ModelArgs::default());

        assert!(interview.is_turn_pending());
        assert!(!interview.controls().input_enabled);
        assert_eq!(interview.transcript().len(), 2);
    }

    #[test]
    fn second_submission_while_pending_is_rejected() {
        let mut interview = active();
        interview.begin_turn("first").unwrap();
        assert_eq!(
            interview.begin_turn("second"),
            Err(InterviewError::TurnInProgress)
        );
        assert_eq!(interview.transcript().len(), 2);
    }

    #[test]
    fn empty_and_oversized_submissions_are_rejected() {
        let mut interview = active();
        assert_eq!(interview.begin_turn("   "), Err(InterviewError::EmptyMessage));
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            interview.begin_turn(&long),
            Err(InterviewError::MessageTooLong { .. })
        ));
        assert_eq!(interview.transcript().len(), 1);
    }

    #[test]
    fn submission_before_start_is_rejected() {
        let request = SessionRequest::from_params(None, None, None, None).unwrap();
        let mut interview = Interview::new(InterviewId::new(), request);
        assert!(matches!(
            interview.begin_turn("hi"),
            Err(InterviewError::InvalidState { .. })
        ));
    }

    #[test]
    fn fragments_fill_pending_bot_slot() {
        let mut interview = active();
        interview.begin_turn("hi").unwrap();
        interview.append_fragment("Hello ").unwrap();
        interview.append_fragment("there").unwrap();
        let turn = interview.completed_turn().unwrap();
        assert_eq!(turn.user_text, "hi");
        assert_eq!(turn.bot_text, "Hello there");
    }

    #[test]
    fn append_without_pending_turn_fails() {
        let mut interview = active();
        assert_eq!(
            interview.append_fragment("x"),
            Err(InterviewError::NoPendingTurn)
        );
    }

    #[test]
    fn completing_turn_keeps_interview_active_below_limit() {
        let mut interview = active();
        let outcome = run_turn(&mut interview, "hi", "Tell me more.", &EndCheck::default());
        assert!(!outcome.ended());
        assert_eq!(interview.status(), InterviewStatus::Active);
        assert!(interview.controls().input_enabled);
    }

    #[test]
    fn sentinel_ends_interview_and_is_stripped_from_display() {
        let mut interview = active();
        let outcome = run_turn(
            &mut interview,
            "that's all",
            "Thanks, that's everything.<end_of_survey>",
            &EndCheck::default(),
        );
        assert!(outcome.ended());
        assert_eq!(interview.status(), InterviewStatus::Ended);
        assert_eq!(interview.end_reason(), Some(EndReason::Sentinel));
        assert_eq!(
            interview.transcript().last().unwrap().bot.as_deref(),
            Some("Thanks, that's everything.")
        );
        let controls = interview.controls();
        assert!(!controls.input_visible);
        assert!(controls.exit_visible);
    }

    #[test]
    fn turn_limit_ends_interview() {
        let mut interview = active();
        let check = EndCheck::new(3, "<end_of_survey>");
        run_turn(&mut interview, "a", "b", &check);
        assert_eq!(interview.status(), InterviewStatus::Active);
        run_turn(&mut interview, "c", "d", &check);
        assert_eq!(interview.status(), InterviewStatus::Ended);
        assert_eq!(interview.end_reason(), Some(EndReason::TurnLimit));
    }

    #[test]
    fn empty_completion_cannot_be_completed() {
        let mut interview = active();
        interview.begin_turn("hi").unwrap();
        assert_eq!(
            interview.complete_turn(&EndCheck::default()),
            Err(InterviewError::EmptyCompletion)
        );
        assert!(interview.is_turn_pending());
    }

    #[test]
    fn fail_turn_retracts_only_the_pending_pair() {
        let mut interview = active();
        interview.begin_turn("hi").unwrap();
        interview.append_fragment("partial").unwrap();

        assert_eq!(interview.fail_turn().unwrap(), "hi");
        assert!(!interview.is_turn_pending());
        assert_eq!(interview.status(), InterviewStatus::Active);
        assert_eq!(
            interview.transcript().pairs(),
            &[TurnPair::bot_only("Why did you pick High?")]
        );
    }

    #[test]
    fn no_turns_accepted_after_end() {
        let mut interview = active();
        run_turn(&mut interview, "a", "bye<end_of_survey>", &EndCheck::default());
        let err = interview.begin_turn("more").unwrap_err();
        assert_eq!(err.code(), crate::domain::foundation::ErrorCode::InterviewEnded);
    }

    #[test]
    fn exit_requires_ended_state() {
        let mut interview = active();
        assert!(interview.ensure_can_exit().is_err());
        assert!(interview
            .issue_completion_code(CompletionCode::generate("cd-"))
            .is_err());
    }

    #[test]
    fn completion_code_is_issued_once() {
        let mut interview = active();
        run_turn(&mut interview, "a", "bye<end_of_survey>", &EndCheck::default());

        let first = interview
            .issue_completion_code(CompletionCode::generate("cd-"))
            .unwrap()
            .clone();
        let second = interview
            .issue_completion_code(CompletionCode::generate("cd-"))
            .unwrap()
            .clone();
        assert_eq!(first, second);
        assert!(interview
            .completion_message()
            .unwrap()
            .contains(first.as_str()));
    }
}
