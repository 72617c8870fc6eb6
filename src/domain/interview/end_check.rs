//! End-of-interview detection.

use serde::Serialize;

pub const DEFAULT_TURN_LIMIT: usize = 20;
pub const DEFAULT_END_SENTINEL: &str = "<end_of_survey>";

/// Why an interview ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TurnLimit,
    Sentinel,
    /// Both conditions held on the same turn.
    TurnLimitAndSentinel,
}

/// Result of evaluating the end conditions after a bot turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOutcome {
    /// Bot message as it should be displayed (sentinel removed).
    pub display_text: String,
    pub reason: Option<EndReason>,
}

impl EndOutcome {
    pub fn ended(&self) -> bool {
        self.reason.is_some()
    }
}

/// Turn-count limit plus sentinel substring. The two conditions are
/// independent and both are checked on every turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndCheck {
    turn_limit: usize,
    sentinel: String,
}

impl EndCheck {
    pub fn new(turn_limit: usize, sentinel: impl Into<String>) -> Self {
        Self {
            turn_limit,
            sentinel: sentinel.into(),
        }
    }

    pub fn turn_limit(&self) -> usize {
        self.turn_limit
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Evaluates a transcript of `transcript_len` pairs whose last bot
    /// message is `last_bot`.
    pub fn evaluate(&self, transcript_len: usize, last_bot: &str) -> EndOutcome {
        let limit_hit = transcript_len >= self.turn_limit;
        let sentinel_hit = !self.sentinel.is_empty() && last_bot.contains(&self.sentinel);

        let display_text = if sentinel_hit {
            last_bot.replace(&self.sentinel, "")
        } else {
            last_bot.to_string()
        };

        let reason = match (limit_hit, sentinel_hit) {
            (true, true) => Some(EndReason::TurnLimitAndSentinel),
            (true, false) => Some(EndReason::TurnLimit),
            (false, true) => Some(EndReason::Sentinel),
            (false, false) => None,
        };

        EndOutcome {
            display_text,
            reason,
        }
    }
}

impl Default for EndCheck {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_LIMIT, DEFAULT_END_SENTINEL)
    }
}
