//! Interview lifecycle status.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Interview lifecycle: NotStarted → Active → Ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    #[default]
    NotStarted,
    Active,
    Ended,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::NotStarted => "not_started",
            InterviewStatus::Active => "active",
            InterviewStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for InterviewStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (InterviewStatus::NotStarted, InterviewStatus::Active)
                | (InterviewStatus::Active, InterviewStatus::Ended)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            InterviewStatus::NotStarted => vec![InterviewStatus::Active],
            InterviewStatus::Active => vec![InterviewStatus::Ended],
            InterviewStatus::Ended => vec![],
        }
    }
}
