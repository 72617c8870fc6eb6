//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal transitions once and get validated
/// transitions and terminal-state detection for free.
///
/// ```ignore
/// let next = InterviewStatus::Active.transition_to(InterviewStatus::Ended)?;
/// assert!(next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        Warming,
        On,
        Burnt,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Off => vec![Warming],
                Warming => vec![On, Burnt],
                On => vec![Off, Burnt],
                Burnt => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_target() {
        assert_eq!(Light::Off.transition_to(Light::Warming), Ok(Light::Warming));
    }

    #[test]
    fn transition_to_reports_both_states_on_failure() {
        let err = Light::Off.transition_to(Light::On).unwrap_err();
        assert!(err.to_string().contains("Off"));
        assert!(err.to_string().contains("On"));
    }

    #[test]
    fn only_states_without_exits_are_terminal() {
        assert!(Light::Burnt.is_terminal());
        assert!(!Light::Off.is_terminal());
        assert!(!Light::On.is_terminal());
    }
}
