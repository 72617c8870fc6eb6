//! Survey question records.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// A survey question and its ordered answer choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub choices: Vec<String>,
}

impl QuestionRecord {
    /// Selects the choice at the index given by `response`.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if `response` is not a non-negative integer
    /// - `OutOfRange` if the index has no matching choice
    pub fn select_choice(&self, response: &str) -> Result<&str, ValidationError> {
        let index: i64 = response.trim().parse().map_err(|_| {
            ValidationError::invalid_format("response", format!("'{}' is not an integer", response))
        })?;

        usize::try_from(index)
            .ok()
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                ValidationError::out_of_range(
                    "response",
                    0,
                    self.choices.len() as i64 - 1,
                    index,
                )
            })
    }
}
