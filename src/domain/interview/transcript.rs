//! Paired-turn transcript.

use serde::{Deserialize, Serialize};

/// One user utterance and the bot reply to it.
///
/// Serializes as a two-element array `[user, bot]`, either slot nullable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(Option<String>, Option<String>)",
    into = "(Option<String>, Option<String>)"
)]
pub struct TurnPair {
    pub user: Option<String>,
    pub bot: Option<String>,
}

impl TurnPair {
    pub fn new(user: Option<String>, bot: Option<String>) -> Self {
        Self { user, bot }
    }

    /// A pair that only carries a bot utterance (the opening message).
    pub fn bot_only(bot: impl Into<String>) -> Self {
        Self {
            user: None,
            bot: Some(bot.into()),
        }
    }
}

impl From<(Option<String>, Option<String>)> for TurnPair {
    fn from((user, bot): (Option<String>, Option<String>)) -> Self {
        Self { user, bot }
    }
}

impl From<TurnPair> for (Option<String>, Option<String>) {
    fn from(pair: TurnPair) -> Self {
        (pair.user, pair.bot)
    }
}

/// Ordered sequence of turn pairs.
///
/// # Invariants
///
/// - Only the last pair is ever mutated or removed
/// - A pair's user slot is set before its bot slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TurnPair>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Transcript whose only entry is the bot's opening message.
    pub fn opening(initial_message: impl Into<String>) -> Self {
        Self(vec![TurnPair::bot_only(initial_message)])
    }

    pub fn pairs(&self) -> &[TurnPair] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&TurnPair> {
        self.0.last()
    }

    /// Appends a new pair holding the user's text and an empty bot slot.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.0.push(TurnPair::new(Some(text.into()), None));
    }

    /// Appends a fragment to the bot slot of the last pair.
    ///
    /// Returns false when the transcript is empty.
    pub fn append_to_last_bot(&mut self, fragment: &str) -> bool {
        match self.0.last_mut() {
            Some(pair) => {
                pair.bot.get_or_insert_with(String::new).push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Replaces the bot slot of the last pair.
    pub fn set_last_bot(&mut self, text: impl Into<String>) -> bool {
        match self.0.last_mut() {
            Some(pair) => {
                pair.bot = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Removes and returns the last pair.
    pub fn pop_last(&mut self) -> Option<TurnPair> {
        self.0.pop()
    }
}

impl From<Vec<TurnPair>> for Transcript {
    fn from(pairs: Vec<TurnPair>) -> Self {
        Self(pairs)
    }
}
