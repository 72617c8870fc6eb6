//! Conversion between the paired transcript and flat role-tagged messages.

use super::transcript::TurnPair;
use serde::{Deserialize, Serialize};

/// Role of a message sent to a completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Flattens turn pairs into user/assistant messages, skipping empty slots.
pub fn pairs_to_flat(pairs: &[TurnPair]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        if let Some(user) = pair.user.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::user(user));
        }
        if let Some(bot) = pair.bot.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::assistant(bot));
        }
    }
    messages
}

/// Groups flat messages back into turn pairs.
///
/// When the sequence does not open with a user message an empty user slot is
/// synthesized first. A trailing unpaired message becomes a pair without a
/// bot slot. Empty message content becomes an absent slot, so a pair like
/// `("", "x")` comes back as `(None, "x")`.
pub fn flat_to_pairs(messages: &[ChatMessage]) -> Vec<TurnPair> {
    let mut contents: Vec<Option<String>> = Vec::with_capacity(messages.len() + 1);
    if messages.first().map(|m| m.role) != Some(Role::User) && !messages.is_empty() {
        contents.push(None);
    }
    contents.extend(
        messages
            .iter()
            .map(|m| Some(m.content.clone()).filter(|c| !c.is_empty())),
    );

    contents
        .chunks(2)
        .map(|chunk| TurnPair::new(chunk[0].clone(), chunk.get(1).cloned().flatten()))
        .collect()
}
