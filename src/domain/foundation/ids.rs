//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Maximum length of a participant-supplied identifier.
const MAX_EXTERNAL_ID_LEN: usize = 128;

/// Checks an identifier that arrives from the survey tool's query string.
///
/// Session ids name log files and archive blobs, so every external id must be
/// a single safe path segment.
fn validate_external_id(field: &str, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if id.len() > MAX_EXTERNAL_ID_LEN {
        return Err(ValidationError::invalid_format(
            field,
            format!("longer than {} characters", MAX_EXTERNAL_ID_LEN),
        ));
    }
    if id == "." || id == ".." {
        return Err(ValidationError::invalid_format(field, "reserved path segment"));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ValidationError::invalid_format(
            field,
            format!("contains '{}'", bad),
        ));
    }
    Ok(())
}

/// Participant identifier passed in by the survey tool (`user` parameter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty or unsafe.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_external_id("user", &id)?;
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Survey session identifier (`session` parameter).
///
/// Keys the chat log file and the archived transcript object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId, returning error if empty or unsafe.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_external_id("session", &id)?;
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side handle for one live interview (one browser session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewId(Uuid);

impl InterviewId {
    /// Creates a new random InterviewId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an InterviewId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InterviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InterviewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
