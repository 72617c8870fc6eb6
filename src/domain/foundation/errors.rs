//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes surfaced to API clients, organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidIdentifier,

    // Session initialization errors
    UnknownQuestion,
    ResponseOutOfRange,
    AssetUnavailable,
    TemplateMismatch,

    // Not found errors
    InterviewNotFound,

    // State errors
    InvalidStateTransition,
    TurnInProgress,
    InterviewEnded,

    // Authorization errors
    Unauthorized,

    // Upstream errors
    AIProviderError,
    ArchiveFailed,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorCode::UnknownQuestion => "UNKNOWN_QUESTION",
            ErrorCode::ResponseOutOfRange => "RESPONSE_OUT_OF_RANGE",
            ErrorCode::AssetUnavailable => "ASSET_UNAVAILABLE",
            ErrorCode::TemplateMismatch => "TEMPLATE_MISMATCH",
            ErrorCode::InterviewNotFound => "INTERVIEW_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::TurnInProgress => "TURN_IN_PROGRESS",
            ErrorCode::InterviewEnded => "INTERVIEW_ENDED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::AIProviderError => "AI_PROVIDER_ERROR",
            ErrorCode::ArchiveFailed => "ARCHIVE_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
