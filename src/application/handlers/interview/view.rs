//! Client-facing snapshot of an interview.

use serde::Serialize;

use crate::domain::foundation::InterviewId;
use crate::domain::interview::{Controls, Interview, InterviewStatus, Transcript};

/// What a client needs to render an interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewView {
    pub interview_id: InterviewId,
    pub status: InterviewStatus,
    pub transcript: Transcript,
    pub controls: Controls,
    pub completion_message: Option<String>,
}

impl From<&Interview> for InterviewView {
    fn from(interview: &Interview) -> Self {
        Self {
            interview_id: *interview.id(),
            status: interview.status(),
            transcript: interview.transcript().clone(),
            controls: interview.controls(),
            completion_message: interview.completion_message(),
        }
    }
}
