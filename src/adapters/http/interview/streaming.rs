//! WebSocket message types for the interview stream.
//!
//! - Client → Server: SendMessage, Ping
//! - Server → Client: TranscriptUpdate, TurnComplete, TurnFailed, Error, Pong

use serde::{Deserialize, Serialize};

use crate::application::{InterviewView, TurnFailure};
use crate::domain::interview::EndReason;

// ════════════════════════════════════════════════════════════════════════════════
// Client → Server Messages
// ════════════════════════════════════════════════════════════════════════════════

/// All message types that can be received from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamClientMessage {
    /// Submit a participant message.
    SendMessage { content: String },
    /// Heartbeat ping.
    Ping,
}

// ════════════════════════════════════════════════════════════════════════════════
// Server → Client Messages
// ════════════════════════════════════════════════════════════════════════════════

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamServerMessage {
    /// Snapshot after the user text was appended or a fragment arrived.
    TranscriptUpdate { view: InterviewView },
    /// The turn finished; `view` is final for this turn.
    TurnComplete {
        view: InterviewView,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_reason: Option<EndReason>,
    },
    /// The turn was retracted.
    TurnFailed {
        #[serde(flatten)]
        failure: TurnFailure,
        view: InterviewView,
    },
    /// The submission was rejected or the client sent something invalid.
    Error { code: String, message: String },
    /// Heartbeat response.
    Pong { timestamp: String },
}
