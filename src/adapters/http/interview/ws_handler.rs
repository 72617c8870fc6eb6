//! WebSocket handler for interview turns.
//!
//! # Connection Flow
//! 1. Client requests the upgrade for an existing interview
//! 2. Client sends `send_message` with the participant text
//! 3. Server sends `transcript_update` after the text is appended and after
//!    every streamed fragment
//! 4. Server sends `turn_complete`, or `turn_failed` if the turn was retracted
//! 5. A rejected submission gets an `error` message
//!
//! A turn runs on its own task and finishes even if the client disconnects.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::application::{InterviewView, SendMessageCommand, TurnOutcome};
use crate::domain::foundation::{ErrorCode, InterviewId, Timestamp};

use super::dto::ApiError;
use super::handlers::{parse_interview_id, InterviewHandlers};
use super::streaming::{StreamClientMessage, StreamServerMessage};

/// Snapshots buffered between the turn task and the socket.
const UPDATE_BUFFER: usize = 32;

type WsSender = SplitSink<WebSocket, Message>;

// ════════════════════════════════════════════════════════════════════════════════
// WebSocket Upgrade Handler
// ════════════════════════════════════════════════════════════════════════════════

/// Handle WebSocket upgrade for interview streaming.
///
/// Route: `GET /api/interviews/:id/stream`
///
/// Unknown interviews are rejected with 404 before the upgrade.
pub async fn interview_ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(handlers): State<InterviewHandlers>,
) -> Response {
    let id = match parse_interview_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = handlers.get_handler.handle(id).await {
        return ApiError::from(e).into_response();
    }

    ws.on_upgrade(move |socket| handle_interview_socket(socket, id, handlers))
}

// ════════════════════════════════════════════════════════════════════════════════
// WebSocket Connection Handler
// ════════════════════════════════════════════════════════════════════════════════

async fn handle_interview_socket(socket: WebSocket, id: InterviewId, handlers: InterviewHandlers) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(interview_id = %id, "WebSocket connection established");

    while let Some(result) = receiver.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(interview_id = %id, error = %e, "WebSocket receive error");
                break;
            }
        };

        let open = match serde_json::from_str::<StreamClientMessage>(&text) {
            Ok(StreamClientMessage::SendMessage { content }) => {
                run_turn(&mut sender, &handlers, id, content).await
            }
            Ok(StreamClientMessage::Ping) => {
                let pong = StreamServerMessage::Pong {
                    timestamp: Timestamp::now().to_iso8601(),
                };
                send_server_message(&mut sender, &pong).await.is_ok()
            }
            Err(e) => {
                let error = StreamServerMessage::Error {
                    code: ErrorCode::ValidationFailed.to_string(),
                    message: format!("Invalid message: {}", e),
                };
                send_server_message(&mut sender, &error).await.is_ok()
            }
        };

        if !open {
            break;
        }
    }

    tracing::info!(interview_id = %id, "WebSocket connection closed");
}

/// Runs one turn, forwarding its snapshots. Returns false once the client is gone.
async fn run_turn(
    sender: &mut WsSender,
    handlers: &InterviewHandlers,
    id: InterviewId,
    content: String,
) -> bool {
    let (tx, mut rx) = mpsc::channel::<InterviewView>(UPDATE_BUFFER);
    let send_handler = handlers.send_handler.clone();
    let turn = tokio::spawn(async move {
        send_handler
            .handle(SendMessageCommand::new(id, content), &tx)
            .await
    });

    // Keep draining after a disconnect so the turn never blocks on a full buffer.
    let mut open = true;
    while let Some(view) = rx.recv().await {
        if open {
            let update = StreamServerMessage::TranscriptUpdate { view };
            open = send_server_message(sender, &update).await.is_ok();
        }
    }

    let message = match turn.await {
        Ok(Ok(TurnOutcome::Completed { view, end_reason })) => {
            StreamServerMessage::TurnComplete { view, end_reason }
        }
        Ok(Ok(TurnOutcome::Failed { failure, view })) => {
            StreamServerMessage::TurnFailed { failure, view }
        }
        Ok(Err(e)) => {
            let e = ApiError::from(e);
            StreamServerMessage::Error {
                code: e.code.to_string(),
                message: e.message,
            }
        }
        Err(e) => {
            tracing::error!(interview_id = %id, error = %e, "Turn task failed");
            StreamServerMessage::Error {
                code: ErrorCode::InternalError.to_string(),
                message: "Turn could not be completed".to_string(),
            }
        }
    };

    open && send_server_message(sender, &message).await.is_ok()
}

async fn send_server_message(
    sender: &mut WsSender,
    message: &StreamServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}
