//! Chat assistant endpoints
//!
//! The session lock is released while the assistant is called, so other
//! requests of the same visitor are not blocked by a slow gateway.

use axum::{extract::State, Json};
use mcn_common::chat::ChatMessage;
use mcn_common::{messages, Language};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::session::Visitor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub language: Language,
    /// Assistant reply for this turn; absent when the conversation was
    /// reset before the reply arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// GET /api/chat
pub async fn get_chat(visitor: Visitor) -> Json<ChatResponse> {
    let session = visitor.session.lock().await;
    Json(ChatResponse {
        language: session.language,
        reply: None,
        messages: session.chat.messages().to_vec(),
    })
}

/// POST /api/chat
///
/// On failure the visitor's message is withdrawn so it can be sent again.
pub async fn send_chat(
    State(state): State<AppState>,
    visitor: Visitor,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let text = req.message.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let (turn, language) = {
        let mut session = visitor.session.lock().await;
        (session.chat.begin_turn(text), session.language)
    };

    let result = state.chat.reply(&turn.history, language).await;

    let mut session = visitor.session.lock().await;
    match result {
        Ok(reply) => {
            let applied = session.chat.complete_turn(&turn, reply.clone());
            if !applied {
                debug!(session_id = %visitor.id, "Chat reply arrived after reset");
            }
            Ok(Json(ChatResponse {
                language: session.language,
                reply: applied.then_some(reply),
                messages: session.chat.messages().to_vec(),
            }))
        }
        Err(failure) => {
            warn!(session_id = %visitor.id, error = %failure, "Chat assistant failed");
            session.chat.abandon_turn(&turn);
            Err(ApiError::Collaborator {
                failure,
                message: messages::chat_failed(session.language).to_string(),
            })
        }
    }
}

/// DELETE /api/chat
///
/// Starts over with the welcome message; replies still in flight are dropped.
pub async fn reset_chat(visitor: Visitor) -> Json<ChatResponse> {
    let mut session = visitor.session.lock().await;
    let language = session.language;
    session.chat.reset(language);
    Json(ChatResponse {
        language,
        reply: None,
        messages: session.chat.messages().to_vec(),
    })
}
