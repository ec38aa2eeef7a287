//! Chat assistant conversation state and collaborator interface
//!
//! The assistant itself is external. This module keeps the visitor's ordered
//! history and guards against applying a reply to a conversation that was
//! reset while the call was in flight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CollaboratorFailure;
use crate::i18n::Language;
use crate::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// External assistant: one reply per ordered history
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn reply(
        &self,
        history: &[ChatMessage],
        language: Language,
    ) -> Result<String, CollaboratorFailure>;
}

/// Turn sent to the assistant, tagged with the conversation generation
#[derive(Debug, Clone)]
pub struct PendingTurn {
    generation: u64,
    pub history: Vec<ChatMessage>,
}

/// Visitor's conversation with the assistant
#[derive(Debug, Clone)]
pub struct ChatConversation {
    messages: Vec<ChatMessage>,
    generation: u64,
}

impl ChatConversation {
    /// New conversation opening with the localized welcome message
    pub fn new(language: Language) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(messages::chat_welcome(language))],
            generation: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the visitor's message and snapshot the history to send
    pub fn begin_turn(&mut self, text: &str) -> PendingTurn {
        self.messages.push(ChatMessage::user(text));
        PendingTurn {
            generation: self.generation,
            history: self.messages.clone(),
        }
    }

    /// Append the assistant's reply
    ///
    /// Returns false, leaving the history untouched, when the conversation
    /// was reset after `turn` was started.
    pub fn complete_turn(&mut self, turn: &PendingTurn, reply: String) -> bool {
        if turn.generation != self.generation {
            debug!("Discarding reply for a reset conversation");
            return false;
        }
        self.messages.push(ChatMessage::assistant(reply));
        true
    }

    /// Withdraw the visitor's message after a failed call so it can be resent
    pub fn abandon_turn(&mut self, turn: &PendingTurn) -> bool {
        if turn.generation != self.generation {
            return false;
        }
        if let Some(last) = turn.history.last() {
            if self.messages.last() == Some(last) {
                self.messages.pop();
                return true;
            }
        }
        false
    }

    /// Start over; replies still in flight are discarded when they arrive
    pub fn reset(&mut self, language: Language) {
        self.generation += 1;
        self.messages = vec![ChatMessage::assistant(messages::chat_welcome(language))];
    }
}
