//! In-memory transcript of one mode round.
//!
//! Created when a mode starts and dropped when it ends; only a summary ever
//! outlives it (see `MemoryLog`).

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use amie_core::{ChatMessage, Role};

use crate::mode::Mode;

#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Identifies the round in logs
    pub id: Uuid,
    pub mode: Mode,
    /// Words selected for a drill round, empty in free chat
    pub words: Vec<String>,
    messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl ConversationSession {
    #[must_use]
    pub fn new(mode: Mode, words: Vec<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            mode,
            words,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_message(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage { role, content });
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The current transcript plus one more user turn, without recording it.
    #[must_use]
    pub fn request_with(&self, user_turn: &str) -> Vec<ChatMessage> {
        let mut request = self.messages.clone();
        request.push(ChatMessage::user(user_turn));
        request
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Time since the round started.
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        Utc::now() - self.created_at
    }
}
