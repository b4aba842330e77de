use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::registry::RECENT_REPLAY_LIMIT;
use super::typing::Typewriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Transcript label, also the wire form in snapshots and payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "AI",
        }
    }

    pub fn from_label(label: &str) -> Self {
        if label == "You" {
            Sender::User
        } else {
            Sender::Assistant
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Shared, append-mostly message history for one session.
///
/// Clones share the same underlying log, so the response pipeline can append
/// from its worker thread while the registry keeps ownership of the session.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: ChatMessage) {
        self.messages.write().push(message);
    }

    pub fn push_user(&self, text: impl Into<String>) {
        self.push(ChatMessage::new(Sender::User, text));
    }

    pub fn push_assistant(&self, text: impl Into<String>) {
        self.push(ChatMessage::new(Sender::Assistant, text));
    }

    pub fn get_all(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    /// Last `count` messages in order, for replaying into a transcript view.
    pub fn recent(&self, count: usize) -> Vec<ChatMessage> {
        let messages = self.messages.read();
        let skip = messages.len().saturating_sub(count);
        messages[skip..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }
}

/// One independent conversation.
#[derive(Debug)]
pub struct ChatSession {
    pub id: Uuid,
    pub display_name: String,
    pub model_name: String,
    pub log: MessageLog,
    /// Transient reveal state, never persisted.
    pub typewriter: Typewriter,
}

impl ChatSession {
    pub fn new(display_name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            model_name: model_name.into(),
            log: MessageLog::new(),
            typewriter: Typewriter::new(),
        }
    }

    /// Messages a restored transcript view should replay.
    pub fn recent_history(&self) -> Vec<ChatMessage> {
        self.log.recent(RECENT_REPLAY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_labels_round_trip() {
        assert_eq!(Sender::User.label(), "You");
        assert_eq!(Sender::Assistant.label(), "AI");
        assert_eq!(Sender::from_label("You"), Sender::User);
        assert_eq!(Sender::from_label("AI"), Sender::Assistant);
    }

    #[test]
    fn log_clones_share_history() {
        let log = MessageLog::new();
        let shared = log.clone();
        shared.push_user("hello");
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_all()[0].sender, Sender::User);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let log = MessageLog::new();
        for i in 0..15 {
            log.push_user(format!("m{}", i));
        }
        let recent = log.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().unwrap().text, "m5");
        assert_eq!(recent.last().unwrap().text, "m14");
    }
}
