//! Append-only chat transcript

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Genie,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Genie => write!(f, "genie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    pub fn genie(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Genie,
        }
    }
}

/// Ordered chat history
///
/// Messages are only ever appended; nothing is edited or removed. Order is
/// the order in which `push` calls completed. Cloning shares the history.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its index
    pub fn push(&self, message: ChatMessage) -> usize {
        let mut messages = self.messages.write();
        messages.push(message);
        messages.len() - 1
    }

    pub fn push_user(&self, text: impl Into<String>) -> usize {
        self.push(ChatMessage::user(text))
    }

    pub fn push_genie(&self, text: impl Into<String>) -> usize {
        self.push(ChatMessage::genie(text))
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    /// Messages from index `start` on
    pub fn since(&self, start: usize) -> Vec<ChatMessage> {
        self.messages
            .read()
            .get(start..)
            .map(<[ChatMessage]>::to_vec)
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.messages.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let transcript = Transcript::new();
        assert_eq!(transcript.push_user("Turn on all lights"), 0);
        assert_eq!(transcript.push_genie("Done!"), 1);

        let messages = transcript.messages();
        assert_eq!(messages[0], ChatMessage::user("Turn on all lights"));
        assert_eq!(messages[1].sender, Sender::Genie);
    }

    #[test]
    fn test_since() {
        let transcript = Transcript::new();
        transcript.push_genie("Hello");
        let mark = transcript.len();
        transcript.push_user("Hi");

        assert_eq!(transcript.since(mark), vec![ChatMessage::user("Hi")]);
        assert!(transcript.since(10).is_empty());
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::genie("ok")).unwrap();
        assert_eq!(json, r#"{"text":"ok","sender":"genie"}"#);
    }
}
