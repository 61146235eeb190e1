//! Append-only conversation transcript.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered transcript of one session. Entries are never reordered, edited or removed.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation seeded with an assistant greeting.
    pub fn new(greeting: &str) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    /// Add a message to the end of the transcript.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full transcript in insertion order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages (or fewer).
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_greeting() {
        let conversation = Conversation::new("hello");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.all()[0], Message::assistant("hello"));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new("hi");
        conversation.append(Message::user("one"));
        conversation.append(Message::assistant("two"));

        let contents: Vec<_> = conversation.all().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hi", "one", "two"]);
        assert_eq!(conversation.last().map(|m| m.role), Some(Role::Assistant));
        assert_eq!(conversation.recent(2).len(), 2);
        assert_eq!(conversation.recent(10).len(), 3);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("q")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"q"}"#);
    }
}
