//! Per-user session state: credential and conversation.
//!
//! A [`Session`] is owned by one connection (a terminal chat or one HTTP
//! session id) and passed explicitly through every submission.

mod conversation;
mod store;

pub use conversation::{Conversation, Message, Role};
pub use store::SessionStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Greeting every new conversation starts with.
pub const DEFAULT_GREETING: &str =
    "👋 Hi! I'm your AI assistant for math and knowledge-based queries. How can I help you today?";

/// API key for the hosted model. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key. Empty or whitespace-only input counts as no key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// One user's conversation and credential.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    credential: Option<Credential>,
    conversation: Conversation,
}

impl Session {
    pub fn new(greeting: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            credential: None,
            conversation: Conversation::new(greeting),
        }
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Replace the credential; `None` closes the gate again.
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub(crate) fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \n").is_none());
        assert_eq!(Credential::new(" gsk_abc ").unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("gsk_secret").unwrap();
        assert!(!format!("{:?}", credential).contains("gsk_secret"));
    }

    #[test]
    fn test_new_session_is_locked_and_seeded() {
        let session = Session::new(DEFAULT_GREETING);
        assert!(session.credential().is_none());
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().all()[0].role, Role::Assistant);
    }
}
