//! In-memory session store
//!
//! Process-wide map from session id to an append-only message list. Sessions
//! are created on first reference and live until cleared or process exit.
//! Each session carries its own turn lock so concurrent turns on the same id
//! serialize while distinct ids proceed in parallel.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Conversational role of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message in a session, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Marks assistant turns that are rendered error text. These stay in
    /// history for the caller but are excluded from the model window so
    /// error text is not replayed into later prompts.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_error: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_error: false,
        }
    }

    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_error: true,
        }
    }
}

struct SessionEntry {
    turn: Arc<tokio::sync::Mutex<()>>,
    messages: Arc<Mutex<Vec<Message>>>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            turn: Arc::new(tokio::sync::Mutex::new(())),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Process-wide session map
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn messages(&self, session_id: &str) -> Arc<Mutex<Vec<Message>>> {
        if let Some(entry) = self.sessions.read().unwrap().get(session_id) {
            return entry.messages.clone();
        }
        let mut sessions = self.sessions.write().unwrap();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new)
            .messages
            .clone()
    }

    /// Per-session serialization point, held by the engine across a turn
    pub fn turn_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        if let Some(entry) = self.sessions.read().unwrap().get(session_id) {
            return entry.turn.clone();
        }
        let mut sessions = self.sessions.write().unwrap();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new)
            .turn
            .clone()
    }

    /// Most recent `k` non-error messages, oldest first
    pub fn window(&self, session_id: &str, k: usize) -> Vec<Message> {
        let messages = self.messages(session_id);
        let messages = messages.lock().unwrap();
        let eligible: Vec<&Message> = messages.iter().filter(|m| !m.is_error).collect();
        let skip = eligible.len().saturating_sub(k);
        eligible.into_iter().skip(skip).cloned().collect()
    }

    pub fn append(&self, session_id: &str, message: Message) {
        self.messages(session_id).lock().unwrap().push(message);
    }

    /// Full history including error turns, for external inspection
    pub fn all(&self, session_id: &str) -> Vec<Message> {
        self.messages(session_id).lock().unwrap().clone()
    }

    /// Remove the session entirely
    pub fn clear(&self, session_id: &str) {
        self.sessions.write().unwrap().remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.all("fresh").is_empty());
        assert!(store.window("fresh", 10).is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = SessionStore::new();
        store.append("s", Message::user("one"));
        store.append("s", Message::assistant("two"));
        store.append("s", Message::user("three"));

        let all = store.all("s");
        let contents: Vec<&str> = all.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_window_is_bounded_suffix() {
        let store = SessionStore::new();
        for i in 0..15 {
            store.append("s", Message::user(format!("msg-{i}")));
        }

        let window = store.window("s", 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "msg-5");
        assert_eq!(window[9].content, "msg-14");

        // Window is a suffix of the full history
        let all = store.all("s");
        let suffix: Vec<&str> = all[5..].iter().map(|m| m.content.as_str()).collect();
        let windowed: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(windowed, suffix);
    }

    #[test]
    fn test_window_excludes_error_turns() {
        let store = SessionStore::new();
        store.append("s", Message::user("hi"));
        store.append("s", Message::assistant_error("I encountered an error: boom"));
        store.append("s", Message::user("again"));

        let window = store.window("s", 10);
        let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "again"]);

        // Full history still carries the error turn
        assert_eq!(store.all("s").len(), 3);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::new();
        store.append("s", Message::user("hi"));
        store.clear("s");
        assert!(store.all("s").is_empty());
        store.clear("s");
        assert!(store.all("s").is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::new();
        store.append("a", Message::user("for a"));
        store.append("b", Message::user("for b"));
        store.clear("a");
        assert!(store.all("a").is_empty());
        assert_eq!(store.all("b").len(), 1);
    }

    #[tokio::test]
    async fn test_turn_lock_is_shared_per_session() {
        let store = SessionStore::new();
        let first = store.turn_lock("s");
        let second = store.turn_lock("s");
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.turn_lock("t");
        assert!(!Arc::ptr_eq(&first, &other));

        // Holding the lock blocks a second acquisition attempt
        let guard = first.lock().await;
        assert!(second.try_lock().is_err());
        drop(guard);
        assert!(second.try_lock().is_ok());
    }
}
