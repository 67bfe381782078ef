// ABOUTME: In-memory session store — maps session identifiers to shared conversation histories.
// ABOUTME: Histories are created lazily, live for the process, and are never persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::llm::Message;

/// Generate a fresh session identifier for this process.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared handle to one session's ordered history.
///
/// Clones point at the same underlying sequence. The lock makes each read or
/// commit sound, but does not order whole exchanges: callers must not run two
/// exchanges against the same session at once.
#[derive(Debug, Clone, Default)]
pub struct HistoryHandle {
    turns: Arc<Mutex<Vec<Message>>>,
}

impl HistoryHandle {
    /// Copy of the current turns, in order.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.turns.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.lock().await.is_empty()
    }

    /// Append a completed exchange: the human turn, then the assistant turn.
    pub async fn commit(&self, human: Message, assistant: Message) {
        let mut turns = self.turns.lock().await;
        turns.push(human);
        turns.push(assistant);
    }

    /// True when both handles refer to the same history.
    pub fn same_history(&self, other: &HistoryHandle) -> bool {
        Arc::ptr_eq(&self.turns, &other.turns)
    }
}

/// Process-wide mapping from session identifier to history.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, HistoryHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the history for `session_id`, creating an empty one on first use.
    pub fn get_or_create(&mut self, session_id: &str) -> HistoryHandle {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<HistoryHandle> {
        self.sessions.get(session_id).cloned()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent_and_shared() {
        let mut store = SessionStore::new();
        let first = store.get_or_create("abc");
        let second = store.get_or_create("abc");
        assert!(first.same_history(&second));
        assert_eq!(store.len(), 1);

        first
            .commit(Message::human("hi"), Message::assistant("hello"))
            .await;
        assert_eq!(second.len().await, 2, "writes through one handle are visible via the other");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let mut store = SessionStore::new();
        let a = store.get_or_create("a");
        let b = store.get_or_create("b");
        assert!(!a.same_history(&b));

        a.commit(Message::human("x"), Message::assistant("y")).await;
        assert!(b.is_empty().await);
    }

    #[test]
    fn lookup_does_not_create() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_none());
        assert!(!store.contains("missing"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn commit_preserves_order() {
        let history = HistoryHandle::default();
        history
            .commit(Message::human("q1"), Message::assistant("a1"))
            .await;
        history
            .commit(Message::human("q2"), Message::assistant("a2"))
            .await;
        let contents: Vec<String> = history
            .snapshot()
            .await
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
