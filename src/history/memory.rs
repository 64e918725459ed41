use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::RwLock;

use super::HistoryStore;
use crate::models::chat::{ Conversation, Message };

/// Session-scoped in-memory store. Nothing survives a process restart.
pub struct MemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        session_id: &str,
        message: Message
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().push(message);
        Ok(())
    }

    async fn conversation(
        &self,
        session_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let sessions = self.sessions.read().await;
        let all = sessions.get(session_id).map(Vec::as_slice).unwrap_or_default();
        let start = if limit > 0 && all.len() > limit { all.len() - limit } else { 0 };
        Ok(Conversation {
            id: session_id.to_string(),
            messages: all[start..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let store = MemoryHistoryStore::new();
        for i in 0..4 {
            store.append("s1", Message::user(format!("msg {}", i))).await.unwrap();
        }
        let conversation = store.conversation("s1", 0).await.unwrap();
        let contents: Vec<&str> = conversation.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["msg 0", "msg 1", "msg 2", "msg 3"]);
    }

    #[tokio::test]
    async fn limit_returns_most_recent_window_in_order() {
        let store = MemoryHistoryStore::new();
        for i in 0..10 {
            store.append("s1", Message::user(format!("msg {}", i))).await.unwrap();
        }
        let window = store.conversation("s1", 6).await.unwrap().messages;
        assert_eq!(window.len(), 6);
        assert_eq!(window.first().unwrap().content, "msg 4");
        assert_eq!(window.last().unwrap().content, "msg 9");
    }

    #[tokio::test]
    async fn limit_larger_than_history_returns_everything() {
        let store = MemoryHistoryStore::new();
        store.append("s1", Message::user("only")).await.unwrap();
        let window = store.conversation("s1", 6).await.unwrap().messages;
        assert_eq!(window.len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_empty() {
        let store = MemoryHistoryStore::new();
        let conversation = store.conversation("missing", 6).await.unwrap();
        assert!(conversation.messages.is_empty());
        assert_eq!(conversation.id, "missing");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = MemoryHistoryStore::new();
        store.append("a", Message::user("for a")).await.unwrap();
        store.append("b", Message::user("for b")).await.unwrap();
        assert_eq!(store.conversation("a", 0).await.unwrap().messages.len(), 1);
        assert_eq!(store.conversation("b", 0).await.unwrap().messages[0].content, "for b");
    }
}
