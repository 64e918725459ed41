use chrono::Utc;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A citation attached to an assistant reply. Title and uri are always
/// non-empty; missing upstream fields are replaced with fallback labels
/// before a Source is ever constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// One turn of a conversation. Immutable once appended to a history store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>, sources: Option<Vec<Source>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            sources,
        }
    }

    /// User messages never carry citations.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, None)
    }

    pub fn assistant(content: impl Into<String>, sources: Option<Vec<Source>>) -> Self {
        Self::new(MessageRole::Assistant, content, sources)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn sources_are_omitted_when_absent() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("sources"));
    }

    #[test]
    fn assistant_sources_round_trip() {
        let sources = vec![Source {
            title: "WHO dengue factsheet".to_string(),
            uri: "https://who.int/dengue".to_string(),
        }];
        let message = Message::assistant("reply", Some(sources.clone()));
        let json = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sources, Some(sources));
    }
}
