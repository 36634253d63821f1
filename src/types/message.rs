use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{FeatureId, ModelId};

/// Who produced a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// The person using the client.
    #[serde(rename = "user")]
    User,

    /// The backend.
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of a conversation.
///
/// Messages are immutable once created; the history store owns the ones that
/// get persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub sender: Sender,

    /// Feature the message was exchanged under.
    pub feature: FeatureId,

    /// Model that served the message, if any.
    #[serde(default)]
    pub model: Option<ModelId>,

    /// Text of the message.
    #[serde(rename = "message", alias = "body")]
    pub body: String,

    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,

    /// Language the backend detected in the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,

    /// Domain the backend detected in the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_domain: Option<String>,
}

impl Message {
    /// Create a new user message stamped with the current time.
    pub fn user(feature: FeatureId, body: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            feature,
            model: None,
            body: body.into(),
            timestamp: crate::utils::time::now(),
            detected_language: None,
            detected_domain: None,
        }
    }

    /// Create a new assistant message stamped with the current time.
    pub fn assistant(feature: FeatureId, model: Option<ModelId>, body: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            feature,
            model,
            body: body.into(),
            timestamp: crate::utils::time::now(),
            detected_language: None,
            detected_domain: None,
        }
    }

    /// Attach detection results reported by the backend.
    pub fn with_detection(
        mut self,
        detected_language: Option<String>,
        detected_domain: Option<String>,
    ) -> Self {
        self.detected_language = detected_language;
        self.detected_domain = detected_domain;
        self
    }

    /// Returns true if the user sent this message.
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_no_model() {
        let message = Message::user("chat".into(), "hello");
        assert!(message.is_user());
        assert!(message.model.is_none());
        assert_eq!(message.body, "hello");
    }

    #[test]
    fn persisted_shape() {
        let message = Message::assistant(
            "chat".into(),
            Some(ModelId::default()),
            "hi!",
        )
        .with_detection(Some("🐍 python".to_string()), None);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "ai");
        assert_eq!(value["message"], "hi!");
        assert_eq!(value["feature"], "chat");
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["detected_language"], "🐍 python");
        assert!(value.get("detected_domain").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn reads_entries_without_optional_fields() {
        let json = r#"{
            "sender": "user",
            "message": "Uploaded file: notes.txt",
            "feature": "file_reader",
            "model": null,
            "timestamp": "2025-03-01T10:00:00Z"
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.feature.as_str(), "file_reader");
        assert!(message.model.is_none());
        assert!(message.detected_domain.is_none());
    }
}
