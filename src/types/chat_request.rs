use serde::{Deserialize, Serialize};

use crate::types::{FeatureId, ModelId};

/// Body of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Feature the message is sent under.
    pub feature: FeatureId,

    /// The trimmed user message.
    pub message: String,

    /// Model that should answer.
    pub model: ModelId,

    /// Session the exchange belongs to.
    #[serde(alias = "sessionId")]
    pub session_id: String,
}

impl ChatRequest {
    /// Create a new chat request.
    pub fn new(
        feature: FeatureId,
        message: impl Into<String>,
        model: ModelId,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            feature,
            message: message.into(),
            model,
            session_id: session_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape() {
        let request = ChatRequest::new(
            "chat".into(),
            "hello",
            ModelId::default(),
            "session_1_abcdefghi",
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "feature": "chat",
                "message": "hello",
                "model": "llama-3.3-70b-versatile",
                "session_id": "session_1_abcdefghi",
            })
        );
    }

    #[test]
    fn accepts_camel_case_session() {
        let json = r#"{"feature":"chat","message":"m","model":"x","sessionId":"s"}"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.session_id, "s");
    }
}
