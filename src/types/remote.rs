use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Health summary reported by the backend's status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Free-form status line.
    pub status: String,

    /// Service name.
    #[serde(default)]
    pub service: Option<String>,

    /// Service version.
    #[serde(default)]
    pub version: Option<String>,

    /// Number of models the backend can route to.
    #[serde(default)]
    pub models_available: Option<u32>,

    /// Number of features the backend knows.
    #[serde(default)]
    pub features_available: Option<u32>,

    /// Server time of the report.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One exchange recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTurn {
    /// Feature the exchange ran under.
    pub feature: String,

    /// What the user sent.
    pub user_input: String,

    /// What the backend answered.
    pub ai_response: String,

    /// Model that served the exchange.
    #[serde(default)]
    pub model_used: Option<String>,

    /// When the exchange was recorded.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The backend's record of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConversation {
    /// Session the record belongs to.
    pub session_id: String,

    /// Recorded exchanges in order.
    #[serde(default)]
    pub conversations: Vec<RemoteTurn>,

    /// Number of recorded exchanges.
    #[serde(default)]
    pub count: usize,
}

impl ServiceStatus {
    /// Interpret a decoded status body.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| {
            Error::malformed_response(format!("unexpected status shape: {err}"), Some(Box::new(err)))
        })
    }
}

impl RemoteConversation {
    /// Interpret a decoded conversation body.
    ///
    /// The backend reports lookup failures as `{"error": "..."}`.
    pub fn from_value(value: Value) -> Result<Self> {
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(Error::application(error));
        }
        serde_json::from_value(value).map_err(|err| {
            Error::malformed_response(
                format!("unexpected conversation shape: {err}"),
                Some(Box::new(err)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parses() {
        let status = ServiceStatus::from_value(json!({
            "status": "🟢 ONLINE",
            "service": "backend",
            "version": "1.0",
            "models_available": 4,
            "features_available": 80,
            "timestamp": "2025-03-01T10:00:00",
        }))
        .unwrap();
        assert_eq!(status.models_available, Some(4));
        assert_eq!(status.features_available, Some(80));
    }

    #[test]
    fn conversation_parses() {
        let conversation = RemoteConversation::from_value(json!({
            "session_id": "session_1_a",
            "conversations": [{
                "id": 3,
                "session_id": "session_1_a",
                "feature": "chat",
                "user_input": "hello",
                "ai_response": "hi!",
                "model_used": "llama-3.3-70b-versatile",
                "timestamp": "2025-03-01 10:00:00",
            }],
            "count": 1,
        }))
        .unwrap();
        assert_eq!(conversation.count, 1);
        assert_eq!(conversation.conversations[0].ai_response, "hi!");
    }

    #[test]
    fn conversation_error_body() {
        let err = RemoteConversation::from_value(json!({"error": "database locked"})).unwrap_err();
        assert!(err.is_application());
    }
}
