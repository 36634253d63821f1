use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ModelId;

const SUCCESS: &str = "success";

/// A successful answer from the chat or upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// The assistant's answer.
    pub response: String,

    /// Model the backend reports having used.
    pub model: Option<ModelId>,

    /// Language the backend detected in the input.
    pub detected_language: Option<String>,

    /// Domain the backend detected in the input.
    pub detected_domain: Option<String>,
}

#[derive(Deserialize)]
struct RawReply {
    status: Option<String>,
    response: Option<String>,
    model: Option<String>,
    #[serde(alias = "detectedLanguage")]
    detected_language: Option<String>,
    #[serde(alias = "detectedDomain")]
    detected_domain: Option<String>,
    error: Option<String>,
}

impl ChatReply {
    /// Create a new reply.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            model: None,
            detected_language: None,
            detected_domain: None,
        }
    }

    /// Sets the reported model.
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Interpret a decoded response body.
    ///
    /// A body whose `status` is anything but `"success"` becomes
    /// [`Error::Application`] carrying the backend's `error` text.  A success
    /// body without a `response` string is [`Error::MalformedResponse`].
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed_response(
                format!("expected a JSON object, got {value}"),
                None,
            ));
        }
        let raw: RawReply = serde_json::from_value(value).map_err(|err| {
            Error::malformed_response(format!("unexpected reply shape: {err}"), Some(Box::new(err)))
        })?;
        if raw.status.as_deref() != Some(SUCCESS) {
            return Err(Error::application(
                raw.error
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            ));
        }
        let response = raw
            .response
            .ok_or_else(|| Error::malformed_response("reply is missing `response`", None))?;
        Ok(Self {
            response,
            model: raw.model.map(ModelId::from),
            detected_language: raw.detected_language,
            detected_domain: raw.detected_domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;
    use serde_json::json;

    #[test]
    fn success_reply() {
        let reply = ChatReply::from_value(json!({
            "status": "success",
            "response": "hi!",
            "model": "llama-3.3-70b-versatile",
            "detected_language": "❓ unknown",
            "detected_domain": "🌐 general",
        }))
        .unwrap();
        assert_eq!(reply.response, "hi!");
        assert_eq!(
            reply.model,
            Some(ModelId::Known(KnownModel::Llama3370bVersatile))
        );
        assert_eq!(reply.detected_language.as_deref(), Some("❓ unknown"));
        assert_eq!(reply.detected_domain.as_deref(), Some("🌐 general"));
    }

    #[test]
    fn camel_case_detection_fields() {
        let reply = ChatReply::from_value(json!({
            "status": "success",
            "response": "ok",
            "detectedLanguage": "🦀 rust",
            "detectedDomain": "⚙️ Engineering Tech",
        }))
        .unwrap();
        assert!(reply.model.is_none());
        assert_eq!(reply.detected_language.as_deref(), Some("🦀 rust"));
        assert_eq!(reply.detected_domain.as_deref(), Some("⚙️ Engineering Tech"));
    }

    #[test]
    fn error_status_is_application_error() {
        let err = ChatReply::from_value(json!({
            "status": "error",
            "error": "❌ Chat Error: boom",
        }))
        .unwrap_err();
        assert!(err.is_application());
        assert_eq!(err.to_string(), "❌ Chat Error: boom");
    }

    #[test]
    fn missing_status_without_error_text() {
        let err = ChatReply::from_value(json!({"response": "hi"})).unwrap_err();
        assert!(err.is_application());
        assert_eq!(err.to_string(), "Unknown error occurred");
    }

    #[test]
    fn missing_response_is_malformed() {
        let err = ChatReply::from_value(json!({"status": "success"})).unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(
            ChatReply::from_value(json!(["success"]))
                .unwrap_err()
                .is_malformed_response()
        );
        assert!(
            ChatReply::from_value(json!({"status": "success", "response": 7}))
                .unwrap_err()
                .is_malformed_response()
        );
    }
}
