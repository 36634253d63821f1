use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of the backend model that should serve a request.
///
/// This can be one of the models the backend is known to host or a custom
/// string for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelId {
    /// Known model
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Models hosted by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Llama 3.3 70B versatile
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama3370bVersatile,

    /// Llama 3.1 8B instant
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama318bInstant,

    /// Qwen 3 32B
    #[serde(rename = "qwen/qwen3-32b")]
    Qwen332b,

    /// GPT OSS 20B
    #[serde(rename = "openai/gpt-oss-20b")]
    GptOss20b,
}

impl KnownModel {
    /// Every known model, in catalog order.
    pub const ALL: [KnownModel; 4] = [
        KnownModel::Llama3370bVersatile,
        KnownModel::Llama318bInstant,
        KnownModel::Qwen332b,
        KnownModel::GptOss20b,
    ];

    /// The wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Llama3370bVersatile => "llama-3.3-70b-versatile",
            KnownModel::Llama318bInstant => "llama-3.1-8b-instant",
            KnownModel::Qwen332b => "qwen/qwen3-32b",
            KnownModel::GptOss20b => "openai/gpt-oss-20b",
        }
    }
}

impl ModelId {
    /// The wire identifier.
    pub fn as_str(&self) -> &str {
        match self {
            ModelId::Known(known) => known.as_str(),
            ModelId::Custom(custom) => custom,
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Known(KnownModel::Llama3370bVersatile)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known model.
#[derive(Debug)]
pub struct KnownModelParseError {
    /// The string that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for KnownModelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {}", self.invalid_value)
    }
}

impl std::error::Error for KnownModelParseError {}

impl FromStr for KnownModel {
    type Err = KnownModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| KnownModelParseError {
                invalid_value: s.to_string(),
            })
    }
}

impl From<KnownModel> for ModelId {
    fn from(model: KnownModel) -> Self {
        ModelId::Known(model)
    }
}

impl From<&str> for ModelId {
    fn from(model: &str) -> Self {
        model
            .parse::<KnownModel>()
            .map(ModelId::Known)
            .unwrap_or_else(|_| ModelId::Custom(model.to_string()))
    }
}

impl From<String> for ModelId {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => ModelId::Known(known),
            Err(_) => ModelId::Custom(model),
        }
    }
}
