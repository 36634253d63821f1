use std::fmt;

use serde::{Deserialize, Serialize};

/// How a transient notice should be styled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    Info,

    /// A completed action.
    Success,

    /// Something the user should wait for or retry.
    Warning,

    /// A failed action.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A transient, auto-dismissing message shown next to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text of the notice.
    pub text: String,

    /// How to style it.
    pub severity: Severity,
}

impl Notice {
    /// Create a new notice.
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}
