use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a feature, the task mode that tags requests and responses.
///
/// Feature ids are opaque.  They are only ever checked by looking them up in a
/// [`Registry`](crate::Registry); unknown ids are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Create a new feature id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for FeatureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let feature = FeatureId::from("code_analyzer");
        let json = serde_json::to_string(&feature).unwrap();
        assert_eq!(json, r#""code_analyzer""#);
        let back: FeatureId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, feature);
    }
}
