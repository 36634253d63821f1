use crate::types::{FeatureId, ModelId, UploadFile};

/// A user action the session controller can be asked to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Switch the current feature.
    SelectFeature(FeatureId),

    /// Switch the current model.
    SelectModel(ModelId),

    /// Send a text message.
    Send(String),

    /// Upload a file.
    Upload(UploadFile),

    /// Discard the conversation and start a new session.
    Clear,
}
