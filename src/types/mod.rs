// Public modules
pub mod action;
pub mod chat_reply;
pub mod chat_request;
pub mod feature;
pub mod message;
pub mod model;
pub mod notice;
pub mod remote;
pub mod session;
pub mod upload;

// Re-exports
pub use action::Action;
pub use chat_reply::ChatReply;
pub use chat_request::ChatRequest;
pub use feature::FeatureId;
pub use message::{Message, Sender};
pub use model::{KnownModel, KnownModelParseError, ModelId};
pub use notice::{Notice, Severity};
pub use remote::{RemoteConversation, RemoteTurn, ServiceStatus};
pub use session::Session;
pub use upload::{ALLOWED_EXTENSIONS, MultipartForm, UploadFile};
