// Public modules
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod observability;
pub mod registry;
pub mod render;
pub mod transport;
pub mod types;
pub mod utils;

// Re-exports
pub use config::{ChatArgs, ControllerConfig};
pub use controller::SessionController;
pub use error::{Error, Result};
pub use history::{FileStorage, HistoryStore, MemoryStorage, Storage};
pub use observability::register_biometrics;
pub use registry::{Catalog, FeatureInfo, MessageMeta, ModelInfo, Registry};
pub use render::{NoticeBoard, PlainTextRenderer, Renderer, ViewEntry, ViewLog};
pub use transport::{HttpTransport, Transport};
pub use types::*;
