//! Configuration types for the session controller and the chatterbox binary.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration the controller and transport are built from.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::render::{MAX_NOTICES, NOTICE_DURATION, NoticeBoard};
use crate::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::{FeatureId, ModelId};

/// Feature used when nothing else was selected.
pub const DEFAULT_FEATURE: &str = "chat";

/// Directory conversation logs are stored in by default.
pub const DEFAULT_STORAGE_DIR: &str = ".chatterbox";

/// Command-line arguments for the chatterbox tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: http://localhost:8000/)", "URL")]
    pub url: Option<String>,

    /// Feature to start with.
    #[arrrg(optional, "Feature to start with (default: chat)", "FEATURE")]
    pub feature: Option<String>,

    /// Model to start with.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    pub model: Option<String>,

    /// Session to resume.
    #[arrrg(optional, "Resume a stored session", "SESSION")]
    pub session: Option<String>,

    /// History capacity per session.
    #[arrrg(optional, "Messages kept per session (default: 100)", "COUNT")]
    pub history: Option<u32>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Directory conversation logs are stored in.
    #[arrrg(optional, "Directory for conversation logs (default: .chatterbox)", "DIR")]
    pub storage: Option<String>,

    /// YAML catalog replacing the built-in features and models.
    #[arrrg(optional, "YAML feature/model catalog", "FILE")]
    pub catalog: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a session controller.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Backend base URL.
    pub base_url: String,

    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,

    /// Messages kept per session.
    pub history_capacity: usize,

    /// Feature active at startup, if any.
    pub default_feature: Option<FeatureId>,

    /// Model active at startup.
    pub default_model: ModelId,

    /// How long notices stay visible.
    pub notice_duration: Duration,

    /// How many notices may be visible at once.
    pub max_notices: usize,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Directory conversation logs are stored in.
    pub storage_dir: String,

    /// Optional YAML catalog path.
    pub catalog_path: Option<String>,

    /// Session to resume instead of starting a new one.
    pub resume_session: Option<String>,
}

impl ControllerConfig {
    /// Creates a new ControllerConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: http://localhost:8000/
    /// - Feature: chat
    /// - Model: llama-3.3-70b-versatile
    /// - History: 100 messages
    /// - Timeout: 60 seconds
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_feature: Some(FeatureId::from(DEFAULT_FEATURE)),
            default_model: ModelId::default(),
            notice_duration: NOTICE_DURATION,
            max_notices: MAX_NOTICES,
            use_color: true,
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            catalog_path: None,
            resume_session: None,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the history capacity.  A capacity of zero is raised to one.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    /// Sets the feature active at startup.  `None` starts without one.
    pub fn with_default_feature(mut self, feature: Option<FeatureId>) -> Self {
        self.default_feature = feature;
        self
    }

    /// Sets the model active at startup.
    pub fn with_default_model(mut self, model: ModelId) -> Self {
        self.default_model = model;
        self
    }

    /// Sets the notice lifetime and bound.
    pub fn with_notices(mut self, duration: Duration, max_notices: usize) -> Self {
        self.notice_duration = duration;
        self.max_notices = max_notices.max(1);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the storage directory.
    pub fn with_storage_dir(mut self, dir: impl Into<String>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Sets the YAML catalog path.
    pub fn with_catalog_path(mut self, path: Option<String>) -> Self {
        self.catalog_path = path;
        self
    }

    /// Sets the session to resume.
    pub fn with_resume_session(mut self, session: Option<String>) -> Self {
        self.resume_session = session;
        self
    }

    /// An empty notice board with the configured lifetime and bound.
    pub fn notice_board(&self) -> NoticeBoard {
        NoticeBoard::new(self.notice_duration, self.max_notices)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ControllerConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ControllerConfig::new();
        ControllerConfig {
            base_url: args.url.unwrap_or(defaults.base_url),
            timeout: args
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            history_capacity: args
                .history
                .map(|n| (n as usize).max(1))
                .unwrap_or(defaults.history_capacity),
            default_feature: args
                .feature
                .map(FeatureId::from)
                .or(defaults.default_feature),
            default_model: args.model.map(ModelId::from).unwrap_or(defaults.default_model),
            use_color: !args.no_color,
            storage_dir: args.storage.unwrap_or(defaults.storage_dir),
            catalog_path: args.catalog,
            resume_session: args.session,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnownModel, Notice, Severity};

    #[test]
    fn default_config() {
        let config = ControllerConfig::new();
        assert_eq!(config.base_url, "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.default_feature, Some(FeatureId::from("chat")));
        assert_eq!(
            config.default_model,
            ModelId::Known(KnownModel::Llama3370bVersatile)
        );
        assert_eq!(config.notice_duration, Duration::from_secs(3));
        assert_eq!(config.max_notices, 5);
        assert!(config.use_color);
        assert!(config.catalog_path.is_none());
        assert!(config.resume_session.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ControllerConfig::from(ChatArgs::default());
        assert_eq!(config, ControllerConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            url: Some("https://chat.example.com/".to_string()),
            feature: Some("code_analyzer".to_string()),
            model: Some("qwen/qwen3-32b".to_string()),
            session: Some("session_1_abcdefghi".to_string()),
            history: Some(0),
            timeout: Some(5),
            storage: Some("/tmp/logs".to_string()),
            catalog: Some("catalog.yaml".to_string()),
            no_color: true,
        };
        let config = ControllerConfig::from(args);
        assert_eq!(config.base_url, "https://chat.example.com/");
        assert_eq!(config.default_feature, Some(FeatureId::from("code_analyzer")));
        assert_eq!(config.default_model, ModelId::Known(KnownModel::Qwen332b));
        assert_eq!(config.resume_session.as_deref(), Some("session_1_abcdefghi"));
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.storage_dir, "/tmp/logs");
        assert_eq!(config.catalog_path.as_deref(), Some("catalog.yaml"));
        assert!(!config.use_color);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ControllerConfig::new()
            .with_base_url("http://10.0.0.2:8000/")
            .with_default_feature(None)
            .with_default_model(ModelId::from("my-model"))
            .with_history_capacity(0)
            .with_notices(Duration::from_secs(1), 0)
            .without_color();
        assert_eq!(config.base_url, "http://10.0.0.2:8000/");
        assert!(config.default_feature.is_none());
        assert_eq!(config.default_model, ModelId::Custom("my-model".to_string()));
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.max_notices, 1);
        assert!(!config.use_color);
    }

    #[test]
    fn notice_board_follows_config() {
        let config = ControllerConfig::new().with_notices(Duration::from_secs(1), 2);
        let mut board = config.notice_board();
        let start = std::time::Instant::now();
        for text in ["a", "b", "c"] {
            board.post_at(Notice::new(text, Severity::Info), start);
        }
        let texts: Vec<String> = board
            .visible_at(start)
            .into_iter()
            .map(|notice| notice.text)
            .collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert!(board.visible_at(start + Duration::from_secs(1)).is_empty());
    }
}
