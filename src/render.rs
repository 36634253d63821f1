//! Rendering of the conversation view.
//!
//! The session controller never draws anything itself; it drives a
//! [`Renderer`].  Two implementations are provided:
//!
//! - [`ViewLog`], an in-memory projection of what a view would show.  It is
//!   what embedders read from and what the tests inspect.
//! - [`PlainTextRenderer`], a terminal view with optional ANSI styling.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crate::registry::{FeatureInfo, MessageMeta};
use crate::types::{Message, Notice, Sender, Severity};
use crate::utils::time::clock;

/// How long a notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// How many notices may be visible at once.
pub const MAX_NOTICES: usize = 5;

/// ANSI escape code for dim text (used for the typing placeholder).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the typing placeholder).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for feature badges).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for success notices).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for blue text (used for info notices).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for magenta text (used for model and detection badges).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI sequence returning to the start of the line and erasing it.
const ANSI_ERASE_LINE: &str = "\r\x1b[2K";

///////////////////////////////////////////// Renderer /////////////////////////////////////////////

/// Trait for projecting controller state into a view.
pub trait Renderer {
    /// Append a message to the visible log.
    ///
    /// Rendering is append-only: earlier messages are never redrawn.
    fn render_message(&mut self, message: &Message, meta: &MessageMeta);

    /// Show the "typing" placeholder.  At most one is ever visible.
    fn show_placeholder(&mut self, meta: &MessageMeta);

    /// Remove the placeholder.  A no-op when none is showing.
    fn hide_placeholder(&mut self);

    /// Show a transient notice.
    fn render_notice(&mut self, text: &str, severity: Severity);

    /// Enable or disable the send action.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Discard the visible log and show the welcome view.
    fn reset_view(&mut self, featured: &[FeatureInfo]);
}

//////////////////////////////////////////// NoticeBoard ///////////////////////////////////////////

/// The set of currently visible notices.
///
/// Notices expire [`NOTICE_DURATION`] after they were posted.  When more than
/// the configured maximum are live, the oldest are dropped first.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    duration: Duration,
    max_live: usize,
    live: VecDeque<(Instant, Notice)>,
}

impl NoticeBoard {
    /// Create a board with the given lifetime and bound.
    pub fn new(duration: Duration, max_live: usize) -> Self {
        Self {
            duration,
            max_live: max_live.max(1),
            live: VecDeque::new(),
        }
    }

    /// Post a notice now.
    pub fn post(&mut self, notice: Notice) {
        self.post_at(notice, Instant::now());
    }

    /// Post a notice at the given instant.
    pub fn post_at(&mut self, notice: Notice, now: Instant) {
        self.expire(now);
        self.live.push_back((now, notice));
        while self.live.len() > self.max_live {
            self.live.pop_front();
        }
    }

    /// Notices visible at `now`, oldest first.
    pub fn visible_at(&mut self, now: Instant) -> Vec<Notice> {
        self.expire(now);
        self.live.iter().map(|(_, notice)| notice.clone()).collect()
    }

    /// Notices visible right now.
    pub fn visible(&mut self) -> Vec<Notice> {
        self.visible_at(Instant::now())
    }

    fn expire(&mut self, now: Instant) {
        while let Some((posted, _)) = self.live.front() {
            if now.saturating_duration_since(*posted) >= self.duration {
                self.live.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(NOTICE_DURATION, MAX_NOTICES)
    }
}

////////////////////////////////////////////// ViewLog /////////////////////////////////////////////

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    /// The message as rendered.
    pub message: Message,

    /// The metadata it was rendered with.
    pub meta: MessageMeta,
}

impl ViewEntry {
    /// Detection badges shown under assistant messages.
    pub fn badges(&self) -> Vec<&str> {
        if self.message.sender != Sender::Assistant {
            return Vec::new();
        }
        [
            self.message.detected_language.as_deref(),
            self.message.detected_domain.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// In-memory projection of the conversation view.
#[derive(Debug, Clone)]
pub struct ViewLog {
    entries: Vec<ViewEntry>,
    placeholder: Option<MessageMeta>,
    welcome: Option<Vec<FeatureInfo>>,
    input_enabled: bool,
    notices: NoticeBoard,
    posted: Vec<Notice>,
}

impl ViewLog {
    /// Create an empty view with the default notice board.
    pub fn new() -> Self {
        Self::with_notices(NoticeBoard::default())
    }

    /// Create an empty view with a custom notice board.
    pub fn with_notices(notices: NoticeBoard) -> Self {
        Self {
            entries: Vec::new(),
            placeholder: None,
            welcome: None,
            input_enabled: true,
            notices,
            posted: Vec::new(),
        }
    }

    /// Rendered messages, oldest first.
    pub fn entries(&self) -> &[ViewEntry] {
        &self.entries
    }

    /// Bodies of the rendered messages, oldest first.
    pub fn bodies(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.message.body.as_str())
            .collect()
    }

    /// The placeholder, if one is showing.
    pub fn placeholder(&self) -> Option<&MessageMeta> {
        self.placeholder.as_ref()
    }

    /// The welcome cards, while the welcome view is showing.
    pub fn welcome(&self) -> Option<&[FeatureInfo]> {
        self.welcome.as_deref()
    }

    /// Whether the send action is enabled.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Notices still visible.
    pub fn visible_notices(&mut self) -> Vec<Notice> {
        self.notices.visible()
    }

    /// Every notice ever posted, oldest first.
    pub fn posted_notices(&self) -> &[Notice] {
        &self.posted
    }

    /// The most recently posted notice.
    pub fn last_notice(&self) -> Option<&Notice> {
        self.posted.last()
    }
}

impl Default for ViewLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ViewLog {
    fn render_message(&mut self, message: &Message, meta: &MessageMeta) {
        if self
            .entries
            .last()
            .is_some_and(|last| &last.message == message)
        {
            return;
        }
        self.welcome = None;
        self.entries.push(ViewEntry {
            message: message.clone(),
            meta: meta.clone(),
        });
    }

    fn show_placeholder(&mut self, meta: &MessageMeta) {
        self.placeholder = Some(meta.clone());
    }

    fn hide_placeholder(&mut self) {
        self.placeholder = None;
    }

    fn render_notice(&mut self, text: &str, severity: Severity) {
        let notice = Notice::new(text, severity);
        self.posted.push(notice.clone());
        self.notices.post(notice);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn reset_view(&mut self, featured: &[FeatureInfo]) {
        self.entries.clear();
        self.placeholder = None;
        self.welcome = Some(featured.to_vec());
    }
}

///////////////////////////////////////// PlainTextRenderer ////////////////////////////////////////

/// Plain text renderer with optional ANSI styling.
///
/// This renderer writes the conversation to stdout and notices to stderr.
/// A notice identical to one still live on its board is not printed again.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    placeholder_visible: bool,
    input_enabled: bool,
    notices: NoticeBoard,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            placeholder_visible: false,
            input_enabled: true,
            notices: NoticeBoard::default(),
        }
    }

    /// Replaces the notice board.
    pub fn with_notices(mut self, notices: NoticeBoard) -> Self {
        self.notices = notices;
        self
    }

    /// Notices still live.
    pub fn visible_notices(&mut self) -> Vec<Notice> {
        self.notices.visible()
    }

    /// Whether the send action is currently enabled.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn clear_placeholder_line(&mut self) {
        if self.placeholder_visible {
            if self.use_color {
                print!("{ANSI_ERASE_LINE}");
            } else {
                println!();
            }
            self.placeholder_visible = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn render_message(&mut self, message: &Message, meta: &MessageMeta) {
        self.clear_placeholder_line();
        let time = clock(&message.timestamp);
        match message.sender {
            Sender::User => {
                println!("{} {}", self.paint(ANSI_CYAN, "👤 You"), time);
            }
            Sender::Assistant => {
                let mut header =
                    self.paint(ANSI_CYAN, &format!("{} {}", meta.feature_icon, meta.feature_name));
                if let Some(model) = &meta.model_label {
                    header.push(' ');
                    header.push_str(&self.paint(ANSI_MAGENTA, &format!("[{model}]")));
                }
                println!("{header} {time}");
            }
        }
        for line in message.body.lines() {
            println!("  {line}");
        }
        if message.sender == Sender::Assistant {
            let badges: Vec<&str> = [
                message.detected_language.as_deref(),
                message.detected_domain.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !badges.is_empty() {
                println!("  {}", self.paint(ANSI_MAGENTA, &badges.join(" · ")));
            }
        }
        println!();
        self.flush();
    }

    fn show_placeholder(&mut self, meta: &MessageMeta) {
        if self.placeholder_visible {
            return;
        }
        let mut text = format!("{} {}", meta.feature_icon, meta.feature_name);
        if let Some(model) = &meta.model_label {
            text.push_str(&format!(" [{model}]"));
        }
        text.push_str(" is typing...");
        if self.use_color {
            print!("{ANSI_DIM}{ANSI_ITALIC}{text}{ANSI_RESET}");
        } else {
            print!("{text}");
        }
        self.placeholder_visible = true;
        self.flush();
    }

    fn hide_placeholder(&mut self) {
        self.clear_placeholder_line();
        self.flush();
    }

    fn render_notice(&mut self, text: &str, severity: Severity) {
        let notice = Notice::new(text, severity);
        if self.notices.visible().contains(&notice) {
            return;
        }
        self.notices.post(notice);
        self.clear_placeholder_line();
        let color = match severity {
            Severity::Info => ANSI_BLUE,
            Severity::Success => ANSI_GREEN,
            Severity::Warning => ANSI_YELLOW,
            Severity::Error => ANSI_RED,
        };
        eprintln!("{}", self.paint(color, &format!("[{severity}] {text}")));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn reset_view(&mut self, featured: &[FeatureInfo]) {
        self.clear_placeholder_line();
        if self.use_color {
            print!("\x1b[2J\x1b[H");
        }
        println!("Start a conversation, or pick a feature:");
        for feature in featured {
            println!("  {} {} ({})", feature.icon, feature.name, feature.id);
        }
        println!();
        self.flush();
    }
}
