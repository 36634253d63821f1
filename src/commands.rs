//! Slash command parsing for the chatterbox REPL.
//!
//! Input starting with `/` controls the session instead of being sent to the
//! backend.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Switch to a feature.
    Feature(String),

    /// Switch to a model.
    Model(String),

    /// Upload a file from disk.
    Upload(String),

    /// Clear the conversation and start a new session.
    Clear,

    /// List features, optionally filtered by a search query.
    Features(Option<String>),

    /// List models.
    Models,

    /// Show the locally stored history of this session.
    History,

    /// Ask the backend for its status.
    Status,

    /// Show the server-side log of this session.
    Remote,

    /// Show the current session, feature and model.
    Session,

    /// Display help information.
    Help,

    /// Exit the application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent as a regular message.
///
/// # Examples
///
/// ```
/// # use chatterbox::commands::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model qwen/qwen3-32b").is_some());
/// assert!(parse_command("Hello there").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "feature" | "f" => required(argument, ChatCommand::Feature, "/feature requires a feature id"),
        "model" | "m" => required(argument, ChatCommand::Model, "/model requires a model id"),
        "upload" | "u" => required(argument, ChatCommand::Upload, "/upload requires a file path"),
        "clear" | "new" => ChatCommand::Clear,
        "features" => ChatCommand::Features(argument.map(str::to_string)),
        "models" => ChatCommand::Models,
        "history" => ChatCommand::History,
        "status" => ChatCommand::Status,
        "remote" => ChatCommand::Remote,
        "session" => ChatCommand::Session,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        other => ChatCommand::Invalid(format!("Unknown command: /{other}")),
    };

    Some(result)
}

fn required<F>(argument: Option<&str>, constructor: F, missing: &str) -> ChatCommand
where
    F: FnOnce(String) -> ChatCommand,
{
    match argument {
        Some(arg) => constructor(arg.to_string()),
        None => ChatCommand::Invalid(missing.to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /feature <id>          Switch feature (e.g., /feature code_analyzer)
  /model <id>            Switch model (e.g., /model llama-3.1-8b-instant)
  /upload <path>         Upload a pdf, txt, docx, csv or zip file
  /features [query]      List features, optionally filtered by name
  /models                List models
  /history               Show this session's stored messages
  /status                Show backend status
  /remote                Show the backend's log of this session
  /session               Show the current session, feature and model
  /clear                 Clear the conversation and start a new session
  /help                  Show this help message
  /quit                  Exit"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/new"), Some(ChatCommand::Clear));
    }

    #[test]
    fn parse_feature_and_model() {
        assert_eq!(
            parse_command("/feature   code_analyzer "),
            Some(ChatCommand::Feature("code_analyzer".to_string()))
        );
        assert_eq!(
            parse_command("/model qwen/qwen3-32b"),
            Some(ChatCommand::Model("qwen/qwen3-32b".to_string()))
        );
        assert_eq!(
            parse_command("/model"),
            Some(ChatCommand::Invalid("/model requires a model id".to_string()))
        );
        assert_eq!(
            parse_command("/feature"),
            Some(ChatCommand::Invalid(
                "/feature requires a feature id".to_string()
            ))
        );
    }

    #[test]
    fn parse_upload_keeps_spaces_in_path() {
        assert_eq!(
            parse_command("/upload My Documents/report.pdf"),
            Some(ChatCommand::Upload("My Documents/report.pdf".to_string()))
        );
        assert_eq!(
            parse_command("/upload"),
            Some(ChatCommand::Invalid("/upload requires a file path".to_string()))
        );
    }

    #[test]
    fn parse_listings() {
        assert_eq!(parse_command("/features"), Some(ChatCommand::Features(None)));
        assert_eq!(
            parse_command("/features code"),
            Some(ChatCommand::Features(Some("code".to_string())))
        );
        assert_eq!(parse_command("/models"), Some(ChatCommand::Models));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/remote"), Some(ChatCommand::Remote));
        assert_eq!(parse_command("/session"), Some(ChatCommand::Session));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/dance"),
            Some(ChatCommand::Invalid("Unknown command: /dance".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("what is 1/2?"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/feature"));
        assert!(help.contains("/upload"));
        assert!(help.contains("/quit"));
    }
}
