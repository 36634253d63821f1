//! Interactive terminal client for feature-mode chat backends.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on localhost:8000 with the default feature and model
//! chatterbox
//!
//! # Pick the backend, feature and model
//! chatterbox --url https://chat.example.com/ --feature code_analyzer --model qwen/qwen3-32b
//!
//! # Pick up where a previous session left off
//! chatterbox --session session_1717171717171_k3j9x0a2b
//!
//! # Disable colors (useful for piping output)
//! chatterbox --no-color
//! ```
//!
//! Set `RUST_LOG=chatterbox=debug` to see request tracing on stderr.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use chatterbox::commands::{ChatCommand, help_text, parse_command};
use chatterbox::{
    ChatArgs, ControllerConfig, FeatureId, FileStorage, HttpTransport, ModelId,
    PlainTextRenderer, Registry, SessionController, UploadFile,
};

type Controller = SessionController<HttpTransport, FileStorage, PlainTextRenderer>;

/// Main entry point for the chatterbox application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();

    let (args, _) = ChatArgs::from_command_line_relaxed("chatterbox [OPTIONS]");
    let config = ControllerConfig::from(args);

    let registry = match &config.catalog_path {
        Some(path) => Registry::load(path)?,
        None => Registry::default(),
    };
    let transport = HttpTransport::with_options(Some(config.base_url.as_str()), Some(config.timeout))?;
    let storage = FileStorage::new(&config.storage_dir);
    let renderer =
        PlainTextRenderer::with_color(config.use_color).with_notices(config.notice_board());
    let controller = match &config.resume_session {
        Some(session_id) => SessionController::resume(
            &config,
            registry,
            transport,
            storage,
            renderer,
            session_id.clone(),
        ),
        None => SessionController::new(&config, registry, transport, storage, renderer),
    };

    let mut rl = DefaultEditor::new()?;
    print_session(&controller);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let Some(command) = parse_command(line) else {
                    // Failures are already rendered inline and as a notice.
                    let _ = controller.send_message(line).await;
                    continue;
                };
                match command {
                    ChatCommand::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                    ChatCommand::Feature(id) => controller.select_feature(FeatureId::from(id)),
                    ChatCommand::Model(id) => controller.select_model(ModelId::from(id)),
                    ChatCommand::Upload(path) => match UploadFile::read(&path) {
                        Ok(file) => {
                            let _ = controller.upload_file(file).await;
                        }
                        Err(err) => eprintln!("{err}"),
                    },
                    ChatCommand::Clear => controller.clear_conversation(),
                    ChatCommand::Features(query) => print_features(&controller, query.as_deref()),
                    ChatCommand::Models => print_models(&controller),
                    ChatCommand::History => print_history(&controller),
                    ChatCommand::Status => match controller.service_status().await {
                        Ok(status) => {
                            println!("    Backend: {}", status.status);
                            if let Some(service) = &status.service {
                                println!("      Service: {service}");
                            }
                            if let Some(version) = &status.version {
                                println!("      Version: {version}");
                            }
                            if let Some(models) = status.models_available {
                                println!("      Models: {models}");
                            }
                            if let Some(features) = status.features_available {
                                println!("      Features: {features}");
                            }
                        }
                        Err(err) => eprintln!("Status unavailable: {err}"),
                    },
                    ChatCommand::Remote => match controller.remote_history().await {
                        Ok(remote) => {
                            println!("    Backend log ({} exchanges):", remote.count);
                            for turn in &remote.conversations {
                                println!("      [{}] {}", turn.feature, turn.user_input);
                                println!("        -> {}", turn.ai_response);
                            }
                        }
                        Err(err) => eprintln!("Backend log unavailable: {err}"),
                    },
                    ChatCommand::Session => print_session(&controller),
                    ChatCommand::Help => {
                        for line in help_text().lines() {
                            println!("    {}", line);
                        }
                    }
                    ChatCommand::Invalid(message) => eprintln!("{message}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_session(controller: &Controller) {
    let registry = controller.registry();
    let feature = controller
        .current_feature()
        .map(|id| format!("{} {}", registry.feature_icon(&id), registry.feature_name(&id)))
        .unwrap_or_else(|| "(none)".to_string());
    println!("    Session: {}", controller.session_id());
    println!("      Feature: {feature}");
    println!(
        "      Model: {}",
        registry.model_label(&controller.current_model())
    );
    println!("      Stored messages: {}", controller.history_store().len());
}

fn print_features(controller: &Controller, query: Option<&str>) {
    let registry = controller.registry();
    let features = registry.search(query.unwrap_or(""));
    if features.is_empty() {
        println!("    No features match.");
        return;
    }
    for feature in features {
        println!("    {} {:<28} {}", feature.icon, feature.name, feature.id);
    }
}

fn print_models(controller: &Controller) {
    let current = controller.current_model();
    for model in controller.registry().models() {
        let marker = if model.id == current { "*" } else { " " };
        println!("  {marker} {:<28} {}", model.label(), model.id);
    }
}

fn print_history(controller: &Controller) {
    let history = controller.history();
    if history.is_empty() {
        println!("    (no messages)");
        return;
    }
    for message in history {
        let who = if message.is_user() { "you" } else { "ai" };
        println!(
            "    {} {:>3} [{}] {}",
            chatterbox::utils::time::clock(&message.timestamp),
            who,
            message.feature,
            message.body
        );
    }
}
