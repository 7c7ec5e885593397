mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::JambcbtClient;
use directories::ProjectDirs;
use jambcbt::config;
use output::{OutputConfig, OutputFormat};
use std::process;

/// CLI for the jambcbt practice server
#[derive(Parser, Debug)]
#[clap(name = "jambcbt-cli", about = "CLI for the jambcbt practice server")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "JAMBCBT_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Work with the question bank
    #[command(subcommand)]
    Question(commands::question::QuestionCommands),
    /// Manage flashcards
    #[command(subcommand)]
    Flashcard(commands::flashcard::FlashcardCommands),
    /// Talk to the AI study assistant
    #[command(subcommand)]
    Ai(commands::ai::AiCommands),
    /// Browse past sessions
    #[command(subcommand)]
    Session(commands::session::SessionCommands),
    /// Run an interactive drill and record the result
    Practice(commands::practice::PracticeArgs),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default localhost:3001
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    // Try reading the server's own config file for its bind address
    if let Some(proj_dirs) = ProjectDirs::from("ng", "jambcbt", "jambcbt") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path)) {
            if update.bind_address.is_some() || update.port.is_some() {
                let host = update.bind_address.unwrap_or_else(|| "localhost".to_string());
                let port = update.port.unwrap_or(3001);
                return format!("http://{}:{}", host, port);
            }
        }
    }

    "http://localhost:3001".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    // ClientError::Request wraps reqwest errors, so look for connection issues
    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is jambcbt running?\n  {}",
            err_string
        );
    }

    // ClientError::Server already formats as "Server error (STATUS): message"
    // so we can return it directly
    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = JambcbtClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Question(cmd) => commands::question::execute(&client, cmd, &output_config).await,
        Commands::Flashcard(cmd) => {
            commands::flashcard::execute(&client, cmd, &output_config).await
        }
        Commands::Ai(cmd) => commands::ai::execute(&client, cmd, &output_config).await,
        Commands::Session(cmd) => commands::session::execute(&client, cmd, &output_config).await,
        Commands::Practice(args) => {
            commands::practice::execute(&client, args, &output_config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
