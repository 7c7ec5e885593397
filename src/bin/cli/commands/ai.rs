use clap::Subcommand;

use crate::client::JambcbtClient;
use crate::output::{self, OutputConfig};

/// AI assistant commands
#[derive(Subcommand, Debug)]
pub enum AiCommands {
    /// Ask the AI study assistant a question
    Ask {
        /// The question to ask
        question: String,
        /// The subject the question is about
        #[clap(long)]
        subject: Option<String>,
    },
    /// Show the current provider settings
    Settings,
    /// Select the provider and model to use
    Use {
        /// The provider name (gemini, grok, or cerebras)
        provider: String,
        /// The model identifier
        model: String,
    },
    /// Clear the saved conversation history
    ClearHistory,
}

/// Executes an AI assistant command
pub async fn execute(
    client: &JambcbtClient,
    cmd: AiCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AiCommands::Ask { question, subject } => {
            let answer = client.ask(question, subject).await?;
            if config.quiet {
                println!("{}", answer.response);
            } else {
                println!("{}", answer.response);
                if answer.cached {
                    println!("(cached)");
                }
            }
        }
        AiCommands::Settings => {
            let settings = client.get_ai_settings().await?;
            output::print_ai_settings(&settings, config);
        }
        AiCommands::Use { provider, model } => {
            let settings = client.update_ai_settings(provider, model).await?;
            output::print_ai_settings(&settings, config);
        }
        AiCommands::ClearHistory => {
            client.clear_ai_history().await?;
            if !config.quiet {
                println!("Conversation history cleared.");
            }
        }
    }
    Ok(())
}
