use clap::Subcommand;

use crate::client::JambcbtClient;
use crate::output::{self, OutputConfig};

/// Session history commands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// List recent practice and exam sessions, newest first
    List,
}

/// Executes a session command
pub async fn execute(
    client: &JambcbtClient,
    cmd: SessionCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SessionCommands::List => {
            let sessions = client.list_sessions().await?;
            output::print_sessions(&sessions, config);
        }
    }
    Ok(())
}
