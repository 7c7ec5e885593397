use clap::Subcommand;

use crate::client::JambcbtClient;
use crate::output::{self, OutputConfig};

/// Question bank commands
#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    /// Fetch a batch of questions for a subject
    Fetch {
        /// The subject to fetch
        #[clap(long)]
        subject: String,
        /// How many questions to fetch
        #[clap(long)]
        count: Option<usize>,
        /// Restrict to a single topic
        #[clap(long)]
        topic: Option<String>,
        /// Restrict to a single exam year
        #[clap(long)]
        year: Option<String>,
        /// Fetch in exam mode
        #[clap(long)]
        exam: bool,
    },
    /// Generate fresh questions with the configured AI provider
    Generate {
        /// The subject to generate for
        #[clap(long)]
        subject: String,
        /// An optional topic to focus on
        #[clap(long)]
        topic: Option<String>,
        /// How many questions to generate
        #[clap(long)]
        count: Option<usize>,
    },
    /// Sync questions from the upstream bank into local storage
    Sync {
        /// A single subject to sync; omit to sync all subjects
        #[clap(long)]
        subject: Option<String>,
        /// Target number of questions per subject
        #[clap(long)]
        count: Option<usize>,
    },
    /// Show per-subject question bank statistics
    Stats,
    /// List the available subjects
    Subjects,
}

/// Executes a question command
pub async fn execute(
    client: &JambcbtClient,
    cmd: QuestionCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        QuestionCommands::Fetch {
            subject,
            count,
            topic,
            year,
            exam,
        } => {
            let questions = client
                .get_questions(&subject, count, topic, year, exam)
                .await?;
            output::print_questions(&questions, config);
        }
        QuestionCommands::Generate {
            subject,
            topic,
            count,
        } => {
            let questions = client.generate_questions(subject, topic, count).await?;
            output::print_questions(&questions, config);
        }
        QuestionCommands::Sync { subject, count } => {
            let results = client.sync_questions(subject, count).await?;
            output::print_sync_results(&results, config);
        }
        QuestionCommands::Stats => {
            let stats = client.get_stats().await?;
            output::print_stats(&stats, config);
        }
        QuestionCommands::Subjects => {
            let subjects = client.list_subjects().await?;
            output::print_subjects(&subjects, config);
        }
    }
    Ok(())
}
