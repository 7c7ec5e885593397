use clap::{Subcommand, ValueEnum};
use jambcbt::scheduler::Difficulty;

use crate::client::JambcbtClient;
use crate::output::{self, OutputConfig};

/// How hard the card felt, as a CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Flashcard management commands
#[derive(Subcommand, Debug)]
pub enum FlashcardCommands {
    /// List flashcards
    List {
        /// Filter by subject
        #[clap(long)]
        subject: Option<String>,
        /// Filter by topic
        #[clap(long)]
        topic: Option<String>,
    },
    /// Show the due-review queue, weakest first
    Due,
    /// Create a new flashcard
    Add {
        /// The subject the card belongs to
        #[clap(long)]
        subject: String,
        /// The topic the card belongs to
        #[clap(long)]
        topic: String,
        /// The prompt side of the card
        #[clap(long)]
        front: String,
        /// The answer side of the card
        #[clap(long)]
        back: String,
    },
    /// Record a review outcome for a card
    Review {
        /// The card ID to review
        id: String,
        /// Mark the review as incorrect
        #[clap(long)]
        wrong: bool,
        /// How hard the card felt
        #[clap(long, value_enum, default_value_t = DifficultyArg::Normal)]
        difficulty: DifficultyArg,
    },
    /// Delete a flashcard
    Delete {
        /// The card ID to delete
        id: String,
    },
    /// Generate flashcards for a topic with the configured AI provider
    Generate {
        /// The subject to generate for
        #[clap(long)]
        subject: String,
        /// The topic to generate for
        #[clap(long)]
        topic: String,
        /// How many cards to generate
        #[clap(long)]
        count: Option<usize>,
    },
}

/// Executes a flashcard command
pub async fn execute(
    client: &JambcbtClient,
    cmd: FlashcardCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FlashcardCommands::List { subject, topic } => {
            let cards = client.list_flashcards(subject, topic).await?;
            output::print_flashcards(&cards, config);
        }
        FlashcardCommands::Due => {
            let cards = client.due_flashcards().await?;
            output::print_flashcards(&cards, config);
        }
        FlashcardCommands::Add {
            subject,
            topic,
            front,
            back,
        } => {
            let card = client.create_flashcard(subject, topic, front, back).await?;
            output::print_flashcard(&card, config);
        }
        FlashcardCommands::Review {
            id,
            wrong,
            difficulty,
        } => {
            let card = client
                .review_flashcard(&id, !wrong, difficulty.into())
                .await?;
            match card {
                Some(card) => output::print_flashcard(&card, config),
                None => {
                    if !config.quiet {
                        println!("Card {} no longer exists.", id);
                    }
                }
            }
        }
        FlashcardCommands::Delete { id } => {
            client.delete_flashcard(&id).await?;
            if !config.quiet {
                println!("Deleted {}", id);
            }
        }
        FlashcardCommands::Generate {
            subject,
            topic,
            count,
        } => {
            let cards = client.generate_flashcards(subject, topic, count).await?;
            output::print_flashcards(&cards, config);
        }
    }
    Ok(())
}
