use clap::ValueEnum;
use jambcbt::dto::{AiSettingsResponseDto, StatsResponseDto, SubjectDto, SyncSubjectResult};
use jambcbt::models::{Flashcard, Question, Session};
use std::collections::BTreeMap;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

/// Prints the subject registry
pub fn print_subjects(subjects: &[SubjectDto], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                for subject in subjects {
                    println!("{}", subject.id);
                }
                return;
            }
            let max_id = subjects.iter().map(|s| s.id.len()).max().unwrap_or(2);
            println!("{:<width$}  NAME", "ID", width = max_id);
            for subject in subjects {
                println!("{:<width$}  {}", subject.id, subject.name, width = max_id);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(subjects).unwrap());
        }
    }
}

/// Prints question bank statistics
pub fn print_stats(stats: &StatsResponseDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", stats.total);
                return;
            }
            if let Some(map) = stats.subjects.as_object() {
                for (subject, count) in map {
                    println!("{:<12}  {}", subject, count);
                }
            }
            println!("{:<12}  {}", "TOTAL", stats.total);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats).unwrap());
        }
    }
}

/// Prints a batch of questions one at a time with their options
pub fn print_questions(questions: &[Question], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if questions.is_empty() {
                if !config.quiet {
                    println!("No questions found.");
                }
                return;
            }
            if config.quiet {
                for question in questions {
                    println!("{}", question.get_id());
                }
                return;
            }
            for (index, question) in questions.iter().enumerate() {
                println!("{}. {}", index + 1, question.get_question());
                if let Some(options) = question.get_options().0.as_object() {
                    for (label, text) in options {
                        if let Some(text) = text.as_str() {
                            println!("   {}) {}", label, text);
                        }
                    }
                }
                println!("   Answer: {}", question.get_answer());
                if let Some(explanation) = question.get_explanation() {
                    println!("   {}", explanation);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(questions).unwrap());
        }
    }
}

/// Prints per-subject sync results
pub fn print_sync_results(results: &BTreeMap<String, SyncSubjectResult>, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                let saved: usize = results.values().map(|r| r.saved).sum();
                println!("{}", saved);
                return;
            }
            println!("{:<12}  FETCHED  SAVED", "SUBJECT");
            for (subject, result) in results {
                println!("{:<12}  {:<7}  {}", subject, result.fetched, result.saved);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results).unwrap());
        }
    }
}

/// Prints a list of flashcards
pub fn print_flashcards(cards: &[Flashcard], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if cards.is_empty() {
                if !config.quiet {
                    println!("No flashcards found.");
                }
                return;
            }
            if config.quiet {
                for card in cards {
                    println!("{}", card.get_id());
                }
                return;
            }
            for card in cards {
                print_flashcard_lines(card);
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(cards).unwrap());
        }
    }
}

/// Prints a single flashcard
pub fn print_flashcard(card: &Flashcard, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card.get_id());
                return;
            }
            print_flashcard_lines(card);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(card).unwrap());
        }
    }
}

fn print_flashcard_lines(card: &Flashcard) {
    println!("ID:       {}", card.get_id());
    println!("Subject:  {} / {}", card.get_subject(), card.get_topic());
    println!("Front:    {}", card.get_front());
    println!("Back:     {}", card.get_back());
    println!(
        "Mastery:  {}%  (streak {}, interval {}d)",
        card.get_mastery(),
        card.get_streak(),
        card.get_interval_days()
    );
    match card.get_next_review() {
        Some(next) => println!("Next:     {}", next),
        None => println!("Next:     now"),
    }
}

/// Prints the AI provider settings
pub fn print_ai_settings(settings: &AiSettingsResponseDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", settings.provider);
                return;
            }
            println!("Provider:  {}", settings.provider);
            println!("Model:     {}", settings.model);
            println!("Available: {}", settings.available_providers.join(", "));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(settings).unwrap());
        }
    }
}

/// Prints recent sessions
pub fn print_sessions(sessions: &[Session], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if sessions.is_empty() {
                if !config.quiet {
                    println!("No sessions recorded.");
                }
                return;
            }
            if config.quiet {
                for session in sessions {
                    println!("{}", session.get_id());
                }
                return;
            }
            for session in sessions {
                println!(
                    "{}  {:<8}  {:>5.1}%  ({} correct, {} wrong, {}s)",
                    session.get_created_at().format("%Y-%m-%d %H:%M"),
                    session.get_mode(),
                    session.get_score(),
                    session.get_correct_count(),
                    session.get_wrong_count(),
                    session.get_duration_secs()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(sessions).unwrap());
        }
    }
}
