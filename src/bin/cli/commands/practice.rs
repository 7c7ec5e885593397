use clap::Args;
use jambcbt::dto::CreateSessionDto;
use rand::seq::SliceRandom;
use std::io::{BufRead, Write};
use std::time::Instant;

use crate::client::JambcbtClient;
use crate::output::OutputConfig;

/// Arguments for an interactive practice drill
#[derive(Args, Debug)]
pub struct PracticeArgs {
    /// The subject to practice
    #[clap(long)]
    pub subject: String,
    /// How many questions to attempt
    #[clap(long, default_value_t = 10)]
    pub count: usize,
    /// Restrict to a single topic
    #[clap(long)]
    pub topic: Option<String>,
    /// Restrict to a single exam year
    #[clap(long)]
    pub year: Option<String>,
    /// Run in exam mode
    #[clap(long)]
    pub exam: bool,
}

/// Runs an interactive drill in the terminal and records the session
///
/// Questions are fetched from the server, asked one at a time, and the
/// outcome is stored as a session when the drill finishes. Entering `q`
/// ends the drill early; unanswered questions are not scored.
pub async fn execute(
    client: &JambcbtClient,
    args: PracticeArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut questions = client
        .get_questions(
            &args.subject,
            Some(args.count),
            args.topic.clone(),
            args.year.clone(),
            args.exam,
        )
        .await?;

    if questions.is_empty() {
        println!("No questions available for {}.", args.subject);
        return Ok(());
    }

    // A cached batch comes back in a fixed order, so reshuffle locally
    questions.shuffle(&mut rand::rng());

    let mode = if args.exam { "exam" } else { "practice" };
    let started = Instant::now();
    let mut correct = 0;
    let mut wrong = 0;
    let stdin = std::io::stdin();

    for (index, question) in questions.iter().enumerate() {
        println!();
        println!("{}/{}. {}", index + 1, questions.len(), question.get_question());
        let labels = question.get_option_labels();
        if let Some(options) = question.get_options().0.as_object() {
            for label in &labels {
                if let Some(text) = options.get(label).and_then(|t| t.as_str()) {
                    println!("   {}) {}", label, text);
                }
            }
        }

        print!("Your answer ({}, or q to stop): ", labels.join("/"));
        std::io::stdout().flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        let choice = line.trim().to_lowercase();

        if choice == "q" {
            break;
        }
        if choice == question.get_answer() {
            correct += 1;
            println!("Correct.");
        } else {
            wrong += 1;
            println!("Wrong. The answer is {}.", question.get_answer());
            if let Some(explanation) = question.get_explanation() {
                println!("{}", explanation);
            }
        }
    }

    let answered = correct + wrong;
    if answered == 0 {
        println!("Nothing answered, nothing recorded.");
        return Ok(());
    }

    let score = 100.0 * f64::from(correct) / f64::from(answered);
    let duration_secs = started.elapsed().as_secs() as i32;
    let breakdown = serde_json::json!({
        args.subject.clone(): { "correct": correct, "total": answered }
    });

    let session = client
        .create_session(CreateSessionDto {
            mode: mode.to_string(),
            subjects: vec![args.subject.clone()],
            breakdown,
            correct_count: correct,
            wrong_count: wrong,
            score,
            duration_secs,
        })
        .await?;

    println!();
    if config.quiet {
        println!("{}", session.get_id());
    } else {
        println!(
            "Score: {:.1}% ({} of {} correct in {}s)",
            score, correct, answered, duration_secs
        );
    }
    Ok(())
}
