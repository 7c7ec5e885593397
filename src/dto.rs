use serde::{Deserialize, Serialize};

use crate::clients::ChatMessage;
use crate::scheduler::Difficulty;

/// Query parameters for fetching practice or exam questions
///
/// This struct is used to deserialize the query string of question requests.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct QuestionQueryDto {
    /// The subject to fetch questions for (required)
    pub subject: Option<String>,

    /// How many questions to return
    pub count: Option<usize>,

    /// The topic to filter by
    pub topic: Option<String>,

    /// The exam year to filter by
    pub year: Option<String>,

    /// "practice" or "exam"; exam mode pads English with the
    /// prescribed-text supplement
    pub mode: Option<String>,
}

/// Data transfer object for requesting AI question generation
#[derive(Serialize, Deserialize, Debug)]
pub struct GenerateQuestionsDto {
    /// The subject to generate questions for
    pub subject: Option<String>,

    /// The topic to focus the questions on
    pub topic: Option<String>,

    /// How many questions to generate
    pub count: Option<usize>,
}

/// Data transfer object for requesting a question-bank sync
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct SyncRequestDto {
    /// The subject to sync; all subjects when absent
    pub subject: Option<String>,

    /// How many questions to request per subject
    pub count: Option<usize>,
}

/// Per-subject outcome of a sync
#[derive(Serialize, Deserialize, Debug)]
pub struct SyncSubjectResult {
    /// Questions fetched from upstream
    pub fetched: usize,

    /// Questions newly saved or refreshed in the bank
    pub saved: usize,
}

/// Data transfer object for creating a flashcard
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateFlashcardDto {
    /// The subject the card belongs to
    pub subject: String,

    /// The topic within the subject
    pub topic: String,

    /// Front of the card (prompt)
    pub front: String,

    /// Back of the card (answer)
    pub back: String,
}

/// Data transfer object for recording a flashcard review
#[derive(Serialize, Deserialize, Debug)]
pub struct ReviewFlashcardDto {
    /// Whether the answer was recalled correctly
    pub correct: bool,

    /// Self-rated difficulty; defaults to normal
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Data transfer object for AI flashcard generation
#[derive(Serialize, Deserialize, Debug)]
pub struct GenerateFlashcardsDto {
    /// The subject to generate cards for
    pub subject: String,

    /// The topic the cards should cover
    pub topic: String,

    /// How many cards to generate
    pub count: Option<usize>,
}

/// Query parameters for listing flashcards
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct FlashcardQueryDto {
    /// The subject to filter by
    pub subject: Option<String>,

    /// The topic to filter by
    pub topic: Option<String>,
}

/// Data transfer object for asking the AI assistant a question
#[derive(Serialize, Deserialize, Debug)]
pub struct AskAiDto {
    /// The student's question
    pub question: String,

    /// The subject the question concerns, if any
    pub subject: Option<String>,

    /// Extra context, such as the exam question being puzzled over
    pub context: Option<String>,
}

/// Response from the AI assistant
#[derive(Serialize, Deserialize, Debug)]
pub struct AskAiResponseDto {
    /// The assistant's reply
    pub response: String,

    /// Whether the reply came from the response cache
    pub cached: bool,
}

/// Data transfer object for updating AI settings
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateAiSettingsDto {
    /// The provider id, e.g. "gemini"
    pub provider: String,

    /// The model id, e.g. "gemini-1.5-flash"
    pub model: String,
}

/// Current AI settings and what is actually usable
#[derive(Serialize, Deserialize, Debug)]
pub struct AiSettingsResponseDto {
    /// The selected provider id
    pub provider: String,

    /// The selected model id
    pub model: String,

    /// Providers a key is configured for
    pub available_providers: Vec<String>,
}

/// The stored assistant conversation
#[derive(Serialize, Deserialize, Debug)]
pub struct AiHistoryResponseDto {
    pub messages: Vec<ChatMessage>,
}

/// Data transfer object for requesting a novel analysis
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateNovelDto {
    /// Title of the prescribed text
    pub title: String,

    /// Author of the prescribed text
    pub author: String,
}

/// Data transfer object for recording a finished session
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateSessionDto {
    /// "practice" or "exam"
    pub mode: String,

    /// Subject ids taken in the session
    pub subjects: Vec<String>,

    /// Per-subject results, keyed by subject id
    pub breakdown: serde_json::Value,

    /// Questions answered correctly
    pub correct_count: i32,

    /// Questions answered incorrectly
    pub wrong_count: i32,

    /// Overall score as a percentage
    pub score: f64,

    /// Time spent, in seconds
    pub duration_secs: i32,
}

/// A subject as listed by the subjects endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct SubjectDto {
    pub id: String,
    pub name: String,
}

/// Per-subject question counts for the stats endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct StatsResponseDto {
    /// Question counts keyed by subject id
    pub subjects: serde_json::Value,

    /// Total questions in the bank
    pub total: i64,
}
