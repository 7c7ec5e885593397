use jambcbt::dto::{
    AiSettingsResponseDto, AskAiDto, AskAiResponseDto, CreateFlashcardDto, CreateSessionDto,
    GenerateFlashcardsDto, GenerateQuestionsDto, ReviewFlashcardDto, StatsResponseDto,
    SubjectDto, SyncRequestDto, SyncSubjectResult, UpdateAiSettingsDto,
};
use jambcbt::models::{Flashcard, Question, Session};
use jambcbt::scheduler::Difficulty;
use reqwest::Client;
use std::collections::BTreeMap;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server {
        status: reqwest::StatusCode,
        message: String,
    },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// Server returned a body the client could not interpret
    Malformed(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::Malformed(msg) => write!(f, "Unexpected server response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            _ => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// HTTP client wrapper for communicating with the jambcbt server
pub struct JambcbtClient {
    /// The base URL of the server (e.g. "http://localhost:3001")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl JambcbtClient {
    /// Creates a new JambcbtClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the jambcbt server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    // ── Question endpoints ───────────────────────────────────────────

    /// Lists the fixed subject registry
    pub async fn list_subjects(&self) -> Result<Vec<SubjectDto>, ClientError> {
        let url = format!("{}/api/subjects", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Fetches question bank statistics
    pub async fn get_stats(&self) -> Result<StatsResponseDto, ClientError> {
        let url = format!("{}/api/stats", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Fetches a batch of questions for a subject
    pub async fn get_questions(
        &self,
        subject: &str,
        count: Option<usize>,
        topic: Option<String>,
        year: Option<String>,
        exam_mode: bool,
    ) -> Result<Vec<Question>, ClientError> {
        let url = format!("{}/api/questions", self.base_url);
        let mut params: Vec<(&'static str, String)> = vec![("subject", subject.to_string())];
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        if let Some(topic) = topic {
            params.push(("topic", topic));
        }
        if let Some(year) = year {
            params.push(("year", year));
        }
        if exam_mode {
            params.push(("mode", "exam".to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let envelope: serde_json::Value =
            response.json().await.map_err(ClientError::Request)?;
        let data = envelope
            .get("data")
            .cloned()
            .ok_or_else(|| ClientError::Malformed("missing data field".to_string()))?;
        serde_json::from_value(data).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Requests AI generation of fresh questions
    pub async fn generate_questions(
        &self,
        subject: String,
        topic: Option<String>,
        count: Option<usize>,
    ) -> Result<Vec<Question>, ClientError> {
        let url = format!("{}/api/questions/generate", self.base_url);
        let dto = GenerateQuestionsDto {
            subject: Some(subject),
            topic,
            count,
        };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let envelope: serde_json::Value =
            response.json().await.map_err(ClientError::Request)?;
        let data = envelope
            .get("data")
            .cloned()
            .ok_or_else(|| ClientError::Malformed("missing data field".to_string()))?;
        serde_json::from_value(data).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Syncs one subject (or all) from the upstream question bank
    pub async fn sync_questions(
        &self,
        subject: Option<String>,
        count: Option<usize>,
    ) -> Result<BTreeMap<String, SyncSubjectResult>, ClientError> {
        let url = format!("{}/api/questions/sync", self.base_url);
        let dto = SyncRequestDto { subject, count };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let envelope: serde_json::Value =
            response.json().await.map_err(ClientError::Request)?;
        let results = envelope
            .get("results")
            .cloned()
            .ok_or_else(|| ClientError::Malformed("missing results field".to_string()))?;
        serde_json::from_value(results).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    // ── Flashcard endpoints ──────────────────────────────────────────

    /// Lists flashcards with optional subject and topic filters
    pub async fn list_flashcards(
        &self,
        subject: Option<String>,
        topic: Option<String>,
    ) -> Result<Vec<Flashcard>, ClientError> {
        let url = format!("{}/api/flashcards", self.base_url);
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if let Some(subject) = subject {
            params.push(("subject", subject));
        }
        if let Some(topic) = topic {
            params.push(("topic", topic));
        }
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Lists the due-review queue, weakest first
    pub async fn due_flashcards(&self) -> Result<Vec<Flashcard>, ClientError> {
        let url = format!("{}/api/flashcards/due", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Creates a new flashcard
    pub async fn create_flashcard(
        &self,
        subject: String,
        topic: String,
        front: String,
        back: String,
    ) -> Result<Flashcard, ClientError> {
        let url = format!("{}/api/flashcards", self.base_url);
        let dto = CreateFlashcardDto {
            subject,
            topic,
            front,
            back,
        };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Records a review outcome for a flashcard
    ///
    /// Returns the rescheduled card, or None if the card no longer exists.
    pub async fn review_flashcard(
        &self,
        id: &str,
        correct: bool,
        difficulty: Difficulty,
    ) -> Result<Option<Flashcard>, ClientError> {
        let url = format!("{}/api/flashcards/{}/review", self.base_url, id);
        let dto = ReviewFlashcardDto {
            correct,
            difficulty,
        };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let envelope: serde_json::Value =
            response.json().await.map_err(ClientError::Request)?;
        let card = envelope
            .get("card")
            .cloned()
            .ok_or_else(|| ClientError::Malformed("missing card field".to_string()))?;
        if card.is_null() {
            return Ok(None);
        }
        serde_json::from_value(card)
            .map(Some)
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Deletes a flashcard
    pub async fn delete_flashcard(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/flashcards/{}", self.base_url, id);
        self.client
            .delete(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        Ok(())
    }

    /// Requests AI generation of flashcards for a topic
    pub async fn generate_flashcards(
        &self,
        subject: String,
        topic: String,
        count: Option<usize>,
    ) -> Result<Vec<Flashcard>, ClientError> {
        let url = format!("{}/api/flashcards/generate", self.base_url);
        let dto = GenerateFlashcardsDto {
            subject,
            topic,
            count,
        };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── AI assistant endpoints ───────────────────────────────────────

    /// Asks the AI study assistant a question
    pub async fn ask(
        &self,
        question: String,
        subject: Option<String>,
    ) -> Result<AskAiResponseDto, ClientError> {
        let url = format!("{}/api/ai/ask", self.base_url);
        let dto = AskAiDto {
            question,
            subject,
            context: None,
        };
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Fetches the current AI provider settings
    pub async fn get_ai_settings(&self) -> Result<AiSettingsResponseDto, ClientError> {
        let url = format!("{}/api/ai/settings", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Updates the AI provider settings and returns the resulting state
    pub async fn update_ai_settings(
        &self,
        provider: String,
        model: String,
    ) -> Result<AiSettingsResponseDto, ClientError> {
        let url = format!("{}/api/ai/settings", self.base_url);
        let dto = UpdateAiSettingsDto { provider, model };
        self.client
            .put(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        self.get_ai_settings().await
    }

    /// Clears the AI conversation history
    pub async fn clear_ai_history(&self) -> Result<(), ClientError> {
        let url = format!("{}/api/ai/history", self.base_url);
        self.client
            .delete(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        Ok(())
    }

    // ── Session endpoints ────────────────────────────────────────────

    /// Records a completed practice or exam session
    pub async fn create_session(&self, dto: CreateSessionDto) -> Result<Session, ClientError> {
        let url = format!("{}/api/sessions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Lists recent sessions, newest first
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let url = format!("{}/api/sessions", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }
}
