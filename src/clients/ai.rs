//! Clients for the generative-AI providers.
//!
//! Three providers are supported: Gemini through its native generateContent
//! API, and Grok and Cerebras through their OpenAI-style chat completions
//! endpoints. Which provider answers a request is a runtime setting; the
//! client holds whichever keys were configured and refuses calls for the
//! rest.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{SourceError, with_rate_limit_backoff};
use crate::models::{Flashcard, FlashcardSource, Question};
use crate::subjects;

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GROK_URL: &str = "https://api.x.ai/v1/chat/completions";
const CEREBRAS_URL: &str = "https://api.cerebras.ai/v1/chat/completions";

/// Attempts for a rate-limited AI call before giving up
const AI_ATTEMPTS: u32 = 3;

/// Standing instruction sent with every tutoring request
pub const SYSTEM_INSTRUCTION: &str = "You are Ilom, an expert educational AI assistant for a JAMB CBT practice application. \
Your role is to help Nigerian students prepare for their JAMB UTME examinations. \
Explain concepts from JAMB subjects clearly, break down problems step by step, \
use simple language appropriate for secondary school students, and keep examples \
relevant to Nigerian students. Focus only on educational content; politely redirect \
non-educational questions to study matters. End explanations with a brief Key \
Takeaway section to reinforce learning.";

/// A generative-AI provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    Grok,
    Cerebras,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::Grok => "grok",
            AiProvider::Cerebras => "cerebras",
        }
    }

    /// Parses a provider id, as stored in settings
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "gemini" => Some(AiProvider::Gemini),
            "grok" => Some(AiProvider::Grok),
            "cerebras" => Some(AiProvider::Cerebras),
            _ => None,
        }
    }

    /// The model used when settings name none
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-1.5-flash",
            AiProvider::Grok => "grok-beta",
            AiProvider::Cerebras => "llama-3.3-70b",
        }
    }
}

/// One turn of an assistant conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Client holding whichever provider keys were configured
#[derive(Debug, Clone)]
pub struct AiClient {
    client: reqwest::Client,
    gemini_key: Option<String>,
    grok_key: Option<String>,
    cerebras_key: Option<String>,
}

impl AiClient {
    pub fn new(
        gemini_key: Option<String>,
        grok_key: Option<String>,
        cerebras_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            gemini_key,
            grok_key,
            cerebras_key,
        })
    }

    /// The providers a key is configured for
    pub fn available_providers(&self) -> Vec<AiProvider> {
        let mut providers = Vec::new();
        if self.gemini_key.is_some() {
            providers.push(AiProvider::Gemini);
        }
        if self.grok_key.is_some() {
            providers.push(AiProvider::Grok);
        }
        if self.cerebras_key.is_some() {
            providers.push(AiProvider::Cerebras);
        }
        providers
    }

    /// Sends a prompt and prior conversation to a provider
    ///
    /// Rate limits are retried with exponential backoff; any other error
    /// propagates after the first attempt.
    #[instrument(skip(self, history, prompt))]
    pub async fn chat(
        &self,
        provider: AiProvider,
        model: &str,
        history: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, SourceError> {
        debug!("AI chat via {} model {}", provider.as_str(), model);

        with_rate_limit_backoff("AI chat", AI_ATTEMPTS, || async {
            match provider {
                AiProvider::Gemini => self.call_gemini(model, history, prompt).await,
                AiProvider::Grok => {
                    let key = self
                        .grok_key
                        .as_deref()
                        .ok_or(SourceError::ConfigMissing("Grok API key"))?;
                    self.call_chat_completions(GROK_URL, key, model, history, prompt)
                        .await
                }
                AiProvider::Cerebras => {
                    let key = self
                        .cerebras_key
                        .as_deref()
                        .ok_or(SourceError::ConfigMissing("Cerebras API key"))?;
                    self.call_chat_completions(CEREBRAS_URL, key, model, history, prompt)
                        .await
                }
            }
        })
        .await
    }

    async fn call_gemini(
        &self,
        model: &str,
        history: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, SourceError> {
        let key = self
            .gemini_key
            .as_deref()
            .ok_or(SourceError::ConfigMissing("Gemini API key"))?;

        // Gemini names the assistant role "model" and takes the system
        // instruction outside the message list
        let mut contents: Vec<Value> = history
            .iter()
            .map(|msg| {
                let role = if msg.role == "assistant" { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": msg.content}]})
            })
            .collect();
        contents.push(json!({"role": "user", "parts": [{"text": prompt}]}));

        let body = json!({
            "system_instruction": {"parts": [{"text": SYSTEM_INSTRUCTION}]},
            "contents": contents,
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": 2048,
            },
        });

        let url = format!("{}/{}:generateContent?key={}", GEMINI_URL, model, key);
        let payload = self.post(&url, &body).await?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SourceError::Malformed("no text in Gemini response".to_string()))
    }

    async fn call_chat_completions(
        &self,
        url: &str,
        key: &str,
        model: &str,
        history: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, SourceError> {
        let mut messages = vec![json!({"role": "system", "content": SYSTEM_INSTRUCTION})];
        messages.extend(
            history
                .iter()
                .map(|msg| json!({"role": msg.role, "content": msg.content})),
        );
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 2048,
        });

        let payload = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(SourceError::from)
            .and_then(check_status)?
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SourceError::Malformed("no content in chat response".to_string()))
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, SourceError> {
        let response = self.client.post(url).json(body).send().await?;
        let response = check_status(response)?;

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

/// Maps error statuses, treating quota complaints as rate limits
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited);
    }
    if !status.is_success() {
        return Err(SourceError::Http {
            status: status.as_u16(),
            body: String::new(),
        });
    }
    Ok(response)
}

/// Builds the prompt for exam-question generation
pub fn question_prompt(subject: &str, topic: Option<&str>, count: usize) -> String {
    let subject_name = subjects::display_name(subject);
    let topic_clause = topic
        .map(|t| format!(" on the topic \"{}\"", t))
        .unwrap_or_default();

    format!(
        "Generate {count} JAMB UTME {subject_name} questions{topic_clause}.\n\n\
Return ONLY a JSON array with this exact format:\n\
[\n\
  {{\n\
    \"question\": \"The question text here?\",\n\
    \"options\": {{\"a\": \"Option A\", \"b\": \"Option B\", \"c\": \"Option C\", \"d\": \"Option D\"}},\n\
    \"answer\": \"a\",\n\
    \"explanation\": \"Brief explanation of why this answer is correct\"\n\
  }}\n\
]\n\n\
Requirements:\n\
- Questions must be appropriate for Nigerian JAMB UTME level\n\
- Each question must have exactly 4 options (a, b, c, d)\n\
- Answer must be a single letter (a, b, c, or d)\n\
- Include a brief explanation for each answer\n\
- Make questions challenging but fair\n\
- Output ONLY the JSON array, no other text"
    )
}

/// Builds the prompt for flashcard generation
pub fn flashcard_prompt(subject: &str, topic: &str, count: usize) -> String {
    let subject_name = subjects::display_name(subject);

    format!(
        "Generate {count} flashcards for the JAMB {subject_name} topic: \"{topic}\".\n\n\
For each flashcard, provide:\n\
1. A clear question or prompt (front of card)\n\
2. A concise but complete answer (back of card)\n\n\
Format your response as a JSON array like this:\n\
[\n\
  {{\"front\": \"Question here?\", \"back\": \"Answer here\"}},\n\
  {{\"front\": \"Question here?\", \"back\": \"Answer here\"}}\n\
]\n\n\
Make the flashcards focus on key concepts that are commonly tested in JAMB exams.\n\
Only output the JSON array, no other text."
    )
}

/// Builds the prompt for a literary analysis of a prescribed text
pub fn novel_prompt(title: &str, author: &str) -> String {
    format!(
        "Generate a comprehensive literary analysis for the novel \"{title}\" by {author} \
for JAMB Literature students. Cover the plot, at least 5 main characters, 5 themes, and \
4 literary devices, with chapter-by-chapter notes where possible. Write it as structured \
study prose a student can revise from."
    )
}

/// Slices out the outermost JSON array in free-form model output
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
    options: Value,
    answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedFlashcard {
    front: String,
    back: String,
}

/// Parses generated exam questions out of model output
///
/// Fails with [`SourceError::Malformed`] if the output holds no parseable
/// JSON array or no entry survives validation. Individually broken entries
/// are dropped.
pub fn parse_generated_questions(
    text: &str,
    subject: &str,
    topic: Option<&str>,
) -> Result<Vec<Question>, SourceError> {
    let raw = extract_json_array(text)
        .ok_or_else(|| SourceError::Malformed("no JSON array in AI response".to_string()))?;

    let generated: Vec<GeneratedQuestion> =
        serde_json::from_str(raw).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let questions: Vec<Question> = generated
        .into_iter()
        .map(|g| {
            Question::new(
                None,
                subject.to_string(),
                topic.map(str::to_string),
                g.question,
                g.options,
                g.answer,
                g.explanation,
                "utme".to_string(),
                None,
                None,
                true,
            )
        })
        .filter(|question| question.validate().is_ok())
        .collect();

    if questions.is_empty() {
        return Err(SourceError::Malformed(
            "no valid questions in AI response".to_string(),
        ));
    }

    Ok(questions)
}

/// Parses generated flashcards out of model output
///
/// Unlike question generation this degrades to an empty list on malformed
/// output, since flashcard generation is a best-effort convenience.
pub fn parse_generated_flashcards(text: &str, subject: &str, topic: &str) -> Vec<Flashcard> {
    let Some(raw) = extract_json_array(text) else {
        return Vec::new();
    };

    let generated: Vec<GeneratedFlashcard> = match serde_json::from_str(raw) {
        Ok(cards) => cards,
        Err(_) => return Vec::new(),
    };

    generated
        .into_iter()
        .filter(|g| !g.front.trim().is_empty() && !g.back.trim().is_empty())
        .map(|g| {
            Flashcard::new(
                subject.to_string(),
                topic.to_string(),
                g.front,
                g.back,
                FlashcardSource::Ai,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests;
