//! Client for the ALOC question bank API.
//!
//! The API authenticates with an `AccessToken` header and exposes three
//! endpoints: `/q` for a single random question, `/q/{n}` for a batch, and
//! `/m` for a bulk dump. Payloads wrap the questions in a `data` field that
//! may hold either one object or an array.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{SourceError, with_retries};
use crate::models::Question;

/// Attempts and delay for the single-question endpoint
const SINGLE_ATTEMPTS: u32 = 2;
const SINGLE_DELAY: Duration = Duration::from_millis(500);

/// Attempts and delay for the batch endpoints
const BATCH_ATTEMPTS: u32 = 3;
const BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Client for the ALOC question bank
#[derive(Debug, Clone)]
pub struct AlocClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl AlocClient {
    /// Creates a client with the given base URL, token, and request timeout
    pub fn new(
        base_url: String,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// Fetches a single random question
    ///
    /// Transient failures are retried twice with a short delay before the
    /// error propagates.
    #[instrument(skip(self))]
    pub async fn fetch_one(
        &self,
        subject: &str,
        year: Option<&str>,
        exam_type: &str,
    ) -> Result<Question, SourceError> {
        let url = format!("{}/q", self.base_url);

        let payload = with_retries("ALOC single fetch", SINGLE_ATTEMPTS, SINGLE_DELAY, || {
            let mut params = vec![("subject", subject), ("type", exam_type)];
            if let Some(year) = year {
                params.push(("year", year));
            }
            self.get(&url, params)
        })
        .await?;

        let questions = extract_questions(&payload, subject);
        questions
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Malformed("no question in payload".to_string()))
    }

    /// Fetches up to `count` questions in one request
    ///
    /// The batch endpoint is flakier than the single one, so it gets three
    /// attempts with a longer delay.
    #[instrument(skip(self))]
    pub async fn fetch_batch(
        &self,
        subject: &str,
        count: usize,
        year: Option<&str>,
        exam_type: &str,
    ) -> Result<Vec<Question>, SourceError> {
        let url = format!("{}/q/{}", self.base_url, count);

        let payload = with_retries("ALOC batch fetch", BATCH_ATTEMPTS, BATCH_DELAY, || {
            let mut params = vec![("subject", subject), ("type", exam_type)];
            if let Some(year) = year {
                params.push(("year", year));
            }
            self.get(&url, params)
        })
        .await?;

        let questions = extract_questions(&payload, subject);
        debug!("ALOC batch returned {} questions for {}", questions.len(), subject);
        Ok(questions)
    }

    /// Fetches the bulk question dump for a subject
    #[instrument(skip(self))]
    pub async fn fetch_many(
        &self,
        subject: &str,
        exam_type: &str,
    ) -> Result<Vec<Question>, SourceError> {
        let url = format!("{}/m", self.base_url);

        let payload = with_retries("ALOC bulk fetch", SINGLE_ATTEMPTS, SINGLE_DELAY, || {
            self.get(&url, vec![("subject", subject), ("type", exam_type)])
        })
        .await?;

        let questions = extract_questions(&payload, subject);
        debug!("ALOC bulk returned {} questions for {}", questions.len(), subject);
        Ok(questions)
    }

    async fn get(&self, url: &str, params: Vec<(&str, &str)>) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url)
            .query(&params)
            .header("AccessToken", &self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

/// Pulls the question list out of an ALOC payload
///
/// The `data` field holds one object for `/q` and an array for the batch
/// endpoints; some responses omit the envelope entirely. Entries that fail
/// validation are dropped rather than failing the whole batch.
pub fn extract_questions(payload: &Value, subject: &str) -> Vec<Question> {
    let data = payload.get("data").unwrap_or(payload);

    let raw_items: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![data],
        _ => vec![],
    };

    raw_items
        .into_iter()
        .filter_map(|raw| format_question(raw, subject))
        .filter(|question| question.validate().is_ok())
        .collect()
}

/// Maps one raw ALOC record onto a [`Question`]
///
/// Records missing the question text or answer are skipped.
fn format_question(raw: &Value, subject: &str) -> Option<Question> {
    let text = raw.get("question")?.as_str()?.to_string();
    let answer = raw.get("answer")?.as_str()?.to_string();

    let external_id = raw.get("id").map(stringify);
    let topic = non_empty_str(raw.get("section"));
    let explanation = non_empty_str(raw.get("solution")).or(non_empty_str(raw.get("explanation")));
    let exam_type = non_empty_str(raw.get("examtype")).unwrap_or_else(|| "utme".to_string());
    let exam_year = raw.get("examyear").and_then(|v| match v {
        Value::Null => None,
        other => Some(stringify(other)),
    });
    let image_url = non_empty_str(raw.get("image"));
    let options = raw.get("option").cloned().unwrap_or(Value::Null);

    Some(Question::new(
        external_id,
        subject.to_string(),
        topic,
        text,
        options,
        answer,
        explanation,
        exam_type,
        exam_year,
        image_url,
        false,
    ))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Renders a scalar as a string, numbers included
///
/// ALOC is inconsistent about whether ids and years are strings or numbers.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
