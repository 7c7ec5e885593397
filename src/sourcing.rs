//! Tiered question sourcing.
//!
//! A request for N questions walks a ladder of sources, cheapest first:
//! the in-memory hot cache, the persistent cached batch, the local bank,
//! the upstream count endpoint, the upstream bulk endpoint, and finally AI
//! generation. Results are merged in tier order, deduplicated by their
//! stable identity, and never exceed the target count; whatever came from
//! upstream is written back to the bank and both caches on the way out. A
//! stale persistent batch is kept aside and consulted last, so cached
//! content still answers a request all the live tiers failed.
//!
//! Tier failures are logged and swallowed on the batch path. The
//! single-question path has no graceful fallback left once the bank is
//! empty, so it surfaces its error.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::clients::{self, AiProvider, SourceError};
use crate::errors::ApiError;
use crate::models::{CachedBatch, Question};
use crate::repo;
use crate::state::AppState;
use crate::supplement;

/// How long a hot-cache entry stays valid
const HOT_CACHE_TTL_MINUTES: i64 = 5;

/// Most questions the AI tier will generate to top up a short batch
const AI_BACKFILL_CAP: usize = 10;

/// Most questions one generate request may ask for
pub const GENERATE_CAP: usize = 20;

/// In-memory cache of recently assembled batches
///
/// Keys match the persistent batch cache. Entries expire after five
/// minutes; expiry is checked on read, so stale entries linger harmlessly
/// until overwritten.
pub struct HotCache {
    entries: Mutex<HashMap<String, (DateTime<Utc>, Vec<Question>)>>,
}

impl HotCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Question>> {
        let entries = self.entries.lock().expect("hot cache poisoned");
        entries.get(key).and_then(|(stored_at, questions)| {
            (now - *stored_at < Duration::minutes(HOT_CACHE_TTL_MINUTES))
                .then(|| questions.clone())
        })
    }

    pub fn put(&self, key: String, questions: Vec<Question>, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().expect("hot cache poisoned");
        entries.insert(key, (now, questions));
    }
}

impl Default for HotCache {
    fn default() -> Self {
        Self::new()
    }
}

/// One batch request as the sourcing ladder sees it
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub subject: &'a str,
    pub count: usize,
    pub topic: Option<&'a str>,
    pub year: Option<&'a str>,
    /// Exam construction pads English with the prescribed-text supplement
    pub exam_mode: bool,
}

impl BatchRequest<'_> {
    fn cache_key(&self) -> String {
        CachedBatch::key(self.subject, self.count, self.year, "utme")
    }

    /// Topic-filtered requests bypass the caches, whose keys ignore topic
    fn cacheable(&self) -> bool {
        self.topic.is_none()
    }
}

/// Which tier ultimately seeded a batch response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    /// Hot or persistent batch cache
    Cache,
    /// The local question bank
    Database,
    /// The upstream question bank API
    Upstream,
    /// The generative-AI fallback
    Generated,
}

impl BatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchSource::Cache => "cache",
            BatchSource::Database => "database",
            BatchSource::Upstream => "aloc",
            BatchSource::Generated => "ai",
        }
    }
}

/// Assembles a batch of questions by walking the sourcing tiers
///
/// Returns whatever accumulated together with the tier that seeded it,
/// possibly empty; only database failures are errors. English exam batches
/// carry the literary supplement on top of the target count.
#[instrument(skip(state), fields(subject = req.subject, count = req.count))]
pub async fn load_batch(
    state: &AppState,
    req: &BatchRequest<'_>,
) -> Result<(Vec<Question>, BatchSource), ApiError> {
    let now = Utc::now();
    let key = req.cache_key();

    // Tier 1: hot cache
    if req.cacheable() {
        if let Some(questions) = state.hot_cache.get(&key, now) {
            debug!("Hot cache hit for {}", key);
            return Ok((finish_batch(questions, req), BatchSource::Cache));
        }
    }

    // Tier 2: persistent cached batch. Fresh batches are served directly;
    // a stale one is held back as the fallback of last resort
    let mut stale_batch: Option<Vec<Question>> = None;
    if req.cacheable() {
        match repo::get_cached_batch(&state.pool, &key).await {
            Ok(Some(batch)) => match batch.questions() {
                Ok(questions) if batch.is_fresh(Duration::minutes(HOT_CACHE_TTL_MINUTES), now) => {
                    debug!("Persistent cache hit for {}", key);
                    state.hot_cache.put(key, questions.clone(), now);
                    return Ok((finish_batch(questions, req), BatchSource::Cache));
                }
                Ok(questions) => stale_batch = Some(questions),
                Err(err) => warn!("Batch cache corrupt for {}: {}", key, err),
            },
            Ok(None) => {}
            Err(err) => warn!("Batch cache read failed for {}: {}", key, err),
        }
    }

    let mut assembled: Vec<Question> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut source: Option<BatchSource> = None;

    // Tier 3: local bank
    let local = repo::get_questions(&state.pool, req.subject, req.count, req.topic, req.year).await?;
    if merge_unique(&mut assembled, &mut seen, local, req.count) > 0 {
        source.get_or_insert(BatchSource::Database);
    }

    // Tier 4: upstream count endpoint
    if assembled.len() < req.count {
        if let Some(aloc) = &state.aloc {
            match aloc.fetch_batch(req.subject, req.count, req.year, "utme").await {
                Ok(fetched) => {
                    if let Err(err) = repo::save_questions(&state.pool, &fetched).await {
                        warn!("Failed to save fetched questions: {}", err);
                    }
                    if merge_unique(&mut assembled, &mut seen, fetched, req.count) > 0 {
                        source.get_or_insert(BatchSource::Upstream);
                    }
                }
                Err(err) => warn!("Upstream batch fetch failed: {}", err),
            }
        }
    }

    // Tier 5: upstream bulk endpoint
    if assembled.len() < req.count {
        if let Some(aloc) = &state.aloc {
            match aloc.fetch_many(req.subject, "utme").await {
                Ok(fetched) => {
                    if let Err(err) = repo::save_questions(&state.pool, &fetched).await {
                        warn!("Failed to save bulk questions: {}", err);
                    }
                    if merge_unique(&mut assembled, &mut seen, fetched, req.count) > 0 {
                        source.get_or_insert(BatchSource::Upstream);
                    }
                }
                Err(err) => warn!("Upstream bulk fetch failed: {}", err),
            }
        }
    }

    // Tier 6: AI backfill, capped
    if assembled.len() < req.count && state.ai.is_some() {
        let needed = (req.count - assembled.len()).min(AI_BACKFILL_CAP);
        match generate_ai_questions(state, req.subject, req.topic, needed).await {
            Ok(generated) => {
                if merge_unique(&mut assembled, &mut seen, generated, req.count) > 0 {
                    source.get_or_insert(BatchSource::Generated);
                }
            }
            Err(err) => warn!("AI backfill failed: {}", err),
        }
    }

    // Last resort: a stale cached batch still beats a short or empty reply
    if assembled.len() < req.count {
        if let Some(stale) = stale_batch.take() {
            debug!("Serving stale cached batch for {}", key);
            if merge_unique(&mut assembled, &mut seen, stale, req.count) > 0 {
                source.get_or_insert(BatchSource::Cache);
            }
        }
    }

    let source = source.unwrap_or(BatchSource::Database);

    // Rewriting a purely stale-cache result would only freshen its
    // timestamp without changing its content
    if req.cacheable() && !assembled.is_empty() && source != BatchSource::Cache {
        write_caches(state, &key, req, &assembled, now).await;
    }

    info!("Assembled {} of {} questions for {}", assembled.len(), req.count, req.subject);

    Ok((finish_batch(assembled, req), source))
}

/// Fetches one question, upstream first, local bank as fallback
///
/// Unlike the batch path this errors when everything came up empty: with a
/// single question there is nothing partial to return.
#[instrument(skip(state))]
pub async fn load_single(
    state: &AppState,
    subject: &str,
    year: Option<&str>,
) -> Result<Question, ApiError> {
    if let Some(aloc) = &state.aloc {
        match aloc.fetch_one(subject, year, "utme").await {
            Ok(question) => {
                if let Err(err) = repo::save_questions(&state.pool, std::slice::from_ref(&question)).await {
                    warn!("Failed to save fetched question: {}", err);
                }
                return Ok(question);
            }
            Err(SourceError::RateLimited) => return Err(ApiError::RateLimited),
            Err(err) => warn!("Upstream single fetch failed: {}", err),
        }
    }

    let mut local = repo::get_questions(&state.pool, subject, 1, None, year).await?;
    local.pop().ok_or(ApiError::NotFound)
}

/// Fetches and upserts a batch for one subject, reporting what happened
#[instrument(skip(state))]
pub async fn sync_subject(
    state: &AppState,
    subject: &str,
    count: usize,
) -> Result<(usize, usize), ApiError> {
    let aloc = state
        .aloc
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("ALOC access token is not configured".to_string()))?;

    let fetched = match aloc.fetch_batch(subject, count, None, "utme").await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!("Sync fetch failed for {}: {}", subject, err);
            return Ok((0, 0));
        }
    };

    let saved = repo::save_questions(&state.pool, &fetched).await?;

    Ok((fetched.len(), saved))
}

/// Generates questions with the configured AI provider and banks them
///
/// Fails when no provider is usable or the model output is malformed;
/// generation is an explicit act, unlike the silent flashcard path.
#[instrument(skip(state))]
pub async fn generate_ai_questions(
    state: &AppState,
    subject: &str,
    topic: Option<&str>,
    count: usize,
) -> Result<Vec<Question>, ApiError> {
    let ai = state.ai.as_ref().ok_or(ApiError::AiUnavailable)?;

    let (provider, model) = resolve_ai_selection(state).await?;
    let prompt = clients::ai::question_prompt(subject, topic, count);

    let text = ai.chat(provider, &model, &[], &prompt).await?;
    let questions = clients::ai::parse_generated_questions(&text, subject, topic)?;

    repo::save_questions(&state.pool, &questions).await?;

    info!("Generated {} AI questions for {}", questions.len(), subject);

    Ok(questions)
}

/// Picks the provider and model to use for an AI call
///
/// The stored settings win when their provider has a key; otherwise the
/// first configured provider is used with its default model.
pub async fn resolve_ai_selection(state: &AppState) -> Result<(AiProvider, String), ApiError> {
    let ai = state.ai.as_ref().ok_or(ApiError::AiUnavailable)?;
    let available = ai.available_providers();

    if let Some((provider_id, model)) = repo::get_ai_settings(&state.pool).await? {
        if let Some(provider) = AiProvider::parse(&provider_id) {
            if available.contains(&provider) {
                return Ok((provider, model));
            }
            warn!("Configured provider {} has no key, falling back", provider_id);
        }
    }

    available
        .first()
        .map(|provider| (*provider, provider.default_model().to_string()))
        .ok_or(ApiError::AiUnavailable)
}

/// Appends `extra` to `assembled` up to `target`, returning how many landed
///
/// Uniqueness keys on `Question::dedup_key`, not the row id: the same
/// upstream question re-normalized in a later tier arrives under a brand
/// new row id and must still be recognized.
fn merge_unique(
    assembled: &mut Vec<Question>,
    seen: &mut HashSet<String>,
    extra: Vec<Question>,
    target: usize,
) -> usize {
    let before = assembled.len();
    for question in extra {
        if assembled.len() >= target {
            break;
        }
        if seen.insert(question.dedup_key()) {
            assembled.push(question);
        }
    }
    assembled.len() - before
}

/// Applies the English exam supplement and returns the final batch
fn finish_batch(mut questions: Vec<Question>, req: &BatchRequest<'_>) -> Vec<Question> {
    questions.truncate(req.count);

    if req.exam_mode && req.subject == "english" {
        let existing: HashSet<String> = questions.iter().map(|q| q.dedup_key()).collect();
        for question in supplement::english_exam_questions(supplement::EXAM_SUPPLEMENT_COUNT) {
            if !existing.contains(&question.dedup_key()) {
                questions.push(question);
            }
        }
    }

    questions
}

/// Writes an assembled batch to both caches
async fn write_caches(
    state: &AppState,
    key: &str,
    req: &BatchRequest<'_>,
    questions: &[Question],
    now: DateTime<Utc>,
) {
    state
        .hot_cache
        .put(key.to_string(), questions.to_vec(), now);

    match CachedBatch::new(
        key.to_string(),
        req.subject.to_string(),
        req.year.map(str::to_string),
        questions,
    ) {
        Ok(batch) => {
            if let Err(err) = repo::put_cached_batch(&state.pool, &batch).await {
                warn!("Failed to persist batch cache for {}: {}", key, err);
            }
        }
        Err(err) => warn!("Failed to serialize batch cache for {}: {}", key, err),
    }
}
