//! HTTP clients for the upstream question bank and generative-AI providers.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

pub mod ai;
pub mod aloc;

pub use ai::{AiClient, AiProvider, ChatMessage};
pub use aloc::AlocClient;

/// Failure modes of an upstream fetch
///
/// Callers branch on these: a missing token skips a sourcing tier outright,
/// a rate limit surfaces as 429 to the client, and anything transient is
/// retried before being reported.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A credential or setting the tier needs is absent
    #[error("{0} is not configured")]
    ConfigMissing(&'static str),
    /// The upstream returned 429 or a quota message
    #[error("upstream rate limit exceeded")]
    RateLimited,
    /// The request did not complete within the configured timeout
    #[error("upstream request timed out")]
    Timeout,
    /// The upstream returned a non-success status
    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The request failed below HTTP, DNS, connect and so on
    #[error("network error: {0}")]
    Network(String),
    /// The upstream responded but the payload was not usable
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether a retry might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::Timeout
                | SourceError::Network(_)
                | SourceError::RateLimited
                | SourceError::Http { status: 500..=599, .. }
        )
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// Runs an upstream operation up to `attempts` times with a fixed delay
///
/// Only retryable errors are retried; the rest propagate immediately. The
/// final error is returned unchanged so callers still see what failed.
pub(crate) async fn with_retries<T, Fut>(
    what: &str,
    attempts: u32,
    delay: Duration,
    mut op: impl FnMut() -> Fut,
) -> Result<T, SourceError>
where
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!("{} failed (attempt {}/{}): {}", what, attempt, attempts, err);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Runs an AI call up to `attempts` times with exponential backoff
///
/// Unlike [`with_retries`], only rate limits are retried, and the wait
/// doubles each attempt starting from two seconds.
pub(crate) async fn with_rate_limit_backoff<T, Fut>(
    what: &str,
    attempts: u32,
    mut op: impl FnMut() -> Fut,
) -> Result<T, SourceError>
where
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(SourceError::RateLimited) if attempt + 1 < attempts => {
                let wait = Duration::from_secs(1 << (attempt + 1));
                warn!(
                    "{} rate limited (attempt {}/{}), backing off {:?}",
                    what,
                    attempt + 1,
                    attempts,
                    wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_with_retries_returns_first_success() {
        let calls = AtomicU32::new(0);

        let result = with_retries("test", 3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, SourceError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retries_retries_transient_errors() {
        let calls = AtomicU32::new(0);

        let result = with_retries("test", 3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(SourceError::Timeout)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retries_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retries("test", 2, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SourceError::Network("unreachable".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(SourceError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retries_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retries("test", 3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SourceError::Malformed("not json".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(SourceError::Malformed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_only_retries_rate_limits() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_rate_limit_backoff("test", 3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SourceError::Timeout) }
        })
        .await;

        assert!(matches!(result, Err(SourceError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SourceError::Timeout.is_retryable());
        assert!(SourceError::RateLimited.is_retryable());
        assert!(
            SourceError::Http {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SourceError::Http {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!SourceError::ConfigMissing("token").is_retryable());
    }
}
