use std::sync::Arc;

use tracing::warn;

use crate::clients::{AiClient, AlocClient};
use crate::config::Config;
use crate::db::DbPool;
use crate::sourcing::HotCache;

/// Shared application state handed to every handler
///
/// The upstream clients are optional: without an ALOC token or an AI key
/// the corresponding sourcing tiers and endpoints are simply unavailable,
/// and the application runs fully offline against the local bank.
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub config: Config,
    pub aloc: Option<AlocClient>,
    pub ai: Option<AiClient>,
    pub hot_cache: HotCache,
}

impl AppState {
    /// Builds the state from a configuration and an open pool
    pub fn new(config: Config, pool: Arc<DbPool>) -> Self {
        let aloc = match &config.aloc_access_token {
            Some(token) => {
                AlocClient::new(config.aloc_base_url.clone(), token.clone(), config.http_timeout())
                    .map_err(|e| warn!("Failed to build question bank client: {}", e))
                    .ok()
            }
            None => {
                warn!("No ALOC access token configured, upstream question tiers disabled");
                None
            }
        };

        let ai = if config.has_ai_key() {
            AiClient::new(
                config.gemini_api_key.clone(),
                config.grok_api_key.clone(),
                config.cerebras_api_key.clone(),
                config.http_timeout(),
            )
            .map_err(|e| warn!("Failed to build AI client: {}", e))
            .ok()
        } else {
            warn!("No AI provider key configured, AI endpoints disabled");
            None
        };

        Self {
            pool,
            config,
            aloc,
            ai,
            hot_cache: HotCache::new(),
        }
    }

    /// State with no upstream clients configured, defaults otherwise
    ///
    /// Everything that does not need an ALOC token or AI key works as
    /// normal. Used by tests, and usable for a fully local install.
    pub fn offline(pool: Arc<DbPool>) -> Self {
        Self {
            pool,
            config: crate::config::base_config(None),
            aloc: None,
            ai: None,
            hot_cache: HotCache::new(),
        }
    }
}
