//! Shared gateway state, constructed once at startup and cloned (cheaply,
//! via `Arc`) into every axum handler.

use crate::breaker::BreakerRegistry;
use mg_analyzers::AnalyzerClient;
use mg_domain::config::GatewayConfig;
use mg_domain::priority::ANALYZER_PRIORITY;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub breakers: Arc<BreakerRegistry>,
    pub client: Arc<AnalyzerClient>,
    /// SHA-256 digests of every configured API key, compared in
    /// constant time by [`crate::normalizer::check_api_key`]. Empty
    /// means authentication is disabled.
    pub api_key_hashes: Vec<[u8; 32]>,
    /// Flipped once during graceful shutdown so in-flight requests can
    /// still drain while new ones are told to retry elsewhere (503).
    shutting_down: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let breakers = BreakerRegistry::new(
            ANALYZER_PRIORITY.iter().map(|s| s.to_string()),
            config.breaker.clone(),
        );
        let api_key_hashes = config
            .api_keys
            .iter()
            .map(|k| Sha256::digest(k.as_bytes()).into())
            .collect();

        Self {
            config: Arc::new(config),
            breakers: Arc::new(breakers),
            client: Arc::new(AnalyzerClient::new()),
            api_key_hashes,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
    }
}
