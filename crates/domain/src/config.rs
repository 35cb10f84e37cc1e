use crate::priority::ANALYZER_PRIORITY;
use std::collections::HashMap;
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-analyzer endpoint config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Endpoint + auth + timeout override for one upstream analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub name: String,
    pub url: String,
    pub api_key: Option<String>,
    /// `None` means "use `GatewayConfig::per_call_timeout`".
    pub per_call_timeout: Option<Duration>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Breaker tuning
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub window: usize,
    pub ratio_threshold: f64,
    pub minimum_samples: usize,
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            window: 20,
            ratio_threshold: 0.5,
            minimum_samples: 10,
            cooldown: Duration::from_secs(30),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level gateway configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the gateway needs, resolved once from the process
/// environment at startup and treated as immutable for the life of the
/// process. Live reload is out of scope.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    /// Shared secrets accepted on inbound `X-API-Key` headers.
    pub api_keys: Vec<String>,
    pub analyzers: HashMap<String, AnalyzerConfig>,
    pub per_call_timeout: Duration,
    pub global_deadline: Duration,
    pub breaker: BreakerConfig,
    pub max_text_bytes: usize,
    pub mask_token: String,
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_analyzer_url(name: &str) -> String {
    format!("http://localhost:9000/{name}")
}

impl GatewayConfig {
    /// Resolve the full configuration from `std::env`, falling back to
    /// the documented defaults for anything unset.
    pub fn from_env() -> Self {
        let api_keys = std::env::var("GATEWAY_API_KEYS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut analyzers = HashMap::new();
        for name in ANALYZER_PRIORITY {
            let upper = name.to_uppercase();
            let url = env_string(&format!("{upper}_URL"), &default_analyzer_url(name));
            let api_key = std::env::var(format!("{upper}_API_KEY")).ok();
            analyzers.insert(
                (*name).to_string(),
                AnalyzerConfig {
                    name: (*name).to_string(),
                    url,
                    api_key,
                    per_call_timeout: None,
                },
            );
        }

        let breaker = BreakerConfig {
            failure_threshold: env_u64("BREAKER_FAILURE_THRESHOLD", 5) as u32,
            window: env_usize("BREAKER_WINDOW", 20),
            ratio_threshold: env_f64("BREAKER_RATIO_THRESHOLD", 0.5),
            minimum_samples: env_usize("BREAKER_MINIMUM_SAMPLES", 10),
            cooldown: Duration::from_millis(env_u64("BREAKER_COOLDOWN_MS", 30_000)),
        };

        Self {
            server: ServerConfig {
                host: env_string("GATEWAY_HOST", "0.0.0.0"),
                port: env_u64("GATEWAY_PORT", 8080) as u16,
            },
            api_keys,
            analyzers,
            per_call_timeout: Duration::from_millis(env_u64("PER_CALL_TIMEOUT_MS", 4_000)),
            global_deadline: Duration::from_millis(env_u64("GLOBAL_DEADLINE_MS", 8_000)),
            breaker,
            max_text_bytes: env_usize("MAX_TEXT_BYTES", 32_768),
            mask_token: env_string("MASK_TOKEN", "***"),
        }
    }

    pub fn analyzer(&self, name: &str) -> Option<&AnalyzerConfig> {
        self.analyzers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_defaults_match_spec() {
        let cfg = BreakerConfig::default();
        assert_eq!(cfg.failure_threshold, 5);
        assert_eq!(cfg.window, 20);
        assert!((cfg.ratio_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.minimum_samples, 10);
        assert_eq!(cfg.cooldown, Duration::from_secs(30));
    }

    #[test]
    fn server_default_port_is_8080() {
        assert_eq!(ServerConfig::default().port, 8080);
    }

    #[test]
    fn from_env_populates_all_known_analyzers() {
        let cfg = GatewayConfig::from_env();
        for name in ANALYZER_PRIORITY {
            assert!(cfg.analyzers.contains_key(*name));
        }
    }
}
