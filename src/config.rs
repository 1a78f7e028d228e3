//! Runtime configuration sourced from the environment.

use std::env;
use std::time::Duration;

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

/// How a batch write endpoint reacts when one element fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Process every element and report the ones that failed.
    ContinueOnError,
    /// Stop at the first failing element; later elements are left unprocessed.
    AbortOnError,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// TTL applied to cached single-entity responses.
    pub item_ttl: Duration,
    /// TTL applied to cached collection and report responses.
    pub list_ttl: Duration,
    pub batch_policy: BatchPolicy,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            item_ttl: Duration::from_secs(env_u64("CAMPAIGN_CACHE_ITEM_TTL_SECS", 3600)),
            list_ttl: Duration::from_secs(env_u64("CAMPAIGN_CACHE_LIST_TTL_SECS", 3600)),
            batch_policy: match env::var("CAMPAIGN_BATCH_ON_ERROR").ok().as_deref() {
                Some("abort") => BatchPolicy::AbortOnError,
                _ => BatchPolicy::ContinueOnError,
            },
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
