use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::providers::types::ProviderId;
use crate::providers::SearchError;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const BACKEND_ENV: &str = "STREAMTUNE_BACKEND";
pub const INVIDIOUS_URL_ENV: &str = "INVIDIOUS_URL";
pub const MAX_RESULTS_ENV: &str = "STREAMTUNE_MAX_RESULTS";
pub const TIMEOUT_ENV: &str = "STREAMTUNE_REQUEST_TIMEOUT_SECS";
pub const REGION_ENV: &str = "STREAMTUNE_REGION";
pub const MAX_RETRIES_ENV: &str = "STREAMTUNE_MAX_RETRIES";
pub const DB_PATH_ENV: &str = "STREAMTUNE_DB";

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_INVIDIOUS_URL: &str = "https://yewtu.be";
pub const INVIDIOUS_INSTANCES_URL: &str = "https://api.invidious.io/instances.json";

/// Results requested per search page unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: u32 = 10;
/// Upper bound accepted by the YouTube Data API.
pub const MAX_RESULTS_CAP: u32 = 50;

pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const INSTANCE_CACHE_TTL_SECONDS: u64 = 86400; // 24 hours
pub const MAX_STICKY_FAILURES: u32 = 3;
pub const RETRY_BACKOFF_MS: u64 = 500;
/// Upper bound on pages fetched for one playlist or channel listing.
pub const MAX_PAGES: usize = 20;
pub const DEFAULT_REGION: &str = "IN";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub fn get_cache_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("streamtune")
}

pub fn get_instance_cache_path() -> PathBuf {
    get_cache_dir().join("invidious_instances.json")
}

pub fn get_default_db_path() -> PathBuf {
    get_cache_dir().join("cache.db")
}

/// How many times a transient search failure is retried.
///
/// The default performs a single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub backend: ProviderId,
    pub invidious_url: String,
    pub max_results: u32,
    pub request_timeout: Duration,
    pub region_code: String,
    pub retry: RetryPolicy,
    pub db_path: PathBuf,
}

impl Settings {
    /// Settings with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            backend: ProviderId::Invidious,
            invidious_url: DEFAULT_INVIDIOUS_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
            region_code: DEFAULT_REGION.to_string(),
            retry: RetryPolicy::none(),
            db_path: get_default_db_path(),
        }
    }

    /// Read settings from the process environment.
    ///
    /// A missing or blank `YOUTUBE_API_KEY` is a configuration error.
    pub fn from_env() -> Result<Self, SearchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SearchError::Config(format!("{} is not set", API_KEY_ENV)))?;

        let mut settings = Self::new(api_key);

        if let Some(backend) = lookup(BACKEND_ENV) {
            settings.backend = ProviderId::from_str(&backend).map_err(SearchError::Config)?;
        }
        if let Some(url) = lookup(INVIDIOUS_URL_ENV).filter(|u| !u.trim().is_empty()) {
            settings.invidious_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(MAX_RESULTS_ENV) {
            let parsed: u32 = parse_number(MAX_RESULTS_ENV, &raw)?;
            settings.max_results = parsed.clamp(1, MAX_RESULTS_CAP);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = parse_number(TIMEOUT_ENV, &raw)?;
            settings.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(region) = lookup(REGION_ENV).filter(|r| !r.trim().is_empty()) {
            settings.region_code = region.trim().to_uppercase();
        }
        if let Some(raw) = lookup(MAX_RETRIES_ENV) {
            let retries: u32 = parse_number(MAX_RETRIES_ENV, &raw)?;
            settings.retry = RetryPolicy::with_retries(retries);
        }
        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            settings.db_path = PathBuf::from(path);
        }

        Ok(settings)
    }

    /// Page size sent upstream, never above the API cap.
    pub fn page_size(&self) -> u32 {
        self.max_results.clamp(1, MAX_RESULTS_CAP)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, SearchError> {
    raw.trim()
        .parse()
        .map_err(|_| SearchError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
