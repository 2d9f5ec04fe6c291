use chrono::Utc;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::models::InstanceInfo;
use crate::config::*;
use crate::providers::SearchError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub priority: u32,
}

impl Endpoint {
    pub fn from_url(url: &str, priority: u32) -> Self {
        let url = url.trim_end_matches('/').to_string();
        let name = url
            .replace("https://", "")
            .replace("http://", "")
            .split('/')
            .next()
            .unwrap_or("unknown")
            .to_string();
        Self {
            name,
            url,
            priority,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StickyEndpoint {
    endpoint: Endpoint,
    last_success: i64,
    failure_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct EndpointCache {
    timestamp: i64,
    endpoints: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sticky_endpoint: Option<StickyEndpoint>,
}

/// Ordered list of Invidious instances with a sticky "last known good" one.
///
/// The configured instance always has priority 0. Extra instances come from
/// the public directory and are cached on disk for a day.
pub struct EndpointManager {
    endpoints: RwLock<Vec<Endpoint>>,
    sticky: RwLock<Option<StickyEndpoint>>,
    cache_path: Option<PathBuf>,
}

impl EndpointManager {
    /// Manager over a single instance, no disk cache.
    pub fn new(primary_url: &str) -> Self {
        Self::with_endpoints(vec![Endpoint::from_url(primary_url, 0)])
    }

    pub fn with_endpoints(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: RwLock::new(endpoints),
            sticky: RwLock::new(None),
            cache_path: None,
        }
    }

    /// Load fallback instances from the cache file or the public directory.
    ///
    /// Failure to find any leaves the configured instance as the only one.
    pub async fn discover(primary_url: &str, timeout: Duration) -> Self {
        let cache_path = get_instance_cache_path();
        if let Some(parent) = cache_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Could not create cache dir {:?}: {}", parent, e);
            }
        }

        let primary = Endpoint::from_url(primary_url, 0);
        let (mut endpoints, sticky) = match Self::load_endpoints_with_cache(&cache_path, timeout).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!("No Invidious instance list available: {}", e);
                (Vec::new(), None)
            }
        };

        endpoints.retain(|e| e.url != primary.url);
        endpoints.insert(0, primary);

        Self {
            endpoints: RwLock::new(endpoints),
            sticky: RwLock::new(sticky),
            cache_path: Some(cache_path),
        }
    }

    async fn load_endpoints_with_cache(
        cache_path: &Path,
        timeout: Duration,
    ) -> Result<(Vec<Endpoint>, Option<StickyEndpoint>), SearchError> {
        if let Ok(cache_data) = Self::load_from_cache(cache_path) {
            let age = Utc::now().timestamp() - cache_data.timestamp;
            if (0..INSTANCE_CACHE_TTL_SECONDS as i64).contains(&age) {
                log::info!(
                    "Loaded {} Invidious instances from cache (age: {}s)",
                    cache_data.endpoints.len(),
                    age
                );
                return Ok((cache_data.endpoints, cache_data.sticky_endpoint));
            }
            log::info!("Instance cache expired (age: {}s), refetching", age);
        }

        match Self::fetch_directory(timeout).await {
            Ok(endpoints) => {
                log::info!("Fetched {} Invidious instances", endpoints.len());
                if let Err(e) = Self::save_to_cache(cache_path, &endpoints, None) {
                    log::warn!("Failed to write instance cache: {}", e);
                }
                Ok((endpoints, None))
            }
            Err(e) => {
                log::warn!("Failed to fetch instance directory: {}, trying cache fallback", e);
                let cache_data = Self::load_from_cache(cache_path)?;
                log::warn!("Using expired instance cache as fallback");
                Ok((cache_data.endpoints, cache_data.sticky_endpoint))
            }
        }
    }

    async fn fetch_directory(timeout: Duration) -> Result<Vec<Endpoint>, SearchError> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        let response = client.get(INVIDIOUS_INSTANCES_URL).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::Network(format!("HTTP {}", response.status())));
        }

        let json: serde_json::Value = serde_json::from_str(&response.text().await?)?;
        Self::parse_instances_json(&json)
    }

    /// The directory is an array of `[name, {api, type, uri, ...}]` pairs.
    fn parse_instances_json(data: &serde_json::Value) -> Result<Vec<Endpoint>, SearchError> {
        let entries = data
            .as_array()
            .ok_or_else(|| SearchError::InvalidResponse("instance list is not an array".to_string()))?;

        let endpoints: Vec<Endpoint> = entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<InstanceInfo>(entry.get(1)?.clone()).ok())
            .filter(|info| info.api == Some(true) && info.kind.as_deref() == Some("https"))
            .filter_map(|info| info.uri)
            .enumerate()
            .map(|(idx, uri)| Endpoint::from_url(&uri, idx as u32 + 1))
            .collect();

        if endpoints.is_empty() {
            return Err(SearchError::InvalidResponse(
                "No API-enabled instances found".to_string(),
            ));
        }

        Ok(endpoints)
    }

    fn load_from_cache(path: &Path) -> Result<EndpointCache, SearchError> {
        let content =
            fs::read_to_string(path).map_err(|e| SearchError::Network(format!("cache read: {}", e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_to_cache(
        path: &Path,
        endpoints: &[Endpoint],
        sticky: Option<&StickyEndpoint>,
    ) -> Result<(), SearchError> {
        let cache = EndpointCache {
            timestamp: Utc::now().timestamp(),
            endpoints: endpoints.to_vec(),
            sticky_endpoint: sticky.cloned(),
        };

        let json = serde_json::to_string_pretty(&cache)?;
        fs::write(path, json).map_err(|e| SearchError::Network(format!("cache write: {}", e)))
    }

    /// Instances in the order they should be tried: the sticky one first
    /// (while it has fewer than `MAX_STICKY_FAILURES` failures), then by
    /// priority.
    pub fn get_all_endpoints(&self) -> Vec<Endpoint> {
        let mut sorted = self.endpoints.read().clone();
        sorted.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));

        if let Some(sticky) = self.sticky.read().as_ref() {
            if sticky.failure_count < MAX_STICKY_FAILURES {
                sorted.retain(|e| e.url != sticky.endpoint.url);
                sorted.insert(0, sticky.endpoint.clone());
            }
        }

        sorted
    }

    pub fn record_success(&self, endpoint: &Endpoint) {
        let new_sticky = StickyEndpoint {
            endpoint: endpoint.clone(),
            last_success: Utc::now().timestamp(),
            failure_count: 0,
        };

        let mut sticky_guard = self.sticky.write();
        let changed = sticky_guard
            .as_ref()
            .map_or(true, |s| s.endpoint.url != endpoint.url || s.failure_count > 0);
        *sticky_guard = Some(new_sticky.clone());
        drop(sticky_guard);

        if changed {
            log::info!("Sticky Invidious instance set to: {}", endpoint.name);
            if let Some(path) = &self.cache_path {
                let endpoints = self.endpoints.read().clone();
                let _ = Self::save_to_cache(path, &endpoints, Some(&new_sticky));
            }
        }
    }

    pub fn record_failure(&self, endpoint: &Endpoint) {
        let mut sticky_guard = self.sticky.write();
        if let Some(sticky) = sticky_guard.as_mut() {
            if sticky.endpoint.url == endpoint.url {
                sticky.failure_count += 1;
                log::warn!(
                    "Sticky instance {} failed (count: {})",
                    endpoint.name,
                    sticky.failure_count
                );

                if sticky.failure_count >= MAX_STICKY_FAILURES {
                    log::warn!(
                        "Resetting sticky instance after {} failures",
                        sticky.failure_count
                    );
                    *sticky_guard = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager() -> EndpointManager {
        EndpointManager::with_endpoints(vec![
            Endpoint::from_url("https://primary.example/", 0),
            Endpoint::from_url("https://b.example", 2),
            Endpoint::from_url("https://a.example", 1),
        ])
    }

    #[test]
    fn test_endpoint_name_from_url() {
        let endpoint = Endpoint::from_url("https://yewtu.be/", 0);
        assert_eq!(endpoint.url, "https://yewtu.be");
        assert_eq!(endpoint.name, "yewtu.be");
    }

    #[test]
    fn test_priority_order() {
        let urls: Vec<String> = manager().get_all_endpoints().into_iter().map(|e| e.url).collect();
        assert_eq!(
            urls,
            vec!["https://primary.example", "https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_sticky_endpoint_goes_first_until_it_keeps_failing() {
        let manager = manager();
        let b = Endpoint::from_url("https://b.example", 2);

        manager.record_success(&b);
        assert_eq!(manager.get_all_endpoints()[0].url, "https://b.example");

        for _ in 0..MAX_STICKY_FAILURES {
            manager.record_failure(&b);
        }
        assert_eq!(manager.get_all_endpoints()[0].url, "https://primary.example");
    }

    #[test]
    fn test_parse_instance_directory() {
        let data = json!([
            ["inv.one", { "api": true, "type": "https", "uri": "https://inv.one" }],
            ["hidden.onion", { "api": true, "type": "onion", "uri": "http://x.onion" }],
            ["noapi.net", { "api": false, "type": "https", "uri": "https://noapi.net" }],
            ["inv.two", { "api": true, "type": "https", "uri": "https://inv.two/" }]
        ]);

        let endpoints = EndpointManager::parse_instances_json(&data).unwrap();
        let urls: Vec<&str> = endpoints.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://inv.one", "https://inv.two"]);
        assert_eq!(endpoints[0].priority, 1);
    }

    #[test]
    fn test_parse_instance_directory_rejects_objects() {
        assert!(EndpointManager::parse_instances_json(&json!({ "api": {} })).is_err());
    }
}
