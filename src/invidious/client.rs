use reqwest::Client;
use serde_json::Value;

use super::endpoint_manager::EndpointManager;
use super::models::SearchVideo;
use crate::config::{RetryPolicy, Settings, USER_AGENT};
use crate::models::{Track, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::providers::retry::with_retry;
use crate::providers::SearchError;

const SEARCH_ALBUM: &str = "YouTube";
const TRENDING_ALBUM: &str = "Trending Now";

/// One page of Invidious search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub tracks: Vec<Track>,
    /// Whether the instance returned anything at all for this page; an
    /// empty raw page ends the result set.
    pub has_more: bool,
}

pub struct InvidiousClient {
    endpoint_manager: EndpointManager,
    client: Client,
    page_size: usize,
    region: String,
    retry: RetryPolicy,
}

impl InvidiousClient {
    pub fn new(settings: &Settings, endpoint_manager: EndpointManager) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            endpoint_manager,
            client,
            page_size: settings.page_size() as usize,
            region: settings.region_code.clone(),
            retry: settings.retry,
        })
    }

    /// Try every known instance in order until one answers.
    async fn make_request(
        &self,
        path: &str,
        params: &[(&str, &str)],
        operation: &str,
    ) -> Result<Value, SearchError> {
        let endpoints = self.endpoint_manager.get_all_endpoints();

        log::debug!(
            "Starting request for {} with {} instances",
            operation,
            endpoints.len()
        );

        let mut last_error = SearchError::AllEndpointsFailed;
        for (idx, endpoint) in endpoints.iter().enumerate() {
            let url = format!("{}{}", endpoint.url, path);

            match with_retry(self.retry, operation, || self.try_endpoint(&url, params)).await {
                Ok(data) => {
                    self.endpoint_manager.record_success(endpoint);
                    return Ok(data);
                }
                Err(e) => {
                    self.endpoint_manager.record_failure(endpoint);
                    log::warn!(
                        "[{}/{}] {} failed on {}: {}",
                        idx + 1,
                        endpoints.len(),
                        operation,
                        endpoint.name,
                        e
                    );
                    last_error = e;
                }
            }
        }

        log::error!("All {} instances failed for {}", endpoints.len(), operation);
        Err(last_error)
    }

    async fn try_endpoint(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, SearchError> {
        let url = reqwest::Url::parse_with_params(url, params)
            .map_err(|e| SearchError::Network(format!("URL parse error: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let url_debug = response.url().to_string();
        let text = response.text().await?;

        if !status.is_success() {
            log::warn!("Request failed ({}) at {}", status, url_debug);
            return Err(SearchError::Network(format!("HTTP {}", status.as_u16())));
        }

        serde_json::from_str(&text)
            .map_err(|e| SearchError::Parse(format!("JSON error at {}: {}", url_debug, e)))
    }

    /// `GET /api/v1/search?q=..&type=video&page=N`
    pub async fn search_videos(&self, query: &str, page: u32) -> Result<SearchPage, SearchError> {
        let page_param = page.max(1).to_string();
        let data = self
            .make_request(
                "/api/v1/search",
                &[("q", query), ("type", "video"), ("page", page_param.as_str())],
                "search_videos",
            )
            .await?;

        let (tracks, raw_count) = self.parse_search_results(&data, SEARCH_ALBUM)?;
        Ok(SearchPage {
            tracks,
            has_more: raw_count > 0,
        })
    }

    /// `GET /api/v1/trending?type=Music&region=..`
    pub async fn trending(&self) -> Result<Vec<Track>, SearchError> {
        let data = self
            .make_request(
                "/api/v1/trending",
                &[("type", "Music"), ("region", self.region.as_str())],
                "trending",
            )
            .await?;

        let (tracks, _) = self.parse_search_results(&data, TRENDING_ALBUM)?;
        Ok(tracks)
    }

    /// Map the search payload, which must be a JSON array, into tracks.
    ///
    /// Returns the mapped tracks (capped at the page size) and the number of
    /// raw entries the instance sent.
    pub(crate) fn parse_search_results(
        &self,
        data: &Value,
        album: &str,
    ) -> Result<(Vec<Track>, usize), SearchError> {
        let items = data.as_array().ok_or_else(|| {
            SearchError::InvalidResponse("search payload is not an array".to_string())
        })?;

        let tracks = items
            .iter()
            .filter_map(|raw| serde_json::from_value::<SearchVideo>(raw.clone()).ok())
            .filter(SearchVideo::is_video)
            .filter_map(|video| self.track_from_video(&video, album))
            .take(self.page_size)
            .collect();

        Ok((tracks, items.len()))
    }

    fn track_from_video(&self, video: &SearchVideo, album: &str) -> Option<Track> {
        let video_id = video.video_id.as_deref().filter(|id| !id.is_empty())?;

        let artwork_url = match video.thumbnail() {
            Some(url) if url.starts_with("//") => format!("https:{}", url),
            Some(url) if url.starts_with('/') => {
                let base = self
                    .endpoint_manager
                    .get_all_endpoints()
                    .first()
                    .map(|e| e.url.clone())
                    .unwrap_or_default();
                format!("{}{}", base, url)
            }
            Some(url) => url.to_string(),
            None => Track::fallback_artwork(video_id),
        };

        Some(Track {
            id: video_id.to_string(),
            external_video_id: video_id.to_string(),
            title: video
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: video
                .author
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: album.to_string(),
            artwork_url,
            duration_seconds: video.length_seconds.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(page_size: u32) -> InvidiousClient {
        let mut settings = Settings::new("key");
        settings.max_results = page_size;
        InvidiousClient::new(&settings, EndpointManager::new("https://inv.example")).unwrap()
    }

    #[test]
    fn test_maps_search_results() {
        let data = json!([
            {
                "type": "video",
                "videoId": "v1",
                "title": "Song One",
                "author": "Artist A",
                "lengthSeconds": 215,
                "videoThumbnails": [
                    { "quality": "default", "url": "https://img/v1/default.jpg" },
                    { "quality": "high", "url": "https://img/v1/high.jpg" }
                ]
            },
            { "type": "channel", "author": "Some Channel" },
            { "type": "video", "videoId": "v2", "videoThumbnails": [ { "quality": "high", "url": "/vi/v2/hq.jpg" } ] }
        ]);

        let (tracks, raw) = client(10).parse_search_results(&data, SEARCH_ALBUM).unwrap();
        assert_eq!(raw, 3);
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].id, "v1");
        assert_eq!(tracks[0].artist, "Artist A");
        assert_eq!(tracks[0].duration_seconds, 215);
        assert_eq!(tracks[0].artwork_url, "https://img/v1/high.jpg");

        assert_eq!(tracks[1].title, UNKNOWN_TITLE);
        assert_eq!(tracks[1].artist, UNKNOWN_ARTIST);
        assert_eq!(tracks[1].duration_seconds, 0);
        assert_eq!(tracks[1].artwork_url, "https://inv.example/vi/v2/hq.jpg");
    }

    #[test]
    fn test_missing_thumbnails_fall_back() {
        let data = json!([{ "type": "video", "videoId": "x9", "title": "t", "author": "a" }]);
        let (tracks, _) = client(10).parse_search_results(&data, TRENDING_ALBUM).unwrap();
        assert_eq!(tracks[0].album, "Trending Now");
        assert_eq!(tracks[0].artwork_url, "https://i.ytimg.com/vi/x9/hqdefault.jpg");
    }

    #[test]
    fn test_odd_length_values_keep_the_track() {
        let data = json!([
            { "type": "video", "videoId": "s", "lengthSeconds": "215" },
            { "type": "video", "videoId": "f", "lengthSeconds": 61.9 },
            { "type": "video", "videoId": "n", "lengthSeconds": -5 },
            { "type": "video", "videoId": "x", "lengthSeconds": "live" },
            { "type": "video", "videoId": "z", "lengthSeconds": null }
        ]);

        let (tracks, raw) = client(10).parse_search_results(&data, SEARCH_ALBUM).unwrap();
        assert_eq!(raw, 5);
        let durations: Vec<(&str, u64)> = tracks
            .iter()
            .map(|t| (t.id.as_str(), t.duration_seconds))
            .collect();
        assert_eq!(
            durations,
            vec![("s", 215), ("f", 61), ("n", 0), ("x", 0), ("z", 0)]
        );
    }

    #[test]
    fn test_page_size_cap() {
        let data: Vec<Value> = (0..20)
            .map(|i| json!({ "type": "video", "videoId": format!("v{}", i) }))
            .collect();
        let (tracks, raw) = client(5).parse_search_results(&Value::Array(data), SEARCH_ALBUM)
            .unwrap();
        assert_eq!(tracks.len(), 5);
        assert_eq!(raw, 20);
    }

    #[test]
    fn test_non_array_payload_is_invalid() {
        let err = client(10)
            .parse_search_results(&json!({ "error": "rate limited" }), SEARCH_ALBUM)
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
