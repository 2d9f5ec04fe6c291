use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::models::*;
use crate::config::{RetryPolicy, Settings, MAX_PAGES, USER_AGENT, YOUTUBE_API_BASE};
use crate::models::{Playlist, Track, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::providers::retry::with_retry;
use crate::providers::SearchError;

/// The `videos` endpoint accepts at most this many ids per call.
const VIDEO_ID_BATCH: usize = 50;

const SEARCH_ALBUM: &str = "YouTube";
const TRENDING_ALBUM: &str = "Trending Now";
const MUSIC_CATEGORY_ID: &str = "10";

/// Titles the API reports for playlist entries that can no longer be played.
const UNAVAILABLE_TITLES: &[&str] = &["Deleted video", "Private video"];

/// One page of `search` results with the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct VideoPage {
    pub tracks: Vec<Track>,
    pub next_page_token: Option<String>,
}

pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_size: u32,
    region_code: String,
    retry: RetryPolicy,
}

impl YoutubeClient {
    /// Build a client. A blank API key fails here, before any I/O.
    pub fn new(settings: &Settings) -> Result<Self, SearchError> {
        if settings.api_key.trim().is_empty() {
            return Err(SearchError::Config(
                "YouTube API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: YOUTUBE_API_BASE.to_string(),
            page_size: settings.page_size(),
            region_code: settings.region_code.clone(),
            retry: settings.retry,
        })
    }

    /// Point the client at a different API root (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn make_request(
        &self,
        path: &str,
        params: &[(&str, &str)],
        operation: &str,
    ) -> Result<Value, SearchError> {
        with_retry(self.retry, operation, || self.try_request(path, params, operation)).await
    }

    async fn try_request(
        &self,
        path: &str,
        params: &[(&str, &str)],
        operation: &str,
    ) -> Result<Value, SearchError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("key", self.api_key.as_str()));

        let url = reqwest::Url::parse_with_params(&format!("{}{}", self.base_url, path), &all_params)
            .map_err(|e| SearchError::Network(format!("URL parse error: {}", e)))?;

        log::debug!("[{}] GET {}{}", operation, self.base_url, path);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| Self::api_error_message(&v))
                .unwrap_or_else(|| text.chars().take(200).collect());
            log::warn!("[{}] request failed ({}): {}", operation, status, detail);
            return Err(SearchError::Network(format!("HTTP {} - {}", status, detail)));
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| SearchError::Parse(format!("JSON error in {}: {}", operation, e)))?;

        if let Some(message) = Self::api_error_message(&data) {
            return Err(SearchError::InvalidResponse(message));
        }

        Ok(data)
    }

    fn api_error_message(data: &Value) -> Option<String> {
        let body: ApiErrorBody = serde_json::from_value(data.get("error")?.clone()).ok()?;
        Some(format!(
            "{} {}",
            body.code.map(|c| c.to_string()).unwrap_or_default(),
            body.message.unwrap_or_default()
        ))
    }

    /// Pull `items` out of a list response, skipping entries that don't parse.
    ///
    /// A payload without an `items` array is malformed.
    fn extract_items<T>(data: &Value) -> Result<Vec<T>, SearchError>
    where
        T: DeserializeOwned,
    {
        let items = data
            .get("items")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SearchError::InvalidResponse("missing 'items' array".to_string()))?;

        Ok(items
            .iter()
            .filter_map(|raw| serde_json::from_value::<T>(raw.clone()).ok())
            .collect())
    }

    fn next_page_token(data: &Value) -> Option<String> {
        data.get("nextPageToken")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(String::from)
    }

    pub async fn search_videos(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<VideoPage, SearchError> {
        let max_results = self.page_size.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("q", query),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let data = self.make_request("/search", &params, "search_videos").await?;
        let items: Vec<SearchItem> = Self::extract_items(&data)?;
        let next_page_token = Self::next_page_token(&data);

        let mut tracks: Vec<Track> = items.iter().filter_map(track_from_search_item).collect();
        self.fill_durations(&mut tracks).await;

        log::debug!(
            "search_videos '{}': {} tracks, more={}",
            query,
            tracks.len(),
            next_page_token.is_some()
        );

        Ok(VideoPage {
            tracks,
            next_page_token,
        })
    }

    /// Search results carry no duration; look them up with one extra call
    /// per batch. Failures leave the duration at 0.
    async fn fill_durations(&self, tracks: &mut [Track]) {
        let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        match self.fetch_durations(&ids).await {
            Ok(durations) => {
                for track in tracks.iter_mut() {
                    if let Some(secs) = durations.get(&track.id) {
                        track.duration_seconds = *secs;
                    }
                }
            }
            Err(e) => log::warn!("Could not fetch video durations: {}", e),
        }
    }

    async fn fetch_durations(&self, ids: &[String]) -> Result<HashMap<String, u64>, SearchError> {
        let mut durations = HashMap::new();

        for chunk in ids.chunks(VIDEO_ID_BATCH) {
            let joined = chunk.join(",");
            let data = self
                .make_request(
                    "/videos",
                    &[("part", "contentDetails"), ("id", joined.as_str())],
                    "fetch_durations",
                )
                .await?;

            let items: Vec<VideoItem> = Self::extract_items(&data)?;
            for item in items {
                let secs = item
                    .content_details
                    .as_ref()
                    .and_then(|d| d.duration.as_deref())
                    .map(parse_iso_duration)
                    .unwrap_or(0);
                durations.insert(item.id, secs);
            }
        }

        Ok(durations)
    }

    /// Most popular music videos in the configured region.
    pub async fn trending(&self) -> Result<Vec<Track>, SearchError> {
        let max_results = self.page_size.max(20).to_string();
        let data = self
            .make_request(
                "/videos",
                &[
                    ("part", "snippet,contentDetails"),
                    ("chart", "mostPopular"),
                    ("regionCode", self.region_code.as_str()),
                    ("videoCategoryId", MUSIC_CATEGORY_ID),
                    ("maxResults", max_results.as_str()),
                ],
                "trending",
            )
            .await?;

        let items: Vec<VideoItem> = Self::extract_items(&data)?;
        Ok(items.iter().map(track_from_video_item).collect())
    }

    /// Every playable video in a playlist, following `pageToken` until the
    /// API stops returning one.
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, SearchError> {
        let mut tracks = Vec::new();
        let mut page_token: Option<String> = None;
        let mut cursor = PageCursor::default();

        loop {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", "50"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let data = self
                .make_request("/playlistItems", &params, "playlist_tracks")
                .await?;
            let items: Vec<PlaylistItem> = Self::extract_items(&data)?;
            tracks.extend(items.iter().filter_map(track_from_playlist_item));

            page_token = cursor.advance(Self::next_page_token(&data), "playlist_tracks");
            if page_token.is_none() {
                break;
            }
        }

        self.fill_durations(&mut tracks).await;
        log::info!("Fetched {} tracks for playlist {}", tracks.len(), playlist_id);
        Ok(tracks)
    }

    /// Public playlists of a channel, aggregated across pages.
    pub async fn channel_playlists(&self, channel_id: &str) -> Result<Vec<Playlist>, SearchError> {
        let mut playlists = Vec::new();
        let mut page_token: Option<String> = None;
        let mut cursor = PageCursor::default();

        loop {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("channelId", channel_id),
                ("maxResults", "50"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let data = self
                .make_request("/playlists", &params, "channel_playlists")
                .await?;
            let items: Vec<PlaylistResource> = Self::extract_items(&data)?;
            playlists.extend(items.into_iter().map(playlist_from_resource));

            page_token = cursor.advance(Self::next_page_token(&data), "channel_playlists");
            if page_token.is_none() {
                break;
            }
        }

        Ok(playlists)
    }
}

/// Follows `pageToken`s for one listing. Stops at `MAX_PAGES` or when the
/// API hands back a token it already gave.
#[derive(Default)]
struct PageCursor {
    pages: usize,
    seen: HashSet<String>,
}

impl PageCursor {
    /// Record a fetched page and return the token for the next one.
    fn advance(&mut self, next: Option<String>, operation: &str) -> Option<String> {
        self.pages += 1;
        let token = next?;
        if self.pages >= MAX_PAGES {
            log::warn!("{}: stopping after {} pages", operation, self.pages);
            return None;
        }
        if !self.seen.insert(token.clone()) {
            log::warn!("{}: page token {} repeated, stopping", operation, token);
            return None;
        }
        Some(token)
    }
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` into seconds.
///
/// Anything unparseable (including live streams' `P0D`) is 0.
pub fn parse_iso_duration(iso: &str) -> u64 {
    let Some(rest) = iso.strip_prefix("PT") else {
        return 0;
    };

    let mut total = 0u64;
    let mut number = String::new();
    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'H' | 'M' | 'S' => {
                let value: u64 = match number.parse() {
                    Ok(v) => v,
                    Err(_) => return 0,
                };
                let unit = match c {
                    'H' => 3600,
                    'M' => 60,
                    _ => 1,
                };
                total = match value.checked_mul(unit).and_then(|secs| total.checked_add(secs)) {
                    Some(t) => t,
                    None => return 0,
                };
                number.clear();
            }
            _ => return 0,
        }
    }
    total
}

fn build_track(video_id: &str, snippet: Option<&Snippet>, album: &str, duration: u64) -> Track {
    let title = snippet
        .and_then(|s| s.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let artist = snippet
        .and_then(|s| {
            s.video_owner_channel_title
                .clone()
                .or_else(|| s.channel_title.clone())
        })
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let artwork_url = snippet
        .and_then(Snippet::artwork)
        .map(String::from)
        .unwrap_or_else(|| Track::fallback_artwork(video_id));

    Track {
        id: video_id.to_string(),
        external_video_id: video_id.to_string(),
        title,
        artist,
        album: album.to_string(),
        artwork_url,
        duration_seconds: duration,
    }
}

pub(crate) fn track_from_search_item(item: &SearchItem) -> Option<Track> {
    let video_id = item.id.video_id.as_deref().filter(|id| !id.is_empty())?;
    Some(build_track(video_id, item.snippet.as_ref(), SEARCH_ALBUM, 0))
}

pub(crate) fn track_from_video_item(item: &VideoItem) -> Track {
    let duration = item
        .content_details
        .as_ref()
        .and_then(|d| d.duration.as_deref())
        .map(parse_iso_duration)
        .unwrap_or(0);
    build_track(&item.id, item.snippet.as_ref(), TRENDING_ALBUM, duration)
}

pub(crate) fn track_from_playlist_item(item: &PlaylistItem) -> Option<Track> {
    let video_id = item.video_id().filter(|id| !id.is_empty())?;
    let title = item.snippet.as_ref().and_then(|s| s.title.as_deref());
    if title.is_some_and(|t| UNAVAILABLE_TITLES.contains(&t)) {
        return None;
    }
    Some(build_track(video_id, item.snippet.as_ref(), SEARCH_ALBUM, 0))
}

fn playlist_from_resource(item: PlaylistResource) -> Playlist {
    let snippet = item.snippet.unwrap_or_default();
    Playlist {
        cover_art_url: snippet.artwork().map(String::from),
        name: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        owner_id: snippet.channel_id,
        is_public: true,
        track_ids: Vec::new(),
        id: item.id,
    }
}
