//! Data types for the recommendation system.

use crate::models::{ContinuationToken, Track, UserHistorySnapshot};
use serde::{Deserialize, Serialize};

/// Input to [`RecommendationEngine::recommend`](super::RecommendationEngine::recommend).
///
/// With a token the request resumes a previous search; without one it
/// starts a fresh search for `query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub query: Option<String>,
    pub continuation_token: Option<ContinuationToken>,
    pub user_history: Option<UserHistorySnapshot>,
}

impl RecommendRequest {
    pub fn fresh(query: impl Into<String>, history: Option<UserHistorySnapshot>) -> Self {
        Self {
            query: Some(query.into()),
            continuation_token: None,
            user_history: history,
        }
    }

    pub fn resume(token: ContinuationToken) -> Self {
        Self {
            continuation_token: Some(token),
            ..Self::default()
        }
    }
}

/// What a user's history says about their taste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicProfile {
    pub top_artists: Vec<String>,
    pub top_keywords: Vec<String>,
    /// Keywords and playlist-DNA names, de-duplicated.
    pub dominant_genres: Vec<String>,
}

/// IDs the multi-query feed should never show again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenTracks {
    #[serde(default)]
    pub recently_played_ids: Vec<String>,
    #[serde(default)]
    pub liked_song_ids: Vec<String>,
}

/// Input to [`RecommendationEngine::discover`](super::RecommendationEngine::discover).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub profile: MusicProfile,
    pub queries: Vec<String>,
    pub seen: SeenTracks,
    pub continuation_token: Option<ContinuationToken>,
    /// The query that produced `continuation_token`.
    pub continuation_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryPage {
    pub tracks: Vec<Track>,
    pub next_continuation_token: Option<ContinuationToken>,
    pub continuation_query: Option<String>,
}
