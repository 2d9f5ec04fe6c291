//! Commands for the recommendation feeds.

use crate::errors::AppResult;
use crate::models::{ContinuationToken, Playlist, RecommendationPage, UserHistorySnapshot};
use crate::recommendations::ranking::{build_profile, profile_queries};
use crate::recommendations::types::SeenTracks;
use crate::recommendations::{DiscoverRequest, DiscoveryPage, RecommendRequest};
use crate::state::AppState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsInput {
    /// Explicit query. When absent it is composed from the history.
    pub query: Option<String>,
    pub continuation_token: Option<ContinuationToken>,
    pub user_history: Option<UserHistorySnapshot>,
    #[serde(default)]
    pub community_playlists: Vec<Playlist>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverInput {
    #[serde(default)]
    pub user_history: UserHistorySnapshot,
    #[serde(default)]
    pub liked_song_ids: Vec<String>,
    #[serde(default)]
    pub community_playlists: Vec<Playlist>,
    pub continuation_token: Option<ContinuationToken>,
    pub continuation_query: Option<String>,
}

/// One page of the "Recommended For You" feed.
///
/// Recently played ids are resolved through the track cache so their
/// artists can seed the query.
pub async fn get_recommendations(
    state: &AppState,
    input: RecommendationsInput,
) -> AppResult<RecommendationPage> {
    let engine = state.engine().await?;

    let request = match input.continuation_token {
        Some(token) => RecommendRequest::resume(token),
        None => {
            let explicit = input.query.filter(|q| !q.trim().is_empty());
            let query = match (explicit, input.user_history.as_ref()) {
                (Some(q), _) => q,
                (None, Some(history)) => {
                    let recent = state.cache.resolve(&history.recently_played_track_ids).await?;
                    engine.query_from_history(history, &recent, &input.community_playlists)
                }
                (None, None) => String::new(),
            };
            RecommendRequest::fresh(query, input.user_history)
        }
    };

    let page = engine.recommend(request).await?;
    state.cache.add_tracks(&page.tracks).await?;

    log::info!(
        "Returning {} recommendations (more: {})",
        page.tracks.len(),
        !page.is_terminal()
    );
    Ok(page)
}

/// One page of the multi-query discovery feed, profiled from recent plays,
/// search history and playlist overlap.
pub async fn discover(state: &AppState, input: DiscoverInput) -> AppResult<DiscoveryPage> {
    let history = &input.user_history;
    let recent = state.cache.resolve(&history.recently_played_track_ids).await?;
    let searches = state.search_history.get().await?;

    let profile = build_profile(
        &recent,
        &searches,
        &history.user_playlists,
        &input.community_playlists,
    );
    let queries = profile_queries(&profile);
    log::debug!("Discovery profile {:?} -> {} queries", profile, queries.len());

    let request = DiscoverRequest {
        profile,
        queries,
        seen: SeenTracks {
            recently_played_ids: history.recently_played_track_ids.clone(),
            liked_song_ids: input.liked_song_ids,
        },
        continuation_token: input.continuation_token,
        continuation_query: input.continuation_query,
    };

    let page = state.engine().await?.discover(request).await?;
    state.cache.add_tracks(&page.tracks).await?;
    Ok(page)
}
