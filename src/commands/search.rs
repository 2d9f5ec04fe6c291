use crate::errors::AppResult;
use crate::models::{ContinuationToken, RecommendationPage, Track};
use crate::state::AppState;

/// Search the active backend. A new query is added to the search history;
/// resuming with a token is not.
pub async fn search_tracks(
    state: &AppState,
    query: &str,
    continuation_token: Option<ContinuationToken>,
) -> AppResult<RecommendationPage> {
    let provider = state.provider().await?;

    if continuation_token.is_none() && !query.trim().is_empty() {
        state.search_history.record(query).await?;
    }

    let page = provider.search(query, continuation_token.as_ref()).await?;
    state.cache.add_tracks(&page.tracks).await?;
    Ok(page)
}

pub async fn get_trending(state: &AppState) -> AppResult<Vec<Track>> {
    let tracks = state.provider().await?.trending().await?;
    state.cache.add_tracks(&tracks).await?;
    Ok(tracks)
}
