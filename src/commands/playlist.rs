use crate::errors::AppResult;
use crate::models::{Playlist, Track};
use crate::playlist::{PlaylistDraft, PlaylistResolver, SongSuggestion};
use crate::state::AppState;

/// Build a playlist from suggested songs and remember the matched tracks.
pub async fn generate_playlist(
    state: &AppState,
    draft: PlaylistDraft,
    songs: &[SongSuggestion],
) -> AppResult<(Playlist, Vec<Track>)> {
    let resolver = PlaylistResolver::new(state.provider().await?);
    let (playlist, tracks) = resolver.build(draft, songs).await?;

    state.cache.add_tracks(&tracks).await?;
    state.cache.cache_playlist(&playlist).await?;
    Ok((playlist, tracks))
}

/// Tracks of a YouTube playlist, served from the cache when possible.
pub async fn get_playlist_tracks(state: &AppState, playlist_id: &str) -> AppResult<Vec<Track>> {
    if let Some(tracks) = state.cache.cached_playlist_tracks(playlist_id).await? {
        log::debug!("Playlist tracks cache hit for {}", playlist_id);
        return Ok(tracks);
    }

    let tracks = state.youtube.playlist_tracks(playlist_id).await?;
    state.cache.add_tracks(&tracks).await?;
    state.cache.cache_playlist_tracks(playlist_id, &tracks).await?;
    Ok(tracks)
}

/// Public playlists of a channel, each remembered individually.
pub async fn get_channel_playlists(state: &AppState, channel_id: &str) -> AppResult<Vec<Playlist>> {
    if let Some(playlists) = state.cache.cached_channel_playlists(channel_id).await? {
        log::debug!("Channel playlists cache hit for {}", channel_id);
        return Ok(playlists);
    }

    let playlists = state.youtube.channel_playlists(channel_id).await?;
    for playlist in &playlists {
        state.cache.cache_playlist(playlist).await?;
    }
    state
        .cache
        .cache_channel_playlists(channel_id, &playlists)
        .await?;
    Ok(playlists)
}
