//! Turn a list of suggested songs into playable tracks and a playlist.

use crate::library::dedup::unique_by_id;
use crate::models::{Playlist, Track};
use crate::providers::{SearchError, SearchProvider};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cover used when none of the songs could be found.
pub const PLACEHOLDER_COVER_URL: &str = "https://i.postimg.cc/SswWC87w/streamtune.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSuggestion {
    pub title: String,
    pub artist: String,
}

impl SongSuggestion {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    fn query(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// Metadata for a playlist built by [`PlaylistResolver::build`].
#[derive(Debug, Clone, Default)]
pub struct PlaylistDraft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
}

pub struct PlaylistResolver {
    provider: Arc<dyn SearchProvider>,
}

impl PlaylistResolver {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Search every song at once and keep each search's top hit.
    ///
    /// Results follow the order of `songs`, not completion order. Songs with
    /// no hit are skipped, as are repeats of a track already found.
    pub async fn resolve(&self, songs: &[SongSuggestion]) -> Result<Vec<Track>, SearchError> {
        log::info!("Resolving {} suggested songs", songs.len());

        let queries: Vec<String> = songs.iter().map(SongSuggestion::query).collect();
        let results = join_all(queries.iter().map(|q| self.provider.search(q, None))).await;

        let mut found = Vec::with_capacity(songs.len());
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(page) => match page.tracks.into_iter().next() {
                    Some(track) => found.push(track),
                    None => log::debug!("No match for '{}'", query),
                },
                Err(e) if e.is_config() => return Err(e),
                Err(e) => log::warn!("Search for '{}' failed: {}", query, e),
            }
        }

        let tracks = unique_by_id(found);
        log::info!("Matched {}/{} songs", tracks.len(), songs.len());
        Ok(tracks)
    }

    /// Resolve `songs` and wrap the result in a playlist whose cover is the
    /// first track's artwork.
    pub async fn build(
        &self,
        draft: PlaylistDraft,
        songs: &[SongSuggestion],
    ) -> Result<(Playlist, Vec<Track>), SearchError> {
        let tracks = self.resolve(songs).await?;

        let cover_art_url = tracks
            .first()
            .map(|t| t.artwork_url.clone())
            .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string());

        let playlist = Playlist {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            owner_id: draft.owner_id,
            is_public: draft.is_public,
            track_ids: tracks.iter().map(|t| t.id.clone()).collect(),
            cover_art_url: Some(cover_art_url),
        };

        Ok((playlist, tracks))
    }
}
