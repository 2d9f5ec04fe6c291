pub mod dedup;
pub mod store;

use crate::models::{Playlist, Track};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::{load_json, remove_prefix, save_json, KeyValueStore, StoreError};

pub use store::MemoryStore;

const TRACK_PREFIX: &str = "track-";
pub const RECOMMENDED_PLAYLISTS_PREFIX: &str = "recommended-playlists-";
pub const PLAYLIST_TRACKS_PREFIX: &str = "playlist-tracks-";
pub const SINGLE_PLAYLIST_PREFIX: &str = "single-playlist-";
pub const CHANNEL_PLAYLISTS_PREFIX: &str = "channel-playlists-";

/// Prefixes dropped whenever the listener's taste signals change.
const RECOMMENDATION_PREFIXES: [&str; 4] = [
    RECOMMENDED_PLAYLISTS_PREFIX,
    PLAYLIST_TRACKS_PREFIX,
    SINGLE_PLAYLIST_PREFIX,
    CHANNEL_PLAYLISTS_PREFIX,
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cached<T> {
    value: T,
    /// Unix seconds.
    cached_at: i64,
}

/// Tracks and playlist lookups kept between runs.
///
/// Recently played history only stores ids, so this is where the
/// recommendation feed turns them back into tracks.
#[derive(Clone)]
pub struct TrackCache {
    store: Arc<dyn KeyValueStore>,
}

impl TrackCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub async fn add_tracks(&self, tracks: &[Track]) -> Result<(), StoreError> {
        for track in tracks {
            save_json(self.store.as_ref(), &format!("{}{}", TRACK_PREFIX, track.id), track).await?;
        }
        log::debug!("Cached {} tracks", tracks.len());
        Ok(())
    }

    pub async fn get_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        load_json(self.store.as_ref(), &format!("{}{}", TRACK_PREFIX, id)).await
    }

    /// Tracks for `ids` in the same order; unknown ids are skipped.
    pub async fn resolve(&self, ids: &[String]) -> Result<Vec<Track>, StoreError> {
        let mut tracks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(track) = self.get_track(id).await? {
                tracks.push(track);
            }
        }
        Ok(tracks)
    }

    async fn load<T: for<'de> Deserialize<'de>>(&self, key: String) -> Result<Option<T>, StoreError> {
        let cached: Option<Cached<T>> = load_json(self.store.as_ref(), &key).await?;
        Ok(cached.map(|c| c.value))
    }

    async fn save<T: Serialize + Sync>(&self, key: String, value: T) -> Result<(), StoreError> {
        let entry = Cached {
            value,
            cached_at: Utc::now().timestamp(),
        };
        save_json(self.store.as_ref(), &key, &entry).await
    }

    pub async fn cached_playlist_tracks(&self, playlist_id: &str) -> Result<Option<Vec<Track>>, StoreError> {
        self.load(format!("{}{}", PLAYLIST_TRACKS_PREFIX, playlist_id)).await
    }

    pub async fn cache_playlist_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<(), StoreError> {
        self.save(format!("{}{}", PLAYLIST_TRACKS_PREFIX, playlist_id), tracks)
            .await
    }

    pub async fn cached_recommended_playlists(&self, genre: &str) -> Result<Option<Vec<Playlist>>, StoreError> {
        self.load(format!("{}{}", RECOMMENDED_PLAYLISTS_PREFIX, genre)).await
    }

    pub async fn cache_recommended_playlists(&self, genre: &str, playlists: &[Playlist]) -> Result<(), StoreError> {
        self.save(format!("{}{}", RECOMMENDED_PLAYLISTS_PREFIX, genre), playlists)
            .await
    }

    pub async fn cached_channel_playlists(&self, channel_id: &str) -> Result<Option<Vec<Playlist>>, StoreError> {
        self.load(format!("{}{}", CHANNEL_PLAYLISTS_PREFIX, channel_id)).await
    }

    pub async fn cache_channel_playlists(&self, channel_id: &str, playlists: &[Playlist]) -> Result<(), StoreError> {
        self.save(format!("{}{}", CHANNEL_PLAYLISTS_PREFIX, channel_id), playlists)
            .await
    }

    pub async fn cached_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>, StoreError> {
        self.load(format!("{}{}", SINGLE_PLAYLIST_PREFIX, playlist_id)).await
    }

    pub async fn cache_playlist(&self, playlist: &Playlist) -> Result<(), StoreError> {
        self.save(format!("{}{}", SINGLE_PLAYLIST_PREFIX, playlist.id), playlist)
            .await
    }

    /// Drop every playlist and recommendation entry. Cached tracks stay.
    pub async fn clear_recommendation_caches(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for prefix in RECOMMENDATION_PREFIXES {
            removed += remove_prefix(self.store.as_ref(), prefix).await?;
        }
        log::info!("Cleared {} recommendation cache entries", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> TrackCache {
        TrackCache::new(Arc::new(MemoryStore::new()))
    }

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            external_video_id: id.to_string(),
            title: format!("Title {}", id),
            artist: "Artist".to_string(),
            album: "YouTube".to_string(),
            artwork_url: Track::fallback_artwork(id),
            duration_seconds: 180,
        }
    }

    #[tokio::test]
    async fn test_resolve_keeps_order_and_skips_unknown() {
        let cache = cache();
        cache.add_tracks(&[track("a"), track("b")]).await.unwrap();

        let ids = vec!["b".to_string(), "zzz".to_string(), "a".to_string()];
        let tracks = cache.resolve(&ids).await.unwrap();
        let got: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(got, vec!["b", "a"]);
        assert_eq!(cache.get_track("a").await.unwrap(), Some(track("a")));
    }

    #[tokio::test]
    async fn test_playlist_caches_round_trip() {
        let cache = cache();
        let playlist = Playlist {
            id: "PL1".into(),
            name: "Chill".into(),
            ..Playlist::default()
        };

        assert_eq!(cache.cached_playlist("PL1").await.unwrap(), None);
        cache.cache_playlist(&playlist).await.unwrap();
        cache.cache_playlist_tracks("PL1", &[track("a")]).await.unwrap();
        cache
            .cache_recommended_playlists("lofi", &[playlist.clone()])
            .await
            .unwrap();

        assert_eq!(cache.cached_playlist("PL1").await.unwrap(), Some(playlist));
        assert_eq!(cache.cached_playlist_tracks("PL1").await.unwrap().unwrap().len(), 1);
        assert_eq!(
            cache.cached_recommended_playlists("lofi").await.unwrap().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_channel_listing_does_not_collide_with_genre() {
        let cache = cache();
        let channel = Playlist {
            id: "PLc".into(),
            name: "Uploads".into(),
            ..Playlist::default()
        };
        cache.cache_channel_playlists("lofi", &[channel.clone()]).await.unwrap();

        assert_eq!(cache.cached_recommended_playlists("lofi").await.unwrap(), None);
        assert_eq!(
            cache.cached_channel_playlists("lofi").await.unwrap(),
            Some(vec![channel])
        );

        assert_eq!(cache.clear_recommendation_caches().await.unwrap(), 1);
        assert_eq!(cache.cached_channel_playlists("lofi").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_are_stamped_in_unix_seconds() {
        let cache = cache();
        cache.cache_playlist_tracks("PL1", &[track("a")]).await.unwrap();

        let raw = cache.store().get("playlist-tracks-PL1").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let stamp = json["cachedAt"].as_i64().unwrap();
        assert!((stamp - Utc::now().timestamp()).abs() < 60);
        assert_eq!(json["value"][0]["id"], "a");
    }

    #[tokio::test]
    async fn test_clear_keeps_tracks() {
        let cache = cache();
        cache.add_tracks(&[track("a")]).await.unwrap();
        cache.cache_playlist_tracks("PL1", &[track("a")]).await.unwrap();
        cache.cache_recommended_playlists("rock", &[]).await.unwrap();

        assert_eq!(cache.clear_recommendation_caches().await.unwrap(), 2);
        assert_eq!(cache.cached_playlist_tracks("PL1").await.unwrap(), None);
        assert!(cache.get_track("a").await.unwrap().is_some());
    }
}
