//! Recent search queries, newest first.
//!
//! The list feeds keyword extraction for the discovery profile, so any
//! change to it also drops the cached recommendations built from it.

use crate::library::store::{load_json, save_json, StoreError};
use crate::library::TrackCache;

pub const MAX_SEARCH_HISTORY: usize = 10;
const SEARCH_HISTORY_KEY: &str = "searchHistory";

pub struct SearchHistory {
    cache: TrackCache,
}

impl SearchHistory {
    pub fn new(cache: TrackCache) -> Self {
        Self { cache }
    }

    pub async fn get(&self) -> Result<Vec<String>, StoreError> {
        let store = self.cache.store();
        Ok(load_json(store.as_ref(), SEARCH_HISTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Put `query` at the front, dropping any earlier entry that differs
    /// only in case. Blank queries are ignored.
    pub async fn record(&self, query: &str) -> Result<Vec<String>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return self.get().await;
        }

        let lowered = query.to_lowercase();
        let mut history = vec![query.to_string()];
        history.extend(
            self.get()
                .await?
                .into_iter()
                .filter(|item| item.to_lowercase() != lowered),
        );
        history.truncate(MAX_SEARCH_HISTORY);

        let store = self.cache.store();
        save_json(store.as_ref(), SEARCH_HISTORY_KEY, &history).await?;
        log::debug!("Search history now holds {} entries", history.len());

        self.cache.clear_recommendation_caches().await?;
        Ok(history)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.cache.store().remove(SEARCH_HISTORY_KEY).await?;
        self.cache.clear_recommendation_caches().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryStore;
    use std::sync::Arc;

    fn history() -> (SearchHistory, TrackCache) {
        let cache = TrackCache::new(Arc::new(MemoryStore::new()));
        (SearchHistory::new(cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_newest_first_with_case_insensitive_dedupe() {
        let (history, _) = history();
        history.record("lofi beats").await.unwrap();
        history.record("Arijit Singh").await.unwrap();
        let list = history.record("  LOFI Beats ").await.unwrap();

        assert_eq!(list, vec!["LOFI Beats", "Arijit Singh"]);
        assert_eq!(history.get().await.unwrap(), list);
    }

    #[tokio::test]
    async fn test_capped_at_ten() {
        let (history, _) = history();
        for i in 0..15 {
            history.record(&format!("query {}", i)).await.unwrap();
        }

        let list = history.get().await.unwrap();
        assert_eq!(list.len(), MAX_SEARCH_HISTORY);
        assert_eq!(list[0], "query 14");
        assert_eq!(list[9], "query 5");
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let (history, _) = history();
        history.record("rock").await.unwrap();
        assert_eq!(history.record("   ").await.unwrap(), vec!["rock"]);
    }

    #[tokio::test]
    async fn test_recording_clears_recommendation_caches() {
        let (history, cache) = history();
        cache.cache_playlist_tracks("PL1", &[]).await.unwrap();

        history.record("jazz").await.unwrap();
        assert_eq!(cache.cached_playlist_tracks("PL1").await.unwrap(), None);

        cache.cache_recommended_playlists("jazz", &[]).await.unwrap();
        history.clear().await.unwrap();
        assert!(history.get().await.unwrap().is_empty());
        assert_eq!(cache.cached_recommended_playlists("jazz").await.unwrap(), None);
    }
}
