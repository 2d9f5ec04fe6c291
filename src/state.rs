//! Long-lived services shared by every command.

use crate::config::Settings;
use crate::database::DatabaseManager;
use crate::errors::{AppError, AppResult};
use crate::history::SearchHistory;
use crate::invidious::InvidiousProvider;
use crate::library::store::KeyValueStore;
use crate::library::{MemoryStore, TrackCache};
use crate::providers::types::ProviderId;
use crate::providers::{ProviderManager, SearchProvider};
use crate::recommendations::RecommendationEngine;
use crate::youtube::{YoutubeClient, YoutubeProvider};
use std::sync::Arc;

pub struct AppState {
    pub settings: Settings,
    pub provider_manager: Arc<ProviderManager>,
    pub youtube: YoutubeClient,
    pub cache: TrackCache,
    pub search_history: SearchHistory,
}

impl AppState {
    /// Open the on-disk cache and register both backends, the configured
    /// one first so it starts out active.
    pub async fn init(settings: Settings) -> AppResult<Self> {
        let db = DatabaseManager::new(&settings.db_path).await.map_err(AppError::Database)?;
        Self::with_store(settings, Arc::new(db.store())).await
    }

    /// Same as [`init`](Self::init) but nothing outlives the process.
    pub async fn ephemeral(settings: Settings) -> AppResult<Self> {
        Self::with_store(settings, Arc::new(MemoryStore::new())).await
    }

    pub async fn with_store(settings: Settings, store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let youtube: Arc<dyn SearchProvider> = Arc::new(YoutubeProvider::new(&settings)?);
        let invidious: Arc<dyn SearchProvider> = Arc::new(InvidiousProvider::discover(&settings).await?);

        let provider_manager = Arc::new(ProviderManager::new());
        let (first, second) = match settings.backend {
            ProviderId::Youtube => (youtube, invidious),
            ProviderId::Invidious => (invidious, youtube),
        };
        provider_manager.register_provider(first).await;
        provider_manager.register_provider(second).await;

        log::info!("Search backend: {}", settings.backend);

        let cache = TrackCache::new(store);
        Ok(Self {
            youtube: YoutubeClient::new(&settings)?,
            provider_manager,
            search_history: SearchHistory::new(cache.clone()),
            cache,
            settings,
        })
    }

    pub async fn provider(&self) -> AppResult<Arc<dyn SearchProvider>> {
        self.provider_manager
            .get_active_provider()
            .await
            .ok_or_else(|| AppError::InvalidProvider("no search backend registered".to_string()))
    }

    pub async fn engine(&self) -> AppResult<RecommendationEngine> {
        Ok(RecommendationEngine::new(self.provider().await?))
    }
}
