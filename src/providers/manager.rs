use crate::providers::traits::SearchProvider;
use crate::providers::types::ProviderId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry of the search backends available to the app.
pub struct ProviderManager {
    providers: RwLock<HashMap<ProviderId, Arc<dyn SearchProvider>>>,
    active_provider: RwLock<Option<ProviderId>>,
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderManager {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            active_provider: RwLock::new(None),
        }
    }

    /// Register a provider. The first one registered becomes active.
    pub async fn register_provider(&self, provider: Arc<dyn SearchProvider>) {
        let id = provider.id();
        log::info!("Registering search provider: {} ({})", provider.name(), id);
        self.providers.write().await.insert(id, provider);

        let mut active = self.active_provider.write().await;
        if active.is_none() {
            *active = Some(id);
        }
    }

    pub async fn get_provider(&self, id: ProviderId) -> Option<Arc<dyn SearchProvider>> {
        self.providers.read().await.get(&id).cloned()
    }

    pub async fn get_active_provider(&self) -> Option<Arc<dyn SearchProvider>> {
        let active = *self.active_provider.read().await;
        match active {
            Some(id) => self.get_provider(id).await,
            None => None,
        }
    }

    pub async fn set_active_provider(&self, id: ProviderId) -> Result<(), String> {
        if !self.providers.read().await.contains_key(&id) {
            return Err(format!("Provider {} not found", id));
        }
        *self.active_provider.write().await = Some(id);
        log::info!("Active search provider set to {}", id);
        Ok(())
    }

    pub async fn list_providers(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.providers.read().await.keys().copied().collect();
        ids.sort_by_key(|id| id.to_string());
        ids
    }
}
