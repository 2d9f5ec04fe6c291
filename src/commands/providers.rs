use crate::errors::{AppError, AppResult};
use crate::providers::types::ProviderId;
use crate::state::AppState;
use std::str::FromStr;

pub async fn list_providers(state: &AppState) -> Vec<ProviderId> {
    state.provider_manager.list_providers().await
}

pub async fn get_active_provider(state: &AppState) -> Option<ProviderId> {
    state.provider().await.ok().map(|p| p.id())
}

pub async fn set_active_provider(state: &AppState, provider_id: &str) -> AppResult<()> {
    let id = ProviderId::from_str(provider_id).map_err(AppError::InvalidProvider)?;
    state
        .provider_manager
        .set_active_provider(id)
        .await
        .map_err(AppError::InvalidProvider)?;
    log::info!("Active search backend set to {}", id);
    Ok(())
}
