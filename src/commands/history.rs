use crate::errors::AppResult;
use crate::state::AppState;

pub async fn get_search_history(state: &AppState) -> AppResult<Vec<String>> {
    Ok(state.search_history.get().await?)
}

pub async fn clear_search_history(state: &AppState) -> AppResult<()> {
    state.search_history.clear().await?;
    log::info!("Search history cleared");
    Ok(())
}
