use crate::models::{ContinuationToken, RecommendationPage, Track};
use crate::providers::error::SearchError;
use crate::providers::types::ProviderId;
use async_trait::async_trait;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which backend this is (e.g., "youtube", "invidious")
    fn id(&self) -> ProviderId;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Keyword search, or resume a previous search when a token is given.
    ///
    /// Implementations swallow transport and payload failures into
    /// `RecommendationPage::terminal()`. Only configuration problems are
    /// returned as errors.
    async fn search(
        &self,
        query: &str,
        continuation: Option<&ContinuationToken>,
    ) -> Result<RecommendationPage, SearchError>;

    /// Popular music right now. Backends without a chart return nothing.
    async fn trending(&self) -> Result<Vec<Track>, SearchError> {
        Ok(Vec::new())
    }
}
