use crate::config::Settings;
use crate::models::{ContinuationToken, RecommendationPage, Track};
use crate::providers::traits::SearchProvider;
use crate::providers::types::ProviderId;
use crate::providers::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::InvidiousClient;
use super::endpoint_manager::EndpointManager;

/// Invidious pages by number, so tokens handed to callers carry the query
/// and the next page. Only this module reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Cursor {
    q: String,
    page: u32,
}

impl Cursor {
    fn encode(&self) -> Result<ContinuationToken, SearchError> {
        Ok(ContinuationToken::new(serde_json::to_string(self)?))
    }

    fn decode(token: &ContinuationToken) -> Result<Self, SearchError> {
        serde_json::from_str(token.as_str())
            .map_err(|e| SearchError::Parse(format!("unrecognised continuation token: {}", e)))
    }
}

pub struct InvidiousProvider {
    client: InvidiousClient,
}

impl InvidiousProvider {
    pub fn new(settings: &Settings, endpoint_manager: EndpointManager) -> Result<Self, SearchError> {
        Ok(Self {
            client: InvidiousClient::new(settings, endpoint_manager)?,
        })
    }

    /// Provider over the configured instance plus any discovered fallbacks.
    pub async fn discover(settings: &Settings) -> Result<Self, SearchError> {
        let endpoints =
            EndpointManager::discover(&settings.invidious_url, settings.request_timeout).await;
        Self::new(settings, endpoints)
    }

    async fn fetch(&self, cursor: Cursor) -> Result<RecommendationPage, SearchError> {
        let page = self.client.search_videos(&cursor.q, cursor.page).await?;

        let next_continuation_token = if page.has_more {
            Some(
                Cursor {
                    q: cursor.q,
                    page: cursor.page + 1,
                }
                .encode()?,
            )
        } else {
            None
        };

        Ok(RecommendationPage {
            tracks: page.tracks,
            next_continuation_token,
        })
    }
}

#[async_trait]
impl SearchProvider for InvidiousProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Invidious
    }

    fn name(&self) -> &str {
        "Invidious"
    }

    async fn search(
        &self,
        query: &str,
        continuation: Option<&ContinuationToken>,
    ) -> Result<RecommendationPage, SearchError> {
        let cursor = match continuation {
            Some(token) => Cursor::decode(token),
            None if query.trim().is_empty() => return Ok(RecommendationPage::terminal()),
            None => Ok(Cursor {
                q: query.to_string(),
                page: 1,
            }),
        };

        let result = match cursor {
            Ok(cursor) => self.fetch(cursor).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(page) => Ok(page),
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                log::warn!("Invidious search for '{}' failed: {}", query, e);
                Ok(RecommendationPage::terminal())
            }
        }
    }

    async fn trending(&self) -> Result<Vec<Track>, SearchError> {
        match self.client.trending().await {
            Ok(tracks) => Ok(tracks),
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                log::warn!("Failed to fetch trending songs: {}", e);
                Ok(Vec::new())
            }
        }
    }
}
