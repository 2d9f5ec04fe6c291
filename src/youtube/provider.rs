use crate::config::Settings;
use crate::models::{ContinuationToken, RecommendationPage, Track};
use crate::providers::traits::SearchProvider;
use crate::providers::types::ProviderId;
use crate::providers::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::YoutubeClient;

/// The API only honours a `pageToken` alongside the query that produced
/// it, so both travel together inside the token handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Cursor {
    q: String,
    #[serde(rename = "pageToken")]
    page_token: String,
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

/// YouTube Data API v3 as a search backend.
pub struct YoutubeProvider {
    client: YoutubeClient,
}

impl YoutubeProvider {
    pub fn new(settings: &Settings) -> Result<Self, SearchError> {
        Ok(Self {
            client: YoutubeClient::new(settings)?,
        })
    }

    pub fn with_client(client: YoutubeClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &YoutubeClient {
        &self.client
    }
}

#[async_trait]
impl SearchProvider for YoutubeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Youtube
    }

    fn name(&self) -> &str {
        "YouTube"
    }

    async fn search(
        &self,
        query: &str,
        continuation: Option<&ContinuationToken>,
    ) -> Result<RecommendationPage, SearchError> {
        let (q, page_token) = match continuation.map(Cursor::decode) {
            Some(Ok(cursor)) => (cursor.q, Some(cursor.page_token)),
            Some(Err(e)) => {
                log::warn!("Dropping continuation: {}", e);
                return Ok(RecommendationPage::terminal());
            }
            None if query.trim().is_empty() => return Ok(RecommendationPage::terminal()),
            None => (query.to_string(), None),
        };

        let result = match self.client.search_videos(&q, page_token.as_deref()).await {
            Ok(page) => page
                .next_page_token
                .map(|page_token| Cursor { q, page_token }.encode())
                .transpose()
                .map(|next_continuation_token| RecommendationPage {
                    tracks: page.tracks,
                    next_continuation_token,
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(page) => Ok(page),
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                log::warn!("YouTube search for '{}' failed: {}", query, e);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> YoutubeProvider {
        let mut settings = Settings::new("key");
        settings.request_timeout = std::time::Duration::from_secs(1);
        let client = YoutubeClient::new(&settings)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        YoutubeProvider::with_client(client)
    }

    #[test]
    fn test_cursor_keeps_query_with_page_token() {
        let token = Cursor {
            q: "arijit singh".to_string(),
            page_token: "CAoQAA".to_string(),
        }
        .encode()
        .unwrap();

        assert_eq!(
            Cursor::decode(&token).unwrap(),
            Cursor {
                q: "arijit singh".to_string(),
                page_token: "CAoQAA".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_blank_query_short_circuits() {
        let page = provider().search("", None).await.unwrap();
        assert_eq!(page, RecommendationPage::terminal());
    }

    #[tokio::test]
    async fn test_unreachable_api_degrades_to_terminal_page() {
        let page = provider().search("lofi", None).await.unwrap();
        assert!(page.is_terminal());
        assert!(page.tracks.is_empty());
    }
}
