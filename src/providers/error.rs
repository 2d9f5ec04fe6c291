use serde::Serialize;
use thiserror::Error;

/// Failures at the search-backend boundary.
///
/// Only `Config` is allowed to escape a provider adapter; every other kind
/// is logged and turned into an empty terminal page.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("All backend instances failed")]
    AllEndpointsFailed,
}

impl SearchError {
    pub fn is_config(&self) -> bool {
        matches!(self, SearchError::Config(_))
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Network(_) | SearchError::Timeout(_) | SearchError::AllEndpointsFailed
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout(e.to_string())
        } else if e.is_decode() {
            SearchError::Parse(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(SearchError::Network("reset".into()).is_transient());
        assert!(SearchError::Timeout("10s".into()).is_transient());
        assert!(!SearchError::Parse("eof".into()).is_transient());
        assert!(!SearchError::Config("no key".into()).is_transient());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(SearchError::Config("missing key".into())).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing key");
    }

    #[tokio::test]
    async fn test_slow_server_is_a_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client.get(format!("http://{}/", addr)).send().await.unwrap_err();
        server.abort();

        let err = SearchError::from(err);
        assert!(matches!(err, SearchError::Timeout(_)), "got {:?}", err);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_refused_connection_is_network() {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = reqwest::get(format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(SearchError::from(err), SearchError::Network(_)));
    }
}
