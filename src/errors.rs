use crate::library::store::StoreError;
use crate::providers::SearchError;
use crate::recommendations::RecommendationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", e))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(msg) => AppError::Database(msg),
            StoreError::Serialization(msg) => AppError::Internal(format!("Serialization error: {}", msg)),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Config(msg) => AppError::Config(msg),
            other => AppError::Network(other.to_string()),
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(e: RecommendationError) -> Self {
        match e {
            RecommendationError::Config(msg) => AppError::Config(msg),
        }
    }
}
