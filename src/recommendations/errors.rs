//! Typed errors for the recommendation system.
//!
//! Transport failures never reach this type; they are absorbed into empty
//! pages at the search boundary.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum RecommendationError {
    /// A required credential or setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}
