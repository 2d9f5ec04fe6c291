//! Recommendation feed for the home and "Recommended For You" screens.
//!
//! Builds a search query from what the user listens to (artist affinity)
//! and which community playlists overlap their own (playlist DNA), then
//! pages through a search backend, dropping anything already heard.

pub mod affinity;
pub mod dna;
pub mod engine;
pub mod errors;
pub mod query;
pub mod ranking;
pub mod types;

pub use affinity::top_artists;
pub use dna::dna_queries;
pub use engine::RecommendationEngine;
pub use errors::RecommendationError;
pub use query::compose;
pub use types::{DiscoverRequest, DiscoveryPage, MusicProfile, RecommendRequest};
