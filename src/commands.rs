//! Operations exposed to the UI layer and the command line.
//!
//! Each command takes the shared [`AppState`](crate::state::AppState) and
//! returns an [`AppResult`](crate::errors::AppResult) that serializes with a
//! `type` tag.

pub mod history;
pub mod playlist;
pub mod providers;
pub mod recommendations;
pub mod search;

pub use history::{clear_search_history, get_search_history};
pub use playlist::{generate_playlist, get_channel_playlists, get_playlist_tracks};
pub use providers::{get_active_provider, list_providers, set_active_provider};
pub use recommendations::{discover, get_recommendations, DiscoverInput, RecommendationsInput};
pub use search::{get_trending, search_tracks};
