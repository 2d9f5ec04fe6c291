pub mod commands;
pub mod config;
pub mod database;
pub mod errors;
pub mod history;
pub mod invidious;
pub mod library;
pub mod models;
pub mod playlist;
pub mod providers;
pub mod recommendations;
pub mod state;
pub mod youtube;

pub use config::Settings;
pub use errors::{AppError, AppResult};
pub use state::AppState;
