pub mod error;
pub mod manager;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::SearchError;
pub use manager::ProviderManager;
pub use traits::SearchProvider;
