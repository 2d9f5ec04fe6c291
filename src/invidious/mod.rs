pub mod client;
pub mod endpoint_manager;
pub mod models;
pub mod provider;

pub use client::InvidiousClient;
pub use endpoint_manager::{Endpoint, EndpointManager};
pub use provider::InvidiousProvider;
