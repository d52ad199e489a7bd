//! Infrastructure layer: durable session storage, configuration loading,
//! and API-key resolution for the Mentor assistant.

pub mod api_key;
pub mod config_loader;
pub mod dto;
pub mod paths;
pub mod session_store;

pub use api_key::{ApiKeyStore, KeyStatus};
pub use config_loader::load_config;
pub use session_store::JsonSessionRepository;
