pub mod api;
pub mod config;

pub use api::AppState;
pub use config::RelayConfig;
