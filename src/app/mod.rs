pub mod config;
pub mod state;

pub use config::{AppConfig, BackendConfig, ChatConfig, GeminiConfig, ProviderKind, UIConfig};
pub use state::AppState;
