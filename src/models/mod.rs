pub mod backend;
pub mod canned;
pub mod gemini;
pub mod provider;

pub use backend::BackendProvider;
pub use canned::CannedProvider;
pub use gemini::GeminiProvider;
pub use provider::{ProviderError, ReplyProvider};
