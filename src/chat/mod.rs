pub mod format;
pub mod service;
pub mod types;

pub use format::strip_formatting;
pub use service::ChatSessionManager;
pub use types::{Message, Origin, Session, SessionError, SessionOptions, DEFAULT_FAILURE_NOTICE};
