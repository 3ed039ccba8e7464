//! Protoscribe Providers - Completion client implementations
//!
//! This crate talks to OpenAI-compatible chat-completion endpoints
//! (`POST /v1/chat/completions`) and turns failures into [`ProviderError`]
//! values the session layer can report without crashing.

mod config;
mod error;
mod error_classify;
mod openai;
mod traits;

pub use config::{ProviderConfig, DEFAULT_BASE_URL};
pub use error::ProviderError;
pub use error_classify::{classify_error, parse_error_body, OpenAIErrorInfo};
pub use openai::OpenAIClient;
pub use secrecy::SecretString;
pub use traits::{CompletionClient, ProviderResult};
