//! Google Gemini provider module
//!
//! Implements the Provider trait over the `generateContent` REST endpoint.
//! API docs: https://ai.google.dev/api/generate-content

mod convert;
mod provider;
mod types;

pub use provider::GeminiProvider;
pub use types::{GeminiConfig, GeminiRequest, GeminiResponse};
