//! jadwa_llms: provider SDK for one-shot text generation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            dyn Provider (trait)              │
//! │   provider_id / build_headers / generate     │
//! │                     │                        │
//! │                     ▼                        │
//! │            ┌─────────────────┐               │
//! │            │ GeminiProvider  │               │
//! │            └─────────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jadwa_llms::{GenerateRequest, GeminiProvider, Provider};
//!
//! # async fn run() -> jadwa_llms::Result<()> {
//! let provider = GeminiProvider::from_env()?;
//! let response = provider
//!     .generate(GenerateRequest::new("gemini-2.5-flash", "Say hello"))
//!     .await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use provider::Provider;

pub use providers::GeminiProvider;

pub use types::{GenerateOptions, GenerateRequest, GenerateResponse, Headers, Usage};
