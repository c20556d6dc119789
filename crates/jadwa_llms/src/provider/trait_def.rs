use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateResponse, Headers};

/// A hosted text-generation service.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"gemini"`.
    fn provider_id(&self) -> &str;

    /// Headers sent with every request, merged with per-request overrides.
    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers;

    /// Models this provider is known to serve.
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Send one prompt and wait for the full answer.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}
