use crate::error::Error;
use crate::provider::Provider;
use crate::providers::GeminiProvider;
use crate::providers::gemini::GeminiConfig;
use crate::types::{GenerateRequest, GenerateResponse, Headers};
use async_trait::async_trait;

/// Mock provider for testing
struct MockProvider {
    id: &'static str,
}

#[async_trait]
impl Provider for MockProvider {
    fn provider_id(&self) -> &str {
        self.id
    }

    fn build_headers(&self, _custom_headers: Option<&Headers>) -> Headers {
        Headers::new()
    }

    async fn generate(&self, _request: GenerateRequest) -> crate::error::Result<GenerateResponse> {
        Err(Error::Other("mock".to_string()))
    }
}

#[tokio::test]
async fn test_default_list_models_is_empty() {
    let provider = MockProvider { id: "mock" };
    assert!(provider.list_models().await.unwrap().is_empty());
}

#[test]
fn test_gemini_rejects_empty_key() {
    let result = GeminiProvider::new(GeminiConfig::new("  "));
    assert!(matches!(result, Err(Error::MissingApiKey(_))));
}

#[test]
fn test_gemini_headers_carry_key() {
    let provider = GeminiProvider::new(GeminiConfig::new("secret")).unwrap();
    let headers = provider.build_headers(None);
    assert_eq!(headers.get("x-goog-api-key"), Some("secret"));
    assert_eq!(
        provider.config().generate_url("gemini-2.5-flash"),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[tokio::test]
async fn test_trait_object_dispatch() {
    let provider: Box<dyn Provider> = Box::new(MockProvider { id: "mock" });
    assert_eq!(provider.provider_id(), "mock");
    let err = provider
        .generate(GenerateRequest::new("m", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "mock");
}
