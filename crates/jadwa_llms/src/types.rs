//! Provider-independent request and response types.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Ordered set of HTTP headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Overwrite entries with the ones in `other`.
    pub fn merge_with(&mut self, other: &Headers) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Convert to a reqwest map. Entries that are not valid HTTP headers are skipped.
    pub fn to_reqwest_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in &self.0 {
            match (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => tracing::warn!(header = %k, "skipping invalid header"),
            }
        }
        map
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Ask the service to answer with a JSON document.
    #[serde(default)]
    pub json_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
}

/// One prompt for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: GenerateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Same request against another model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_merge_overrides() {
        let mut base = Headers::new();
        base.insert("x-goog-api-key", "a");
        base.insert("Content-Type", "application/json");
        let mut custom = Headers::new();
        custom.insert("x-goog-api-key", "b");
        base.merge_with(&custom);
        assert_eq!(base.get("x-goog-api-key"), Some("b"));
        assert_eq!(base.to_reqwest_headers().len(), 2);
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let mut headers = Headers::new();
        headers.insert("bad header", "v");
        headers.insert("ok", "v");
        assert_eq!(headers.to_reqwest_headers().len(), 1);
    }

    #[test]
    fn test_for_model_keeps_prompt() {
        let req = GenerateRequest::new("primary", "hello").with_options(GenerateOptions {
            json_output: true,
            ..Default::default()
        });
        let fallback = req.for_model("secondary");
        assert_eq!(fallback.model, "secondary");
        assert_eq!(fallback.prompt, "hello");
        assert!(fallback.options.json_output);
    }
}
