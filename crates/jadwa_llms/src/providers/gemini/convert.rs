//! Conversion between unified types and Gemini types

use super::types::{
    GeminiContent, GeminiErrorEnvelope, GeminiGenerationConfig, GeminiPart, GeminiRequest,
    GeminiResponse,
};
use crate::error::{mentions_rate_limit, Error, Result};
use crate::types::{GenerateRequest, GenerateResponse, Usage};

/// Convert unified request to Gemini request
pub fn to_gemini_request(req: &GenerateRequest) -> GeminiRequest {
    let opts = &req.options;
    let generation_config = if opts.temperature.is_some()
        || opts.max_output_tokens.is_some()
        || opts.json_output
    {
        Some(GeminiGenerationConfig {
            temperature: opts.temperature,
            max_output_tokens: opts.max_output_tokens,
            response_mime_type: opts.json_output.then(|| "application/json".to_string()),
        })
    } else {
        None
    };

    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: Some(req.prompt.clone()),
            }],
        }],
        generation_config,
    }
}

/// Convert Gemini response to unified response. Text parts of the first
/// candidate are concatenated.
pub fn from_gemini_response(resp: GeminiResponse, model: &str) -> Result<GenerateResponse> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(Error::InvalidResponse(format!("empty response: {reason}")));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::InvalidResponse(format!(
            "candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let usage = resp.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Ok(GenerateResponse {
        text,
        model: resp.model_version.unwrap_or_else(|| model.to_string()),
        finish_reason: candidate.finish_reason,
        usage,
    })
}

/// Map a non-success HTTP answer to an error. Quota errors become
/// [`Error::RateLimited`] whether signalled by status 429, by a 429 `code`
/// in the body, or by a `RESOURCE_EXHAUSTED` body.
pub fn error_from_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> Error {
    let (code, message, service_status) = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(env) => (env.error.code, env.error.message, env.error.status),
        Err(_) => (0, body.trim().to_string(), String::new()),
    };

    if status == 429
        || code == 429
        || mentions_rate_limit(&service_status)
        || mentions_rate_limit(&message)
    {
        return Error::RateLimited {
            message: if message.is_empty() {
                format!("HTTP {status}")
            } else {
                message
            },
            retry_after_secs,
        };
    }

    Error::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerateOptions;

    #[test]
    fn test_request_serializes_camel_case() {
        let req = GenerateRequest::new("gemini-2.5-flash", "hi").with_options(GenerateOptions {
            temperature: Some(0.4),
            json_output: true,
            ..Default::default()
        });
        let value = serde_json::to_value(to_gemini_request(&req)).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let req = GenerateRequest::new("m", "hi");
        let value = serde_json::to_value(to_gemini_request(&req)).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_joins_text_parts() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"a"},{"text":"b"}]},"finishReason":"STOP"}],
                "usageMetadata":{"promptTokenCount":3,"candidatesTokenCount":2,"totalTokenCount":5}}"#,
        )
        .unwrap();
        let out = from_gemini_response(resp, "gemini-2.5-flash").unwrap();
        assert_eq!(out.text, "ab");
        assert_eq!(out.model, "gemini-2.5-flash");
        assert_eq!(out.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(out.usage.unwrap().total_tokens, 5);
    }

    #[test]
    fn test_blocked_prompt_is_invalid_response() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = from_gemini_response(resp, "m").unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_error_classification() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            error_from_status(429, body, Some(7)),
            Error::RateLimited {
                retry_after_secs: Some(7),
                ..
            }
        ));
        // Some gateways return the quota status under a different code.
        assert!(error_from_status(503, body, None).is_rate_limited());
        let err = error_from_status(400, r#"{"error":{"code":400,"message":"bad","status":"INVALID_ARGUMENT"}}"#, None);
        assert!(matches!(err, Error::Api { status: 400, .. }));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_body_code_429_is_rate_limited() {
        // Proxy rewrote the status and the message carries no quota wording.
        let body = r#"{"error":{"code":429,"message":"Try again later","status":"UNAVAILABLE"}}"#;
        let err = error_from_status(502, body, None);
        assert!(matches!(err, Error::RateLimited { ref message, .. } if message == "Try again later"));

        let body = r#"{"error":{"code":502,"message":"Try again later","status":"UNAVAILABLE"}}"#;
        assert!(matches!(
            error_from_status(502, body, None),
            Error::Api { status: 502, .. }
        ));
    }
}
