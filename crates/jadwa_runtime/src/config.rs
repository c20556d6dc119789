//! Runtime configuration for jadwa

use std::path::PathBuf;
use std::time::Duration;

use jadwa_core::{ReportLanguage, ResponseMode};
use jadwa_llms::GeminiProvider;

use crate::error::{AnalysisError, Result};
use crate::leads::AdminAuth;
use crate::retry::RetryPolicy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_LEADS_PATH: &str = "leads.csv";
pub const ADMIN_DIGEST_ENV: &str = "JADWA_ADMIN_TOKEN_SHA256";

/// Runtime configuration
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Gemini API key (`GEMINI_API_KEY`, or the older `GEMINI_KEY`)
    pub api_key: Option<String>,
    /// Override of the Gemini endpoint, used against local mock servers
    pub base_url: Option<String>,
    /// Primary model
    pub model: String,
    /// Model tried once after the primary model is rate limited out
    pub fallback_model: Option<String>,
    pub mode: ResponseMode,
    pub language: ReportLanguage,
    pub retry: RetryPolicy,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Lead log location (None = logging disabled)
    pub leads_path: Option<PathBuf>,
    /// Hex SHA-256 digest of the admin token guarding lead reads
    pub admin_token_sha256: Option<String>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("mode", &self.mode)
            .field("language", &self.language)
            .field("retry", &self.retry)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("leads_path", &self.leads_path)
            .field("admin_token_sha256", &self.admin_token_sha256.is_some())
            .finish()
    }
}

/// `abcd...wxyz` for long secrets, `****` otherwise.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            mode: ResponseMode::default(),
            language: ReportLanguage::default(),
            retry: RetryPolicy::default(),
            temperature: None,
            max_output_tokens: None,
            leads_path: Some(PathBuf::from(DEFAULT_LEADS_PATH)),
            admin_token_sha256: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_fallback_model(mut self, model: Option<String>) -> Self {
        self.fallback_model = model;
        self
    }

    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_language(mut self, language: ReportLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_retries(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_leads_path(mut self, path: Option<PathBuf>) -> Self {
        self.leads_path = path;
        self
    }

    pub fn with_admin_token_sha256(mut self, digest: impl Into<String>) -> Self {
        self.admin_token_sha256 = Some(digest.into());
        self
    }

    /// API key, or [`AnalysisError::MissingCredential`] naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AnalysisError::MissingCredential(format!(
                    "no Gemini API key configured; set {} or run `jadwa config api`",
                    GeminiProvider::API_KEY_ENV
                ))
            })
    }

    /// Read gate for the lead log. An absent digest disables reads.
    pub fn admin_auth(&self) -> Result<AdminAuth> {
        match self.admin_token_sha256.as_deref().map(str::trim) {
            Some(digest) if !digest.is_empty() => AdminAuth::from_hex_digest(digest),
            _ => Ok(AdminAuth::disabled()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading through `lookup`.
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        config.api_key = get(GeminiProvider::API_KEY_ENV)
            .filter(|v| !v.is_empty())
            .or_else(|| get(GeminiProvider::LEGACY_API_KEY_ENV).filter(|v| !v.is_empty()));

        if let Some(url) = get("JADWA_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = Some(url);
        }

        if let Some(model) = get("JADWA_MODEL").filter(|v| !v.is_empty()) {
            config.model = model;
        }

        if let Some(fallback) = get("JADWA_FALLBACK_MODEL") {
            config.fallback_model = match fallback.to_lowercase().as_str() {
                "" | "none" | "off" => None,
                _ => Some(fallback),
            };
        }

        if let Some(mode) = get("JADWA_MODE") {
            match mode.parse::<ResponseMode>() {
                Ok(mode) => config.mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring JADWA_MODE"),
            }
        }

        if let Some(language) = get("JADWA_LANGUAGE") {
            match language.parse::<ReportLanguage>() {
                Ok(language) => config.language = language,
                Err(e) => tracing::warn!(error = %e, "ignoring JADWA_LANGUAGE"),
            }
        }

        if let Some(val) = parse_var::<u32>(&get, "JADWA_MAX_RETRIES") {
            config.retry.max_attempts = val;
        }
        if let Some(ms) = parse_var::<u64>(&get, "JADWA_BACKOFF_BASE_MS") {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "JADWA_BACKOFF_MAX_MS") {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "JADWA_JITTER_MS") {
            config.retry.max_jitter = Duration::from_millis(ms);
        }

        config.temperature = parse_var::<f32>(&get, "JADWA_TEMPERATURE");
        config.max_output_tokens = parse_var::<u32>(&get, "JADWA_MAX_OUTPUT_TOKENS");

        if let Some(path) = get("JADWA_LEADS_PATH") {
            config.leads_path = match path.to_lowercase().as_str() {
                "" | "none" | "off" => None,
                _ => Some(PathBuf::from(path)),
            };
        }

        config.admin_token_sha256 = get(ADMIN_DIGEST_ENV).filter(|v| !v.is_empty());

        config
    }
}

fn parse_var<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.parse::<T>() {
        Ok(val) => Some(val),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> RuntimeConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fallback_model.as_deref(), Some(DEFAULT_FALLBACK_MODEL));
        assert_eq!(config.mode, ResponseMode::Structured);
        assert_eq!(config.language, ReportLanguage::Arabic);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.leads_path, Some(PathBuf::from("leads.csv")));
    }

    #[test]
    fn test_from_lookup_reads_every_setting() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "key-123"),
            ("JADWA_MODEL", "gemini-2.5-pro"),
            ("JADWA_FALLBACK_MODEL", "off"),
            ("JADWA_MODE", "delimited"),
            ("JADWA_LANGUAGE", "en"),
            ("JADWA_MAX_RETRIES", "5"),
            ("JADWA_BACKOFF_BASE_MS", "250"),
            ("JADWA_JITTER_MS", "0"),
            ("JADWA_TEMPERATURE", "0.3"),
            ("JADWA_LEADS_PATH", "none"),
        ]);
        assert_eq!(config.require_api_key().unwrap(), "key-123");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert!(config.fallback_model.is_none());
        assert_eq!(config.mode, ResponseMode::Delimited);
        assert_eq!(config.language, ReportLanguage::English);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_jitter, Duration::ZERO);
        assert_eq!(config.temperature, Some(0.3));
        assert!(config.leads_path.is_none());
    }

    #[test]
    fn test_legacy_key_and_bad_values() {
        let config = config_from(&[
            ("GEMINI_KEY", "legacy"),
            ("JADWA_MAX_RETRIES", "many"),
            ("JADWA_MODE", "xml"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("legacy"));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.mode, ResponseMode::Structured);
    }

    #[test]
    fn test_missing_key_is_missing_credential() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]);
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential(ref m) if m.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn test_debug_masks_key() {
        let config = RuntimeConfig::new().with_api_key("AIzaSyExampleKey1234");
        let shown = format!("{config:?}");
        assert!(!shown.contains("AIzaSyExampleKey1234"));
        assert!(shown.contains("AIza...1234"));
    }

    #[test]
    fn test_admin_auth_from_digest() {
        let digest = crate::leads::digest_token("admin");
        let config = config_from(&[(ADMIN_DIGEST_ENV, digest.as_str())]);
        assert!(config.admin_auth().unwrap().verify("admin").is_ok());
        assert!(!RuntimeConfig::new().admin_auth().unwrap().is_enabled());
    }
}
