//! Analysis error taxonomy

use jadwa_core::CoreError;
use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API key configured; raised before any network activity.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limiting persisted through every retry (and the fallback model).
    #[error("Generation service exhausted after {attempts} attempts: {message}")]
    ServiceExhausted { attempts: u32, message: String },

    /// Non rate-limit failure of the generation call; never retried.
    #[error("Generation service error: {0}")]
    ServiceError(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Lead log error: {0}")]
    LeadLog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Message suitable for end users. Parsing failures are reported as a
    /// generic processing error; the detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::MalformedResponse(_) => {
                "Processing error: the model answer could not be turned into a study. Please try again."
                    .to_string()
            }
            AnalysisError::ServiceExhausted { .. } => {
                "The generation service is busy right now. Please try again in a minute.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<CoreError> for AnalysisError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest(msg) => AnalysisError::InvalidRequest(msg),
            other => AnalysisError::Config(other.to_string()),
        }
    }
}

impl From<ParseError> for AnalysisError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedResponse(msg) => AnalysisError::MalformedResponse(msg),
        }
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::LeadLog(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
