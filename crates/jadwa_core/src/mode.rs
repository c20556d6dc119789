//! Response layout and report language.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Layout the model is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Narrative split by sentinel tokens, plus a separate financial JSON prompt.
    Delimited,
    /// A single JSON object carrying every section.
    #[default]
    Structured,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Delimited => "delimited",
            ResponseMode::Structured => "structured",
        }
    }
}

impl FromStr for ResponseMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delimited" | "delimiter" | "text" => Ok(ResponseMode::Delimited),
            "structured" | "json" => Ok(ResponseMode::Structured),
            _ => Err(CoreError::UnknownVariant {
                kind: "response mode",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language the report is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLanguage {
    #[default]
    Arabic,
    English,
}

impl ReportLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportLanguage::Arabic => "ar",
            ReportLanguage::English => "en",
        }
    }

    /// Name used inside prompt instructions.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportLanguage::Arabic => "Arabic",
            ReportLanguage::English => "English",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, ReportLanguage::Arabic)
    }
}

impl FromStr for ReportLanguage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ar" | "arabic" | "العربية" => Ok(ReportLanguage::Arabic),
            "en" | "english" => Ok(ReportLanguage::English),
            _ => Err(CoreError::UnknownVariant {
                kind: "report language",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ReportLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
