//! User-supplied project parameters.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// City the project is planned in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Riyadh,
    Jeddah,
    Dammam,
    Other(String),
}

impl City {
    pub fn name(&self) -> &str {
        match self {
            City::Riyadh => "Riyadh",
            City::Jeddah => "Jeddah",
            City::Dammam => "Dammam",
            City::Other(name) => name,
        }
    }

    pub fn arabic_name(&self) -> &str {
        match self {
            City::Riyadh => "الرياض",
            City::Jeddah => "جدة",
            City::Dammam => "الدمام",
            City::Other(name) => name,
        }
    }
}

impl FromStr for City {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err(CoreError::InvalidRequest("city is empty".to_string())),
            "riyadh" | "الرياض" => Ok(City::Riyadh),
            "jeddah" | "jedda" | "جدة" => Ok(City::Jeddah),
            "dammam" | "الدمام" => Ok(City::Dammam),
            _ => Ok(City::Other(trimmed.to_string())),
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters of one analysis run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRequest {
    pub project_name: String,
    pub city: City,
    pub capital: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StudyRequest {
    /// Validate and build a request. The project name must be non-empty and
    /// the capital a finite, non-negative amount.
    pub fn new(project_name: impl Into<String>, city: City, capital: f64) -> Result<Self> {
        let project_name = project_name.into().trim().to_string();
        if project_name.is_empty() {
            return Err(CoreError::InvalidRequest("project name is empty".to_string()));
        }
        if !capital.is_finite() || capital < 0.0 {
            return Err(CoreError::InvalidRequest(format!(
                "capital must be a non-negative amount, got {capital}"
            )));
        }
        Ok(Self {
            project_name,
            city,
            capital,
            details: None,
        })
    }

    /// Attach free-text details. Blank text is dropped.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = if details.trim().is_empty() {
            None
        } else {
            Some(details)
        };
        self
    }

    /// Capital as written into prompts and reports (`50000`, `12500.5`).
    pub fn capital_display(&self) -> String {
        format!("{}", self.capital)
    }
}
