use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted study request, as stored in the lead log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Capital")]
    pub capital: f64,
}

impl Lead {
    pub fn new(
        project: impl Into<String>,
        city: impl Into<String>,
        capital: f64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            project: project.into(),
            city: city.into(),
            capital,
        }
    }
}
