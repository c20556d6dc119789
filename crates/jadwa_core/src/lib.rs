pub mod error;
pub mod lead;
pub mod mode;
pub mod request;
pub mod study;

pub use error::{CoreError, Result};
pub use lead::Lead;
pub use mode::{ReportLanguage, ResponseMode};
pub use request::{City, StudyRequest};
pub use study::{FeasibilityStudy, FinancialMetrics, FinancialRow, Financials, Swot, SWOT_PLACEHOLDER};
