//! jadwa runtime: the feasibility-study pipeline.
//!
//! ```text
//! StudyRequest ──► prompt ──► caller (retry + fallback) ──► parse ──► StudyReport
//!       │                                                               │
//!       └──► leads (CSV)                                   report (md/html)
//! ```

pub mod analysis;
pub mod caller;
pub mod config;
pub mod error;
pub mod leads;
pub mod parse;
pub mod prompt;
pub mod report;
pub mod retry;

pub use analysis::{Analyzer, FinancialsSource, StudyReport};
pub use caller::{CallOutcome, ResilientCaller};
pub use config::RuntimeConfig;
pub use error::{AnalysisError, Result};
pub use leads::{AdminAuth, LeadLog};
pub use parse::{parse, parse_financials, ParseError};
pub use prompt::{build_prompts, PromptSet};
pub use report::{export_html, render_markdown};
pub use retry::{retry_with_backoff, RetryPolicy, Sleeper, TokioSleeper};
