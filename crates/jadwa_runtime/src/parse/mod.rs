//! Response parser: turn a raw model answer into a [`FeasibilityStudy`].
//!
//! The two modes share nothing but SWOT splitting:
//! - [`ResponseMode::Delimited`]: sentinel grammar, never fails.
//! - [`ResponseMode::Structured`]: lenient JSON decode, fails with
//!   [`ParseError::MalformedResponse`] when no object can be recovered.

mod delimited;
mod structured;
mod swot;

use jadwa_core::{FeasibilityStudy, ResponseMode};
use thiserror::Error;

pub use delimited::{parse_delimited, BARE_SENTINEL, PLAN_SENTINEL, SWOT_SENTINEL};
pub use structured::{parse_financials, parse_structured};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedResponse(reason.into())
    }
}

pub fn parse(raw: &str, mode: ResponseMode) -> Result<FeasibilityStudy, ParseError> {
    match mode {
        ResponseMode::Delimited => Ok(parse_delimited(raw)),
        ResponseMode::Structured => parse_structured(raw),
    }
}
