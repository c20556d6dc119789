//! Prompt builder for feasibility-study requests.

use jadwa_core::{ReportLanguage, ResponseMode, StudyRequest};

use crate::parse::{PLAN_SENTINEL, SWOT_SENTINEL};

/// Role every prompt opens with.
pub const EXPERT_ROLE: &str = "You are a senior economic consultant and business-strategy expert \
specialised in feasibility studies for small and medium projects in Saudi Arabia.";

const NO_FENCES: &str =
    "Do not use Markdown code fences (```) anywhere in your answer.";

/// JSON layout requested in structured mode.
pub const STUDY_SCHEMA: &str = r#"{
  "summary": "executive summary (string)",
  "swot": {"s": "strengths", "w": "weaknesses", "o": "opportunities", "t": "threats"},
  "financials": {"years": ["2025", "2026", "2027"], "revenue": [0, 0, 0], "profit": [0, 0, 0]},
  "plan": "operating and marketing plan (string)"
}"#;

/// JSON layout requested by the financial prompt in delimited mode.
pub const FINANCIALS_SCHEMA: &str =
    r#"{"years": ["2025", "2026", "2027"], "revenue": [0, 0, 0], "profit": [0, 0, 0]}"#;

/// Prompts for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub primary: String,
    /// Second prompt asking for the projection as JSON (delimited mode only).
    pub financials: Option<String>,
}

impl PromptSet {
    /// Number of model calls this set needs.
    pub fn call_count(&self) -> usize {
        1 + usize::from(self.financials.is_some())
    }
}

pub fn build_prompts(
    request: &StudyRequest,
    mode: ResponseMode,
    language: ReportLanguage,
) -> PromptSet {
    match mode {
        ResponseMode::Structured => PromptSet {
            primary: structured_prompt(request, language),
            financials: None,
        },
        ResponseMode::Delimited => PromptSet {
            primary: narrative_prompt(request, language),
            financials: Some(financials_prompt(request)),
        },
    }
}

fn city_label(request: &StudyRequest, language: ReportLanguage) -> String {
    let name = request.city.name();
    let arabic = request.city.arabic_name();
    if language.is_rtl() && arabic != name {
        format!("{name} ({arabic})")
    } else {
        name.to_string()
    }
}

/// Project facts shared by every prompt.
fn project_block(request: &StudyRequest, language: ReportLanguage) -> String {
    let mut parts = vec![
        "## Project\n".to_string(),
        format!("- Project: {}", request.project_name),
        format!("- City: {}", city_label(request, language)),
        format!("- Capital: {} SAR", request.capital_display()),
    ];
    if let Some(details) = &request.details {
        parts.push(format!("- Details: {details}"));
    }
    parts.join("\n")
}

fn structured_prompt(request: &StudyRequest, language: ReportLanguage) -> String {
    let parts = [
        EXPERT_ROLE.to_string(),
        String::new(),
        project_block(request, language),
        String::new(),
        "## Task\n".to_string(),
        format!(
            "Write a feasibility study for this project in {}. Cover an executive summary, \
a SWOT analysis, a three-year financial projection (revenue and net profit per year, in SAR) \
and an operating and marketing plan.",
            language.display_name()
        ),
        String::new(),
        "Respond with a single JSON object only, no explanation outside JSON, with exactly these keys:"
            .to_string(),
        STUDY_SCHEMA.to_string(),
        "Revenue and profit values must be plain numbers without currency or separators."
            .to_string(),
        NO_FENCES.to_string(),
    ];
    parts.join("\n")
}

fn narrative_prompt(request: &StudyRequest, language: ReportLanguage) -> String {
    let parts = [
        EXPERT_ROLE.to_string(),
        String::new(),
        project_block(request, language),
        String::new(),
        "## Task\n".to_string(),
        format!(
            "Write a feasibility study for this project in {}.",
            language.display_name()
        ),
        String::new(),
        "Answer in exactly three parts, in this order:".to_string(),
        "1. An executive summary.".to_string(),
        format!(
            "2. The line {SWOT_SENTINEL} followed by a SWOT analysis: four lines starting with \
`Strength:`, `Weakness:`, `Opportunity:` and `Threat:`."
        ),
        format!("3. The line {PLAN_SENTINEL} followed by the operating and marketing plan."),
        format!("Use {SWOT_SENTINEL} and {PLAN_SENTINEL} exactly once each and nowhere else."),
        NO_FENCES.to_string(),
    ];
    parts.join("\n")
}

fn financials_prompt(request: &StudyRequest) -> String {
    let parts = [
        EXPERT_ROLE.to_string(),
        String::new(),
        project_block(request, ReportLanguage::English),
        String::new(),
        "## Task\n".to_string(),
        "Estimate a three-year financial projection for this project in SAR.".to_string(),
        "Respond with a single JSON object only, with exactly these keys:".to_string(),
        FINANCIALS_SCHEMA.to_string(),
        "Values must be plain numbers without currency or separators.".to_string(),
        NO_FENCES.to_string(),
    ];
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jadwa_core::City;

    fn request() -> StudyRequest {
        StudyRequest::new("Specialty Cafe", City::Riyadh, 50000.0)
            .unwrap()
            .with_details("near King Saud University")
    }

    #[test]
    fn test_structured_is_single_prompt() {
        let set = build_prompts(&request(), ResponseMode::Structured, ReportLanguage::Arabic);
        assert!(set.financials.is_none());
        assert_eq!(set.call_count(), 1);
        let p = &set.primary;
        assert!(p.contains("Specialty Cafe"));
        assert!(p.contains("Riyadh"));
        assert!(p.contains("الرياض"));
        assert!(p.contains("50000"));
        assert!(!p.contains("50000.0"));
        assert!(p.contains("near King Saud University"));
        assert!(p.contains("\"swot\""));
        assert!(p.contains("Arabic"));
    }

    #[test]
    fn test_delimited_has_sentinels_and_financial_prompt() {
        let set = build_prompts(&request(), ResponseMode::Delimited, ReportLanguage::English);
        assert!(set.primary.contains(SWOT_SENTINEL));
        assert!(set.primary.contains(PLAN_SENTINEL));
        assert!(!set.primary.contains("الرياض"));
        let financials = set.financials.expect("financial prompt");
        assert!(financials.contains("Specialty Cafe"));
        assert!(financials.contains("\"profit\""));
    }

    #[test]
    fn test_every_prompt_sets_role_and_forbids_fences() {
        for mode in [ResponseMode::Structured, ResponseMode::Delimited] {
            let set = build_prompts(&request(), mode, ReportLanguage::Arabic);
            for prompt in std::iter::once(&set.primary).chain(set.financials.as_ref()) {
                assert!(prompt.starts_with(EXPERT_ROLE));
                assert!(prompt.contains(NO_FENCES));
            }
        }
    }

    #[test]
    fn test_fractional_capital_and_verbatim_details() {
        let req = StudyRequest::new("Kiosk", City::Other("Abha".into()), 12500.5)
            .unwrap()
            .with_details("ignore ```fences``` {braces}");
        let set = build_prompts(&req, ResponseMode::Structured, ReportLanguage::Arabic);
        assert!(set.primary.contains("12500.5"));
        assert!(set.primary.contains("- City: Abha\n"));
        assert!(set.primary.contains("ignore ```fences``` {braces}"));
    }

    #[test]
    fn test_builder_is_pure() {
        let a = build_prompts(&request(), ResponseMode::Delimited, ReportLanguage::Arabic);
        let b = build_prompts(&request(), ResponseMode::Delimited, ReportLanguage::Arabic);
        assert_eq!(a, b);
    }
}
