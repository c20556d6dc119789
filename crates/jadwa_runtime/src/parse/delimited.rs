//! Sentinel grammar for narrative answers.
//!
//! The answer is a sequence of text runs separated by markers:
//! `###SWOT###`, `###PLAN###` (named) or a bare `###`. Named markers win;
//! bare markers are only used positionally when no named marker appears.

use jadwa_core::{FeasibilityStudy, Financials};

use super::swot::split_swot;

pub const SWOT_SENTINEL: &str = "###SWOT###";
pub const PLAN_SENTINEL: &str = "###PLAN###";
pub const BARE_SENTINEL: &str = "###";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Swot,
    Plan,
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Marker(Marker),
}

fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .get(..needle.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(needle))
}

/// Split `raw` into text runs and markers. Empty runs are dropped.
pub(crate) fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while let Some(offset) = raw[i..].find(BARE_SENTINEL) {
        let at = i + offset;
        let rest = &raw[at..];
        let (marker, len) = if starts_with_ignore_case(rest, SWOT_SENTINEL) {
            (Marker::Swot, SWOT_SENTINEL.len())
        } else if starts_with_ignore_case(rest, PLAN_SENTINEL) {
            (Marker::Plan, PLAN_SENTINEL.len())
        } else {
            // Longer hash runs (`#####`) count as one bare marker.
            let run = rest.bytes().take_while(|b| *b == b'#').count();
            (Marker::Bare, run)
        };

        if at > text_start {
            tokens.push(Token::Text(&raw[text_start..at]));
        }
        tokens.push(Token::Marker(marker));
        i = at + len;
        text_start = i;
    }

    if text_start < raw.len() {
        tokens.push(Token::Text(&raw[text_start..]));
    }
    tokens
}

/// Parse a narrative answer. Never fails: missing sections are empty and
/// missing SWOT entries get the placeholder.
pub fn parse_delimited(raw: &str) -> FeasibilityStudy {
    let tokens = tokenize(raw);
    let has_named = tokens
        .iter()
        .any(|t| matches!(t, Token::Marker(Marker::Swot | Marker::Plan)));

    let (summary, swot_block, plan) = if has_named {
        sections_by_name(&tokens)
    } else {
        sections_by_position(&tokens)
    };

    FeasibilityStudy {
        summary: summary.trim().to_string(),
        swot: split_swot(&swot_block),
        financials: Financials::default(),
        plan: plan.trim().to_string(),
    }
}

/// Summary before the first marker, SWOT after `###SWOT###`, plan after
/// `###PLAN###`. Bare markers stay as literal text in every section, so a
/// Markdown `### heading` keeps the text under it.
fn sections_by_name(tokens: &[Token<'_>]) -> (String, String, String) {
    let mut sections = [String::new(), String::new(), String::new()];
    let mut current = 0;

    for token in tokens {
        match token {
            Token::Text(text) => sections[current].push_str(text),
            Token::Marker(Marker::Swot) => current = 1,
            Token::Marker(Marker::Plan) => current = 2,
            Token::Marker(Marker::Bare) => sections[current].push_str(BARE_SENTINEL),
        }
    }

    let [summary, swot, plan] = sections;
    (summary, swot, plan)
}

/// Segment 0 is the summary, segment 1 the SWOT block, the rest the plan.
fn sections_by_position(tokens: &[Token<'_>]) -> (String, String, String) {
    let mut segments: Vec<String> = vec![String::new()];
    for token in tokens {
        match token {
            Token::Text(text) => {
                if let Some(last) = segments.last_mut() {
                    last.push_str(text);
                }
            }
            Token::Marker(_) => segments.push(String::new()),
        }
    }

    let mut segments = segments.into_iter();
    let summary = segments.next().unwrap_or_default();
    let swot = segments.next().unwrap_or_default();
    let plan = segments
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (summary, swot, plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jadwa_core::SWOT_PLACEHOLDER;

    #[test]
    fn test_named_sentinels() {
        let study = parse_delimited("A###SWOT###B###PLAN###C");
        assert_eq!(study.summary, "A");
        assert_eq!(study.swot.strength, "B");
        assert_eq!(study.swot.weakness, SWOT_PLACEHOLDER);
        assert_eq!(study.plan, "C");
    }

    #[test]
    fn test_no_sentinel_is_all_summary() {
        let study = parse_delimited("  just one block of text \n");
        assert_eq!(study.summary, "just one block of text");
        assert_eq!(study.plan, "");
        assert_eq!(study.swot.strength, SWOT_PLACEHOLDER);
    }

    #[test]
    fn test_bare_sentinels_are_positional() {
        let study = parse_delimited("A###B###C");
        assert_eq!(study.summary, "A");
        assert_eq!(study.swot.strength, "B");
        assert_eq!(study.plan, "C");
    }

    #[test]
    fn test_extra_positional_segments_join_into_plan() {
        let study = parse_delimited("A###B###C###D");
        assert_eq!(study.plan, "C\n\nD");
    }

    #[test]
    fn test_named_markers_are_case_insensitive() {
        let study = parse_delimited("intro\n###swot###\n- fast\n- small\n###Plan###\nopen in Q1");
        assert_eq!(study.summary, "intro");
        assert_eq!(study.swot.strength, "fast");
        assert_eq!(study.swot.weakness, "small");
        assert_eq!(study.plan, "open in Q1");
    }

    #[test]
    fn test_plan_without_swot() {
        let study = parse_delimited("summary###PLAN###steps");
        assert_eq!(study.summary, "summary");
        assert_eq!(study.plan, "steps");
        assert_eq!(study.swot.threat, SWOT_PLACEHOLDER);
    }

    #[test]
    fn test_markdown_heading_keeps_summary() {
        let study = parse_delimited(
            "### Overview\nGood idea in Riyadh\n###SWOT###\nStrength: fast\n###PLAN###\nsteps",
        );
        assert_eq!(study.summary, "### Overview\nGood idea in Riyadh");
        assert_eq!(study.swot.strength, "fast");
        assert_eq!(study.plan, "steps");
    }

    #[test]
    fn test_bare_marker_is_literal_in_every_named_section() {
        let study = parse_delimited("intro ### more###SWOT###Strength: a###PLAN###step 1 ### step 2");
        assert_eq!(study.summary, "intro ### more");
        assert_eq!(study.plan, "step 1 ### step 2");
    }

    #[test]
    fn test_tokenize_marks_hash_runs() {
        let tokens = tokenize("a#####b###SWOT###");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a"),
                Token::Marker(Marker::Bare),
                Token::Text("b"),
                Token::Marker(Marker::Swot),
            ]
        );
    }
}
