//! Lenient decode of JSON answers.
//!
//! Models wrap JSON in code fences, prepend prose, rename keys and quote
//! numbers. Cleanup locates the object; the field decode coerces what it can
//! and drops what it cannot.

use jadwa_core::{FeasibilityStudy, Financials, Swot, SWOT_PLACEHOLDER};
use serde_json::{Map, Value};

use super::swot::split_swot;
use super::ParseError;

/// Remove leading/trailing code-fence markers and surrounding whitespace.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the end of the line.
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Locate and decode the JSON object in `raw`.
pub(crate) fn extract_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let text = strip_fences(raw);
    let slice = if text.starts_with('{') && text.ends_with('}') {
        text
    } else {
        let start = text
            .find('{')
            .ok_or_else(|| ParseError::malformed("no JSON object in response"))?;
        let end = text
            .rfind('}')
            .ok_or_else(|| ParseError::malformed("unterminated JSON object"))?;
        if end < start {
            return Err(ParseError::malformed("closing brace precedes opening brace"));
        }
        &text[start..=end]
    };

    let value: Value = serde_json::from_str(slice)
        .map_err(|e| ParseError::malformed(format!("invalid JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::malformed(format!(
            "top-level JSON is {}, expected object",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

const STUDY_KEYS: [&str; 4] = ["summary", "swot", "financials", "plan"];

/// `{"study": {...}}` style wrappers: descend while the object has a single
/// object-valued key and none of the study keys.
fn unwrap_single(mut map: Map<String, Value>) -> Map<String, Value> {
    loop {
        if map.len() != 1 || STUDY_KEYS.iter().any(|k| lookup(&map, &[*k]).is_some()) {
            return map;
        }
        match map.into_iter().next() {
            Some((_, Value::Object(inner))) => map = inner,
            Some((key, other)) => {
                let mut restored = Map::new();
                restored.insert(key, other);
                return restored;
            }
            None => return Map::new(),
        }
    }
}

/// First value whose key matches one of `names`, ignoring ASCII case.
fn lookup<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        map.iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Strings as-is, numbers formatted, arrays joined by newlines.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(text_of)
                .filter(|s| !s.is_empty())
                .collect();
            Some(parts.join("\n"))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| text_of(v).map(|t| format!("{k}: {t}")))
                .collect();
            Some(parts.join("\n"))
        }
        Value::Null => None,
    }
}

fn text_field(map: &Map<String, Value>, names: &[&str]) -> String {
    lookup(map, names).and_then(text_of).unwrap_or_default()
}

fn decode_swot(value: Option<&Value>) -> Swot {
    match value {
        Some(Value::Object(map)) => {
            let field = |names: &[&str]| {
                lookup(map, names)
                    .and_then(text_of)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| SWOT_PLACEHOLDER.to_string())
            };
            Swot {
                strength: field(&["s", "strength", "strengths"]),
                weakness: field(&["w", "weakness", "weaknesses"]),
                opportunity: field(&["o", "opportunity", "opportunities"]),
                threat: field(&["t", "threat", "threats"]),
            }
        }
        Some(Value::Array(items)) => Swot::from_entries(
            items
                .iter()
                .filter_map(text_of)
                .filter(|s| !s.is_empty())
                .take(4),
        ),
        Some(Value::String(text)) => split_swot(text),
        _ => Swot::from_entries(std::iter::empty::<String>()),
    }
}

/// Map Arabic-Indic and Eastern Arabic-Indic digits to ASCII.
fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
        '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
        _ => None,
    }
}

/// Parse `"1,250,000 SAR"`, `"٣٠٠٠"`, `"-12.5%"`. Thousands separators,
/// currency words and symbols are ignored.
pub(crate) fn number_from_text(text: &str) -> Option<f64> {
    let mut cleaned = String::new();
    let mut chars = text.trim().chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(d) = ascii_digit(c) {
            cleaned.push(d);
        } else if c == '.' || c == '\u{066B}' {
            // A dot before any digit belongs to a prefix like `ر.س` or `Rs.`
            // unless a digit follows it directly.
            let has_digit = cleaned.chars().any(|c| c.is_ascii_digit());
            if has_digit || chars.peek().is_some_and(|n| ascii_digit(*n).is_some()) {
                cleaned.push('.');
            }
        } else if c == '-' && cleaned.is_empty() {
            cleaned.push('-');
        } else if c == ',' || c == '\u{066C}' || c == '_' || c.is_whitespace() {
            continue;
        } else if cleaned.chars().any(|c| c.is_ascii_digit()) {
            // Trailing unit or currency.
            break;
        }
    }
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => number_from_text(s),
        _ => None,
    }
}

fn year_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        }),
        _ => None,
    }
}

fn collect_values<T>(
    value: Option<&Value>,
    field: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    };
    items
        .into_iter()
        .filter_map(|item| {
            let converted = convert(item);
            if converted.is_none() {
                tracing::warn!(field, value = %item, "dropping unparseable financial entry");
            }
            converted
        })
        .collect()
}

const YEAR_KEYS: [&str; 3] = ["years", "year", "السنوات"];
const REVENUE_KEYS: [&str; 4] = ["revenue", "revenues", "income", "الإيرادات"];
const PROFIT_KEYS: [&str; 4] = ["profit", "profits", "net_profit", "الأرباح"];

fn decode_financials(value: Option<&Value>) -> Financials {
    let financials = match value {
        Some(Value::Object(map)) => Financials {
            years: collect_values(lookup(map, &YEAR_KEYS), "years", year_of),
            revenue: collect_values(lookup(map, &REVENUE_KEYS), "revenue", number_of),
            profit: collect_values(lookup(map, &PROFIT_KEYS), "profit", number_of),
        },
        // Row form: [{"year": 2025, "revenue": 1, "profit": 2}, ...]
        Some(Value::Array(rows)) => {
            let mut out = Financials::default();
            for row in rows {
                let Value::Object(row) = row else {
                    tracing::warn!(value = %row, "dropping non-object financial row");
                    continue;
                };
                let year = lookup(row, &YEAR_KEYS).and_then(year_of);
                let profit = lookup(row, &PROFIT_KEYS).and_then(number_of);
                let (Some(year), Some(profit)) = (year, profit) else {
                    tracing::warn!(value = ?row, "dropping financial row without year or profit");
                    continue;
                };
                // Revenue stays index-aligned with years: the column stops at
                // the first row without it.
                match lookup(row, &REVENUE_KEYS).and_then(number_of) {
                    Some(revenue) if out.revenue.len() == out.years.len() => {
                        out.revenue.push(revenue)
                    }
                    Some(_) => {
                        tracing::warn!(year = %year, "dropping revenue after a row without revenue")
                    }
                    None => {}
                }
                out.years.push(year);
                out.profit.push(profit);
            }
            out
        }
        _ => Financials::default(),
    };

    if !financials.is_empty() && !financials.is_aligned() {
        tracing::warn!(
            years = financials.years.len(),
            revenue = financials.revenue.len(),
            profit = financials.profit.len(),
            "financial sequences differ in length"
        );
    }
    financials
}

/// Decode a JSON study answer.
pub fn parse_structured(raw: &str) -> Result<FeasibilityStudy, ParseError> {
    let map = unwrap_single(extract_object(raw)?);

    Ok(FeasibilityStudy {
        summary: text_field(&map, &["summary", "executive_summary", "overview"]),
        swot: decode_swot(lookup(&map, &["swot"])),
        financials: decode_financials(lookup(&map, &["financials", "financial"])),
        plan: text_field(&map, &["plan", "operating_plan", "operations"]),
    })
}

/// Decode a financial projection. Accepts `{"financials": {...}}` or the
/// bare `{"years": [...], "revenue": [...], "profit": [...]}` object.
pub fn parse_financials(raw: &str) -> Result<Financials, ParseError> {
    let map = extract_object(raw)?;
    match lookup(&map, &["financials", "financial"]) {
        Some(inner) => Ok(decode_financials(Some(inner))),
        None => Ok(decode_financials(Some(&Value::Object(map)))),
    }
}
