//! SWOT block splitting shared by both parse modes.

use jadwa_core::{Swot, SWOT_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::Strength,
        Field::Weakness,
        Field::Opportunity,
        Field::Threat,
    ];

    fn index(self) -> usize {
        match self {
            Field::Strength => 0,
            Field::Weakness => 1,
            Field::Opportunity => 2,
            Field::Threat => 3,
        }
    }

    /// Match a label such as `Strengths`, `S`, `نقاط القوة`.
    fn from_label(label: &str) -> Option<Field> {
        let label = label
            .trim()
            .trim_matches(|c: char| c == '*' || c == '_' || c == '#')
            .trim()
            .to_lowercase();
        let label = label.as_str();
        match label {
            "s" | "strength" | "strengths" => Some(Field::Strength),
            "w" | "weakness" | "weaknesses" => Some(Field::Weakness),
            "o" | "opportunity" | "opportunities" => Some(Field::Opportunity),
            "t" | "threat" | "threats" => Some(Field::Threat),
            _ if label.contains("قوة") || label.contains("القوة") => Some(Field::Strength),
            _ if label.contains("ضعف") => Some(Field::Weakness),
            _ if label.contains("فرص") || label.contains("فرصة") => Some(Field::Opportunity),
            _ if label.contains("تهديد") || label.contains("مخاطر") => Some(Field::Threat),
            _ => None,
        }
    }
}

/// Strip list bullets and numbering: `- `, `* `, `• `, `1. `, `2) `.
fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•', '–'])
        .map(str::trim_start)
        .unwrap_or(line);

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

/// Split `Label: value` when the label names a SWOT field.
fn split_label(line: &str) -> Option<(Field, &str)> {
    let (label, value) = line.split_once([':', '：'])?;
    let field = Field::from_label(label)?;
    Some((field, value.trim()))
}

/// Split a free-text SWOT block into its four entries.
///
/// Non-empty lines are taken in order after bullet and label stripping.
/// Labeled lines go to their field; a label on a line of its own selects the
/// field for the following lines. Unlabeled lines fill the remaining fields
/// in S, W, O, T order. Missing fields get the placeholder.
pub(crate) fn split_swot(block: &str) -> Swot {
    let mut slots: [Option<String>; 4] = Default::default();
    let mut unlabeled: Vec<String> = Vec::new();
    let mut current: Option<Field> = None;

    for line in block.lines().map(strip_bullet).filter(|l| !l.is_empty()) {
        if let Some((field, value)) = split_label(line) {
            current = Some(field);
            if !value.is_empty() {
                append(&mut slots[field.index()], value);
            }
            continue;
        }
        if line.split_whitespace().count() <= 2 {
            if let Some(field) = Field::from_label(line) {
                current = Some(field);
                continue;
            }
        }
        match current {
            Some(field) => append(&mut slots[field.index()], line),
            None => unlabeled.push(line.to_string()),
        }
    }

    let mut unlabeled = unlabeled.into_iter();
    for field in Field::ORDER {
        let slot = &mut slots[field.index()];
        if slot.is_none() {
            *slot = unlabeled.next();
        }
    }

    let [strength, weakness, opportunity, threat] =
        slots.map(|slot| slot.unwrap_or_else(|| SWOT_PLACEHOLDER.to_string()));
    Swot {
        strength,
        weakness,
        opportunity,
        threat,
    }
}

fn append(slot: &mut Option<String>, value: &str) {
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => *slot = Some(value.to_string()),
    }
}
