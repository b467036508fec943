//! Lab value extraction: ordered pattern scan with unit conversion.

use std::collections::BTreeMap;

use crate::catalog::{LabDefinition, RuleCatalog};

/// Characters of surrounding context inspected for a unit token.
const UNIT_CONTEXT_CHARS: usize = 50;

/// Extract one numeric value per lab from normalized text.
///
/// Patterns are tried in declaration order; within a pattern, occurrences are
/// scanned left to right. The first occurrence whose capture parses as a
/// float wins and ends the scan for that lab. Unparsable captures are
/// skipped, and a lab with no parseable match is simply absent from the map.
pub fn extract_lab_values(text: &str, catalog: &RuleCatalog) -> BTreeMap<String, f64> {
    let mut values = BTreeMap::new();

    for lab in catalog.labs() {
        if let Some(value) = first_value(lab, text) {
            tracing::debug!(lab = lab.name(), value, "extracted lab value");
            values.insert(lab.name().to_string(), value);
        }
    }

    values
}

fn first_value(lab: &LabDefinition, text: &str) -> Option<f64> {
    for regex in lab.patterns() {
        for caps in regex.captures_iter(text) {
            let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Ok(raw) = group.as_str().parse::<f64>() else {
                continue;
            };

            return Some(apply_unit_conversion(lab, text, full.start(), full.end(), raw));
        }
    }

    None
}

/// Multiply the captured value by the factor of the first configured unit
/// token (in declaration order) found near the match. The context window is
/// bounded to [`UNIT_CONTEXT_CHARS`] characters on each side so a unit
/// mentioned elsewhere in the report cannot rescale an unrelated value.
fn apply_unit_conversion(
    lab: &LabDefinition,
    text: &str,
    match_start: usize,
    match_end: usize,
    value: f64,
) -> f64 {
    if lab.unit_conversions().is_empty() {
        return value;
    }

    let context = context_window(text, match_start, match_end).to_lowercase();
    for (unit, factor) in lab.unit_conversions() {
        if context.contains(unit.as_str()) {
            tracing::debug!(lab = lab.name(), unit = unit.as_str(), factor, "unit conversion applied");
            return value * factor;
        }
    }

    value
}

/// Slice up to [`UNIT_CONTEXT_CHARS`] characters before `start` and after
/// `end`, counted in characters and clamped to char boundaries so multi-byte
/// text never splits a code point.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(UNIT_CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(UNIT_CONTEXT_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    &text[from..to]
}
