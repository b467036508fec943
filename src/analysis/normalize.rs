//! Report text normalization: redaction, unit canonicalization, whitespace
//! collapse. Runs before any pattern matching.

use std::sync::LazyLock;

use regex::Regex;

/// Lines introduced by identifying-field labels are dropped wholesale.
/// Best-effort privacy heuristic, not a compliance guarantee: it catches the
/// common `Patient: ...` / `SSN: ...` report headers and nothing more.
static IDENTIFYING_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:patient|name|date|id|contact|address|phone|ssn)\b[:\s][^\n]*")
        .expect("identifying-field pattern is valid")
});

/// Unit spelling variants folded to the canonical token. `mg%` needs no
/// trailing boundary: `%` is a non-word character and delimits itself.
static UNIT_VARIANTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:mg/dl\b|mg%)").expect("unit-variant pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize raw report text. Total and deterministic; `normalize` is
/// idempotent, so re-normalizing already-clean text is a no-op.
///
/// Passes, in order: strip control characters that OCR output tends to carry,
/// redact identifying-field lines, canonicalize unit spellings, collapse
/// whitespace runs.
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let redacted = IDENTIFYING_FIELD.replace_all(&stripped, "");
    let units = UNIT_VARIANTS.replace_all(&redacted, "mg/dL");
    let collapsed = WHITESPACE_RUN.replace_all(&units, " ");

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_identifying_field_lines() {
        let raw = "Patient: John Q Public\nglucose: 95 mg/dL";
        let clean = normalize(raw);
        assert!(!clean.contains("John"), "redacted: {clean}");
        assert!(clean.contains("glucose: 95"));
    }

    #[test]
    fn redaction_is_case_insensitive() {
        let clean = normalize("SSN: 123-45-6789\nhdl: 55");
        assert!(!clean.contains("123-45-6789"));
        assert!(clean.contains("hdl: 55"));
    }

    #[test]
    fn redaction_stops_at_end_of_line() {
        let raw = "Phone: 555-0100\ncreatinine: 1.1";
        let clean = normalize(raw);
        assert!(!clean.contains("555-0100"));
        assert!(clean.contains("creatinine: 1.1"));
    }

    #[test]
    fn canonicalizes_unit_spellings() {
        assert_eq!(normalize("glucose: 95 mg%"), "glucose: 95 mg/dL");
        assert_eq!(normalize("glucose: 95 MG/DL"), "glucose: 95 mg/dL");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("glucose:   95\n\n\tldl:  130"), "glucose: 95 ldl: 130");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(normalize("  glucose: 95  "), "glucose: 95");
    }

    #[test]
    fn strips_control_characters() {
        let clean = normalize("glucose\x00: 95\x01\x02");
        assert!(!clean.contains('\x00'));
        assert_eq!(clean, "glucose: 95");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "Patient: Jane\nglucose: 180 mg% \n bp: 150/95",
            "  \t\n ",
            "cholesterol:  250   known  diabetic",
            "Name: X\nName: Y\nhemoglobin: 10.2",
        ];
        for raw in inputs {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn non_label_text_is_preserved() {
        let clean = normalize("fasting glucose: 110 and total cholesterol: 210");
        assert_eq!(clean, "fasting glucose: 110 and total cholesterol: 210");
    }
}
