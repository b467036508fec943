//! Keyword-based condition detection.
//!
//! Each disease is scored independently: one point per keyword present
//! (case-insensitive substring, presence not count) and two points per
//! pattern occurrence. A positive score detects the disease; confidence is
//! `min(score / 3, 1)` — a deterministic rule score, not a probability.

use std::collections::BTreeMap;

use crate::catalog::RuleCatalog;

/// Hits needed for full confidence.
const FULL_CONFIDENCE_SCORE: f64 = 3.0;

/// Scan normalized text against every disease definition. Returns the
/// detected disease names (catalog order) and their confidence values.
pub fn detect_diseases(
    text: &str,
    catalog: &RuleCatalog,
) -> (Vec<String>, BTreeMap<String, f64>) {
    let lowered = text.to_lowercase();

    let mut detected = Vec::new();
    let mut confidence = BTreeMap::new();

    for disease in catalog.diseases() {
        let mut score = 0u32;

        for keyword in disease.keywords() {
            if lowered.contains(keyword.as_str()) {
                score += 1;
            }
        }

        for pattern in disease.patterns() {
            score += pattern.find_iter(text).count() as u32 * 2;
        }

        if score > 0 {
            tracing::debug!(disease = disease.name(), score, "disease keywords detected");
            detected.push(disease.name().to_string());
            confidence.insert(
                disease.name().to_string(),
                (f64::from(score) / FULL_CONFIDENCE_SCORE).min(1.0),
            );
        }
    }

    (detected, confidence)
}
