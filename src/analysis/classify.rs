//! Interval classification of extracted lab values.

use crate::catalog::RuleCatalog;

use super::types::ClassifiedLabResult;

/// Status used when a value falls in none of a lab's declared bands.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Status labels counted as within normal limits.
const NORMAL_STATUSES: [&str; 5] = ["normal", "optimal", "good", "normal_female", "normal_male"];

/// Classify a value against the lab's range bands.
///
/// Bands are evaluated in declaration order; the first closed interval
/// containing the value wins. Overlapping bands are resolved by that order
/// alone — hemoglobin's female range is declared before the male range, so a
/// value in both classifies `normal_female`. Pure and total: a value in no
/// band (or an unknown lab name) gets [`UNKNOWN_STATUS`] rather than an
/// error, whatever its magnitude or sign.
pub fn classify(catalog: &RuleCatalog, lab_name: &str, value: f64) -> ClassifiedLabResult {
    let status = catalog
        .lab(lab_name)
        .and_then(|lab| lab.bands().iter().find(|band| band.contains(value)))
        .map(|band| band.status.clone())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    let normal = NORMAL_STATUSES.contains(&status.as_str());

    ClassifiedLabResult {
        value,
        status,
        normal,
    }
}
