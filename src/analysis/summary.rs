//! Plain-language summary of an analysis.

use std::collections::BTreeMap;

use super::types::ClassifiedLabResult;

const NO_FINDINGS: &str = "No significant abnormalities detected in the available data.";
const DISCLAIMER: &str =
    "Please consult with a healthcare provider for proper diagnosis and treatment.";

/// Build the summary sentence for an analysis.
///
/// With no conditions and no classified values the fixed no-findings
/// sentence is returned alone. Otherwise the summary concatenates a
/// potential-conditions clause, an abnormal-labs clause (labs whose status is
/// outside normal limits), and the safety disclaimer.
pub fn generate_summary(
    conditions: &[String],
    lab_details: &BTreeMap<String, ClassifiedLabResult>,
) -> String {
    if conditions.is_empty() && lab_details.is_empty() {
        return NO_FINDINGS.to_string();
    }

    let mut parts = Vec::new();

    if !conditions.is_empty() {
        parts.push(format!(
            "Potential conditions identified: {}",
            conditions.join(", ")
        ));
    }

    let abnormal: Vec<&str> = lab_details
        .iter()
        .filter(|(_, detail)| !detail.normal)
        .map(|(lab, _)| lab.as_str())
        .collect();
    if !abnormal.is_empty() {
        parts.push(format!(
            "Abnormal lab values detected for: {}",
            abnormal.join(", ")
        ));
    }

    parts.push(DISCLAIMER.to_string());
    parts.join(" ")
}
