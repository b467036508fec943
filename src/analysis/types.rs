//! Output types of the analysis engine.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One classified lab value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedLabResult {
    pub value: f64,
    /// Status bucket label, or `unknown` when no band matched.
    pub status: String,
    /// True iff the status is within normal limits.
    pub normal: bool,
}

/// Placeholder for a future entity-extraction collaborator. The rule engine
/// never populates these; the field exists so the output record shape is
/// stable for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: String,
    pub offset: usize,
}

/// The engine's sole output. Everything is created fresh per analysis and
/// owned by the caller; nothing here refers back into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Unique condition names from both lab classification and keyword
    /// detection. Order carries no meaning.
    pub conditions: Vec<String>,
    pub lab_values: BTreeMap<String, f64>,
    pub lab_details: BTreeMap<String, ClassifiedLabResult>,
    /// Disease name to confidence in [0, 1].
    pub keyword_confidence: BTreeMap<String, f64>,
    /// Reserved; always empty in this engine.
    pub entities: Vec<EntityMention>,
    pub summary: String,
    /// Stamped by the caller's clock; the engine itself never reads time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<NaiveDateTime>,
}

impl AnalysisResult {
    /// Attach the caller-supplied analysis timestamp.
    pub fn stamped(mut self, at: NaiveDateTime) -> Self {
        self.analysis_timestamp = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        let mut lab_values = BTreeMap::new();
        lab_values.insert("glucose".to_string(), 126.0);

        let mut lab_details = BTreeMap::new();
        lab_details.insert(
            "glucose".to_string(),
            ClassifiedLabResult {
                value: 126.0,
                status: "diabetes".to_string(),
                normal: false,
            },
        );

        let mut keyword_confidence = BTreeMap::new();
        keyword_confidence.insert("diabetes".to_string(), 1.0);

        AnalysisResult {
            conditions: vec!["diabetes".to_string()],
            lab_values,
            lab_details,
            keyword_confidence,
            entities: vec![],
            summary: "test".to_string(),
            analysis_timestamp: None,
        }
    }

    #[test]
    fn serializes_with_contract_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "conditions",
            "labValues",
            "labDetails",
            "keywordConfidence",
            "entities",
            "summary",
        ] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
    }

    #[test]
    fn timestamp_omitted_until_stamped() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("analysisTimestamp").is_none());

        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let stamped = serde_json::to_value(sample().stamped(at)).unwrap();
        assert!(stamped.get("analysisTimestamp").is_some());
    }

    #[test]
    fn round_trips_through_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.conditions, ["diabetes"]);
        assert_eq!(back.lab_details["glucose"].status, "diabetes");
        assert!(back.entities.is_empty());
    }
}
