//! Analysis orchestration: normalize, extract, classify, detect, summarize.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use crate::catalog::RuleCatalog;

use super::classify::classify;
use super::extract::extract_lab_values;
use super::keywords::detect_diseases;
use super::normalize::normalize;
use super::summary::generate_summary;
use super::types::AnalysisResult;

/// Runs the full analysis pipeline over one report.
///
/// Holds the immutable rule catalog and nothing else; every `analyze` call
/// owns its own locals, so a single analyzer can serve concurrent callers
/// without synchronization. Swapping rules means building a new analyzer and
/// replacing the reference.
pub struct ReportAnalyzer {
    catalog: RuleCatalog,
}

impl ReportAnalyzer {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Analyzer over the built-in rule tables.
    pub fn with_builtin_rules() -> Self {
        Self::new(RuleCatalog::builtin())
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Analyze one report. Never fails: malformed or empty text degrades to
    /// an empty result with the fixed no-findings summary.
    ///
    /// Conditions reachable from both an abnormal lab and a keyword hit
    /// appear once. Their order is deterministic — lab-sourced conditions in
    /// catalog declaration order, then keyword-sourced — but carries no
    /// meaning.
    pub fn analyze(&self, raw_text: &str) -> AnalysisResult {
        let start = Instant::now();

        let text = normalize(raw_text);
        let lab_values = extract_lab_values(&text, &self.catalog);

        let mut lab_details = BTreeMap::new();
        let mut conditions = Vec::new();
        let mut seen = HashSet::new();

        for lab in self.catalog.labs() {
            let Some(&value) = lab_values.get(lab.name()) else {
                continue;
            };
            let detail = classify(&self.catalog, lab.name(), value);

            if !detail.normal {
                for condition in lab.associated_conditions() {
                    if seen.insert(condition.clone()) {
                        conditions.push(condition.clone());
                    }
                }
            }

            lab_details.insert(lab.name().to_string(), detail);
        }

        let (keyword_diseases, keyword_confidence) = detect_diseases(&text, &self.catalog);
        for disease in keyword_diseases {
            if seen.insert(disease.clone()) {
                conditions.push(disease);
            }
        }

        let summary = generate_summary(&conditions, &lab_details);

        tracing::info!(
            labs = lab_details.len(),
            conditions = conditions.len(),
            processing_ms = start.elapsed().as_millis() as u64,
            "report analysis complete"
        );

        AnalysisResult {
            conditions,
            lab_values,
            lab_details,
            keyword_confidence,
            entities: Vec::new(),
            summary,
            analysis_timestamp: None,
        }
    }
}
