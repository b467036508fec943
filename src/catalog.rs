//! Rule catalog: lab and disease definitions.
//!
//! The catalog is the only long-lived object in the crate. It is validated
//! and compiled once at startup and never mutated afterwards; hot-reloading
//! rules means building a new catalog and swapping the reference.

use regex::Regex;
use thiserror::Error;

/// Catalog construction errors. The engine must never run with a partially
/// valid catalog, so every one of these fails construction immediately.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("lab '{lab}' defines no extraction patterns")]
    EmptyPatternSet { lab: String },

    #[error("invalid pattern '{pattern}' in '{name}': {reason}")]
    InvalidPattern {
        name: String,
        pattern: String,
        reason: String,
    },

    #[error("pattern '{pattern}' in lab '{lab}' has no capture group for the numeric value")]
    MissingCaptureGroup { lab: String, pattern: String },

    #[error("invalid range band in lab '{lab}': {detail}")]
    InvalidRange { lab: String, detail: String },

    #[error("duplicate definition name '{name}'")]
    DuplicateName { name: String },
}

/// One classification interval: closed `[low, high]` mapped to a status
/// label. Bands are evaluated in declaration order and the first containing
/// band wins, so overlapping bands are legal and resolved by order.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBand {
    pub low: f64,
    pub high: f64,
    pub status: String,
}

impl RangeBand {
    pub fn new(low: f64, high: f64, status: impl Into<String>) -> Self {
        Self {
            low,
            high,
            status: status.into(),
        }
    }

    /// Closed-interval membership. NaN is contained by no band.
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Rules for one measurable clinical value: how to find it in text, how to
/// classify it, and which conditions an abnormal result suggests.
pub struct LabDefinition {
    name: String,
    bands: Vec<RangeBand>,
    patterns: Vec<Regex>,
    /// Unit token (lower-cased) to multiplicative factor, tried in order.
    unit_conversions: Vec<(String, f64)>,
    associated_conditions: Vec<String>,
}

impl LabDefinition {
    pub fn new(
        name: impl Into<String>,
        bands: Vec<RangeBand>,
        patterns: &[&str],
        unit_conversions: &[(&str, f64)],
        associated_conditions: &[&str],
    ) -> Result<Self, CatalogError> {
        let name = name.into();

        if patterns.is_empty() {
            return Err(CatalogError::EmptyPatternSet { lab: name });
        }

        for band in &bands {
            if band.low.is_nan() || band.high.is_nan() {
                return Err(CatalogError::InvalidRange {
                    lab: name,
                    detail: format!("NaN bound in band '{}'", band.status),
                });
            }
            if band.low > band.high {
                return Err(CatalogError::InvalidRange {
                    lab: name,
                    detail: format!(
                        "band '{}' has low {} above high {}",
                        band.status, band.low, band.high
                    ),
                });
            }
        }

        let compiled = compile_patterns(&name, patterns)?;
        for (regex, source) in compiled.iter().zip(patterns) {
            if regex.captures_len() < 2 {
                return Err(CatalogError::MissingCaptureGroup {
                    lab: name,
                    pattern: (*source).to_string(),
                });
            }
        }

        Ok(Self {
            name,
            bands,
            patterns: compiled,
            unit_conversions: unit_conversions
                .iter()
                .map(|(unit, factor)| (unit.to_lowercase(), *factor))
                .collect(),
            associated_conditions: associated_conditions
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bands(&self) -> &[RangeBand] {
        &self.bands
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn unit_conversions(&self) -> &[(String, f64)] {
        &self.unit_conversions
    }

    pub fn associated_conditions(&self) -> &[String] {
        &self.associated_conditions
    }
}

/// Keyword and pattern rules for one condition hypothesis.
/// Score = keyword hits (1 point each) + pattern occurrences (2 points each).
pub struct DiseaseDefinition {
    name: String,
    /// Literal phrases, stored lower-cased for substring matching.
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl DiseaseDefinition {
    pub fn new(
        name: impl Into<String>,
        keywords: &[&str],
        patterns: &[&str],
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let compiled = compile_patterns(&name, patterns)?;

        Ok(Self {
            name,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            patterns: compiled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

fn compile_patterns(name: &str, patterns: &[&str]) -> Result<Vec<Regex>, CatalogError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| CatalogError::InvalidPattern {
                name: name.to_string(),
                pattern: (*p).to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// The immutable collection of all lab and disease definitions available to
/// the engine. Constructed once, read-only afterwards.
pub struct RuleCatalog {
    labs: Vec<LabDefinition>,
    diseases: Vec<DiseaseDefinition>,
}

impl RuleCatalog {
    /// Validate and assemble a catalog. Names must be unique within each
    /// definition kind.
    pub fn new(
        labs: Vec<LabDefinition>,
        diseases: Vec<DiseaseDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for lab in &labs {
            if !seen.insert(lab.name.clone()) {
                return Err(CatalogError::DuplicateName {
                    name: lab.name.clone(),
                });
            }
        }
        seen.clear();
        for disease in &diseases {
            if !seen.insert(disease.name.clone()) {
                return Err(CatalogError::DuplicateName {
                    name: disease.name.clone(),
                });
            }
        }

        Ok(Self { labs, diseases })
    }

    pub fn labs(&self) -> &[LabDefinition] {
        &self.labs
    }

    pub fn diseases(&self) -> &[DiseaseDefinition] {
        &self.diseases
    }

    pub fn lab(&self, name: &str) -> Option<&LabDefinition> {
        self.labs.iter().find(|l| l.name == name)
    }

    /// The built-in rule tables: common metabolic, lipid, blood-pressure,
    /// hematology and renal panels, plus keyword rules for the conditions
    /// they point at.
    ///
    /// Band order matters: hemoglobin declares the female range before the
    /// male range, so an overlapping value like 14.5 resolves to
    /// `normal_female` by the first-match rule.
    pub fn builtin() -> Self {
        let labs = vec![
            LabDefinition::new(
                "glucose",
                vec![
                    RangeBand::new(70.0, 99.0, "normal"),
                    RangeBand::new(100.0, 125.0, "prediabetes"),
                    RangeBand::new(126.0, f64::INFINITY, "diabetes"),
                ],
                &[
                    r"(?i)glucose[:\s]\s*(\d+\.?\d*)",
                    r"(?i)blood\s+sugar[:\s]\s*(\d+\.?\d*)",
                    r"(?i)fbs[:\s]\s*(\d+\.?\d*)",
                ],
                &[("mmol/l", 18.0)],
                &[],
            ),
            LabDefinition::new(
                "hba1c",
                vec![
                    RangeBand::new(0.0, 5.6, "normal"),
                    RangeBand::new(5.7, 6.4, "prediabetes"),
                    RangeBand::new(6.5, f64::INFINITY, "diabetes"),
                ],
                &[
                    r"(?i)hba1c[:\s]\s*(\d+\.?\d*)",
                    r"(?i)hemoglobin\s+a1c[:\s]\s*(\d+\.?\d*)",
                    r"(?i)glycated\s+hemoglobin[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &[],
            ),
            LabDefinition::new(
                "cholesterol_total",
                vec![
                    RangeBand::new(0.0, 199.0, "normal"),
                    RangeBand::new(200.0, 239.0, "borderline_high"),
                    RangeBand::new(240.0, f64::INFINITY, "high"),
                ],
                &[
                    r"(?i)total\s+cholesterol[:\s]\s*(\d+\.?\d*)",
                    r"(?i)cholesterol[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &["hyperlipidemia", "cardiovascular_risk"],
            ),
            LabDefinition::new(
                "ldl",
                vec![
                    RangeBand::new(0.0, 99.0, "optimal"),
                    RangeBand::new(100.0, 129.0, "near_optimal"),
                    RangeBand::new(130.0, 159.0, "borderline_high"),
                    RangeBand::new(160.0, 189.0, "high"),
                    RangeBand::new(190.0, f64::INFINITY, "very_high"),
                ],
                &[
                    r"(?i)ldl[:\s]\s*(\d+\.?\d*)",
                    r"(?i)low\s+density\s+lipoprotein[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &["hyperlipidemia", "cardiovascular_risk"],
            ),
            LabDefinition::new(
                "hdl",
                vec![
                    RangeBand::new(60.0, f64::INFINITY, "good"),
                    RangeBand::new(40.0, 59.0, "low_normal"),
                    RangeBand::new(0.0, 39.0, "low"),
                ],
                &[
                    r"(?i)hdl[:\s]\s*(\d+\.?\d*)",
                    r"(?i)high\s+density\s+lipoprotein[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &["low_hdl", "cardiovascular_risk"],
            ),
            LabDefinition::new(
                "blood_pressure_systolic",
                vec![
                    RangeBand::new(0.0, 119.0, "normal"),
                    RangeBand::new(120.0, 129.0, "elevated"),
                    RangeBand::new(130.0, 139.0, "stage1_hypertension"),
                    RangeBand::new(140.0, 179.0, "stage2_hypertension"),
                    RangeBand::new(180.0, f64::INFINITY, "hypertensive_crisis"),
                ],
                &[
                    r"(?i)bp[:\s]\s*(\d+)/\d+",
                    r"(?i)blood\s+pressure[:\s]\s*(\d+)/\d+",
                    r"(?i)systolic[:\s]*(\d+)",
                ],
                &[],
                &["hypertension"],
            ),
            LabDefinition::new(
                "blood_pressure_diastolic",
                vec![
                    RangeBand::new(0.0, 79.0, "normal"),
                    RangeBand::new(80.0, 89.0, "stage1_hypertension"),
                    RangeBand::new(90.0, 119.0, "stage2_hypertension"),
                    RangeBand::new(120.0, f64::INFINITY, "hypertensive_crisis"),
                ],
                &[
                    r"(?i)bp[:\s]\s*\d+/(\d+)",
                    r"(?i)blood\s+pressure[:\s]\s*\d+/(\d+)",
                    r"(?i)diastolic[:\s]*(\d+)",
                ],
                &[],
                &["hypertension"],
            ),
            LabDefinition::new(
                "hemoglobin",
                vec![
                    RangeBand::new(12.0, 16.0, "normal_female"),
                    RangeBand::new(14.0, 18.0, "normal_male"),
                    RangeBand::new(0.0, 11.9, "anemia"),
                ],
                &[
                    r"(?i)hemoglobin[:\s]\s*(\d+\.?\d*)",
                    r"(?i)hb[:\s]\s*(\d+\.?\d*)",
                    r"(?i)hgb[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &["anemia"],
            ),
            LabDefinition::new(
                "creatinine",
                vec![
                    RangeBand::new(0.6, 1.2, "normal"),
                    RangeBand::new(1.3, 3.0, "mild_kidney_disease"),
                    RangeBand::new(3.1, f64::INFINITY, "severe_kidney_disease"),
                ],
                &[
                    r"(?i)creatinine[:\s]\s*(\d+\.?\d*)",
                    r"(?i)cr[:\s]\s*(\d+\.?\d*)",
                ],
                &[],
                &["chronic_kidney_disease"],
            ),
        ];

        let diseases = vec![
            DiseaseDefinition::new(
                "diabetes",
                &["diabetes", "diabetic", "dm", "hyperglycemia", "insulin", "metformin"],
                &[
                    r"(?i)\b(?:type\s*[12]\s*)?diabet(?:es|ic)\b",
                    r"(?i)\bhyperglycemi[ac]\b",
                ],
            ),
            DiseaseDefinition::new(
                "hypertension",
                &["hypertension", "high blood pressure", "htn", "elevated bp"],
                &[
                    r"(?i)\bhypertension\b",
                    r"(?i)\bhigh\s+blood\s+pressure\b",
                    r"(?i)\bhtn\b",
                ],
            ),
            DiseaseDefinition::new(
                "hyperlipidemia",
                &["hyperlipidemia", "dyslipidemia", "high cholesterol", "elevated lipids"],
                &[
                    r"(?i)\bhyperlipidemia\b",
                    r"(?i)\bdyslipidemia\b",
                    r"(?i)\bhigh\s+cholesterol\b",
                ],
            ),
            DiseaseDefinition::new(
                "anemia",
                &["anemia", "low hemoglobin", "iron deficiency", "low hb"],
                &[r"(?i)\banemi[ac]\b", r"(?i)\blow\s+hemoglobin\b"],
            ),
        ];

        let labs = labs
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("built-in lab definitions are well-formed");
        let diseases = diseases
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("built-in disease definitions are well-formed");

        RuleCatalog::new(labs, diseases).expect("built-in rule catalog is well-formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_constructs() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.labs().len(), 9);
        assert_eq!(catalog.diseases().len(), 4);
    }

    #[test]
    fn builtin_lab_lookup_by_name() {
        let catalog = RuleCatalog::builtin();
        assert!(catalog.lab("glucose").is_some());
        assert!(catalog.lab("ldl").is_some());
        assert!(catalog.lab("troponin").is_none());
    }

    #[test]
    fn lab_without_patterns_rejected() {
        let result = LabDefinition::new(
            "broken",
            vec![RangeBand::new(0.0, 1.0, "normal")],
            &[],
            &[],
            &[],
        );
        assert!(matches!(result, Err(CatalogError::EmptyPatternSet { .. })));
    }

    #[test]
    fn lab_pattern_without_capture_group_rejected() {
        let result = LabDefinition::new(
            "broken",
            vec![RangeBand::new(0.0, 1.0, "normal")],
            &[r"(?i)glucose[:\s]\s*\d+"],
            &[],
            &[],
        );
        assert!(matches!(
            result,
            Err(CatalogError::MissingCaptureGroup { .. })
        ));
    }

    #[test]
    fn lab_invalid_regex_rejected() {
        let result = LabDefinition::new(
            "broken",
            vec![RangeBand::new(0.0, 1.0, "normal")],
            &[r"glucose[:\s(\d+)"],
            &[],
            &[],
        );
        assert!(matches!(result, Err(CatalogError::InvalidPattern { .. })));
    }

    #[test]
    fn lab_inverted_band_rejected() {
        let result = LabDefinition::new(
            "broken",
            vec![RangeBand::new(10.0, 5.0, "normal")],
            &[r"x[:\s]\s*(\d+)"],
            &[],
            &[],
        );
        assert!(matches!(result, Err(CatalogError::InvalidRange { .. })));
    }

    #[test]
    fn lab_nan_band_rejected() {
        let result = LabDefinition::new(
            "broken",
            vec![RangeBand::new(f64::NAN, 5.0, "normal")],
            &[r"x[:\s]\s*(\d+)"],
            &[],
            &[],
        );
        assert!(matches!(result, Err(CatalogError::InvalidRange { .. })));
    }

    #[test]
    fn duplicate_lab_name_rejected() {
        let lab = || {
            LabDefinition::new(
                "glucose",
                vec![RangeBand::new(0.0, 1.0, "normal")],
                &[r"glucose[:\s]\s*(\d+)"],
                &[],
                &[],
            )
            .unwrap()
        };
        let result = RuleCatalog::new(vec![lab(), lab()], vec![]);
        assert!(matches!(result, Err(CatalogError::DuplicateName { .. })));
    }

    #[test]
    fn duplicate_disease_name_rejected() {
        let disease = || DiseaseDefinition::new("diabetes", &["diabetes"], &[]).unwrap();
        let result = RuleCatalog::new(vec![], vec![disease(), disease()]);
        assert!(matches!(result, Err(CatalogError::DuplicateName { .. })));
    }

    #[test]
    fn disease_invalid_pattern_rejected() {
        let result = DiseaseDefinition::new("broken", &[], &[r"\b(unclosed"]);
        assert!(matches!(result, Err(CatalogError::InvalidPattern { .. })));
    }

    #[test]
    fn disease_keywords_lowercased() {
        let disease = DiseaseDefinition::new("x", &["High Blood Pressure"], &[]).unwrap();
        assert_eq!(disease.keywords(), ["high blood pressure"]);
    }

    #[test]
    fn unit_conversion_tokens_lowercased() {
        let lab = LabDefinition::new(
            "glucose",
            vec![RangeBand::new(0.0, 1.0, "normal")],
            &[r"glucose[:\s]\s*(\d+)"],
            &[("MMOL/L", 18.0)],
            &[],
        )
        .unwrap();
        assert_eq!(lab.unit_conversions(), [("mmol/l".to_string(), 18.0)]);
    }

    #[test]
    fn band_membership_is_closed_interval() {
        let band = RangeBand::new(70.0, 99.0, "normal");
        assert!(band.contains(70.0));
        assert!(band.contains(99.0));
        assert!(!band.contains(69.999));
        assert!(!band.contains(99.001));
        assert!(!band.contains(f64::NAN));
    }

    #[test]
    fn open_ended_band_contains_large_values() {
        let band = RangeBand::new(126.0, f64::INFINITY, "diabetes");
        assert!(band.contains(126.0));
        assert!(band.contains(1.0e12));
    }

    #[test]
    fn hemoglobin_declares_female_band_first() {
        let catalog = RuleCatalog::builtin();
        let bands = catalog.lab("hemoglobin").unwrap().bands();
        assert_eq!(bands[0].status, "normal_female");
        assert_eq!(bands[1].status, "normal_male");
    }
}
