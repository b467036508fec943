//! Rule-based clinical report analysis.
//!
//! Turns free-form report text into typed findings: extracted lab values,
//! interval-classified statuses, keyword-derived condition hypotheses, and a
//! plain-language summary. Deterministic pattern matching end to end — no
//! learned models, no network, no filesystem access.
//!
//! ```
//! use medreport::{ReportAnalyzer, RuleCatalog};
//!
//! let analyzer = ReportAnalyzer::new(RuleCatalog::builtin());
//! let result = analyzer.analyze("glucose: 180 known diabetic, bp: 150/95");
//! assert!(result.conditions.contains(&"diabetes".to_string()));
//! ```

pub mod analysis;
pub mod catalog;

pub use analysis::{AnalysisResult, ClassifiedLabResult, EntityMention, ReportAnalyzer};
pub use catalog::{CatalogError, DiseaseDefinition, LabDefinition, RangeBand, RuleCatalog};
