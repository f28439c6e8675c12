//! Narrative analysis models produced by the rule-based analysis service.

use serde::{Deserialize, Serialize};

use super::Severity;

/// A narrative insight attached to one report.
///
/// The link between an entry and the biomarker it discusses is normally
/// inferred from `interpretation` at read time. Producers that know the
/// biomarker can set `biomarker` to make the association explicit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEntry {
    /// Human-readable interpretation (e.g. "LDL cholesterol is high")
    pub interpretation: String,
    /// Severity assigned by the analysis rules
    #[serde(default)]
    pub severity: Severity,
    /// Suggested follow-up
    #[serde(default)]
    pub recommendation: String,
    /// Explicit biomarker association, when the producer supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biomarker: Option<String>,
}

impl AnalysisEntry {
    /// Create an untagged entry.
    pub fn new(
        interpretation: impl Into<String>,
        severity: Severity,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            interpretation: interpretation.into(),
            severity,
            recommendation: recommendation.into(),
            biomarker: None,
        }
    }

    /// Tag the entry with the biomarker it discusses.
    pub fn tagged(mut self, biomarker: impl Into<String>) -> Self {
        self.biomarker = Some(biomarker.into());
        self
    }

    /// Check if this entry discusses the given biomarker.
    ///
    /// Tagged entries compare the tag (case-insensitive); untagged entries
    /// fall back to a case-insensitive substring search of the narrative.
    pub fn mentions(&self, biomarker: &str) -> bool {
        let needle = biomarker.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        match &self.biomarker {
            Some(tag) => tag.trim().to_lowercase() == needle,
            None => self.interpretation.to_lowercase().contains(&needle),
        }
    }
}
