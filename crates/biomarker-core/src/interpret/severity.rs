//! Severity classification from narrative analysis entries.
//!
//! An entry is associated with a biomarker when its tag equals the name or,
//! for untagged entries, when its interpretation contains the name
//! (case-insensitive). The first associated entry in list order decides.
//! A name that is a substring of another biomarker's narrative (e.g.
//! "Glucose" in "Fasting Glucose Ratio") will match that narrative.

use tracing::debug;

use crate::models::{AnalysisEntry, Severity};

/// Resolves a biomarker's severity against a report's analysis entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityResolver;

impl SeverityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Severity of the first entry discussing `biomarker`, or `Normal`.
    pub fn resolve(&self, biomarker: &str, entries: &[AnalysisEntry]) -> Severity {
        match self.find_entry(biomarker, entries) {
            Some(entry) => entry.severity,
            None => {
                debug!(biomarker, "no analysis entry matched, defaulting to Normal");
                Severity::Normal
            }
        }
    }

    /// The entry that decides the severity of `biomarker`.
    pub fn find_entry<'e>(
        &self,
        biomarker: &str,
        entries: &'e [AnalysisEntry],
    ) -> Option<&'e AnalysisEntry> {
        entries.iter().find(|e| e.mentions(biomarker))
    }

    /// Every entry discussing `biomarker`, in list order.
    pub fn entries_for<'e>(
        &self,
        biomarker: &str,
        entries: &'e [AnalysisEntry],
    ) -> Vec<&'e AnalysisEntry> {
        entries.iter().filter(|e| e.mentions(biomarker)).collect()
    }
}
