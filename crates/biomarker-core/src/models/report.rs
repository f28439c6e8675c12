//! Report snapshot and status view models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnalysisEntry, BiomarkerResult, NormalRange, Severity};

/// The report data handed over by the report collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub report_date: Option<DateTime<Utc>>,
    pub results: Vec<BiomarkerResult>,
    pub analysis: Vec<AnalysisEntry>,
}

/// Per-biomarker view driving the "current status" grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub biomarker: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
    pub severity: Severity,
    /// Range parsed from this result's own reference text
    pub normal_range: Option<NormalRange>,
}

/// The "Latest Health Status" panel for one report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusPanel {
    pub report_date: Option<DateTime<Utc>>,
    /// Number of biomarkers analyzed
    pub biomarker_count: usize,
    /// Number of insights generated
    pub insight_count: usize,
    pub views: Vec<StatusView>,
    /// Biomarker currently selected for the trend chart
    pub selected: Option<String>,
}

impl StatusPanel {
    /// Check if a view belongs to the selected biomarker (exact name match).
    pub fn is_selected(&self, view: &StatusView) -> bool {
        self.selected.as_deref() == Some(view.biomarker.as_str())
    }

    /// Views whose severity should be surfaced to the user.
    pub fn flagged(&self) -> impl Iterator<Item = &StatusView> {
        self.views.iter().filter(|v| v.severity.needs_attention())
    }
}
