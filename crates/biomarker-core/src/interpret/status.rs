//! Current-status aggregation for one report.

use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{AnalysisEntry, BiomarkerResult, ReportSnapshot, StatusPanel, StatusView};

use super::{ReferenceRangeParser, SeverityResolver};

/// Combines results, parsed ranges and resolved severities into status views.
pub struct StatusAggregator<'a> {
    range_parser: ReferenceRangeParser<'a>,
    severity_resolver: SeverityResolver,
}

impl<'a> StatusAggregator<'a> {
    /// Create an aggregator bound to a configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            range_parser: ReferenceRangeParser::new(config),
            severity_resolver: SeverityResolver::new(),
        }
    }

    /// One view per result, in input order.
    ///
    /// Repeated biomarker names are kept and classified independently.
    pub fn aggregate(&self, results: &[BiomarkerResult], entries: &[AnalysisEntry]) -> Vec<StatusView> {
        results.iter().map(|r| self.view(r, entries)).collect()
    }

    /// Build the status panel for a report, marking the selected biomarker.
    pub fn summarize(&self, report: &ReportSnapshot, selected: Option<&str>) -> StatusPanel {
        let views = self.aggregate(&report.results, &report.analysis);

        debug!(
            biomarkers = report.results.len(),
            insights = report.analysis.len(),
            "summarized report status"
        );

        StatusPanel {
            report_date: report.report_date,
            biomarker_count: report.results.len(),
            insight_count: report.analysis.len(),
            views,
            selected: selected.map(str::to_string),
        }
    }

    fn view(&self, result: &BiomarkerResult, entries: &[AnalysisEntry]) -> StatusView {
        StatusView {
            biomarker: result.biomarker.clone(),
            value: result.value,
            unit: result.unit.clone(),
            reference_range: result.reference_range.clone(),
            severity: self.severity_resolver.resolve(&result.biomarker, entries),
            normal_range: self
                .range_parser
                .parse(&result.reference_range, &[result.value]),
        }
    }
}
