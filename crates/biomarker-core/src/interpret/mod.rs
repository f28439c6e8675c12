//! Interpretation pipeline for lab reports.
//!
//! Report: results + analysis → SeverityResolver / ReferenceRangeParser → StatusAggregator
//! Trend:  raw points → ReferenceRangeParser → TrendSeriesBuilder

mod range;
mod severity;
mod status;
mod trend;

pub use range::*;
pub use severity::*;
pub use status::*;
pub use trend::*;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::models::{
    AnalysisEntry, BiomarkerResult, NormalRange, RawTrendPoint, ReportSnapshot, Severity,
    StatusPanel, StatusView, TrendQuery, TrendSeries,
};

/// Interpretation errors.
///
/// The components themselves are total; these only arise when converting
/// host-supplied input at the edges.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type InterpretResult<T> = Result<T, InterpretError>;

/// Coordinates the interpretation components under one configuration.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: EngineConfig,
}

impl Interpreter {
    /// Create an interpreter with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn range_parser(&self) -> ReferenceRangeParser<'_> {
        ReferenceRangeParser::new(&self.config)
    }

    pub fn severity_resolver(&self) -> SeverityResolver {
        SeverityResolver::new()
    }

    pub fn trend_builder(&self) -> TrendSeriesBuilder<'_> {
        TrendSeriesBuilder::new(&self.config)
    }

    pub fn status_aggregator(&self) -> StatusAggregator<'_> {
        StatusAggregator::new(&self.config)
    }

    /// Parse a reference range.
    pub fn parse_range(&self, range_text: &str, observed_values: &[f64]) -> Option<NormalRange> {
        self.range_parser().parse(range_text, observed_values)
    }

    /// Classify a biomarker against the report's analysis entries.
    pub fn resolve_severity(&self, biomarker: &str, entries: &[AnalysisEntry]) -> Severity {
        self.severity_resolver().resolve(biomarker, entries)
    }

    /// Build the status views for a report.
    pub fn aggregate(&self, results: &[BiomarkerResult], entries: &[AnalysisEntry]) -> Vec<StatusView> {
        self.status_aggregator().aggregate(results, entries)
    }

    /// Build the status panel for a report.
    pub fn summarize(&self, report: &ReportSnapshot, selected: Option<&str>) -> StatusPanel {
        self.status_aggregator().summarize(report, selected)
    }

    /// Build a chart-ready trend series.
    pub fn build_trend(&self, raw_points: &[RawTrendPoint]) -> TrendSeries {
        self.trend_builder().build(raw_points)
    }

    /// Trend query for a biomarker, using the configured window when none is given.
    pub fn trend_query(&self, biomarker: &str, months: Option<u32>) -> TrendQuery {
        TrendQuery::new(
            biomarker,
            months
                .filter(|m| *m > 0)
                .unwrap_or(self.config.default_window_months),
        )
    }
}
