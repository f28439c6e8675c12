//! Biomarker Core Library
//!
//! Interpretation and trend engine for lab reports.
//!
//! # Architecture
//!
//! ```text
//!   Report collaborator                    Trend-query collaborator
//!  (results + analysis)                    (raw points, months window)
//!           │                                          │
//!           ▼                                          ▼
//!   ┌───────────────────┐                    ┌───────────────────┐
//!   │ StatusAggregator  │                    │   TrendSession    │  stale responses
//!   │  ├ SeverityResolver                    │  (ticket check)   │──► Superseded
//!   │  └ RangeParser    │                    └─────────┬─────────┘
//!   └─────────┬─────────┘                              ▼
//!             │                              ┌───────────────────┐
//!             │                              │TrendSeriesBuilder │
//!             │                              │  └ RangeParser    │
//!             │                              └─────────┬─────────┘
//!             ▼                                        ▼
//!        StatusView[]                      TrendSeries + normal band
//!             └──────────────► Presentation ◄──────────┘
//! ```
//!
//! # Core Principle
//!
//! **Every component is total.** Unparseable ranges, unmatched biomarkers and
//! empty inputs produce `None`, `Normal` or empty collections, never errors.
//!
//! # Modules
//!
//! - [`models`]: Domain types (BiomarkerResult, AnalysisEntry, TrendSeries, etc.)
//! - [`interpret`]: Range parser, severity resolver, trend builder, status aggregator
//! - [`session`]: Fetch-then-build flow with supersession of stale requests
//! - [`config`]: Engine tunables

pub mod config;
pub mod interpret;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use config::EngineConfig;
pub use interpret::{
    InterpretError, Interpreter, RangeNotation, ReferenceRangeParser, SeverityResolver,
    StatusAggregator, TrendSeriesBuilder,
};
pub use models::{
    AnalysisEntry, BiomarkerResult, NormalRange, RawTrendPoint, ReportSnapshot, Severity,
    StatusPanel, StatusTone, StatusView, TrendPoint, TrendQuery, TrendSeries,
};
pub use session::{TrendOutcome, TrendRequest, TrendSession};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum BiomarkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<InterpretError> for BiomarkerError {
    fn from(e: InterpretError) -> Self {
        match e {
            InterpretError::InvalidTimestamp(_) => BiomarkerError::InvalidInput(e.to_string()),
            InterpretError::InvalidConfig(_) => BiomarkerError::SerializationError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for BiomarkerError {
    fn from(e: serde_json::Error) -> Self {
        BiomarkerError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Stateless Operations (exported to FFI)
// =========================================================================

/// Parse a reference range; `None` when the text is unparseable.
#[uniffi::export]
pub fn parse_reference_range(range_text: String, observed_values: Vec<f64>) -> Option<FfiNormalRange> {
    Interpreter::default()
        .parse_range(&range_text, &observed_values)
        .map(|r| r.into())
}

/// Resolve a biomarker's severity label.
#[uniffi::export]
pub fn resolve_severity(biomarker: String, entries: Vec<FfiAnalysisEntry>) -> String {
    let entries: Vec<AnalysisEntry> = entries.into_iter().map(|e| e.into()).collect();
    Interpreter::default()
        .resolve_severity(&biomarker, &entries)
        .to_string()
}

/// Build status views for a report.
#[uniffi::export]
pub fn aggregate_status(
    results: Vec<FfiBiomarkerResult>,
    entries: Vec<FfiAnalysisEntry>,
) -> Vec<FfiStatusView> {
    let results: Vec<BiomarkerResult> = results.into_iter().map(|r| r.into()).collect();
    let entries: Vec<AnalysisEntry> = entries.into_iter().map(|e| e.into()).collect();
    Interpreter::default()
        .aggregate(&results, &entries)
        .into_iter()
        .map(|v| v.into())
        .collect()
}

/// Build a chart-ready trend series.
#[uniffi::export]
pub fn build_trend_series(points: Vec<FfiTrendPoint>) -> Result<FfiTrendSeries, BiomarkerError> {
    let raw = to_raw_points(points)?;
    Ok(Interpreter::default().build_trend(&raw).into())
}

/// Open a trend session, optionally with a JSON engine configuration.
#[uniffi::export]
pub fn open_trend_session(config_json: Option<String>) -> Result<Arc<FfiTrendSession>, BiomarkerError> {
    let config = match config_json {
        Some(json) => EngineConfig::from_json(&json)?,
        None => EngineConfig::default(),
    };
    Ok(Arc::new(FfiTrendSession {
        session: TrendSession::new(Interpreter::new(config)),
    }))
}

fn to_raw_points(points: Vec<FfiTrendPoint>) -> Result<Vec<RawTrendPoint>, InterpretError> {
    points.into_iter().map(RawTrendPoint::try_from).collect()
}

// =========================================================================
// Trend Session Object
// =========================================================================

/// Thread-safe trend session for FFI.
#[derive(uniffi::Object)]
pub struct FfiTrendSession {
    session: TrendSession,
}

#[uniffi::export]
impl FfiTrendSession {
    /// Start a request, superseding earlier ones. `months` of 0 uses the default window.
    pub fn begin(&self, biomarker: String, months: u32) -> FfiTrendRequest {
        self.session.begin(&biomarker, Some(months)).into()
    }

    /// Check if a request is still the newest one.
    pub fn is_current(&self, request: FfiTrendRequest) -> bool {
        self.session.is_current(&request.into())
    }

    /// Invalidate all outstanding requests.
    pub fn cancel(&self) {
        self.session.cancel()
    }

    /// Build the series for a response; `None` if the request was superseded.
    pub fn complete(
        &self,
        request: FfiTrendRequest,
        points: Vec<FfiTrendPoint>,
    ) -> Result<Option<FfiTrendSeries>, BiomarkerError> {
        let raw = to_raw_points(points)?;
        let outcome = self.session.complete(&request.into(), &raw);
        Ok(outcome.into_series().map(|s| s.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe normal range.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNormalRange {
    pub lower: f64,
    pub upper: f64,
}

impl From<NormalRange> for FfiNormalRange {
    fn from(range: NormalRange) -> Self {
        Self {
            lower: range.lower,
            upper: range.upper,
        }
    }
}

/// FFI-safe biomarker result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBiomarkerResult {
    pub biomarker: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
}

impl From<FfiBiomarkerResult> for BiomarkerResult {
    fn from(result: FfiBiomarkerResult) -> Self {
        BiomarkerResult {
            biomarker: result.biomarker,
            value: result.value,
            unit: result.unit,
            reference_range: result.reference_range,
        }
    }
}

/// FFI-safe analysis entry. Severity is a label ("High", "Low", ...).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysisEntry {
    pub interpretation: String,
    pub severity: String,
    pub recommendation: String,
    pub biomarker: Option<String>,
}

impl From<FfiAnalysisEntry> for AnalysisEntry {
    fn from(entry: FfiAnalysisEntry) -> Self {
        AnalysisEntry {
            interpretation: entry.interpretation,
            severity: Severity::from_label(&entry.severity),
            recommendation: entry.recommendation,
            biomarker: entry.biomarker,
        }
    }
}

/// FFI-safe status view.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStatusView {
    pub biomarker: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
    pub severity: String,
    pub needs_attention: bool,
    pub normal_range: Option<FfiNormalRange>,
}

impl From<StatusView> for FfiStatusView {
    fn from(view: StatusView) -> Self {
        Self {
            biomarker: view.biomarker,
            value: view.value,
            unit: view.unit,
            reference_range: view.reference_range,
            severity: view.severity.to_string(),
            needs_attention: view.severity.needs_attention(),
            normal_range: view.normal_range.map(|r| r.into()),
        }
    }
}

/// FFI-safe trend point. Dates are RFC 3339 or `YYYY-MM-DD` strings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrendPoint {
    pub date: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
}

impl TryFrom<FfiTrendPoint> for RawTrendPoint {
    type Error = InterpretError;

    fn try_from(point: FfiTrendPoint) -> Result<Self, Self::Error> {
        let date = models::parse_timestamp(&point.date)
            .ok_or_else(|| InterpretError::InvalidTimestamp(point.date.clone()))?;
        Ok(RawTrendPoint {
            date,
            value: point.value,
            unit: point.unit,
            reference_range: point.reference_range,
        })
    }
}

/// FFI-safe chart point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChartPoint {
    pub date: String,
    pub label: String,
    pub full_label: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
}

impl From<TrendPoint> for FfiChartPoint {
    fn from(point: TrendPoint) -> Self {
        Self {
            date: point.date.to_rfc3339(),
            label: point.label,
            full_label: point.full_label,
            value: point.value,
            unit: point.unit,
            reference_range: point.reference_range,
        }
    }
}

/// FFI-safe trend series.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrendSeries {
    pub points: Vec<FfiChartPoint>,
    pub normal_range: Option<FfiNormalRange>,
}

impl From<TrendSeries> for FfiTrendSeries {
    fn from(series: TrendSeries) -> Self {
        Self {
            points: series.points.into_iter().map(|p| p.into()).collect(),
            normal_range: series.normal_range.map(|r| r.into()),
        }
    }
}

/// FFI-safe trend request handle.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrendRequest {
    pub ticket: u64,
    pub biomarker: String,
    pub months: u32,
    /// RFC 3339 start of the query window
    pub since: String,
}

impl From<TrendRequest> for FfiTrendRequest {
    fn from(request: TrendRequest) -> Self {
        Self {
            ticket: request.ticket,
            biomarker: request.query.biomarker,
            months: request.query.months,
            since: request.since.to_rfc3339(),
        }
    }
}

impl From<FfiTrendRequest> for TrendRequest {
    fn from(request: FfiTrendRequest) -> Self {
        let query = TrendQuery::new(request.biomarker, request.months);
        let since = models::parse_timestamp(&request.since)
            .unwrap_or_else(|| query.window_start(chrono::Utc::now()));
        TrendRequest {
            ticket: request.ticket,
            query,
            since,
        }
    }
}
