//! Historical trend models.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NormalRange;

/// A historical value as returned by the trend query, in arbitrary order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTrendPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub reference_range: String,
}

impl RawTrendPoint {
    pub fn new(date: DateTime<Utc>, value: f64) -> Self {
        Self {
            date,
            value,
            unit: String::new(),
            reference_range: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_reference_range(mut self, reference_range: impl Into<String>) -> Self {
        self.reference_range = reference_range.into();
        self
    }
}

/// A chart-ready point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    /// Short axis label (e.g. "Mar 01")
    pub label: String,
    /// Tooltip date (e.g. "3/1/2024")
    pub full_label: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
}

/// Time-ordered series for one biomarker with its normal-range band.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    /// Points ordered by date ascending
    pub points: Vec<TrendPoint>,
    /// Band parsed from the earliest point's reference range
    pub normal_range: Option<NormalRange>,
}

impl TrendSeries {
    /// An empty series means "nothing to render", not an error.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unit of the earliest point, used for the chart legend.
    pub fn unit(&self) -> Option<&str> {
        self.points
            .first()
            .map(|p| p.unit.as_str())
            .filter(|u| !u.is_empty())
    }

    /// Most recent point.
    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.last()
    }
}

/// Parameters for a historical trend query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendQuery {
    pub biomarker: String,
    /// Query window in calendar months
    pub months: u32,
}

impl TrendQuery {
    pub fn new(biomarker: impl Into<String>, months: u32) -> Self {
        Self {
            biomarker: biomarker.into(),
            months,
        }
    }

    /// Earliest instant covered by the window ending at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339, a naive ISO date-time (read as UTC) or a plain
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
