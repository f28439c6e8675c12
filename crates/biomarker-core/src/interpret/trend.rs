//! Trend series assembly for the biomarker chart.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::models::{RawTrendPoint, TrendPoint, TrendSeries};

use super::ReferenceRangeParser;

/// Builds chart-ready series from raw historical points.
pub struct TrendSeriesBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> TrendSeriesBuilder<'a> {
    /// Create a builder bound to a configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Sort `raw_points` by date and derive the normal-range band.
    ///
    /// The band comes from the earliest point's reference range; the
    /// reference interval is assumed stable across the window. Every
    /// observed value is passed to the parser so a ">" ceiling covers the
    /// whole series.
    pub fn build(&self, raw_points: &[RawTrendPoint]) -> TrendSeries {
        if raw_points.is_empty() {
            return TrendSeries::default();
        }

        let mut ordered: Vec<&RawTrendPoint> = raw_points.iter().collect();
        ordered.sort_by_key(|p| p.date);

        let observed: Vec<f64> = raw_points.iter().map(|p| p.value).collect();
        let normal_range = ordered.first().and_then(|earliest| {
            ReferenceRangeParser::new(self.config).parse(&earliest.reference_range, &observed)
        });

        let points: Vec<TrendPoint> = ordered.into_iter().map(|p| self.to_point(p)).collect();

        debug!(
            points = points.len(),
            has_band = normal_range.is_some(),
            "built trend series"
        );

        TrendSeries {
            points,
            normal_range,
        }
    }

    fn to_point(&self, raw: &RawTrendPoint) -> TrendPoint {
        TrendPoint {
            date: raw.date,
            label: format_date(&raw.date, &self.config.point_label_format),
            full_label: format_date(&raw.date, &self.config.full_date_format),
            value: raw.value,
            unit: raw.unit.clone(),
            reference_range: raw.reference_range.clone(),
        }
    }
}

/// Format a date label, falling back to `YYYY-MM-DD` on a bad pattern.
fn format_date(date: &DateTime<Utc>, pattern: &str) -> String {
    let mut label = String::new();
    if write!(label, "{}", date.format(pattern)).is_err() {
        warn!(pattern, "invalid date label format");
        label = date.format("%Y-%m-%d").to_string();
    }
    label
}
