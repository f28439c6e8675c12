//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::interpret::InterpretResult;

/// Tunables for range parsing, trend labelling and query windows.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Multiplier applied to the largest observed value to close a
    /// lower-bound-only range (">200").
    pub lower_bound_headroom: f64,
    /// Trend query window when the caller does not pass one.
    pub default_window_months: u32,
    /// Reference text meaning "no range given" (compared case-insensitively).
    pub unspecified_marker: String,
    /// chrono format for the short axis label.
    pub point_label_format: String,
    /// chrono format for the tooltip date.
    pub full_date_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lower_bound_headroom: 1.2,
            default_window_months: 12,
            unspecified_marker: "Not specified".to_string(),
            point_label_format: "%b %d".to_string(),
            full_date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON, filling omitted keys with defaults.
    pub fn from_json(json: &str) -> InterpretResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
