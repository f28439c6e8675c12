//! Biomarker result models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One measured value for one named biomarker in one report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerResult {
    /// Canonical name as supplied upstream (case-sensitive)
    pub biomarker: String,
    /// Measured value
    pub value: f64,
    /// Unit of measure (may be empty)
    #[serde(default)]
    pub unit: String,
    /// Free-text reference range (may be empty or "Not specified")
    #[serde(default)]
    pub reference_range: String,
}

impl BiomarkerResult {
    /// Create a new result with required fields.
    pub fn new(biomarker: impl Into<String>, value: f64) -> Self {
        Self {
            biomarker: biomarker.into(),
            value,
            unit: String::new(),
            reference_range: String::new(),
        }
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the reference range text.
    pub fn with_reference_range(mut self, reference_range: impl Into<String>) -> Self {
        self.reference_range = reference_range.into();
        self
    }
}

/// Numeric interval derived from a reference-range string.
///
/// `lower <= upper` is expected but not enforced: inverted source text is
/// kept as written so the data problem stays visible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalRange {
    pub lower: f64,
    pub upper: f64,
}

impl NormalRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// True when the source text listed the bounds in reverse.
    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }

    /// Inclusive containment, independent of bound order.
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = if self.is_inverted() {
            (self.upper, self.lower)
        } else {
            (self.lower, self.upper)
        };
        value >= lo && value <= hi
    }
}

/// Coarse classification of how far a value deviates from normal.
///
/// Deserialization goes through [`Severity::from_label`], so labels are
/// read case-insensitively and unknown ones become `Normal`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String")]
pub enum Severity {
    #[default]
    Normal,
    Low,
    Borderline,
    High,
    Critical,
}

impl Severity {
    /// Read a severity label from upstream data.
    ///
    /// Matching is case-insensitive; unknown labels fall back to `Normal`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Severity::Low,
            "borderline" => Severity::Borderline,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Low => "Low",
            Severity::Borderline => "Borderline",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Display grouping used by status badges and recommendation lists.
    pub fn tone(&self) -> StatusTone {
        match self {
            Severity::High | Severity::Critical => StatusTone::Alert,
            Severity::Borderline => StatusTone::Caution,
            Severity::Low => StatusTone::Below,
            Severity::Normal => StatusTone::Clear,
        }
    }

    /// Check if this severity should be surfaced to the user.
    pub fn needs_attention(&self) -> bool {
        matches!(self.tone(), StatusTone::Alert)
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        Severity::from_label(&label)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation-neutral grouping of severities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// High or Critical
    Alert,
    /// Borderline
    Caution,
    /// Low
    Below,
    /// Normal
    Clear,
}
