//! Report-detail payload decoding.

use biomarker_core::models::parse_timestamp;
use biomarker_core::{AnalysisEntry, BiomarkerResult, ReportSnapshot, Severity};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{decode_records, unwrap_envelope, FeedError, FeedResult, LooseNumber};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    #[serde(default)]
    report_date: Option<String>,
    #[serde(default)]
    standardized_results: Option<Vec<Value>>,
    #[serde(default)]
    analysis: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    biomarker: String,
    value: LooseNumber,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    reference_range: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysisEntry {
    interpretation: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    biomarker: Option<String>,
}

/// Decode a report-detail response.
///
/// Accepts the report object directly or wrapped in `{ "data": ... }`.
pub fn decode_report(json: &str) -> FeedResult<ReportSnapshot> {
    let value: Value = serde_json::from_str(json)?;
    decode_report_value(value)
}

/// Decode a report-detail response from a parsed JSON value.
pub fn decode_report_value(value: Value) -> FeedResult<ReportSnapshot> {
    let value = unwrap_envelope(value);
    if !value.is_object() {
        return Err(FeedError::InvalidFormat(
            "Expected a report object".into(),
        ));
    }

    let raw: RawReport = serde_json::from_value(value)?;

    let report_date = raw.report_date.as_deref().and_then(|text| {
        let parsed = parse_timestamp(text);
        if parsed.is_none() {
            warn!(report_date = text, "unreadable report date");
        }
        parsed
    });

    let results = decode_records(
        raw.standardized_results.unwrap_or_default(),
        "result",
        to_result,
    );

    let analysis = match raw.analysis {
        Value::Array(items) => decode_records(items, "analysis", to_entry),
        Value::Null => Vec::new(),
        _ => {
            debug!("analysis is not a list of entries, ignoring");
            Vec::new()
        }
    };

    Ok(ReportSnapshot {
        report_date,
        results,
        analysis,
    })
}

fn to_result(raw: RawResult) -> Option<BiomarkerResult> {
    if raw.biomarker.trim().is_empty() {
        return None;
    }
    let value = raw.value.as_f64()?;
    Some(BiomarkerResult {
        biomarker: raw.biomarker,
        value,
        unit: raw.unit.unwrap_or_default(),
        reference_range: raw.reference_range.unwrap_or_default(),
    })
}

fn to_entry(raw: RawAnalysisEntry) -> Option<AnalysisEntry> {
    Some(AnalysisEntry {
        interpretation: raw.interpretation,
        severity: raw
            .severity
            .as_deref()
            .map(Severity::from_label)
            .unwrap_or_default(),
        recommendation: raw.recommendation.unwrap_or_default(),
        biomarker: raw.biomarker.filter(|b| !b.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const REPORT_JSON: &str = r#"{
        "_id": "665f1c",
        "reportDate": "2024-06-01T00:00:00.000Z",
        "sourceFileName": "labs.pdf",
        "standardizedResults": [
            {"biomarker": "LDL", "value": 160, "unit": "mg/dL", "referenceRange": "<100"},
            {"biomarker": "HbA1c", "value": "5.9", "unit": "%", "referenceRange": "4.0-5.6"},
            {"biomarker": "Vitamin D", "value": 31},
            {"biomarker": "Ferritin", "value": "pending"},
            {"value": 12}
        ],
        "analysis": [
            {"interpretation": "LDL cholesterol is high", "severity": "High", "recommendation": "Reduce saturated fat"},
            {"interpretation": "HbA1c suggests prediabetes", "severity": "borderline"},
            {"interpretation": "Unusual marker", "severity": "Elevated", "recommendation": "Ask your doctor"}
        ]
    }"#;

    #[test]
    fn test_decode_report() {
        let report = decode_report(REPORT_JSON).unwrap();

        assert_eq!(
            report.report_date,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );

        // Ferritin (unreadable value) and the nameless record are skipped
        let names: Vec<&str> = report.results.iter().map(|r| r.biomarker.as_str()).collect();
        assert_eq!(names, vec!["LDL", "HbA1c", "Vitamin D"]);

        assert_eq!(report.results[1].value, 5.9);
        assert_eq!(report.results[2].unit, "");
        assert_eq!(report.results[2].reference_range, "");

        assert_eq!(report.analysis.len(), 3);
        assert_eq!(report.analysis[1].severity, Severity::Borderline);
        assert_eq!(report.analysis[1].recommendation, "");
        assert_eq!(report.analysis[2].severity, Severity::Normal);
    }

    #[test]
    fn test_decode_wrapped_report() {
        let json = format!(r#"{{"success": true, "data": {}}}"#, REPORT_JSON);
        let report = decode_report(&json).unwrap();
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn test_dashboard_style_analysis_ignored() {
        let json = r#"{
            "standardizedResults": [{"biomarker": "Glucose", "value": 100}],
            "analysis": {"diet": ["Eat more fiber"], "lifestyle": [], "precaution": []}
        }"#;

        let report = decode_report(json).unwrap();

        assert_eq!(report.results.len(), 1);
        assert!(report.analysis.is_empty());
        assert_eq!(report.report_date, None);
    }

    #[test]
    fn test_empty_report() {
        let report = decode_report("{}").unwrap();
        assert!(report.results.is_empty());
        assert!(report.analysis.is_empty());
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            decode_report("[1, 2, 3]"),
            Err(FeedError::InvalidFormat(_))
        ));
        assert!(matches!(decode_report("{oops"), Err(FeedError::JsonParse(_))));
    }
}
