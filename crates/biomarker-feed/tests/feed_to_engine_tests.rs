//! End-to-end tests: collaborator payloads through the interpretation engine.

use biomarker_core::{Interpreter, NormalRange, Severity, TrendOutcome, TrendSession};
use biomarker_feed::{decode_report, decode_trend};
use proptest::prelude::*;

#[test]
fn test_ldl_report_scenario() {
    let json = r#"{
        "reportDate": "2024-06-01",
        "standardizedResults": [
            {"biomarker": "LDL", "value": 160, "unit": "mg/dL", "referenceRange": "<100"}
        ],
        "analysis": [
            {"interpretation": "LDL cholesterol is high", "severity": "High", "recommendation": "Reduce saturated fat"}
        ]
    }"#;

    let report = decode_report(json).unwrap();
    let interpreter = Interpreter::default();

    let panel = interpreter.summarize(&report, None);

    assert_eq!(panel.views.len(), 1);
    assert_eq!(panel.views[0].severity, Severity::High);
    assert_eq!(panel.views[0].normal_range, Some(NormalRange::new(0.0, 100.0)));
    assert_eq!(
        interpreter.parse_range(&report.results[0].reference_range, &[]),
        Some(NormalRange::new(0.0, 100.0))
    );
}

#[test]
fn test_unordered_trend_payload() {
    let json = r#"{"data": [
        {"date": "2024-03-01", "value": 110, "unit": "mg/dL", "referenceRange": "70-99"},
        {"date": "2024-01-01", "value": 95, "unit": "mg/dL", "referenceRange": "70-99"},
        {"date": "2024-02-01", "value": 102, "unit": "mg/dL", "referenceRange": "70-99"}
    ]}"#;

    let raw = decode_trend(json).unwrap();
    let series = Interpreter::default().build_trend(&raw);

    let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Jan 01", "Feb 01", "Mar 01"]);
    assert_eq!(series.normal_range, Some(NormalRange::new(70.0, 99.0)));
}

#[test]
fn test_session_with_decoded_payload() {
    let session = TrendSession::default();
    let stale = session.begin("Glucose", None);
    let current = session.begin("HDL", Some(6));

    let raw = decode_trend(r#"[{"date": "2024-01-01", "value": 45, "referenceRange": ">40"}]"#).unwrap();

    assert_eq!(session.complete(&stale, &raw), TrendOutcome::Superseded);

    let series = session.complete(&current, &raw).into_series().unwrap();
    let band = series.normal_range.unwrap();
    assert_eq!(band.lower, 40.0);
    assert!((band.upper - 54.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn decoders_never_panic(input in "\\PC{0,64}") {
        let _ = decode_report(&input);
        let _ = decode_trend(&input);
    }
}
