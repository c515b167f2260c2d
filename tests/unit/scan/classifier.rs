//! Unit tests for threshold classification

use studyscan::models::scan::{LabelStatus, ThresholdSpec};
use studyscan::scan::classify;

#[test]
fn test_threshold_scenario_from_scan_config() {
    let spec = ThresholdSpec::new(Some(15.0), Some(17.0));
    assert_eq!(classify(Some(16.0), &spec), LabelStatus::Within);
    assert_eq!(classify(Some(20.0), &spec), LabelStatus::Above);
    assert_eq!(classify(None, &spec), LabelStatus::Unknown);
}

#[test]
fn test_min_only_threshold() {
    let spec = ThresholdSpec::new(Some(15.0), None);
    assert_eq!(classify(Some(14.9), &spec), LabelStatus::Below);
    assert_eq!(classify(Some(15.0), &spec), LabelStatus::Within);
    assert_eq!(classify(Some(100.0), &spec), LabelStatus::Within);
}

#[test]
fn test_unbounded_slot_reports_no_filter() {
    let spec = ThresholdSpec::default();
    assert_eq!(classify(Some(0.0), &spec), LabelStatus::NoFilter);
    assert_eq!(classify(Some(-50.0), &spec), LabelStatus::NoFilter);
}

#[test]
fn test_status_serialization_is_camel_case() {
    let json = serde_json::to_string(&LabelStatus::NoFilter).unwrap();
    assert_eq!(json, "\"noFilter\"");
    let json = serde_json::to_string(&LabelStatus::Within).unwrap();
    assert_eq!(json, "\"within\"");
    let json = serde_json::to_string(&LabelStatus::Unknown).unwrap();
    assert_eq!(json, "\"unknown\"");
}
