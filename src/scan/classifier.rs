//! Scalar extractor and threshold classifier.

use crate::models::scan::{LabelResult, LabelStatus, ThresholdSpec};

/// Classify a scan-time value against its configured bounds.
///
/// Precedence: value missing, then no bounds configured, then below min,
/// then above max, else within.
pub fn classify(value: Option<f64>, spec: &ThresholdSpec) -> LabelStatus {
    let value = match value {
        Some(v) => v,
        None => return LabelStatus::Unknown,
    };
    if spec.min.is_none() && spec.max.is_none() {
        return LabelStatus::NoFilter;
    }
    if let Some(min) = spec.min {
        if value < min {
            return LabelStatus::Below;
        }
    }
    if let Some(max) = spec.max {
        if value > max {
            return LabelStatus::Above;
        }
    }
    LabelStatus::Within
}

/// Take a materialized series' last element as the scan-time label and
/// classify it. Non-finite values coerce to null here, not mid-expression.
/// A formula that failed to compile reports `error` with a null value.
pub fn extract_label(series: &[f64], failed: bool, spec: &ThresholdSpec) -> LabelResult {
    if failed {
        return LabelResult {
            value: None,
            min: spec.min,
            max: spec.max,
            status: LabelStatus::Error,
        };
    }
    let value = series.last().copied().filter(|v| v.is_finite());
    LabelResult {
        value,
        min: spec.min,
        max: spec.max,
        status: classify(value, spec),
    }
}

/// A fixed-shape row for a symbol with no candle data.
pub fn empty_label(spec: &ThresholdSpec) -> LabelResult {
    LabelResult {
        value: None,
        min: spec.min,
        max: spec.max,
        status: LabelStatus::Empty,
    }
}
