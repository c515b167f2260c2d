//! Scan request and classified-result models.

use crate::models::script::PlotDecl;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bounds a plot's latest value is classified against. Positionally paired
/// with the script's plot list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThresholdSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ThresholdSpec {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

/// Classification of a plot's latest value against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelStatus {
    /// Value missing or non-finite.
    Unknown,
    /// No bounds configured for this slot.
    NoFilter,
    Below,
    Above,
    Within,
    /// No candle data was available for the symbol.
    Empty,
    /// The formula failed to compile.
    Error,
}

/// One classified label row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelResult {
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub status: LabelStatus,
}

/// One study slot: raw DSL text, optional input overrides, and the ordered
/// threshold list paired with the script's plots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyRequest {
    pub script: String,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdSpec>,
}

impl StudyRequest {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            overrides: HashMap::new(),
            thresholds: Vec::new(),
        }
    }

    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn with_threshold(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.thresholds.push(ThresholdSpec::new(min, max));
        self
    }
}

/// Output for one study slot: the declared plot list plus fixed-shape
/// classified label rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyReport {
    pub plots: Vec<PlotDecl>,
    pub labels: Vec<LabelResult>,
}

/// All study results for one scanned symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub studies: Vec<StudyReport>,
}
