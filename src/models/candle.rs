//! Candle bars and the base series extracted from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the fixed base series the engine exposes to scripts, one value
/// per candle.
pub const BASE_SERIES: [&str; 12] = [
    "open", "high", "low", "close", "volume", "oi", "delta", "gamma", "theo", "mark", "ask", "bid",
];

/// A single OHLCV bar with optional open-interest and option Greeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64, time: DateTime<Utc>) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            oi: None,
            delta: None,
            gamma: None,
            theo: None,
            mark: None,
            ask: None,
            bid: None,
        }
    }

    pub fn with_open_interest(mut self, oi: f64) -> Self {
        self.oi = Some(oi);
        self
    }

    pub fn with_greeks(mut self, delta: f64, gamma: f64, theo: f64) -> Self {
        self.delta = Some(delta);
        self.gamma = Some(gamma);
        self.theo = Some(theo);
        self
    }

    pub fn with_quote(mut self, mark: f64, ask: f64, bid: f64) -> Self {
        self.mark = Some(mark);
        self.ask = Some(ask);
        self.bid = Some(bid);
        self
    }
}

/// Extract every base series from an ascending-time candle slice.
///
/// Array position is the time index; the input is never re-sorted. Missing
/// optional fields contribute 0.0 so all series share one length.
pub fn series_matrix(candles: &[Candle]) -> HashMap<String, Vec<f64>> {
    let mut out: HashMap<String, Vec<f64>> = HashMap::new();
    for name in BASE_SERIES {
        let values = candles
            .iter()
            .map(|c| match name {
                "open" => c.open,
                "high" => c.high,
                "low" => c.low,
                "close" => c.close,
                "volume" => c.volume,
                "oi" => c.oi.unwrap_or(0.0),
                "delta" => c.delta.unwrap_or(0.0),
                "gamma" => c.gamma.unwrap_or(0.0),
                "theo" => c.theo.unwrap_or(0.0),
                "mark" => c.mark.unwrap_or(0.0),
                "ask" => c.ask.unwrap_or(0.0),
                "bid" => c.bid.unwrap_or(0.0),
                _ => 0.0,
            })
            .collect();
        out.insert(name.to_string(), values);
    }
    out
}
