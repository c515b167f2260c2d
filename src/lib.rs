//! Study-scan formula engine.
//!
//! Parses ThinkOrSwim-style study scripts (inputs, defs, named plots),
//! materializes each plot as a full time series against per-symbol candle
//! data, and classifies the latest value of every plot against configured
//! thresholds for a scanning UI.

pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod scan;
pub mod services;
