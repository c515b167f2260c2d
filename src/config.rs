//! Environment-driven configuration for the scan runtime.

use std::env;

/// Deployment environment name, used to pick the log formatter.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Configuration for a scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Fixed number of label slots per study row. Scripts declaring fewer
    /// plots are padded, scripts declaring more are truncated.
    pub slots: usize,
    /// How many candles to request per symbol from the data provider.
    pub candle_limit: usize,
    /// Symbols to scan by default.
    pub symbols: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            slots: 5,
            candle_limit: 250,
            symbols: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `SCAN_SLOTS`, `CANDLE_LIMIT`, `SYMBOLS`
    /// (comma-separated).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let slots = env::var("SCAN_SLOTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.slots);

        let candle_limit = env::var("CANDLE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.candle_limit);

        let symbols = env::var("SYMBOLS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_string())
                    .filter(|sym| !sym.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.symbols);

        Self {
            slots,
            candle_limit,
            symbols,
        }
    }
}
