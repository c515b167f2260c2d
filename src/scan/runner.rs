//! Bulk scan orchestration across symbols.
//!
//! Candle fetches run concurrently per symbol as an independent
//! best-effort batch; evaluation per (symbol, study) is synchronous and
//! CPU-bound. A symbol that fails to fetch or has no candles still emits
//! fixed-shape rows so the scanning UI never loses its grid.

use crate::config::ScanConfig;
use crate::engine::materialize::Materializer;
use crate::engine::parser::parse_script;
use crate::models::candle::Candle;
use crate::models::scan::{LabelResult, StudyReport, StudyRequest, SymbolReport, ThresholdSpec};
use crate::scan::classifier::{empty_label, extract_label};
use crate::services::market_data::MarketDataProvider;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ScanRunner {
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
    config: ScanConfig,
}

impl ScanRunner {
    pub fn new(provider: Arc<dyn MarketDataProvider + Send + Sync>, config: ScanConfig) -> Self {
        Self { provider, config }
    }

    /// Scan every symbol against every study slot.
    ///
    /// One symbol's fetch failure never blocks the others; its rows come
    /// back null-valued with `empty` status.
    pub async fn scan(&self, symbols: &[String], studies: &[StudyRequest]) -> Vec<SymbolReport> {
        let fetches = symbols.iter().map(|symbol| {
            let provider = self.provider.clone();
            let limit = self.config.candle_limit;
            async move {
                let result = provider.get_candles(symbol, limit).await;
                (symbol.clone(), result)
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .map(|(symbol, result)| {
                let candles = match result {
                    Ok(candles) => candles,
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "candle fetch failed, emitting empty rows");
                        Vec::new()
                    }
                };
                debug!(
                    symbol = %symbol,
                    candle_count = candles.len(),
                    study_count = studies.len(),
                    "evaluating studies"
                );
                let reports = studies
                    .iter()
                    .map(|study| evaluate_study(&candles, study, self.config.slots))
                    .collect();
                SymbolReport {
                    symbol,
                    studies: reports,
                }
            })
            .collect()
    }
}

/// Evaluate one study against one symbol's candles.
///
/// Parses the script with the caller's input overrides, materializes each
/// plot in declared order, and classifies the last value of each against
/// the positionally paired threshold. The label list is padded or
/// truncated to `slots` so rows keep a fixed shape regardless of how many
/// plots the script declared.
pub fn evaluate_study(candles: &[Candle], study: &StudyRequest, slots: usize) -> StudyReport {
    let parsed = parse_script(&study.script, &study.overrides);

    let threshold_at =
        |slot: usize| -> ThresholdSpec { study.thresholds.get(slot).copied().unwrap_or_default() };

    if candles.is_empty() {
        let labels = (0..slots).map(|slot| empty_label(&threshold_at(slot))).collect();
        return StudyReport {
            plots: parsed.plots,
            labels,
        };
    }

    let mut materializer = Materializer::new(candles, &parsed.defs);
    let mut labels: Vec<LabelResult> = Vec::with_capacity(slots);
    for slot in 0..slots {
        let spec = threshold_at(slot);
        match parsed.plots.get(slot) {
            Some(plot) => {
                let series = materializer.materialize(&plot.name);
                labels.push(extract_label(
                    &series,
                    materializer.is_failed(&plot.name),
                    &spec,
                ));
            }
            None => {
                // padding slot: no plot declared at this position
                labels.push(extract_label(&[], false, &spec));
            }
        }
    }

    StudyReport {
        plots: parsed.plots,
        labels,
    }
}
