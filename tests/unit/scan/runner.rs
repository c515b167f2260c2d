//! Unit tests for the bulk scan runner

use chrono::Utc;
use std::sync::Arc;
use studyscan::config::ScanConfig;
use studyscan::models::candle::Candle;
use studyscan::models::scan::{LabelStatus, StudyRequest};
use studyscan::scan::runner::{evaluate_study, ScanRunner};
use studyscan::services::market_data::{MarketDataProvider, StaticMarketDataProvider};

fn sample_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let price = 10.0 + 2.0 * i as f64;
            Candle::new(price - 0.5, price + 1.0, price - 1.0, price, 1000.0, Utc::now())
        })
        .collect()
}

struct FailingProvider;

#[async_trait::async_trait]
impl MarketDataProvider for FailingProvider {
    async fn get_candles(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<Candle>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("provider unavailable")))
    }

    async fn get_latest_price(
        &self,
        _symbol: &str,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("provider unavailable")))
    }
}

#[test]
fn test_rows_are_padded_to_slot_count() {
    let study = StudyRequest::new("plot p = close;").with_threshold(Some(0.0), None);
    let report = evaluate_study(&sample_candles(5), &study, 4);
    assert_eq!(report.labels.len(), 4);
    assert_eq!(report.labels[0].status, LabelStatus::Within);
    // padding slots have no value and no plot behind them
    assert_eq!(report.labels[3].value, None);
    assert_eq!(report.labels[3].status, LabelStatus::Unknown);
}

#[test]
fn test_rows_are_truncated_to_slot_count() {
    let study = StudyRequest::new("plot a = close; plot b = open; plot c = high;");
    let report = evaluate_study(&sample_candles(5), &study, 2);
    assert_eq!(report.labels.len(), 2);
    // the declared plot list still carries everything the script named
    assert_eq!(report.plots.len(), 3);
}

#[test]
fn test_empty_candles_short_circuit_to_empty_rows() {
    let study = StudyRequest::new("plot p = close;").with_threshold(Some(0.0), Some(1.0));
    let report = evaluate_study(&[], &study, 3);
    assert_eq!(report.labels.len(), 3);
    for label in &report.labels {
        assert_eq!(label.value, None);
        assert_eq!(label.status, LabelStatus::Empty);
    }
    // threshold bounds are still echoed on the rows
    assert_eq!(report.labels[0].min, Some(0.0));
    assert_eq!(report.labels[0].max, Some(1.0));
}

#[test]
fn test_broken_plot_reports_error_status() {
    let study = StudyRequest::new("plot bad = close *;").with_threshold(Some(0.0), None);
    let report = evaluate_study(&sample_candles(5), &study, 1);
    assert_eq!(report.labels[0].status, LabelStatus::Error);
    assert_eq!(report.labels[0].value, None);
}

#[tokio::test]
async fn test_scan_emits_rows_for_every_symbol() {
    let provider = StaticMarketDataProvider::new()
        .with_candles("GOOD", sample_candles(30))
        .with_candles("ALSO", sample_candles(30));
    let config = ScanConfig {
        slots: 2,
        ..ScanConfig::default()
    };
    let runner = ScanRunner::new(Arc::new(provider), config);

    let study = StudyRequest::new("plot p = Average(close, 3);")
        .with_threshold(Some(0.0), None);
    let symbols = vec!["GOOD".to_string(), "MISSING".to_string(), "ALSO".to_string()];
    let reports = runner.scan(&symbols, &[study]).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].symbol, "GOOD");
    assert_eq!(reports[0].studies[0].labels[0].status, LabelStatus::Within);
    // a symbol with no data still yields fixed-shape rows
    assert_eq!(reports[1].symbol, "MISSING");
    assert_eq!(reports[1].studies[0].labels.len(), 2);
    assert_eq!(reports[1].studies[0].labels[0].status, LabelStatus::Empty);
    assert_eq!(reports[2].studies[0].labels[0].status, LabelStatus::Within);
}

#[tokio::test]
async fn test_provider_failure_never_aborts_the_scan() {
    let runner = ScanRunner::new(
        Arc::new(FailingProvider),
        ScanConfig {
            slots: 1,
            ..ScanConfig::default()
        },
    );
    let study = StudyRequest::new("plot p = close;");
    let reports = runner.scan(&["ANY".to_string()], &[study]).await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].studies[0].labels[0].status, LabelStatus::Empty);
}
