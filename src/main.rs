use chrono::{Duration, Utc};
use std::sync::Arc;
use studyscan::config::ScanConfig;
use studyscan::logging::init_logging;
use studyscan::models::candle::Candle;
use studyscan::models::scan::StudyRequest;
use studyscan::scan::runner::ScanRunner;
use studyscan::services::market_data::StaticMarketDataProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let symbols = vec!["XYZ".to_string(), "ABC".to_string()];
    let provider = StaticMarketDataProvider::new()
        .with_candles("XYZ", trending_candles(60, 100.0, 0.5))
        .with_candles("ABC", trending_candles(60, 40.0, -0.25));

    let study = StudyRequest::new(
        "input fastLength = 5;\n\
         input slowLength = 20;\n\
         def fast = Average(close, fastLength);\n\
         def slow = Average(close, slowLength);\n\
         plot diff = fast - slow;\n\
         plot breakout = close > Highest(high[1], slowLength);",
    )
    .with_override("fastLength", "8")
    .with_threshold(Some(0.0), None)
    .with_threshold(Some(1.0), None);

    let runner = ScanRunner::new(Arc::new(provider), ScanConfig::default());
    let reports = runner.scan(&symbols, &[study]).await;

    for report in &reports {
        println!("Symbol: {}", report.symbol);
        for study in &report.studies {
            for (plot, label) in study.plots.iter().zip(&study.labels) {
                println!(
                    "  {}: value={:?} status={:?}",
                    plot.name, label.value, label.status
                );
            }
        }
        println!();
    }

    Ok(())
}

fn trending_candles(count: usize, start: f64, step: f64) -> Vec<Candle> {
    let origin = Utc::now() - Duration::minutes(count as i64);
    (0..count)
        .map(|i| {
            let price = start + step * i as f64;
            Candle::new(
                price,
                price + 0.4,
                price - 0.4,
                price + 0.1,
                1000.0 + i as f64,
                origin + Duration::minutes(i as i64),
            )
        })
        .collect()
}
