//! Unit tests for series materialization driven by parsed scripts

use approx::assert_relative_eq;
use chrono::Utc;
use std::collections::HashMap;
use studyscan::engine::{parse_script, Materializer};
use studyscan::models::candle::Candle;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&c| Candle::new(c - 0.5, c + 1.0, c - 1.0, c, 1000.0, Utc::now()))
        .collect()
}

fn materialize_plot(source: &str, closes: &[f64], plot: &str) -> Vec<f64> {
    let parsed = parse_script(source, &HashMap::new());
    let candles = candles_from_closes(closes);
    let mut materializer = Materializer::new(&candles, &parsed.defs);
    materializer.materialize(plot)
}

#[test]
fn test_offset_zero_is_the_raw_value() {
    let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
    let series = materialize_plot("plot p = close[0];", &closes, "p");
    assert_eq!(series, closes.to_vec());
}

#[test]
fn test_offset_looks_back_and_clamps_at_start() {
    let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
    let series = materialize_plot("plot p = close[2];", &closes, "p");
    // clamped to index 0 before the series start, k steps earlier after
    assert_eq!(series, vec![10.0, 10.0, 10.0, 12.0, 14.0]);
}

#[test]
fn test_close_offset_one_scenario() {
    let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
    let series = materialize_plot("plot p = close[1];", &closes, "p");
    assert_relative_eq!(*series.last().unwrap(), 16.0);
}

#[test]
fn test_moving_average_of_length_one_is_identity() {
    let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
    let series = materialize_plot("plot p = SimpleMovingAvg(close, 1);", &closes, "p");
    assert_eq!(series, closes.to_vec());
}

#[test]
fn test_moving_average_scenario() {
    let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
    let series = materialize_plot("plot p = SimpleMovingAvg(close, 3);", &closes, "p");
    assert_relative_eq!(*series.last().unwrap(), 16.0);
}

#[test]
fn test_nested_window_materializes_bottom_up() {
    // The inner SMA must be fully materialized before the outer highest.
    // With these closes a naive outer-first evaluation (highest of close,
    // then SMA) would report 20 at the last index; bottom-up reports 15.
    let closes = [10.0, 20.0, 5.0, 5.0, 5.0];
    let series = materialize_plot(
        "plot p = Highest(SimpleMovingAvg(close, 3), 5);",
        &closes,
        "p",
    );
    assert_relative_eq!(*series.last().unwrap(), 15.0);

    let naive = materialize_plot(
        "plot p = SimpleMovingAvg(Highest(close, 5), 3);",
        &closes,
        "p",
    );
    assert!((naive.last().unwrap() - series.last().unwrap()).abs() > 1.0);
}

#[test]
fn test_defs_reference_plot_output() {
    let closes = [10.0, 12.0, 14.0];
    let parsed = parse_script(
        "plot base = close * 2; plot shifted = base + 1;",
        &HashMap::new(),
    );
    let candles = candles_from_closes(&closes);
    let mut materializer = Materializer::new(&candles, &parsed.defs);
    assert_eq!(materializer.materialize("shifted"), vec![21.0, 25.0, 29.0]);
}

#[test]
fn test_self_referencing_def_terminates_with_zeros() {
    let closes = [10.0, 12.0, 14.0];
    let series = materialize_plot("def a = a; plot p = a;", &closes, "p");
    assert_eq!(series, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_materialization_is_a_pure_function() {
    let source = "def fast = Average(close, 2);\
                  def slow = Average(close, 4);\
                  plot diff = fast - slow;\
                  plot band = Highest(diff, 3);";
    let closes = [10.0, 13.0, 9.0, 17.0, 12.0, 15.0];
    let first = materialize_plot(source, &closes, "band");
    let second = materialize_plot(source, &closes, "band");
    assert_eq!(first, second);
}

#[test]
fn test_failed_formula_does_not_abort_siblings() {
    let closes = [10.0, 12.0];
    let parsed = parse_script(
        "plot broken = close *; plot fine = close + 1;",
        &HashMap::new(),
    );
    let candles = candles_from_closes(&closes);
    let mut materializer = Materializer::new(&candles, &parsed.defs);
    assert_eq!(materializer.materialize("broken"), vec![0.0, 0.0]);
    assert!(materializer.is_failed("broken"));
    assert_eq!(materializer.materialize("fine"), vec![11.0, 13.0]);
    assert!(!materializer.is_failed("fine"));
}

#[test]
fn test_window_length_from_input_substitution() {
    let mut overrides = HashMap::new();
    overrides.insert("len".to_string(), "2".to_string());
    let parsed = parse_script("input len = 3; plot p = Average(close, len);", &overrides);
    let candles = candles_from_closes(&[10.0, 20.0, 30.0]);
    let mut materializer = Materializer::new(&candles, &parsed.defs);
    assert_eq!(materializer.materialize("p"), vec![10.0, 15.0, 25.0]);
}
