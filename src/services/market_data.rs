//! Market data provider interface.
//!
//! The upstream provider (auth, token refresh, request batching) is a
//! collaborator; the engine only consumes candle arrays through this
//! trait.

use crate::models::candle::Candle;
use std::collections::HashMap;

#[async_trait::async_trait]
pub trait MarketDataProvider {
    /// Get historical candles for a symbol, ascending by time.
    async fn get_candles(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, Box<dyn std::error::Error + Send + Sync>>;

    /// Get the latest price for a symbol.
    async fn get_latest_price(
        &self,
        symbol: &str,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct PlaceholderMarketDataProvider;

#[async_trait::async_trait]
impl MarketDataProvider for PlaceholderMarketDataProvider {
    async fn get_candles(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<Candle>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Vec::new())
    }

    async fn get_latest_price(
        &self,
        _symbol: &str,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(0.0)
    }
}

/// In-memory provider backed by preloaded candles, for tests and demos.
#[derive(Default)]
pub struct StaticMarketDataProvider {
    candles: HashMap<String, Vec<Candle>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.into(), candles);
        self
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, Box<dyn std::error::Error + Send + Sync>> {
        let candles = self.candles.get(symbol).cloned().unwrap_or_default();
        if candles.len() > limit {
            Ok(candles[candles.len() - limit..].to_vec())
        } else {
            Ok(candles)
        }
    }

    async fn get_latest_price(
        &self,
        symbol: &str,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .candles
            .get(symbol)
            .and_then(|c| c.last())
            .map(|c| c.close)
            .unwrap_or(0.0))
    }
}
