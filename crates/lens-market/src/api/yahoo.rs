//! Yahoo Finance API client

use crate::api::PriceSource;
use crate::error::{LensError, Result};
use crate::models::{DailyBar, Lookback};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get daily quotes for a symbol over a named range
    pub async fn get_daily_range(&self, symbol: &str, lookback: Lookback) -> Result<Vec<DailyBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| LensError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_quote_range(symbol, "1d", lookback.as_range())
            .await
            .map_err(|e| LensError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| LensError::YahooFinanceError(e.to_string()))?;

        let bars: Vec<DailyBar> = quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                bar_date(q.timestamp as i64).map(|date| DailyBar {
                    date,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(LensError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no daily bars for range {lookback}"),
            });
        }

        tracing::debug!("Fetched {} bars for {} ({})", bars.len(), symbol, lookback);
        Ok(bars)
    }
}

/// Trading date of a bar timestamp, dropping the timezone
fn bar_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    async fn daily_bars(&self, symbol: &str, lookback: Lookback) -> Result<Vec<DailyBar>> {
        self.get_daily_range(symbol, lookback).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_date_is_naive_utc_date() {
        // 2024-06-14 03:45:00 UTC, the NSE open
        assert_eq!(
            bar_date(1_718_336_700),
            NaiveDate::from_ymd_opt(2024, 6, 14)
        );
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_daily_range() {
        let client = YahooFinanceClient::new();
        let bars = client.get_daily_range("AAPL", Lookback::OneMonth).await;
        assert!(bars.is_ok());

        let bars = bars.unwrap();
        assert!(!bars.is_empty());
        assert!(bars.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_fails() {
        let client = YahooFinanceClient::new();
        assert!(client.daily_bars("INVALID_SYMBOL_12345", Lookback::FiveDays).await.is_err());
    }
}
