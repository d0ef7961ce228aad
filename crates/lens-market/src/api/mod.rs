//! API clients for quote, history and news providers
//!
//! Each provider sits behind one of two traits so the fetch boundary in
//! [`crate::provider::MarketData`] can treat them as black boxes:
//!
//! - [`PriceSource`]: daily bars for a symbol over a lookback span
//! - [`NewsSource`]: raw articles for a search query

pub mod finnhub;
pub mod google_news;
pub mod yahoo;

pub use finnhub::FinnhubClient;
pub use google_news::GoogleNewsClient;
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::models::{DailyBar, Lookback};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider of daily price bars
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily bars for `symbol`, oldest first
    async fn daily_bars(&self, symbol: &str, lookback: Lookback) -> Result<Vec<DailyBar>>;
}

/// Provider of news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>>;

    /// Short provider name for logs and status lines
    fn name(&self) -> &'static str;
}

/// A news lookup for one ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Full ticker, e.g. `RELIANCE.NS`
    pub symbol: String,
    /// Free-text search term, e.g. `RELIANCE stock`
    pub term: String,
    pub max_results: usize,
}

impl NewsQuery {
    /// Build the query for a ticker. The search term is the part of the
    /// symbol before the exchange suffix followed by ` stock`.
    pub fn for_symbol(symbol: &str, max_results: usize) -> Self {
        let base = symbol.split('.').next().unwrap_or(symbol);
        Self {
            symbol: symbol.to_string(),
            term: format!("{base} stock"),
            max_results,
        }
    }
}

/// Publish time as delivered by a provider, before parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishedAt {
    /// RFC 2822 style text, e.g. `Sat, 27 Sep 2025 00:00:00 GMT`
    Text(String),
    /// UNIX seconds
    Unix(i64),
}

/// Article as delivered by a news provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub publisher: String,
    pub published: Option<PublishedAt>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_strips_exchange_suffix() {
        let query = NewsQuery::for_symbol("RELIANCE.NS", 10);
        assert_eq!(query.symbol, "RELIANCE.NS");
        assert_eq!(query.term, "RELIANCE stock");

        let query = NewsQuery::for_symbol("AAPL", 5);
        assert_eq!(query.term, "AAPL stock");
        assert_eq!(query.max_results, 5);
    }
}
