//! Fetch boundary between the upstream providers and the views
//!
//! Everything past this point only ever sees "got data" or "got nothing":
//! provider errors are logged and turned into `None` or empty collections.

use crate::api::{
    FinnhubClient, GoogleNewsClient, NewsQuery, NewsSource, PriceSource, PublishedAt, RawArticle,
    YahooFinanceClient,
};
use crate::config::{LensConfig, NewsProvider};
use crate::error::{LensError, Result};
use crate::models::{Lookback, NewsItem, PriceSeries, Quote};
use chrono::{DateTime, Local, NaiveDateTime};
use std::sync::Arc;

/// Publish-time format used by the Google News feed
const FEED_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Quote, history and news access for the views
pub struct MarketData {
    prices: Arc<dyn PriceSource>,
    news: Arc<dyn NewsSource>,
    max_news_results: usize,
}

impl MarketData {
    pub fn new(prices: Arc<dyn PriceSource>, news: Arc<dyn NewsSource>) -> Self {
        Self {
            prices,
            news,
            max_news_results: LensConfig::default().max_news_results,
        }
    }

    /// Wire up Yahoo Finance and the configured news provider
    pub fn from_config(config: &LensConfig) -> Result<Self> {
        let news: Arc<dyn NewsSource> = match config.news_provider {
            NewsProvider::GoogleNews => Arc::new(GoogleNewsClient::new(
                config.news_language.clone(),
                config.news_country.clone(),
                config.request_timeout,
            )?),
            NewsProvider::Finnhub => {
                let key = config.finnhub_api_key.clone().ok_or_else(|| {
                    LensError::ConfigError("Finnhub API key is not set".to_string())
                })?;
                Arc::new(FinnhubClient::new(
                    key,
                    config.finnhub_rate_limit,
                    config.request_timeout,
                )?)
            }
        };

        Ok(Self::new(Arc::new(YahooFinanceClient::new()), news)
            .with_max_news_results(config.max_news_results))
    }

    pub fn with_max_news_results(mut self, max: usize) -> Self {
        self.max_news_results = max;
        self
    }

    pub fn news_provider_name(&self) -> &'static str {
        self.news.name()
    }

    /// Latest snapshot, `None` when the symbol is unknown or the fetch failed
    pub async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        match self.prices.daily_bars(symbol, Lookback::FiveDays).await {
            Ok(bars) => {
                let quote = Quote::from_bars(symbol, &bars, Local::now().naive_local());
                if quote.is_none() {
                    tracing::warn!("Not enough bars for a quote of {}", symbol);
                }
                quote
            }
            Err(e) => {
                tracing::warn!("Error fetching stock data for {}: {}", symbol, e);
                None
            }
        }
    }

    /// Close-price series, empty on failure
    pub async fn get_history(&self, symbol: &str, lookback: Lookback) -> PriceSeries {
        match self.prices.daily_bars(symbol, lookback).await {
            Ok(bars) => PriceSeries::from_bars(symbol, &bars),
            Err(e) => {
                tracing::warn!("Error fetching historical data for {}: {}", symbol, e);
                PriceSeries::empty(symbol)
            }
        }
    }

    /// News for a ticker in provider order. Articles whose publish time
    /// cannot be parsed are dropped.
    pub async fn get_news(&self, symbol: &str) -> Vec<NewsItem> {
        let query = NewsQuery::for_symbol(symbol, self.max_news_results);

        match self.news.search(&query).await {
            Ok(articles) => articles
                .into_iter()
                .filter_map(into_news_item)
                .take(self.max_news_results)
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "Error fetching news from {} for {}: {}",
                    self.news.name(),
                    symbol,
                    e
                );
                Vec::new()
            }
        }
    }
}

fn into_news_item(article: RawArticle) -> Option<NewsItem> {
    let Some(published_at) = article.published.as_ref().and_then(parse_published) else {
        tracing::debug!("Dropping article without a usable publish time: {}", article.title);
        return None;
    };

    Some(NewsItem {
        title: article.title,
        source: article.publisher,
        published_at,
        link: article.url,
    })
}

/// Parse a provider timestamp into a naive UTC date-time
pub fn parse_published(published: &PublishedAt) -> Option<NaiveDateTime> {
    match published {
        PublishedAt::Text(text) => NaiveDateTime::parse_from_str(text.trim(), FEED_TIME_FORMAT).ok(),
        PublishedAt::Unix(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.naive_utc()),
    }
}
