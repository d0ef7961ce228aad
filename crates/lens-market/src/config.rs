//! Configuration for the market viewer

use crate::error::{LensError, Result};
use crate::models::Lookback;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable selecting the news provider
pub const NEWS_PROVIDER_ENV: &str = "TICKERLENS_NEWS_PROVIDER";
/// Environment variable holding the Finnhub API key
pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";

/// Popular NSE tickers offered for quick picks
pub const DEFAULT_POPULAR_SYMBOLS: [&str; 5] =
    ["RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS"];

/// News provider backing the news list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsProvider {
    /// Google News RSS search (default, no API key required)
    #[default]
    GoogleNews,
    /// Finnhub company news (requires API key)
    Finnhub,
}

impl FromStr for NewsProvider {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "googlenews" | "google-news" => Ok(Self::GoogleNews),
            "finnhub" => Ok(Self::Finnhub),
            other => Err(LensError::ConfigError(format!(
                "Unknown news provider: {other}"
            ))),
        }
    }
}

/// Configuration for fetching and viewing market data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LensConfig {
    /// Lookback of the main history series
    pub history_lookback: Lookback,

    /// Lookback fetched once per correlation view
    pub analysis_lookback: Lookback,

    /// Auto-refresh polling interval
    pub refresh_interval: Duration,

    /// News provider to query
    pub news_provider: NewsProvider,

    /// Finnhub API key (optional)
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,

    /// News feed language, e.g. `en`
    pub news_language: String,

    /// News feed country, e.g. `IN`
    pub news_country: String,

    /// Maximum number of news items shown
    pub max_news_results: usize,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Tickers offered as quick picks
    pub popular_symbols: Vec<String>,

    /// Currency symbol shown in front of prices
    pub currency_symbol: String,

    /// Drop completions from superseded searches instead of last-writer-wins
    pub discard_stale_results: bool,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            history_lookback: Lookback::OneYear,
            analysis_lookback: Lookback::OneYear,
            refresh_interval: Duration::from_secs(30),
            news_provider: NewsProvider::GoogleNews,
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
            news_language: "en".to_string(),
            news_country: "IN".to_string(),
            max_news_results: 10,
            request_timeout: Duration::from_secs(30),
            popular_symbols: DEFAULT_POPULAR_SYMBOLS.iter().map(ToString::to_string).collect(),
            currency_symbol: "₹".to_string(),
            discard_stale_results: false,
        }
    }
}

impl LensConfig {
    /// Create a new configuration builder
    pub fn builder() -> LensConfigBuilder {
        LensConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.news_provider == NewsProvider::Finnhub && self.finnhub_api_key.is_none() {
            return Err(LensError::ConfigError(
                "Finnhub API key required when using the Finnhub news provider".to_string(),
            ));
        }

        if self.refresh_interval.is_zero() {
            return Err(LensError::ConfigError(
                "refresh_interval must be greater than 0".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 {
            return Err(LensError::ConfigError(
                "finnhub_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.max_news_results == 0 {
            return Err(LensError::ConfigError(
                "max_news_results must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for LensConfig
#[derive(Debug, Default)]
pub struct LensConfigBuilder {
    history_lookback: Option<Lookback>,
    analysis_lookback: Option<Lookback>,
    refresh_interval: Option<Duration>,
    news_provider: Option<NewsProvider>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
    news_language: Option<String>,
    news_country: Option<String>,
    max_news_results: Option<usize>,
    request_timeout: Option<Duration>,
    popular_symbols: Option<Vec<String>>,
    currency_symbol: Option<String>,
    discard_stale_results: Option<bool>,
    env_error: Option<String>,
}

impl LensConfigBuilder {
    pub fn history_lookback(mut self, lookback: Lookback) -> Self {
        self.history_lookback = Some(lookback);
        self
    }

    pub fn analysis_lookback(mut self, lookback: Lookback) -> Self {
        self.analysis_lookback = Some(lookback);
        self
    }

    /// Set the auto-refresh interval
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn news_provider(mut self, provider: NewsProvider) -> Self {
        self.news_provider = Some(provider);
        self
    }

    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Set the news feed edition, e.g. `("en", "US")`
    pub fn news_edition(mut self, language: impl Into<String>, country: impl Into<String>) -> Self {
        self.news_language = Some(language.into());
        self.news_country = Some(country.into());
        self
    }

    pub fn max_news_results(mut self, max: usize) -> Self {
        self.max_news_results = Some(max);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn popular_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.popular_symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = Some(symbol.into());
        self
    }

    pub fn discard_stale_results(mut self, discard: bool) -> Self {
        self.discard_stale_results = Some(discard);
        self
    }

    /// Load the Finnhub API key from environment
    pub fn with_env_finnhub_key(mut self) -> Self {
        if let Ok(key) = std::env::var(FINNHUB_API_KEY_ENV) {
            self.finnhub_api_key = Some(key);
        }
        self
    }

    /// Load the news provider from environment
    pub fn with_env_news_provider(mut self) -> Self {
        if let Ok(value) = std::env::var(NEWS_PROVIDER_ENV) {
            match value.parse() {
                Ok(provider) => self.news_provider = Some(provider),
                Err(e) => self.env_error = Some(format!("{NEWS_PROVIDER_ENV}: {e}")),
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<LensConfig> {
        if let Some(message) = self.env_error {
            return Err(LensError::ConfigError(message));
        }

        let defaults = LensConfig::default();

        let config = LensConfig {
            history_lookback: self.history_lookback.unwrap_or(defaults.history_lookback),
            analysis_lookback: self.analysis_lookback.unwrap_or(defaults.analysis_lookback),
            refresh_interval: self.refresh_interval.unwrap_or(defaults.refresh_interval),
            news_provider: self.news_provider.unwrap_or(defaults.news_provider),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            news_language: self.news_language.unwrap_or(defaults.news_language),
            news_country: self.news_country.unwrap_or(defaults.news_country),
            max_news_results: self.max_news_results.unwrap_or(defaults.max_news_results),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            popular_symbols: self.popular_symbols.unwrap_or(defaults.popular_symbols),
            currency_symbol: self.currency_symbol.unwrap_or(defaults.currency_symbol),
            discard_stale_results: self
                .discard_stale_results
                .unwrap_or(defaults.discard_stale_results),
        };

        config.validate()?;
        Ok(config)
    }
}
