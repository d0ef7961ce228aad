//! Finnhub company-news client

use crate::api::{NewsQuery, NewsSource, PublishedAt, RawArticle};
use crate::error::{LensError, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const COMPANY_NEWS_ENDPOINT: &str = "https://finnhub.io/api/v1/company-news";

/// Days of company news requested per lookup
const NEWS_WINDOW_DAYS: i64 = 7;

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    /// News headline
    pub headline: String,
    /// News source
    pub source: String,
    /// Article URL
    pub url: String,
}

impl From<FinnhubNewsArticle> for RawArticle {
    fn from(article: FinnhubNewsArticle) -> Self {
        Self {
            title: article.headline,
            publisher: article.source,
            published: (article.datetime > 0).then_some(PublishedAt::Unix(article.datetime)),
            url: article.url,
        }
    }
}

/// Finnhub client for the company news API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN.saturating_add(59));
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Get company news for a specific symbol between two dates (inclusive)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(COMPANY_NEWS_ENDPOINT)
            .query(&[
                ("symbol", symbol),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LensError::ApiError(format!("Finnhub request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LensError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| LensError::ApiError(format!("Failed to parse Finnhub response: {e}")))
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(NEWS_WINDOW_DAYS);

        let articles = self.get_company_news(&query.symbol, from, to).await?;
        Ok(articles
            .into_iter()
            .take(query.max_results)
            .map(RawArticle::from)
            .collect())
    }

    fn name(&self) -> &'static str {
        "Finnhub"
    }
}
