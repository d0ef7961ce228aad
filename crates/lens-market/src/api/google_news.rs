//! Google News RSS search client

use crate::api::{NewsQuery, NewsSource, PublishedAt, RawArticle};
use crate::error::{LensError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";

/// Compiled element patterns for RSS items
struct FeedPatterns {
    item: Regex,
    title: Regex,
    link: Regex,
    pub_date: Regex,
    source: Regex,
}

impl FeedPatterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| LensError::FeedError(format!("Invalid pattern: {e}")))
        };
        Ok(Self {
            item: compile(r"(?s)<item>(.*?)</item>")?,
            title: compile(r"(?s)<title>(.*?)</title>")?,
            link: compile(r"(?s)<link>(.*?)</link>")?,
            pub_date: compile(r"(?s)<pubDate>(.*?)</pubDate>")?,
            source: compile(r"(?s)<source[^>]*>(.*?)</source>")?,
        })
    }

    fn articles(&self, xml: &str) -> Vec<RawArticle> {
        self.item
            .captures_iter(xml)
            .filter_map(|item| {
                let body = item.get(1)?.as_str();
                let title = capture_text(&self.title, body)?;
                let url = capture_text(&self.link, body)?;
                let published = capture_text(&self.pub_date, body).map(PublishedAt::Text);
                let publisher = capture_text(&self.source, body).unwrap_or_default();
                Some(RawArticle {
                    title,
                    publisher,
                    published,
                    url,
                })
            })
            .collect()
    }
}

/// Google News client searching the public RSS feed
pub struct GoogleNewsClient {
    client: Client,
    language: String,
    country: String,
    patterns: FeedPatterns,
}

impl GoogleNewsClient {
    /// Create a new client for a feed edition, e.g. `en` / `IN`
    pub fn new(language: impl Into<String>, country: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            language: language.into(),
            country: country.into(),
            patterns: FeedPatterns::new()?,
        })
    }

    /// Search URL for a term in this client's edition
    pub fn search_url(&self, term: &str) -> Result<Url> {
        let hl = format!("{}-{}", self.language, self.country);
        let ceid = format!("{}:{}", self.country, self.language);
        Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[
                ("q", term),
                ("hl", hl.as_str()),
                ("gl", self.country.as_str()),
                ("ceid", ceid.as_str()),
            ],
        )
        .map_err(|e| LensError::FeedError(format!("Invalid search URL: {e}")))
    }

    /// Fetch the feed for a term and return at most `limit` articles
    pub async fn search_term(&self, term: &str, limit: usize) -> Result<Vec<RawArticle>> {
        let url = self.search_url(term)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LensError::ApiError(format!("Google News request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(LensError::ApiError(format!("Google News error {status}")));
        }

        let body = response.text().await?;
        let mut articles = self.patterns.articles(&body);
        articles.truncate(limit);
        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for GoogleNewsClient {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>> {
        self.search_term(&query.term, query.max_results).await
    }

    fn name(&self) -> &'static str {
        "Google News"
    }
}

/// Extract articles from an RSS document in feed order.
///
/// Items without a title or link are skipped; a missing publish date is kept
/// as `None` and left for the fetch boundary to reject.
pub fn parse_feed(xml: &str) -> Result<Vec<RawArticle>> {
    Ok(FeedPatterns::new()?.articles(xml))
}

fn capture_text(re: &Regex, body: &str) -> Option<String> {
    let raw = re.captures(body)?.get(1)?.as_str().trim();
    let text = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(raw);
    let text = unescape(text.trim());
    (!text.is_empty()).then_some(text)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
