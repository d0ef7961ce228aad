//! Stock quotes, history and news with news-to-price correlation views
//!
//! This crate holds everything behind the viewer except the drawing:
//!
//! - Fetching quotes and daily history from Yahoo Finance
//! - Fetching news from Google News RSS search or Finnhub
//! - A fetch boundary ([`MarketData`]) that turns provider errors into empty
//!   results
//! - The date-window selector that slices a price series around a news date
//! - Correlation views that fetch once and re-slice on every window change
//! - The auto-refresh polling loop
//!
//! # Architecture
//!
//! [`Dashboard`] is the controller. It is driven from a single UI loop, spawns
//! fetches on the tokio runtime and applies their results from an event
//! queue. Drawing goes through the [`Renderer`] trait; [`Recorder`] is a
//! renderer that only records frames.
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_market::{Dashboard, LensConfig, MarketData, Recorder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = LensConfig::builder().with_env_news_provider().build()?;
//!     let market = MarketData::from_config(&config)?;
//!     let mut dashboard = Dashboard::new(config, market, Recorder::new());
//!
//!     dashboard.search("RELIANCE.NS");
//!     while let Some(event) = dashboard.next_event().await {
//!         dashboard.handle_event(event);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod models;
pub mod provider;
pub mod refresh;
pub mod render;
pub mod window;

pub use commands::Command;
pub use config::{LensConfig, NewsProvider};
pub use correlation::CorrelationView;
pub use dashboard::{Dashboard, MainView, Session};
pub use error::{LensError, Result};
pub use events::{AppEvent, FetchOrigin, ViewId};
pub use models::{Lookback, NewsItem, PricePoint, PriceSeries, Quote};
pub use provider::MarketData;
pub use render::{EventChart, Frame, Recorder, Renderer};
pub use window::{DateWindow, DateWindowSelector, VisibleRange, recompute};
