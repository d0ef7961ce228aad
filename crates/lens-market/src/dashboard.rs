//! Top-level controller of the viewer
//!
//! The dashboard owns all view state and is only touched from the UI loop.
//! Fetches run as fire-and-forget tasks and report back through an event
//! queue which the UI loop drains with [`Dashboard::drain_events`] or
//! awaits with [`Dashboard::next_event`].
//!
//! Concurrent loads are last-writer-wins: whichever completion arrives last
//! is what the main view shows. With `discard_stale_results` set, results
//! from superseded requests are dropped instead.

use crate::config::LensConfig;
use crate::correlation::CorrelationView;
use crate::events::{AppEvent, EventSender, FetchOrigin, ViewId};
use crate::models::{Lookback, NewsItem, PriceSeries, Quote};
use crate::provider::MarketData;
use crate::refresh::{RefreshDriver, RefreshState};
use crate::render::Renderer;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Session values owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_symbol: Option<String>,
    auto_refresh: bool,
    generation: u64,
}

impl Session {
    pub fn current_symbol(&self) -> Option<&str> {
        self.current_symbol.as_deref()
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Generation of the most recently issued primary load
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Data currently shown by the main view
#[derive(Debug, Clone, Default)]
pub struct MainView {
    pub quote: Option<Quote>,
    pub history: PriceSeries,
    pub news: Vec<NewsItem>,
}

/// Controller for the main view, its correlation views and auto-refresh
pub struct Dashboard<R: Renderer> {
    config: Arc<LensConfig>,
    market: Arc<MarketData>,
    renderer: R,
    session: Session,
    main: MainView,
    views: BTreeMap<ViewId, CorrelationView>,
    next_view_id: ViewId,
    events_tx: EventSender,
    events_rx: UnboundedReceiver<AppEvent>,
    refresh: RefreshDriver,
}

impl<R: Renderer> Dashboard<R> {
    pub fn new(config: LensConfig, market: MarketData, renderer: R) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let refresh = RefreshDriver::new(config.refresh_interval);

        let mut dashboard = Self {
            config: Arc::new(config),
            market: Arc::new(market),
            renderer,
            session: Session::default(),
            main: MainView::default(),
            views: BTreeMap::new(),
            next_view_id: 1,
            events_tx,
            events_rx,
            refresh,
        };

        let example = dashboard
            .config
            .popular_symbols
            .first()
            .map_or("RELIANCE.NS", String::as_str)
            .to_string();
        dashboard
            .renderer
            .show_status(&format!("Ready - Enter a stock symbol to begin (e.g., {example})"));
        dashboard
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn main_view(&self) -> &MainView {
        &self.main
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn popular_symbols(&self) -> &[String] {
        &self.config.popular_symbols
    }

    pub fn news_provider_name(&self) -> &'static str {
        self.market.news_provider_name()
    }

    /// Start loading a typed symbol. Returns the request generation.
    pub fn search(&mut self, input: &str) -> Option<u64> {
        self.search_with_origin(input, FetchOrigin::Search)
    }

    /// Load the `index`-th popular symbol (0-based)
    pub fn quick_search(&mut self, index: usize) -> Option<u64> {
        let Some(symbol) = self.config.popular_symbols.get(index).cloned() else {
            self.renderer
                .show_status(&format!("No popular symbol #{}", index + 1));
            return None;
        };
        self.search_with_origin(&symbol, FetchOrigin::QuickPick)
    }

    fn search_with_origin(&mut self, input: &str, origin: FetchOrigin) -> Option<u64> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            self.renderer.notify("Warning", "Please enter a stock symbol.");
            return None;
        }

        self.session.current_symbol = Some(symbol.clone());
        self.publish_refresh_state();
        if self.session.auto_refresh {
            self.refresh.ensure_running(self.events_tx.clone());
        }

        self.renderer
            .show_status(&format!("Loading data for {symbol}..."));
        Some(self.start_load(symbol, origin))
    }

    /// Spawn the quote → (history, news) pipeline for `symbol`
    fn start_load(&mut self, symbol: String, origin: FetchOrigin) -> u64 {
        self.session.generation += 1;
        let generation = self.session.generation;
        let market = Arc::clone(&self.market);
        let lookback = self.config.history_lookback;
        let events = self.events_tx.clone();

        tracing::info!("Loading {} (generation {}, {:?})", symbol, generation, origin);
        tokio::spawn(load_symbol(market, symbol, lookback, generation, origin, events));
        generation
    }

    /// Turn auto-refresh on or off
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.session.auto_refresh = enabled;
        self.publish_refresh_state();

        match (enabled, self.session.current_symbol.clone()) {
            (true, Some(symbol)) => {
                self.refresh.ensure_running(self.events_tx.clone());
                let secs = self.refresh.interval().as_secs();
                self.renderer.show_status(&format!(
                    "Auto-refresh enabled for {symbol}. Updating every {secs} seconds."
                ));
            }
            (true, None) => {
                self.renderer
                    .show_status("Auto-refresh enabled. Select a stock to start updates.");
            }
            (false, _) => self.renderer.show_status("Auto-refresh disabled."),
        }
    }

    fn publish_refresh_state(&self) {
        self.refresh.publish(RefreshState {
            enabled: self.session.auto_refresh,
            symbol: self.session.current_symbol.clone(),
        });
    }

    pub fn is_refresh_running(&self) -> bool {
        self.refresh.is_running()
    }

    /// Open a correlation view for the `news_index`-th item (0-based) of the
    /// news list.
    pub fn open_analysis(&mut self, news_index: usize) -> Option<ViewId> {
        let Some(symbol) = self.session.current_symbol.clone() else {
            self.renderer.notify("Info", "No stock selected.");
            return None;
        };
        let Some(item) = self.main.news.get(news_index).cloned() else {
            self.renderer
                .show_status(&format!("No news item #{}", news_index + 1));
            return None;
        };

        let id = self.next_view_id;
        self.next_view_id += 1;

        let view = CorrelationView::open(
            id,
            symbol,
            item,
            Arc::clone(&self.market),
            self.config.analysis_lookback,
            self.events_tx.clone(),
            &mut self.renderer,
        );
        self.views.insert(id, view);
        Some(id)
    }

    pub fn view(&self, id: ViewId) -> Option<&CorrelationView> {
        self.views.get(&id)
    }

    pub fn views(&self) -> impl Iterator<Item = &CorrelationView> {
        self.views.values()
    }

    /// Days-before control of a view changed
    pub fn set_days_before(&mut self, id: ViewId, days: u32) -> bool {
        match self.views.get_mut(&id) {
            Some(view) => view.set_days_before(days, &mut self.renderer),
            None => self.unknown_view(id),
        }
    }

    /// Days-after control of a view changed
    pub fn set_days_after(&mut self, id: ViewId, days: u32) -> bool {
        match self.views.get_mut(&id) {
            Some(view) => view.set_days_after(days, &mut self.renderer),
            None => self.unknown_view(id),
        }
    }

    pub fn close_analysis(&mut self, id: ViewId) -> bool {
        if self.views.remove(&id).is_some() {
            self.renderer.close_view(id);
            true
        } else {
            self.unknown_view(id)
        }
    }

    fn unknown_view(&mut self, id: ViewId) -> bool {
        self.renderer.show_status(&format!("No analysis view #{id}"));
        false
    }

    /// Apply every queued completion. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion without applying it
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    /// Apply one completion to the view state
    pub fn handle_event(&mut self, event: AppEvent) {
        if self.is_stale(&event) {
            tracing::debug!("Discarding stale result {:?}", event.generation());
            return;
        }

        match event {
            AppEvent::Quote { quote, .. } => {
                self.renderer.show_quote(&quote);
                self.main.quote = Some(quote);
            }
            AppEvent::History { series, .. } => {
                self.renderer.show_history(series.symbol(), &series);
                self.main.history = series;
            }
            AppEvent::News { symbol, items, .. } => {
                self.renderer.show_news(&symbol, &items);
                self.main.news = items;
            }
            AppEvent::Loaded { symbol, .. } => {
                let provider = self.market.news_provider_name();
                self.renderer.show_status(&format!(
                    "Displaying data for {symbol} | Prices from Yahoo Finance, news from {provider}."
                ));
            }
            AppEvent::LoadFailed { symbol, origin, .. } => {
                self.renderer.show_status(&format!(
                    "Failed to load data for {symbol}. Check the symbol and try again."
                ));
                if origin.notifies_on_failure() {
                    self.renderer.notify(
                        "Error",
                        &format!(
                            "Could not find data for symbol '{symbol}'.\n\
                             For Indian stocks, use the '.NS' (NSE) or '.BO' (BSE) suffix."
                        ),
                    );
                }
            }
            AppEvent::RefreshTick { symbol } => {
                if self.session.auto_refresh
                    && self.session.current_symbol.as_deref() == Some(symbol.as_str())
                {
                    self.start_load(symbol, FetchOrigin::AutoRefresh);
                }
            }
            AppEvent::AnalysisHistory { view_id, series } => match self.views.get_mut(&view_id) {
                Some(view) => {
                    view.load(series, &mut self.renderer);
                }
                None => tracing::debug!("View {} closed before its history arrived", view_id),
            },
        }
    }

    fn is_stale(&self, event: &AppEvent) -> bool {
        self.config.discard_stale_results
            && event
                .generation()
                .is_some_and(|generation| generation < self.session.generation)
    }

    /// Stop auto-refresh before exit
    pub fn shutdown(&mut self) {
        self.session.auto_refresh = false;
        self.publish_refresh_state();
    }
}

async fn load_symbol(
    market: Arc<MarketData>,
    symbol: String,
    lookback: Lookback,
    generation: u64,
    origin: FetchOrigin,
    events: EventSender,
) {
    let Some(quote) = market.get_quote(&symbol).await else {
        let _ = events.send(AppEvent::LoadFailed {
            generation,
            symbol,
            origin,
        });
        return;
    };
    let _ = events.send(AppEvent::Quote { generation, quote });

    let (series, items) = tokio::join!(
        market.get_history(&symbol, lookback),
        market.get_news(&symbol),
    );
    let _ = events.send(AppEvent::History { generation, series });
    let _ = events.send(AppEvent::News {
        generation,
        symbol: symbol.clone(),
        items,
    });
    let _ = events.send(AppEvent::Loaded { generation, symbol });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewsQuery, NewsSource, PriceSource, PublishedAt, RawArticle};
    use crate::error::{LensError, Result};
    use crate::models::DailyBar;
    use crate::render::{Frame, Recorder};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    /// Price source with a per-symbol latency and call counter
    #[derive(Default)]
    struct ScriptedPrices {
        delays: HashMap<String, Duration>,
        closes: HashMap<String, f64>,
        calls: AtomicUsize,
    }

    impl ScriptedPrices {
        fn with(mut self, symbol: &str, close: f64, delay_ms: u64) -> Self {
            self.closes.insert(symbol.to_string(), close);
            self.delays
                .insert(symbol.to_string(), Duration::from_millis(delay_ms));
            self
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedPrices {
        async fn daily_bars(&self, symbol: &str, _lookback: Lookback) -> Result<Vec<DailyBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(symbol) {
                tokio::time::sleep(*delay).await;
            }
            let close = self
                .closes
                .get(symbol)
                .copied()
                .ok_or_else(|| LensError::InvalidSymbol(symbol.to_string()))?;
            let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap_or_default();
            Ok(start
                .iter_days()
                .take(10)
                .enumerate()
                .map(|(i, date)| DailyBar {
                    date,
                    close: close + i as f64,
                    volume: 1_000,
                })
                .collect())
        }
    }

    struct StaticNews;

    #[async_trait]
    impl NewsSource for StaticNews {
        async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>> {
            Ok(vec![RawArticle {
                title: format!("{} update", query.symbol),
                publisher: "Wire".to_string(),
                published: Some(PublishedAt::Text("Fri, 14 Jun 2024 08:00:00 GMT".to_string())),
                url: "https://example.com/news".to_string(),
            }])
        }

        fn name(&self) -> &'static str {
            "Static"
        }
    }

    fn dashboard(prices: ScriptedPrices, config: LensConfig) -> (Dashboard<Recorder>, Arc<ScriptedPrices>) {
        let prices = Arc::new(prices);
        let market = MarketData::new(prices.clone(), Arc::new(StaticNews));
        (Dashboard::new(config, market, Recorder::new()), prices)
    }

    /// Apply events until `done` holds or a second passes
    async fn pump_until<F>(dash: &mut Dashboard<Recorder>, mut done: F)
    where
        F: FnMut(&Dashboard<Recorder>) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while !done(&*dash) {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match timeout(remaining, dash.next_event()).await {
                Ok(Some(event)) => dash.handle_event(event),
                _ => panic!("timed out waiting for dashboard events"),
            }
        }
    }

    fn loaded_count(dash: &Dashboard<Recorder>) -> usize {
        dash.renderer()
            .statuses()
            .iter()
            .filter(|s| s.starts_with("Displaying data for"))
            .count()
    }

    #[test]
    fn test_ready_status() {
        let (dash, _) = dashboard(ScriptedPrices::default(), LensConfig::default());
        assert_eq!(
            dash.renderer().last_status(),
            Some("Ready - Enter a stock symbol to begin (e.g., RELIANCE.NS)")
        );
    }

    #[tokio::test]
    async fn test_search_loads_everything() {
        let prices = ScriptedPrices::default().with("TCS.NS", 3900.0, 0);
        let (mut dash, _) = dashboard(prices, LensConfig::default());

        assert_eq!(dash.search("  tcs.ns "), Some(1));
        assert_eq!(dash.session().current_symbol(), Some("TCS.NS"));
        assert_eq!(dash.renderer().last_status(), Some("Loading data for TCS.NS..."));

        pump_until(&mut dash, |d| loaded_count(d) == 1).await;

        let main = dash.main_view();
        assert_eq!(main.quote.as_ref().map(|q| q.symbol.as_str()), Some("TCS.NS"));
        assert_eq!(main.history.len(), 10);
        assert_eq!(main.news.len(), 1);
        assert_eq!(
            dash.renderer().last_status(),
            Some("Displaying data for TCS.NS | Prices from Yahoo Finance, news from Static.")
        );
    }

    #[tokio::test]
    async fn test_empty_input_warns() {
        let (mut dash, prices) = dashboard(ScriptedPrices::default(), LensConfig::default());
        assert_eq!(dash.search("   "), None);
        assert_eq!(dash.renderer().notifications(), 1);
        assert_eq!(dash.session().current_symbol(), None);
        assert_eq!(prices.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_search_notifies() {
        let (mut dash, _) = dashboard(ScriptedPrices::default(), LensConfig::default());
        dash.search("NOPE");

        pump_until(&mut dash, |d| d.renderer().notifications() == 1).await;
        assert_eq!(
            dash.renderer().last_status(),
            Some("Failed to load data for NOPE. Check the symbol and try again.")
        );
        let Some(Frame::Notify { message, .. }) = dash.renderer().frames.last() else {
            panic!("expected a notification");
        };
        assert!(message.contains("'.NS' (NSE)"));
    }

    #[tokio::test]
    async fn test_last_completion_wins() {
        // A is slow, B is fast: B completes first, A last
        let prices = ScriptedPrices::default()
            .with("AAA", 10.0, 150)
            .with("BBB", 20.0, 5);
        let (mut dash, _) = dashboard(prices, LensConfig::default());

        dash.search("AAA");
        dash.search("BBB");
        pump_until(&mut dash, |d| loaded_count(d) == 2).await;

        let quote = dash.main_view().quote.as_ref().unwrap();
        assert_eq!(quote.symbol, "AAA");
        assert_eq!(dash.renderer().last_quote().unwrap().symbol, "AAA");
        assert_eq!(dash.session().current_symbol(), Some("BBB"));
    }

    #[tokio::test]
    async fn test_stale_results_discarded_when_enabled() {
        let prices = ScriptedPrices::default()
            .with("AAA", 10.0, 150)
            .with("BBB", 20.0, 5);
        let config = LensConfig::builder()
            .discard_stale_results(true)
            .build()
            .unwrap();
        let (mut dash, _) = dashboard(prices, config);

        dash.search("AAA");
        dash.search("BBB");
        pump_until(&mut dash, |d| loaded_count(d) == 1).await;
        // give the slow load time to arrive and be dropped
        tokio::time::sleep(Duration::from_millis(300)).await;
        dash.drain_events();

        assert_eq!(dash.main_view().quote.as_ref().unwrap().symbol, "BBB");
        assert_eq!(loaded_count(&dash), 1);
    }

    #[tokio::test]
    async fn test_quick_search() {
        let prices = ScriptedPrices::default().with("INFY.NS", 1500.0, 0);
        let (mut dash, _) = dashboard(prices, LensConfig::default());

        assert!(dash.quick_search(3).is_some());
        assert_eq!(dash.session().current_symbol(), Some("INFY.NS"));
        assert!(dash.quick_search(42).is_none());
        assert_eq!(dash.renderer().last_status(), Some("No popular symbol #43"));
    }

    #[tokio::test]
    async fn test_auto_refresh_reloads_current_symbol() {
        let prices = ScriptedPrices::default().with("TCS.NS", 3900.0, 0);
        let config = LensConfig::builder()
            .refresh_interval(Duration::from_millis(20))
            .build()
            .unwrap();
        let (mut dash, prices) = dashboard(prices, config);

        dash.search("TCS.NS");
        pump_until(&mut dash, |d| loaded_count(d) == 1).await;

        dash.set_auto_refresh(true);
        assert!(dash.is_refresh_running());
        assert!(dash.session().auto_refresh());
        pump_until(&mut dash, |d| loaded_count(d) >= 3).await;
        // quote + history per load
        assert!(prices.calls.load(Ordering::SeqCst) >= 6);
        assert_eq!(dash.renderer().notifications(), 0);

        dash.set_auto_refresh(false);
        assert_eq!(dash.renderer().last_status(), Some("Auto-refresh disabled."));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!dash.is_refresh_running());
    }

    #[tokio::test]
    async fn test_auto_refresh_failure_is_quiet() {
        let prices = ScriptedPrices::default().with("TCS.NS", 3900.0, 0);
        let config = LensConfig::builder()
            .refresh_interval(Duration::from_millis(20))
            .build()
            .unwrap();
        let (mut dash, _) = dashboard(prices, config);

        dash.search("GONE");
        pump_until(&mut dash, |d| d.renderer().notifications() == 1).await;

        dash.set_auto_refresh(true);
        pump_until(&mut dash, |d| {
            d.renderer()
                .statuses()
                .iter()
                .filter(|s| s.starts_with("Failed to load"))
                .count()
                >= 2
        })
        .await;
        assert_eq!(dash.renderer().notifications(), 1);
        dash.shutdown();
    }

    #[tokio::test]
    async fn test_auto_refresh_without_symbol_waits() {
        let (mut dash, _) = dashboard(ScriptedPrices::default(), LensConfig::default());
        dash.set_auto_refresh(true);
        assert!(!dash.is_refresh_running());
        assert_eq!(
            dash.renderer().last_status(),
            Some("Auto-refresh enabled. Select a stock to start updates.")
        );
    }

    #[tokio::test]
    async fn test_open_analysis_requires_symbol() {
        let (mut dash, _) = dashboard(ScriptedPrices::default(), LensConfig::default());
        assert_eq!(dash.open_analysis(0), None);
        let Some(Frame::Notify { message, .. }) = dash.renderer().frames.last() else {
            panic!("expected a notification");
        };
        assert_eq!(message, "No stock selected.");
    }

    #[tokio::test]
    async fn test_analysis_view_lifecycle() {
        let prices = ScriptedPrices::default().with("TCS.NS", 3900.0, 0);
        let (mut dash, prices) = dashboard(prices, LensConfig::default());

        dash.search("TCS.NS");
        pump_until(&mut dash, |d| loaded_count(d) == 1).await;
        let calls_before = prices.calls.load(Ordering::SeqCst);

        let id = dash.open_analysis(0).unwrap();
        assert_eq!(dash.open_analysis(5), None);
        pump_until(&mut dash, |d| !d.renderer().event_frames(id).is_empty()).await;
        assert!(dash.view(id).unwrap().is_loaded());
        assert_eq!(prices.calls.load(Ordering::SeqCst), calls_before + 1);

        assert!(dash.set_days_before(id, 2));
        assert!(dash.set_days_after(id, 90));
        assert_eq!(dash.renderer().event_frames(id).len(), 3);
        assert_eq!(prices.calls.load(Ordering::SeqCst), calls_before + 1);

        assert!(dash.close_analysis(id));
        assert!(!dash.set_days_before(id, 5));
        assert_eq!(dash.renderer().last_status(), Some("No analysis view #1"));
        assert_eq!(dash.views().count(), 0);
    }

    #[tokio::test]
    async fn test_closed_view_ignores_late_history() {
        let prices = ScriptedPrices::default().with("TCS.NS", 3900.0, 0);
        let (mut dash, _) = dashboard(prices, LensConfig::default());
        dash.search("TCS.NS");
        pump_until(&mut dash, |d| loaded_count(d) == 1).await;

        let id = dash.open_analysis(0).unwrap();
        dash.close_analysis(id);
        tokio::time::sleep(Duration::from_millis(50)).await;
        dash.drain_events();
        assert!(dash.renderer().event_frames(id).is_empty());
    }
}
