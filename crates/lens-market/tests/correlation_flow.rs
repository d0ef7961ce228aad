//! End-to-end flow: search, open a news item, move the window

use async_trait::async_trait;
use chrono::NaiveDate;
use lens_market::api::{NewsQuery, NewsSource, PriceSource, PublishedAt, RawArticle};
use lens_market::models::DailyBar;
use lens_market::{
    Dashboard, DateWindow, Frame, LensConfig, LensError, Lookback, MarketData, PriceSeries,
    Recorder, Result, recompute,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Every calendar day of 2024 for known symbols, an error otherwise
#[derive(Default)]
struct Year2024 {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for Year2024 {
    async fn daily_bars(&self, symbol: &str, _lookback: Lookback) -> Result<Vec<DailyBar>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol != "HDFCBANK.NS" {
            return Err(LensError::InvalidSymbol(symbol.to_string()));
        }
        Ok(day(2024, 1, 1)
            .iter_days()
            .take_while(|d| *d <= day(2024, 12, 31))
            .enumerate()
            .map(|(i, date)| DailyBar {
                date,
                close: 1500.0 + i as f64,
                volume: 10_000,
            })
            .collect())
    }
}

struct Headlines;

#[async_trait]
impl NewsSource for Headlines {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>> {
        assert_eq!(query.term, "HDFCBANK stock");
        Ok(vec![
            RawArticle {
                title: "HDFC Bank Q1 update".to_string(),
                publisher: "Mint".to_string(),
                published: Some(PublishedAt::Text("Sat, 15 Jun 2024 10:15:00 GMT".to_string())),
                url: "https://example.com/q1".to_string(),
            },
            RawArticle {
                title: "Undated rumour".to_string(),
                publisher: "Blog".to_string(),
                published: Some(PublishedAt::Text("yesterday".to_string())),
                url: "https://example.com/rumour".to_string(),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "Headlines"
    }
}

async fn pump(dash: &mut Dashboard<Recorder>, until: impl Fn(&Dashboard<Recorder>) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !until(&*dash) {
            match dash.next_event().await {
                Some(event) => dash.handle_event(event),
                None => break,
            }
        }
    })
    .await
    .expect("dashboard did not settle");
}

fn event_bounds(frame: &Frame) -> (Option<NaiveDate>, Option<NaiveDate>, usize) {
    match frame {
        Frame::Event {
            first, last, points, ..
        } => (*first, *last, *points),
        other => panic!("not an event frame: {other:?}"),
    }
}

#[tokio::test]
async fn test_news_window_flow() {
    let prices = Arc::new(Year2024::default());
    let market = MarketData::new(prices.clone(), Arc::new(Headlines));
    let mut dash = Dashboard::new(LensConfig::default(), market, Recorder::new());

    dash.search("hdfcbank.ns");
    pump(&mut dash, |d| {
        d.renderer()
            .last_status()
            .is_some_and(|s| s.starts_with("Displaying data for HDFCBANK.NS"))
    })
    .await;

    // the unparseable item is dropped
    assert_eq!(dash.main_view().news.len(), 1);
    assert_eq!(dash.main_view().history.len(), 366);

    let id = dash.open_analysis(0).unwrap();
    pump(&mut dash, |d| !d.renderer().event_frames(id).is_empty()).await;
    let fetches = prices.calls.load(Ordering::SeqCst);

    let frames = dash.renderer().event_frames(id);
    assert_eq!(
        event_bounds(frames[0]),
        (Some(day(2024, 5, 16)), Some(day(2024, 6, 30)), 46)
    );

    dash.set_days_before(id, 90);
    dash.set_days_after(id, 90);
    let frames = dash.renderer().event_frames(id);
    assert_eq!(
        event_bounds(frames.last().unwrap()),
        (Some(day(2024, 3, 17)), Some(day(2024, 9, 13)), 181)
    );

    // out-of-range inputs are clamped by the controls
    dash.set_days_before(id, 0);
    dash.set_days_after(id, 10_000);
    assert_eq!(dash.view(id).unwrap().window(), DateWindow::new(1, 90));

    assert_eq!(prices.calls.load(Ordering::SeqCst), fetches);
    assert!(dash.close_analysis(id));
}

#[tokio::test]
async fn test_unknown_symbol_reports_failure() {
    let market = MarketData::new(Arc::new(Year2024::default()), Arc::new(Headlines));
    let mut dash = Dashboard::new(LensConfig::default(), market, Recorder::new());

    dash.search("NOSUCH");
    pump(&mut dash, |d| d.renderer().notifications() > 0).await;

    assert!(dash.main_view().quote.is_none());
    assert_eq!(
        dash.renderer().last_status(),
        Some("Failed to load data for NOSUCH. Check the symbol and try again.")
    );
}

#[test]
fn test_recompute_is_pure() {
    let series = PriceSeries::new(
        "TCS.NS",
        day(2024, 6, 1)
            .iter_days()
            .take(30)
            .map(|d| lens_market::PricePoint::new(d, 3900.0))
            .collect(),
    );
    let before = series.clone();

    let first = recompute(&series, day(2024, 6, 15), 3, 2).to_vec();
    let second = recompute(&series, day(2024, 6, 15), 3, 2).to_vec();

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert_eq!(series, before);
}
