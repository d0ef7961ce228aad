//! News-to-price correlation views
//!
//! A view is opened for one ticker and one news item. It fetches a single
//! wide history series in the background, then answers every window change
//! from that in-memory series without fetching again.

use crate::events::{AppEvent, EventSender, ViewId};
use crate::models::{Lookback, NewsItem, PriceSeries};
use crate::provider::MarketData;
use crate::render::Renderer;
use crate::window::{DateWindow, DateWindowSelector, VisibleRange};
use std::sync::Arc;

/// One open correlation view
#[derive(Debug)]
pub struct CorrelationView {
    id: ViewId,
    symbol: String,
    item: NewsItem,
    selector: DateWindowSelector,
    series: Option<PriceSeries>,
}

impl CorrelationView {
    /// View with the default window and no series yet
    pub fn new(id: ViewId, symbol: impl Into<String>, item: NewsItem) -> Self {
        let symbol = symbol.into();
        let selector = DateWindowSelector::new(symbol.clone(), item.anchor_date());
        Self {
            id,
            symbol,
            item,
            selector,
            series: None,
        }
    }

    /// Open a view and start its one history fetch.
    ///
    /// The fetch runs on the runtime; its result comes back as
    /// [`AppEvent::AnalysisHistory`] and must be applied with [`Self::load`]
    /// on the UI loop.
    pub fn open<R: Renderer + ?Sized>(
        id: ViewId,
        symbol: impl Into<String>,
        item: NewsItem,
        market: Arc<MarketData>,
        lookback: Lookback,
        events: EventSender,
        renderer: &mut R,
    ) -> Self {
        let view = Self::new(id, symbol, item);
        renderer.open_view(id, &view.title(), &view.item.title);

        let symbol = view.symbol.clone();
        tokio::spawn(async move {
            let series = market.get_history(&symbol, lookback).await;
            tracing::debug!("Analysis history for view {} ready ({} points)", id, series.len());
            // receiver gone means the application is shutting down
            let _ = events.send(AppEvent::AnalysisHistory { view_id: id, series });
        });

        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn item(&self) -> &NewsItem {
        &self.item
    }

    pub fn window(&self) -> DateWindow {
        self.selector.window()
    }

    pub fn series(&self) -> Option<&PriceSeries> {
        self.series.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.series.is_some()
    }

    /// Window title
    pub fn title(&self) -> String {
        format!("News Impact Analysis for {}", self.symbol)
    }

    /// Points currently inside the window, empty before the series arrives
    pub fn visible(&self) -> Option<VisibleRange<'_>> {
        self.series.as_ref().map(|s| self.selector.visible(s))
    }

    /// Store the fetched series and draw the initial window.
    ///
    /// An empty series is kept (so the view does not refetch) but nothing
    /// is drawn.
    pub fn load<R: Renderer + ?Sized>(&mut self, series: PriceSeries, renderer: &mut R) -> bool {
        if series.is_empty() {
            tracing::info!("No history for {}, correlation view {} stays empty", self.symbol, self.id);
        }
        self.series = Some(series);
        self.rerender(renderer)
    }

    /// Change the days shown before the anchor and redraw
    pub fn set_days_before<R: Renderer + ?Sized>(&mut self, days: u32, renderer: &mut R) -> bool {
        self.selector.window_mut().set_days_before(days);
        self.rerender(renderer)
    }

    /// Change the days shown after the anchor and redraw
    pub fn set_days_after<R: Renderer + ?Sized>(&mut self, days: u32, renderer: &mut R) -> bool {
        self.selector.window_mut().set_days_after(days);
        self.rerender(renderer)
    }

    /// Redraw from the in-memory series. Returns whether a frame was drawn.
    pub fn rerender<R: Renderer + ?Sized>(&self, renderer: &mut R) -> bool {
        match &self.series {
            Some(series) if !series.is_empty() => {
                self.selector
                    .refresh(self.id, &self.item.title, series, renderer)
            }
            _ => false,
        }
    }
}
