//! Date windows around a news event
//!
//! A [`DateWindow`] holds the two user-adjustable spans (days before and
//! days after the anchor date). [`recompute`] applies a window to a
//! [`PriceSeries`] and yields the [`VisibleRange`]: the inclusive,
//! contiguous run of points between `anchor - days_before` and
//! `anchor + days_after`.

use crate::models::{PricePoint, PriceSeries};
use crate::render::{EventChart, Renderer};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Smallest value a window control accepts
pub const MIN_WINDOW_DAYS: u32 = 1;
/// Largest value a window control accepts
pub const MAX_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_DAYS_BEFORE: u32 = 30;
pub const DEFAULT_DAYS_AFTER: u32 = 15;

/// Days shown before and after the anchor date, each in `[1, 90]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    days_before: u32,
    days_after: u32,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            days_before: DEFAULT_DAYS_BEFORE,
            days_after: DEFAULT_DAYS_AFTER,
        }
    }
}

impl DateWindow {
    /// Window with both values clamped into range
    pub fn new(days_before: u32, days_after: u32) -> Self {
        Self {
            days_before: clamp_days(days_before),
            days_after: clamp_days(days_after),
        }
    }

    pub fn days_before(&self) -> u32 {
        self.days_before
    }

    pub fn days_after(&self) -> u32 {
        self.days_after
    }

    /// Set days before the anchor, clamped. Returns the stored value.
    pub fn set_days_before(&mut self, days: u32) -> u32 {
        self.days_before = clamp_days(days);
        self.days_before
    }

    /// Set days after the anchor, clamped. Returns the stored value.
    pub fn set_days_after(&mut self, days: u32) -> u32 {
        self.days_after = clamp_days(days);
        self.days_after
    }
}

fn clamp_days(days: u32) -> u32 {
    days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS)
}

/// Read-only view of the points inside a date window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    points: &'a [PricePoint],
}

impl<'a> VisibleRange<'a> {
    pub fn points(&self) -> &'a [PricePoint] {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PricePoint> {
        self.points.to_vec()
    }
}

/// Points of `series` with `anchor - days_before <= date <= anchor + days_after`.
///
/// Accepts any day counts; dates past the calendar limits saturate. The
/// series is only borrowed, so calling this repeatedly with the same
/// arguments always yields the same range.
pub fn recompute(
    series: &PriceSeries,
    anchor: NaiveDate,
    days_before: u32,
    days_after: u32,
) -> VisibleRange<'_> {
    let start = anchor
        .checked_sub_days(Days::new(u64::from(days_before)))
        .unwrap_or(NaiveDate::MIN);
    let end = anchor
        .checked_add_days(Days::new(u64::from(days_after)))
        .unwrap_or(NaiveDate::MAX);

    let points = series.points();
    // series dates are strictly ascending
    let lo = points.partition_point(|p| p.date < start);
    let hi = points.partition_point(|p| p.date <= end);

    VisibleRange {
        start,
        end,
        points: &points[lo..hi.max(lo)],
    }
}

/// Window state for one correlation view, anchored on a news date
#[derive(Debug, Clone)]
pub struct DateWindowSelector {
    symbol: String,
    anchor: NaiveDate,
    window: DateWindow,
}

impl DateWindowSelector {
    pub fn new(symbol: impl Into<String>, anchor: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            anchor,
            window: DateWindow::default(),
        }
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn window_mut(&mut self) -> &mut DateWindow {
        &mut self.window
    }

    /// Chart title naming the ticker
    pub fn title(&self) -> String {
        format!("Price Trend Around News Event ({})", self.symbol)
    }

    /// Visible range of `series` under the current window
    pub fn visible<'a>(&self, series: &'a PriceSeries) -> VisibleRange<'a> {
        recompute(
            series,
            self.anchor,
            self.window.days_before(),
            self.window.days_after(),
        )
    }

    /// Redraw the event chart for `series`.
    ///
    /// An empty visible range draws nothing and leaves the previous chart in
    /// place. Returns whether a frame was drawn.
    pub fn refresh<R: Renderer + ?Sized>(
        &self,
        view_id: u64,
        headline: &str,
        series: &PriceSeries,
        renderer: &mut R,
    ) -> bool {
        let range = self.visible(series);
        if range.is_empty() {
            tracing::debug!(
                "No points between {} and {} for {}, keeping previous chart",
                range.start,
                range.end,
                self.symbol
            );
            return false;
        }

        renderer.show_event_chart(&EventChart {
            view_id,
            title: self.title(),
            headline,
            anchor: self.anchor,
            window: self.window,
            range,
        });
        true
    }
}
