//! Rendering seam between the controllers and the presentation layer
//!
//! The controllers decide *what* is on screen; a [`Renderer`] decides how it
//! looks. The terminal front end implements this trait, and [`Recorder`]
//! keeps a log of frames for headless runs and tests.

use crate::models::{NewsItem, PriceSeries, Quote};
use crate::window::{DateWindow, VisibleRange};
use chrono::NaiveDate;

/// Event-window chart of one correlation view
#[derive(Debug, Clone)]
pub struct EventChart<'a> {
    pub view_id: u64,
    pub title: String,
    /// Headline of the news item the view was opened for
    pub headline: &'a str,
    /// Date of the event marker line
    pub anchor: NaiveDate,
    pub window: DateWindow,
    pub range: VisibleRange<'a>,
}

/// Presentation layer driven by the dashboard
pub trait Renderer {
    /// Latest price snapshot
    fn show_quote(&mut self, quote: &Quote);

    /// Full-range history; an empty series shows the placeholder
    fn show_history(&mut self, symbol: &str, series: &PriceSeries);

    /// News list; an empty list shows the placeholder
    fn show_news(&mut self, symbol: &str, items: &[NewsItem]);

    /// Status line text
    fn show_status(&mut self, message: &str);

    /// Blocking notification for failures the user must acknowledge
    fn notify(&mut self, title: &str, message: &str);

    /// A correlation view was opened
    fn open_view(&mut self, view_id: u64, title: &str, headline: &str);

    /// A correlation view was closed
    fn close_view(&mut self, view_id: u64);

    /// Redraw a correlation view's event chart
    fn show_event_chart(&mut self, chart: &EventChart<'_>);
}

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Quote(Quote),
    History {
        symbol: String,
        points: usize,
    },
    News {
        symbol: String,
        titles: Vec<String>,
    },
    Status(String),
    Notify {
        title: String,
        message: String,
    },
    ViewOpened {
        view_id: u64,
        title: String,
    },
    ViewClosed(u64),
    Event {
        view_id: u64,
        title: String,
        headline: String,
        anchor: NaiveDate,
        window: DateWindow,
        first: Option<NaiveDate>,
        last: Option<NaiveDate>,
        points: usize,
    },
}

/// Renderer that records every call
#[derive(Debug, Default)]
pub struct Recorder {
    pub frames: Vec<Frame>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Status(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses().pop()
    }

    pub fn last_quote(&self) -> Option<&Quote> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Quote(q) => Some(q),
            _ => None,
        })
    }

    pub fn notifications(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f, Frame::Notify { .. }))
            .count()
    }

    /// Event frames drawn for one view, oldest first
    pub fn event_frames(&self, view_id: u64) -> Vec<&Frame> {
        self.frames
            .iter()
            .filter(|f| matches!(f, Frame::Event { view_id: id, .. } if *id == view_id))
            .collect()
    }
}

impl Renderer for Recorder {
    fn show_quote(&mut self, quote: &Quote) {
        self.frames.push(Frame::Quote(quote.clone()));
    }

    fn show_history(&mut self, symbol: &str, series: &PriceSeries) {
        self.frames.push(Frame::History {
            symbol: symbol.to_string(),
            points: series.len(),
        });
    }

    fn show_news(&mut self, symbol: &str, items: &[NewsItem]) {
        self.frames.push(Frame::News {
            symbol: symbol.to_string(),
            titles: items.iter().map(|i| i.title.clone()).collect(),
        });
    }

    fn show_status(&mut self, message: &str) {
        self.frames.push(Frame::Status(message.to_string()));
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.frames.push(Frame::Notify {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn open_view(&mut self, view_id: u64, title: &str, _headline: &str) {
        self.frames.push(Frame::ViewOpened {
            view_id,
            title: title.to_string(),
        });
    }

    fn close_view(&mut self, view_id: u64) {
        self.frames.push(Frame::ViewClosed(view_id));
    }

    fn show_event_chart(&mut self, chart: &EventChart<'_>) {
        let points = chart.range.points();
        self.frames.push(Frame::Event {
            view_id: chart.view_id,
            title: chart.title.clone(),
            headline: chart.headline.to_string(),
            anchor: chart.anchor,
            window: chart.window,
            first: points.first().map(|p| p.date),
            last: points.last().map(|p| p.date),
            points: points.len(),
        });
    }
}
