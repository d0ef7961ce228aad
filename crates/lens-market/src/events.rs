//! Completion messages sent from background fetches to the UI loop

use crate::models::{NewsItem, PriceSeries, Quote};
use tokio::sync::mpsc::UnboundedSender;

/// Identifier of an open correlation view
pub type ViewId = u64;

/// Sending half of the UI event queue
pub type EventSender = UnboundedSender<AppEvent>;

/// What triggered a primary load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Symbol typed by the user
    Search,
    /// Symbol picked from the popular list
    QuickPick,
    /// Auto-refresh tick
    AutoRefresh,
}

impl FetchOrigin {
    /// Failures of user-initiated loads raise a notification
    pub fn notifies_on_failure(self) -> bool {
        !matches!(self, Self::AutoRefresh)
    }
}

/// Work completed off the UI loop, applied by `Dashboard::handle_event`
#[derive(Debug, Clone)]
pub enum AppEvent {
    Quote {
        generation: u64,
        quote: Quote,
    },
    History {
        generation: u64,
        series: PriceSeries,
    },
    News {
        generation: u64,
        symbol: String,
        items: Vec<NewsItem>,
    },
    /// Every part of a primary load has been delivered
    Loaded {
        generation: u64,
        symbol: String,
    },
    LoadFailed {
        generation: u64,
        symbol: String,
        origin: FetchOrigin,
    },
    /// Auto-refresh interval elapsed for `symbol`
    RefreshTick {
        symbol: String,
    },
    /// One-off history fetch of a correlation view finished
    AnalysisHistory {
        view_id: ViewId,
        series: PriceSeries,
    },
}

impl AppEvent {
    /// Request generation of primary-load events
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Quote { generation, .. }
            | Self::History { generation, .. }
            | Self::News { generation, .. }
            | Self::Loaded { generation, .. }
            | Self::LoadFailed { generation, .. } => Some(*generation),
            Self::RefreshTick { .. } | Self::AnalysisHistory { .. } => None,
        }
    }
}
