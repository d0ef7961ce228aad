//! Auto-refresh polling loop
//!
//! The dashboard publishes the auto-refresh flag and the current ticker
//! through a watch channel. The loop sleeps for one interval, reads the
//! latest state and, if still enabled with a ticker selected, asks the UI
//! loop to reload that ticker. It exits as soon as it finds the flag off.

use crate::events::{AppEvent, EventSender};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// State read by the loop at each cycle boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshState {
    pub enabled: bool,
    pub symbol: Option<String>,
}

impl RefreshState {
    /// Ticker to refresh, if the loop should keep going
    pub fn active_symbol(&self) -> Option<&str> {
        if self.enabled {
            self.symbol.as_deref()
        } else {
            None
        }
    }
}

/// Owner of the polling task
pub struct RefreshDriver {
    interval: Duration,
    state: watch::Sender<RefreshState>,
    task: Option<JoinHandle<()>>,
}

impl RefreshDriver {
    pub fn new(interval: Duration) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self {
            interval,
            state,
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replace the state seen by the loop on its next wake-up
    pub fn publish(&self, state: RefreshState) {
        self.state.send_replace(state);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start the loop unless one is still alive. Returns whether a new loop
    /// was spawned.
    pub fn ensure_running(&mut self, events: EventSender) -> bool {
        if self.is_running() {
            return false;
        }

        let receiver = self.state.subscribe();
        self.task = Some(tokio::spawn(run_refresh_loop(
            self.interval,
            receiver,
            events,
        )));
        tracing::debug!("Auto-refresh loop started ({:?})", self.interval);
        true
    }
}

impl Drop for RefreshDriver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_refresh_loop(
    interval: Duration,
    state: watch::Receiver<RefreshState>,
    events: EventSender,
) {
    loop {
        tokio::time::sleep(interval).await;

        let symbol = state.borrow().active_symbol().map(ToString::to_string);
        let Some(symbol) = symbol else {
            tracing::debug!("Auto-refresh loop stopped");
            break;
        };

        tracing::debug!("Auto-refresh tick for {}", symbol);
        if events.send(AppEvent::RefreshTick { symbol }).is_err() {
            break;
        }
    }
}
