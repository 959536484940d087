#![forbid(unsafe_code)]

//! Debounced edge-proximity detection.
//!
//! [`ScrollDebouncer`] collapses a burst of scroll events into one trailing
//! evaluation; [`ScrollTrigger`] turns the surviving metrics into a fetch
//! direction. Debouncing only thins redundant calls; overlapping fetches are
//! refused by the scroller's in-flight guard, not here.

use crate::page_tokens::PageId;
use infiniscroll_core::{FetchDirection, ScrollMetrics};
use std::time::Duration;

/// Default trailing debounce delay.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(20);

/// Default distance from an edge, in pixels, that counts as "near".
pub const DEFAULT_TRIGGER_DISTANCE: f64 = 400.0;

// ---------------------------------------------------------------------------
// ScrollDebouncer
// ---------------------------------------------------------------------------

/// Trailing-edge debouncer over scroll metrics.
///
/// Every [`push`](Self::push) restarts the quiet period; [`poll`](Self::poll)
/// yields the most recent metrics once `delay` has elapsed since the last
/// push, then resets.
#[derive(Debug, Clone)]
pub struct ScrollDebouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    last_event_at: Duration,
    metrics: ScrollMetrics,
    coalesced: u32,
}

impl Default for ScrollDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl ScrollDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a scroll event observed at `now`.
    pub fn push(&mut self, metrics: ScrollMetrics, now: Duration) {
        let coalesced = self.pending.map_or(0, |p| p.coalesced) + 1;
        self.pending = Some(Pending {
            last_event_at: now,
            metrics,
            coalesced,
        });
    }

    /// Metrics to evaluate, if the quiet period has elapsed.
    ///
    /// Returns the metrics and how many events were collapsed into them.
    pub fn poll(&mut self, now: Duration) -> Option<(ScrollMetrics, u32)> {
        let pending = self.pending?;
        if now.saturating_sub(pending.last_event_at) < self.delay {
            return None;
        }
        self.pending = None;
        Some((pending.metrics, pending.coalesced))
    }

    /// When the pending evaluation becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|p| p.last_event_at + self.delay)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending evaluation.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

// ---------------------------------------------------------------------------
// ScrollTrigger
// ---------------------------------------------------------------------------

/// Decides whether the viewport is close enough to an edge to fetch.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTrigger {
    trigger_distance: f64,
    low_water: usize,
}

impl ScrollTrigger {
    /// `low_water`: below this many rendered items, always prefer forward.
    /// `0` leaves edge proximity as the only trigger.
    #[must_use]
    pub fn new(trigger_distance: f64, low_water: usize) -> Self {
        Self {
            trigger_distance,
            low_water,
        }
    }

    #[must_use]
    pub fn trigger_distance(&self) -> f64 {
        self.trigger_distance
    }

    /// Pick a direction for `metrics`, or `None` when no edge is near.
    ///
    /// Forward wins when both edges are near (short content). Backward is
    /// only proposed when the earliest rendered page is past page 1, since
    /// there is nothing before it otherwise.
    #[must_use]
    pub fn evaluate(
        &self,
        metrics: &ScrollMetrics,
        rendered: usize,
        earliest_page: Option<PageId>,
    ) -> Option<FetchDirection> {
        if metrics.distance_to_bottom() <= self.trigger_distance || rendered < self.low_water {
            return Some(FetchDirection::Forward);
        }
        if metrics.scroll_top <= self.trigger_distance && earliest_page.is_some_and(|p| p > 1) {
            return Some(FetchDirection::Backward);
        }
        None
    }
}
