#![forbid(unsafe_code)]

//! Step-based scroller runner.
//!
//! [`ScrollerRunner`] drives an [`InfiniteScroller`] without threads or
//! blocking I/O. The host delivers input with [`push_event`], advances time
//! with [`step`], performs the fetches it collects from
//! [`take_fetch_requests`], and reports each result through
//! [`complete_fetch`]:
//!
//! ```text
//! host frame / timer
//!   -> push_event(Event)          // scroll, pan, measure
//!   -> step(now)                  // drain events, fire due timers
//!   -> take_fetch_requests()      // perform each, then
//!   -> complete_fetch(id, result) // render the page
//! ```
//!
//! All input carries monotonic host timestamps, so replaying the same event
//! stream and the same fetch results reproduces the same item list.
//!
//! [`push_event`]: ScrollerRunner::push_event
//! [`step`]: ScrollerRunner::step
//! [`take_fetch_requests`]: ScrollerRunner::take_fetch_requests
//! [`complete_fetch`]: ScrollerRunner::complete_fetch

use infiniscroll_core::{Event, FetchDirection};
use infiniscroll_widgets::{
    FetchOutcome, FetchRequest, InfiniteScroller, ItemTemplate, PageResult, RenderReport,
    RequestId, ScrollerConfig, ScrollerError, SwipeResolution, TransportError,
};
use std::collections::VecDeque;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of a single [`ScrollerRunner::step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Number of queued events processed in this step.
    pub events_processed: u32,
    /// Fetch requests added to the pending list.
    pub fetches_issued: u32,
    /// Dismissed items detached.
    pub items_removed: u32,
    /// Snap-backs that finished.
    pub swipes_settled: u32,
    /// Whether the scroll position was evaluated.
    pub evaluated: bool,
    /// Whether the scroller has been destroyed.
    pub destroyed: bool,
}

/// Monotonic clock for hosts that do not supply their own timestamps.
///
/// Backed by `web_time`, so it reads `performance.now()` on wasm and
/// `std::time::Instant` elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct HostClock {
    origin: web_time::Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// ---------------------------------------------------------------------------
// ScrollerRunner
// ---------------------------------------------------------------------------

/// Step-based driver for one scroller.
#[derive(Debug)]
pub struct ScrollerRunner<R> {
    scroller: InfiniteScroller<R>,
    initialized: bool,
    /// Buffered events and the host time they were observed at.
    event_queue: VecDeque<(Event, Duration)>,
    /// Requests waiting for the host to perform them.
    pending_fetches: Vec<FetchRequest>,
    /// Requests handed to the host and not yet completed.
    outstanding: Vec<RequestId>,
}

impl<R> ScrollerRunner<R> {
    /// Wrap an existing scroller. Nothing is fetched until [`init`](Self::init).
    #[must_use]
    pub fn new(scroller: InfiniteScroller<R>) -> Self {
        Self {
            scroller,
            initialized: false,
            event_queue: VecDeque::new(),
            pending_fetches: Vec::new(),
            outstanding: Vec::new(),
        }
    }

    /// Validate `config` and build a runner around a fresh scroller.
    pub fn from_config(
        config: ScrollerConfig,
        template: impl ItemTemplate<R> + 'static,
    ) -> Result<Self, ScrollerError> {
        InfiniteScroller::new(config, template).map(Self::new)
    }

    /// Issue the initial load.
    ///
    /// Calling it again is harmless: the scroller refuses a second initial
    /// load while the first is in flight, and continues forward afterwards.
    pub fn init(&mut self) -> StepResult {
        self.initialized = true;
        let mut result = StepResult::default();
        let outcome = self.scroller.start();
        self.enqueue_fetch(outcome, &mut result);
        result.destroyed = self.scroller.is_destroyed();
        result
    }

    // -- Event delivery -----------------------------------------------------

    /// Buffer a single event observed at `at` for the next `step`.
    pub fn push_event(&mut self, event: Event, at: Duration) {
        self.event_queue.push_back((event, at));
    }

    /// Buffer multiple timestamped events.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = (Event, Duration)>) {
        self.event_queue.extend(events);
    }

    // -- Step ---------------------------------------------------------------

    /// Process buffered events, then fire every timer due at `now`.
    pub fn step(&mut self, now: Duration) -> StepResult {
        if !self.initialized || self.scroller.is_destroyed() {
            self.event_queue.clear();
            return StepResult {
                destroyed: self.scroller.is_destroyed(),
                ..StepResult::default()
            };
        }

        let span = tracing::debug_span!("runner.step", now_ms = now.as_millis() as u64);
        let _guard = span.enter();

        let mut result = StepResult::default();
        while let Some((event, at)) = self.event_queue.pop_front() {
            self.handle_event(event, at);
            result.events_processed += 1;
        }

        let tick = self.scroller.tick(now);
        result.evaluated = tick.evaluated;
        result.items_removed = tick.removed.len() as u32;
        result.swipes_settled = tick.settled.len() as u32;
        for req in tick.fetches {
            self.push_request(req, &mut result);
        }

        if result.events_processed > 0 || !tick.removed.is_empty() || result.fetches_issued > 0 {
            tracing::debug!(
                events = result.events_processed,
                fetches = result.fetches_issued,
                removed = result.items_removed,
                "step"
            );
        }
        result
    }

    /// Handle one event immediately, then fire timers due at `now`.
    pub fn step_event(&mut self, event: Event, now: Duration) -> StepResult {
        self.push_event(event, now);
        self.step(now)
    }

    // -- Fetches ------------------------------------------------------------

    /// Hand every pending request to the host.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        let taken = std::mem::take(&mut self.pending_fetches);
        self.outstanding.extend(taken.iter().map(|r| r.id));
        taken
    }

    /// Requests not yet taken by the host.
    #[must_use]
    pub fn pending_fetches(&self) -> &[FetchRequest] {
        &self.pending_fetches
    }

    /// Report the result of a fetch.
    ///
    /// Also accepts requests that were never taken; they are dropped from
    /// the pending list.
    pub fn complete_fetch(
        &mut self,
        id: RequestId,
        result: Result<PageResult<R>, TransportError>,
    ) -> Result<RenderReport, ScrollerError> {
        self.pending_fetches.retain(|r| r.id != id);
        self.outstanding.retain(|&r| r != id);
        self.scroller.complete_fetch(id, result)
    }

    /// Ask for the next page in `direction` outside the scroll trigger.
    pub fn request_fetch(&mut self, direction: FetchDirection) -> StepResult {
        let mut result = StepResult::default();
        if self.initialized {
            let outcome = self.scroller.begin_fetch(direction);
            self.enqueue_fetch(outcome, &mut result);
        }
        result.destroyed = self.scroller.is_destroyed();
        result
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Destroy the scroller and drop queued input. Idempotent.
    pub fn destroy(&mut self) {
        self.event_queue.clear();
        self.scroller.destroy();
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of buffered events awaiting processing.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Requests taken by the host and not yet completed.
    #[must_use]
    pub fn outstanding(&self) -> &[RequestId] {
        &self.outstanding
    }

    /// When the host should call [`step`](Self::step) next, if a timer is
    /// pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scroller.next_deadline()
    }

    #[must_use]
    pub fn scroller(&self) -> &InfiniteScroller<R> {
        &self.scroller
    }

    pub fn scroller_mut(&mut self) -> &mut InfiniteScroller<R> {
        &mut self.scroller
    }

    // -- Internal -----------------------------------------------------------

    fn handle_event(&mut self, event: Event, at: Duration) {
        match event {
            Event::Scroll(metrics) => self.scroller.on_scroll(metrics, at),
            Event::Pan(pan) => {
                if self.scroller.on_pan(&pan, at) == SwipeResolution::Ignored {
                    tracing::trace!(target_node = %pan.target, "pan ignored");
                }
            }
            Event::Measure { target, width } => {
                self.scroller.on_measure(target, width);
            }
        }
    }

    fn enqueue_fetch(&mut self, outcome: FetchOutcome, result: &mut StepResult) {
        if let FetchOutcome::Requested(req) = outcome {
            self.push_request(req, result);
        }
    }

    fn push_request(&mut self, req: FetchRequest, result: &mut StepResult) {
        self.pending_fetches.push(req);
        result.fetches_issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infiniscroll_core::{PanEvent, ScrollMetrics};
    use infiniscroll_widgets::{Element, Fragment, PageToken};

    fn template(fragment: &mut Fragment, n: &u32) {
        fragment.push(Element::new("article").with_attr("data-id", format!("item-{n}")));
    }

    fn runner() -> ScrollerRunner<u32> {
        ScrollerRunner::from_config(ScrollerConfig::new("#list", "/messages"), template).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn page(range: std::ops::Range<u32>, token: &str) -> PageResult<u32> {
        PageResult::new(range.collect(), Some(PageToken::new(token)))
    }

    #[test]
    fn init_issues_initial_load() {
        let mut r = runner();
        let result = r.init();
        assert_eq!(result.fetches_issued, 1);
        assert!(r.is_initialized());
        let reqs = r.take_fetch_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].url, "/messages");
        assert_eq!(r.outstanding(), [reqs[0].id]);
        assert!(r.pending_fetches().is_empty());
    }

    #[test]
    fn step_before_init_does_nothing() {
        let mut r = runner();
        r.push_event(Event::Scroll(ScrollMetrics::new(0.0, 100.0, 100.0)), ms(0));
        assert_eq!(r.step(ms(100)), StepResult::default());
        assert_eq!(r.pending_events(), 0);
    }

    #[test]
    fn buffered_events_drain_on_step() {
        let mut r = runner();
        r.init();
        let req = r.take_fetch_requests().remove(0);
        r.complete_fetch(req.id, Ok(page(0..10, "T1"))).unwrap();
        assert!(r.outstanding().is_empty());

        for t in [0, 5, 10] {
            r.push_event(Event::Scroll(ScrollMetrics::new(1500.0, 2000.0, 400.0)), ms(t));
        }
        assert_eq!(r.pending_events(), 3);
        let result = r.step(ms(10));
        assert_eq!(result.events_processed, 3);
        assert_eq!(result.fetches_issued, 0);
        assert_eq!(r.next_deadline(), Some(ms(30)));

        let result = r.step(ms(30));
        assert!(result.evaluated);
        assert_eq!(result.fetches_issued, 1);
        assert_eq!(r.pending_fetches()[0].url, "/messages?pageToken=T1");
    }

    #[test]
    fn pan_and_measure_reach_the_scroller() {
        let mut r = runner();
        r.init();
        let req = r.take_fetch_requests().remove(0);
        let report = r.complete_fetch(req.id, Ok(page(0..10, "T1"))).unwrap();
        let target = report.inserted[0];

        r.push_event(Event::Measure { target, width: 200.0 }, ms(0));
        r.push_event(Event::Pan(PanEvent::ended(target, 120.0)), ms(0));
        r.step(ms(0));
        assert!(r.scroller().dismissed().is_dismissed("item-0"));

        let result = r.step(ms(1000));
        assert_eq!(result.items_removed, 1);
        // Nine items is under the low-water mark, but no scroll metrics were
        // ever reported, so nothing is evaluated.
        assert!(!result.evaluated);
    }

    #[test]
    fn request_fetch_respects_in_flight_guard() {
        let mut r = runner();
        r.init();
        assert_eq!(r.request_fetch(FetchDirection::Forward).fetches_issued, 0);
        assert_eq!(r.pending_fetches().len(), 1);
    }

    #[test]
    fn completing_untaken_request_clears_it() {
        let mut r = runner();
        r.init();
        let id = r.pending_fetches()[0].id;
        r.complete_fetch(id, Err(TransportError::new("offline")))
            .unwrap_err();
        assert!(r.pending_fetches().is_empty());
        // The failure freed the slot; the initial load can be retried.
        assert_eq!(r.init().fetches_issued, 1);
    }

    #[test]
    fn destroy_drops_queued_input() {
        let mut r = runner();
        r.init();
        r.push_event(Event::Scroll(ScrollMetrics::default()), ms(0));
        r.destroy();
        assert_eq!(r.pending_events(), 0);
        let result = r.step(ms(100));
        assert!(result.destroyed);
        assert_eq!(result.events_processed, 0);
        r.destroy();
    }

    #[test]
    fn host_clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
