#![forbid(unsafe_code)]

//! Fetch orchestration.
//!
//! [`InfiniteScroller`] owns the rendered items, the page-token index, the
//! eviction window, the scroll debouncer and the swipe state. The host feeds
//! it input ([`on_scroll`](InfiniteScroller::on_scroll),
//! [`on_pan`](InfiniteScroller::on_pan), [`tick`](InfiniteScroller::tick))
//! and performs every [`FetchRequest`] it emits, reporting back through
//! [`complete_fetch`](InfiniteScroller::complete_fetch).
//!
//! # Fetch lifecycle
//!
//! ```text
//! begin_fetch(dir) --origin cursor--------------> Skipped(NoFurtherPage)
//!        |         --same dir in flight---------> Skipped(InFlight)
//!        v
//!   Requested(req)   [edge loader shown]
//!        |
//! complete_fetch(req.id, result)   [edge loader hidden, slot freed]
//!        |--Err(transport)--> nothing else changes, retry derives same cursor
//!        |--template error--> nothing else changes
//!        `--ok--> evict, insert, tokens[cursor.page_id + 1] = page token
//! ```
//!
//! Forward and backward fetches may overlap; each has its own slot and each
//! render is applied atomically.

use crate::config::ScrollerConfig;
use crate::error::{ScrollerError, TransportError};
use crate::eviction::EvictionWindow;
use crate::item_list::ItemList;
use crate::page_tokens::{Cursor, PageTokenIndex};
use crate::render_sink::{ItemTemplate, PageResult, RenderReport, RenderSink};
use crate::scroll_trigger::{ScrollDebouncer, ScrollTrigger};
use crate::swipe_dismiss::{DismissedItems, SwipeDismisser, SwipePhase, SwipeResolution};
use infiniscroll_core::{FetchDirection, NodeId, PanEvent, ScrollMetrics};
use std::fmt;
use std::time::Duration;

/// Identifies one issued fetch. Ids increase monotonically per scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch the host must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub direction: FetchDirection,
    /// The page this request loads and the token used to load it.
    pub cursor: Cursor,
    pub url: String,
}

/// Why [`InfiniteScroller::begin_fetch`] did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No page is known beyond the rendered edge.
    NoFurtherPage,
    /// A fetch in the same direction has not completed yet.
    InFlight(RequestId),
    Destroyed,
}

/// Result of [`InfiniteScroller::begin_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Requested(FetchRequest),
    Skipped(SkipReason),
}

impl FetchOutcome {
    /// The issued request, if any.
    #[must_use]
    pub fn request(&self) -> Option<&FetchRequest> {
        match self {
            Self::Requested(req) => Some(req),
            Self::Skipped(_) => None,
        }
    }

    #[must_use]
    pub fn into_request(self) -> Option<FetchRequest> {
        match self {
            Self::Requested(req) => Some(req),
            Self::Skipped(_) => None,
        }
    }
}

/// Blocking fetch collaborator.
pub trait PageSource<R> {
    /// Fetch and decode the page at `url`.
    fn fetch(&mut self, url: &str) -> Result<PageResult<R>, TransportError>;
}

impl<R, F> PageSource<R> for F
where
    F: FnMut(&str) -> Result<PageResult<R>, TransportError>,
{
    fn fetch(&mut self, url: &str) -> Result<PageResult<R>, TransportError> {
        self(url)
    }
}

/// What one [`InfiniteScroller::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Fetches issued by the scroll evaluation.
    pub fetches: Vec<FetchRequest>,
    /// Dismissed items detached this tick.
    pub removed: Vec<NodeId>,
    /// Items whose snap-back finished this tick.
    pub settled: Vec<NodeId>,
    /// Whether the scroll position was evaluated.
    pub evaluated: bool,
}

impl TickReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty() && self.removed.is_empty() && self.settled.is_empty()
    }
}

/// Loading indicators at the two list edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeLoaders {
    /// Shown while a backward fetch is in flight.
    pub top: bool,
    /// Shown while a forward fetch is in flight.
    pub bottom: bool,
}

impl EdgeLoaders {
    fn set(&mut self, direction: FetchDirection, visible: bool) {
        match direction {
            FetchDirection::Forward => self.bottom = visible,
            FetchDirection::Backward => self.top = visible,
        }
    }

    #[must_use]
    pub fn is_visible(&self, direction: FetchDirection) -> bool {
        match direction {
            FetchDirection::Forward => self.bottom,
            FetchDirection::Backward => self.top,
        }
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    id: RequestId,
    cursor: Cursor,
}

/// Bidirectional infinite list controller.
#[derive(Debug)]
pub struct InfiniteScroller<R> {
    config: ScrollerConfig,
    items: ItemList,
    tokens: PageTokenIndex,
    window: EvictionWindow,
    sink: RenderSink<R>,
    debouncer: ScrollDebouncer,
    trigger: ScrollTrigger,
    swipe: SwipeDismisser,
    loaders: EdgeLoaders,
    forward: Option<InFlight>,
    backward: Option<InFlight>,
    next_request: u64,
    initial_loaded: bool,
    last_metrics: Option<ScrollMetrics>,
    destroyed: bool,
}

impl<R> InfiniteScroller<R> {
    /// Validate `config` and build an idle scroller. Call
    /// [`start`](Self::start) to issue the initial load.
    pub fn new(
        config: ScrollerConfig,
        template: impl ItemTemplate<R> + 'static,
    ) -> Result<Self, ScrollerError> {
        config.validate()?;
        Ok(Self {
            items: ItemList::new(),
            tokens: PageTokenIndex::new(),
            window: EvictionWindow::new(config.cache_size),
            sink: RenderSink::new(template),
            debouncer: ScrollDebouncer::new(config.debounce),
            trigger: ScrollTrigger::new(config.trigger_distance, config.threshold),
            swipe: SwipeDismisser::new(
                config.swipe_direction,
                config.dismiss_ratio,
                config.settle_delay,
            ),
            loaders: EdgeLoaders::default(),
            forward: None,
            backward: None,
            next_request: 1,
            initial_loaded: false,
            last_metrics: None,
            destroyed: false,
            config,
        })
    }

    // --- Accessors -------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    #[must_use]
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    #[must_use]
    pub fn tokens(&self) -> &PageTokenIndex {
        &self.tokens
    }

    #[must_use]
    pub fn window(&self) -> &EvictionWindow {
        &self.window
    }

    #[must_use]
    pub fn dismissed(&self) -> &DismissedItems {
        self.swipe.dismissed()
    }

    #[must_use]
    pub fn loaders(&self) -> EdgeLoaders {
        self.loaders
    }

    #[must_use]
    pub fn is_loading(&self, direction: FetchDirection) -> bool {
        self.loaders.is_visible(direction)
    }

    /// Id of the fetch in flight in `direction`.
    #[must_use]
    pub fn in_flight(&self, direction: FetchDirection) -> Option<RequestId> {
        self.slot(direction).as_ref().map(|f| f.id)
    }

    #[must_use]
    pub fn swipe_phase(&self, id: NodeId) -> SwipePhase {
        self.swipe.phase(id)
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the initial page has been rendered.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initial_loaded
    }

    /// Earliest pending timer (debounce or gesture).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.debouncer.deadline(), self.swipe.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The cursor a fetch in `direction` would use right now.
    #[must_use]
    pub fn cursor(&self, direction: FetchDirection) -> Cursor {
        Cursor::derive(&self.items, &self.tokens, direction)
    }

    fn slot(&self, direction: FetchDirection) -> &Option<InFlight> {
        match direction {
            FetchDirection::Forward => &self.forward,
            FetchDirection::Backward => &self.backward,
        }
    }

    fn slot_mut(&mut self, direction: FetchDirection) -> &mut Option<InFlight> {
        match direction {
            FetchDirection::Forward => &mut self.forward,
            FetchDirection::Backward => &mut self.backward,
        }
    }

    // --- Fetching --------------------------------------------------------

    /// Issue the initial forward load.
    pub fn start(&mut self) -> FetchOutcome {
        self.begin_fetch(FetchDirection::Forward)
    }

    /// Request the next page in `direction`, if there is one and no fetch in
    /// that direction is already running.
    pub fn begin_fetch(&mut self, direction: FetchDirection) -> FetchOutcome {
        if self.destroyed {
            return FetchOutcome::Skipped(SkipReason::Destroyed);
        }

        let cursor = self.cursor(direction);
        let initial = direction.is_forward() && !self.initial_loaded;
        if cursor.is_origin() && !initial {
            tracing::debug!(direction = direction.as_str(), "no further page");
            return FetchOutcome::Skipped(SkipReason::NoFurtherPage);
        }
        if let Some(running) = self.slot(direction) {
            tracing::debug!(
                direction = direction.as_str(),
                in_flight = %running.id,
                "fetch already in flight"
            );
            return FetchOutcome::Skipped(SkipReason::InFlight(running.id));
        }

        let id = RequestId(self.next_request);
        self.next_request += 1;
        let url = cursor.request_url(self.config.base_url());
        *self.slot_mut(direction) = Some(InFlight {
            id,
            cursor: cursor.clone(),
        });
        self.loaders.set(direction, true);

        tracing::debug!(
            request = %id,
            direction = direction.as_str(),
            page_id = cursor.page_id,
            url = %url,
            "fetch requested"
        );
        FetchOutcome::Requested(FetchRequest {
            id,
            direction,
            cursor,
            url,
        })
    }

    /// Apply the result of a fetch issued by [`begin_fetch`](Self::begin_fetch).
    ///
    /// The edge loader is hidden and the in-flight slot freed whatever the
    /// outcome. On error, items and tokens are left exactly as they were.
    pub fn complete_fetch(
        &mut self,
        id: RequestId,
        result: Result<PageResult<R>, TransportError>,
    ) -> Result<RenderReport, ScrollerError> {
        let direction = [FetchDirection::Forward, FetchDirection::Backward]
            .into_iter()
            .find(|&d| self.slot(d).as_ref().is_some_and(|f| f.id == id))
            .ok_or(ScrollerError::UnknownRequest(id))?;
        let Some(InFlight { cursor, .. }) = self.slot_mut(direction).take() else {
            return Err(ScrollerError::UnknownRequest(id));
        };
        self.loaders.set(direction, false);

        let page = result.inspect_err(|e| {
            tracing::warn!(request = %id, direction = direction.as_str(), error = %e, "fetch failed");
        })?;

        let report = self
            .sink
            .render(
                &mut self.items,
                &mut self.window,
                &page.messages,
                cursor.page_id,
                direction,
            )
            .inspect_err(|e| {
                tracing::warn!(request = %id, page_id = cursor.page_id, error = %e, "template failed");
            })?;

        self.tokens.set(cursor.page_id + 1, page.page_token);
        self.initial_loaded = true;
        for &node in &report.evicted {
            self.swipe.forget(node);
        }

        tracing::debug!(
            request = %id,
            direction = direction.as_str(),
            page_id = cursor.page_id,
            inserted = report.inserted.len(),
            evicted = report.evicted.len(),
            rendered = self.items.len(),
            "page rendered"
        );
        Ok(report)
    }

    /// Fetch the next page in `direction` from `source` and render it.
    ///
    /// Returns `Ok(None)` when no request was issued.
    pub fn fetch_and_render(
        &mut self,
        direction: FetchDirection,
        source: &mut impl PageSource<R>,
    ) -> Result<Option<RenderReport>, ScrollerError> {
        let FetchOutcome::Requested(req) = self.begin_fetch(direction) else {
            return Ok(None);
        };
        let result = source.fetch(&req.url);
        self.complete_fetch(req.id, result).map(Some)
    }

    // --- Input -----------------------------------------------------------

    /// Record a scroll event; evaluation happens on a later
    /// [`tick`](Self::tick) once the debounce delay has passed.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Duration) {
        if self.destroyed {
            return;
        }
        self.last_metrics = Some(metrics);
        self.debouncer.push(metrics, now);
    }

    /// Apply a pan update to its target item.
    pub fn on_pan(&mut self, event: &PanEvent, now: Duration) -> SwipeResolution {
        if self.destroyed {
            return SwipeResolution::Ignored;
        }
        let fallback_width = self.last_metrics.map_or(0.0, |m| m.client_width);
        self.swipe.on_pan(&mut self.items, event, fallback_width, now)
    }

    /// Record the host-measured width of an item. Returns `false` when the
    /// node is not attached.
    pub fn on_measure(&mut self, target: NodeId, width: f64) -> bool {
        if self.destroyed {
            return false;
        }
        match self.items.get_mut(target) {
            Some(node) => {
                node.set_measured_width(width);
                true
            }
            None => false,
        }
    }

    /// Advance timers to `now`.
    ///
    /// Fires due gesture transitions, then evaluates the scroll position if
    /// the debounce elapsed or an item was just detached.
    ///
    /// The evaluation after a detach uses the last metrics the host reported,
    /// which predate the removal, so `scroll_height` is stale by the height of
    /// the removed items. Hosts should report fresh metrics through
    /// [`on_scroll`](Self::on_scroll) once they have applied a non-empty
    /// [`TickReport::removed`]; the debounced evaluation then sees the real
    /// geometry. With no metrics reported yet, a detach evaluates nothing.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        if self.destroyed {
            return TickReport::default();
        }

        let swipe = self.swipe.tick(&mut self.items, now);
        let debounced = self.debouncer.poll(now);
        if let Some((_, coalesced)) = debounced
            && coalesced > 1
        {
            tracing::trace!(coalesced, "scroll events coalesced");
        }

        let mut report = TickReport {
            removed: swipe.removed,
            settled: swipe.settled,
            ..TickReport::default()
        };

        let metrics = debounced.map(|(m, _)| m).or(if report.removed.is_empty() {
            None
        } else {
            self.last_metrics
        });
        if let Some(metrics) = metrics {
            report.evaluated = true;
            let earliest = self.items.first().map(|n| n.page_id());
            if let Some(direction) = self.trigger.evaluate(&metrics, self.items.len(), earliest)
                && let FetchOutcome::Requested(req) = self.begin_fetch(direction)
            {
                report.fetches.push(req);
            }
        }
        report
    }

    /// Stop reacting to input and cancel pending timers.
    ///
    /// Rendered items stay as they are. Fetches already in flight can still
    /// be completed. Calling this more than once has no further effect.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.debouncer.cancel();
        let cancelled = self.swipe.cancel_pending();
        tracing::debug!(cancelled_timers = cancelled, rendered = self.items.len(), "scroller destroyed");
    }
}
