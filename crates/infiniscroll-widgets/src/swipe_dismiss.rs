#![forbid(unsafe_code)]

//! Swipe-to-dismiss gesture handling.
//!
//! # State machine
//!
//! Each item is in exactly one [`SwipePhase`]:
//!
//! ```text
//! Idle --pan--> Dragging --final, past threshold--> Dismissing --delay--> (removed)
//!                  |
//!                  +------final, short of it------> SnapBack --delay--> Idle
//! ```
//!
//! # Invariants
//! 1. Scheduled transitions fire on [`SwipeDismisser::tick`] at or after their
//!    deadline, never before.
//! 2. A transition never touches a node that is no longer attached (evicted
//!    or removed some other way); it is simply dropped.
//! 3. Only the configured [`SwipeDirection`] dismisses. Drags the other way
//!    are still shown but always snap back.
//! 4. The dismissed set is append-only.

use crate::item_list::ItemList;
use infiniscroll_core::{NodeId, PanEvent, SwipeDirection};
use std::collections::HashMap;
use std::time::Duration;

/// Class applied while the pointer is dragging an item.
pub const CLASS_DRAGGING: &str = "beingDragged";
/// Class applied while an item animates back into place.
pub const CLASS_SNAP_BACK: &str = "snapBack";
/// Class applied while a dismissed item animates out.
pub const CLASS_REMOVE: &str = "remove";

/// Default delay before a dismissed item is detached / a snap-back clears.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Default fraction of the item width a swipe must cover to dismiss.
pub const DEFAULT_DISMISS_RATIO: f64 = 0.5;

// ---------------------------------------------------------------------------
// SwipePhase
// ---------------------------------------------------------------------------

/// Gesture state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SwipePhase {
    #[default]
    Idle,
    Dragging {
        offset_x: f64,
    },
    /// Marked dismissed; detached at `remove_at`.
    Dismissing {
        remove_at: Duration,
    },
    /// Returning to rest; classes cleared at `clear_at`.
    SnapBack {
        clear_at: Duration,
    },
}

impl SwipePhase {
    fn deadline(self) -> Option<Duration> {
        match self {
            Self::Dismissing { remove_at } => Some(remove_at),
            Self::SnapBack { clear_at } => Some(clear_at),
            Self::Idle | Self::Dragging { .. } => None,
        }
    }
}

/// How a pan event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeResolution {
    /// Target is not an attached item, or is already leaving.
    Ignored,
    Dragging,
    Dismissing { item_key: String, remove_at: Duration },
    SnapBack { clear_at: Duration },
}

/// What a [`SwipeDismisser::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwipeTick {
    /// Dismissed items detached from the list.
    pub removed: Vec<NodeId>,
    /// Items whose snap-back finished.
    pub settled: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// DismissedItems
// ---------------------------------------------------------------------------

/// Append-only record of dismissed item keys.
#[derive(Debug, Clone, Default)]
pub struct DismissedItems {
    items: HashMap<String, bool>,
}

impl DismissedItems {
    pub fn mark(&mut self, key: impl Into<String>) {
        self.items.insert(key.into(), true);
    }

    #[must_use]
    pub fn is_dismissed(&self, key: &str) -> bool {
        self.items.get(key).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SwipeDismisser
// ---------------------------------------------------------------------------

/// Drives per-item swipe state from pan events and the host clock.
#[derive(Debug, Clone)]
pub struct SwipeDismisser {
    direction: SwipeDirection,
    dismiss_ratio: f64,
    settle_delay: Duration,
    phases: HashMap<NodeId, SwipePhase>,
    dismissed: DismissedItems,
}

impl SwipeDismisser {
    #[must_use]
    pub fn new(direction: SwipeDirection, dismiss_ratio: f64, settle_delay: Duration) -> Self {
        Self {
            direction,
            dismiss_ratio,
            settle_delay,
            phases: HashMap::new(),
            dismissed: DismissedItems::default(),
        }
    }

    #[must_use]
    pub fn direction(&self) -> SwipeDirection {
        self.direction
    }

    #[must_use]
    pub fn phase(&self, id: NodeId) -> SwipePhase {
        self.phases.get(&id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn dismissed(&self) -> &DismissedItems {
        &self.dismissed
    }

    /// Apply one pan update.
    ///
    /// `fallback_width` is used when the host never measured the item
    /// (typically the viewport width). A non-positive width never dismisses.
    pub fn on_pan(
        &mut self,
        items: &mut ItemList,
        event: &PanEvent,
        fallback_width: f64,
        now: Duration,
    ) -> SwipeResolution {
        let id = event.target;
        if matches!(self.phase(id), SwipePhase::Dismissing { .. }) {
            return SwipeResolution::Ignored;
        }
        let Some(node) = items.get_mut(id) else {
            return SwipeResolution::Ignored;
        };

        node.set_offset_x(event.delta_x);
        let element = node.element_mut();
        element.remove_class(CLASS_SNAP_BACK);
        element.add_class(CLASS_DRAGGING);

        if !event.is_final {
            self.phases.insert(
                id,
                SwipePhase::Dragging {
                    offset_x: event.delta_x,
                },
            );
            return SwipeResolution::Dragging;
        }

        node.element_mut().remove_class(CLASS_DRAGGING);
        let width = node.measured_width().unwrap_or(fallback_width);
        let travelled = self.direction.project(event.delta_x);

        if width > 0.0 && travelled >= width * self.dismiss_ratio {
            let item_key = node.item_key();
            node.element_mut().add_class(CLASS_REMOVE);
            self.dismissed.mark(item_key.clone());
            let remove_at = now + self.settle_delay;
            self.phases.insert(id, SwipePhase::Dismissing { remove_at });
            tracing::debug!(node = %id, item = %item_key, travelled, width, "item dismissed");
            SwipeResolution::Dismissing {
                item_key,
                remove_at,
            }
        } else {
            node.element_mut().add_class(CLASS_SNAP_BACK);
            node.set_offset_x(0.0);
            let clear_at = now + self.settle_delay;
            self.phases.insert(id, SwipePhase::SnapBack { clear_at });
            tracing::trace!(node = %id, travelled, width, "swipe snapped back");
            SwipeResolution::SnapBack { clear_at }
        }
    }

    /// Fire every transition due at `now`.
    pub fn tick(&mut self, items: &mut ItemList, now: Duration) -> SwipeTick {
        let mut due: Vec<(Duration, NodeId, SwipePhase)> = self
            .phases
            .iter()
            .filter_map(|(&id, &phase)| {
                phase
                    .deadline()
                    .filter(|&at| at <= now)
                    .map(|at| (at, id, phase))
            })
            .collect();
        due.sort_by_key(|&(at, id, _)| (at, id));

        let mut outcome = SwipeTick::default();
        for (_, id, phase) in due {
            self.phases.remove(&id);
            match phase {
                SwipePhase::Dismissing { .. } => {
                    if items.remove(id).is_some() {
                        outcome.removed.push(id);
                    }
                }
                SwipePhase::SnapBack { .. } => {
                    if let Some(node) = items.get_mut(id) {
                        let element = node.element_mut();
                        element.remove_class(CLASS_SNAP_BACK);
                        element.remove_class(CLASS_DRAGGING);
                        outcome.settled.push(id);
                    }
                }
                SwipePhase::Idle | SwipePhase::Dragging { .. } => {}
            }
        }
        outcome
    }

    /// Earliest pending transition.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.phases.values().filter_map(|p| p.deadline()).min()
    }

    /// Drop state for a node that left the list by other means.
    pub fn forget(&mut self, id: NodeId) {
        self.phases.remove(&id);
    }

    /// Drop every pending transition. Returns how many were cancelled.
    pub fn cancel_pending(&mut self) -> usize {
        let before = self.phases.len();
        self.phases.retain(|_, phase| phase.deadline().is_none());
        before - self.phases.len()
    }
}
