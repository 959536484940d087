#![forbid(unsafe_code)]

//! Canonical host input events.
//!
//! The host (browser bridge, native shell, or test) reports what happened in
//! the viewport; the engine never reads layout itself. All pixel values are
//! logical CSS pixels as `f64`, matching what a DOM reports.
//!
//! # Invariants
//! 1. A pan sequence for one target is zero or more non-final [`PanEvent`]s
//!    followed by exactly one final event.
//! 2. [`ScrollMetrics::distance_to_bottom`] may be negative when the host
//!    overscrolls (rubber-banding); callers compare, never index, with it.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable identifier of one rendered item node.
///
/// Ids are allocated monotonically by the item list and never reused, so a
/// host can keep a `NodeId -> DOM element` map without generation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// FetchDirection
// ---------------------------------------------------------------------------

/// Which edge of the list a fetch extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FetchDirection {
    /// Load newer items below the last rendered one.
    Forward,
    /// Load older items above the first rendered one.
    Backward,
}

impl FetchDirection {
    /// Returns true for [`FetchDirection::Forward`].
    #[must_use]
    pub const fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Returns the stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl fmt::Display for FetchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SwipeDirection
// ---------------------------------------------------------------------------

/// Horizontal direction in which a swipe dismisses an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SwipeDirection {
    #[cfg_attr(feature = "serde", serde(alias = "DIRECTION_LEFT"))]
    Left,
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "DIRECTION_RIGHT"))]
    Right,
}

impl SwipeDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Sign of a horizontal delta that moves in this direction.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Distance travelled in this direction by a horizontal delta.
    ///
    /// Negative when the delta points the other way.
    #[must_use]
    pub fn project(self, delta_x: f64) -> f64 {
        delta_x * self.sign()
    }

    /// Returns the stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Error returned when parsing a [`SwipeDirection`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSwipeDirectionError(pub String);

impl fmt::Display for ParseSwipeDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown swipe direction: {}", self.0)
    }
}

impl std::error::Error for ParseSwipeDirectionError {}

impl FromStr for SwipeDirection {
    type Err = ParseSwipeDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the gesture-library spelling used by browser hosts as well.
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "direction_left" => Ok(Self::Left),
            "right" | "direction_right" => Ok(Self::Right),
            other => Err(ParseSwipeDirectionError(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollMetrics
// ---------------------------------------------------------------------------

/// Snapshot of the scroll container's geometry at one scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScrollMetrics {
    /// Pixels scrolled from the top of the content.
    pub scroll_top: f64,
    /// Total content height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub client_height: f64,
    /// Visible viewport width (fallback item width for swipe thresholds).
    #[cfg_attr(feature = "serde", serde(default))]
    pub client_width: f64,
}

impl ScrollMetrics {
    /// Create metrics without a known width.
    #[must_use]
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
            client_width: 0.0,
        }
    }

    /// Set the viewport width.
    #[must_use]
    pub const fn with_client_width(mut self, client_width: f64) -> Self {
        self.client_width = client_width;
        self
    }

    /// `scroll_height - scroll_top - client_height`.
    #[must_use]
    pub fn distance_to_bottom(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }
}

// ---------------------------------------------------------------------------
// PanEvent
// ---------------------------------------------------------------------------

/// One update of a horizontal pan gesture on an item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PanEvent {
    /// Cumulative horizontal offset since the gesture started.
    pub delta_x: f64,
    /// Whether this is the terminal event of the gesture.
    pub is_final: bool,
    /// Item node the gesture started on.
    pub target: NodeId,
}

impl PanEvent {
    /// A non-final motion update.
    #[must_use]
    pub const fn moved(target: NodeId, delta_x: f64) -> Self {
        Self {
            delta_x,
            is_final: false,
            target,
        }
    }

    /// The terminal event of a gesture.
    #[must_use]
    pub const fn ended(target: NodeId, delta_x: f64) -> Self {
        Self {
            delta_x,
            is_final: true,
            target,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The scroll container scrolled (or was resized).
    Scroll(ScrollMetrics),
    /// A pan gesture moved or ended on an item.
    Pan(PanEvent),
    /// The host measured an item's rendered width.
    Measure { target: NodeId, width: f64 },
}

impl Event {
    /// Short, stable name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scroll(_) => "scroll",
            Self::Pan(_) => "pan",
            Self::Measure { .. } => "measure",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_bottom_matches_dom_formula() {
        let m = ScrollMetrics::new(600.0, 2000.0, 800.0);
        assert_eq!(m.distance_to_bottom(), 600.0);
    }

    #[test]
    fn distance_to_bottom_can_go_negative_on_overscroll() {
        let m = ScrollMetrics::new(1250.0, 2000.0, 800.0);
        assert!(m.distance_to_bottom() < 0.0);
    }

    #[test]
    fn fetch_direction_opposite_and_names() {
        assert_eq!(FetchDirection::Forward.opposite(), FetchDirection::Backward);
        assert_eq!(FetchDirection::Backward.opposite(), FetchDirection::Forward);
        assert!(FetchDirection::Forward.is_forward());
        assert!(!FetchDirection::Backward.is_forward());
        assert_eq!(FetchDirection::Backward.to_string(), "backward");
    }

    #[test]
    fn swipe_direction_projects_delta() {
        assert_eq!(SwipeDirection::Right.project(120.0), 120.0);
        assert_eq!(SwipeDirection::Left.project(120.0), -120.0);
        assert_eq!(SwipeDirection::Left.project(-80.0), 80.0);
        assert_eq!(SwipeDirection::Left.opposite(), SwipeDirection::Right);
    }

    #[test]
    fn swipe_direction_parses_gesture_library_names() {
        assert_eq!(
            "DIRECTION_RIGHT".parse::<SwipeDirection>(),
            Ok(SwipeDirection::Right)
        );
        assert_eq!(" left ".parse::<SwipeDirection>(), Ok(SwipeDirection::Left));
        assert!("up".parse::<SwipeDirection>().is_err());
    }

    #[test]
    fn swipe_direction_defaults_right() {
        assert_eq!(SwipeDirection::default(), SwipeDirection::Right);
    }

    #[test]
    fn pan_constructors_set_final_flag() {
        let target = NodeId(7);
        assert!(!PanEvent::moved(target, 3.0).is_final);
        assert!(PanEvent::ended(target, 3.0).is_final);
    }

    #[test]
    fn event_kind_names() {
        assert_eq!(Event::Scroll(ScrollMetrics::default()).kind(), "scroll");
        assert_eq!(Event::Pan(PanEvent::moved(NodeId(1), 0.0)).kind(), "pan");
        assert_eq!(
            Event::Measure {
                target: NodeId(1),
                width: 10.0
            }
            .kind(),
            "measure"
        );
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(42).to_string(), "node-42");
        assert_eq!(NodeId::from(3).get(), 3);
    }
}
