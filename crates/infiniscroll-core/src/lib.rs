#![forbid(unsafe_code)]

//! Core: input events, direction types, and logging for infiniscroll.
//!
//! # Role in infiniscroll
//! `infiniscroll-core` is the input layer. It owns the normalized event types
//! the host delivers (scroll metrics, pan gestures, item measurements) and the
//! small direction vocabulary shared by every other crate.
//!
//! # How it fits in the system
//! The engine (`infiniscroll-widgets`) consumes these types; the runner
//! (`infiniscroll-runtime`) queues them; the browser bridge
//! (`infiniscroll-web`) decodes them from JSON. Nothing here performs I/O.

pub mod event;
pub mod logging;

pub use event::{Event, FetchDirection, NodeId, PanEvent, ScrollMetrics, SwipeDirection};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};
