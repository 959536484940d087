#![forbid(unsafe_code)]

//! Host-facing drivers for [`InfiniteScroller`](infiniscroll_widgets::InfiniteScroller).
//!
//! - [`runner`] queues host events and turns them into timer ticks and
//!   fetch requests, one [`step`](runner::ScrollerRunner::step) at a time.
//! - [`page_source`] completes those requests synchronously, either from a
//!   caller-supplied [`PageSource`](infiniscroll_widgets::PageSource) or from
//!   pre-recorded pages.

pub mod page_source;
pub mod runner;

pub use page_source::{DrainReport, StaticPageSource, drain_fetches, page_token_from_url};
pub use runner::{HostClock, ScrollerRunner, StepResult};
