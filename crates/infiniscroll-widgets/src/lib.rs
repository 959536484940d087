#![forbid(unsafe_code)]

//! The infiniscroll engine.
//!
//! A headless, host-driven bidirectional infinite list. The host reports
//! scroll geometry and pan gestures, performs network fetches on request, and
//! mirrors [`item_list::ItemList`] into its real DOM. The engine decides when
//! to fetch, which continuation token to use, how many items to evict and
//! from which end, and how a drag resolves into dismiss or snap-back.
//!
//! # Modules
//!
//! - [`page_tokens`] - page-id to continuation-token index and cursor derivation
//! - [`item_list`] - rendered item nodes and their elements
//! - [`eviction`] - sliding cache window
//! - [`render_sink`] - template boundary and batch insertion
//! - [`scroll_trigger`] - debounced edge proximity detection
//! - [`swipe_dismiss`] - per-item pan gesture state machine
//! - [`scroller`] - the fetch orchestrator tying it all together
//! - [`config`] / [`error`] - configuration and error kinds

pub mod config;
pub mod error;
pub mod eviction;
pub mod item_list;
pub mod page_tokens;
pub mod render_sink;
pub mod scroll_trigger;
pub mod scroller;
pub mod swipe_dismiss;

pub use config::ScrollerConfig;
pub use error::{ConfigError, ScrollerError, TemplateError, TransportError};
pub use item_list::{Element, Fragment, ItemList, ItemNode};
pub use page_tokens::{Cursor, PAGE_TOKEN_PARAM, PageId, PageToken, PageTokenIndex};
pub use render_sink::{ItemTemplate, PageResult, RenderReport};
pub use scroller::{
    EdgeLoaders, FetchOutcome, FetchRequest, InfiniteScroller, PageSource, RequestId, SkipReason,
    TickReport,
};
pub use swipe_dismiss::{DismissedItems, SwipePhase, SwipeResolution, SwipeTick};
