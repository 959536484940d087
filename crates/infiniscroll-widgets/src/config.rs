#![forbid(unsafe_code)]

//! Scroller configuration.
//!
//! Hosts build a [`ScrollerConfig`] in code or deserialize it from the
//! camelCase JSON options object; durations are given in milliseconds there:
//!
//! ```json
//! { "container": "#list", "url": "/messages", "swipeDirection": "left",
//!   "cacheSize": 30, "debounceMs": 20 }
//! ```
//!
//! The configuration is checked once by [`ScrollerConfig::validate`] and is
//! immutable after the scroller is built.
//!
//! # Environment overrides
//!
//! [`ScrollerConfig::with_env_overrides`] reads `INFINISCROLL_CACHE_SIZE`,
//! `INFINISCROLL_THRESHOLD`, `INFINISCROLL_TRIGGER_DISTANCE`,
//! `INFINISCROLL_DEBOUNCE_MS`, `INFINISCROLL_SETTLE_DELAY_MS` and
//! `INFINISCROLL_SWIPE_DIRECTION` through a caller-supplied lookup.
//! Unparsable values are ignored.

use crate::error::ConfigError;
use crate::eviction::DEFAULT_MAX_ITEMS;
use crate::scroll_trigger::{DEFAULT_DEBOUNCE, DEFAULT_TRIGGER_DISTANCE};
use crate::swipe_dismiss::{DEFAULT_DISMISS_RATIO, DEFAULT_SETTLE_DELAY};
use infiniscroll_core::SwipeDirection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default low-water mark of rendered items. Zero disables the rule, so
/// only edge proximity triggers fetches.
pub const DEFAULT_THRESHOLD: usize = 0;

/// Options accepted by [`InfiniteScroller::new`](crate::InfiniteScroller::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollerConfig {
    /// Host selector of the scroll container. Required.
    pub container: Option<String>,
    /// Base URL of the page endpoint. Required.
    pub url: Option<String>,
    /// Direction in which a swipe dismisses an item.
    pub swipe_direction: SwipeDirection,
    /// Below this many rendered items, the scroll trigger fetches forward
    /// wherever the viewport is. `0` (the default) turns this off.
    pub threshold: usize,
    /// Maximum number of rendered items once the window is warm.
    pub cache_size: usize,
    /// Distance from an edge, in pixels, that triggers a fetch.
    pub trigger_distance: f64,
    #[serde(rename = "debounceMs", with = "millis")]
    pub debounce: Duration,
    /// Delay before a dismissed item is detached or a snap-back settles.
    #[serde(rename = "settleDelayMs", with = "millis")]
    pub settle_delay: Duration,
    /// Fraction of the item width a swipe must cover to dismiss.
    pub dismiss_ratio: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            container: None,
            url: None,
            swipe_direction: SwipeDirection::default(),
            threshold: DEFAULT_THRESHOLD,
            cache_size: DEFAULT_MAX_ITEMS,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            debounce: DEFAULT_DEBOUNCE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            dismiss_ratio: DEFAULT_DISMISS_RATIO,
        }
    }
}

impl ScrollerConfig {
    /// Config with both required options set and everything else default.
    #[must_use]
    pub fn new(container: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            container: Some(container.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_swipe_direction(mut self, direction: SwipeDirection) -> Self {
        self.swipe_direction = direction;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    #[must_use]
    pub fn with_trigger_distance(mut self, distance: f64) -> Self {
        self.trigger_distance = distance;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn with_dismiss_ratio(mut self, ratio: f64) -> Self {
        self.dismiss_ratio = ratio;
        self
    }

    /// Apply `INFINISCROLL_*` overrides using a custom environment lookup.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| get_env(key).map(|v| v.trim().to_string());

        if let Some(n) = parsed("INFINISCROLL_CACHE_SIZE").and_then(|v| v.parse().ok()) {
            self.cache_size = n;
        }
        if let Some(n) = parsed("INFINISCROLL_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.threshold = n;
        }
        if let Some(d) = parsed("INFINISCROLL_TRIGGER_DISTANCE").and_then(|v| v.parse().ok()) {
            self.trigger_distance = d;
        }
        if let Some(ms) = parsed("INFINISCROLL_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed("INFINISCROLL_SETTLE_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.settle_delay = Duration::from_millis(ms);
        }
        if let Some(dir) = parsed("INFINISCROLL_SWIPE_DIRECTION").and_then(|v| v.parse().ok()) {
            self.swipe_direction = dir;
        }
        self
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Check required options and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingField("container"));
        }
        if self.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingField("url"));
        }
        if self.cache_size == 0 {
            return Err(ConfigError::invalid("cacheSize", "must be at least 1"));
        }
        if !self.trigger_distance.is_finite() || self.trigger_distance < 0.0 {
            return Err(ConfigError::invalid(
                "triggerDistance",
                format!("{} is not a non-negative distance", self.trigger_distance),
            ));
        }
        if !(self.dismiss_ratio > 0.0 && self.dismiss_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                "dismissRatio",
                format!("{} is outside (0, 1]", self.dismiss_ratio),
            ));
        }
        Ok(())
    }

    /// The validated base URL.
    pub(crate) fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
