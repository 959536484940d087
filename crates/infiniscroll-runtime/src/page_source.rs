#![forbid(unsafe_code)]

//! Synchronous page sources.
//!
//! [`drain_fetches`] performs every request a [`ScrollerRunner`] has queued
//! against a blocking [`PageSource`]. [`StaticPageSource`] serves pages
//! recorded up front, keyed by the continuation token in the request URL,
//! which is enough to run the engine offline or in tests.

use crate::runner::ScrollerRunner;
use infiniscroll_widgets::{
    PAGE_TOKEN_PARAM, PageResult, PageSource, RenderReport, RequestId, ScrollerError,
    TransportError,
};
use std::collections::HashMap;
use url::{Url, form_urlencoded};

/// Results of one [`drain_fetches`] call.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub completed: Vec<RenderReport>,
    pub failed: Vec<(RequestId, ScrollerError)>,
}

impl DrainReport {
    /// Total requests performed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Perform and complete every pending request of `runner` using `source`.
///
/// Failures are collected rather than returned early, so one bad page does
/// not strand the requests behind it.
pub fn drain_fetches<R>(
    runner: &mut ScrollerRunner<R>,
    source: &mut impl PageSource<R>,
) -> DrainReport {
    let mut report = DrainReport::default();
    for req in runner.take_fetch_requests() {
        let result = source.fetch(&req.url);
        match runner.complete_fetch(req.id, result) {
            Ok(rendered) => report.completed.push(rendered),
            Err(err) => report.failed.push((req.id, err)),
        }
    }
    report
}

/// Extract and decode the `pageToken` query parameter from a request URL.
///
/// Accepts absolute URLs and host-relative ones such as `/messages?pageToken=x`.
#[must_use]
pub fn page_token_from_url(url: &str) -> Option<String> {
    let query = match Url::parse(url) {
        Ok(parsed) => parsed.query()?.to_string(),
        Err(_) => {
            let (_, rest) = url.split_once('?')?;
            rest.split_once('#').map_or(rest, |(query, _)| query).to_string()
        }
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == PAGE_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Pre-recorded pages keyed by the token that loads them.
///
/// The page under `None` answers requests without a token (the initial load).
#[derive(Debug, Clone)]
pub struct StaticPageSource<R> {
    pages: HashMap<Option<String>, PageResult<R>>,
    requested: Vec<String>,
}

impl<R> Default for StaticPageSource<R> {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            requested: Vec::new(),
        }
    }
}

impl<R: Clone> StaticPageSource<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the page loaded by `token` (`None` for the initial load).
    #[must_use]
    pub fn with_page(mut self, token: Option<&str>, page: PageResult<R>) -> Self {
        self.insert(token, page);
        self
    }

    pub fn insert(&mut self, token: Option<&str>, page: PageResult<R>) {
        self.pages.insert(token.map(str::to_string), page);
    }

    /// Build a chain of pages: the first is the initial load, each later one
    /// is loaded by the token the previous page returned.
    #[must_use]
    pub fn chain(batches: impl IntoIterator<Item = Vec<R>>) -> Self {
        let mut source = Self::new();
        let batches: Vec<Vec<R>> = batches.into_iter().collect();
        let count = batches.len();
        for (i, messages) in batches.into_iter().enumerate() {
            let loaded_by = (i > 0).then(|| format!("p{i}"));
            let next = (i + 1 < count).then(|| format!("p{}", i + 1).into());
            source.insert(loaded_by.as_deref(), PageResult::new(messages, next));
        }
        source
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<R: Clone> PageSource<R> for StaticPageSource<R> {
    fn fetch(&mut self, url: &str) -> Result<PageResult<R>, TransportError> {
        self.requested.push(url.to_string());
        let token = page_token_from_url(url);
        self.pages
            .get(&token)
            .cloned()
            .ok_or_else(|| TransportError::new(format!("404 no page for {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infiniscroll_widgets::{Cursor, Element, Fragment, PageToken, ScrollerConfig};

    fn template(fragment: &mut Fragment, n: &u32) {
        fragment.push(Element::new("article").with_attr("data-id", format!("item-{n}")));
    }

    #[test]
    fn token_extraction() {
        assert_eq!(page_token_from_url("/messages"), None);
        assert_eq!(
            page_token_from_url("/messages?pageToken=abc").as_deref(),
            Some("abc")
        );
        assert_eq!(
            page_token_from_url("/messages?limit=5&pageToken=x1&y=2").as_deref(),
            Some("x1")
        );
        assert_eq!(page_token_from_url("/messages?pageToken="), None);
        assert_eq!(
            page_token_from_url("https://example.test/m?pageToken=abc#top").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn reserved_token_characters_round_trip() {
        let raw = "a&b+c#d%e f";
        let cursor = Cursor {
            page_id: 1,
            page_token: Some(PageToken::new(raw)),
        };
        for base in ["/messages", "https://example.test/messages?limit=5"] {
            let url = cursor.request_url(base);
            assert_eq!(page_token_from_url(&url).as_deref(), Some(raw), "{url}");
        }
    }

    #[test]
    fn static_source_serves_tokens_with_reserved_characters() {
        let mut runner =
            ScrollerRunner::from_config(ScrollerConfig::new("#list", "/messages"), template)
                .unwrap();
        let mut source = StaticPageSource::new()
            .with_page(None, PageResult::new(vec![1u32], Some("a&b+c#d".into())))
            .with_page(Some("a&b+c#d"), PageResult::new(vec![2], None));
        runner.init();
        drain_fetches(&mut runner, &mut source);
        runner.request_fetch(infiniscroll_core::FetchDirection::Forward);
        let report = drain_fetches(&mut runner, &mut source);
        assert!(report.failed.is_empty());
        assert_eq!(source.requested()[1], "/messages?pageToken=a%26b%2Bc%23d");
        assert_eq!(runner.scroller().items().len(), 2);
    }

    #[test]
    fn chain_links_tokens() {
        let mut source = StaticPageSource::chain([vec![1u32, 2], vec![3], vec![4]]);
        assert_eq!(source.len(), 3);
        let first = source.fetch("/m").unwrap();
        assert_eq!(first.page_token, Some(PageToken::new("p1")));
        let last = source.fetch("/m?pageToken=p2").unwrap();
        assert_eq!(last.messages, [4]);
        assert_eq!(last.page_token, None);
        assert!(source.fetch("/m?pageToken=p9").is_err());
        assert_eq!(source.requested().len(), 3);
    }

    #[test]
    fn drain_completes_initial_load() {
        let mut runner =
            ScrollerRunner::from_config(ScrollerConfig::new("#list", "/messages"), template)
                .unwrap();
        let mut source = StaticPageSource::chain([(0..10).collect::<Vec<u32>>(), (10..20).collect()]);
        runner.init();
        let report = drain_fetches(&mut runner, &mut source);
        assert_eq!(report.completed.len(), 1);
        assert!(report.failed.is_empty());
        assert_eq!(runner.scroller().items().len(), 10);
        assert!(drain_fetches(&mut runner, &mut source).is_empty());
    }

    #[test]
    fn drain_collects_failures() {
        let mut runner =
            ScrollerRunner::from_config(ScrollerConfig::new("#list", "/messages"), template)
                .unwrap();
        let mut source: StaticPageSource<u32> = StaticPageSource::new();
        runner.init();
        let report = drain_fetches(&mut runner, &mut source);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, ScrollerError::Transport(_)));
        assert!(runner.outstanding().is_empty());
    }
}
