#![forbid(unsafe_code)]

//! Page-id to continuation-token bookkeeping.
//!
//! # Numbering
//!
//! The initial load is page `0` and needs no token. Fetching page `k`
//! returns the token that loads page `k + 1`; that token is recorded under
//! `k + 1`. So the index answers "which token loads page `k`?" directly.
//!
//! ```text
//! fetch page 0 (no token)   -> items stamped 0, index {1: T1}
//! fetch page 1 (token T1)   -> items stamped 1, index {1: T1, 2: T2}
//! ```
//!
//! # Invariants
//! 1. Page `0` never carries a token.
//! 2. The [`Cursor`] is never stored; it is re-derived from the rendered
//!    items on every fetch so interleaved handlers cannot see stale state.
//! 3. An origin cursor means "no further page that way", except for the
//!    initial forward load.

use crate::item_list::ItemList;
use infiniscroll_core::FetchDirection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::{Url, form_urlencoded};

/// Query parameter carrying the continuation token.
pub const PAGE_TOKEN_PARAM: &str = "pageToken";

/// Position of one fetched batch in the loaded sequence.
pub type PageId = u64;

/// Opaque continuation token returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PageToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// PageTokenIndex
// ---------------------------------------------------------------------------

/// Maps page ids to the token that loads them.
///
/// Entries are scalar and the widget's lifetime is bounded, so the map is
/// never pruned.
#[derive(Debug, Clone, Default)]
pub struct PageTokenIndex {
    tokens: HashMap<PageId, Option<PageToken>>,
}

impl PageTokenIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the token for `page_id`. `None` records "no such page".
    ///
    /// Overwrites are allowed; the last write wins.
    pub fn set(&mut self, page_id: PageId, token: Option<PageToken>) {
        self.tokens.insert(page_id, token);
    }

    /// Token that loads `page_id`, or `None` when unknown or recorded absent.
    #[must_use]
    pub fn get(&self, page_id: PageId) -> Option<&PageToken> {
        self.tokens.get(&page_id).and_then(Option::as_ref)
    }

    /// Whether anything (even an absent token) was recorded for `page_id`.
    #[must_use]
    pub fn contains(&self, page_id: PageId) -> bool {
        self.tokens.contains_key(&page_id)
    }

    /// Number of recorded page ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// The page a fetch in some direction would load, and the token to load it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub page_id: PageId,
    pub page_token: Option<PageToken>,
}

impl Cursor {
    /// `{0, absent}`: the initial load, or "nothing further".
    #[must_use]
    pub const fn origin() -> Self {
        Self {
            page_id: 0,
            page_token: None,
        }
    }

    /// Whether this is the origin cursor.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.page_id == 0 && self.page_token.is_none()
    }

    /// Derive the cursor for `direction` from the rendered items.
    ///
    /// Forward targets the page after the last rendered item, backward the
    /// page before the first. A target of `0` or below, or one with no known
    /// token, yields [`Cursor::origin`].
    #[must_use]
    pub fn derive(items: &ItemList, index: &PageTokenIndex, direction: FetchDirection) -> Self {
        let target = match direction {
            FetchDirection::Forward => items.last().map(|node| node.page_id().saturating_add(1)),
            FetchDirection::Backward => items
                .first()
                .and_then(|node| node.page_id().checked_sub(1)),
        };

        match target {
            Some(page_id) if page_id > 0 => match index.get(page_id) {
                Some(token) => Self {
                    page_id,
                    page_token: Some(token.clone()),
                },
                None => Self::origin(),
            },
            _ => Self::origin(),
        }
    }

    /// URL for fetching this cursor's page from `base`.
    ///
    /// The base URL is used unchanged when there is no token. The token is
    /// form-encoded, so reserved characters survive the round trip. Relative
    /// bases such as `/messages` are extended in place, keeping any fragment
    /// last.
    #[must_use]
    pub fn request_url(&self, base: &str) -> String {
        let Some(token) = &self.page_token else {
            return base.to_string();
        };
        if let Ok(mut url) = Url::parse(base) {
            url.query_pairs_mut()
                .append_pair(PAGE_TOKEN_PARAM, token.as_str());
            return url.into();
        }

        let (path, fragment) = base
            .split_once('#')
            .map_or((base, None), |(path, fragment)| (path, Some(fragment)));
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(PAGE_TOKEN_PARAM, token.as_str())
            .finish();
        let sep = if path.contains('?') { '&' } else { '?' };
        match fragment {
            Some(fragment) => format!("{path}{sep}{pair}#{fragment}"),
            None => format!("{path}{sep}{pair}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_list::{Element, ItemNode};

    fn items_with_pages(pages: &[PageId]) -> ItemList {
        let mut items = ItemList::new();
        let nodes: Vec<ItemNode> = pages
            .iter()
            .map(|&p| items.create_node(Element::new("article"), p))
            .collect();
        items.extend_back(nodes);
        items
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut index = PageTokenIndex::new();
        index.set(3, Some(PageToken::new("T3")));
        assert_eq!(index.get(3), Some(&PageToken::new("T3")));
        index.set(3, Some(PageToken::new("T3b")));
        assert_eq!(index.get(3).map(PageToken::as_str), Some("T3b"));
    }

    #[test]
    fn absent_token_is_recorded_but_reads_absent() {
        let mut index = PageTokenIndex::new();
        index.set(4, None);
        assert!(index.contains(4));
        assert_eq!(index.get(4), None);
        assert!(!index.contains(5));
    }

    #[test]
    fn empty_list_derives_origin() {
        let index = PageTokenIndex::new();
        let items = ItemList::new();
        assert!(Cursor::derive(&items, &index, FetchDirection::Forward).is_origin());
        assert!(Cursor::derive(&items, &index, FetchDirection::Backward).is_origin());
    }

    #[test]
    fn forward_targets_page_after_last_item() {
        let mut index = PageTokenIndex::new();
        index.set(1, Some("T1".into()));
        index.set(2, Some("T2".into()));
        let items = items_with_pages(&[0, 0, 1, 1]);
        let cursor = Cursor::derive(&items, &index, FetchDirection::Forward);
        assert_eq!(cursor.page_id, 2);
        assert_eq!(cursor.page_token, Some("T2".into()));
    }

    #[test]
    fn forward_without_token_is_end_of_data() {
        let mut index = PageTokenIndex::new();
        index.set(1, None);
        let items = items_with_pages(&[0, 0]);
        assert!(Cursor::derive(&items, &index, FetchDirection::Forward).is_origin());
    }

    #[test]
    fn backward_targets_page_before_first_item() {
        let mut index = PageTokenIndex::new();
        for p in 1..=4 {
            index.set(p, Some(PageToken::new(format!("T{p}"))));
        }
        let items = items_with_pages(&[3, 3, 4]);
        let cursor = Cursor::derive(&items, &index, FetchDirection::Backward);
        assert_eq!(cursor.page_id, 2);
        assert_eq!(cursor.page_token, Some("T2".into()));
    }

    #[test]
    fn backward_from_page_one_or_zero_stops() {
        let mut index = PageTokenIndex::new();
        index.set(1, Some("T1".into()));
        let items = items_with_pages(&[1, 2]);
        assert!(Cursor::derive(&items, &index, FetchDirection::Backward).is_origin());
        let items = items_with_pages(&[0]);
        assert!(Cursor::derive(&items, &index, FetchDirection::Backward).is_origin());
    }

    #[test]
    fn request_url_appends_token() {
        let base = "https://example.test/messages";
        assert_eq!(Cursor::origin().request_url(base), base);
        let cursor = Cursor {
            page_id: 1,
            page_token: Some("abc".into()),
        };
        assert_eq!(
            cursor.request_url(base),
            "https://example.test/messages?pageToken=abc"
        );
        assert_eq!(
            cursor.request_url("https://example.test/m?limit=10"),
            "https://example.test/m?limit=10&pageToken=abc"
        );
    }

    #[test]
    fn request_url_encodes_reserved_token_characters() {
        let cursor = Cursor {
            page_id: 1,
            page_token: Some("a&b+c#d%e f".into()),
        };
        let relative = cursor.request_url("/messages");
        assert_eq!(relative, "/messages?pageToken=a%26b%2Bc%23d%25e+f");
        let absolute = cursor.request_url("https://example.test/messages");
        assert_eq!(
            absolute,
            "https://example.test/messages?pageToken=a%26b%2Bc%23d%25e+f"
        );
        let decoded: Vec<(String, String)> = Url::parse(&absolute)
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect();
        assert_eq!(
            decoded,
            [("pageToken".to_string(), "a&b+c#d%e f".to_string())]
        );
    }

    #[test]
    fn relative_request_url_keeps_fragment_last() {
        let cursor = Cursor {
            page_id: 2,
            page_token: Some("t".into()),
        };
        assert_eq!(cursor.request_url("/m?limit=5#top"), "/m?limit=5&pageToken=t#top");
    }
}
