//! Property-based invariant tests for paging and eviction.
//!
//! 1. Once the window is warm, the rendered count never exceeds the cache
//!    maximum under forward fetches no larger than the cache.
//! 2. Forward batches are stamped 0 once, then 1, 2, ... in order.
//! 3. Rendered page ids are always non-decreasing from head to tail.
//! 4. PageTokenIndex round-trips every id and token, absent included.
//! 5. The eviction counter equals the number of items ever rendered.

use infiniscroll_core::FetchDirection;
use infiniscroll_widgets::{
    Element, Fragment, InfiniteScroller, PageResult, PageToken, PageTokenIndex, ScrollerConfig,
    TransportError,
};
use proptest::prelude::*;

fn template(fragment: &mut Fragment, n: &u32) {
    fragment.push(Element::new("article").with_attr("data-id", format!("item-{n}")));
}

fn token_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[A-Za-z0-9_-]{1,16}".prop_map(Some)]
}

proptest! {
    #[test]
    fn forward_paging_respects_cache_and_numbering(
        cache_size in 1usize..=60,
        batches in proptest::collection::vec(1u32..=25, 1..=12),
    ) {
        let config = ScrollerConfig::new("#list", "/messages").with_cache_size(cache_size);
        let mut s = InfiniteScroller::new(config, template).unwrap();
        let mut served = 0usize;
        let mut rendered_total = 0u64;

        for (page, &len) in batches.iter().enumerate() {
            // A single batch larger than the cache overflows it on its own.
            let len = len.min(cache_size as u32);
            let mut source = |_: &str| {
                let start = page as u32 * 100;
                Ok::<_, TransportError>(PageResult::new(
                    (start..start + len).collect(),
                    Some(PageToken::new(format!("T{}", page + 1))),
                ))
            };
            let report = s.fetch_and_render(FetchDirection::Forward, &mut source).unwrap().unwrap();
            prop_assert_eq!(report.page_id, page as u64);
            rendered_total += u64::from(len);
            served += 1;

            if s.window().is_warm() {
                prop_assert!(s.items().len() <= cache_size);
            }
            let ids = s.items().page_ids();
            prop_assert!(ids.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(s.window().rendered_total(), rendered_total);
        }
        prop_assert_eq!(s.tokens().len(), served);
    }

    #[test]
    fn token_index_round_trip(
        entries in proptest::collection::vec((0u64..1_000, token_strategy()), 0..64),
    ) {
        let mut index = PageTokenIndex::new();
        let mut expected = std::collections::HashMap::new();
        for (page, token) in entries {
            let token = token.map(PageToken::new);
            index.set(page, token.clone());
            prop_assert_eq!(index.get(page), token.as_ref());
            expected.insert(page, token);
        }
        for (page, token) in &expected {
            prop_assert!(index.contains(*page));
            prop_assert_eq!(index.get(*page), token.as_ref());
        }
        prop_assert_eq!(index.len(), expected.len());
    }
}
