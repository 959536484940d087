#![forbid(unsafe_code)]

//! Sliding cache window over rendered items.
//!
//! The window counts every item ever rendered. Until that count reaches the
//! cache maximum nothing is evicted; afterwards each incoming item pushes one
//! existing node out of the end *opposite* the incoming batch:
//!
//! ```text
//! forward batch  -> evict from head (oldest, top)
//! backward batch -> evict from tail (newest, bottom)
//! ```
//!
//! Eviction stops silently when the list runs dry.

use crate::item_list::{ItemList, ItemNode};
use infiniscroll_core::FetchDirection;

/// Default cache maximum.
pub const DEFAULT_MAX_ITEMS: usize = 30;

/// Eviction bookkeeping.
#[derive(Debug, Clone)]
pub struct EvictionWindow {
    max_items: usize,
    rendered_total: u64,
}

impl Default for EvictionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl EvictionWindow {
    #[must_use]
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            rendered_total: 0,
        }
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Items rendered over the widget's lifetime.
    #[must_use]
    pub fn rendered_total(&self) -> u64 {
        self.rendered_total
    }

    /// Whether the window has filled at least once.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.rendered_total >= self.max_items as u64
    }

    /// Make room for `batch_size` incoming items arriving from `direction`.
    ///
    /// Returns the evicted nodes, head-first for forward batches and
    /// tail-first for backward ones.
    pub fn evict(
        &mut self,
        items: &mut ItemList,
        batch_size: usize,
        direction: FetchDirection,
    ) -> Vec<ItemNode> {
        let mut evicted = Vec::new();
        for _ in 0..batch_size {
            if self.is_warm() {
                let node = match direction {
                    FetchDirection::Forward => items.pop_front(),
                    FetchDirection::Backward => items.pop_back(),
                };
                evicted.extend(node);
            }
            self.rendered_total += 1;
        }

        if !evicted.is_empty() {
            tracing::trace!(
                evicted = evicted.len(),
                direction = direction.as_str(),
                remaining = items.len(),
                "evicted items"
            );
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_list::Element;
    use crate::page_tokens::PageId;

    fn push_batch(items: &mut ItemList, n: usize, page: PageId, direction: FetchDirection) {
        let nodes: Vec<_> = (0..n)
            .map(|_| items.create_node(Element::new("article"), page))
            .collect();
        match direction {
            FetchDirection::Forward => items.extend_back(nodes),
            FetchDirection::Backward => items.extend_front(nodes),
        }
    }

    #[test]
    fn no_eviction_below_maximum() {
        let mut window = EvictionWindow::new(30);
        let mut items = ItemList::new();
        for page in 0..3 {
            let evicted = window.evict(&mut items, 10, FetchDirection::Forward);
            assert!(evicted.is_empty());
            push_batch(&mut items, 10, page, FetchDirection::Forward);
        }
        assert_eq!(items.len(), 30);
        assert!(window.is_warm());
    }

    #[test]
    fn forward_batch_at_cap_evicts_from_head() {
        let mut window = EvictionWindow::new(30);
        let mut items = ItemList::new();
        for page in 0..3 {
            window.evict(&mut items, 10, FetchDirection::Forward);
            push_batch(&mut items, 10, page, FetchDirection::Forward);
        }
        let evicted = window.evict(&mut items, 10, FetchDirection::Forward);
        assert_eq!(evicted.len(), 10);
        assert!(evicted.iter().all(|n| n.page_id() == 0));
        assert_eq!(items.first().map(ItemNode::page_id), Some(1));
    }

    #[test]
    fn backward_batch_at_cap_evicts_from_tail() {
        let mut window = EvictionWindow::new(20);
        let mut items = ItemList::new();
        for page in 1..=2 {
            window.evict(&mut items, 10, FetchDirection::Forward);
            push_batch(&mut items, 10, page, FetchDirection::Forward);
        }
        let evicted = window.evict(&mut items, 10, FetchDirection::Backward);
        assert_eq!(evicted.len(), 10);
        assert!(evicted.iter().all(|n| n.page_id() == 2));
        assert_eq!(items.last().map(ItemNode::page_id), Some(1));
    }

    #[test]
    fn partial_batch_crossing_the_cap() {
        let mut window = EvictionWindow::new(25);
        let mut items = ItemList::new();
        for page in 0..2 {
            window.evict(&mut items, 10, FetchDirection::Forward);
            push_batch(&mut items, 10, page, FetchDirection::Forward);
        }
        // 20 rendered; the next 10 fill 5 free slots then evict 5.
        let evicted = window.evict(&mut items, 10, FetchDirection::Forward);
        assert_eq!(evicted.len(), 5);
    }

    #[test]
    fn eviction_from_empty_list_never_panics() {
        let mut window = EvictionWindow::new(2);
        let mut items = ItemList::new();
        window.evict(&mut items, 2, FetchDirection::Forward);
        let evicted = window.evict(&mut items, 5, FetchDirection::Backward);
        assert!(evicted.is_empty());
        assert_eq!(window.rendered_total(), 7);
    }
}
