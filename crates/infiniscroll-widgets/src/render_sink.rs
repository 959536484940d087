#![forbid(unsafe_code)]

//! Template boundary and batch insertion.
//!
//! A render call is all-or-nothing: every record is templated first, and
//! only when all of them satisfied the one-root contract does eviction run
//! and the batch get inserted. A [`TemplateError`] therefore leaves both the
//! item list and the eviction counter untouched.

use crate::error::TemplateError;
use crate::eviction::EvictionWindow;
use crate::item_list::{Element, Fragment, ItemList, ItemNode};
use crate::page_tokens::{PageId, PageToken};
use infiniscroll_core::{FetchDirection, NodeId};
use serde::{Deserialize, Serialize};

/// One successful fetch: records in server order plus the next token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<R> {
    pub messages: Vec<R>,
    #[serde(default)]
    pub page_token: Option<PageToken>,
}

impl<R> PageResult<R> {
    #[must_use]
    pub fn new(messages: Vec<R>, page_token: Option<PageToken>) -> Self {
        Self {
            messages,
            page_token,
        }
    }
}

/// Caller-supplied rendering of one record.
///
/// Implementations push exactly one top-level element into `fragment`.
/// Closures `Fn(&mut Fragment, &R)` implement this trait.
pub trait ItemTemplate<R> {
    fn render(&self, fragment: &mut Fragment, record: &R);
}

impl<R, F> ItemTemplate<R> for F
where
    F: Fn(&mut Fragment, &R),
{
    fn render(&self, fragment: &mut Fragment, record: &R) {
        self(fragment, record);
    }
}

/// What a render call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub direction: FetchDirection,
    pub page_id: PageId,
    /// Inserted node ids in display order.
    pub inserted: Vec<NodeId>,
    /// Evicted node ids in eviction order.
    pub evicted: Vec<NodeId>,
}

/// Applies template output to the item list.
pub struct RenderSink<R> {
    template: Box<dyn ItemTemplate<R>>,
}

impl<R> std::fmt::Debug for RenderSink<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSink").finish_non_exhaustive()
    }
}

impl<R> RenderSink<R> {
    pub fn new(template: impl ItemTemplate<R> + 'static) -> Self {
        Self {
            template: Box::new(template),
        }
    }

    /// Template a single record, enforcing the one-root contract.
    pub fn template_one(&self, record: &R) -> Result<Element, TemplateError> {
        let mut fragment = Fragment::new();
        self.template.render(&mut fragment, record);
        let mut roots = fragment.into_roots();
        match roots.len() {
            0 => Err(TemplateError::EmptyFragment),
            1 => Ok(roots.remove(0)),
            n => Err(TemplateError::MultipleRoots(n)),
        }
    }

    /// Render `records` stamped with `page_id` at the `direction` edge.
    pub fn render(
        &self,
        items: &mut ItemList,
        window: &mut EvictionWindow,
        records: &[R],
        page_id: PageId,
        direction: FetchDirection,
    ) -> Result<RenderReport, TemplateError> {
        let elements = records
            .iter()
            .map(|record| self.template_one(record))
            .collect::<Result<Vec<_>, _>>()?;

        let evicted = window.evict(items, elements.len(), direction);

        let nodes: Vec<ItemNode> = elements
            .into_iter()
            .map(|element| items.create_node(element, page_id))
            .collect();
        let inserted = nodes.iter().map(ItemNode::id).collect();
        match direction {
            FetchDirection::Forward => items.extend_back(nodes),
            FetchDirection::Backward => items.extend_front(nodes),
        }

        Ok(RenderReport {
            direction,
            page_id,
            inserted,
            evicted: evicted.iter().map(ItemNode::id).collect(),
        })
    }
}
