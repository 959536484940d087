#![forbid(unsafe_code)]

//! Rendered item nodes.
//!
//! [`ItemList`] is the engine's model of the item wrapper: an ordered
//! sequence of [`ItemNode`]s, each owning the [`Element`] its template
//! produced plus the bookkeeping the engine needs (page id, drag offset,
//! measured width). The host mirrors inserts and removals into its DOM by
//! [`NodeId`].

use crate::page_tokens::PageId;
use infiniscroll_core::NodeId;
use std::collections::{BTreeMap, VecDeque};

/// Attribute stamped on every item with its originating page id.
pub const ATTR_PAGE_ID: &str = "data-pageid";

/// Attribute a template may set to give its item a stable identity.
pub const ATTR_DATA_ID: &str = "data-id";

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A minimal element tree: tag, attributes, class list, text, children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Add a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Add a class if not already present (`classList.add`).
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Remove a class if present (`classList.remove`).
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Serialize to HTML for hosts that patch via `innerHTML`.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            escape_into(&self.classes.join(" "), out);
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        out.push('>');
        if let Some(text) = &self.text {
            escape_into(text, out);
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// Container a template populates; analogous to a `<template>` content.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    roots: Vec<Element>,
}

impl Fragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level element.
    pub fn push(&mut self, element: Element) {
        self.roots.push(element);
    }

    /// Number of top-level elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn into_roots(self) -> Vec<Element> {
        self.roots
    }
}

// ---------------------------------------------------------------------------
// ItemNode
// ---------------------------------------------------------------------------

/// One rendered record.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    id: NodeId,
    page_id: PageId,
    element: Element,
    offset_x: f64,
    measured_width: Option<f64>,
}

impl ItemNode {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Page this item was fetched with.
    #[must_use]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    /// Current horizontal drag offset in pixels.
    #[must_use]
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn set_offset_x(&mut self, offset_x: f64) {
        self.offset_x = offset_x;
    }

    /// CSS transform for the current offset.
    #[must_use]
    pub fn transform(&self) -> String {
        if self.offset_x == 0.0 {
            "translateX(0)".to_string()
        } else {
            format!("translateX({}px)", self.offset_x)
        }
    }

    /// Width reported by the host, if it measured this item.
    #[must_use]
    pub fn measured_width(&self) -> Option<f64> {
        self.measured_width
    }

    pub fn set_measured_width(&mut self, width: f64) {
        self.measured_width = Some(width);
    }

    /// Identity used for the dismissed-items set: `data-id`, else the node id.
    #[must_use]
    pub fn item_key(&self) -> String {
        self.element
            .attr(ATTR_DATA_ID)
            .map_or_else(|| self.id.to_string(), str::to_string)
    }
}

// ---------------------------------------------------------------------------
// ItemList
// ---------------------------------------------------------------------------

/// Ordered rendered items, oldest at the head.
#[derive(Debug, Clone, Default)]
pub struct ItemList {
    nodes: VecDeque<ItemNode>,
    next_id: u64,
}

impl ItemList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `element` in a new node stamped with `page_id`.
    ///
    /// The node is not inserted; ids are never reused even if it is dropped.
    pub fn create_node(&mut self, mut element: Element, page_id: PageId) -> ItemNode {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        element.set_attr(ATTR_PAGE_ID, page_id.to_string());
        ItemNode {
            id,
            page_id,
            element,
            offset_x: 0.0,
            measured_width: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&ItemNode> {
        self.nodes.front()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ItemNode> {
        self.nodes.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ItemNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ItemNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Append nodes at the tail, keeping their order.
    pub fn extend_back(&mut self, nodes: Vec<ItemNode>) {
        self.nodes.extend(nodes);
    }

    /// Prepend nodes at the head, keeping their order.
    pub fn extend_front(&mut self, nodes: Vec<ItemNode>) {
        for node in nodes.into_iter().rev() {
            self.nodes.push_front(node);
        }
    }

    pub fn pop_front(&mut self) -> Option<ItemNode> {
        self.nodes.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<ItemNode> {
        self.nodes.pop_back()
    }

    /// Detach a node. Returns `None` if it is no longer attached.
    pub fn remove(&mut self, id: NodeId) -> Option<ItemNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        self.nodes.remove(pos)
    }

    /// Page ids in display order.
    #[must_use]
    pub fn page_ids(&self) -> Vec<PageId> {
        self.nodes.iter().map(ItemNode::page_id).collect()
    }
}
