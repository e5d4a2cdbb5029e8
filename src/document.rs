//! In-memory document implementing [`Surface`].
//!
//! A flat arena of elements with parent links, class lists, attributes and a
//! fixed geometry (`top`, `height`) per element. Time is virtual: timers only
//! fire when the caller pops them with [`MemoryDocument::pop_due_timer`], and
//! animation frames are a flag the caller drains with
//! [`MemoryDocument::take_frame_request`]. [`Session`](crate::replay::Session)
//! wraps both loops.
//!
//! Documents are built in code with [`Element`] or loaded from a layout file:
//!
//! ```toml
//! [viewport]
//! height = 800.0
//!
//! [[element]]
//! tag = "nav"
//! classes = ["sticky-nav"]
//! height = 70.0
//!
//! [[element]]
//! tag = "ul"
//! id = "navMenu"
//! classes = ["nav-menu"]
//!
//! [[element]]
//! tag = "a"
//! parent = "navMenu"
//! attributes = { href = "#about" }
//! ```
//!
//! Parents are referenced by id and must be declared before their children.

use crate::selector::{Matchable, Selector, SelectorError};
use crate::surface::Surface;
use crate::types::{NodeId, ScrollBehavior, TimerId};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("duplicate element id {0:?}")]
    DuplicateId(String),
    #[error("element {child} references unknown parent {parent:?} (parents must come first)")]
    UnknownParent { child: usize, parent: String },
}

/// One element of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub top: f64,
    pub height: f64,
    pub visible: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            top: 0.0,
            height: 0.0,
            visible: true,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Place the element at `top` with the given `height`.
    pub fn at(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl Matchable for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        if name == "id" {
            return self.id.as_deref();
        }
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Duration,
    next_due: Duration,
}

/// A recorded call to [`Surface::scroll_to`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRecord {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    ids: HashMap<String, NodeId>,
    scroll_y: f64,
    viewport_height: f64,
    scrolls: Vec<ScrollRecord>,
    now: Duration,
    intervals: BTreeMap<TimerId, Interval>,
    next_timer: u64,
    frame_pending: bool,
    frame_requests: usize,
}

impl MemoryDocument {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            elements: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            roots: Vec::new(),
            ids: HashMap::new(),
            scroll_y: 0.0,
            viewport_height,
            scrolls: Vec::new(),
            now: Duration::ZERO,
            intervals: BTreeMap::new(),
            next_timer: 1,
            frame_pending: false,
            frame_requests: 0,
        }
    }

    /// Append `element` as the last child of `parent` (or as a root).
    ///
    /// A reused id keeps resolving to the first element that declared it.
    /// Layout files reject duplicates instead.
    pub fn append(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let node = NodeId(self.elements.len());
        if let Some(id) = &element.id {
            self.ids.entry(id.clone()).or_insert(node);
        }
        self.elements.push(element);
        self.parents.push(parent);
        self.children.push(Vec::new());
        match parent {
            Some(p) => self.children[p.0].push(node),
            None => self.roots.push(node),
        }
        node
    }

    /// Load a layout file.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path)?;
        Self::from_layout_str(&content)
    }

    pub fn from_layout_str(content: &str) -> Result<Self, LayoutError> {
        let layout: LayoutFile = toml::from_str(content)?;
        let mut doc = MemoryDocument::new(layout.viewport.height);
        doc.scroll_y = layout.viewport.scroll_y;
        for (index, spec) in layout.element.into_iter().enumerate() {
            if let Some(id) = &spec.id
                && doc.ids.contains_key(id)
            {
                return Err(LayoutError::DuplicateId(id.clone()));
            }
            let parent = match &spec.parent {
                Some(parent_id) => Some(doc.by_id(parent_id).ok_or_else(|| {
                    LayoutError::UnknownParent {
                        child: index,
                        parent: parent_id.clone(),
                    }
                })?),
                None => None,
            };
            let element = Element {
                tag: spec.tag,
                id: spec.id,
                classes: spec.classes,
                attributes: spec.attributes,
                top: spec.top,
                height: spec.height,
                visible: !spec.hidden,
            };
            doc.append(parent, element);
        }
        Ok(doc)
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.elements[node.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Evaluate a selector, reporting parse errors instead of matching nothing.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .document_order()
            .into_iter()
            .filter(|&node| self.matches(&selector, node))
            .collect())
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.elements[node.0].visible
    }

    /// Set the scroll offset without recording a [`ScrollRecord`]; used to
    /// model the user scrolling.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    /// Every [`Surface::scroll_to`] call so far, oldest first.
    pub fn scrolls(&self) -> &[ScrollRecord] {
        &self.scrolls
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the virtual clock forward without firing anything.
    ///
    /// Timers that were due before `to` are skipped forward, so callers that
    /// want them delivered must drain [`MemoryDocument::pop_due_timer`] first.
    pub fn set_now(&mut self, to: Duration) {
        self.now = self.now.max(to);
        let now = self.now;
        for interval in self.intervals.values_mut() {
            while interval.next_due <= now {
                interval.next_due += interval.period;
            }
        }
    }

    /// Pop the earliest timer firing at or before `deadline`, advancing the
    /// clock to its due time and scheduling its next period.
    pub fn pop_due_timer(&mut self, deadline: Duration) -> Option<TimerId> {
        let (&timer, interval) = self
            .intervals
            .iter_mut()
            .filter(|(_, interval)| interval.next_due <= deadline)
            .min_by_key(|(id, interval)| (interval.next_due, **id))?;
        self.now = interval.next_due;
        interval.next_due += interval.period;
        Some(timer)
    }

    /// Ids of the timers currently running.
    pub fn active_timers(&self) -> Vec<TimerId> {
        self.intervals.keys().copied().collect()
    }

    /// Returns and clears the pending animation-frame request.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    /// Total number of [`Surface::request_frame`] calls.
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node.0].iter().rev().copied());
        }
        order
    }

    fn ancestors(&self, node: NodeId) -> Vec<&Element> {
        let mut chain = Vec::new();
        let mut current = self.parents[node.0];
        while let Some(parent) = current {
            chain.push(&self.elements[parent.0]);
            current = self.parents[parent.0];
        }
        chain
    }

    fn is_descendant(&self, node: NodeId, scope: NodeId) -> bool {
        let mut current = self.parents[node.0];
        while let Some(parent) = current {
            if parent == scope {
                return true;
            }
            current = self.parents[parent.0];
        }
        false
    }

    fn matches(&self, selector: &Selector, node: NodeId) -> bool {
        selector.matches(&self.elements[node.0], &self.ancestors(node))
    }

    fn select_or_warn(&self, selector: &str) -> Vec<NodeId> {
        self.select(selector).unwrap_or_else(|err| {
            warn!(%err, "selector matches nothing");
            Vec::new()
        })
    }
}

impl Surface for MemoryDocument {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.select_or_warn(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select_or_warn(selector)
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        self.select_or_warn(selector)
            .into_iter()
            .filter(|&node| self.is_descendant(node, scope))
            .collect()
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.elements[node.0].attribute(name).map(str::to_string)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.elements[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.elements[node.0].classes.retain(|c| c != class);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        Matchable::has_class(&self.elements[node.0], class)
    }

    fn document_top(&self, node: NodeId) -> f64 {
        self.elements[node.0].top
    }

    fn height(&self, node: NodeId) -> f64 {
        self.elements[node.0].height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scrolls.push(ScrollRecord { top, behavior });
        self.scroll_y = top.max(0.0);
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.elements[node.0].visible = visible;
    }

    fn image_source(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "src")
    }

    fn set_image_source(&mut self, node: NodeId, src: &str) {
        self.elements[node.0]
            .attributes
            .insert("src".to_string(), src.to_string());
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        // Browsers clamp the delay too; a zero period would never let time pass.
        let period = period.max(Duration::from_millis(1));
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        self.intervals.insert(
            timer,
            Interval {
                period,
                next_due: self.now + period,
            },
        );
        timer
    }

    fn clear_interval(&mut self, timer: TimerId) {
        self.intervals.remove(&timer);
    }

    fn request_frame(&mut self) {
        self.frame_pending = true;
        self.frame_requests += 1;
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    viewport: ViewportSpec,
    #[serde(default)]
    element: Vec<ElementSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ViewportSpec {
    height: f64,
    scroll_y: f64,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            height: 800.0,
            scroll_y: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementSpec {
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    top: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    hidden: bool,
}
