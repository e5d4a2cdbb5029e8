//! The UI surface: everything the behaviors need from a host document.
//!
//! Behaviors never touch a DOM directly. They look elements up, flip classes,
//! read geometry and schedule timers through this trait, which is implemented
//! by [`MemoryDocument`](crate::document::MemoryDocument) for tests and the
//! CLI. A browser host implements it over the live DOM.
//!
//! Lookups take CSS selector strings from [`BehaviorConfig`](crate::config::BehaviorConfig).
//! A selector the surface cannot evaluate behaves like a selector that matches
//! nothing; behaviors treat that the same as missing markup.

use crate::types::{NodeId, ScrollBehavior, TimerId};
use std::time::Duration;

pub trait Surface {
    /// First element matching `selector`, in document order.
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId>;

    fn by_id(&self, id: &str) -> Option<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Flip `class` on `node`; returns whether the class is now present.
    fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Distance from the top of the document to the top of `node`.
    fn document_top(&self, node: NodeId) -> f64;

    /// Rendered height of `node`.
    fn height(&self, node: NodeId) -> f64;

    /// Current vertical scroll offset of the viewport.
    fn scroll_y(&self) -> f64;

    fn viewport_height(&self) -> f64;

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);

    fn set_visible(&mut self, node: NodeId, visible: bool);

    fn image_source(&self, node: NodeId) -> Option<String>;

    fn set_image_source(&mut self, node: NodeId, src: &str);

    /// Start a repeating timer. The host later delivers
    /// [`PageEvent::Timer`](crate::types::PageEvent::Timer) with the returned id
    /// once per elapsed period until [`Surface::clear_interval`] is called.
    fn set_interval(&mut self, period: Duration) -> TimerId;

    fn clear_interval(&mut self, timer: TimerId);

    /// Ask for one [`PageEvent::AnimationFrame`](crate::types::PageEvent::AnimationFrame)
    /// before the next repaint.
    fn request_frame(&mut self);
}

/// Height of the element matched by `selector`, or 0 when it is absent.
pub fn element_height<S: Surface + ?Sized>(surface: &S, selector: &str) -> f64 {
    surface
        .query(selector)
        .map(|node| surface.height(node))
        .unwrap_or(0.0)
}
