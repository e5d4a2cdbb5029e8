//! Mobile menu toggle and in-page anchor scrolling.

use crate::config::{NavigationConfig, RouterConfig};
use crate::surface::{Surface, element_height};
use crate::types::{NodeId, Propagation, ScrollBehavior};
use tracing::debug;

/// Opens and closes the mobile menu.
///
/// The toggle control and the menu container always carry the open class
/// together: a toggle click sets both to the opposite of the control's
/// current state, and any link inside the menu clears both.
#[derive(Debug, Clone)]
pub struct NavToggle {
    toggle: NodeId,
    menu: NodeId,
    links: Vec<NodeId>,
    open_class: String,
}

impl NavToggle {
    /// Returns `None` when either the toggle or the menu is missing.
    pub fn attach<S: Surface + ?Sized>(surface: &S, config: &NavigationConfig) -> Option<Self> {
        let toggle = surface.query(&config.toggle)?;
        let menu = surface.query(&config.menu)?;
        let links = surface.query_within(menu, &config.menu_links);
        debug!(links = links.len(), "navigation toggle attached");
        Some(Self {
            toggle,
            menu,
            links,
            open_class: config.open_class.clone(),
        })
    }

    pub fn is_open<S: Surface + ?Sized>(&self, surface: &S) -> bool {
        surface.has_class(self.toggle, &self.open_class)
    }

    /// Returns true when `target` belongs to this behavior.
    pub fn handle_click<S: Surface + ?Sized>(&self, target: NodeId, surface: &mut S) -> bool {
        if target == self.toggle {
            let open = !self.is_open(surface);
            self.set_open(surface, open);
            true
        } else if self.links.contains(&target) {
            self.set_open(surface, false);
            true
        } else {
            false
        }
    }

    fn set_open<S: Surface + ?Sized>(&self, surface: &mut S, open: bool) {
        for node in [self.toggle, self.menu] {
            if open {
                surface.add_class(node, &self.open_class);
            } else {
                surface.remove_class(node, &self.open_class);
            }
        }
    }
}

/// Intercepts clicks on `#fragment` links and scrolls to the target section
/// below the fixed header.
#[derive(Debug, Clone)]
pub struct ScrollRouter {
    links: Vec<NodeId>,
    header: String,
    correction: f64,
    behavior: ScrollBehavior,
}

impl ScrollRouter {
    pub fn attach<S: Surface + ?Sized>(
        surface: &S,
        config: &RouterConfig,
        header_selector: &str,
    ) -> Self {
        let links = surface.query_all(&config.links);
        debug!(links = links.len(), "scroll router attached");
        Self {
            links,
            header: header_selector.to_string(),
            correction: config.correction,
            behavior: config.behavior,
        }
    }

    /// The nav links this router intercepts, in document order.
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    /// Default navigation is cancelled for every fragment link, including the
    /// bare `#` anchor, which then does nothing. A fragment naming no element
    /// is also a silent no-op.
    pub fn handle_click<S: Surface + ?Sized>(&self, target: NodeId, surface: &mut S) -> Propagation {
        if !self.links.contains(&target) {
            return Propagation::Continue;
        }
        let Some(href) = surface.attribute(target, "href") else {
            return Propagation::Continue;
        };
        let Some(fragment) = href.strip_prefix('#') else {
            return Propagation::Continue;
        };
        if fragment.is_empty() {
            return Propagation::PreventDefault;
        }
        if let Some(section) = surface.by_id(fragment) {
            let top = self.destination(surface, section);
            debug!(fragment, top, "smooth scroll");
            surface.scroll_to(top, self.behavior);
        }
        Propagation::PreventDefault
    }

    /// Scroll offset that puts `section` just below the fixed header.
    pub fn destination<S: Surface + ?Sized>(&self, surface: &S, section: NodeId) -> f64 {
        surface.document_top(section) - element_height(surface, &self.header) + self.correction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BehaviorConfig;
    use crate::document::{Element, MemoryDocument};

    struct Fixture {
        doc: MemoryDocument,
        toggle: NodeId,
        menu: NodeId,
        about_link: NodeId,
        home_link: NodeId,
        missing_link: NodeId,
        blog_link: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new(800.0);
        let header = doc.append(None, Element::new("nav").class("sticky-nav").at(0.0, 70.0));
        let toggle = doc.append(Some(header), Element::new("button").id("hamburger"));
        let menu = doc.append(Some(header), Element::new("ul").id("navMenu").class("nav-menu"));
        let home_link = doc.append(Some(menu), Element::new("a").attr("href", "#"));
        let about_link = doc.append(Some(menu), Element::new("a").attr("href", "#about"));
        let missing_link = doc.append(Some(menu), Element::new("a").attr("href", "#nowhere"));
        let blog_link = doc.append(Some(menu), Element::new("a").attr("href", "/blog"));
        doc.append(None, Element::new("section").id("about").at(1200.0, 600.0));
        Fixture {
            doc,
            toggle,
            menu,
            about_link,
            home_link,
            missing_link,
            blog_link,
        }
    }

    #[test]
    fn toggle_opens_and_closes_both_elements() {
        let mut f = fixture();
        let nav = NavToggle::attach(&f.doc, &NavigationConfig::default()).unwrap();

        assert!(nav.handle_click(f.toggle, &mut f.doc));
        assert!(f.doc.has_class(f.toggle, "active"));
        assert!(f.doc.has_class(f.menu, "active"));

        nav.handle_click(f.toggle, &mut f.doc);
        assert!(!f.doc.has_class(f.toggle, "active"));
        assert!(!f.doc.has_class(f.menu, "active"));
    }

    #[test]
    fn menu_link_click_forces_closed() {
        let mut f = fixture();
        let nav = NavToggle::attach(&f.doc, &NavigationConfig::default()).unwrap();
        nav.handle_click(f.toggle, &mut f.doc);
        assert!(nav.is_open(&f.doc));

        assert!(nav.handle_click(f.blog_link, &mut f.doc));
        assert!(!nav.is_open(&f.doc));
        assert!(!f.doc.has_class(f.menu, "active"));

        // Closing an already closed menu stays closed
        nav.handle_click(f.about_link, &mut f.doc);
        assert!(!nav.is_open(&f.doc));
    }

    #[test]
    fn toggle_missing_menu_is_not_attached() {
        let mut doc = MemoryDocument::new(800.0);
        doc.append(None, Element::new("button").id("hamburger"));
        assert!(NavToggle::attach(&doc, &NavigationConfig::default()).is_none());
    }

    #[test]
    fn router_scrolls_below_header_with_correction() {
        let mut f = fixture();
        let config = BehaviorConfig::default();
        let router = ScrollRouter::attach(&f.doc, &config.router, &config.header.selector);

        let outcome = router.handle_click(f.about_link, &mut f.doc);
        assert_eq!(outcome, Propagation::PreventDefault);
        // 1200 - 70 + 5
        assert_eq!(f.doc.scrolls().len(), 1);
        assert_eq!(f.doc.scrolls()[0].top, 1135.0);
        assert_eq!(f.doc.scrolls()[0].behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn empty_fragment_prevents_default_without_scrolling() {
        let mut f = fixture();
        let config = BehaviorConfig::default();
        let router = ScrollRouter::attach(&f.doc, &config.router, &config.header.selector);

        let outcome = router.handle_click(f.home_link, &mut f.doc);
        assert_eq!(outcome, Propagation::PreventDefault);
        assert!(f.doc.scrolls().is_empty());
    }

    #[test]
    fn missing_target_is_silent_noop() {
        let mut f = fixture();
        let config = BehaviorConfig::default();
        let router = ScrollRouter::attach(&f.doc, &config.router, &config.header.selector);

        let outcome = router.handle_click(f.missing_link, &mut f.doc);
        assert_eq!(outcome, Propagation::PreventDefault);
        assert!(f.doc.scrolls().is_empty());
    }

    #[test]
    fn non_fragment_links_are_not_intercepted() {
        let mut f = fixture();
        let config = BehaviorConfig::default();
        let router = ScrollRouter::attach(&f.doc, &config.router, &config.header.selector);

        assert!(!router.links().contains(&f.blog_link));
        assert_eq!(router.handle_click(f.blog_link, &mut f.doc), Propagation::Continue);
    }

    #[test]
    fn missing_header_counts_as_zero_height() {
        let mut doc = MemoryDocument::new(800.0);
        let menu = doc.append(None, Element::new("ul").class("nav-menu"));
        let link = doc.append(Some(menu), Element::new("a").attr("href", "#contact"));
        doc.append(None, Element::new("section").id("contact").at(400.0, 300.0));
        let config = BehaviorConfig::default();
        let router = ScrollRouter::attach(&doc, &config.router, &config.header.selector);

        let _ = router.handle_click(link, &mut doc);
        assert_eq!(doc.scrolls()[0].top, 405.0);
    }
}
