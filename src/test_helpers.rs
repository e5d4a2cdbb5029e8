//! Shared test utilities for the site-interactions test suite.
//!
//! Loads the `fixtures/landing.toml` page and provides lookups and class
//! extractors that read well in assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut doc = landing_page();
//! let (page, _) = Page::attach(&mut doc, &BehaviorConfig::default());
//! assert_eq!(active_nav_hrefs(&doc), vec!["#home"]);
//! ```

use std::path::Path;

use crate::document::MemoryDocument;
use crate::surface::Surface;
use crate::types::NodeId;

// =========================================================================
// Fixture setup
// =========================================================================

/// Load `fixtures/landing.toml` into a fresh document.
pub fn landing_page() -> MemoryDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/landing.toml");
    MemoryDocument::load(&path).unwrap()
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find the nav link with the given `href`. Panics if not found.
pub fn nav_link(doc: &MemoryDocument, href: &str) -> NodeId {
    doc.query_all(".nav-menu a")
        .into_iter()
        .find(|&link| doc.attribute(link, "href").as_deref() == Some(href))
        .unwrap_or_else(|| panic!("nav link {href:?} not found"))
}

/// First element matching `selector`. Panics if nothing matches.
pub fn find(doc: &MemoryDocument, selector: &str) -> NodeId {
    doc.query(selector)
        .unwrap_or_else(|| panic!("no element matches {selector:?}"))
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// `href`s of the nav links currently carrying the `active` class.
pub fn active_nav_hrefs(doc: &MemoryDocument) -> Vec<String> {
    doc.query_all(".nav-menu a")
        .into_iter()
        .filter(|&link| doc.has_class(link, "active"))
        .filter_map(|link| doc.attribute(link, "href"))
        .collect()
}

/// Positions (within `selector`'s matches) of elements carrying `class`.
pub fn positions_with_class(doc: &MemoryDocument, selector: &str, class: &str) -> Vec<usize> {
    doc.query_all(selector)
        .into_iter()
        .enumerate()
        .filter(|&(_, node)| doc.has_class(node, class))
        .map(|(i, _)| i)
        .collect()
}
