//! # Site Interactions
//!
//! The interactive layer of a single-page marketing site: a mobile navigation
//! toggle, smooth scrolling to in-page sections, an auto-advancing carousel,
//! scroll-spy highlighting, fade-in-on-scroll sections and a gallery lightbox.
//!
//! # Architecture: Behaviors Over a Surface
//!
//! Every behavior is written against the [`surface::Surface`] trait, a small
//! view of the document: query by selector, read geometry, toggle classes,
//! scroll, schedule timers. [`document::MemoryDocument`] implements it for an
//! in-memory page loaded from a TOML layout, which is what the tests and the
//! `check` and `replay` commands run against.
//!
//! A [`page::Page`] attaches all behaviors to one surface and routes
//! [`types::PageEvent`]s to them. Behaviors never call each other; they only
//! share the document. That keeps each one testable on its own:
//!
//! - **No browser needed**: the in-memory document has virtual time, so a
//!   five-second carousel interval is a `wait` call, not a sleep.
//! - **Absent markup is fine**: a behavior whose elements are missing stays
//!   inert instead of failing the page.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`navigation`] | Mobile menu toggle and smooth-scroll router for anchor links |
//! | [`carousel`] | Slide rotation with indicators, controls, auto-advance and hover pause |
//! | [`scroll_spy`] | Highlights the nav link of the section under the header |
//! | [`reveal`] | One-shot fade-in of sections as they enter the viewport |
//! | [`lightbox`] | Modal image viewer with wrap-around and keyboard control |
//! | [`page`] | Attaches every behavior and dispatches events |
//! | [`surface`] | The document abstraction behaviors are written against |
//! | [`document`] | In-memory [`surface::Surface`] with TOML layouts and virtual time |
//! | [`selector`] | CSS selector subset used by the in-memory document |
//! | [`replay`] | Scripted user sessions over an in-memory document |
//! | [`config`] | `site-interactions.toml` loading, merging and validation |
//! | [`types`] | Shared handles and events (`NodeId`, `PageEvent`, `Propagation`) |
//! | [`output`] | CLI output formatting for `check` and `replay` |
//!
//! # Design Decisions
//!
//! ## Coalesced Scroll Handling
//!
//! Scroll events only request an animation frame; scroll-spy and reveal run
//! once per frame. A burst of scroll events between two frames costs one
//! evaluation.
//!
//! ## Reveal Is One-Way
//!
//! Once a section has faded in it stays visible. Scrolling back up never
//! hides content the reader has already seen.
//!
//! ## One Carousel Timer
//!
//! Every manual navigation restarts the auto-advance interval, and a
//! restart always clears the previous timer first. At most one interval is
//! ever live, no matter how the pointer enters and leaves the container.

pub mod carousel;
pub mod config;
pub mod document;
pub mod lightbox;
pub mod navigation;
pub mod output;
pub mod page;
pub mod replay;
pub mod reveal;
pub mod scroll_spy;
pub mod selector;
pub mod surface;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
