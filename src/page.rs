//! Wires every behavior to one document.
//!
//! [`Page::attach`] is the "document ready" step: it binds each behavior,
//! runs the initial scroll-spy and reveal pass and starts the carousel.
//! Afterwards the host feeds every event through [`Page::dispatch`]. The
//! behaviors never talk to each other; all composition happens through the
//! shared document.
//!
//! ```text
//! Click          → nav toggle, router, carousel, lightbox
//! PointerEnter/  → carousel (pause / resume)
//!   PointerLeave
//! KeyDown        → lightbox
//! Scroll         → request one animation frame (coalesced)
//! AnimationFrame → scroll-spy, reveal
//! Timer          → carousel
//! ```

use crate::carousel::Carousel;
use crate::config::BehaviorConfig;
use crate::lightbox::Lightbox;
use crate::navigation::{NavToggle, ScrollRouter};
use crate::reveal::Reveal;
use crate::scroll_spy::ScrollSpy;
use crate::surface::Surface;
use crate::types::{PageEvent, Propagation};
use tracing::warn;

/// What [`Page::attach`] found in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachReport {
    pub nav_toggle: bool,
    pub nav_links: usize,
    pub slides: usize,
    pub dots: usize,
    pub spy_sections: usize,
    pub reveal_sections: usize,
    pub thumbnails: usize,
    pub warnings: Vec<String>,
}

impl AttachReport {
    pub fn carousel(&self) -> bool {
        self.slides > 0
    }

    pub fn lightbox(&self) -> bool {
        self.thumbnails > 0
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    nav: Option<NavToggle>,
    router: ScrollRouter,
    carousel: Option<Carousel>,
    spy: ScrollSpy,
    reveal: Reveal,
    lightbox: Option<Lightbox>,
    frame_requested: bool,
}

impl Page {
    pub fn attach<S: Surface + ?Sized>(surface: &mut S, config: &BehaviorConfig) -> (Self, AttachReport) {
        let header = config.header.selector.as_str();
        let nav = NavToggle::attach(surface, &config.navigation);
        let router = ScrollRouter::attach(surface, &config.router, header);
        let mut carousel = Carousel::attach(surface, &config.carousel);
        let spy = ScrollSpy::attach(surface, &config.scroll_spy, router.links(), header);
        let reveal = Reveal::attach(surface, &config.reveal);
        let lightbox = Lightbox::attach(surface, &config.lightbox);

        let mut report = AttachReport {
            nav_toggle: nav.is_some(),
            nav_links: router.links().len(),
            slides: carousel.as_ref().map_or(0, Carousel::len),
            dots: carousel.as_ref().map_or(0, Carousel::dot_count),
            spy_sections: spy.section_count(),
            reveal_sections: reveal.sections().len(),
            thumbnails: lightbox.as_ref().map_or(0, Lightbox::len),
            warnings: Vec::new(),
        };
        if report.carousel() && report.dots > 0 && report.dots != report.slides {
            report.warnings.push(format!(
                "carousel has {} slides but {} dots",
                report.slides, report.dots
            ));
        }
        for &link in router.links() {
            let Some(href) = surface.attribute(link, "href") else {
                continue;
            };
            let fragment = href.trim_start_matches('#');
            if !fragment.is_empty() && surface.by_id(fragment).is_none() {
                report
                    .warnings
                    .push(format!("nav link {href:?} has no target section"));
            }
        }
        for warning in &report.warnings {
            warn!("{warning}");
        }

        if let Some(carousel) = carousel.as_mut() {
            carousel.start(surface);
        }
        let mut page = Self {
            nav,
            router,
            carousel,
            spy,
            reveal,
            lightbox,
            frame_requested: false,
        };
        page.evaluate_scroll(surface);
        (page, report)
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn lightbox(&self) -> Option<&Lightbox> {
        self.lightbox.as_ref()
    }

    pub fn reveal(&self) -> &Reveal {
        &self.reveal
    }

    pub fn is_menu_open<S: Surface + ?Sized>(&self, surface: &S) -> bool {
        self.nav.as_ref().is_some_and(|nav| nav.is_open(surface))
    }

    pub fn dispatch<S: Surface + ?Sized>(&mut self, event: PageEvent, surface: &mut S) -> Propagation {
        match event {
            PageEvent::Click { target } => {
                if let Some(nav) = &self.nav {
                    nav.handle_click(target, surface);
                }
                let outcome = self.router.handle_click(target, surface);
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.handle_click(target, surface);
                }
                if let Some(lightbox) = self.lightbox.as_mut() {
                    lightbox.handle_click(target, surface);
                }
                return outcome;
            }
            PageEvent::PointerEnter { target } | PageEvent::PointerLeave { target } => {
                let entered = matches!(event, PageEvent::PointerEnter { .. });
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.handle_pointer(target, entered, surface);
                }
            }
            PageEvent::KeyDown { key } => {
                if let Some(lightbox) = self.lightbox.as_mut() {
                    lightbox.handle_key(&key, surface);
                }
            }
            PageEvent::Scroll => {
                if !self.frame_requested {
                    self.frame_requested = true;
                    surface.request_frame();
                }
            }
            PageEvent::AnimationFrame => {
                self.frame_requested = false;
                self.evaluate_scroll(surface);
            }
            PageEvent::Timer(timer) => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.handle_timer(timer, surface);
                }
            }
        }
        Propagation::Continue
    }

    fn evaluate_scroll<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.spy.update(surface);
        self.reveal.evaluate(surface);
    }
}
