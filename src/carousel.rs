//! Auto-advancing slide carousel.
//!
//! ## State Machine
//!
//! States are slide indices `0..n`. Transitions wrap circularly:
//!
//! ```text
//! prev from 0      → n - 1
//! next from n - 1  → 0
//! jump_to(i ≥ n)   → 0
//! ```
//!
//! ## Timer
//!
//! At most one repeating timer is alive. Every restart ([`Carousel::reset`],
//! [`Carousel::resume`]) cancels the previous handle before creating a new
//! one, so the slide can never advance twice per period. Manual transitions
//! restart the timer so the next automatic advance is a full interval away.
//! Pointer enter pauses; pointer leave resumes.

use crate::config::CarouselConfig;
use crate::surface::Surface;
use crate::types::{NodeId, TimerId};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<NodeId>,
    dots: Vec<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    container: Option<NodeId>,
    active_class: String,
    interval: Duration,
    current: usize,
    timer: Option<TimerId>,
}

impl Carousel {
    /// Bind to the slides and controls. Returns `None` when there are no slides.
    ///
    /// The slide already carrying the active class becomes the current one
    /// (slide 0 if none does) and the active markers are normalized. The
    /// timer is not started; call [`Carousel::start`].
    pub fn attach<S: Surface + ?Sized>(surface: &mut S, config: &CarouselConfig) -> Option<Self> {
        let slides = surface.query_all(&config.slides);
        if slides.is_empty() {
            return None;
        }
        let current = slides
            .iter()
            .position(|&slide| surface.has_class(slide, &config.active_class))
            .unwrap_or(0);
        let mut carousel = Self {
            dots: surface.query_all(&config.dots),
            prev: surface.query(&config.prev),
            next: surface.query(&config.next),
            container: surface.query(&config.container),
            slides,
            active_class: config.active_class.clone(),
            interval: config.interval(),
            current,
            timer: None,
        };
        carousel.show(surface, current as isize);
        debug!(
            slides = carousel.slides.len(),
            dots = carousel.dots.len(),
            "carousel attached"
        );
        Some(carousel)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Make slide `index` the only active slide, wrapping out-of-range
    /// indices: negative goes to the last slide, past the end goes to 0.
    fn show<S: Surface + ?Sized>(&mut self, surface: &mut S, index: isize) {
        let len = self.slides.len() as isize;
        let index: usize = if index >= len {
            0
        } else if index < 0 {
            (len - 1) as usize
        } else {
            index as usize
        };

        for &node in self.slides.iter().chain(&self.dots) {
            surface.remove_class(node, &self.active_class);
        }
        surface.add_class(self.slides[index], &self.active_class);
        if let Some(&dot) = self.dots.get(index) {
            surface.add_class(dot, &self.active_class);
        }
        self.current = index;
        debug!(slide = index, "carousel slide shown");
    }

    pub fn next<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.show(surface, self.current as isize + 1);
    }

    pub fn prev<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.show(surface, self.current as isize - 1);
    }

    pub fn jump_to<S: Surface + ?Sized>(&mut self, surface: &mut S, index: usize) {
        self.show(surface, index.min(isize::MAX as usize) as isize);
    }

    /// Start auto-advance if it is not already running.
    pub fn start<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.timer.is_none() {
            self.timer = Some(surface.set_interval(self.interval));
        }
    }

    /// Cancel the running timer (if any) and start a fresh one.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.pause(surface);
        self.start(surface);
    }

    pub fn pause<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(timer) = self.timer.take() {
            surface.clear_interval(timer);
        }
    }

    pub fn resume<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.reset(surface);
    }

    /// Returns true when `target` is one of the carousel controls.
    pub fn handle_click<S: Surface + ?Sized>(&mut self, target: NodeId, surface: &mut S) -> bool {
        if Some(target) == self.next {
            self.next(surface);
        } else if Some(target) == self.prev {
            self.prev(surface);
        } else if let Some(index) = self.dots.iter().position(|&dot| dot == target) {
            self.jump_to(surface, index);
        } else {
            return false;
        }
        self.reset(surface);
        true
    }

    pub fn handle_pointer<S: Surface + ?Sized>(&mut self, target: NodeId, entered: bool, surface: &mut S) {
        if Some(target) != self.container {
            return;
        }
        if entered {
            self.pause(surface);
        } else {
            self.resume(surface);
        }
    }

    /// Advance on our own timer; stale handles from cancelled timers are ignored.
    pub fn handle_timer<S: Surface + ?Sized>(&mut self, timer: TimerId, surface: &mut S) -> bool {
        if self.timer != Some(timer) {
            return false;
        }
        self.next(surface);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, MemoryDocument};

    struct Fixture {
        doc: MemoryDocument,
        slides: Vec<NodeId>,
        dots: Vec<NodeId>,
        prev: NodeId,
        next: NodeId,
        container: NodeId,
    }

    fn fixture(slide_count: usize, dot_count: usize) -> Fixture {
        let mut doc = MemoryDocument::new(800.0);
        let container = doc.append(None, Element::new("div").class("carousel-container"));
        let slides = (0..slide_count)
            .map(|_| doc.append(Some(container), Element::new("div").class("slide")))
            .collect();
        let prev = doc.append(Some(container), Element::new("button").class("prev"));
        let next = doc.append(Some(container), Element::new("button").class("next"));
        let dots = (0..dot_count)
            .map(|_| doc.append(Some(container), Element::new("span").class("dot")))
            .collect();
        Fixture {
            doc,
            slides,
            dots,
            prev,
            next,
            container,
        }
    }

    fn active(doc: &MemoryDocument, nodes: &[NodeId]) -> Vec<usize> {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| doc.has_class(**node, "active"))
            .map(|(i, _)| i)
            .collect()
    }

    fn fire_until(doc: &mut MemoryDocument, carousel: &mut Carousel, ms: u64) -> usize {
        let deadline = doc.now() + Duration::from_millis(ms);
        let mut advances = 0;
        while let Some(timer) = doc.pop_due_timer(deadline) {
            if carousel.handle_timer(timer, doc) {
                advances += 1;
            }
        }
        doc.set_now(deadline);
        advances
    }

    #[test]
    fn attach_marks_first_slide_active() {
        let mut f = fixture(3, 3);
        let carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        assert_eq!(carousel.current(), 0);
        assert_eq!(active(&f.doc, &f.slides), vec![0]);
        assert_eq!(active(&f.doc, &f.dots), vec![0]);
        assert!(!carousel.is_running());
    }

    #[test]
    fn attach_adopts_preset_active_slide() {
        let mut f = fixture(3, 3);
        f.doc.add_class(f.slides[2], "active");
        f.doc.add_class(f.dots[0], "active");
        let carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        assert_eq!(carousel.current(), 2);
        assert_eq!(active(&f.doc, &f.dots), vec![2]);
    }

    #[test]
    fn no_slides_means_no_carousel() {
        let mut f = fixture(0, 2);
        assert!(Carousel::attach(&mut f.doc, &CarouselConfig::default()).is_none());
    }

    #[test]
    fn showing_any_slide_leaves_exactly_one_active() {
        let mut f = fixture(4, 4);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        for i in 0..4 {
            carousel.jump_to(&mut f.doc, i);
            assert_eq!(active(&f.doc, &f.slides), vec![i]);
            assert_eq!(active(&f.doc, &f.dots), vec![i]);
        }
    }

    #[test]
    fn index_wraps_at_both_boundaries() {
        let mut f = fixture(3, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();

        carousel.prev(&mut f.doc);
        assert_eq!(carousel.current(), 2);
        carousel.next(&mut f.doc);
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn auto_advance_fires_once_per_interval() {
        let mut f = fixture(3, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.start(&mut f.doc);

        assert_eq!(fire_until(&mut f.doc, &mut carousel, 4999), 0);
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 1), 1);
        assert_eq!(carousel.current(), 1);
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 10_000), 2);
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn manual_interaction_restarts_the_interval() {
        let mut f = fixture(3, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.start(&mut f.doc);

        fire_until(&mut f.doc, &mut carousel, 4000);
        assert!(carousel.handle_click(f.next, &mut f.doc));
        assert_eq!(carousel.current(), 1);

        // Old timer would have fired at 5000; the restarted one fires at 9000.
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 4999), 0);
        assert_eq!(carousel.current(), 1);
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 1), 1);
        assert_eq!(carousel.current(), 2);
        assert_eq!(f.doc.active_timers().len(), 1);
    }

    #[test]
    fn prev_and_dot_clicks_transition_and_reset() {
        let mut f = fixture(3, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.start(&mut f.doc);

        assert!(carousel.handle_click(f.prev, &mut f.doc));
        assert_eq!(carousel.current(), 2);
        assert!(carousel.handle_click(f.dots[1], &mut f.doc));
        assert_eq!(carousel.current(), 1);
        assert_eq!(f.doc.active_timers().len(), 1);
        assert!(!carousel.handle_click(f.slides[0], &mut f.doc));
    }

    #[test]
    fn hover_pauses_and_leave_resumes_without_stacking() {
        let mut f = fixture(3, 0);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.start(&mut f.doc);

        carousel.handle_pointer(f.container, true, &mut f.doc);
        assert!(!carousel.is_running());
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 20_000), 0);

        // Two leaves in a row must not leave two timers behind.
        carousel.handle_pointer(f.container, false, &mut f.doc);
        carousel.handle_pointer(f.container, false, &mut f.doc);
        assert_eq!(f.doc.active_timers().len(), 1);
        assert_eq!(fire_until(&mut f.doc, &mut carousel, 5000), 1);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut f = fixture(3, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.start(&mut f.doc);
        let old = f.doc.active_timers()[0];
        carousel.reset(&mut f.doc);

        assert!(!carousel.handle_timer(old, &mut f.doc));
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn extra_dot_past_last_slide_jumps_to_first() {
        let mut f = fixture(2, 3);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.next(&mut f.doc);

        assert!(carousel.handle_click(f.dots[2], &mut f.doc));
        assert_eq!(carousel.current(), 0);
        assert_eq!(active(&f.doc, &f.slides), vec![0]);
        assert_eq!(active(&f.doc, &f.dots), vec![0]);
    }

    #[test]
    fn slide_without_dot_shows_no_active_dot() {
        let mut f = fixture(3, 2);
        let mut carousel = Carousel::attach(&mut f.doc, &CarouselConfig::default()).unwrap();
        carousel.jump_to(&mut f.doc, 2);

        assert_eq!(active(&f.doc, &f.slides), vec![2]);
        assert!(active(&f.doc, &f.dots).is_empty());
    }
}
