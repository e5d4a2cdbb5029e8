//! Modal image viewer for the photo gallery.
//!
//! The lightbox is pure index bookkeeping: the modal image always shows the
//! source of the thumbnail at `current` while open. Missing or broken image
//! sources are not detected.

use crate::config::LightboxConfig;
use crate::surface::Surface;
use crate::types::{Key, NodeId};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Lightbox {
    modal: NodeId,
    image: NodeId,
    close: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    thumbnails: Vec<NodeId>,
    current: usize,
    open: bool,
}

impl Lightbox {
    /// Returns `None`, leaving the gallery inert, when the modal, its image or
    /// every thumbnail is missing.
    pub fn attach<S: Surface + ?Sized>(surface: &mut S, config: &LightboxConfig) -> Option<Self> {
        let modal = surface.query(&config.modal);
        let image = surface.query(&config.image);
        let thumbnails = surface.query_all(&config.thumbnails);
        let (Some(modal), Some(image)) = (modal, image) else {
            info!("gallery elements not found");
            return None;
        };
        if thumbnails.is_empty() {
            info!("gallery elements not found");
            return None;
        }
        surface.set_visible(modal, false);
        debug!(thumbnails = thumbnails.len(), "lightbox attached");
        Some(Self {
            modal,
            image,
            close: surface.query(&config.close),
            prev: surface.query(&config.prev),
            next: surface.query(&config.next),
            thumbnails,
            current: 0,
            open: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.thumbnails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty()
    }

    /// Open the modal on thumbnail `index` (clamped to the last thumbnail).
    pub fn open<S: Surface + ?Sized>(&mut self, surface: &mut S, index: usize) {
        self.current = index.min(self.thumbnails.len() - 1);
        info!(index = self.current, "thumbnail clicked");
        surface.set_visible(self.modal, true);
        self.open = true;
        self.sync_image(surface);
    }

    pub fn close<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.set_visible(self.modal, false);
        self.open = false;
    }

    pub fn next<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.current = (self.current + 1) % self.thumbnails.len();
        self.sync_image(surface);
    }

    pub fn prev<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let len = self.thumbnails.len();
        self.current = (self.current + len - 1) % len;
        self.sync_image(surface);
    }

    fn sync_image<S: Surface + ?Sized>(&self, surface: &mut S) {
        let thumbnail = self.thumbnails[self.current];
        let src = surface.image_source(thumbnail).unwrap_or_default();
        surface.set_image_source(self.image, &src);
    }

    /// Returns true when `target` is one of the lightbox elements.
    ///
    /// A click on the modal itself is a background click and closes it.
    pub fn handle_click<S: Surface + ?Sized>(&mut self, target: NodeId, surface: &mut S) -> bool {
        if let Some(index) = self.thumbnails.iter().position(|&t| t == target) {
            self.open(surface, index);
        } else if Some(target) == self.close || target == self.modal {
            self.close(surface);
        } else if Some(target) == self.prev {
            self.prev(surface);
        } else if Some(target) == self.next {
            self.next(surface);
        } else {
            return false;
        }
        true
    }

    /// Keyboard navigation; ignored while the modal is closed.
    pub fn handle_key<S: Surface + ?Sized>(&mut self, key: &Key, surface: &mut S) -> bool {
        if !self.open {
            return false;
        }
        match key {
            Key::Escape => self.close(surface),
            Key::ArrowLeft => self.prev(surface),
            Key::ArrowRight => self.next(surface),
            Key::Other(_) => return false,
        }
        true
    }
}
