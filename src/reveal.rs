//! One-shot entrance animation for sections entering the viewport.
//!
//! Visibility is measured directly from geometry instead of through an
//! intersection-observer primitive. The root rectangle is the viewport with
//! its bottom edge pulled up by `bottom_margin`; a section is revealed the
//! first time the visible fraction of its height reaches `threshold`.
//! Revealed sections go into a triggered set and are never measured again.

use crate::config::RevealConfig;
use crate::surface::Surface;
use crate::types::NodeId;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Reveal {
    sections: Vec<NodeId>,
    triggered: BTreeSet<NodeId>,
    revealed_class: String,
    threshold: f64,
    bottom_margin: f64,
}

impl Reveal {
    /// Tag every qualifying section with the pending class.
    pub fn attach<S: Surface + ?Sized>(surface: &mut S, config: &RevealConfig) -> Self {
        let sections: Vec<NodeId> = surface
            .query_all(&config.sections)
            .into_iter()
            .filter(|&node| !surface.has_class(node, &config.exclude_class))
            .collect();
        for &node in &sections {
            surface.add_class(node, &config.pending_class);
        }
        debug!(sections = sections.len(), "reveal attached");
        Self {
            sections,
            triggered: BTreeSet::new(),
            revealed_class: config.revealed_class.clone(),
            threshold: config.threshold,
            bottom_margin: config.bottom_margin,
        }
    }

    pub fn sections(&self) -> &[NodeId] {
        &self.sections
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.triggered.contains(&node)
    }

    pub fn pending(&self) -> usize {
        self.sections.len() - self.triggered.len()
    }

    /// Fraction of `node`'s height inside the (margin-adjusted) viewport.
    pub fn visible_fraction<S: Surface + ?Sized>(&self, surface: &S, node: NodeId) -> f64 {
        let root_top = surface.scroll_y();
        let root_bottom = root_top + (surface.viewport_height() - self.bottom_margin).max(0.0);
        let top = surface.document_top(node);
        let height = surface.height(node);
        if height <= 0.0 {
            return if top >= root_top && top < root_bottom { 1.0 } else { 0.0 };
        }
        let overlap = (top + height).min(root_bottom) - top.max(root_top);
        (overlap.max(0.0) / height).min(1.0)
    }

    /// Reveal every pending section that crossed the threshold.
    ///
    /// Returns the sections revealed by this pass.
    pub fn evaluate<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Vec<NodeId> {
        let view: &S = surface;
        let newly: Vec<NodeId> = self
            .sections
            .iter()
            .copied()
            .filter(|node| !self.triggered.contains(node))
            .filter(|&node| self.visible_fraction(view, node) >= self.threshold)
            .collect();
        for &node in &newly {
            surface.add_class(node, &self.revealed_class);
            self.triggered.insert(node);
            debug!(node = node.0, "section revealed");
        }
        newly
    }
}
