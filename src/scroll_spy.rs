//! Highlights the nav link of the section under the fixed header.
//!
//! Evaluation is stateless: the active link is recomputed from geometry each
//! time. When the probe position falls in no section (above the first, in a
//! gap, or past the last), the previous highlight is deliberately left as is.

use crate::config::ScrollSpyConfig;
use crate::surface::{Surface, element_height};
use crate::types::NodeId;

#[derive(Debug, Clone)]
struct Tracked {
    node: NodeId,
    fragment: String,
}

#[derive(Debug, Clone)]
pub struct ScrollSpy {
    sections: Vec<Tracked>,
    links: Vec<NodeId>,
    header: String,
    margin: f64,
    active_class: String,
}

impl ScrollSpy {
    /// Track every identified section against `links`.
    pub fn attach<S: Surface + ?Sized>(
        surface: &S,
        config: &ScrollSpyConfig,
        links: &[NodeId],
        header_selector: &str,
    ) -> Self {
        let sections = surface
            .query_all(&config.sections)
            .into_iter()
            .filter_map(|node| {
                let id = surface.attribute(node, "id").filter(|id| !id.is_empty())?;
                Some(Tracked {
                    node,
                    fragment: format!("#{id}"),
                })
            })
            .collect();
        Self {
            sections,
            links: links.to_vec(),
            header: header_selector.to_string(),
            margin: config.margin,
            active_class: config.active_class.clone(),
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Document position compared against section bounds.
    pub fn probe_position<S: Surface + ?Sized>(&self, surface: &S) -> f64 {
        surface.scroll_y() + element_height(surface, &self.header) + self.margin
    }

    /// Highlight the link for the first section containing the probe.
    ///
    /// Returns the section that matched, if any.
    pub fn update<S: Surface + ?Sized>(&self, surface: &mut S) -> Option<NodeId> {
        let position = self.probe_position(surface);
        let section = self.sections.iter().find(|section| {
            let top = surface.document_top(section.node);
            position >= top && position < top + surface.height(section.node)
        })?;
        for &link in &self.links {
            if surface.attribute(link, "href").as_deref() == Some(section.fragment.as_str()) {
                surface.add_class(link, &self.active_class);
            } else {
                surface.remove_class(link, &self.active_class);
            }
        }
        Some(section.node)
    }
}
