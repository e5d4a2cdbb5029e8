//! Shared value types passed between the host surface and the behaviors.
//!
//! Everything here is plain data: handles into the surface, the events a host
//! delivers, and the answer a dispatch gives back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element owned by a [`Surface`](crate::surface::Surface).
///
/// Handles are only meaningful for the surface that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Opaque handle to a repeating timer created by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Keyboard keys the behaviors care about.
///
/// Names follow the DOM `KeyboardEvent.key` values, so hosts can convert
/// with [`Key::from_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Escape => f.write_str("Escape"),
            Key::ArrowLeft => f.write_str("ArrowLeft"),
            Key::ArrowRight => f.write_str("ArrowRight"),
            Key::Other(name) => f.write_str(name),
        }
    }
}

/// How the viewport moves to a new scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// An event delivered by the host to [`Page::dispatch`](crate::page::Page::dispatch).
///
/// `target` is the bound element the event was delivered to, not the
/// innermost element under the pointer. For the lightbox modal, hosts report
/// a `Click` on the modal only when the click landed on the modal itself
/// (its background), never when it bubbled up from a child.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click { target: NodeId },
    PointerEnter { target: NodeId },
    PointerLeave { target: NodeId },
    KeyDown { key: Key },
    Scroll,
    AnimationFrame,
    Timer(TimerId),
}

/// Whether the host should let the browser run its default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    PreventDefault,
}

impl Propagation {
    /// Combine two outcomes; prevention wins.
    pub fn merge(self, other: Propagation) -> Propagation {
        if self == Propagation::PreventDefault || other == Propagation::PreventDefault {
            Propagation::PreventDefault
        } else {
            Propagation::Continue
        }
    }
}
