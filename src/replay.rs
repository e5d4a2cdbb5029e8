//! Drive a [`Page`] over a [`MemoryDocument`] like a browser would.
//!
//! A [`Session`] owns the document and the page and runs the host loops the
//! in-memory document leaves to its caller: timers fire as virtual time
//! passes, and pending animation frames are delivered after every step.
//! Scripts are TOML files of `[[step]]` tables:
//!
//! ```toml
//! [[step]]
//! click = "#hamburger"
//!
//! [[step]]
//! hover = ".carousel-container"
//!
//! [[step]]
//! wait_ms = 5000
//!
//! [[step]]
//! scroll_to = 1450.0
//!
//! [[step]]
//! key = "Escape"
//! ```

use crate::config::BehaviorConfig;
use crate::document::{LayoutError, MemoryDocument};
use crate::page::{AttachReport, Page};
use crate::selector::SelectorError;
use crate::surface::Surface;
use crate::types::{Key, NodeId, PageEvent, Propagation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),
    #[error("no element matches {0:?}")]
    NoMatch(String),
    #[error("step {index}: {reason}")]
    InvalidStep { index: usize, reason: String },
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Click(String),
    Hover(String),
    Unhover(String),
    Key(Key),
    ScrollTo(f64),
    Wait(Duration),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Click(selector) => write!(f, "click {selector}"),
            Action::Hover(selector) => write!(f, "hover {selector}"),
            Action::Unhover(selector) => write!(f, "unhover {selector}"),
            Action::Key(key) => write!(f, "key {key}"),
            Action::ScrollTo(y) => write!(f, "scroll to {y}"),
            Action::Wait(d) => write!(f, "wait {}ms", d.as_millis()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StepSpec {
    click: Option<String>,
    hover: Option<String>,
    unhover: Option<String>,
    key: Option<String>,
    scroll_to: Option<f64>,
    wait_ms: Option<u64>,
}

impl StepSpec {
    fn into_action(self, index: usize) -> Result<Action, ReplayError> {
        let mut actions = Vec::new();
        if let Some(s) = self.click {
            actions.push(Action::Click(s));
        }
        if let Some(s) = self.hover {
            actions.push(Action::Hover(s));
        }
        if let Some(s) = self.unhover {
            actions.push(Action::Unhover(s));
        }
        if let Some(k) = self.key {
            actions.push(Action::Key(Key::from_name(&k)));
        }
        if let Some(y) = self.scroll_to {
            actions.push(Action::ScrollTo(y));
        }
        if let Some(ms) = self.wait_ms {
            actions.push(Action::Wait(Duration::from_millis(ms)));
        }
        match actions.len() {
            1 => Ok(actions.remove(0)),
            0 => Err(ReplayError::InvalidStep {
                index,
                reason: "no action given".into(),
            }),
            n => Err(ReplayError::InvalidStep {
                index,
                reason: format!("{n} actions given, expected exactly one"),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    #[serde(default)]
    step: Vec<StepSpec>,
}

/// Parse a replay script.
pub fn parse_script(content: &str) -> Result<Vec<Action>, ReplayError> {
    let file: ScriptFile = toml::from_str(content)?;
    file.step
        .into_iter()
        .enumerate()
        .map(|(index, spec)| spec.into_action(index + 1))
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<Action>, ReplayError> {
    parse_script(&fs::read_to_string(path)?)
}

/// Observable page state after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub elapsed_ms: u64,
    pub scroll_y: f64,
    pub menu_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide: Option<usize>,
    pub carousel_running: bool,
    pub active_links: Vec<String>,
    pub revealed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lightbox: Option<LightboxSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightboxSnapshot {
    pub open: bool,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// Result of one replayed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub action: String,
    pub prevented_default: bool,
    pub state: Snapshot,
}

#[derive(Debug)]
pub struct Session {
    document: MemoryDocument,
    page: Page,
    report: AttachReport,
    config: BehaviorConfig,
}

impl Session {
    pub fn new(mut document: MemoryDocument, config: BehaviorConfig) -> Self {
        let (page, report) = Page::attach(&mut document, &config);
        Self {
            document,
            page,
            report,
            config,
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn report(&self) -> &AttachReport {
        &self.report
    }

    fn resolve(&self, selector: &str) -> Result<NodeId, ReplayError> {
        self.document
            .select(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| ReplayError::NoMatch(selector.to_string()))
    }

    /// Deliver an event, then the scroll and frame events it causes.
    fn dispatch(&mut self, event: PageEvent) -> Propagation {
        let before = self.document.scroll_y();
        let outcome = self.page.dispatch(event, &mut self.document);
        if self.document.scroll_y() != before {
            let _ = self.page.dispatch(PageEvent::Scroll, &mut self.document);
        }
        self.flush_frames();
        outcome
    }

    fn flush_frames(&mut self) {
        while self.document.take_frame_request() {
            let _ = self
                .page
                .dispatch(PageEvent::AnimationFrame, &mut self.document);
        }
    }

    pub fn click(&mut self, selector: &str) -> Result<Propagation, ReplayError> {
        let target = self.resolve(selector)?;
        Ok(self.dispatch(PageEvent::Click { target }))
    }

    pub fn hover(&mut self, selector: &str) -> Result<(), ReplayError> {
        let target = self.resolve(selector)?;
        let _ = self.dispatch(PageEvent::PointerEnter { target });
        Ok(())
    }

    pub fn unhover(&mut self, selector: &str) -> Result<(), ReplayError> {
        let target = self.resolve(selector)?;
        let _ = self.dispatch(PageEvent::PointerLeave { target });
        Ok(())
    }

    pub fn key(&mut self, key: Key) {
        let _ = self.dispatch(PageEvent::KeyDown { key });
    }

    /// Move the viewport as a user would and deliver the scroll event.
    pub fn scroll_to(&mut self, y: f64) {
        self.document.set_scroll_y(y);
        let _ = self.page.dispatch(PageEvent::Scroll, &mut self.document);
        self.flush_frames();
    }

    /// Let virtual time pass, firing every timer that comes due.
    pub fn wait(&mut self, duration: Duration) {
        let deadline = self.document.now() + duration;
        while let Some(timer) = self.document.pop_due_timer(deadline) {
            let _ = self.dispatch(PageEvent::Timer(timer));
        }
        self.document.set_now(deadline);
    }

    pub fn perform(&mut self, action: &Action) -> Result<StepOutcome, ReplayError> {
        let mut prevented_default = false;
        match action {
            Action::Click(selector) => {
                prevented_default = self.click(selector)? == Propagation::PreventDefault;
            }
            Action::Hover(selector) => self.hover(selector)?,
            Action::Unhover(selector) => self.unhover(selector)?,
            Action::Key(key) => self.key(key.clone()),
            Action::ScrollTo(y) => self.scroll_to(*y),
            Action::Wait(duration) => self.wait(*duration),
        }
        Ok(StepOutcome {
            action: action.to_string(),
            prevented_default,
            state: self.snapshot(),
        })
    }

    pub fn run(&mut self, actions: &[Action]) -> Result<Vec<StepOutcome>, ReplayError> {
        actions.iter().map(|action| self.perform(action)).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let doc = &self.document;
        let active_class = &self.config.scroll_spy.active_class;
        let active_links = self
            .page_links()
            .into_iter()
            .filter(|&link| doc.has_class(link, active_class))
            .filter_map(|link| doc.attribute(link, "href"))
            .collect();
        let revealed = self
            .page
            .reveal()
            .sections()
            .iter()
            .filter(|&&node| self.page.reveal().is_revealed(node))
            .map(|&node| match doc.attribute(node, "id") {
                Some(id) => format!("#{id}"),
                None => format!("{}@{}", doc.element(node).tag, doc.document_top(node)),
            })
            .collect();
        let lightbox = self.page.lightbox().map(|lightbox| LightboxSnapshot {
            open: lightbox.is_open(),
            index: lightbox.current(),
            src: doc
                .query(&self.config.lightbox.image)
                .and_then(|image| doc.image_source(image)),
        });
        Snapshot {
            elapsed_ms: doc.now().as_millis() as u64,
            scroll_y: doc.scroll_y(),
            menu_open: self.page.is_menu_open(doc),
            slide: self.page.carousel().map(|c| c.current()),
            carousel_running: self.page.carousel().is_some_and(|c| c.is_running()),
            active_links,
            revealed,
            lightbox,
        }
    }

    fn page_links(&self) -> Vec<NodeId> {
        self.document.query_all(&self.config.router.links)
    }
}
