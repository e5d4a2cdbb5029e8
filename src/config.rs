//! Behavior configuration.
//!
//! Every selector, class name and numeric constant the behaviors bind to lives
//! here, so a site whose markup uses different names only needs a config file,
//! not a code change.
//!
//! ## Config File
//!
//! The CLI reads `site-interactions.toml` from the working directory (or the
//! path given with `--config`). Hosts embedding the library can pass the
//! same TOML as a string to [`BehaviorConfig::from_toml_str`]. All keys are
//! optional and default to the values below:
//!
//! ```toml
//! [navigation]
//! toggle = "#hamburger"     # Button that opens/closes the mobile menu
//! menu = "#navMenu"         # Menu container
//! open_class = "active"
//!
//! [header]
//! selector = ".sticky-nav"  # Fixed header whose height offsets scrolling
//!
//! [router]
//! links = ".nav-menu a[href^=\"#\"]"
//! correction = 5.0
//!
//! [carousel]
//! interval_ms = 5000
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: stock defaults are serialized to a TOML table and
//! the user file is merged on top key by key before deserializing. Unknown
//! keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration for all behaviors attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    pub navigation: NavigationConfig,
    pub header: HeaderConfig,
    pub router: RouterConfig,
    pub carousel: CarouselConfig,
    pub scroll_spy: ScrollSpyConfig,
    pub reveal: RevealConfig,
    pub lightbox: LightboxConfig,
}

/// Mobile menu toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Selector of the toggle control.
    pub toggle: String,
    /// Selector of the menu container.
    pub menu: String,
    /// Selector, relative to the menu, of links that close the menu.
    pub menu_links: String,
    /// Class present on both toggle and menu while the menu is open.
    pub open_class: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            toggle: "#hamburger".to_string(),
            menu: "#navMenu".to_string(),
            menu_links: "a".to_string(),
            open_class: "active".to_string(),
        }
    }
}

/// The fixed header whose height is subtracted from scroll positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    pub selector: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: ".sticky-nav".to_string(),
        }
    }
}

/// In-page anchor links: smooth scrolling and scroll-spy highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Selector of the nav links that scroll to in-page sections.
    pub links: String,
    /// Added to the destination after subtracting the header height.
    pub correction: f64,
    pub behavior: crate::types::ScrollBehavior,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            links: ".nav-menu a[href^=\"#\"]".to_string(),
            correction: 5.0,
            behavior: crate::types::ScrollBehavior::Smooth,
        }
    }
}

/// Carousel slides, indicators and controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    pub slides: String,
    pub dots: String,
    pub prev: String,
    pub next: String,
    /// Hovering this element pauses auto-advance.
    pub container: String,
    pub active_class: String,
    /// Auto-advance period in milliseconds.
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            slides: ".slide".to_string(),
            dots: ".dot".to_string(),
            prev: ".prev".to_string(),
            next: ".next".to_string(),
            container: ".carousel-container".to_string(),
            active_class: "active".to_string(),
            interval_ms: 5000,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Scroll-spy section tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollSpyConfig {
    /// Sections whose `id` is matched against nav link fragments.
    pub sections: String,
    /// Added to the scroll position (after the header height).
    pub margin: f64,
    pub active_class: String,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            sections: "section[id]".to_string(),
            margin: 50.0,
            active_class: "active".to_string(),
        }
    }
}

/// One-shot entrance animation for sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub sections: String,
    /// Sections carrying this class are never animated.
    pub exclude_class: String,
    /// Added at attach to every animated section.
    pub pending_class: String,
    pub revealed_class: String,
    /// Visible fraction of a section's height that triggers the reveal.
    pub threshold: f64,
    /// Shrinks the viewport from the bottom before measuring visibility.
    pub bottom_margin: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            sections: ".section".to_string(),
            exclude_class: "hero".to_string(),
            pending_class: "fade-up".to_string(),
            revealed_class: "revealed".to_string(),
            threshold: 0.15,
            bottom_margin: 50.0,
        }
    }
}

/// Gallery lightbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    pub modal: String,
    pub image: String,
    pub close: String,
    pub prev: String,
    pub next: String,
    pub thumbnails: String,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            modal: "#gallery-modal".to_string(),
            image: "#modal-image".to_string(),
            close: ".modal-close".to_string(),
            prev: ".modal-prev".to_string(),
            next: ".modal-next".to_string(),
            thumbnails: ".gallery-thumb".to_string(),
        }
    }
}

impl BehaviorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be greater than 0".into(),
            ));
        }
        if !(self.reveal.threshold > 0.0 && self.reveal.threshold <= 1.0) {
            return Err(ConfigError::Validation(
                "reveal.threshold must be in (0, 1]".into(),
            ));
        }
        // NaN compares false, so test for the valid range
        let margins = [
            ("reveal.bottom_margin", self.reveal.bottom_margin),
            ("scroll_spy.margin", self.scroll_spy.margin),
        ];
        for (key, margin) in margins {
            if !(margin >= 0.0 && margin.is_finite()) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a finite, non-negative number"
                )));
            }
        }
        if !self.router.correction.is_finite() {
            return Err(ConfigError::Validation(
                "router.correction must be a finite number".into(),
            ));
        }
        let classes = [
            ("navigation.open_class", &self.navigation.open_class),
            ("carousel.active_class", &self.carousel.active_class),
            ("scroll_spy.active_class", &self.scroll_spy.active_class),
            ("reveal.pending_class", &self.reveal.pending_class),
            ("reveal.revealed_class", &self.reveal.revealed_class),
        ];
        for (key, class) in classes {
            if class.trim().is_empty() || class.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single non-empty class name"
                )));
            }
        }
        Ok(())
    }

    /// Every selector in the config, keyed by its dotted TOML path.
    pub fn selectors(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("navigation.toggle", &self.navigation.toggle),
            ("navigation.menu", &self.navigation.menu),
            ("navigation.menu_links", &self.navigation.menu_links),
            ("header.selector", &self.header.selector),
            ("router.links", &self.router.links),
            ("carousel.slides", &self.carousel.slides),
            ("carousel.dots", &self.carousel.dots),
            ("carousel.prev", &self.carousel.prev),
            ("carousel.next", &self.carousel.next),
            ("carousel.container", &self.carousel.container),
            ("scroll_spy.sections", &self.scroll_spy.sections),
            ("reveal.sections", &self.reveal.sections),
            ("lightbox.modal", &self.lightbox.modal),
            ("lightbox.image", &self.lightbox.image),
            ("lightbox.close", &self.lightbox.close),
            ("lightbox.prev", &self.lightbox.prev),
            ("lightbox.next", &self.lightbox.next),
            ("lightbox.thumbnails", &self.lightbox.thumbnails),
        ]
        .into_iter()
        .map(|(key, selector)| (key, selector.as_str()))
        .collect()
    }

    /// Parse a sparse TOML document on top of the stock defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let overlay: toml::Value = toml::from_str(content)?;
        resolve_config(stock_defaults_value(), Some(overlay))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BehaviorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BehaviorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BehaviorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<BehaviorConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock config file with every key.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# site-interactions configuration
# ================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Selectors use CSS syntax. The in-memory document used by `check` and
# `replay` understands type, #id, .class, [attr], [attr="v"], [attr^="v"],
# :not(...), descendant combinators and comma-separated lists.

# ---------------------------------------------------------------------------
# Mobile navigation toggle
# ---------------------------------------------------------------------------
[navigation]
toggle = "#hamburger"
menu = "#navMenu"
# Links inside the menu that close it when clicked (relative to the menu).
menu_links = "a"
open_class = "active"

# ---------------------------------------------------------------------------
# Fixed header (its height offsets smooth scrolling and scroll-spy)
# ---------------------------------------------------------------------------
[header]
selector = ".sticky-nav"

# ---------------------------------------------------------------------------
# In-page anchor links
# ---------------------------------------------------------------------------
[router]
links = ".nav-menu a[href^=\"#\"]"
# Destination = section top - header height + correction.
correction = 5.0
# "smooth" or "instant"
behavior = "smooth"

# ---------------------------------------------------------------------------
# Carousel
# ---------------------------------------------------------------------------
[carousel]
slides = ".slide"
dots = ".dot"
prev = ".prev"
next = ".next"
# Hovering this element pauses auto-advance.
container = ".carousel-container"
active_class = "active"
interval_ms = 5000

# ---------------------------------------------------------------------------
# Scroll-spy (highlights the nav link of the section in view)
# ---------------------------------------------------------------------------
[scroll_spy]
sections = "section[id]"
# Added to scroll position + header height before matching sections.
margin = 50.0
active_class = "active"

# ---------------------------------------------------------------------------
# Reveal-on-scroll
# ---------------------------------------------------------------------------
[reveal]
sections = ".section"
# Sections with this class are never animated.
exclude_class = "hero"
pending_class = "fade-up"
revealed_class = "revealed"
# Fraction of the section that must be visible (0 < threshold <= 1).
threshold = 0.15
# Pixels trimmed from the bottom of the viewport before measuring.
bottom_margin = 50.0

# ---------------------------------------------------------------------------
# Gallery lightbox
# ---------------------------------------------------------------------------
[lightbox]
modal = "#gallery-modal"
image = "#modal-image"
close = ".modal-close"
prev = ".modal-prev"
next = ".modal-next"
thumbnails = ".gallery-thumb"
"##
}
