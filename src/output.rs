//! CLI output formatting for `check` and `replay`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Behaviors
//!     Navigation toggle: attached
//!     Scroll router: 4 links
//!     Carousel: 3 slides, 3 dots
//!     Scroll-spy: 4 sections
//!     Reveal: 3 sections
//!     Lightbox: 3 thumbnails
//!
//! Warnings
//!     carousel has 3 slides but 4 dots
//! ```
//!
//! ## Replay
//!
//! ```text
//! 001 click #hamburger
//!     t=0ms scroll=0
//!     Menu: open
//!     Slide: 1 (running)
//!     Active links: #home
//! 002 click .nav-menu a[href="#services"] (default prevented)
//!     t=0ms scroll=1335
//!     Menu: closed
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::page::AttachReport;
use crate::replay::{Snapshot, StepOutcome};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

// ============================================================================
// check
// ============================================================================

/// Format what attached to the page and any structural warnings.
pub fn format_check_output(report: &AttachReport) -> Vec<String> {
    let mut lines = vec!["Behaviors".to_string()];
    let detail = |label: &str, value: String| format!("{}{}: {}", indent(1), label, value);

    lines.push(detail(
        "Navigation toggle",
        if report.nav_toggle { "attached" } else { "not found" }.to_string(),
    ));
    lines.push(detail("Scroll router", plural(report.nav_links, "link")));
    lines.push(detail(
        "Carousel",
        if report.carousel() {
            format!("{}, {}", plural(report.slides, "slide"), plural(report.dots, "dot"))
        } else {
            "not found".to_string()
        },
    ));
    lines.push(detail("Scroll-spy", plural(report.spy_sections, "section")));
    lines.push(detail("Reveal", plural(report.reveal_sections, "section")));
    lines.push(detail(
        "Lightbox",
        if report.lightbox() {
            plural(report.thumbnails, "thumbnail")
        } else {
            "not found".to_string()
        },
    ));

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in &report.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

/// Closing line of `check`: only a clean report is called valid.
pub fn format_check_summary(report: &AttachReport) -> String {
    if report.warnings.is_empty() {
        "==> Layout is valid".to_string()
    } else {
        format!(
            "==> Layout loaded with {}",
            plural(report.warnings.len(), "warning")
        )
    }
}

/// Print check output to stdout.
pub fn print_check_output(report: &AttachReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// replay
// ============================================================================

/// Format the page state lines shown under each step.
pub fn format_snapshot(state: &Snapshot, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = vec![
        format!("{pad}t={}ms scroll={}", state.elapsed_ms, state.scroll_y),
        format!(
            "{pad}Menu: {}",
            if state.menu_open { "open" } else { "closed" }
        ),
    ];
    if let Some(slide) = state.slide {
        let timer = if state.carousel_running { "running" } else { "paused" };
        lines.push(format!("{pad}Slide: {} ({timer})", slide + 1));
    }
    lines.push(format!("{pad}Active links: {}", list_or_none(&state.active_links)));
    lines.push(format!("{pad}Revealed: {}", list_or_none(&state.revealed)));
    if let Some(lightbox) = &state.lightbox {
        if lightbox.open {
            let src = lightbox.src.as_deref().unwrap_or("(no source)");
            lines.push(format!("{pad}Lightbox: {} → {src}", lightbox.index + 1));
        } else {
            lines.push(format!("{pad}Lightbox: closed"));
        }
    }
    lines
}

/// Format one replayed step: positional header plus state lines.
pub fn format_replay_step(position: usize, outcome: &StepOutcome) -> Vec<String> {
    let marker = if outcome.prevented_default {
        " (default prevented)"
    } else {
        ""
    };
    let mut lines = vec![format!(
        "{} {}{}",
        format_index(position),
        outcome.action,
        marker
    )];
    lines.extend(format_snapshot(&outcome.state, 1));
    lines
}

/// Print every replayed step to stdout.
pub fn print_replay_output(outcomes: &[StepOutcome]) {
    for (i, outcome) in outcomes.iter().enumerate() {
        for line in format_replay_step(i + 1, outcome) {
            println!("{}", line);
        }
    }
}
