//! CLI integration tests: runs the built binary against the fixture pages.
//!
//! Every command runs inside a fresh temp directory so a stray
//! `site-interactions.toml` in the checkout never leaks into the results.
//!
//! Run with: `cargo test --test cli`

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// ===========================================================================
// Setup helpers
// ===========================================================================

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

fn run(cwd: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_site-interactions"))
        .current_dir(cwd.path())
        .args(args)
        .output()
        .expect("failed to run site-interactions")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ===========================================================================
// check
// ===========================================================================

#[test]
fn check_reports_every_behavior_on_landing_page() {
    let cwd = TempDir::new().unwrap();
    let output = run(&cwd, &["check", &fixture("landing.toml")]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("    Navigation toggle: attached"), "{out}");
    assert!(out.contains("    Scroll router: 4 links"), "{out}");
    assert!(out.contains("    Carousel: 3 slides, 3 dots"), "{out}");
    assert!(out.contains("    Scroll-spy: 4 sections"), "{out}");
    assert!(out.contains("    Reveal: 3 sections"), "{out}");
    assert!(out.contains("    Lightbox: 3 thumbnails"), "{out}");
    assert!(!out.contains("Warnings"), "{out}");
    assert!(out.ends_with("==> Layout is valid\n"), "{out}");
}

#[test]
fn check_lists_unsupported_config_selectors_as_warnings() {
    let cwd = TempDir::new().unwrap();
    std::fs::write(
        cwd.path().join("site-interactions.toml"),
        "[carousel]\nslides = \".track > .slide\"\n",
    )
    .unwrap();
    let output = run(&cwd, &["check", &fixture("landing.toml")]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Carousel: not found"), "{out}");
    assert!(out.contains("Warnings"), "{out}");
    assert!(out.contains("carousel.slides"), "{out}");
    assert!(!out.contains("Layout is valid"), "{out}");
    assert!(out.ends_with("==> Layout loaded with 1 warning\n"), "{out}");
}

#[test]
fn check_missing_layout_fails() {
    let cwd = TempDir::new().unwrap();
    let output = run(&cwd, &["check", "does-not-exist.toml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("NotFound"), "{}", stderr(&output));
}

#[test]
fn invalid_config_fails_before_loading_layout() {
    let cwd = TempDir::new().unwrap();
    let config = cwd.path().join("custom.toml");
    std::fs::write(&config, "[carousel]\ninterval_ms = 0\n").unwrap();
    let output = run(
        &cwd,
        &[
            "--config",
            config.to_str().unwrap(),
            "check",
            &fixture("landing.toml"),
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("interval_ms"), "{}", stderr(&output));
}

// ===========================================================================
// replay
// ===========================================================================

#[test]
fn replay_prints_numbered_steps() {
    let cwd = TempDir::new().unwrap();
    let output = run(
        &cwd,
        &["replay", &fixture("landing.toml"), &fixture("tour.toml")],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("001 click #hamburger\n"), "{out}");
    assert!(
        out.contains("002 click .nav-menu a[href=\"#services\"] (default prevented)"),
        "{out}"
    );
    assert!(out.contains("    t=0ms scroll=1335"), "{out}");
    assert!(out.contains("    Slide: 1 (paused)"), "{out}");
    assert!(out.contains("    t=11000ms scroll=1335"), "{out}");
    assert!(out.contains("    Slide: 2 (running)"), "{out}");
    assert!(out.contains("    Lightbox: 3 → img/island-tour.jpg"), "{out}");
    assert!(out.contains("009 key Escape"), "{out}");
}

#[test]
fn replay_json_is_machine_readable() {
    let cwd = TempDir::new().unwrap();
    let output = run(
        &cwd,
        &[
            "replay",
            &fixture("landing.toml"),
            &fixture("tour.toml"),
            "--json",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 9);

    assert_eq!(steps[0]["state"]["menu_open"], true);
    assert_eq!(steps[1]["prevented_default"], true);
    assert_eq!(steps[1]["state"]["menu_open"], false);
    assert_eq!(steps[1]["state"]["active_links"][0], "#services");
    assert_eq!(steps[3]["state"]["slide"], 0);
    assert_eq!(steps[5]["state"]["slide"], 1);
    assert_eq!(steps[7]["state"]["lightbox"]["index"], 2);
    assert_eq!(steps[8]["state"]["lightbox"]["open"], false);
}

#[test]
fn replay_unknown_target_fails() {
    let cwd = TempDir::new().unwrap();
    let script = cwd.path().join("bad.toml");
    std::fs::write(&script, "[[step]]\nclick = \"#newsletter\"\n").unwrap();
    let output = run(
        &cwd,
        &["replay", &fixture("landing.toml"), script.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("#newsletter"), "{}", stderr(&output));
}

// ===========================================================================
// gen-config
// ===========================================================================

#[test]
fn gen_config_output_is_a_valid_config() {
    let cwd = TempDir::new().unwrap();
    let output = run(&cwd, &["gen-config"]);
    assert!(output.status.success());

    let generated = cwd.path().join("generated.toml");
    std::fs::write(&generated, &output.stdout).unwrap();
    let check = run(
        &cwd,
        &[
            "--config",
            generated.to_str().unwrap(),
            "check",
            &fixture("landing.toml"),
        ],
    );
    assert!(check.status.success(), "{}", stderr(&check));
}
