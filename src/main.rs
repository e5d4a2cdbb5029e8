use clap::{Parser, Subcommand};
use site_interactions::config::{self, BehaviorConfig};
use site_interactions::document::MemoryDocument;
use site_interactions::output;
use site_interactions::page::Page;
use site_interactions::replay::{self, Session};
use site_interactions::selector::Selector;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "site-interactions")]
#[command(about = "Interactive behaviors for single-page marketing sites")]
#[command(long_about = "\
Interactive behaviors for single-page marketing sites

Attaches the navigation toggle, smooth-scroll router, carousel, scroll-spy,
reveal-on-scroll and gallery lightbox to a page. Pages are described as TOML
layout files so behavior can be checked and replayed without a browser.

Layout files:

  [viewport]
  height = 800.0

  [[element]]
  tag = \"section\"
  id = \"services\"
  classes = [\"section\"]
  top = 1400.0
  height = 800.0

Replay scripts are [[step]] tables with exactly one of: click, hover,
unhover, key, scroll_to, wait_ms.

Set RUST_LOG=debug to trace every behavior decision.
Run 'site-interactions gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Behavior config file (stock defaults when absent)
    #[arg(long, default_value = "site-interactions.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Attach every behavior to a layout and report what was found
    Check {
        /// Layout file describing the page
        layout: PathBuf,
    },
    /// Run a script of user actions against a layout
    Replay {
        /// Layout file describing the page
        layout: PathBuf,
        /// Script of [[step]] actions
        script: PathBuf,
        /// Print step outcomes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check { layout } => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", layout.display());
            let mut document = MemoryDocument::load(&layout)?;
            let (_, mut report) = Page::attach(&mut document, &config);
            report.warnings.extend(selector_warnings(&config));
            output::print_check_output(&report);
            println!("{}", output::format_check_summary(&report));
        }
        Command::Replay {
            layout,
            script,
            json,
        } => {
            let config = config::load_config(&cli.config)?;
            let actions = replay::load_script(&script)?;
            let document = MemoryDocument::load(&layout)?;
            let mut session = Session::new(document, config);
            let outcomes = session.run(&actions)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                output::print_replay_output(&outcomes);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Config selectors the in-memory document cannot evaluate.
///
/// Browsers accept the full CSS grammar, so these are warnings, not errors.
fn selector_warnings(config: &BehaviorConfig) -> Vec<String> {
    config
        .selectors()
        .into_iter()
        .filter_map(|(key, selector)| {
            Selector::parse(selector)
                .err()
                .map(|e| format!("{key}: {e}"))
        })
        .collect()
}
