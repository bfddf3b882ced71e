// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ytsource CLI - inspect how YouTube identifiers are routed.
//!
//! # Examples
//!
//! ```bash
//! # Classify an identifier
//! ytsource route "https://youtu.be/dQw4w9WgXcQ"
//!
//! # Follow watch_videos redirects over the network
//! ytsource route --resolve "https://www.youtube.com/watch_videos?video_ids=dQw4w9WgXcQ,9bZkp7q19f0"
//!
//! # JSON output
//! ytsource route "ytsearch:never gonna" --format json --pretty
//!
//! # Configuration
//! ytsource config show
//! ytsource config init
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, route};

// ============================================================================
// CLI Definition
// ============================================================================

/// ytsource CLI - YouTube identifier routing.
#[derive(Parser)]
#[command(name = "ytsource")]
#[command(about = "Inspect how YouTube identifiers are routed")]
#[command(long_about = r#"
ytsource classifies YouTube identifiers the same way the source manager does
before handing them to its clients.

Recognised identifiers:
  • ytsearch:<query> and ytmsearch:<query>
  • youtube.com/watch, /playlist and /watch_videos links
  • youtu.be, /shorts, /live and /embed links
  • bare video ids and PL/UU playlist ids

Examples:
  ytsource route dQw4w9WgXcQ
  ytsource route --resolve "youtube.com/watch_videos?video_ids=a,b"
  ytsource config show
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// How to print results.
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Indent JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log routing and dispatch decisions to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Plain text without ANSI colors.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress logs and error messages.
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the configuration file path in use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(ytsource_store::default_config_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show how identifiers are routed.
    #[command(visible_alias = "r")]
    Route(route::RouteArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Text for terminals.
    #[default]
    Text,
    /// JSON for scripts.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// At least one identifier could not be routed.
    RouteFailed = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("ytsource=debug,info")
    } else {
        EnvFilter::new("ytsource=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Route(args) => route::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await.map(|()| ExitCode::Success),
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
