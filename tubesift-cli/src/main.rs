// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! TubeSift CLI - batch video metadata resolution from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Resolve a batch of links with the scraper only
//! tubesift resolve --input links.txt --json out.json
//!
//! # Prefer the quota-metered API with ETag revalidation
//! tubesift resolve --input links.txt --use-api --csv videos.csv
//!
//! # Dry-run classification of the input file
//! tubesift classify --input links.txt
//!
//! # Inspect or clear the validator cache
//! tubesift cache show
//! tubesift cache clear
//! ```

mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{cache, classify, resolve};

// ============================================================================
// CLI Definition
// ============================================================================

/// TubeSift CLI - batch video metadata resolution.
#[derive(Parser)]
#[command(name = "tubesift")]
#[command(about = "Batch video platform URL resolver")]
#[command(long_about = r"
TubeSift resolves a batch of video platform URLs (single videos, channels,
playlists) into canonical metadata records, preferring the quota-metered
Data API with ETag revalidation and falling back to yt-dlp scraping.

Examples:
  tubesift resolve --input links.txt --json out.json
  tubesift resolve --input links.txt --use-api --csv videos.csv
  tubesift classify --input links.txt
  tubesift cache show
")]
#[command(version)]
#[command(author = "TubeSift Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a batch of URLs into metadata records.
    #[command(visible_alias = "r")]
    Resolve(resolve::ResolveArgs),

    /// Classify input URLs without any network activity.
    #[command(visible_alias = "cl")]
    Classify(classify::ClassifyArgs),

    /// Inspect or clear the validator cache.
    Cache(cache::CacheArgs),
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every entry resolved.
    Success = 0,
    /// Some entries failed; the report still covers all of them.
    Partial = 1,
    /// Fatal configuration or setup error, nothing was resolved.
    ConfigError = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("tubesift=debug,info")
    } else {
        EnvFilter::new("tubesift=warn")
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
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Resolve(args) => resolve::run(args, &cli).await,
        Commands::Classify(args) => classify::run(args, &cli),
        Commands::Cache(args) => cache::run(args, &cli).await,
    };

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            ExitStatus::ConfigError
        }
    };

    std::process::exit(status as i32);
}
