//! The `cache` command: inspect or clear the validator cache.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tubesift_store::ValidatorCache;

use crate::{Cli, ExitStatus};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    /// Validator cache file path (defaults to the standard location).
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Cache action to perform.
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Print the cached entries.
    Show,
    /// Remove every cached entry.
    Clear,
}

/// Run the cache command.
pub async fn run(args: &CacheArgs, cli: &Cli) -> Result<ExitStatus> {
    let path = args
        .path
        .clone()
        .unwrap_or_else(tubesift_store::default_cache_path);
    let cache = ValidatorCache::load(&path).await;

    match args.action {
        CacheAction::Show => {
            let entries = cache.snapshot().await;
            if entries.is_empty() {
                if !cli.quiet {
                    println!("Validator cache is empty ({})", path.display());
                }
                return Ok(ExitStatus::Success);
            }

            if !cli.quiet {
                println!("Validator cache ({}):", path.display());
                for (key, entry) in &entries {
                    println!(
                        "  {key}  validator={}  records={}  updated={}",
                        entry.validator_token,
                        entry.last_result.len(),
                        entry.updated_at.to_rfc3339()
                    );
                }
                println!();
                println!("{} entries", entries.len());
            }
        }
        CacheAction::Clear => {
            let removed = cache
                .clear()
                .await
                .with_context(|| format!("failed to clear cache at {}", path.display()))?;
            if !cli.quiet {
                println!("Cleared {removed} cached entries");
            }
        }
    }

    Ok(ExitStatus::Success)
}
