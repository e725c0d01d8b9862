//! The `resolve` command: run the full pipeline over an input file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tubesift_providers::Resolver;
use tubesift_store::RunConfig;

use crate::input::load_entries;
use crate::output;
use crate::{Cli, ExitStatus};

/// Arguments for the resolve command.
#[derive(Args)]
pub struct ResolveArgs {
    /// Input file with one URL per line (optionally `<url>\t<label>`).
    #[arg(long, short)]
    pub input: PathBuf,

    /// Write the full JSON report to this path.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write a flat CSV export of the records to this path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Prefer the authoritative metadata API (requires a credential).
    #[arg(long)]
    pub use_api: bool,

    /// Skip the validator cache entirely for this run.
    #[arg(long)]
    pub no_cache: bool,

    /// Egress proxy URL, repeatable to build a rotation pool.
    #[arg(long = "proxy")]
    pub proxies: Vec<String>,

    /// API credential, overriding the config file and environment.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Maximum entries resolved concurrently.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-fetch timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file path (defaults to the standard location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the resolve command.
pub async fn run(args: &ResolveArgs, cli: &Cli) -> Result<ExitStatus> {
    let config = build_config(args)?;

    let entries = load_entries(&args.input)?;
    if entries.is_empty() {
        if !cli.quiet {
            println!("No URLs found in {}", args.input.display());
        }
        return Ok(ExitStatus::Success);
    }
    info!(count = entries.len(), "Loaded input entries");

    let mut resolver = Resolver::from_config(&config).await?;
    if args.no_cache {
        resolver = resolver.without_cache();
    }

    let report = resolver.run(entries).await;

    if let Some(path) = &config.output.json {
        output::json::write_report(&report, path)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
        if !cli.quiet {
            println!("Wrote JSON report to {}", path.display());
        }
    }
    if let Some(path) = &config.output.csv {
        output::csv::write_records(&report.records, path)
            .with_context(|| format!("failed to write CSV export to {}", path.display()))?;
        if !cli.quiet {
            println!("Wrote CSV export to {}", path.display());
        }
    }

    if !cli.quiet {
        output::text::print_summary(&report, cli.verbose);
    }

    if report.all_resolved() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Partial)
    }
}

/// Merge CLI flags over the loaded configuration file.
fn build_config(args: &ResolveArgs) -> Result<RunConfig> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(RunConfig::default_path);
    let mut config = RunConfig::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    if args.use_api {
        config.use_authoritative_api = true;
    }
    if !args.proxies.is_empty() {
        config.proxy_pool = args.proxies.clone();
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if args.json.is_some() {
        config.output.json = args.json.clone();
    }
    if args.csv.is_some() {
        config.output.csv = args.csv.clone();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> ResolveArgs {
        ResolveArgs {
            input: PathBuf::from("links.txt"),
            json: None,
            csv: None,
            use_api: false,
            no_cache: false,
            proxies: vec![],
            api_key: None,
            concurrency: None,
            timeout: None,
            config: Some(PathBuf::from("/definitely/not/here.json")),
        }
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let mut args = base_args();
        args.use_api = true;
        args.api_key = Some("k".into());
        args.concurrency = Some(8);
        args.proxies = vec!["http://proxy:8080".into()];

        let config = build_config(&args).unwrap();
        assert!(config.use_authoritative_api);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.proxy_pool, vec!["http://proxy:8080".to_string()]);
    }

    #[test]
    fn test_api_without_credential_is_fatal() {
        let mut args = base_args();
        args.use_api = true;
        if std::env::var(tubesift_store::API_KEY_ENV).is_err() {
            assert!(build_config(&args).is_err());
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut args = base_args();
        args.concurrency = Some(0);
        assert!(build_config(&args).is_err());
    }
}
