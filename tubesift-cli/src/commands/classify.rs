//! The `classify` command: dry-run URL classification with no network use.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tubesift_core::UrlKind;

use crate::input::load_entries;
use crate::{Cli, ExitStatus};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input file with one URL per line (optionally `<url>\t<label>`).
    #[arg(long, short)]
    pub input: PathBuf,
}

/// Run the classify command.
pub fn run(args: &ClassifyArgs, cli: &Cli) -> Result<ExitStatus> {
    let entries = load_entries(&args.input)?;
    if entries.is_empty() {
        if !cli.quiet {
            println!("No URLs found in {}", args.input.display());
        }
        return Ok(ExitStatus::Success);
    }

    let mut unknown = 0usize;
    for entry in &entries {
        if entry.kind == UrlKind::Unknown {
            unknown += 1;
        }
        if !cli.quiet {
            let kind = entry.kind.to_string();
            match &entry.label {
                Some(label) => println!("{kind:<14} {}  ({label})", entry.raw),
                None => println!("{kind:<14} {}", entry.raw),
            }
        }
    }

    if !cli.quiet {
        println!();
        println!(
            "{} entries, {} recognized, {} unrecognized",
            entries.len(),
            entries.len() - unknown,
            unknown
        );
    }

    if unknown == 0 {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Partial)
    }
}
