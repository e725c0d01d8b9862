//! Human-readable run summary printed to stdout.

use tubesift_core::{EntryOutcome, RunReport};

/// Prints per-entry status lines and run totals.
pub fn print_summary(report: &RunReport, verbose: bool) {
    for p in &report.provenance {
        match &p.outcome {
            EntryOutcome::Resolved {
                source,
                cache_hit,
                record_count,
            } => {
                let cache_note = if *cache_hit { " (cached)" } else { "" };
                println!(
                    "ok    {}  {} record(s) via {source}{cache_note}",
                    p.entry.raw, record_count
                );
            }
            EntryOutcome::Failed { reason } => {
                println!("fail  {}  {reason}", p.entry.raw);
            }
        }
        if verbose {
            if let Some(label) = &p.entry.label {
                println!("      label: {label}");
            }
        }
    }

    println!();
    println!(
        "{} of {} entries resolved, {} unique videos",
        report.resolved_count(),
        report.provenance.len(),
        report.records.len()
    );

    let failures = report.failures();
    if !failures.is_empty() {
        println!("{} entries failed:", failures.len());
        for (url, reason) in failures {
            println!("  {url}: {reason}");
        }
    }
}
