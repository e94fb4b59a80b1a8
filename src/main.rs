// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up diagnostics logging (tracing, to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results and exit
//
// Exit codes:
//   0 = the run finished, even if feeds or whole files failed
//   2 = unexpected error (bad HTTP client setup, unreadable image, ...)
// =============================================================================

mod checker; // src/checker/ - feed URL checking
mod cli; // src/cli.rs - command-line parsing
mod error; // src/error.rs - typed errors
mod icon; // src/icon/ - icon padding
mod opml; // src/opml/ - OPML document tree and pruning walk
mod progress; // src/progress.rs - progress lines on stdout or stderr
mod prune; // src/prune/ - per-file processing

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use anyhow::Result;
use progress::progress;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins if set; otherwise warnings only, or debug with -v
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feed_pruner={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Prune {
            files,
            timeout,
            user_agent,
            concurrency,
            dry_run,
            json,
        } => {
            let options = prune::PruneOptions {
                check: checker::CheckOptions {
                    timeout: Duration::from_secs(timeout),
                    user_agent,
                },
                concurrency: usize::from(concurrency),
                dry_run,
            };
            handle_prune(&files, &options, json).await
        }
        Commands::PadIcon {
            input,
            output,
            scale,
        } => handle_pad_icon(&input, &output, scale),
    }
}

// Handles the 'prune' subcommand
async fn handle_prune(files: &[PathBuf], options: &prune::PruneOptions, json: bool) -> Result<i32> {
    // Keep stdout for the JSON document only
    progress::send_to_stderr(json);

    if options.dry_run {
        progress!("Dry run: no file will be rewritten");
    }

    let reports = prune::process_files(files, options).await?;

    progress!();
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_table(&reports);
    }

    // Dead feeds and broken files are reported, not treated as failures
    Ok(0)
}

// Handles the 'pad-icon' subcommand
fn handle_pad_icon(input: &Path, output: &Path, scale: f64) -> Result<i32> {
    let placement = icon::add_padding(input, output, scale)?;
    tracing::debug!(
        width = placement.width,
        height = placement.height,
        x = placement.x,
        y = placement.y,
        "icon placed"
    );
    Ok(0)
}

// Prints one line per file plus totals
fn print_table(reports: &[prune::FileReport]) {
    println!("{:<50} {:<12} {:>8} {:>8}", "FILE", "OUTCOME", "CHECKED", "REMOVED");
    println!("{}", "=".repeat(81));

    for report in reports {
        let path = report.path.display().to_string();
        // Keep the end of long paths, that's where the file name is
        let path_display = if path.chars().count() > 47 {
            let tail: String = path
                .chars()
                .rev()
                .take(47)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        } else {
            path
        };

        println!(
            "{:<50} {:<12} {:>8} {:>8}",
            path_display,
            format_outcome(report.outcome),
            report.checked,
            report.removed.len()
        );
    }

    println!();

    let removed: usize = reports.iter().map(|r| r.removed.len()).sum();
    let checked: usize = reports.iter().map(|r| r.checked).sum();
    let skipped = reports
        .iter()
        .filter(|r| {
            !matches!(
                r.outcome,
                prune::FileOutcome::Rewritten | prune::FileOutcome::DryRun
            )
        })
        .count();

    println!("Summary:");
    println!("   Feeds checked: {}", checked);
    println!("   Feeds removed: {}", removed);
    println!("   Files skipped: {}", skipped);
}

fn format_outcome(outcome: prune::FileOutcome) -> &'static str {
    match outcome {
        prune::FileOutcome::Rewritten => "rewritten",
        prune::FileOutcome::DryRun => "dry run",
        prune::FileOutcome::NotFound => "not found",
        prune::FileOutcome::NoBody => "no body",
        prune::FileOutcome::Failed => "failed",
    }
}
