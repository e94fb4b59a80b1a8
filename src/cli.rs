// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Two subcommands:
// - prune:    check the feeds in OPML files and drop the dead ones
// - pad-icon: shrink an icon onto a transparent canvas
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::checker::{DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::icon::DEFAULT_SCALE;

#[derive(Parser, Debug)]
#[command(
    name = "feed-pruner",
    version = "0.1.0",
    about = "Prune dead feeds from OPML files and pad app icons",
    long_about = "feed-pruner checks every feed in an OPML subscription file and removes the \
                  ones that no longer answer with HTTP 200. The file is rewritten in place, \
                  so keep a copy if you want to compare."
)]
pub struct Cli {
    /// Print debug diagnostics to stderr (same as RUST_LOG=feed_pruner=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove unreachable feeds from OPML files (rewrites them in place)
    ///
    /// Example: feed-pruner prune feeds.opml backup/old.opml
    Prune {
        /// OPML files to process; missing files are skipped
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Seconds to wait for each feed before giving up (at least 1)
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,

        /// User-Agent header sent with every request
        #[arg(long, default_value = USER_AGENT)]
        user_agent: String,

        /// How many feeds to check at the same time
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: u16,

        /// Show what would be removed without rewriting any file
        #[arg(long)]
        dry_run: bool,

        /// Output the per-file reports in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Shrink an image and center it on a transparent canvas
    ///
    /// Example: feed-pruner pad-icon icon.png icon_foreground.png --scale 0.7
    PadIcon {
        /// Image to read
        #[arg(default_value = "assets/icon/icon.png")]
        input: PathBuf,

        /// Where to save the padded image (format follows the extension)
        #[arg(default_value = "assets/icon/icon_foreground.png")]
        output: PathBuf,

        /// Size of the icon relative to the canvas
        #[arg(long, default_value_t = DEFAULT_SCALE)]
        scale: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_prune_defaults() {
        let cli = Cli::parse_from(["feed-pruner", "prune", "feeds.opml"]);
        match cli.command {
            Commands::Prune {
                files,
                timeout,
                user_agent,
                concurrency,
                dry_run,
                json,
            } => {
                assert_eq!(files, vec![PathBuf::from("feeds.opml")]);
                assert_eq!(timeout, 3);
                assert_eq!(user_agent, USER_AGENT);
                assert_eq!(concurrency, 1);
                assert!(!dry_run);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_prune_requires_a_file() {
        assert!(Cli::try_parse_from(["feed-pruner", "prune"]).is_err());
    }

    #[test]
    fn test_prune_rejects_zero_concurrency() {
        let result = Cli::try_parse_from(["feed-pruner", "prune", "a.opml", "--concurrency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_prune_rejects_zero_timeout() {
        // A zero timeout would mark every feed dead and empty the file
        let result = Cli::try_parse_from(["feed-pruner", "prune", "a.opml", "--timeout", "0"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["feed-pruner", "prune", "a.opml", "--timeout", "1"]);
        assert!(matches!(cli.command, Commands::Prune { timeout: 1, .. }));
    }

    #[test]
    fn test_pad_icon_defaults() {
        let cli = Cli::parse_from(["feed-pruner", "-v", "pad-icon"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::PadIcon {
                input,
                output,
                scale,
            } => {
                assert_eq!(input, PathBuf::from("assets/icon/icon.png"));
                assert_eq!(output, PathBuf::from("assets/icon/icon_foreground.png"));
                assert_eq!(scale, 0.65);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
