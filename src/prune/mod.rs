// src/prune/mod.rs
// =============================================================================
// This module ties the pieces together for the `prune` subcommand:
// load an OPML file, check its feeds, drop the dead ones, save it.
//
// Submodules:
// - file: Processes one file (and a list of files) end to end
// =============================================================================

mod file;

pub use file::{process_files, FileOutcome, FileReport, PruneOptions};
