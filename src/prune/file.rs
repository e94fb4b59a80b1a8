// src/prune/file.rs
// =============================================================================
// This module processes one OPML file from start to finish.
//
// How it works:
// 1. Skip the file if it doesn't exist
// 2. Parse it (on failure: log and leave the file alone)
// 3. Find <body> (if there is none: log and leave the file alone)
// 4. Check every feed URL under <body>
// 5. Remove the entries whose URL is dead
// 6. Write the document back to the same path (no backup!)
//
// Problems with one file never stop the others: every outcome ends up in
// a FileReport instead of an error.
// =============================================================================

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::checker::{build_client, check_urls, failure_line, CheckOptions, UrlCheckResult};
use crate::opml::{collect_urls, prune_children, Document, Removal};
use crate::progress::progress;

// Settings for a prune run
#[derive(Debug, Clone)]
pub struct PruneOptions {
    pub check: CheckOptions,
    /// How many feeds to check at the same time (1 = one after another)
    pub concurrency: usize,
    /// Report what would be removed, but don't rewrite the file
    pub dry_run: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        PruneOptions {
            check: CheckOptions::default(),
            concurrency: 1,
            dry_run: false,
        }
    }
}

// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Pruned and written back
    Rewritten,
    /// Pruned in memory only (--dry-run)
    DryRun,
    NotFound,
    /// Parsed fine but has no <body>; left untouched
    NoBody,
    /// Could not be read, parsed or written
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Number of distinct URLs checked
    pub checked: usize,
    pub removed: Vec<Removal>,
    /// Details for every URL that was not reachable
    pub dead: Vec<UrlCheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(path: &Path, outcome: FileOutcome) -> Self {
        FileReport {
            path: path.to_path_buf(),
            outcome,
            checked: 0,
            removed: Vec::new(),
            dead: Vec::new(),
            error: None,
        }
    }
}

// Processes every file in order, sharing one HTTP client
pub async fn process_files(paths: &[PathBuf], options: &PruneOptions) -> Result<Vec<FileReport>> {
    let client = build_client(&options.check)?;

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        reports.push(process_file(path, &client, options).await);
    }

    Ok(reports)
}

// Processes a single file, see the top of this file for the steps
pub async fn process_file(path: &Path, client: &Client, options: &PruneOptions) -> FileReport {
    if !path.exists() {
        progress!("File not found: {}", path.display());
        return FileReport::new(path, FileOutcome::NotFound);
    }

    progress!("Processing {}...", path.display());

    match prune_file(path, client, options).await {
        Ok(report) => {
            progress!("Finished {}", path.display());
            report
        }
        Err(e) => {
            progress!("Failed to process {}: {}", path.display(), e);
            FileReport {
                error: Some(e.to_string()),
                ..FileReport::new(path, FileOutcome::Failed)
            }
        }
    }
}

async fn prune_file(path: &Path, client: &Client, options: &PruneOptions) -> Result<FileReport> {
    let mut document = Document::load(path)?;

    let Some(body) = document.body_mut() else {
        progress!("No <body> in {}, leaving it untouched", path.display());
        warn!(path = %path.display(), "document has no body element");
        return Ok(FileReport::new(path, FileOutcome::NoBody));
    };

    let urls = collect_urls(body);
    info!(path = %path.display(), feeds = urls.len(), "checking feeds");

    let results = check_urls(client, urls, options.concurrency).await;
    let verdicts: HashMap<&str, &UrlCheckResult> = results
        .iter()
        .map(|result| (result.url.as_str(), result))
        .collect();

    // The failure line is printed here, right under the walker's
    // "[*] Checking" line for the same entry
    let removed = prune_children(body, &mut |url: &str| match verdicts.get(url) {
        Some(result) => {
            if let Some(line) = failure_line(result) {
                progress!("{}", line);
            }
            result.is_ok()
        }
        None => false,
    });
    info!(path = %path.display(), removed = removed.len(), "pruned document");

    let outcome = if options.dry_run {
        FileOutcome::DryRun
    } else {
        document.save(path)?;
        FileOutcome::Rewritten
    };

    Ok(FileReport {
        checked: results.len(),
        removed,
        dead: results.iter().filter(|r| !r.is_ok()).cloned().collect(),
        ..FileReport::new(path, outcome)
    })
}
