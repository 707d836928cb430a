//! Discovers and parses fragment payload files under a generated docs tree.

mod parse;

pub use parse::{capability_from_path, parse_fragment};

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use traitdex_api::IndexFragment;
use walkdir::WalkDir;

use crate::error::{Result, TraitdexError};

/// Directory holding fragment payloads, relative to the docs root.
pub const FRAGMENT_DIR: &str = "implementors";

/// Counters for one load pass.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    /// JS files seen under the fragment directory.
    pub files_seen: usize,
    /// Files that produced a fragment.
    pub fragments_loaded: usize,
    /// Files skipped: unreadable, not a payload, malformed, or empty after
    /// parsing.
    pub files_skipped: usize,
    /// Records across all loaded fragments.
    pub records_loaded: usize,
    /// Malformed module lines; any one drops its whole file.
    pub malformed_lines: usize,
    /// Time taken for the load.
    pub duration: std::time::Duration,
}

/// Fragments plus the counters describing how they were obtained.
#[derive(Debug, Default, Clone)]
pub struct LoadOutcome {
    pub fragments: Vec<IndexFragment>,
    pub report: LoadReport,
}

/// Walks `<root>/implementors` and parses every payload file found there.
pub struct FragmentLoader {
    root: PathBuf,
}

impl FragmentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads every fragment under the docs tree, in path order.
    ///
    /// Files that cannot be read or parsed are skipped with a diagnostic and
    /// the load keeps going; only a missing fragment directory is an error.
    pub fn load(&self) -> Result<LoadOutcome> {
        let fragment_root = self.root.join(FRAGMENT_DIR);
        if !fragment_root.is_dir() {
            return Err(TraitdexError::Parsing(format!(
                "no {} directory under {}",
                FRAGMENT_DIR,
                self.root.display()
            )));
        }

        let start = Instant::now();
        let mut outcome = LoadOutcome::default();

        let entries = WalkDir::new(&fragment_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable directory entry: {}", err);
                    None
                }
            });
        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("js") {
                continue;
            }
            outcome.report.files_seen += 1;

            match load_file(&fragment_root, path, &mut outcome.report) {
                Ok(Some(fragment)) => {
                    outcome.report.fragments_loaded += 1;
                    outcome.report.records_loaded += fragment.record_count();
                    outcome.fragments.push(fragment);
                }
                Ok(None) => outcome.report.files_skipped += 1,
                Err(err) => {
                    warn!("Skipping fragment file {:?}: {}", path, err);
                    outcome.report.files_skipped += 1;
                }
            }
        }

        outcome.report.duration = start.elapsed();
        info!(
            "Fragment load complete: {} file(s), {} fragment(s), {} record(s) in {:?}",
            outcome.report.files_seen,
            outcome.report.fragments_loaded,
            outcome.report.records_loaded,
            outcome.report.duration
        );
        Ok(outcome)
    }
}

fn load_file(
    fragment_root: &Path,
    path: &Path,
    report: &mut LoadReport,
) -> Result<Option<IndexFragment>> {
    let relative = path.strip_prefix(fragment_root).unwrap_or(path);
    let capability = parse::capability_from_path(relative)?;
    let source = std::fs::read_to_string(path)?;
    let (fragment, malformed) = parse::parse_fragment(capability, &source);
    if malformed > 0 {
        report.malformed_lines += malformed;
        warn!(
            "Dropping fragment file {:?}: {} malformed module line(s)",
            path, malformed
        );
        return Ok(None);
    }

    if fragment.is_empty() {
        debug!("No module lines in {:?}", path);
        return Ok(None);
    }
    Ok(Some(fragment))
}
