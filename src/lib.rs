pub mod config;
pub mod date;
pub mod error;
pub mod media;
pub mod route;
pub mod writer;
pub mod zip_scan;

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{error, info};
use serde::Serialize;

pub use config::{DatePattern, MediaKind, SortConfig, SortOptions};
pub use error::{ArchiveError, BatchError, EntryError};
pub use route::Folder;
pub use zip_scan::ArchiveReport;

/// An archive that could not be opened or parsed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedArchive {
    pub archive: PathBuf,
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub dry_run: bool,
    pub archives_found: u64,
    pub archives: Vec<ArchiveReport>,
    pub failed_archives: Vec<FailedArchive>,
}

impl BatchSummary {
    pub fn files_extracted(&self) -> u64 {
        self.archives.iter().map(|a| a.extracted).sum()
    }

    pub fn entry_failures(&self) -> u64 {
        self.archives.iter().map(|a| a.failures.len() as u64).sum()
    }
}

/// Type alias for progress callback: (stage, current, total, message)
pub type ProgressCallback = dyn Fn(&str, u64, u64, &str) + Send + Sync;

/// Throttled progress reporter: emits at most every 200ms, and always on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback,
    last_emit: Cell<Option<Instant>>,
}

impl<'a> ThrottledProgress<'a> {
    const INTERVAL: Duration = Duration::from_millis(200);

    pub fn new(inner: &'a ProgressCallback) -> Self {
        Self {
            inner,
            last_emit: Cell::new(None),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            if let Some(last) = self.last_emit.get() {
                if last.elapsed() < Self::INTERVAL {
                    return;
                }
            }
            self.last_emit.set(Some(Instant::now()));
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Find the archives to process.
///
/// A single file must itself be an archive. A directory is searched one
/// level deep and the matches are returned sorted by name.
pub fn discover_archives(source: &Path, config: &SortConfig) -> Result<Vec<PathBuf>, BatchError> {
    if !source.exists() {
        return Err(BatchError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }

    if source.is_file() {
        if config.is_archive(source) {
            return Ok(vec![source.to_path_buf()]);
        }
        return Err(BatchError::InvalidSourceType {
            path: source.to_path_buf(),
        });
    }

    let read_err = |source_err| BatchError::ReadSource {
        path: source.to_path_buf(),
        source: source_err,
    };
    let mut archives = Vec::new();
    for entry in fs::read_dir(source).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && config.is_archive(&path) {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Run the whole batch: discover archives, then extract each one in order.
///
/// Only a bad source path is an error. A corrupt archive is recorded in the
/// summary and the remaining archives are still processed.
pub fn run(
    options: &SortOptions,
    config: &SortConfig,
    progress_callback: &ProgressCallback,
) -> Result<BatchSummary, BatchError> {
    let archives = discover_archives(&options.source, config)?;
    let mut summary = BatchSummary {
        dry_run: options.dry_run,
        archives_found: archives.len() as u64,
        ..Default::default()
    };

    if archives.is_empty() {
        info!("No ZIP files found to process.");
        return Ok(summary);
    }
    info!("Found {} ZIP file(s) to process.", archives.len());

    // Per-archive lines go straight through; only entry progress is throttled.
    let entry_progress = ThrottledProgress::new(progress_callback);
    let mut tree = writer::OutputTree::new(options);
    let total = archives.len() as u64;

    for (i, archive) in archives.iter().enumerate() {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress_callback("archive", i as u64, total, &name);

        match zip_scan::process_archive(archive, config, &mut tree, &entry_progress) {
            Ok(report) => summary.archives.push(report),
            Err(e) => {
                error!("Skipping {}: {}", name, e);
                summary.failed_archives.push(FailedArchive {
                    archive: archive.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    progress_callback("archive", total, total, "All archives processed");

    Ok(summary)
}
