use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use zip::ZipArchive;

use crate::config::{MediaKind, SortConfig};
use crate::date::{self, DateSource};
use crate::error::{ArchiveError, EntryError};
use crate::media::{self, MediaEntry};
use crate::route;
use crate::writer::OutputTree;
use crate::ThrottledProgress;

/// Cap on the up-front buffer reservation for an image read.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// One entry that could not be extracted.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFailure {
    pub entry: String,
    pub error: String,
}

/// What happened to one archive.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    /// Media entries selected for extraction
    pub media_entries: u64,
    /// Directory entries and unsupported extensions
    pub skipped: u64,
    pub extracted: u64,
    pub bytes_written: u64,
    pub dated_by_exif: u64,
    pub dated_by_filename: u64,
    /// Extracted file count per destination folder
    pub folders: BTreeMap<String, u64>,
    pub failures: Vec<EntryFailure>,
}

/// Result of enumerating an archive's entries.
#[derive(Debug, Default)]
pub struct EntryScan {
    /// Eligible entries in archive order
    pub media: Vec<MediaEntry>,
    pub skipped: u64,
    pub failures: Vec<EntryFailure>,
}

/// Select the entries worth extracting: files whose extension is a
/// recognized image or video type.
pub fn scan_entries<R: Read + Seek>(archive: &mut ZipArchive<R>, config: &SortConfig) -> EntryScan {
    let mut scan = EntryScan::default();

    for i in 0..archive.len() {
        // Metadata only; decryption and decompression wait for extraction.
        let entry = match archive.by_index_raw(i) {
            Ok(entry) => entry,
            Err(source) => {
                let error = EntryError::Read { index: i, source };
                scan.failures.push(EntryFailure {
                    entry: format!("#{}", i),
                    error: error.to_string(),
                });
                continue;
            }
        };

        if entry.is_dir() {
            scan.skipped += 1;
            continue;
        }

        let zip_path = media::decode_entry_name(entry.name_raw());
        let filename = media::base_name(&zip_path).to_string();
        let Some(kind) = config.media_kind(&filename) else {
            scan.skipped += 1;
            continue;
        };

        scan.media.push(MediaEntry {
            entry_index: i,
            filename,
            size: entry.size(),
            kind,
            zip_path,
        });
    }

    scan
}

/// Extract every eligible entry of one archive into the output tree.
///
/// Fails only when the archive itself cannot be opened or parsed; a bad
/// entry is recorded in the report and the next entry is tried.
pub fn process_archive(
    zip_path: &Path,
    config: &SortConfig,
    tree: &mut OutputTree,
    progress: &ThrottledProgress,
) -> Result<ArchiveReport, ArchiveError> {
    let file = File::open(zip_path).map_err(|source| ArchiveError::Open {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| ArchiveError::Corrupt {
        path: zip_path.to_path_buf(),
        source,
    })?;

    let zip_name = zip_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| zip_path.display().to_string());

    let scan = scan_entries(&mut archive, config);
    let mut report = ArchiveReport {
        archive: zip_path.to_path_buf(),
        media_entries: scan.media.len() as u64,
        skipped: scan.skipped,
        failures: scan.failures,
        ..Default::default()
    };
    for failure in &report.failures {
        warn!("Error reading {} in {}: {}", failure.entry, zip_name, failure.error);
    }

    info!(
        "Processing {}: {} media file(s), {} skipped",
        zip_name, report.media_entries, report.skipped
    );

    let total = scan.media.len() as u64;
    for (n, entry) in scan.media.iter().enumerate() {
        progress.report("extract", n as u64, total, &format!("{} ({})", zip_name, entry.filename));

        match extract_entry(&mut archive, entry, config, tree) {
            Ok(extracted) => {
                report.extracted += 1;
                report.bytes_written += extracted.bytes;
                match extracted.source {
                    Some(DateSource::Exif) => report.dated_by_exif += 1,
                    Some(DateSource::Filename) => report.dated_by_filename += 1,
                    None => {}
                }
                *report.folders.entry(extracted.folder).or_insert(0) += 1;
            }
            Err(e) => {
                warn!("Error extracting {} from {}: {}", entry.filename, zip_name, e);
                report.failures.push(EntryFailure {
                    entry: entry.zip_path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    progress.report("extract", total, total, &format!("Done {}", zip_name));

    Ok(report)
}

struct Extracted {
    folder: String,
    source: Option<DateSource>,
    bytes: u64,
}

fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &MediaEntry,
    config: &SortConfig,
    tree: &mut OutputTree,
) -> Result<Extracted, EntryError> {
    let mut file = archive
        .by_index(entry.entry_index)
        .map_err(|source| EntryError::Read {
            index: entry.entry_index,
            source,
        })?;

    // Images are read whole for the metadata lookup and written from memory.
    let image_bytes = match entry.kind {
        MediaKind::Image => {
            let mut bytes = Vec::with_capacity(entry.size.min(MAX_PREALLOC) as usize);
            file.read_to_end(&mut bytes).map_err(EntryError::ReadData)?;
            Some(bytes)
        }
        MediaKind::Video => None,
    };

    let lookup = date::extract_date(config, image_bytes.as_deref(), &entry.filename);
    if let Some(e) = &lookup.metadata_error {
        debug!("{}: {}", entry.zip_path, e);
    }

    let folder = route::resolve_folder(&entry.filename, lookup.date());
    let dest = tree.place(folder, &entry.filename)?;
    if tree.is_dry_run() {
        info!("{} -> {}", entry.zip_path, dest.display());
    } else {
        debug!("{} -> {}", entry.zip_path, dest.display());
    }

    let bytes = match image_bytes {
        Some(bytes) => tree.write(&mut bytes.as_slice(), &dest, lookup.date(), entry.size)?,
        None => tree.write(&mut file, &dest, lookup.date(), entry.size)?,
    };

    Ok(Extracted {
        folder: folder.to_string(),
        source: lookup.found.map(|r| r.source),
        bytes,
    })
}
