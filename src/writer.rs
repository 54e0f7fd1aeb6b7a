use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;

use crate::config::SortOptions;
use crate::error::{CopyError, EntryError};
use crate::route::Folder;

/// The destination tree for one batch.
///
/// In dry-run mode nothing is created; destinations handed out earlier in the
/// run count as taken so the plan matches what a real run would write.
pub struct OutputTree {
    root: PathBuf,
    dry_run: bool,
    preserve_mtime: bool,
    created_dirs: HashSet<PathBuf>,
    planned: HashSet<PathBuf>,
}

impl OutputTree {
    pub fn new(options: &SortOptions) -> Self {
        Self {
            root: options.destination.clone(),
            dry_run: options.dry_run,
            preserve_mtime: options.preserve_mtime,
            created_dirs: HashSet::new(),
            planned: HashSet::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Ensure the folder exists and pick a free path in it for `filename`.
    pub fn place(&mut self, folder: Folder, filename: &str) -> Result<PathBuf, EntryError> {
        let dir = self.root.join(folder.relative_path());

        if self.dry_run {
            let planned = &self.planned;
            let dest = unique_path_with(&dir.join(filename), |p| planned.contains(p) || p.exists());
            self.planned.insert(dest.clone());
            return Ok(dest);
        }

        // Create directory only once per unique path
        if !self.created_dirs.contains(&dir) {
            ensure_folder(&dir).map_err(|source| EntryError::CreateFolder {
                path: dir.clone(),
                source,
            })?;
            self.created_dirs.insert(dir.clone());
        }

        Ok(unique_path(&dir.join(filename)))
    }

    /// Write `reader` to `dest`. Returns `size_hint` untouched in dry-run mode.
    pub fn write<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        dest: &Path,
        date: Option<NaiveDate>,
        size_hint: u64,
    ) -> Result<u64, EntryError> {
        if self.dry_run {
            return Ok(size_hint);
        }

        let written = copy_to(reader, dest)?;

        if self.preserve_mtime {
            if let Some(d) = date {
                if let Err(e) = set_mtime(dest, d) {
                    warn!("Could not set mtime on {}: {}", dest.display(), e);
                }
            }
        }
        Ok(written)
    }
}

/// Return `candidate` if nothing exists there yet, otherwise the first free
/// `{stem}_{n}{ext}` sibling counting up from 1.
///
/// The check and the later create are not atomic; a single writer per
/// destination tree is assumed.
pub fn unique_path(candidate: &Path) -> PathBuf {
    unique_path_with(candidate, |p| p.exists())
}

/// Like [`unique_path`], with a caller-supplied "already taken" test.
pub fn unique_path_with<F>(candidate: &Path, is_taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    if !is_taken(candidate) {
        return candidate.to_path_buf();
    }

    let dir = candidate.parent().unwrap_or_else(|| Path::new(""));
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let next = dir.join(format!("{}_{}{}", stem, counter, ext));
        if !is_taken(&next) {
            return next;
        }
        counter += 1;
    }
}

/// Create `dir` and its parents. Succeeds if it already exists.
pub fn ensure_folder(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Stream `reader` into a new file at `dest`, returning the bytes written.
/// A partially written file is removed on failure.
pub fn copy_to<R: Read + ?Sized>(reader: &mut R, dest: &Path) -> Result<u64, CopyError> {
    let file = File::create(dest).map_err(|source| CopyError::Create {
        path: dest.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    let written = io::copy(reader, &mut out).and_then(|n| out.flush().map(|_| n));
    match written {
        Ok(n) => Ok(n),
        Err(source) => {
            drop(out);
            let _ = fs::remove_file(dest);
            Err(CopyError::Write {
                path: dest.to_path_buf(),
                source,
            })
        }
    }
}

/// Set the file's mtime to local midnight of `date`.
pub fn set_mtime(dest: &Path, date: NaiveDate) -> io::Result<()> {
    let local = date
        .and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(chrono::Local).earliest())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "date has no local midnight"))?;
    let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
    filetime::set_file_mtime(dest, ft)
}
