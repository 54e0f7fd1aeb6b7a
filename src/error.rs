//! Error types, one enum per scope a failure can end: the whole batch, one
//! archive, or one entry. Nothing here is fatal to a larger scope than its own.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a batch before any archive is touched.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Source path {} does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Source file {} is not a ZIP file", path.display())]
    InvalidSourceType { path: PathBuf },

    #[error("Failed to read source directory {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures that skip one archive; the batch moves on to the next one.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is a corrupted ZIP file: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Failures that skip one entry; the archive moves on to the next entry.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Failed to read entry #{index}: {source}")]
    Read {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read data: {0}")]
    ReadData(#[source] io::Error),

    #[error("Failed to create folder {}: {source}", path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Copy(#[from] CopyError),
}

/// Why no date came out of an image's embedded metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("No readable EXIF block: {0}")]
    Decode(#[source] exif::Error),

    #[error("EXIF block has no capture or modification time")]
    MissingDateTag,

    #[error("EXIF date {value:?} is not in YYYY:MM:DD form")]
    Malformed { value: String },
}

/// Failures while writing one extracted file.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid date pattern {name:?}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Date pattern {name:?} is missing the named group {group:?}")]
    MissingGroup { name: String, group: &'static str },
}
