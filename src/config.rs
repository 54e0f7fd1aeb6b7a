use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kind of media an entry holds, decided by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Embedded metadata is tried before the filename.
    Image,
    /// Only the filename is searched for a date.
    Video,
}

/// A filename date pattern with `year`, `month` and `day` named groups.
#[derive(Debug, Clone)]
pub struct DatePattern {
    name: String,
    regex: Regex,
}

impl DatePattern {
    pub fn new(name: &str, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;
        for group in ["year", "month", "day"] {
            if !regex.capture_names().flatten().any(|n| n == group) {
                return Err(ConfigError::MissingGroup {
                    name: name.to_string(),
                    group,
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Recognized extensions and filename date patterns.
///
/// Built once and handed by reference to the date extractor and the archive
/// processor, so tests can swap any part of it.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
    /// Tried in order; the first one that matches decides.
    pub date_patterns: Vec<DatePattern>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            image_extensions: to_strings(&["jpg", "jpeg", "png", "heic"]),
            video_extensions: to_strings(&["mp4", "mov"]),
            archive_extensions: to_strings(&["zip"]),
            date_patterns: default_date_patterns(),
        }
    }
}

impl SortConfig {
    pub fn with_image_extensions(mut self, extensions: &[&str]) -> Self {
        self.image_extensions = to_strings(extensions);
        self
    }

    pub fn with_video_extensions(mut self, extensions: &[&str]) -> Self {
        self.video_extensions = to_strings(extensions);
        self
    }

    pub fn with_archive_extensions(mut self, extensions: &[&str]) -> Self {
        self.archive_extensions = to_strings(extensions);
        self
    }

    pub fn with_date_patterns(mut self, patterns: Vec<DatePattern>) -> Self {
        self.date_patterns = patterns;
        self
    }

    /// Media kind for a filename, or `None` if it should not be extracted.
    pub fn media_kind(&self, filename: &str) -> Option<MediaKind> {
        let ext = lowercase_extension(Path::new(filename))?;
        if self.image_extensions.contains(&ext) {
            Some(MediaKind::Image)
        } else if self.video_extensions.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn is_archive(&self, path: &Path) -> bool {
        lowercase_extension(path).is_some_and(|ext| self.archive_extensions.contains(&ext))
    }
}

/// Per-run options chosen by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptions {
    /// A ZIP file or a directory holding ZIP files.
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Plan every destination without touching the filesystem.
    #[serde(default)]
    pub dry_run: bool,
    /// Set each written file's mtime to its inferred date.
    #[serde(default)]
    pub preserve_mtime: bool,
}

impl SortOptions {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            dry_run: false,
            preserve_mtime: false,
        }
    }
}

fn default_date_patterns() -> Vec<DatePattern> {
    // Both patterns are fixed literals with all three groups. `\d` would also
    // match non-ASCII digits, which then fail to parse.
    [
        ("YYYYMMDD", r"(?P<year>[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})"),
        ("YYYY-MM-DD", r"(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})"),
    ]
    .iter()
    .filter_map(|(name, pattern)| DatePattern::new(name, pattern).ok())
    .collect()
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_ascii_lowercase()).collect()
}
