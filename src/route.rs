use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

/// Filename prefixes of app-generated media, checked in order.
/// A prefix match routes to its bucket even when a date is known.
const PREFIX_BUCKETS: &[(&str, &str)] = &[
    ("FB_IMG_", "Facebook"),          // Facebook downloads
    ("Screenshot_", "Screenshot"),    // Android screenshots
    ("Screenrecorder", "Screenrecorder"),
    ("Screen_Recording", "Screenrecorder"),
];

/// Bucket for files with no prefix match and no date.
pub const FALLBACK_BUCKET: &str = "Others";

/// Destination folder, relative to the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Bucket(&'static str),
    Dated { year: i32, month: u32 },
}

impl Folder {
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Folder::Bucket(name) => PathBuf::from(name),
            Folder::Dated { year, month } => {
                PathBuf::from(year.to_string()).join(format!("{:02}", month))
            }
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Folder::Bucket(name) => f.write_str(name),
            Folder::Dated { year, month } => write!(f, "{}/{:02}", year, month),
        }
    }
}

/// Pick the destination folder for a base filename.
pub fn resolve_folder(filename: &str, date: Option<NaiveDate>) -> Folder {
    if let Some((_, bucket)) = PREFIX_BUCKETS
        .iter()
        .find(|(prefix, _)| filename.starts_with(prefix))
    {
        return Folder::Bucket(*bucket);
    }

    match date {
        Some(d) => Folder::Dated {
            year: d.year(),
            month: d.month(),
        },
        None => Folder::Bucket(FALLBACK_BUCKET),
    }
}
