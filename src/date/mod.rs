pub mod exif;
pub mod guess;

use chrono::NaiveDate;

use crate::config::SortConfig;
use crate::error::MetadataError;

/// Where a date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Exif,
    Filename,
}

/// A capture date together with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateResult {
    pub date: NaiveDate,
    pub source: DateSource,
}

/// Outcome of a date lookup for one entry.
///
/// `metadata_error` is set when image bytes were given but yielded no date,
/// even if the filename later supplied one. The caller decides whether that
/// is worth reporting.
#[derive(Debug, Default)]
pub struct DateLookup {
    pub found: Option<DateResult>,
    pub metadata_error: Option<MetadataError>,
}

impl DateLookup {
    pub fn date(&self) -> Option<NaiveDate> {
        self.found.map(|r| r.date)
    }
}

/// Extract a date in priority order: embedded metadata, then filename.
///
/// `image_bytes` is `Some` only for image-like entries; videos skip straight
/// to the filename patterns.
pub fn extract_date(
    config: &SortConfig,
    image_bytes: Option<&[u8]>,
    filename: &str,
) -> DateLookup {
    let mut lookup = DateLookup::default();

    if let Some(bytes) = image_bytes {
        match exif::extract_exif_date(bytes) {
            Ok(date) => {
                lookup.found = Some(DateResult {
                    date,
                    source: DateSource::Exif,
                });
                return lookup;
            }
            Err(e) => lookup.metadata_error = Some(e),
        }
    }

    lookup.found = guess::guess_date_from_filename(&config.date_patterns, filename).map(|date| {
        DateResult {
            date,
            source: DateSource::Filename,
        }
    });
    lookup
}
