use chrono::NaiveDate;
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

use crate::error::MetadataError;

/// Capture time first, then the file modification time.
const DATE_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTime];

/// Extract the calendar date from EXIF data in raw image bytes.
/// Works for any container kamadak-exif understands (JPEG, PNG, HEIF, TIFF, WebP).
pub fn extract_exif_date(bytes: &[u8]) -> Result<NaiveDate, MetadataError> {
    let reader = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map_err(MetadataError::Decode)?;

    for tag in DATE_TAGS {
        if let Some(field) = reader.get_field(tag, In::PRIMARY) {
            let Value::Ascii(ref values) = field.value else {
                continue;
            };
            if let Some(raw) = values.first() {
                return parse_exif_date(raw);
            }
        }
    }

    Err(MetadataError::MissingDateTag)
}

/// Parse the leading `YYYY:MM:DD` of an EXIF datetime; the time part is ignored.
fn parse_exif_date(raw: &[u8]) -> Result<NaiveDate, MetadataError> {
    let text = String::from_utf8_lossy(raw);
    let malformed = || MetadataError::Malformed {
        value: text.to_string(),
    };
    let head = text.get(..10).ok_or_else(malformed)?;
    NaiveDate::parse_from_str(head, "%Y:%m:%d").map_err(|_| malformed())
}
