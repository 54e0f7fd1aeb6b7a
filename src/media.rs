use encoding_rs::SHIFT_JIS;

use crate::config::MediaKind;

/// A media entry selected for extraction from one archive.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    /// Full path inside the zip
    pub zip_path: String,
    /// Index of this entry within the zip archive (for by_index access)
    pub entry_index: usize,
    /// Just the filename
    pub filename: String,
    /// Uncompressed size in bytes
    pub size: u64,
    pub kind: MediaKind,
}

/// Decode a raw ZIP entry name, trying UTF-8 first, then Shift_JIS.
pub fn decode_entry_name(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    // Older Japanese archivers write Shift_JIS without setting the UTF-8 flag
    let (decoded, _, had_errors) = SHIFT_JIS.decode(raw);
    if !had_errors {
        return decoded.into_owned();
    }

    String::from_utf8_lossy(raw).into_owned()
}

/// Strip directory components from an in-archive path.
/// Both separators are accepted since some Windows tools write backslashes.
pub fn base_name(zip_path: &str) -> &str {
    zip_path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(zip_path)
}
