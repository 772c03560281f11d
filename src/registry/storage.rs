use chrono::{DateTime, Utc};

pub const TOOLS_PREFIX: &str = "tools";
pub const INSPECTIONS_PREFIX: &str = "inspections";

/// An uploaded photo as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// Text after the last `.` of a file name, lower-cased. A name without a dot
/// is used whole.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or(file_name)
        .to_ascii_lowercase()
}

pub fn tool_photo_path(barcode: &str, extension: &str) -> String {
    format!("{TOOLS_PREFIX}/{barcode}.{extension}")
}

pub fn inspection_photo_path(at: DateTime<Utc>, extension: &str) -> String {
    format!("{INSPECTIONS_PREFIX}/inspection-{}.{extension}", at.timestamp_millis())
}
