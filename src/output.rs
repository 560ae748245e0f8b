//! Data carried between the stages of a session.
//!
//! [`SelectedFile`] is a handle on the user's input (like a browser `File`:
//! metadata up front, bytes read on demand). [`ConversionResult`] is what the
//! server sent back, with the page's fallback values already applied.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that passed intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Where the bytes live.
    pub path: PathBuf,
    /// Display name (final path component).
    pub name: String,
    /// Declared media type; always on the allow-list.
    pub media_type: String,
    /// Byte length at selection time.
    pub size: u64,
}

/// A selected file rendered as a self-contained `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub data_url: String,
}

/// Raw JSON reply from the `/convert` endpoint.
///
/// Every field is optional because the server may omit any of them; the
/// fallbacks are applied in [`ConversionReply::into_result`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionReply {
    #[serde(default)]
    pub converted_data: Option<String>,
    #[serde(default)]
    pub file_extension: Option<String>,
    #[serde(default)]
    pub original_format: Option<String>,
    #[serde(default)]
    pub converted_format: Option<String>,
    #[serde(default)]
    pub original_size: Option<u64>,
    #[serde(default)]
    pub converted_size: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Fallback shown when the server omits a format name.
pub const UNKNOWN_FORMAT: &str = "Unknown";

/// Fallback extension when the server omits `file_extension`.
pub const DEFAULT_EXTENSION: &str = "png";

impl ConversionReply {
    /// Apply the fallback values and produce a result.
    ///
    /// Empty strings count as absent for the extension, matching the page's
    /// `data.file_extension || 'png'`.
    pub fn into_result(self) -> ConversionResult {
        ConversionResult {
            original_format: self
                .original_format
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_FORMAT.to_string()),
            converted_format: self
                .converted_format
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_FORMAT.to_string()),
            original_size: self.original_size.unwrap_or(0),
            converted_size: self.converted_size.unwrap_or(0),
            converted_data: self.converted_data.unwrap_or_default(),
            file_extension: self
                .file_extension
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        }
    }
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub original_format: String,
    pub converted_format: String,
    pub original_size: u64,
    pub converted_size: u64,
    /// Converted image as a `data:` URL, exactly as the server sent it.
    pub converted_data: String,
    /// Extension hint for naming the download.
    pub file_extension: String,
}

impl ConversionResult {
    /// Whether there is image data to download.
    pub fn has_data(&self) -> bool {
        !self.converted_data.is_empty()
    }

    /// Whether the extension hint is a bare name segment (ASCII letters and
    /// digits only) and so cannot steer the download out of its directory.
    pub fn has_safe_extension(&self) -> bool {
        !self.file_extension.is_empty()
            && self
                .file_extension
                .bytes()
                .all(|b| b.is_ascii_alphanumeric())
    }

    /// Name the download is saved under.
    pub fn download_name(&self) -> String {
        format!("converted_image.{}", self.file_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_fallbacks() {
        let reply: ConversionReply = serde_json::from_str(r#"{"converted_data":"data:,"}"#).unwrap();
        let r = reply.into_result();
        assert_eq!(r.file_extension, "png");
        assert_eq!(r.original_format, "Unknown");
        assert_eq!(r.converted_format, "Unknown");
        assert_eq!(r.original_size, 0);
        assert_eq!(r.converted_size, 0);
        assert_eq!(r.download_name(), "converted_image.png");
    }

    #[test]
    fn full_reply_is_carried_over() {
        let reply: ConversionReply = serde_json::from_str(
            r#"{
                "original_format": "PNG",
                "converted_format": "JPEG",
                "original_size": 2048,
                "converted_size": 1024,
                "converted_data": "data:image/jpeg;base64,AAAA",
                "file_extension": "jpg"
            }"#,
        )
        .unwrap();
        assert!(reply.error.is_none());
        let r = reply.into_result();
        assert_eq!(r.original_format, "PNG");
        assert_eq!(r.converted_size, 1024);
        assert_eq!(r.download_name(), "converted_image.jpg");
        assert!(r.has_data());
    }

    #[test]
    fn null_fields_are_absent() {
        let reply: ConversionReply =
            serde_json::from_str(r#"{"file_extension": null, "original_size": null}"#).unwrap();
        let r = reply.into_result();
        assert_eq!(r.file_extension, "png");
        assert_eq!(r.original_size, 0);
        assert!(!r.has_data());
    }

    #[test]
    fn extension_must_be_a_bare_segment() {
        let mut r = ConversionReply::default().into_result();
        assert!(r.has_safe_extension());
        for bad in ["gif/../../escaped", "..", "a\\b", "jp g", "tiff.", "ïco"] {
            r.file_extension = bad.to_string();
            assert!(!r.has_safe_extension(), "{bad:?} accepted");
        }
        r.file_extension = "tiff".to_string();
        assert!(r.has_safe_extension());
    }
}
