//! Image formats: the target-format enumeration and the intake allow-list.
//!
//! The allow-list is matched against the *declared* media type of a file,
//! never against its contents. Sniffing is the server's job; the client only
//! refuses what the server is known not to accept.

use crate::error::ImgConvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Media types accepted at intake.
pub const SUPPORTED_MEDIA_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/webp",
    "image/x-icon",
];

/// Media type reported for files whose extension is not recognised.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Whether `media_type` is on the intake allow-list (exact match).
pub fn is_supported_media_type(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES.contains(&media_type)
}

/// Declared media type for a path, derived from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// The image encoding requested for the converted output.
///
/// Serialised in upper case because that is what the server compares
/// against (`"PNG"`, `"JPEG"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
    Ico,
}

impl TargetFormat {
    /// Every format, in the order the format picker lists them.
    pub const ALL: [TargetFormat; 7] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Tiff,
        TargetFormat::Webp,
        TargetFormat::Ico,
    ];

    /// Identifier sent in the `format` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Gif => "GIF",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Tiff => "TIFF",
            TargetFormat::Webp => "WEBP",
            TargetFormat::Ico => "ICO",
        }
    }

    /// File extension the server reports for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Tiff => "tiff",
            TargetFormat::Webp => "webp",
            TargetFormat::Ico => "ico",
        }
    }

    /// Heading shown above [`TargetFormat::description`].
    pub fn title(&self) -> String {
        format!("About {} Format", self.as_str())
    }

    /// One-paragraph explanation of the format for the format picker.
    pub fn description(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG (Portable Network Graphics) is a lossless compression format that supports transparency. Ideal for graphics with sharp edges, text, or images that need to maintain high quality.",
            TargetFormat::Jpeg => "JPEG (Joint Photographic Experts Group) is a lossy compression format best suited for photographs and complex images with many colors. Does not support transparency.",
            TargetFormat::Gif => "GIF (Graphics Interchange Format) supports animation and transparency. Limited to 256 colors, making it best for simple animations and graphics with few colors.",
            TargetFormat::Bmp => "BMP (Bitmap) is an uncompressed raster graphics format. Results in large file sizes but preserves exact pixel data without any compression artifacts.",
            TargetFormat::Tiff => "TIFF (Tagged Image File Format) is a flexible format that can be lossless or lossy. Often used for high-quality images and professional publishing.",
            TargetFormat::Webp => "WebP is a modern format developed by Google that provides both lossless and lossy compression. Supports transparency and can be smaller than PNG or JPEG.",
            TargetFormat::Ico => "ICO is used primarily for favicons (website icons). Can contain multiple images of different sizes and color depths.",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = ImgConvError;

    /// Case-insensitive; `JPG` and `TIF` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(TargetFormat::Png),
            "JPEG" | "JPG" => Ok(TargetFormat::Jpeg),
            "GIF" => Ok(TargetFormat::Gif),
            "BMP" => Ok(TargetFormat::Bmp),
            "TIFF" | "TIF" => Ok(TargetFormat::Tiff),
            "WEBP" => Ok(TargetFormat::Webp),
            "ICO" => Ok(TargetFormat::Ico),
            other => Err(ImgConvError::InvalidConfig(format!(
                "unknown target format '{other}' (expected one of PNG, JPEG, GIF, BMP, TIFF, WEBP, ICO)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_exact() {
        for mt in SUPPORTED_MEDIA_TYPES {
            assert!(is_supported_media_type(mt));
        }
        assert!(!is_supported_media_type("image/svg+xml"));
        assert!(!is_supported_media_type("IMAGE/PNG"));
        assert!(!is_supported_media_type("image/vnd.microsoft.icon"));
        assert!(!is_supported_media_type(""));
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("scan.tif")), "image/tiff");
        assert_eq!(media_type_for_path(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(media_type_for_path(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(media_type_for_path(Path::new("README")), UNKNOWN_MEDIA_TYPE);
    }

    #[test]
    fn parse_target_format() {
        assert_eq!("png".parse::<TargetFormat>().unwrap(), TargetFormat::Png);
        assert_eq!("jpg".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
        assert_eq!(" WebP ".parse::<TargetFormat>().unwrap(), TargetFormat::Webp);
        assert!("heic".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn extension_map_matches_server() {
        assert_eq!(TargetFormat::Jpeg.extension(), "jpg");
        assert_eq!(TargetFormat::Tiff.extension(), "tiff");
        assert_eq!(TargetFormat::Ico.extension(), "ico");
    }

    #[test]
    fn serde_uses_wire_identifiers() {
        let json = serde_json::to_string(&TargetFormat::Webp).unwrap();
        assert_eq!(json, "\"WEBP\"");
        for f in TargetFormat::ALL {
            assert_eq!(serde_json::to_string(&f).unwrap(), format!("\"{}\"", f.as_str()));
        }
    }

    #[test]
    fn every_format_has_a_description() {
        for f in TargetFormat::ALL {
            assert!(!f.description().is_empty());
            assert!(f.title().contains(f.as_str()));
        }
    }
}
