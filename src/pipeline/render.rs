//! Result rendering: pure formatting of a [`ConversionResult`] for display.
//!
//! No I/O happens here. The session decides when the view is revealed; this
//! module only decides what it says.

use crate::output::ConversionResult;
use serde::Serialize;
use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Relative size change under which a same-format result counts as untouched.
pub const PRESERVED_RATIO: f64 = 0.01;

/// Human-readable byte count: `B` below 1 KiB, then `KB` / `MB` with two
/// decimals (binary multiples). Ties round up, so 1152 bytes is `1.13 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.2} KB", hundredths(bytes, KIB))
    } else {
        format!("{:.2} MB", hundredths(bytes, MIB))
    }
}

/// `bytes / unit` rounded half away from zero to two decimals.
fn hundredths(bytes: u64, unit: u64) -> f64 {
    (bytes as f64 * 100.0 / unit as f64).round() / 100.0
}

/// Notice shown when the output kept the input's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreservationNotice {
    /// Sizes within 1 %: the server passed the original bytes through.
    OriginalPreserved,
    /// Same format, but the server re-encoded it.
    FormatMaintained,
}

impl PreservationNotice {
    pub fn headline(&self) -> &'static str {
        match self {
            PreservationNotice::OriginalPreserved => "Original preserved:",
            PreservationNotice::FormatMaintained => "Format maintained:",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PreservationNotice::OriginalPreserved => {
                "The file has been kept in its original format with no re-encoding."
            }
            PreservationNotice::FormatMaintained => {
                "The image has been optimized while keeping its original format."
            }
        }
    }
}

impl fmt::Display for PreservationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.headline(), self.message())
    }
}

/// Decide which preservation notice, if any, applies to `result`.
///
/// A zero original size never counts as preserved: the ratio is undefined.
pub fn preservation_notice(result: &ConversionResult) -> Option<PreservationNotice> {
    if result.original_format != result.converted_format {
        return None;
    }
    if result.original_size == 0 {
        return Some(PreservationNotice::FormatMaintained);
    }
    let ratio = result.original_size.abs_diff(result.converted_size) as f64
        / result.original_size as f64;
    if ratio < PRESERVED_RATIO {
        Some(PreservationNotice::OriginalPreserved)
    } else {
        Some(PreservationNotice::FormatMaintained)
    }
}

/// Everything the results panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// e.g. `PNG (1.00 KB)`
    pub original: String,
    /// e.g. `JPEG (512 B)`
    pub converted: String,
    pub notice: Option<PreservationNotice>,
    pub download_name: String,
}

/// Format a result for the results panel.
pub fn render(result: &ConversionResult) -> ResultView {
    ResultView {
        original: format!(
            "{} ({})",
            result.original_format,
            format_file_size(result.original_size)
        ),
        converted: format!(
            "{} ({})",
            result.converted_format,
            format_file_size(result.converted_size)
        ),
        notice: preservation_notice(result),
        download_name: result.download_name(),
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original:   {}", self.original)?;
        write!(f, "Converted:  {}", self.converted)?;
        if let Some(notice) = self.notice {
            write!(f, "\n{notice}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(orig_fmt: &str, conv_fmt: &str, orig: u64, conv: u64) -> ConversionResult {
        ConversionResult {
            original_format: orig_fmt.into(),
            converted_format: conv_fmt.into(),
            original_size: orig,
            converted_size: conv,
            converted_data: "data:image/png;base64,AA==".into(),
            file_extension: "png".into(),
        }
    }

    #[test]
    fn file_size_bands() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1152), "1.13 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1_048_575), "1024.00 KB");
        assert_eq!(format_file_size(1_048_576), "1.00 MB");
        assert_eq!(format_file_size(1_179_648), "1.13 MB");
        assert_eq!(format_file_size(5 * 1_048_576 + 524_288), "5.50 MB");
    }

    #[test]
    fn same_format_small_delta_is_preserved() {
        let r = result("PNG", "PNG", 1000, 1005);
        assert_eq!(preservation_notice(&r), Some(PreservationNotice::OriginalPreserved));
    }

    #[test]
    fn same_format_large_delta_is_maintained() {
        let r = result("PNG", "PNG", 1000, 800);
        assert_eq!(preservation_notice(&r), Some(PreservationNotice::FormatMaintained));
        // exactly 1 % is not "below 1 %"
        let r = result("PNG", "PNG", 1000, 1010);
        assert_eq!(preservation_notice(&r), Some(PreservationNotice::FormatMaintained));
    }

    #[test]
    fn different_formats_have_no_notice() {
        let r = result("PNG", "JPEG", 1000, 1000);
        assert_eq!(preservation_notice(&r), None);
    }

    #[test]
    fn zero_original_size_is_maintained() {
        let r = result("GIF", "GIF", 0, 0);
        assert_eq!(preservation_notice(&r), Some(PreservationNotice::FormatMaintained));
    }

    #[test]
    fn view_labels() {
        let view = render(&result("PNG", "JPEG", 2048, 100));
        assert_eq!(view.original, "PNG (2.00 KB)");
        assert_eq!(view.converted, "JPEG (100 B)");
        assert_eq!(view.notice, None);
        assert_eq!(view.download_name, "converted_image.png");
        let text = view.to_string();
        assert!(text.contains("Original:   PNG (2.00 KB)"));
        assert!(!text.contains("preserved"));
    }

    #[test]
    fn view_text_includes_notice() {
        let view = render(&result("PNG", "PNG", 1000, 1000));
        assert!(view
            .to_string()
            .ends_with("Original preserved: The file has been kept in its original format with no re-encoding."));
    }
}
