//! Error types for the imgconv-client library.
//!
//! Every failure is terminal for the action that triggered it: nothing is
//! retried, and each variant carries a message fit to show the user as-is.
//! The variants group by the stage that produces them:
//!
//! * intake: the file could not be selected or previewed;
//! * exchange: the `/convert` round-trip failed at the HTTP or JSON level;
//! * download: there is nothing to save, or the save itself failed.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the imgconv-client library.
#[derive(Debug, Error)]
pub enum ImgConvError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The declared media type is not on the allow-list.
    #[error("Unsupported file type. Please use JPEG, PNG, GIF, BMP, TIFF, WebP, or ICO images.")]
    UnsupportedType { media_type: String },

    /// The accepted file could not be rendered as a local preview.
    #[error("Failed to read the selected file. Please try again.\n({path}: {source})")]
    PreviewReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Convert was requested with nothing selected.
    #[error("No file selected for conversion")]
    NoFileSelected,

    // ── Exchange errors ───────────────────────────────────────────────────
    /// The server answered with a non-success HTTP status.
    #[error("Server returned {status}: {reason}")]
    NetworkFailure { status: u16, reason: String },

    /// The server answered 2xx but the body carried an `error` field.
    #[error("{message}")]
    LogicalFailure { message: String },

    /// The request never produced an HTTP response (connect, DNS, body read).
    #[error("Request to '{url}' failed: {reason}\nIs the conversion server running?")]
    RequestFailed { url: String, reason: String },

    /// The response body or its embedded image data could not be understood.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A conversion is already outstanding for this session.
    #[error("A conversion is already in progress; wait for it to finish.")]
    ConversionInProgress,

    // ── Download errors ───────────────────────────────────────────────────
    /// Download requested before any successful conversion.
    #[error("No converted image available!")]
    DownloadUnavailable,

    /// Could not create or write the downloaded image.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a value could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImgConvError {
    /// Whether the front end should show this as a transient banner rather
    /// than a blocking alert. Only intake rejections are transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, ImgConvError::UnsupportedType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failure_display() {
        let e = ImgConvError::NetworkFailure {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(e.to_string(), "Server returned 500: Internal Server Error");
    }

    #[test]
    fn logical_failure_is_message_verbatim() {
        let e = ImgConvError::LogicalFailure {
            message: "bad format".into(),
        };
        assert_eq!(e.to_string(), "bad format");
    }

    #[test]
    fn unsupported_type_names_the_supported_set() {
        let e = ImgConvError::UnsupportedType {
            media_type: "image/svg+xml".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("JPEG, PNG, GIF, BMP, TIFF, WebP, or ICO"), "got: {msg}");
        assert!(e.is_transient());
    }

    #[test]
    fn download_unavailable_is_blocking() {
        let e = ImgConvError::DownloadUnavailable;
        assert_eq!(e.to_string(), "No converted image available!");
        assert!(!e.is_transient());
    }
}
