//! Intake: turn a user-chosen path into a [`SelectedFile`] and a preview.
//!
//! Validation looks only at the declared media type, the same way the page
//! checks `File.type`. When the caller does not declare one, it is derived
//! from the file extension, which is what a browser does too. The bytes are
//! not read until a preview or a conversion needs them.

use crate::error::ImgConvError;
use crate::format::{is_supported_media_type, media_type_for_path};
use crate::output::{Preview, SelectedFile};
use crate::pipeline::encode::encode_data_url;
use crate::pipeline::render::format_file_size;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file the user picked, before validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Declared media type; derived from the extension when `None`.
    pub media_type: Option<String>,
}

impl FileCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The media type intake will check.
    pub fn declared_media_type(&self) -> String {
        self.media_type
            .clone()
            .unwrap_or_else(|| media_type_for_path(&self.path).to_string())
    }
}

/// Validate a candidate and accept it as the selected file.
///
/// # Errors
/// - [`ImgConvError::UnsupportedType`] when the declared type is not on the
///   allow-list (checked first, without touching the file system)
/// - [`ImgConvError::FileNotFound`] / [`ImgConvError::PermissionDenied`]
///   when the path cannot be inspected or is not a regular file
pub fn submit(candidate: &FileCandidate) -> Result<SelectedFile, ImgConvError> {
    let media_type = candidate.declared_media_type();
    if !is_supported_media_type(&media_type) {
        warn!(
            "Rejected '{}': unsupported media type {}",
            candidate.path.display(),
            media_type
        );
        return Err(ImgConvError::UnsupportedType { media_type });
    }

    let path = candidate.path.clone();
    let meta = std::fs::metadata(&path).map_err(|e| intake_error(&path, e))?;
    if !meta.is_file() {
        return Err(ImgConvError::FileNotFound { path });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    info!("File selected: {}", name);
    debug!(
        "File type: {}, size: {} bytes ({})",
        media_type,
        meta.len(),
        format_file_size(meta.len())
    );

    Ok(SelectedFile {
        path,
        name,
        media_type,
        size: meta.len(),
    })
}

/// Read the selected file and render it as a data URL.
///
/// # Errors
/// [`ImgConvError::PreviewReadFailed`] when the bytes cannot be read.
pub async fn read_preview(file: &SelectedFile) -> Result<Preview, ImgConvError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| ImgConvError::PreviewReadFailed {
            path: file.path.clone(),
            source,
        })?;
    Ok(Preview {
        data_url: encode_data_url(&file.media_type, &bytes),
    })
}

/// Read the selected file's bytes for upload.
pub async fn read_bytes(file: &SelectedFile) -> Result<Vec<u8>, ImgConvError> {
    tokio::fs::read(&file.path)
        .await
        .map_err(|e| intake_error(&file.path, e))
}

fn intake_error(path: &Path, e: std::io::Error) -> ImgConvError {
    match e.kind() {
        ErrorKind::PermissionDenied => ImgConvError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ImgConvError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn accepts_allow_listed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "photo.jpeg", b"\xFF\xD8\xFF\xE0");
        let file = submit(&FileCandidate::new(&path)).unwrap();
        assert_eq!(file.name, "photo.jpeg");
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.size, 4);
    }

    #[test]
    fn declared_type_wins_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blob.bin", b"GIF89a");
        let file = submit(&FileCandidate::new(&path).with_media_type("image/gif")).unwrap();
        assert_eq!(file.media_type, "image/gif");

        let png = write_file(&dir, "real.png", b"\x89PNG");
        let err = submit(&FileCandidate::new(&png).with_media_type("image/svg+xml")).unwrap_err();
        assert!(matches!(err, ImgConvError::UnsupportedType { .. }));
    }

    #[test]
    fn rejects_unsupported_before_touching_disk() {
        let err = submit(&FileCandidate::new("/definitely/missing/drawing.svg")).unwrap_err();
        match err {
            ImgConvError::UnsupportedType { media_type } => assert_eq!(media_type, "image/svg+xml"),
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = submit(&FileCandidate::new("/definitely/missing/photo.png")).unwrap_err();
        assert!(matches!(err, ImgConvError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("folder.png");
        std::fs::create_dir(&sub).unwrap();
        let err = submit(&FileCandidate::new(&sub)).unwrap_err();
        assert!(matches!(err, ImgConvError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn preview_is_base64_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "tiny.png", &[0x89, b'P', b'N', b'G']);
        let file = submit(&FileCandidate::new(&path)).unwrap();
        let preview = read_preview(&file).await.unwrap();
        assert_eq!(preview.data_url, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn preview_of_vanished_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "gone.png", b"x");
        let file = submit(&FileCandidate::new(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        let err = read_preview(&file).await.unwrap_err();
        assert!(matches!(err, ImgConvError::PreviewReadFailed { .. }));
    }
}
