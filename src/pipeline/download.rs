//! Saving the converted image to disk.
//!
//! The server is authoritative for the encoded bytes: the data URL it sent is
//! decoded and written verbatim, never re-encoded. Writes go through a temp
//! file in the destination directory and a rename, so a failed save leaves
//! whatever was at the destination before.

use crate::error::ImgConvError;
use crate::output::ConversionResult;
use crate::pipeline::encode::decode_data_url;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Save `result` as `<output_dir>/converted_image.<ext>`.
///
/// # Errors
/// - [`ImgConvError::DownloadUnavailable`] when there is no result or it has
///   no image data; the file system is not touched
/// - [`ImgConvError::InvalidResponse`] when the data URL does not decode or
///   the extension hint is not plain ASCII letters and digits
/// - [`ImgConvError::OutputWriteFailed`] when the file cannot be written
pub async fn download(
    result: Option<&ConversionResult>,
    output_dir: &Path,
) -> Result<PathBuf, ImgConvError> {
    let result = match result {
        Some(r) if r.has_data() => r,
        _ => return Err(ImgConvError::DownloadUnavailable),
    };

    if !result.has_safe_extension() {
        return Err(ImgConvError::InvalidResponse(format!(
            "file_extension {:?} is not a plain extension",
            result.file_extension
        )));
    }

    let decoded = decode_data_url(&result.converted_data)
        .map_err(|e| ImgConvError::InvalidResponse(format!("converted_data: {e}")))?;
    debug!(
        "Decoded {} ({} bytes)",
        decoded.media_type,
        decoded.bytes.len()
    );

    let target = output_dir.join(result.download_name());
    let dir = output_dir.to_path_buf();
    let dest = target.clone();
    tokio::task::spawn_blocking(move || write_atomic(&dir, &dest, &decoded.bytes))
        .await
        .map_err(|e| ImgConvError::Internal(format!("download task panicked: {e}")))??;

    info!("Saved converted image to {}", target.display());
    Ok(target)
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), ImgConvError> {
    let fail = |source: std::io::Error| ImgConvError::OutputWriteFailed {
        path: target.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(fail)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    // `tmp` is deleted on drop if persisting fails.
    tmp.persist(target).map_err(|e| fail(e.error))?;
    Ok(())
}
