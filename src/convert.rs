//! The `/convert` round-trip.
//!
//! One request per call: a `multipart/form-data` body with an `image` part
//! and a `format` field, answered by a JSON object. There is no retry; every
//! failure is returned to the caller as-is.
//!
//! ## Failure classes
//!
//! | Situation | Error |
//! |-----------|-------|
//! | no HTTP response at all | [`ImgConvError::RequestFailed`] |
//! | non-2xx status | [`ImgConvError::NetworkFailure`] |
//! | 2xx, body not a JSON object | [`ImgConvError::InvalidResponse`] |
//! | 2xx, body has a non-empty `error` | [`ImgConvError::LogicalFailure`] |

use crate::config::ClientConfig;
use crate::error::ImgConvError;
use crate::format::TargetFormat;
use crate::output::{ConversionReply, ConversionResult, SelectedFile};
use crate::pipeline::input;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP client bound to one conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    convert_url: String,
    timeout_secs: Option<u64>,
}

impl ConversionClient {
    /// Build a client for the endpoint `config` resolves to.
    pub fn new(config: &ClientConfig) -> Result<Self, ImgConvError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ImgConvError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let convert_url = config.convert_url();
        debug!(
            "Using endpoint: {} ({:?}, page path {})",
            convert_url,
            config.mount_mode(),
            config.page_path
        );

        Ok(Self {
            http,
            convert_url,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn convert_url(&self) -> &str {
        &self.convert_url
    }

    /// Upload `file` and ask for it in `format`.
    pub async fn convert(
        &self,
        file: &SelectedFile,
        format: TargetFormat,
    ) -> Result<ConversionResult, ImgConvError> {
        info!(
            "File to convert: {} type: {} size: {}",
            file.name, file.media_type, file.size
        );
        let bytes = input::read_bytes(file).await?;
        self.convert_bytes(&file.name, &file.media_type, bytes, format)
            .await
    }

    /// Upload in-memory image bytes and ask for them in `format`.
    pub async fn convert_bytes(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
        format: TargetFormat,
    ) -> Result<ConversionResult, ImgConvError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)
            .map_err(|e| {
                ImgConvError::InvalidConfig(format!("media type '{media_type}': {e}"))
            })?;
        let form = Form::new()
            .part("image", part)
            .text("format", format.as_str());

        info!("Sending conversion request to: {} (format {})", self.convert_url, format);
        let start = Instant::now();

        let response = self
            .http
            .post(&self.convert_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = response.status();
        debug!("Server response status: {}", status.as_u16());

        let body = response.bytes().await.map_err(|e| self.request_failed(e))?;

        if !status.is_success() {
            if let Ok(reply) = serde_json::from_slice::<ConversionReply>(&body) {
                if let Some(err) = reply.error {
                    warn!("Server error body: {}", err);
                }
            }
            return Err(ImgConvError::NetworkFailure {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let result = parse_reply(&body)?;
        info!(
            "Conversion successful in {}ms: {} → {}",
            start.elapsed().as_millis(),
            result.original_format,
            result.converted_format
        );
        Ok(result)
    }

    fn request_failed(&self, e: reqwest::Error) -> ImgConvError {
        let reason = match (e.is_timeout(), self.timeout_secs) {
            (true, Some(secs)) => format!("timed out after {secs}s"),
            _ => e.to_string(),
        };
        ImgConvError::RequestFailed {
            url: self.convert_url.clone(),
            reason,
        }
    }
}

/// Interpret a 2xx response body.
///
/// An `error` field wins over everything else, even with a success status.
pub fn parse_reply(body: &[u8]) -> Result<ConversionResult, ImgConvError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ImgConvError::InvalidResponse(format!("body is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(ImgConvError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    }
    let reply: ConversionReply = serde_json::from_value(value)
        .map_err(|e| ImgConvError::InvalidResponse(e.to_string()))?;

    if let Some(message) = reply.error.clone().filter(|m| !m.is_empty()) {
        warn!("Conversion rejected by server: {}", message);
        return Err(ImgConvError::LogicalFailure { message });
    }

    Ok(reply.into_result())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_logical_failure() {
        let err = parse_reply(br#"{"error": "bad format"}"#).unwrap_err();
        match err {
            ImgConvError::LogicalFailure { message } => assert_eq!(message, "bad format"),
            other => panic!("expected LogicalFailure, got {other:?}"),
        }
    }

    #[test]
    fn error_field_wins_over_data() {
        let body = br#"{"error": "cannot identify image file", "converted_data": "data:image/png;base64,AA=="}"#;
        assert!(matches!(
            parse_reply(body),
            Err(ImgConvError::LogicalFailure { .. })
        ));
    }

    #[test]
    fn empty_error_field_is_ignored() {
        let r = parse_reply(br#"{"error": "", "converted_data": "data:image/png;base64,AA=="}"#)
            .unwrap();
        assert!(r.has_data());
    }

    #[test]
    fn non_object_body_is_invalid() {
        assert!(matches!(
            parse_reply(b"<html>oops</html>"),
            Err(ImgConvError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_reply(b"[]"),
            Err(ImgConvError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_reply(br#"{"original_size": "big"}"#),
            Err(ImgConvError::InvalidResponse(_))
        ));
    }

    #[test]
    fn client_targets_configured_endpoint() {
        let config = ClientConfig::builder()
            .server_url("http://localhost:9")
            .page_path("/host/page")
            .build()
            .unwrap();
        let client = ConversionClient::new(&config).unwrap();
        assert_eq!(
            client.convert_url(),
            "http://localhost:9/image-conversion-app/convert"
        );
    }
}
