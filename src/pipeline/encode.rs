//! Data URLs: `bytes ↔ data:<media-type>;base64,<payload>`.
//!
//! Previews are built here, and the converted image the server returns is
//! decoded here before it is saved. Only the base64 form is ever produced;
//! the percent-encoded form is accepted on decode because it is legal and
//! cheap to support.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type from the header; `text/plain` when omitted (RFC 2397).
    pub media_type: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

static RE_DATA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^data:([^,;]*)((?:;[^,;]*)*),(.*)$").unwrap());

/// Encode `bytes` as a base64 data URL of type `media_type`.
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());
    format!("data:{media_type};base64,{b64}")
}

/// Parse and decode a data URL.
///
/// Returns a description of the problem when `input` is not a data URL or
/// its payload does not decode.
pub fn decode_data_url(input: &str) -> Result<DataUrl, String> {
    let caps = RE_DATA_URL
        .captures(input.trim())
        .ok_or_else(|| "not a data: URL".to_string())?;

    let media_type = match caps[1].trim() {
        "" => "text/plain".to_string(),
        mt => mt.to_ascii_lowercase(),
    };
    let is_base64 = caps[2]
        .split(';')
        .any(|p| p.trim().eq_ignore_ascii_case("base64"));
    let payload = &caps[3];

    let bytes = if is_base64 {
        // Servers sometimes wrap long base64 lines.
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| format!("invalid base64 payload: {e}"))?
    } else {
        percent_decode(payload)?
    };

    Ok(DataUrl { media_type, bytes })
}

fn percent_decode(s: &str) -> Result<Vec<u8>, String> {
    let raw = s.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = raw
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| format!("bad percent escape at offset {i}"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_png_header() {
        let url = encode_data_url("image/png", &[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn decode_base64_payload() {
        let d = decode_data_url("data:image/webp;base64,UklGRg==").unwrap();
        assert_eq!(d.media_type, "image/webp");
        assert_eq!(d.bytes, b"RIFF");
    }

    #[test]
    fn decode_tolerates_wrapped_lines() {
        let d = decode_data_url("data:image/png;base64,iVBO\nRw==").unwrap();
        assert_eq!(d.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn decode_percent_payload_and_default_type() {
        let d = decode_data_url("data:,a%20b").unwrap();
        assert_eq!(d.media_type, "text/plain");
        assert_eq!(d.bytes, b"a b");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_data_url("https://example.com/x.png").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert!(decode_data_url("data:,%zz").is_err());
    }
}
