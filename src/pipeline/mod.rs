//! Stages of a conversion session.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ (POST /convert) ──▶ render ──▶ download
//! (intake)  (preview)   crate::convert     (labels)   (save)
//! ```
//!
//! 1. [`input`]   : validate the declared media type and build a [`crate::output::SelectedFile`]
//! 2. [`encode`]  : data URL encode (previews) and decode (server replies)
//! 3. [`render`]  : size bands, labels, preservation notice; no I/O
//! 4. [`download`]: atomic save of the converted bytes
//!
//! The network exchange itself lives in [`crate::convert`]; orchestration and
//! UI state live in [`crate::session`].

pub mod download;
pub mod encode;
pub mod input;
pub mod render;
