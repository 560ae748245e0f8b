//! # imgconv-client
//!
//! Client for an image-format-conversion web service.
//!
//! The service does the actual transcoding; this crate does everything on
//! the user's side of the wire: checks that a picked file is an image type
//! the service accepts, renders a local preview, sends the file and a target
//! format as one `multipart/form-data` POST, interprets the JSON reply, and
//! saves the returned image as `converted_image.<ext>`.
//!
//! ## Session Overview
//!
//! ```text
//! pick file
//!  │
//!  ├─ 1. Intake    allow-list check on the declared media type
//!  ├─ 2. Preview   bytes → data: URL; arms the convert action
//!  ├─ 3. Convert   POST <base>/convert  (image + format)
//!  ├─ 4. Render    size bands, labels, preservation notice
//!  └─ 5. Download  data: URL → converted_image.<ext> (atomic write)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgconv_client::{ClientConfig, Controller, FileCandidate, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .server_url("http://127.0.0.1:5002")
//!         .build()?;
//!     let controller = Controller::new(&config)?;
//!
//!     controller.select_file(&FileCandidate::new("photo.png")).await?;
//!     controller.select_format(TargetFormat::Webp);
//!     let view = controller.convert().await?;
//!     println!("{view}");
//!     let saved = controller.download().await?;
//!     eprintln!("saved to {}", saved.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! imgconv-client = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, MountMode};
pub use convert::{parse_reply, ConversionClient};
pub use error::ImgConvError;
pub use format::{is_supported_media_type, TargetFormat, SUPPORTED_MEDIA_TYPES};
pub use output::{ConversionResult, Preview, SelectedFile};
pub use pipeline::download::download;
pub use pipeline::input::{read_preview, submit, FileCandidate};
pub use pipeline::render::{format_file_size, render, PreservationNotice, ResultView};
pub use progress::{NoopSessionEvents, SessionEvents, SessionEventsHandle};
pub use session::{Controller, Outcome, Session, UiEvent};
