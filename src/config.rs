//! Configuration types for the conversion client.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. Endpoint layout is derived from the page
//! path the app is served at (see [`MountMode`]), exactly as the web page
//! decides between its standalone and embedded routes.

use crate::error::ImgConvError;
use crate::format::TargetFormat;
use crate::progress::SessionEventsHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Path prefix under which the app is mounted inside a host application.
pub const APP_PREFIX: &str = "/image-conversion-app";

/// Configuration for a conversion client / session.
///
/// # Example
/// ```rust
/// use imgconv_client::{ClientConfig, TargetFormat};
///
/// let config = ClientConfig::builder()
///     .server_url("http://localhost:5002")
///     .page_path("/tools/")
///     .default_format(TargetFormat::Webp)
///     .build()
///     .unwrap();
/// assert_eq!(config.convert_url(), "http://localhost:5002/image-conversion-app/convert");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme + authority of the conversion server. Default: `http://127.0.0.1:5002`.
    pub server_url: String,

    /// Path the app page is served at. Default: `/` (standalone).
    ///
    /// `/` and `/image-conversion-app/` select the standalone routes; any
    /// other path selects the routes mounted under [`APP_PREFIX`].
    pub page_path: String,

    /// Per-request timeout in seconds. Default: none.
    ///
    /// The page never times a conversion out; a request runs until the
    /// server or the network gives up. Set this for unattended use.
    pub timeout_secs: Option<u64>,

    /// Directory the converted image is saved into. Default: `.`.
    pub output_dir: PathBuf,

    /// Target format preselected when none is chosen. Default: PNG.
    pub default_format: TargetFormat,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// UI event sink. Default: none (events are only logged).
    pub events: Option<SessionEventsHandle>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5002".to_string(),
            page_path: "/".to_string(),
            timeout_secs: None,
            output_dir: PathBuf::from("."),
            default_format: TargetFormat::default(),
            user_agent: concat!("imgconv-client/", env!("CARGO_PKG_VERSION")).to_string(),
            events: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("page_path", &self.page_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("default_format", &self.default_format)
            .field("user_agent", &self.user_agent)
            .field("events", &self.events.as_ref().map(|_| "<dyn SessionEvents>"))
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Route layout selected by [`ClientConfig::page_path`].
    pub fn mount_mode(&self) -> MountMode {
        MountMode::from_page_path(&self.page_path)
    }

    /// Absolute URL of the conversion endpoint.
    pub fn convert_url(&self) -> String {
        self.absolute(&self.mount_mode().convert_path())
    }

    /// Absolute URL of the download-by-filename endpoint.
    pub fn download_url(&self, filename: &str) -> String {
        self.absolute(&self.mount_mode().download_path(filename))
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn page_path(mut self, path: impl Into<String>) -> Self {
        self.config.page_path = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs.max(1));
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn default_format(mut self, format: TargetFormat) -> Self {
        self.config.default_format = format;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn events(mut self, events: SessionEventsHandle) -> Self {
        self.config.events = Some(events);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ImgConvError> {
        let c = &self.config;
        if !(c.server_url.starts_with("http://") || c.server_url.starts_with("https://")) {
            return Err(ImgConvError::InvalidConfig(format!(
                "server URL must start with http:// or https://, got '{}'",
                c.server_url
            )));
        }
        if !c.page_path.starts_with('/') {
            return Err(ImgConvError::InvalidConfig(format!(
                "page path must start with '/', got '{}'",
                c.page_path
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(ImgConvError::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which set of server routes the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MountMode {
    /// The app owns the server root: `/convert`, `/download/<f>`. (default)
    #[default]
    Standalone,
    /// The app is embedded in a host: `/image-conversion-app/convert`, …
    Mounted,
}

impl MountMode {
    /// Decide the route layout from the path the page is served at.
    pub fn from_page_path(page_path: &str) -> Self {
        if page_path == "/" || page_path == format!("{APP_PREFIX}/") {
            MountMode::Standalone
        } else {
            MountMode::Mounted
        }
    }

    pub fn convert_path(&self) -> String {
        match self {
            MountMode::Standalone => "/convert".to_string(),
            MountMode::Mounted => format!("{APP_PREFIX}/convert"),
        }
    }

    pub fn download_path(&self, filename: &str) -> String {
        match self {
            MountMode::Standalone => format!("/download/{filename}"),
            MountMode::Mounted => format!("{APP_PREFIX}/download/{filename}"),
        }
    }

    /// Location of a static asset (stylesheet, script, icon).
    pub fn resource_path(&self, path: &str) -> String {
        match self {
            MountMode::Standalone => path.to_string(),
            MountMode::Mounted => format!("/static{APP_PREFIX}/{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_app_page_are_standalone() {
        assert_eq!(MountMode::from_page_path("/"), MountMode::Standalone);
        assert_eq!(
            MountMode::from_page_path("/image-conversion-app/"),
            MountMode::Standalone
        );
        assert_eq!(MountMode::from_page_path("/apps/"), MountMode::Mounted);
        assert_eq!(
            MountMode::from_page_path("/image-conversion-app"),
            MountMode::Mounted
        );
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(MountMode::Standalone.convert_path(), "/convert");
        assert_eq!(
            MountMode::Mounted.convert_path(),
            "/image-conversion-app/convert"
        );
        assert_eq!(
            MountMode::Standalone.download_path("a.png"),
            "/download/a.png"
        );
        assert_eq!(
            MountMode::Mounted.download_path("a.png"),
            "/image-conversion-app/download/a.png"
        );
        assert_eq!(MountMode::Standalone.resource_path("js/app.js"), "js/app.js");
        assert_eq!(
            MountMode::Mounted.resource_path("js/app.js"),
            "/static/image-conversion-app/js/app.js"
        );
    }

    #[test]
    fn urls_join_without_double_slash() {
        let config = ClientConfig::builder()
            .server_url("http://example.test:8080/")
            .build()
            .unwrap();
        assert_eq!(config.convert_url(), "http://example.test:8080/convert");
        assert_eq!(
            config.download_url("converted.webp"),
            "http://example.test:8080/download/converted.webp"
        );
    }

    #[test]
    fn build_rejects_bad_values() {
        assert!(ClientConfig::builder().server_url("ftp://x").build().is_err());
        assert!(ClientConfig::builder().page_path("relative").build().is_err());
        assert!(ClientConfig::builder().output_dir("").build().is_err());
    }

    #[test]
    fn timeout_is_clamped_to_one_second() {
        let config = ClientConfig::builder().timeout_secs(0).build().unwrap();
        assert_eq!(config.timeout_secs, Some(1));
        assert_eq!(ClientConfig::default().timeout_secs, None);
    }
}
