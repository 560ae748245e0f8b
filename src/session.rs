//! Session state and the controller that owns it.
//!
//! A [`Session`] is everything the page keeps between clicks: the selected
//! file, its preview, the last result, and the enable/visible flags of the
//! convert button, download button, results panel and loading overlay.
//! The [`Controller`] is the only writer. Front ends feed it [`UiEvent`]s
//! through [`Controller::dispatch`] and read state back with
//! [`Controller::snapshot`].
//!
//! ## One conversion at a time
//!
//! The convert action is disabled for as long as a request is outstanding;
//! a second [`Controller::convert`] in that window fails with
//! [`ImgConvError::ConversionInProgress`] instead of racing the first. The
//! lock around the state is never held across an `.await`.

use crate::config::ClientConfig;
use crate::convert::ConversionClient;
use crate::error::ImgConvError;
use crate::format::TargetFormat;
use crate::output::{ConversionResult, Preview, SelectedFile};
use crate::pipeline::input::{self, FileCandidate};
use crate::pipeline::download;
use crate::pipeline::render::{self, ResultView};
use crate::progress::{NoopSessionEvents, SessionEventsHandle};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

/// Client-side state of one conversion page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_file: Option<SelectedFile>,
    pub preview: Option<Preview>,
    pub target_format: TargetFormat,
    pub result: Option<ConversionResult>,
    pub view: Option<ResultView>,
    pub convert_enabled: bool,
    pub download_enabled: bool,
    pub results_visible: bool,
    pub overlay_visible: bool,
    pub in_flight: bool,
    /// Bumped by every clear so a late reply cannot resurrect cleared state.
    generation: u64,
}

impl Session {
    /// An empty session with `format` preselected.
    pub fn new(format: TargetFormat) -> Self {
        Self {
            target_format: format,
            ..Self::default()
        }
    }

    /// Whether nothing is selected, shown or armed.
    pub fn is_cleared(&self) -> bool {
        self.current_file.is_none()
            && self.preview.is_none()
            && self.result.is_none()
            && self.view.is_none()
            && !self.convert_enabled
            && !self.download_enabled
            && !self.results_visible
    }

    fn clear(&mut self) {
        self.current_file = None;
        self.preview = None;
        self.result = None;
        self.view = None;
        self.convert_enabled = false;
        self.download_enabled = false;
        self.results_visible = false;
        self.generation += 1;
    }
}

/// A user action, as the page's event listeners would see it.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A file was dropped or picked.
    FileChosen(FileCandidate),
    /// The format picker changed.
    FormatSelected(TargetFormat),
    ConvertClicked,
    DownloadClicked,
    ClearClicked,
}

/// What a dispatched event produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(SelectedFile),
    FormatInfo { title: String, description: String },
    Converted(ResultView),
    Downloaded(PathBuf),
    Cleared,
}

/// Owns a [`Session`] and drives the pipeline stages against it.
pub struct Controller {
    state: Mutex<Session>,
    client: ConversionClient,
    output_dir: PathBuf,
    events: SessionEventsHandle,
}

impl Controller {
    pub fn new(config: &ClientConfig) -> Result<Self, ImgConvError> {
        Ok(Self {
            state: Mutex::new(Session::new(config.default_format)),
            client: ConversionClient::new(config)?,
            output_dir: config.output_dir.clone(),
            events: config
                .events
                .clone()
                .unwrap_or_else(|| Arc::new(NoopSessionEvents) as SessionEventsHandle),
        })
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Session {
        self.state().clone()
    }

    /// Route a UI event to the matching action.
    pub async fn dispatch(&self, event: UiEvent) -> Result<Outcome, ImgConvError> {
        match event {
            UiEvent::FileChosen(candidate) => {
                self.select_file(&candidate).await.map(Outcome::Accepted)
            }
            UiEvent::FormatSelected(format) => {
                self.select_format(format);
                Ok(Outcome::FormatInfo {
                    title: format.title(),
                    description: format.description().to_string(),
                })
            }
            UiEvent::ConvertClicked => self.convert().await.map(Outcome::Converted),
            UiEvent::DownloadClicked => self.download().await.map(Outcome::Downloaded),
            UiEvent::ClearClicked => {
                self.clear();
                Ok(Outcome::Cleared)
            }
        }
    }

    /// Validate `candidate`, render its preview and make it the current file.
    ///
    /// Nothing changes unless both steps succeed; the convert action is
    /// enabled only after the preview exists.
    pub async fn select_file(
        &self,
        candidate: &FileCandidate,
    ) -> Result<SelectedFile, ImgConvError> {
        match input::submit(candidate) {
            Ok(file) => self.adopt(file).await,
            Err(e) => Err(self.report(e)),
        }
    }

    /// Preview an accepted file and make it current.
    async fn adopt(&self, file: SelectedFile) -> Result<SelectedFile, ImgConvError> {
        let preview = match input::read_preview(&file).await {
            Ok(p) => p,
            Err(e) => return Err(self.report(e)),
        };

        let preview_len = preview.data_url.len();
        {
            let mut s = self.state();
            s.current_file = Some(file.clone());
            s.preview = Some(preview);
            s.convert_enabled = !s.in_flight;
        }
        self.events.on_preview(&file.name, preview_len);
        Ok(file)
    }

    pub fn select_format(&self, format: TargetFormat) {
        self.state().target_format = format;
    }

    /// Send the current file for conversion in the selected format.
    pub async fn convert(&self) -> Result<ResultView, ImgConvError> {
        let (file, format, generation) = {
            let mut s = self.state();
            if s.in_flight {
                drop(s);
                return Err(self.report(ImgConvError::ConversionInProgress));
            }
            let Some(file) = s.current_file.clone() else {
                drop(s);
                return Err(self.report(ImgConvError::NoFileSelected));
            };
            s.in_flight = true;
            s.overlay_visible = true;
            s.convert_enabled = false;
            (file, s.target_format, s.generation)
        };
        info!("Target format: {}", format);

        let guard = InFlight::begin(self);
        let outcome = self.client.convert(&file, format).await;
        drop(guard);

        let result = match outcome {
            Ok(r) => r,
            Err(e) => return Err(self.report(e)),
        };

        let view = render::render(&result);
        {
            let mut s = self.state();
            if s.generation != generation {
                info!("Session cleared while converting; discarding result");
                return Ok(view);
            }
            s.result = Some(result);
            s.view = Some(view.clone());
            s.download_enabled = true;
            s.results_visible = true;
        }
        self.events.on_results(&view);
        Ok(view)
    }

    /// Save the current result into the output directory.
    pub async fn download(&self) -> Result<PathBuf, ImgConvError> {
        let result = self.state().result.clone();
        download::download(result.as_ref(), &self.output_dir)
            .await
            .map_err(|e| self.report(e))
    }

    /// Return to the initial empty state. The selected format is kept.
    pub fn clear(&self) {
        self.state().clear();
        info!("Selection cleared");
    }

    /// Log `e`, surface it to the user and hand it back.
    fn report(&self, e: ImgConvError) -> ImgConvError {
        if e.is_transient() {
            warn!("{}", e);
            self.events.on_banner(&e.to_string());
        } else {
            let text = alert_text(&e);
            error!("{}", text);
            self.events.on_alert(&text);
        }
        e
    }

    fn state(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn alert_text(e: &ImgConvError) -> String {
    match e {
        ImgConvError::NetworkFailure { .. }
        | ImgConvError::LogicalFailure { .. }
        | ImgConvError::RequestFailed { .. }
        | ImgConvError::InvalidResponse(_) => format!("Error converting image: {e}"),
        ImgConvError::OutputWriteFailed { .. } => format!("Error downloading image: {e}"),
        _ => e.to_string(),
    }
}

/// Marks a request as outstanding; dropping it lifts the overlay and
/// re-arms the convert action, on success, failure or cancellation alike.
struct InFlight<'a> {
    controller: &'a Controller,
}

impl<'a> InFlight<'a> {
    fn begin(controller: &'a Controller) -> Self {
        controller.events.on_overlay(true);
        Self { controller }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        {
            let mut s = self.controller.state();
            s.in_flight = false;
            s.overlay_visible = false;
            s.convert_enabled = s.preview.is_some();
        }
        self.controller.events.on_overlay(false);
    }
}
