//! Callback trait for the user-visible side of a session.
//!
//! The web page toggles a loading overlay, pops banners and alerts, and
//! reveals a results panel. The library keeps those as plain state on
//! [`crate::session::Session`] and additionally reports each change through
//! an [`Arc<dyn SessionEvents>`] so a front end (terminal spinner, GUI,
//! log sink) can mirror them.
//!
//! # Example
//!
//! ```rust
//! use imgconv_client::{ClientConfig, SessionEvents};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct AlertCounter {
//!     alerts: AtomicUsize,
//! }
//!
//! impl SessionEvents for AlertCounter {
//!     fn on_alert(&self, message: &str) {
//!         self.alerts.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("alert: {message}");
//!     }
//! }
//!
//! let counter = Arc::new(AlertCounter { alerts: AtomicUsize::new(0) });
//! let config = ClientConfig::builder()
//!     .events(counter as Arc<dyn SessionEvents>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::render::ResultView;
use std::sync::Arc;

/// Receives UI events from a session.
///
/// All methods default to no-ops so implementors override only what they
/// display.
pub trait SessionEvents: Send + Sync {
    /// The blocking overlay was shown (`true`) or removed (`false`).
    ///
    /// Every `true` is followed by exactly one `false`, whatever the outcome
    /// of the request.
    fn on_overlay(&self, visible: bool) {
        let _ = visible;
    }

    /// A transient, non-blocking message (intake rejection).
    fn on_banner(&self, message: &str) {
        let _ = message;
    }

    /// A blocking error message.
    fn on_alert(&self, message: &str) {
        let _ = message;
    }

    /// A preview was rendered for the file called `name`.
    fn on_preview(&self, name: &str, data_url_len: usize) {
        let _ = (name, data_url_len);
    }

    /// The results panel was revealed with `view`.
    fn on_results(&self, view: &ResultView) {
        let _ = view;
    }
}

/// A no-op sink, used when no callback is configured.
pub struct NoopSessionEvents;

impl SessionEvents for NoopSessionEvents {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type SessionEventsHandle = Arc<dyn SessionEvents>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tracking {
        shown: AtomicUsize,
        hidden: AtomicUsize,
        banners: AtomicUsize,
    }

    impl SessionEvents for Tracking {
        fn on_overlay(&self, visible: bool) {
            if visible {
                self.shown.fetch_add(1, Ordering::SeqCst);
            } else {
                self.hidden.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn on_banner(&self, _message: &str) {
            self.banners.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_events_do_not_panic() {
        let ev: SessionEventsHandle = Arc::new(NoopSessionEvents);
        ev.on_overlay(true);
        ev.on_overlay(false);
        ev.on_banner("unsupported");
        ev.on_alert("failed");
        ev.on_preview("a.png", 64);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let t = Tracking::default();
        t.on_overlay(true);
        t.on_overlay(false);
        t.on_banner("x");
        t.on_alert("ignored by default impl");
        assert_eq!(t.shown.load(Ordering::SeqCst), 1);
        assert_eq!(t.hidden.load(Ordering::SeqCst), 1);
        assert_eq!(t.banners.load(Ordering::SeqCst), 1);
    }
}
