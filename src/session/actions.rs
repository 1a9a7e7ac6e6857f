//! External capabilities the session calls into
//!
//! Clipboard, text-to-speech and sharing belong to the platform. The daemon
//! publishes them as events and the subscribed presentation layer performs
//! the actual OS call.

use tokio::sync::broadcast;
use tracing::debug;

use crate::events::SessionEvent;

/// MIME type used when sharing converted text
pub const SHARE_MIME_TYPE: &str = "text/plain";

/// Errors raised when an external action cannot be dispatched
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("no presentation client is subscribed to perform the action")]
    NoListener,
}

/// Platform capabilities invoked with converted text
pub trait Actions: Send + Sync {
    /// Write text to the clipboard
    fn copy(&self, text: &str) -> Result<(), ActionError>;

    /// Speak text using the given locale tag
    fn speak(&self, text: &str, locale: &str) -> Result<(), ActionError>;

    /// Offer text to the platform share sheet
    fn share(&self, text: &str, mime_type: &str) -> Result<(), ActionError>;
}

/// Dispatches actions as events on the session bus
pub struct BroadcastActions {
    event_tx: broadcast::Sender<SessionEvent>,
}

impl BroadcastActions {
    /// Create actions that publish on `event_tx`
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self { event_tx }
    }

    fn dispatch(&self, event: SessionEvent) -> Result<(), ActionError> {
        debug!(%event, "dispatching action");
        self.event_tx
            .send(event)
            .map(|_| ())
            .map_err(|_| ActionError::NoListener)
    }
}

impl Actions for BroadcastActions {
    fn copy(&self, text: &str) -> Result<(), ActionError> {
        self.dispatch(SessionEvent::ClipboardWrite {
            text: text.to_owned(),
        })
    }

    fn speak(&self, text: &str, locale: &str) -> Result<(), ActionError> {
        self.dispatch(SessionEvent::SpeakRequested {
            text: text.to_owned(),
            locale: locale.to_owned(),
        })
    }

    fn share(&self, text: &str, mime_type: &str) -> Result<(), ActionError> {
        self.dispatch(SessionEvent::ShareRequested {
            text: text.to_owned(),
            mime_type: mime_type.to_owned(),
        })
    }
}
