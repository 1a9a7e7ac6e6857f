//! Session state and user-triggered operations

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::convert::{convert, to_speech_form, ConversionResult};
use crate::events::SessionEvent;
use crate::notify::{Channel, NotificationState, Notifier};
use crate::state::{Mode, ModeSelector};

use super::actions::{ActionError, Actions, SHARE_MIME_TYPE};

/// Message keys resolved to display strings by the presentation layer
pub mod messages {
    /// Conversion requested with blank content
    pub const EMPTY_CONTENT: &str = "empty_content_error";
    /// Conversion produced no vowel markers
    pub const NO_VOWELS: &str = "no_vowels_error";
    /// Copy, speak or share attempted before any conversion
    pub const NO_CONVERTED_TEXT: &str = "no_converted_text_error";
    /// Converted text written to the clipboard
    pub const COPY_SUCCESS: &str = "copy_success_message";
}

/// Errors returned by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("content is blank")]
    EmptyContent,

    #[error("nothing has been converted yet")]
    NoConvertedText,

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl SessionError {
    /// Stable code reported over IPC
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::EmptyContent => "empty_content",
            SessionError::NoConvertedText => "no_converted_text",
            SessionError::Action(ActionError::NoListener) => "no_listener",
        }
    }
}

/// Snapshot of one notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStatus {
    pub active: bool,
    pub visible: bool,
    pub message: Option<String>,
}

impl From<&NotificationState> for NotificationStatus {
    fn from(state: &NotificationState) -> Self {
        Self {
            active: state.is_active(),
            visible: state.is_visible(),
            message: state.message(),
        }
    }
}

/// Full session snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub mode: Mode,
    pub custom_input_visible: bool,
    pub content: String,
    pub custom_marker: String,
    pub converted_text: String,
    pub error: NotificationStatus,
    pub success: NotificationStatus,
}

/// Application state owned by the daemon
pub struct Session {
    content: String,
    custom_marker: String,
    converted: String,
    selector: ModeSelector,
    notifier: Notifier,
    speech_locale: String,
    actions: Box<dyn Actions>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create an empty session in `Qa` mode
    pub fn new(
        notify_duration: Duration,
        speech_locale: impl Into<String>,
        event_tx: broadcast::Sender<SessionEvent>,
        actions: Box<dyn Actions>,
    ) -> Self {
        Self {
            content: String::new(),
            custom_marker: String::new(),
            converted: String::new(),
            selector: ModeSelector::new(event_tx.clone()),
            notifier: Notifier::new(notify_duration, event_tx.clone()),
            speech_locale: speech_locale.into(),
            actions,
            event_tx,
        }
    }

    /// Replace the content to convert
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.content = text.into();
    }

    /// Replace the marker used in custom mode
    pub fn set_custom_marker(&mut self, marker: impl Into<String>) {
        self.custom_marker = marker.into();
    }

    /// Select a conversion mode, returning true if it changed
    pub fn select_mode(&mut self, mode: Mode) -> bool {
        self.selector.select(mode)
    }

    /// Get the current mode
    pub fn mode(&self) -> Mode {
        self.selector.mode()
    }

    /// Last converted text, empty until a conversion succeeds
    pub fn converted_text(&self) -> &str {
        &self.converted
    }

    /// Both notification channels
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Hide a notification channel immediately
    pub fn hide_notification(&self, channel: Channel) {
        self.notifier.channel(channel).hide();
    }

    /// Convert the current content with the active mode
    ///
    /// A result without vowels is still stored; the error channel warns
    /// the user that nothing was marked.
    pub fn generate(&mut self) -> Result<ConversionResult, SessionError> {
        if self.content.trim().is_empty() {
            self.converted.clear();
            self.notifier.error.show(messages::EMPTY_CONTENT);
            return Err(SessionError::EmptyContent);
        }

        let mode = self.selector.mode();
        let result = convert(&self.content, mode, Some(&self.custom_marker));
        let length = result.text.chars().count();

        info!(
            %mode,
            had_vowel = result.had_vowel,
            length,
            "content converted"
        );

        if !result.had_vowel {
            self.notifier.error.show(messages::NO_VOWELS);
        }
        self.converted.clone_from(&result.text);

        let _ = self.event_tx.send(SessionEvent::Converted {
            had_vowel: result.had_vowel,
            length,
        });
        Ok(result)
    }

    /// Copy the converted text to the clipboard
    pub fn copy(&self) -> Result<(), SessionError> {
        let text = self.require_converted()?;
        self.actions.copy(text).inspect_err(|e| {
            warn!(?e, "clipboard write failed");
        })?;
        self.notifier.success.show(messages::COPY_SUCCESS);
        Ok(())
    }

    /// Speak the converted text in its spoken form
    pub fn speak(&self) -> Result<(), SessionError> {
        let text = to_speech_form(self.require_converted()?);
        self.actions
            .speak(&text, &self.speech_locale)
            .inspect_err(|e| {
                warn!(?e, "speech request failed");
            })?;
        Ok(())
    }

    /// Share the converted text as plain text
    pub fn share(&self) -> Result<(), SessionError> {
        let text = self.require_converted()?;
        self.actions
            .share(text, SHARE_MIME_TYPE)
            .inspect_err(|e| {
                warn!(?e, "share request failed");
            })?;
        Ok(())
    }

    /// Snapshot of the session for status queries
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.selector.mode(),
            custom_input_visible: self.selector.custom_input_visible(),
            content: self.content.clone(),
            custom_marker: self.custom_marker.clone(),
            converted_text: self.converted.clone(),
            error: (&self.notifier.error).into(),
            success: (&self.notifier.success).into(),
        }
    }

    /// Guard for actions that need converted text
    fn require_converted(&self) -> Result<&str, SessionError> {
        if self.converted.trim().is_empty() {
            self.notifier.error.show(messages::NO_CONVERTED_TEXT);
            return Err(SessionError::NoConvertedText);
        }
        Ok(&self.converted)
    }
}
