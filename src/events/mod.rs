//! Events module for session activity
//!
//! Provides structured event types for mode changes, conversions,
//! notification visibility and requests for external actions
//! (clipboard, speech, sharing) that the presentation layer performs.

use serde::{Deserialize, Serialize};

use crate::notify::Channel;
use crate::state::Mode;

/// Events emitted by the session and pushed to subscribed clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A different conversion mode was selected
    ModeSelected {
        /// Newly active mode
        mode: Mode,
        /// Mode that was active before
        previous: Mode,
    },

    /// Content was converted
    Converted {
        /// Whether any vowel was found
        had_vowel: bool,
        /// Length of the converted text in characters
        length: usize,
    },

    /// A notification became visible
    NotificationShown {
        /// Channel the message belongs to
        channel: Channel,
        /// Message key to display
        message: String,
    },

    /// A notification was hidden, by timeout or explicitly
    NotificationHidden {
        /// Channel that was hidden
        channel: Channel,
    },

    /// Converted text should be written to the clipboard
    ClipboardWrite { text: String },

    /// Text should be spoken with the given locale
    SpeakRequested { text: String, locale: String },

    /// Text should be offered to the platform share sheet
    ShareRequested { text: String, mime_type: String },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ModeSelected { mode, previous } => {
                write!(f, "MODE_SELECTED ({} -> {})", previous, mode)
            }
            SessionEvent::Converted { had_vowel, length } => {
                write!(f, "CONVERTED ({} chars, had_vowel={})", length, had_vowel)
            }
            SessionEvent::NotificationShown { channel, message } => {
                write!(f, "NOTIFICATION_SHOWN ({}: {})", channel, message)
            }
            SessionEvent::NotificationHidden { channel } => {
                write!(f, "NOTIFICATION_HIDDEN ({})", channel)
            }
            SessionEvent::ClipboardWrite { .. } => write!(f, "CLIPBOARD_WRITE"),
            SessionEvent::SpeakRequested { locale, .. } => {
                write!(f, "SPEAK_REQUESTED ({})", locale)
            }
            SessionEvent::ShareRequested { mime_type, .. } => {
                write!(f, "SHARE_REQUESTED ({})", mime_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::NotificationShown {
            channel: Channel::Error,
            message: "no_vowels_error".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("notification_shown"));
        assert!(json.contains(r#""channel":"error""#));
        assert!(json.contains("no_vowels_error"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"mode_selected","mode":"custom","previous":"qa"}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            SessionEvent::ModeSelected {
                mode: Mode::Custom,
                previous: Mode::Qa,
            }
        );
    }

    #[test]
    fn test_display() {
        let event = SessionEvent::ModeSelected {
            mode: Mode::Za,
            previous: Mode::Qa,
        };
        assert_eq!(event.to_string(), "MODE_SELECTED (QA -> ZA)");
    }
}
