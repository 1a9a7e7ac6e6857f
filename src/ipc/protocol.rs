//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;
use crate::notify::Channel;
use crate::session::{SessionError, SessionStatus};
use crate::state::Mode;

/// Requests from UI to daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request a snapshot of the session
    GetStatus,

    /// Subscribe to session event notifications
    Subscribe,

    /// Select the conversion mode
    SelectMode { mode: Mode },

    /// Replace the content to convert
    SetContent { text: String },

    /// Replace the custom marker used in custom mode
    SetCustomMarker { marker: String },

    /// Convert the session content with the active mode
    Generate,

    /// Convert arbitrary text without touching the session
    Convert {
        text: String,
        mode: Mode,
        #[serde(default)]
        custom_marker: Option<String>,
    },

    /// Spoken form of arbitrary converted text
    SpeechForm { text: String },

    /// Copy the converted text to the clipboard
    Copy,

    /// Speak the converted text
    Speak,

    /// Share the converted text
    Share,

    /// Hide a notification channel immediately
    HideNotification { channel: Channel },
}

/// Responses from daemon to UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Current session status
    Status(DaemonStatus),

    /// Mode selection result
    ModeChanged { mode: Mode, changed: bool },

    /// Conversion result
    Converted { text: String, had_vowel: bool },

    /// Spoken form of the requested text
    SpeechForm { text: String },

    /// Request accepted
    Ack,

    /// Error response
    Error { code: String, message: String },
}

impl From<SessionError> for Response {
    fn from(err: SessionError) -> Self {
        Response::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Push notification from daemon to UI (for subscribed clients)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Session event occurred
    Event { event: SessionEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Uptime in seconds
    pub uptime_secs: u64,

    /// Session state
    pub session: SessionStatus,
}

impl DaemonStatus {
    /// Snapshot stamped with the daemon version
    pub fn new(session: SessionStatus, uptime_secs: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
            session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SelectMode { mode: Mode::Za };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("select_mode"));
        assert!(json.contains(r#""za""#));
    }

    #[test]
    fn test_convert_request_without_marker() {
        let json = r#"{"type":"convert","text":"ana","mode":"qa"}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            Request::Convert {
                text: "ana".to_string(),
                mode: Mode::Qa,
                custom_marker: None,
            }
        );
    }

    #[test]
    fn test_error_response_from_session_error() {
        let resp = Response::from(SessionError::NoConvertedText);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("no_converted_text"));
    }

    #[test]
    fn test_notification_serialization() {
        let note = Notification::Event {
            event: SessionEvent::NotificationHidden {
                channel: Channel::Success,
            },
        };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains(r#""type":"event""#));
        assert!(json.contains("notification_hidden"));
    }
}
