//! Session module holding the application state
//!
//! Replaces the UI's reactive globals with one explicit struct that owns
//! the content, the selected mode, the last conversion and both
//! notification channels.

mod actions;
mod app;

pub use actions::{ActionError, Actions, BroadcastActions, SHARE_MIME_TYPE};
pub use app::{messages, NotificationStatus, Session, SessionError, SessionStatus};
