//! Transient user-facing notifications
//!
//! Two independent channels (error and success) each hold a message and a
//! visibility flag that clears itself after a fixed display duration.

mod state;

pub use state::{Channel, NotificationState, Notifier, DEFAULT_DISPLAY_DURATION};
