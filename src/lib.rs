//! Crow Language converter core and daemon services
//!
//! The conversion engine and notification state machine are usable on
//! their own; the remaining modules wire them into the IPC daemon.

/// Configuration management
pub mod config;
/// Vowel-marker conversion and spoken form
pub mod convert;
/// Session events pushed to clients
pub mod events;
/// IPC protocol and server
pub mod ipc;
/// Signal handling
pub mod lifecycle;
/// Error and success notifications
pub mod notify;
/// Application state and user operations
pub mod session;
/// Mode selection state machine
pub mod state;
