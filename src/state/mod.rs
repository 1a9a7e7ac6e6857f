//! Mode selection state machine
//!
//! Provides an explicit state machine with three mutually exclusive modes:
//! - Qa: vowels are marked with "q" (default)
//! - Za: vowels are marked with "z"
//! - Custom: vowels are marked with a user-supplied string

mod machine;

pub use machine::{Mode, ModeSelector};
