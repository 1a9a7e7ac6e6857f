//! Core mode selector implementation
//!
//! Radio-button semantics: selecting a mode deselects the other two, so
//! exactly one mode is active after any transition.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::SessionEvent;

/// Marker used when no custom marker is available
const DEFAULT_MARKER: &str = "q";

/// The three conversion modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Vowels marked with "q"
    #[default]
    Qa,
    /// Vowels marked with "z"
    Za,
    /// Vowels marked with a user-supplied string
    Custom,
}

impl Mode {
    /// Marker string inserted between the two copies of each vowel
    pub fn marker<'a>(self, custom: Option<&'a str>) -> &'a str {
        match self {
            Mode::Qa => "q",
            Mode::Za => "z",
            Mode::Custom => match custom {
                Some(marker) if !marker.is_empty() => marker,
                _ => DEFAULT_MARKER,
            },
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Qa => write!(f, "QA"),
            Mode::Za => write!(f, "ZA"),
            Mode::Custom => write!(f, "CUSTOM"),
        }
    }
}

/// The state machine that tracks the selected mode
pub struct ModeSelector {
    /// Currently selected mode
    mode: Mode,
    /// Time when the current mode was selected
    entered_at: Instant,
    /// Channel for emitting session events
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ModeSelector {
    /// Create a new selector in the initial `Qa` mode
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            mode: Mode::Qa,
            entered_at: Instant::now(),
            event_tx,
        }
    }

    /// Get the current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether `mode` is the active one
    pub fn is_selected(&self, mode: Mode) -> bool {
        self.mode == mode
    }

    /// Whether the custom marker input should be shown
    pub fn custom_input_visible(&self) -> bool {
        self.mode == Mode::Custom
    }

    /// Select a mode, returning true if the state changed
    pub fn select(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            debug!(%mode, "mode already selected");
            return false;
        }
        self.transition_to(mode);
        true
    }

    /// Perform a state transition
    fn transition_to(&mut self, new_mode: Mode) {
        let previous = self.mode;
        let duration_ms = self.entered_at.elapsed().as_millis() as u64;

        info!(
            from = %previous,
            to = %new_mode,
            duration_ms = duration_ms,
            "mode transition"
        );

        self.mode = new_mode;
        self.entered_at = Instant::now();

        let event = SessionEvent::ModeSelected {
            mode: new_mode,
            previous,
        };
        debug!(?event, "emitting mode event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [Mode; 3] = [Mode::Qa, Mode::Za, Mode::Custom];

    fn create_selector() -> (ModeSelector, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (ModeSelector::new(tx), rx)
    }

    fn active_count(selector: &ModeSelector) -> usize {
        MODES.iter().filter(|m| selector.is_selected(**m)).count()
    }

    #[test]
    fn test_initial_mode() {
        let (selector, _) = create_selector();
        assert_eq!(selector.mode(), Mode::Qa);
        assert!(!selector.custom_input_visible());
    }

    #[test]
    fn test_markers() {
        assert_eq!(Mode::Qa.marker(Some("x")), "q");
        assert_eq!(Mode::Za.marker(None), "z");
        assert_eq!(Mode::Custom.marker(Some("zx")), "zx");
        assert_eq!(Mode::Custom.marker(Some("")), "q");
        assert_eq!(Mode::Custom.marker(None), "q");
    }

    #[test]
    fn test_exactly_one_active() {
        let (mut selector, _) = create_selector();
        let sequence = [
            Mode::Za,
            Mode::Custom,
            Mode::Custom,
            Mode::Qa,
            Mode::Za,
            Mode::Qa,
            Mode::Custom,
        ];

        for mode in sequence {
            selector.select(mode);
            assert_eq!(active_count(&selector), 1);
            assert!(selector.is_selected(mode));
        }
    }

    #[test]
    fn test_custom_reveals_input() {
        let (mut selector, _) = create_selector();
        assert!(selector.select(Mode::Custom));
        assert!(selector.custom_input_visible());

        assert!(selector.select(Mode::Za));
        assert!(!selector.custom_input_visible());
    }

    #[test]
    fn test_reselect_is_not_a_toggle() {
        let (mut selector, mut rx) = create_selector();
        assert!(!selector.select(Mode::Qa));
        assert_eq!(selector.mode(), Mode::Qa);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_transition_emits_event() {
        let (mut selector, mut rx) = create_selector();
        selector.select(Mode::Za);

        match rx.try_recv().unwrap() {
            SessionEvent::ModeSelected { mode, previous } => {
                assert_eq!(mode, Mode::Za);
                assert_eq!(previous, Mode::Qa);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&Mode::Custom).unwrap(), r#""custom""#);
        let mode: Mode = serde_json::from_str(r#""za""#).unwrap();
        assert_eq!(mode, Mode::Za);
    }
}
