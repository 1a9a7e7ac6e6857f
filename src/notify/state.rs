//! Notification state machine with cancellable auto-dismiss
//!
//! Each `show` bumps a generation counter and schedules a dismissal tagged
//! with it. A dismissal only acts if its tag still matches the current
//! generation, so only the most recent `show` can hide the notification.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::SessionEvent;

/// How long a notification stays visible unless replaced or hidden
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_millis(3000);

/// Which notification channel a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Error,
    Success,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Error => write!(f, "error"),
            Channel::Success => write!(f, "success"),
        }
    }
}

/// Mutable part of a notification, guarded by a mutex
#[derive(Default)]
struct Inner {
    message: Option<String>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

/// State shared with the dismissal task
struct Shared {
    channel: Channel,
    inner: Mutex<Inner>,
    visible: watch::Sender<bool>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called by the timer scheduled for `generation`
    fn dismiss(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                channel = %self.channel,
                generation,
                current = inner.generation,
                "stale dismissal ignored"
            );
            return;
        }
        inner.pending = None;
        let was_visible = self.clear_visible(&mut inner);
        drop(inner);

        debug!(channel = %self.channel, "notification timed out");
        if was_visible {
            self.announce_hidden();
        }
    }

    /// Clear the visible flag; the guard must be held so a concurrent
    /// `show` cannot land between the generation check and this write
    fn clear_visible(&self, _inner: &mut MutexGuard<'_, Inner>) -> bool {
        self.visible.send_replace(false)
    }

    fn announce_hidden(&self) {
        info!(channel = %self.channel, "notification hidden");
        let _ = self.event_tx.send(SessionEvent::NotificationHidden {
            channel: self.channel,
        });
    }
}

/// A single notification channel
pub struct NotificationState {
    shared: Arc<Shared>,
    duration: Duration,
}

impl NotificationState {
    /// Create an empty, hidden notification
    pub fn new(
        channel: Channel,
        duration: Duration,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                channel,
                inner: Mutex::new(Inner::default()),
                visible,
                event_tx,
            }),
            duration,
        }
    }

    /// Channel this notification belongs to
    pub fn channel(&self) -> Channel {
        self.shared.channel
    }

    /// Show `message`, replacing any current one and restarting the timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.shared.lock();

        inner.generation = inner.generation.wrapping_add(1);
        let generation = inner.generation;
        if let Some(previous) = inner.pending.take() {
            previous.abort();
        }
        inner.message = Some(message.clone());
        self.shared.visible.send_replace(true);

        let shared = Arc::clone(&self.shared);
        let duration = self.duration;
        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            shared.dismiss(generation);
        }));
        drop(inner);

        info!(
            channel = %self.shared.channel,
            message = %message,
            generation,
            "notification shown"
        );
        let _ = self.shared.event_tx.send(SessionEvent::NotificationShown {
            channel: self.shared.channel,
            message,
        });
    }

    /// Hide immediately, cancelling any pending dismissal
    pub fn hide(&self) {
        let mut inner = self.shared.lock();
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        let was_visible = self.shared.clear_visible(&mut inner);
        drop(inner);

        if was_visible {
            self.shared.announce_hidden();
        }
    }

    /// True once a message has been set; the message outlives visibility
    pub fn is_active(&self) -> bool {
        self.shared.lock().message.is_some()
    }

    /// Whether the notification is currently visible
    pub fn is_visible(&self) -> bool {
        *self.shared.visible.borrow()
    }

    /// Most recent message, if any
    pub fn message(&self) -> Option<String> {
        self.shared.lock().message.clone()
    }

    /// Observe the visibility flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.visible.subscribe()
    }
}

impl Drop for NotificationState {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().pending.take() {
            pending.abort();
        }
    }
}

/// The two notification channels used by a session
pub struct Notifier {
    pub error: NotificationState,
    pub success: NotificationState,
}

impl Notifier {
    /// Create both channels with the same display duration
    pub fn new(duration: Duration, event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            error: NotificationState::new(Channel::Error, duration, event_tx.clone()),
            success: NotificationState::new(Channel::Success, duration, event_tx),
        }
    }

    /// Look up a channel by name
    pub fn channel(&self, channel: Channel) -> &NotificationState {
        match channel {
            Channel::Error => &self.error,
            Channel::Success => &self.success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    use tokio_test::{assert_pending, assert_ready_ok, task};

    fn create_state() -> (NotificationState, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (
            NotificationState::new(Channel::Error, DEFAULT_DISPLAY_DURATION, tx),
            rx,
        )
    }

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test]
    async fn test_initially_empty() {
        let (state, _) = create_state();
        assert!(!state.is_active());
        assert!(!state.is_visible());
        assert_eq!(state.message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_then_auto_dismiss() {
        let (state, _) = create_state();
        state.show("empty_content_error");
        assert!(state.is_visible());
        assert!(state.is_active());

        advance_ms(2999).await;
        assert!(state.is_visible());

        advance_ms(2).await;
        assert!(!state.is_visible());
        // Message is retained after dismissal
        assert!(state.is_active());
        assert_eq!(state.message().as_deref(), Some("empty_content_error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_show_supersedes_first_timer() {
        let (state, _) = create_state();
        state.show("a");
        advance_ms(1000).await;
        state.show("b");

        // Past the first timer's deadline
        advance_ms(2500).await;
        assert!(state.is_visible());
        assert_eq!(state.message().as_deref(), Some("b"));

        // Past the second timer's deadline
        advance_ms(1000).await;
        assert!(!state.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_is_immediate() {
        let (state, _) = create_state();
        state.show("copy_success_message");
        state.hide();
        assert!(!state.is_visible());
        assert!(state.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_after_hide_gets_full_window() {
        let (state, _) = create_state();
        state.show("a");
        advance_ms(2000).await;
        state.hide();
        state.show("b");

        advance_ms(2000).await;
        assert!(state.is_visible());
        advance_ms(1100).await;
        assert!(!state.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_dismissal_is_noop() {
        let (state, _) = create_state();
        state.show("a");
        let stale = state.shared.lock().generation;
        state.show("b");

        state.shared.dismiss(stale);
        assert!(state.is_visible());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stale_dismissal_racing_show_keeps_new_message() {
        let (tx, _rx) = broadcast::channel(16);
        let state = NotificationState::new(Channel::Error, Duration::from_secs(60), tx);
        let handle = tokio::runtime::Handle::current();

        for _ in 0..2000 {
            state.show("a");
            let stale = state.shared.lock().generation;
            let barrier = Barrier::new(2);

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    let _runtime = handle.enter();
                    barrier.wait();
                    state.show("b");
                });
                scope.spawn(|| {
                    barrier.wait();
                    state.shared.dismiss(stale);
                });
            });

            // Whichever side wins the lock, "b" ends up visible
            assert!(state.is_visible());
            assert_eq!(state.message().as_deref(), Some("b"));
        }
    }

    #[tokio::test]
    async fn test_visible_signal_wakes_observer() {
        let (state, _) = create_state();
        let mut rx = state.subscribe();

        {
            let mut changed = task::spawn(rx.changed());
            assert_pending!(changed.poll());

            state.show("a");
            assert!(changed.is_woken());
            assert_ready_ok!(changed.poll());
        }
        assert!(*rx.borrow_and_update());

        let mut changed = task::spawn(rx.changed());
        assert_pending!(changed.poll());
        state.hide();
        assert!(changed.is_woken());
        assert_ready_ok!(changed.poll());
        drop(changed);
        assert!(!*rx.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_signal() {
        let (state, _) = create_state();
        let mut rx = state.subscribe();
        assert!(!*rx.borrow());

        state.show("a");
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_emitted() {
        let (state, mut rx) = create_state();
        state.show("no_vowels_error");
        state.hide();
        state.hide();

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::NotificationShown {
                channel: Channel::Error,
                message: "no_vowels_error".to_string(),
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::NotificationHidden {
                channel: Channel::Error
            }
        );
        // Hiding an already hidden notification emits nothing
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_channels_are_independent() {
        let (tx, _rx) = broadcast::channel(16);
        let notifier = Notifier::new(DEFAULT_DISPLAY_DURATION, tx);

        notifier.error.show("empty_content_error");
        advance_ms(2000).await;
        notifier.success.show("copy_success_message");
        notifier.channel(Channel::Success).hide();

        assert!(notifier.channel(Channel::Error).is_visible());
        assert!(!notifier.success.is_visible());

        advance_ms(1100).await;
        assert!(!notifier.error.is_visible());
        assert!(notifier.success.is_active());
    }
}
