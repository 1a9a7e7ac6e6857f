//! qarghadili-daemon: Background daemon for the Crow Language converter
//!
//! Turns text into "Crow Language" by doubling every vowel around a
//! marker string, and provides:
//! - Mode selection state machine (QA, ZA, CUSTOM)
//! - Error and success notifications with timed auto-dismiss
//! - Copy, speak and share requests handed to the presentation layer
//! - IPC server for UI clients
//!
//! Rendering, localisation of messages and the actual clipboard,
//! speech and share calls belong to the connected UI.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qarghadili_daemon::config::Config;
use qarghadili_daemon::events::SessionEvent;
use qarghadili_daemon::ipc::Server;
use qarghadili_daemon::lifecycle::ShutdownSignal;
use qarghadili_daemon::session::{BroadcastActions, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "qarghadili-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.socket_path,
        notify_ms = config.notify_duration.as_millis() as u64,
        locale = %config.speech_locale,
        "configuration loaded"
    );

    // Create shutdown signal handler
    let mut shutdown = ShutdownSignal::new()?;

    // Session -> IPC clients (events and action requests)
    let (event_tx, _) = broadcast::channel::<SessionEvent>(64);

    let session = Session::new(
        config.notify_duration,
        config.speech_locale.clone(),
        event_tx.clone(),
        Box::new(BroadcastActions::new(event_tx.clone())),
    );
    let session = Arc::new(Mutex::new(session));

    let server = Server::new(&config.socket_path, session, event_tx)?;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!("qarghadili-daemon stopped");

    Ok(())
}
