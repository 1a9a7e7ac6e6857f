//! Unix domain socket server for IPC
//!
//! Provides request-response communication and push notifications of
//! session events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::convert::{convert, to_speech_form};
use crate::events::SessionEvent;
use crate::session::Session;

use super::protocol::{DaemonStatus, Notification, Request, Response};

/// Largest accepted message body
const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Session shared between client handlers
pub type SharedSession = Arc<Mutex<Session>>;

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    session: SharedSession,
    start_time: Instant,
    shutdown_tx: broadcast::Sender<()>,
    /// Session event bus, subscribed to on behalf of clients
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        session: SharedSession,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path)
            .context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            session,
            start_time: Instant::now(),
            shutdown_tx,
            event_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let session = Arc::clone(&self.session);
                    let event_tx = self.event_tx.clone();
                    let start_time = self.start_time;
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, session, event_tx, start_time) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        stream: UnixStream,
        session: SharedSession,
        event_tx: broadcast::Sender<SessionEvent>,
        start_time: Instant,
    ) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let (request_tx, mut request_rx) = mpsc::channel(16);
        let mut reader_task = AbortOnDrop(tokio::spawn(Self::read_requests(reader, request_tx)));

        let mut events: Option<broadcast::Receiver<SessionEvent>> = None;

        loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    debug!(?request, "received request");

                    let (response, subscribe) =
                        Self::process_request(request, &session, start_time).await;
                    if subscribe && events.is_none() {
                        events = Some(event_tx.subscribe());
                        debug!("client subscribed to notifications");
                    }

                    Self::send_message(&mut writer, &response).await?;
                }

                event = Self::next_event(&mut events) => {
                    match event {
                        Ok(event) => {
                            debug!(%event, "pushing event to client");
                            Self::send_message(&mut writer, &Notification::Event { event }).await?;
                        }
                        Err(RecvError::Lagged(n)) => {
                            warn!(skipped = n, "client event receiver lagged");
                        }
                        Err(RecvError::Closed) => {
                            events = None;
                        }
                    }
                }
            }
        }

        (&mut reader_task.0).await.context("request reader panicked")?
    }

    /// Read length-prefixed requests until the client disconnects
    async fn read_requests(mut reader: OwnedReadHalf, request_tx: mpsc::Sender<Request>) -> Result<()> {
        loop {
            let Some(request) = Self::read_message(&mut reader).await? else {
                debug!("client disconnected");
                return Ok(());
            };
            if request_tx.send(request).await.is_err() {
                return Ok(());
            }
        }
    }

    /// Read one length-prefixed JSON request, `None` on clean EOF
    async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Request>> {
        let mut len_buf = [0u8; 4];

        // Read message length (4-byte little-endian)
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_LEN {
            warn!(len, "message too large, disconnecting");
            return Ok(None);
        }

        // Read message body
        let mut msg_buf = vec![0u8; len];
        reader.read_exact(&mut msg_buf).await?;

        let request = serde_json::from_slice(&msg_buf)
            .context("failed to parse request")?;
        Ok(Some(request))
    }

    /// Next event for a subscribed client; pending forever otherwise
    async fn next_event(
        events: &mut Option<broadcast::Receiver<SessionEvent>>,
    ) -> Result<SessionEvent, RecvError> {
        match events {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        T: serde::Serialize,
    {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = u32::try_from(msg_bytes.len())
            .context("message too large")?
            .to_le_bytes();

        writer.write_all(&msg_len).await?;
        writer.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        session: &SharedSession,
        start_time: Instant,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::Subscribe => (Response::Subscribed, true),

            Request::GetStatus => {
                let session = session.lock().await;
                let status = DaemonStatus::new(session.status(), start_time.elapsed().as_secs());
                (Response::Status(status), false)
            }

            Request::SelectMode { mode } => {
                let changed = session.lock().await.select_mode(mode);
                (Response::ModeChanged { mode, changed }, false)
            }

            Request::SetContent { text } => {
                session.lock().await.set_content(text);
                (Response::Ack, false)
            }

            Request::SetCustomMarker { marker } => {
                session.lock().await.set_custom_marker(marker);
                (Response::Ack, false)
            }

            Request::Generate => {
                let response = match session.lock().await.generate() {
                    Ok(result) => Response::Converted {
                        text: result.text,
                        had_vowel: result.had_vowel,
                    },
                    Err(e) => e.into(),
                };
                (response, false)
            }

            Request::Convert { text, mode, custom_marker } => {
                let result = convert(&text, mode, custom_marker.as_deref());
                (
                    Response::Converted {
                        text: result.text,
                        had_vowel: result.had_vowel,
                    },
                    false,
                )
            }

            Request::SpeechForm { text } => (
                Response::SpeechForm {
                    text: to_speech_form(&text),
                },
                false,
            ),

            Request::Copy => (Self::ack(session.lock().await.copy()), false),

            Request::Speak => (Self::ack(session.lock().await.speak()), false),

            Request::Share => (Self::ack(session.lock().await.share()), false),

            Request::HideNotification { channel } => {
                session.lock().await.hide_notification(channel);
                (Response::Ack, false)
            }
        }
    }

    fn ack<E: Into<Response>>(result: Result<(), E>) -> Response {
        match result {
            Ok(()) => Response::Ack,
            Err(e) => e.into(),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
