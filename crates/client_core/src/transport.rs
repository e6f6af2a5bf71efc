//! WebSocket-backed collaboration channel.
//!
//! Frames are JSON objects with a `type` tag in both directions. The
//! connection task reconnects after `reconnect_delay` whenever the socket
//! drops, and outbound messages queued while disconnected are written once
//! the next connection is up.

use std::{
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use shared::{
    domain::ConnectionState,
    protocol::{ExtendedMessage, OutboundMessage},
};
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    channel::{ChannelClient, ChannelEvent, InternalAction},
    error::ChannelError,
};

const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_EVENT_BUFFER: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Pause between reconnection attempts. `None` disables reconnection.
    pub reconnect_delay: Option<Duration>,
    pub event_buffer: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Some(DEFAULT_RECONNECT_DELAY),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

pub struct WsChannelClient {
    state: Arc<RwLock<ConnectionState>>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    events: broadcast::Sender<ChannelEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WsChannelClient {
    /// Starts the connection task for `url` and returns immediately; progress
    /// is reported through [`ChannelClient::subscribe_events`].
    /// Must be called from within a tokio runtime.
    pub fn connect(url: Url, options: TransportOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(options.event_buffer.max(1));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));

        let connection = Connection {
            url,
            options,
            state: Arc::clone(&state),
            events: events.clone(),
        };
        let task = tokio::spawn(connection.run(outbound_rx));

        Arc::new(Self {
            state,
            outbound,
            events,
            task: Mutex::new(Some(task)),
        })
    }

    /// Stops the connection task and reports `Disconnected`. Later sends fail
    /// with [`ChannelError::Closed`].
    pub fn shutdown(&self) {
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
            info!("collaboration channel shut down");
            publish_state(&self.state, &self.events, ConnectionState::Disconnected);
        }
    }
}

impl Drop for WsChannelClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ChannelClient for WsChannelClient {
    fn channel_state(&self) -> ConnectionState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn send_extended_message(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        let shut_down = match self.task.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        };
        if shut_down {
            return Err(ChannelError::Closed);
        }
        self.outbound.send(message).map_err(|_| ChannelError::Closed)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }
}

struct Connection {
    url: Url,
    options: TransportOptions,
    state: Arc<RwLock<ConnectionState>>,
    events: broadcast::Sender<ChannelEvent>,
}

enum SessionEnd {
    Dropped,
    ClientGone,
}

impl Connection {
    async fn run(self, mut outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>) {
        loop {
            self.set_state(ConnectionState::Connecting);
            match connect_async(self.url.as_str()).await {
                Ok((ws_stream, _)) => {
                    info!(url = %self.url, "collaboration channel connected");
                    self.set_state(ConnectionState::Connected);
                    let end = self.pump(ws_stream, &mut outbound_rx).await;
                    self.set_state(ConnectionState::Disconnected);
                    if let SessionEnd::ClientGone = end {
                        return;
                    }
                }
                Err(err) => {
                    warn!(
                        url = %self.url,
                        error = %err,
                        "failed to connect collaboration channel"
                    );
                    self.set_state(ConnectionState::Disconnected);
                }
            }

            let Some(delay) = self.options.reconnect_delay else {
                return;
            };
            tokio::time::sleep(delay).await;
        }
    }

    async fn pump(
        &self,
        ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        outbound_rx: &mut mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> SessionEnd {
        let (mut writer, mut reader) = ws_stream.split();
        loop {
            tokio::select! {
                frame = reader.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.deliver(&text),
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Dropped,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "collaboration channel receive failed");
                        return SessionEnd::Dropped;
                    }
                },
                outbound = outbound_rx.recv() => {
                    let Some(message) = outbound else {
                        let _ = writer.send(Message::Close(None)).await;
                        return SessionEnd::ClientGone;
                    };
                    let frame = match message.to_frame() {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(
                                kind = message.kind(),
                                error = %err,
                                "dropping unencodable message"
                            );
                            continue;
                        }
                    };
                    if let Err(err) = writer.send(Message::Text(frame)).await {
                        warn!(
                            kind = message.kind(),
                            error = %err,
                            "collaboration channel send failed"
                        );
                        return SessionEnd::Dropped;
                    }
                    debug!(kind = message.kind(), "wrote channel frame");
                    self.emit(ChannelEvent::InternalAction(InternalAction::CommitPerformed));
                    if outbound_rx.is_empty() {
                        self.emit(ChannelEvent::InternalAction(InternalAction::NewlyIdle));
                    }
                }
            }
        }
    }

    fn deliver(&self, text: &str) {
        match ExtendedMessage::parse(text) {
            Ok(message) => self.emit(ChannelEvent::Message(message)),
            Err(err) => warn!(error = %err, "ignoring invalid channel frame"),
        }
    }

    fn set_state(&self, next: ConnectionState) {
        publish_state(&self.state, &self.events, next);
    }

    fn emit(&self, event: ChannelEvent) {
        // No subscribers is fine; events are only informational.
        let _ = self.events.send(event);
    }
}

/// Stores `next` and emits `StateChanged` if it differs from the old state.
fn publish_state(
    state: &RwLock<ConnectionState>,
    events: &broadcast::Sender<ChannelEvent>,
    next: ConnectionState,
) {
    let changed = match state.write() {
        Ok(mut guard) => std::mem::replace(&mut *guard, next) != next,
        Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next) != next,
    };
    if changed {
        let _ = events.send(ChannelEvent::StateChanged(next));
    }
}
