//! Background WebSocket connection loop with auto-reconnect.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::handler::{decode_frame, encode_frame};
use super::types::{RealtimeCommand, RealtimeConfig, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = Arc<Mutex<SplitSink<WsStream, WsMessage>>>;

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// Encoded frames waiting for a live connection.
#[derive(Debug)]
pub(crate) struct Outbox {
    frames: VecDeque<String>,
    capacity: usize,
}

impl Outbox {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn push(&mut self, frame: String) {
        if self.frames.len() >= self.capacity {
            warn!(capacity = self.capacity, "Outbox full, dropping oldest frame");
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Put a frame that failed to send back at the head of the queue.
    pub(crate) fn requeue(&mut self, frame: String) {
        if self.frames.len() >= self.capacity {
            self.frames.pop_back();
        }
        self.frames.push_front(frame);
    }

    pub(crate) fn pop(&mut self) -> Option<String> {
        self.frames.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// How a connected session ended.
enum SessionEnd {
    /// The server or the network dropped us; reconnect.
    Dropped,
    /// The application asked to close; go idle.
    Closed,
    /// Every client handle is gone; exit the task.
    Shutdown,
}

enum BackoffEnd {
    Elapsed,
    Closed,
    Shutdown,
}

/// Background task managing the WebSocket connection with auto-reconnect.
///
/// Idle until the first `Open`. After a `Close` it goes idle again and
/// waits for the next `Open`. Emits made while not connected are kept in
/// the outbox and flushed after the next successful connect.
pub(crate) async fn connection_loop(
    config: RealtimeConfig,
    event_tx: mpsc::Sender<TransportEvent>,
    mut command_rx: mpsc::UnboundedReceiver<RealtimeCommand>,
) {
    let mut outbox = Outbox::new(config.outbox_capacity);

    'idle: loop {
        if !wait_for_open(&mut command_rx, &mut outbox).await {
            debug!("Realtime client dropped while idle");
            return;
        }

        let mut attempt: u32 = 0;
        loop {
            match dial(&config).await {
                Ok(ws_stream) => {
                    attempt = 0;
                    let _ = event_tx.send(TransportEvent::Connected).await;

                    let end =
                        run_session(ws_stream, &config, &event_tx, &mut command_rx, &mut outbox)
                            .await;
                    let _ = event_tx.send(TransportEvent::Disconnected).await;

                    match end {
                        SessionEnd::Dropped => {}
                        SessionEnd::Closed => continue 'idle,
                        SessionEnd::Shutdown => return,
                    }
                }
                Err(message) => {
                    let _ = event_tx.send(TransportEvent::Error(message)).await;
                }
            }

            // Exponential backoff reconnect.
            attempt = attempt.saturating_add(1);
            let delay = config.backoff_secs(attempt);
            info!(attempt, delay, "Reconnecting in {} seconds", delay);
            let _ = event_tx
                .send(TransportEvent::Reconnecting {
                    attempt,
                    delay_secs: delay,
                })
                .await;

            match backoff(delay, &mut command_rx, &mut outbox).await {
                BackoffEnd::Elapsed => {}
                BackoffEnd::Closed => {
                    let _ = event_tx.send(TransportEvent::Disconnected).await;
                    continue 'idle;
                }
                BackoffEnd::Shutdown => return,
            }
        }
    }
}

/// Wait for an `Open`, queueing emits. Returns `false` on shutdown.
async fn wait_for_open(
    command_rx: &mut mpsc::UnboundedReceiver<RealtimeCommand>,
    outbox: &mut Outbox,
) -> bool {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            RealtimeCommand::Open => return true,
            RealtimeCommand::Close => {}
            RealtimeCommand::Emit(envelope) => {
                if let Some(frame) = encode_frame(&envelope) {
                    outbox.push(frame);
                }
            }
        }
    }
    false
}

/// Sleep between attempts. `Open` cuts the wait short; `Close` abandons
/// reconnecting.
async fn backoff(
    delay_secs: u64,
    command_rx: &mut mpsc::UnboundedReceiver<RealtimeCommand>,
    outbox: &mut Outbox,
) -> BackoffEnd {
    let sleep = tokio::time::sleep(Duration::from_secs(delay_secs));
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return BackoffEnd::Elapsed,
            cmd = command_rx.recv() => match cmd {
                Some(RealtimeCommand::Open) => return BackoffEnd::Elapsed,
                Some(RealtimeCommand::Close) => {
                    info!("Reconnect cancelled");
                    return BackoffEnd::Closed;
                }
                Some(RealtimeCommand::Emit(envelope)) => {
                    if let Some(frame) = encode_frame(&envelope) {
                        outbox.push(frame);
                    }
                }
                None => return BackoffEnd::Shutdown,
            },
        }
    }
}

async fn dial(config: &RealtimeConfig) -> Result<WsStream, String> {
    info!(url = %config.url, "Connecting to session server");

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        tokio_tungstenite::connect_async(config.url.as_str()),
    )
    .await
    {
        Ok(Ok((ws_stream, _))) => {
            info!(url = %config.url, "Connected to session server");
            Ok(ws_stream)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to connect to session server");
            Err(format!("Connection failed: {e}"))
        }
        Err(_elapsed) => {
            error!(
                timeout = config.connect_timeout_secs,
                "WebSocket connection timed out"
            );
            Err(format!(
                "Connection timed out after {}s",
                config.connect_timeout_secs
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

async fn run_session(
    ws_stream: WsStream,
    config: &RealtimeConfig,
    event_tx: &mpsc::Sender<TransportEvent>,
    command_rx: &mut mpsc::UnboundedReceiver<RealtimeCommand>,
    outbox: &mut Outbox,
) -> SessionEnd {
    let (ws_write, mut ws_read) = ws_stream.split();
    let ws_write: WsWriter = Arc::new(Mutex::new(ws_write));

    if !flush_outbox(&ws_write, outbox).await {
        return SessionEnd::Dropped;
    }

    let heartbeat_handle = tokio::spawn(heartbeat_task(
        Arc::clone(&ws_write),
        config.heartbeat_interval_secs,
    ));

    let end = loop {
        tokio::select! {
            msg = ws_read.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(event) = decode_frame(&text) {
                        let _ = event_tx.send(event).await;
                    }
                }
                Some(Ok(WsMessage::Close(_))) => {
                    info!("Session server closed connection");
                    break SessionEnd::Dropped;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    break SessionEnd::Dropped;
                }
                None => {
                    info!("WebSocket stream ended");
                    break SessionEnd::Dropped;
                }
            },
            cmd = command_rx.recv() => match cmd {
                Some(RealtimeCommand::Open) => {}
                Some(RealtimeCommand::Emit(envelope)) => {
                    let Some(frame) = encode_frame(&envelope) else {
                        continue;
                    };
                    let mut writer = ws_write.lock().await;
                    if let Err(e) = writer.send(WsMessage::Text(frame.clone().into())).await {
                        warn!(error = %e, event = %envelope.event, "Send failed, queueing frame");
                        outbox.requeue(frame);
                        break SessionEnd::Dropped;
                    }
                }
                Some(RealtimeCommand::Close) => {
                    info!("Closing connection");
                    let mut writer = ws_write.lock().await;
                    let _ = writer.send(WsMessage::Close(None)).await;
                    break SessionEnd::Closed;
                }
                None => {
                    let mut writer = ws_write.lock().await;
                    let _ = writer.send(WsMessage::Close(None)).await;
                    break SessionEnd::Shutdown;
                }
            },
        }
    };

    heartbeat_handle.abort();
    end
}

/// Send every queued frame. Returns `false` if the socket failed mid-flush;
/// the failed frame goes back to the head of the queue.
async fn flush_outbox(ws_write: &WsWriter, outbox: &mut Outbox) -> bool {
    if outbox.len() > 0 {
        debug!(frames = outbox.len(), "Flushing outbox");
    }
    let mut writer = ws_write.lock().await;
    while let Some(frame) = outbox.pop() {
        if let Err(e) = writer.send(WsMessage::Text(frame.clone().into())).await {
            warn!(error = %e, "Outbox flush failed");
            outbox.requeue(frame);
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

async fn heartbeat_task<S>(ws_write: Arc<Mutex<S>>, interval_secs: u64)
where
    S: futures_util::Sink<WsMessage> + Unpin,
{
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let mut writer = ws_write.lock().await;
        if writer.send(WsMessage::Ping(Default::default())).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;
    use crate::realtime::Envelope;

    #[test]
    fn outbox_drops_oldest_when_full() {
        let mut outbox = Outbox::new(2);
        outbox.push("a".into());
        outbox.push("b".into());
        outbox.push("c".into());
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.pop().as_deref(), Some("b"));
        assert_eq!(outbox.pop().as_deref(), Some("c"));
        assert_eq!(outbox.pop(), None);
    }

    #[test]
    fn requeue_goes_to_front() {
        let mut outbox = Outbox::new(3);
        outbox.push("b".into());
        outbox.requeue("a".into());
        assert_eq!(outbox.pop().as_deref(), Some("a"));
        assert_eq!(outbox.pop().as_deref(), Some("b"));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut outbox = Outbox::new(0);
        outbox.push("a".into());
        assert_eq!(outbox.len(), 1);
    }

    #[tokio::test]
    async fn idle_loop_exits_when_client_dropped() {
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(connection_loop(
            RealtimeConfig::default(),
            event_tx,
            command_rx,
        ));

        drop(command_tx);
        task.await.unwrap();
        assert!(event_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failed_dial_reports_error_then_reconnecting() {
        let config = RealtimeConfig {
            url: "ws://127.0.0.1:1/ws".into(),
            connect_timeout_secs: 2,
            reconnect_delay_secs: 60,
            max_reconnect_delay_secs: 60,
            ..RealtimeConfig::default()
        };
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(connection_loop(config, event_tx, command_rx));

        command_tx.send(RealtimeCommand::Open).unwrap();
        assert!(matches!(
            event_rx.recv().await,
            Some(TransportEvent::Error(_))
        ));
        assert_eq!(
            event_rx.recv().await,
            Some(TransportEvent::Reconnecting {
                attempt: 1,
                delay_secs: 60
            })
        );

        command_tx.send(RealtimeCommand::Close).unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));
    }

    #[tokio::test]
    async fn live_session_flushes_queue_forwards_frames_and_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = RealtimeConfig {
            url: format!("ws://{addr}/ws"),
            connect_timeout_secs: 5,
            reconnect_delay_secs: 60,
            max_reconnect_delay_secs: 60,
            ..RealtimeConfig::default()
        };
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(connection_loop(config, event_tx, command_rx));

        // Queued while idle, sent once connected.
        command_tx
            .send(RealtimeCommand::Emit(Envelope {
                event: "join-room".into(),
                data: json!({"roomCode": "ABC123", "userName": "Ann", "role": "player"}),
            }))
            .unwrap();
        command_tx.send(RealtimeCommand::Open).unwrap();

        let (stream, _) = listener.accept().await.unwrap();
        let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Connected));

        let first = server.next().await.unwrap().unwrap();
        let frame: Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
        assert_eq!(frame["event"], "join-room");
        assert_eq!(frame["data"]["roomCode"], "ABC123");

        let update = json!({"event": "room-updated", "data": {"id": "r1", "code": "ABC123"}});
        server
            .send(WsMessage::Text(update.to_string().into()))
            .await
            .unwrap();
        assert_eq!(
            event_rx.recv().await,
            Some(TransportEvent::Message {
                event: "room-updated".into(),
                data: json!({"id": "r1", "code": "ABC123"}),
            })
        );

        server.close(None).await.unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));
        assert_eq!(
            event_rx.recv().await,
            Some(TransportEvent::Reconnecting {
                attempt: 1,
                delay_secs: 60
            })
        );

        command_tx.send(RealtimeCommand::Close).unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));
    }

    #[tokio::test]
    async fn close_sends_close_frame_after_pending_emits() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = RealtimeConfig {
            url: format!("ws://{addr}/ws"),
            ..RealtimeConfig::default()
        };
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(connection_loop(config, event_tx, command_rx));

        command_tx.send(RealtimeCommand::Open).unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Connected));

        command_tx
            .send(RealtimeCommand::Emit(Envelope {
                event: "leave-room".into(),
                data: Value::Null,
            }))
            .unwrap();
        command_tx.send(RealtimeCommand::Close).unwrap();

        let frame = server.next().await.unwrap().unwrap();
        assert!(frame.to_text().unwrap().contains("leave-room"));
        assert!(matches!(
            server.next().await,
            Some(Ok(WsMessage::Close(_)))
        ));
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));
    }
}
