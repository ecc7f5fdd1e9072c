use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tungstenite::protocol::Message as WsMessage;

use crate::transport::channel::{Channel, ChannelEvent};
use crate::utils::ParanodeError;

/// WebSocket implementation of [`Channel`].
///
/// The connection lives on a background task inside a single-worker tokio
/// runtime owned by the channel. The tick-driven core talks to it through
/// unbounded channels: outbound text goes to a writer loop, inbound text and
/// lifecycle changes come back as [`ChannelEvent`]s drained by `poll`. Nothing
/// on the caller's side ever blocks on the network.
pub struct WebSocketChannel {
    runtime: Runtime,
    events: Option<UnboundedReceiver<ChannelEvent>>,
    outbound: Option<UnboundedSender<WsMessage>>,
    connected: bool,
}

impl WebSocketChannel {
    pub fn new() -> Result<Self, ParanodeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("paranode-ws")
            .enable_all()
            .build()
            .map_err(|e| ParanodeError::Transport(e.to_string()))?;

        Ok(Self {
            runtime,
            events: None,
            outbound: None,
            connected: false,
        })
    }
}

impl Channel for WebSocketChannel {
    fn connect(&mut self, url: &str) -> bool {
        if self.connected {
            return true;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        self.events = Some(event_rx);
        self.outbound = Some(out_tx);

        self.runtime
            .spawn(run_connection(url.to_string(), event_tx, out_rx));
        true
    }

    fn disconnect(&mut self) {
        // Dropping the outbound sender ends the connection task, which closes
        // the socket on its way out.
        self.outbound = None;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, text: &str) -> bool {
        if !self.connected {
            return false;
        }
        match &self.outbound {
            Some(tx) => tx.send(WsMessage::text(text)).is_ok(),
            None => false,
        }
    }

    fn poll(&mut self) -> Option<ChannelEvent> {
        let event = self.events.as_mut()?.try_recv().ok()?;
        match event {
            ChannelEvent::Connected => self.connected = true,
            ChannelEvent::Disconnected => {
                self.connected = false;
                self.outbound = None;
            }
            ChannelEvent::Message(_) => {}
        }
        Some(event)
    }
}

/// One connection's lifetime: dial, then shuttle messages in both directions
/// until either side goes away.
async fn run_connection(
    url: String,
    events: UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<WsMessage>,
) {
    let ws_stream = match connect_async(&url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            warn!("WebSocket connect to {url} failed: {e}");
            let _ = events.send(ChannelEvent::Disconnected);
            return;
        }
    };

    debug!("WebSocket connected to {url}");
    let _ = events.send(ChannelEvent::Connected);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(msg) => {
                    if let Err(e) = ws_sender.send(msg).await {
                        warn!("WebSocket send failed: {e}");
                        break;
                    }
                }
                None => {
                    // Local disconnect: the channel half was dropped.
                    let _ = ws_sender.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = events.send(ChannelEvent::Message(text.to_string()));
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                // Pings are answered by the protocol layer on the next write.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket read error: {e}");
                    break;
                }
            },
        }
    }

    let _ = events.send(ChannelEvent::Disconnected);
}
