//! The duplex message channel the client core is written against.
//!
//! The core never blocks on the network: connection results, disconnects, and
//! inbound messages all arrive as events drained from `poll` during the tick.

/// A connection lifecycle or inbound-message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The underlying connection is established and writable.
    Connected,
    /// The underlying connection is gone; sends will fail until reconnected.
    Disconnected,
    /// One whole inbound text message.
    Message(String),
}

/// A duplex text-message channel with non-blocking event delivery.
pub trait Channel {
    /// Begins connecting to `url`. Returns false only if the attempt could not
    /// be started; the outcome itself arrives later as a `Connected` or
    /// `Disconnected` event.
    fn connect(&mut self, url: &str) -> bool;

    /// Tears the connection down.
    fn disconnect(&mut self);

    /// Whether the transport currently reports an established connection.
    fn is_connected(&self) -> bool;

    /// Queues one text message for delivery. Returns false when disconnected
    /// or the message could not be accepted.
    fn send(&mut self, text: &str) -> bool;

    /// Takes the next pending event, if any. Never blocks.
    fn poll(&mut self) -> Option<ChannelEvent>;
}

/// Scriptable in-memory channel for exercising the session and client state
/// machines without a network.
#[cfg(test)]
pub struct MockChannel {
    pub connected: bool,
    pub accept_sends: bool,
    pub sent: Vec<String>,
    pub inbound: std::collections::VecDeque<ChannelEvent>,
    pub connect_calls: usize,
}

#[cfg(test)]
impl MockChannel {
    pub fn new() -> Self {
        Self {
            connected: false,
            accept_sends: true,
            sent: Vec::new(),
            inbound: std::collections::VecDeque::new(),
            connect_calls: 0,
        }
    }

    pub fn push_event(&mut self, event: ChannelEvent) {
        self.inbound.push_back(event);
    }
}

#[cfg(test)]
impl Channel for MockChannel {
    fn connect(&mut self, _url: &str) -> bool {
        self.connect_calls += 1;
        true
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, text: &str) -> bool {
        if !self.connected || !self.accept_sends {
            return false;
        }
        self.sent.push(text.to_string());
        true
    }

    fn poll(&mut self) -> Option<ChannelEvent> {
        let event = self.inbound.pop_front()?;
        match event {
            ChannelEvent::Connected => self.connected = true,
            ChannelEvent::Disconnected => self.connected = false,
            ChannelEvent::Message(_) => {}
        }
        Some(event)
    }
}
