//! The `transport` module handles network communication with the platform,
//! primarily via WebSockets.
//!
//! It defines the duplex text channel the client core is written against, the
//! wire frames the server sends, and the WebSocket implementation of the
//! channel. Wire-level framing and TLS belong to the WebSocket library; the
//! rest of the crate only ever sees whole text messages.

pub mod channel;
pub mod frame;
pub mod websocket;

pub use channel::{Channel, ChannelEvent};
pub use frame::ServerFrame;
pub use websocket::WebSocketChannel;

#[cfg(test)]
mod tests;
