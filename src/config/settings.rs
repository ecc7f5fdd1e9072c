use serde::Deserialize;

/// Top-level configuration settings for the client.
///
/// Includes settings for the server connection and for message handling.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub messaging: MessagingSettings,
}

/// Configuration settings for the server connection.
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionSettings {
    pub server_url: String,
    pub auto_reconnect: bool,
    /// Minimum gap between reconnect attempts while the transport is down.
    pub reconnect_cooldown_ms: u32,
}

/// Configuration settings for queueing and send cadence.
#[derive(Debug, Deserialize, Clone)]
pub struct MessagingSettings {
    pub queue_capacity: usize,
    /// Upper bound on one serialized frame; larger payloads are rejected.
    pub max_message_size: usize,
    pub heartbeat_interval_ms: u32,
    pub metrics_interval_ms: u32,
    pub batch_interval_ms: u32,
    /// Queued messages older than this are swept out unsent.
    pub expiry_timeout_ms: u32,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub connection: Option<PartialConnectionSettings>,
    pub messaging: Option<PartialMessagingSettings>,
}

/// Partial connection settings.
#[derive(Debug, Deserialize)]
pub struct PartialConnectionSettings {
    pub server_url: Option<String>,
    pub auto_reconnect: Option<bool>,
    pub reconnect_cooldown_ms: Option<u32>,
}

/// Partial messaging settings.
#[derive(Debug, Deserialize)]
pub struct PartialMessagingSettings {
    pub queue_capacity: Option<usize>,
    pub max_message_size: Option<usize>,
    pub heartbeat_interval_ms: Option<u32>,
    pub metrics_interval_ms: Option<u32>,
    pub batch_interval_ms: Option<u32>,
    pub expiry_timeout_ms: Option<u32>,
}

/// Provides default values for `Settings`.
///
/// Ensures the client has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings {
                server_url: "wss://api.paranode.io/ws".to_string(),
                auto_reconnect: true,
                reconnect_cooldown_ms: 5_000,
            },
            messaging: MessagingSettings {
                queue_capacity: 20,
                max_message_size: 384,
                heartbeat_interval_ms: 30_000,
                metrics_interval_ms: 60_000,
                batch_interval_ms: 10_000,
                expiry_timeout_ms: 300_000,
            },
        }
    }
}
