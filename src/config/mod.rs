mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, Environment, File};

pub use settings::{ConnectionSettings, MessagingSettings, Settings};

use crate::utils::ParanodeError;

/// Loads the configuration from the default file and environment variables.
///
/// Merges the configuration with default values and returns a `Settings`
/// struct containing the connection and messaging configurations. Environment
/// variables use the `PARANODE` prefix with `__` between path segments, e.g.
/// `PARANODE__CONNECTION__SERVER_URL`.
pub fn load_config() -> Result<Settings, ParanodeError> {
    dotenvy::dotenv().ok();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("paranode")
                .prefix_separator("__")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        connection: ConnectionSettings {
            server_url: partial
                .connection
                .as_ref()
                .and_then(|c| c.server_url.clone())
                .unwrap_or(default.connection.server_url),
            auto_reconnect: partial
                .connection
                .as_ref()
                .and_then(|c| c.auto_reconnect)
                .unwrap_or(default.connection.auto_reconnect),
            reconnect_cooldown_ms: partial
                .connection
                .as_ref()
                .and_then(|c| c.reconnect_cooldown_ms)
                .unwrap_or(default.connection.reconnect_cooldown_ms),
        },
        messaging: MessagingSettings {
            queue_capacity: partial
                .messaging
                .as_ref()
                .and_then(|m| m.queue_capacity)
                .unwrap_or(default.messaging.queue_capacity),
            max_message_size: partial
                .messaging
                .as_ref()
                .and_then(|m| m.max_message_size)
                .unwrap_or(default.messaging.max_message_size),
            heartbeat_interval_ms: partial
                .messaging
                .as_ref()
                .and_then(|m| m.heartbeat_interval_ms)
                .unwrap_or(default.messaging.heartbeat_interval_ms),
            metrics_interval_ms: partial
                .messaging
                .as_ref()
                .and_then(|m| m.metrics_interval_ms)
                .unwrap_or(default.messaging.metrics_interval_ms),
            batch_interval_ms: partial
                .messaging
                .as_ref()
                .and_then(|m| m.batch_interval_ms)
                .unwrap_or(default.messaging.batch_interval_ms),
            expiry_timeout_ms: partial
                .messaging
                .as_ref()
                .and_then(|m| m.expiry_timeout_ms)
                .unwrap_or(default.messaging.expiry_timeout_ms),
        },
    })
}
