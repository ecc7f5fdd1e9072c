use serde::Deserialize;
use serde_json::Value;

/// A frame received from the platform, discriminated by its `"type"` field.
///
/// Frames that fail to deserialize (unknown type, missing fields, invalid
/// JSON) are dropped silently by the dispatcher; nothing at this layer is
/// acknowledged or retried.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Result of the identity handshake. Token auth may assign a device id.
    #[serde(rename = "auth_response", alias = "auth_token_response")]
    AuthResponse {
        success: bool,
        #[serde(rename = "deviceId")]
        device_id: Option<String>,
        project: Option<Value>,
        error: Option<String>,
    },

    /// A remote command; interpretation belongs to the consumer.
    #[serde(rename = "command")]
    Command { command: Value },

    /// New WiFi credentials pushed from the web app.
    #[serde(rename = "wifi_config")]
    WifiConfig { ssid: String, password: String },

    /// A firmware update is available.
    #[serde(rename = "ota_update")]
    OtaUpdate { update: OtaUpdate },

    /// Progress of a server-tracked firmware rollout, 0 to 100.
    #[serde(rename = "ota_progress")]
    OtaProgress { progress: i64 },

    /// Runtime configuration pushed by the server.
    #[serde(rename = "config")]
    Config { config: RemoteConfig },

    /// Project metadata in response to `project_info_request`.
    #[serde(rename = "project_info")]
    ProjectInfo { project: Option<Value> },
}

#[derive(Debug, Deserialize)]
pub struct OtaUpdate {
    pub url: String,
}

/// Intervals the server may adjust at runtime. Absent fields leave the current
/// value in place.
#[derive(Debug, Deserialize)]
pub struct RemoteConfig {
    #[serde(rename = "heartbeatInterval")]
    pub heartbeat_interval: Option<u32>,
    #[serde(rename = "metricsInterval")]
    pub metrics_interval: Option<u32>,
}
