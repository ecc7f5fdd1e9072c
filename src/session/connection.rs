use log::debug;
use serde_json::json;

use crate::transport::channel::Channel;

/// How the device proves its identity to the platform.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Pre-provisioned device id plus secret key.
    DeviceKey {
        device_id: String,
        secret_key: String,
    },
    /// Project-level token; the server assigns the device id on first auth.
    ProjectToken { token: String },
}

/// Descriptive fields sent along with the auth frame and device info report.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub mac_address: String,
    pub ip_address: String,
    pub firmware_version: String,
    pub hardware_version: String,
    pub platform: String,
}

/// One logical session: connect, authenticate, then send.
///
/// The session holds the `{transport_connected, authenticated}` pair and the
/// credentials; the orchestrator applies transport events and auth responses
/// to it. `authenticate` is fire-and-forget: the response arrives later on the
/// message path and is applied via `on_auth_result`.
#[derive(Debug)]
pub struct Session {
    credentials: Credentials,
    transport_connected: bool,
    authenticated: bool,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            transport_connected: false,
            authenticated: false,
        }
    }

    /// True when both the transport and the identity handshake are up.
    pub fn is_ready(&self) -> bool {
        self.transport_connected && self.authenticated
    }

    pub fn is_transport_connected(&self) -> bool {
        self.transport_connected
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn on_transport_connected(&mut self) {
        self.transport_connected = true;
    }

    /// A lost transport always invalidates the identity handshake.
    pub fn on_transport_disconnected(&mut self) {
        self.transport_connected = false;
        self.authenticated = false;
    }

    pub fn on_auth_result(&mut self, success: bool) {
        self.authenticated = self.transport_connected && success;
    }

    /// Sends the auth frame for the configured credentials. Returns whether
    /// the frame was handed to the transport; acceptance arrives asynchronously.
    pub fn authenticate(&mut self, channel: &mut dyn Channel, identity: &DeviceIdentity) -> bool {
        if !self.transport_connected {
            return false;
        }

        let frame = match &self.credentials {
            Credentials::DeviceKey {
                device_id,
                secret_key,
            } => json!({
                "type": "auth",
                "deviceId": device_id,
                "secretKey": secret_key,
                "macAddress": identity.mac_address,
                "ipAddress": identity.ip_address,
                "firmwareVersion": identity.firmware_version,
                "hardwareVersion": identity.hardware_version,
            }),
            Credentials::ProjectToken { token } => json!({
                "type": "auth_token",
                "projectToken": token,
                "deviceId": identity.device_id,
                "macAddress": identity.mac_address,
                "ipAddress": identity.ip_address,
                "firmwareVersion": identity.firmware_version,
                "hardwareVersion": identity.hardware_version,
                "platform": identity.platform,
            }),
        };

        debug!("sending auth frame for device {}", identity.device_id);
        channel.send(&frame.to_string())
    }

    /// Forwards `text` only when connected and authenticated. The double gate
    /// is the core correctness property of the session: user data never leaves
    /// the device before the server has accepted its identity.
    pub fn send(&self, channel: &mut dyn Channel, text: &str) -> bool {
        if !self.transport_connected || !self.authenticated {
            return false;
        }
        channel.send(text)
    }
}
