use log::{debug, warn};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::client::telemetry::TelemetryValue;
use crate::config::Settings;
use crate::json::JsonBuilder;
use crate::queue::{MessageQueue, Priority};
use crate::session::{Credentials, DeviceIdentity, Session};
use crate::transport::channel::{Channel, ChannelEvent};
use crate::transport::frame::ServerFrame;
use crate::transport::websocket::WebSocketChannel;
use crate::utils::ParanodeError;
use crate::utils::clock::{Clock, SystemClock, elapsed_ms};

/// Queued messages drained per tick. Bounds worst-case tick latency and keeps
/// the connection from being flooded after an outage.
const MAX_DRAIN_PER_TICK: usize = 3;

/// Floor for the heartbeat interval; smaller requested values are ignored.
const MIN_HEARTBEAT_INTERVAL_MS: u32 = 10_000;

/// Cadence of the queue expiry sweep.
const EXPIRY_SWEEP_INTERVAL_MS: u32 = 30_000;

const DEFAULT_BATCH_SIZE: usize = 5;
const MAX_BATCH_SIZE: usize = 10;

/// Decimal places for scalar float telemetry.
const FLOAT_DECIMALS: usize = 2;

/// Decimal places for coordinates.
const GEO_DECIMALS: usize = 6;

/// Resource readings the embedding application supplies for heartbeats and
/// periodic metrics. The library does not probe the platform itself.
#[derive(Debug, Clone, Copy)]
pub struct ResourceMetrics {
    pub free_heap: u64,
    pub rssi: i32,
}

type CommandCallback = Box<dyn FnMut(&Value)>;
type ConnectionCallback = Box<dyn FnMut()>;
type OtaCallback = Box<dyn FnMut(&str)>;
type OtaProgressCallback = Box<dyn FnMut(i64)>;
type WifiConfigCallback = Box<dyn FnMut(&str, &str)>;

/// Optional handler slots, one per event kind. Invoking an unset slot is a
/// no-op.
#[derive(Default)]
struct Callbacks {
    on_command: Option<CommandCallback>,
    on_connect: Option<ConnectionCallback>,
    on_disconnect: Option<ConnectionCallback>,
    on_ota_update: Option<OtaCallback>,
    on_ota_progress: Option<OtaProgressCallback>,
    on_wifi_config: Option<WifiConfigCallback>,
}

enum SendMode {
    Direct,
    Queued(Priority),
}

/// Client for the Paranode IoT platform.
///
/// Owns the transport channel, the authenticated session, and the outbound
/// message queue, and coordinates them from `tick`, which the application must
/// call from its main loop. Telemetry is sent directly while connected, or
/// queued for later delivery while offline or batching.
///
/// Single-threaded by design: every method runs to completion on the caller's
/// context, and nothing here is safe to share across threads without external
/// synchronization.
pub struct Paranode {
    settings: Settings,
    identity: DeviceIdentity,
    session: Session,
    channel: Box<dyn Channel>,
    queue: MessageQueue,
    clock: Box<dyn Clock>,
    callbacks: Callbacks,

    /// External "is the network up" probe; assumed up when unset.
    link_probe: Option<Box<dyn Fn() -> bool>>,
    metrics_source: Option<Box<dyn FnMut() -> ResourceMetrics>>,

    batching_enabled: bool,
    batch_size: usize,
    auto_reconnect: bool,
    heartbeat_interval_ms: u32,
    metrics_interval_ms: u32,

    start_ms: u32,
    last_heartbeat: u32,
    last_metrics: u32,
    last_batch_flush: u32,
    last_expiry_sweep: u32,
    last_reconnect_attempt: u32,

    // Fixed working buffers, allocated once at construction.
    message_buf: Vec<u8>,
    scratch_buf: Vec<u8>,
    batch_buf: Vec<u8>,
}

impl Paranode {
    /// Creates a client over a WebSocket transport with the system clock.
    pub fn new(credentials: Credentials, settings: Settings) -> Result<Self, ParanodeError> {
        let channel = WebSocketChannel::new()?;
        Ok(Self::with_parts(
            Box::new(channel),
            Box::new(SystemClock),
            credentials,
            settings,
        ))
    }

    /// Creates a client over an arbitrary channel and clock.
    pub fn with_parts(
        channel: Box<dyn Channel>,
        clock: Box<dyn Clock>,
        credentials: Credentials,
        settings: Settings,
    ) -> Self {
        let now = clock.now_ms();

        // Token-auth devices get a provisional id until the server assigns one.
        let device_id = match &credentials {
            Credentials::DeviceKey { device_id, .. } => device_id.clone(),
            Credentials::ProjectToken { .. } => format!("device-{}", Uuid::new_v4()),
        };
        let identity = DeviceIdentity {
            device_id,
            mac_address: String::new(),
            ip_address: String::new(),
            firmware_version: "1.0.0".to_string(),
            hardware_version: "1.0.0".to_string(),
            platform: std::env::consts::OS.to_string(),
        };

        let messaging = settings.messaging.clone();
        let reconnect_cooldown = settings.connection.reconnect_cooldown_ms;

        Self {
            identity,
            session: Session::new(credentials),
            channel,
            queue: MessageQueue::new(messaging.queue_capacity, messaging.max_message_size),
            callbacks: Callbacks::default(),
            link_probe: None,
            metrics_source: None,
            batching_enabled: false,
            batch_size: DEFAULT_BATCH_SIZE,
            auto_reconnect: settings.connection.auto_reconnect,
            heartbeat_interval_ms: messaging.heartbeat_interval_ms,
            metrics_interval_ms: messaging.metrics_interval_ms,
            start_ms: now,
            last_heartbeat: now,
            last_metrics: now,
            last_batch_flush: now,
            last_expiry_sweep: now,
            // The first connect attempt should not wait out the cooldown.
            last_reconnect_attempt: now.wrapping_sub(reconnect_cooldown.wrapping_add(1)),
            message_buf: vec![0; messaging.max_message_size],
            scratch_buf: vec![0; messaging.max_message_size],
            batch_buf: vec![0; messaging.max_message_size * 4],
            clock,
            settings,
        }
    }

    /// Begins connecting to the configured server. The result arrives through
    /// `tick`; authentication starts automatically once the transport is up.
    pub fn connect(&mut self) -> bool {
        if !self.link_is_up() {
            return false;
        }
        self.channel.connect(&self.settings.connection.server_url)
    }

    pub fn disconnect(&mut self) {
        self.channel.disconnect();
        self.session.on_transport_disconnected();
    }

    /// Ready to carry user data: transport connected and identity accepted.
    pub fn is_connected(&self) -> bool {
        self.session.is_ready()
    }

    /// Seconds since the client was constructed.
    pub fn uptime_secs(&self) -> u32 {
        elapsed_ms(self.clock.now_ms(), self.start_ms) / 1000
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Drives the client: pumps transport events, drains the queue, flushes
    /// batches, emits heartbeats and metrics, sweeps expired entries, and
    /// reconnects. Non-blocking; call this from the application's main loop.
    pub fn tick(&mut self) {
        while let Some(event) = self.channel.poll() {
            self.handle_event(event);
        }

        let now = self.clock.now_ms();

        if self.session.is_ready() {
            if !self.batching_enabled {
                self.process_queue(now);
            }

            if self.batching_enabled
                && !self.queue.is_empty()
                && elapsed_ms(now, self.last_batch_flush) > self.settings.messaging.batch_interval_ms
            {
                self.flush_queue();
                self.last_batch_flush = now;
            }

            if elapsed_ms(now, self.last_heartbeat) > self.heartbeat_interval_ms {
                self.send_heartbeat(now);
                self.last_heartbeat = now;
            }

            if elapsed_ms(now, self.last_metrics) > self.metrics_interval_ms {
                let reading = self.metrics_source.as_mut().map(|read| read());
                if let Some(m) = reading {
                    self.send_metrics(m.free_heap, m.rssi);
                }
                self.last_metrics = now;
            }
        }

        if !self.queue.is_empty()
            && elapsed_ms(now, self.last_expiry_sweep) > EXPIRY_SWEEP_INTERVAL_MS
        {
            self.queue
                .remove_expired(now, self.settings.messaging.expiry_timeout_ms);
            self.last_expiry_sweep = now;
        }

        if self.auto_reconnect
            && !self.session.is_transport_connected()
            && self.link_is_up()
            && elapsed_ms(now, self.last_reconnect_attempt)
                > self.settings.connection.reconnect_cooldown_ms
        {
            self.last_reconnect_attempt = now;
            debug!("attempting reconnect");
            self.channel.connect(&self.settings.connection.server_url);
        }
    }

    /// Sends one telemetry point. Direct while connected and not batching;
    /// queued at normal priority otherwise, so readings taken offline are
    /// delivered after the next successful authentication.
    pub fn send_data<'v>(
        &mut self,
        key: &str,
        value: impl Into<TelemetryValue<'v>>,
        unit: Option<&str>,
    ) -> bool {
        let value = value.into();
        let now = self.clock.now_ms();
        self.send_frame(SendMode::Queued(Priority::Normal), |b| {
            b.add_string("type", "telemetry");
            b.add_string("key", key);
            match value {
                TelemetryValue::Integer(v) => b.add_int("value", v),
                TelemetryValue::Float(v) => b.add_float("value", v, FLOAT_DECIMALS),
                TelemetryValue::Boolean(v) => b.add_bool("value", v),
                TelemetryValue::Text(v) => b.add_string("value", v),
            }
            if let Some(unit) = unit
                && !unit.is_empty()
            {
                b.add_string("unit", unit);
            }
            b.add_uint("timestamp", u64::from(now));
        })
    }

    /// Sends several telemetry points as one frame. Requires a live session.
    pub fn send_data_points(&mut self, data: &Value) -> bool {
        if !self.is_connected() {
            return false;
        }
        let frame = json!({
            "type": "telemetry",
            "timestamp": self.clock.now_ms(),
            "data": data,
        });
        self.send_direct_text(&frame.to_string())
    }

    /// Reports a device status (e.g. ONLINE, MAINTENANCE, ERROR).
    pub fn send_status(&mut self, status: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        let now = self.clock.now_ms();
        let uptime = self.uptime_secs();
        self.send_frame(SendMode::Direct, |b| {
            b.add_string("type", "status");
            b.add_string("status", status);
            b.add_uint("timestamp", u64::from(now));
            b.add_uint("uptime", u64::from(uptime));
        })
    }

    /// Reports an error to the platform. Errors are queued at high priority so
    /// they survive pressure from routine telemetry.
    pub fn send_error(&mut self, message: &str, code: i32) -> bool {
        if !self.is_connected() {
            return false;
        }
        let now = self.clock.now_ms();
        self.send_frame(SendMode::Queued(Priority::High), |b| {
            b.add_string("type", "error");
            b.add_string("message", message);
            if code != 0 {
                b.add_int("code", i64::from(code));
            }
            b.add_uint("timestamp", u64::from(now));
        })
    }

    /// Sends resource metrics, queued at low priority.
    pub fn send_metrics(&mut self, free_heap: u64, rssi: i32) -> bool {
        if !self.is_connected() {
            return false;
        }
        let now = self.clock.now_ms();
        let uptime = self.uptime_secs();
        self.send_frame(SendMode::Queued(Priority::Low), |b| {
            b.add_string("type", "metrics");
            b.start_nested_object("data");
            b.add_uint("freeHeap", free_heap);
            b.add_int("rssi", i64::from(rssi));
            b.add_uint("uptime", u64::from(uptime));
            b.end_object();
            b.add_uint("timestamp", u64::from(now));
        })
    }

    /// Sends the device's position. `accuracy` in meters; values <= 0 omit it.
    pub fn send_geolocation(&mut self, latitude: f64, longitude: f64, accuracy: f32) -> bool {
        if !self.is_connected() {
            return false;
        }
        let now = self.clock.now_ms();
        self.send_frame(SendMode::Direct, |b| {
            b.add_string("type", "geolocation");
            b.add_float("latitude", latitude, GEO_DECIMALS);
            b.add_float("longitude", longitude, GEO_DECIMALS);
            if accuracy > 0.0 {
                b.add_float("accuracy", f64::from(accuracy), FLOAT_DECIMALS);
            }
            b.add_uint("timestamp", u64::from(now));
        })
    }

    /// Acknowledges a previously received command.
    pub fn send_command_response(
        &mut self,
        command_id: &str,
        status: &str,
        response: Option<&str>,
    ) -> bool {
        if !self.is_connected() {
            return false;
        }
        let mut frame = json!({
            "type": "command_response",
            "commandId": command_id,
            "status": status,
            "timestamp": self.clock.now_ms(),
        });
        if let Some(response) = response
            && !response.is_empty()
        {
            frame["response"] = Value::from(response);
        }
        self.send_direct_text(&frame.to_string())
    }

    /// Pushes arbitrary status metadata to the device's platform record.
    pub fn update_device_status(&mut self, metadata: &Value) -> bool {
        if !self.is_connected() {
            return false;
        }
        let frame = json!({
            "type": "device_status_update",
            "timestamp": self.clock.now_ms(),
            "uptime": self.uptime_secs(),
            "metadata": metadata,
        });
        self.send_direct_text(&frame.to_string())
    }

    /// Asks the server for the device's runtime configuration.
    pub fn request_config(&mut self) -> bool {
        if !self.is_connected() {
            return false;
        }
        let frame = json!({ "type": "config_request" });
        self.send_direct_text(&frame.to_string())
    }

    /// Asks the web app for new WiFi credentials.
    pub fn request_wifi_config(&mut self) -> bool {
        if !self.is_connected() {
            return false;
        }
        let now = self.clock.now_ms();
        self.send_frame(SendMode::Direct, |b| {
            b.add_string("type", "wifi_config_request");
            b.add_uint("timestamp", u64::from(now));
        })
    }

    /// Asks the server for project metadata.
    pub fn request_project_info(&mut self) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.send_frame(SendMode::Direct, |b| {
            b.add_string("type", "project_info_request");
        })
    }

    /// Sends queued messages now instead of waiting for the tick cadence.
    ///
    /// Under batching, up to one batch of `batch_size` messages goes out as a
    /// single frame and exactly the batched entries are removed. Otherwise
    /// entries are drained one frame each until the queue is empty or a send
    /// fails; a failed entry is re-queued at normal priority and draining
    /// stops. Returns the number of messages delivered.
    pub fn flush_queue(&mut self) -> usize {
        if !self.session.is_ready() || self.queue.is_empty() {
            return 0;
        }

        if self.batching_enabled {
            let mut buf = std::mem::take(&mut self.batch_buf);
            let drained = self.queue.drain_batch(&mut buf, self.batch_size, |batch| {
                self.session.send(self.channel.as_mut(), batch)
            });
            self.batch_buf = buf;
            drained
        } else {
            let now = self.clock.now_ms();
            let mut scratch = std::mem::take(&mut self.scratch_buf);
            let mut sent = 0;
            while !self.queue.is_empty() {
                let len = self.queue.dequeue(&mut scratch);
                if len == 0 {
                    break;
                }
                let Ok(text) = std::str::from_utf8(&scratch[..len]) else {
                    continue;
                };
                if self.session.send(self.channel.as_mut(), text) {
                    sent += 1;
                } else {
                    self.queue.enqueue(&scratch[..len], Priority::Normal, now);
                    break;
                }
            }
            self.scratch_buf = scratch;
            sent
        }
    }

    /// Enables or disables batch delivery of queued messages. Batch sizes
    /// outside 1..=10 are ignored.
    pub fn set_batching(&mut self, enable: bool, batch_size: usize) {
        self.batching_enabled = enable;
        if (1..=MAX_BATCH_SIZE).contains(&batch_size) {
            self.batch_size = batch_size;
        }
    }

    /// Sets the heartbeat interval. Values below 10 seconds are ignored.
    pub fn set_heartbeat_interval(&mut self, interval_ms: u32) {
        if interval_ms >= MIN_HEARTBEAT_INTERVAL_MS {
            self.heartbeat_interval_ms = interval_ms;
        }
    }

    pub fn set_auto_reconnect(&mut self, enable: bool) {
        self.auto_reconnect = enable;
    }

    pub fn set_device_info(&mut self, firmware_version: &str, hardware_version: &str) {
        self.identity.firmware_version = firmware_version.to_string();
        self.identity.hardware_version = hardware_version.to_string();
    }

    pub fn set_mac_address(&mut self, mac_address: &str) {
        self.identity.mac_address = mac_address.to_string();
    }

    pub fn set_ip_address(&mut self, ip_address: &str) {
        self.identity.ip_address = ip_address.to_string();
    }

    pub fn device_id(&self) -> &str {
        &self.identity.device_id
    }

    /// Supplies the "is the network up" probe used to gate reconnects.
    pub fn set_link_probe(&mut self, probe: Box<dyn Fn() -> bool>) {
        self.link_probe = Some(probe);
    }

    /// Supplies resource readings for heartbeats and periodic metrics.
    pub fn set_metrics_source(&mut self, source: Box<dyn FnMut() -> ResourceMetrics>) {
        self.metrics_source = Some(source);
    }

    pub fn on_command(&mut self, callback: CommandCallback) {
        self.callbacks.on_command = Some(callback);
    }

    pub fn on_connect(&mut self, callback: ConnectionCallback) {
        self.callbacks.on_connect = Some(callback);
    }

    pub fn on_disconnect(&mut self, callback: ConnectionCallback) {
        self.callbacks.on_disconnect = Some(callback);
    }

    pub fn on_ota_update(&mut self, callback: OtaCallback) {
        self.callbacks.on_ota_update = Some(callback);
    }

    pub fn on_ota_progress(&mut self, callback: OtaProgressCallback) {
        self.callbacks.on_ota_progress = Some(callback);
    }

    pub fn on_wifi_config(&mut self, callback: WifiConfigCallback) {
        self.callbacks.on_wifi_config = Some(callback);
    }

    fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.session.on_transport_connected();
                if let Some(cb) = self.callbacks.on_connect.as_mut() {
                    cb();
                }
                self.session
                    .authenticate(self.channel.as_mut(), &self.identity);
            }
            ChannelEvent::Disconnected => {
                self.session.on_transport_disconnected();
                if let Some(cb) = self.callbacks.on_disconnect.as_mut() {
                    cb();
                }
            }
            ChannelEvent::Message(text) => self.handle_message(&text),
        }
    }

    fn handle_message(&mut self, text: &str) {
        let frame: ServerFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping unparseable frame: {e}");
                return;
            }
        };

        match frame {
            ServerFrame::AuthResponse {
                success,
                device_id,
                project,
                error,
            } => {
                self.session.on_auth_result(success);
                if success {
                    if let Some(id) = device_id {
                        self.identity.device_id = id;
                    }
                    if let Some(project) = project {
                        debug!("authenticated into project {project}");
                    }
                    self.send_device_info();
                } else {
                    warn!(
                        "authentication failed: {}",
                        error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            ServerFrame::Command { command } => {
                if let Some(cb) = self.callbacks.on_command.as_mut() {
                    cb(&command);
                }
            }
            ServerFrame::WifiConfig { ssid, password } => {
                if let Some(cb) = self.callbacks.on_wifi_config.as_mut() {
                    cb(&ssid, &password);
                }
            }
            ServerFrame::OtaUpdate { update } => {
                if let Some(cb) = self.callbacks.on_ota_update.as_mut() {
                    cb(&update.url);
                }
            }
            ServerFrame::OtaProgress { progress } => {
                if let Some(cb) = self.callbacks.on_ota_progress.as_mut() {
                    cb(progress);
                }
            }
            ServerFrame::Config { config } => {
                if let Some(interval) = config.heartbeat_interval {
                    self.set_heartbeat_interval(interval);
                }
                if let Some(interval) = config.metrics_interval {
                    self.metrics_interval_ms = interval;
                }
            }
            ServerFrame::ProjectInfo { project } => {
                debug!("project info: {project:?}");
            }
        }
    }

    /// Sends up to a few queued messages. A failed send re-queues the message
    /// at normal priority and ends draining for this tick; there is never a
    /// retry loop inside one tick.
    fn process_queue(&mut self, now: u32) {
        if self.queue.is_empty() {
            return;
        }

        let mut scratch = std::mem::take(&mut self.scratch_buf);
        let mut sent = 0;
        while sent < MAX_DRAIN_PER_TICK && !self.queue.is_empty() {
            let len = self.queue.dequeue(&mut scratch);
            if len == 0 {
                break;
            }
            let Ok(text) = std::str::from_utf8(&scratch[..len]) else {
                continue;
            };
            if self.session.send(self.channel.as_mut(), text) {
                sent += 1;
            } else {
                self.queue.enqueue(&scratch[..len], Priority::Normal, now);
                break;
            }
        }
        self.scratch_buf = scratch;
    }

    fn send_heartbeat(&mut self, now: u32) {
        let uptime = elapsed_ms(now, self.start_ms) / 1000;
        let reading = self.metrics_source.as_mut().map(|read| read());
        self.send_frame(SendMode::Direct, |b| {
            b.add_string("type", "heartbeat");
            b.add_uint("uptime", u64::from(uptime));
            if let Some(m) = reading {
                b.add_uint("freeHeap", m.free_heap);
                b.add_int("rssi", i64::from(m.rssi));
            }
        });
    }

    /// Reports identity details once the server has accepted the device.
    fn send_device_info(&mut self) {
        let frame = json!({
            "type": "device_info",
            "firmwareVersion": self.identity.firmware_version,
            "hardwareVersion": self.identity.hardware_version,
            "macAddress": self.identity.mac_address,
            "ipAddress": self.identity.ip_address,
        });
        self.send_direct_text(&frame.to_string());
    }

    /// Builds one frame in the fixed message buffer and sends it.
    fn send_frame<F>(&mut self, mode: SendMode, build: F) -> bool
    where
        F: FnOnce(&mut JsonBuilder),
    {
        let mut buf = std::mem::take(&mut self.message_buf);
        let len = {
            let mut builder = JsonBuilder::new(&mut buf);
            builder.start_object();
            build(&mut builder);
            builder.end_object();
            builder.len()
        };

        let ok = match mode {
            SendMode::Direct => match std::str::from_utf8(&buf[..len]) {
                Ok(text) => self.session.send(self.channel.as_mut(), text),
                Err(_) => false,
            },
            SendMode::Queued(priority) => self.send_queued(&buf[..len], priority),
        };

        self.message_buf = buf;
        ok
    }

    /// Queue-or-direct decision for queueable frames: a live, non-batching
    /// session sends immediately; anything else goes to the queue.
    fn send_queued(&mut self, payload: &[u8], priority: Priority) -> bool {
        if self.session.is_ready() && !self.batching_enabled {
            return match std::str::from_utf8(payload) {
                Ok(text) => self.session.send(self.channel.as_mut(), text),
                Err(_) => false,
            };
        }
        let now = self.clock.now_ms();
        self.queue.enqueue(payload, priority, now)
    }

    fn send_direct_text(&mut self, text: &str) -> bool {
        self.session.send(self.channel.as_mut(), text)
    }

    fn link_is_up(&self) -> bool {
        match &self.link_probe {
            Some(probe) => probe(),
            None => true,
        }
    }
}
