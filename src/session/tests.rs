use serde_json::Value;

use super::{Credentials, DeviceIdentity, Session};
use crate::transport::channel::MockChannel;

fn identity() -> DeviceIdentity {
    DeviceIdentity {
        device_id: "dev-1".to_string(),
        mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
        ip_address: "10.0.0.7".to_string(),
        firmware_version: "2.1.0".to_string(),
        hardware_version: "1.0.0".to_string(),
        platform: "linux".to_string(),
    }
}

fn device_key_session() -> Session {
    Session::new(Credentials::DeviceKey {
        device_id: "dev-1".to_string(),
        secret_key: "s3cret".to_string(),
    })
}

#[test]
fn test_send_requires_transport_and_auth() {
    let mut channel = MockChannel::new();
    channel.connected = true;
    let mut session = device_key_session();

    // Neither flag set.
    assert!(!session.send(&mut channel, "{}"));

    // Transport only.
    session.on_transport_connected();
    assert!(!session.send(&mut channel, "{}"));

    // Both.
    session.on_auth_result(true);
    assert!(session.send(&mut channel, "{}"));
    assert_eq!(channel.sent.len(), 1);
}

#[test]
fn test_authenticate_requires_transport() {
    let mut channel = MockChannel::new();
    channel.connected = true;
    let mut session = device_key_session();

    assert!(!session.authenticate(&mut channel, &identity()));
    assert!(channel.sent.is_empty());

    session.on_transport_connected();
    assert!(session.authenticate(&mut channel, &identity()));
    assert_eq!(channel.sent.len(), 1);
}

#[test]
fn test_device_key_auth_frame_contents() {
    let mut channel = MockChannel::new();
    channel.connected = true;
    let mut session = device_key_session();
    session.on_transport_connected();
    session.authenticate(&mut channel, &identity());

    let frame: Value = serde_json::from_str(&channel.sent[0]).unwrap();
    assert_eq!(frame["type"], "auth");
    assert_eq!(frame["deviceId"], "dev-1");
    assert_eq!(frame["secretKey"], "s3cret");
    assert_eq!(frame["macAddress"], "AA:BB:CC:DD:EE:FF");
    assert_eq!(frame["firmwareVersion"], "2.1.0");
}

#[test]
fn test_project_token_auth_frame_contents() {
    let mut channel = MockChannel::new();
    channel.connected = true;
    let mut session = Session::new(Credentials::ProjectToken {
        token: "tok-123".to_string(),
    });
    session.on_transport_connected();
    session.authenticate(&mut channel, &identity());

    let frame: Value = serde_json::from_str(&channel.sent[0]).unwrap();
    assert_eq!(frame["type"], "auth_token");
    assert_eq!(frame["projectToken"], "tok-123");
    assert_eq!(frame["deviceId"], "dev-1");
    assert_eq!(frame["platform"], "linux");
}

#[test]
fn test_disconnect_invalidates_authentication() {
    let mut channel = MockChannel::new();
    channel.connected = true;
    let mut session = device_key_session();
    session.on_transport_connected();
    session.on_auth_result(true);
    assert!(session.is_ready());

    session.on_transport_disconnected();
    assert!(!session.is_ready());
    assert!(!session.is_authenticated());
    assert!(!session.send(&mut channel, "{}"));
}

#[test]
fn test_auth_result_ignored_without_transport() {
    let mut session = device_key_session();
    session.on_auth_result(true);
    assert!(!session.is_authenticated());
    assert!(!session.is_ready());
}

#[test]
fn test_failed_auth_clears_authentication() {
    let mut session = device_key_session();
    session.on_transport_connected();
    session.on_auth_result(true);
    assert!(session.is_ready());

    session.on_auth_result(false);
    assert!(!session.is_ready());
}
