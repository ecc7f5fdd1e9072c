use serde_json::json;

use super::frame::ServerFrame;

fn parse(value: serde_json::Value) -> Result<ServerFrame, serde_json::Error> {
    serde_json::from_str(&value.to_string())
}

#[test]
fn test_parse_auth_response() {
    let frame = parse(json!({
        "type": "auth_response",
        "success": true,
        "deviceId": "dev-42",
        "project": {"name": "greenhouse"},
    }))
    .unwrap();

    match frame {
        ServerFrame::AuthResponse {
            success,
            device_id,
            project,
            error,
        } => {
            assert!(success);
            assert_eq!(device_id.as_deref(), Some("dev-42"));
            assert!(project.is_some());
            assert!(error.is_none());
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_auth_token_response_alias() {
    let frame = parse(json!({
        "type": "auth_token_response",
        "success": false,
        "error": "invalid token",
    }))
    .unwrap();

    match frame {
        ServerFrame::AuthResponse { success, error, .. } => {
            assert!(!success);
            assert_eq!(error.as_deref(), Some("invalid token"));
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_command() {
    let frame = parse(json!({
        "type": "command",
        "command": {"action": "reboot", "commandId": "c-1"},
    }))
    .unwrap();

    match frame {
        ServerFrame::Command { command } => {
            assert_eq!(command["action"], "reboot");
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_wifi_config() {
    let frame = parse(json!({
        "type": "wifi_config",
        "ssid": "shopfloor",
        "password": "hunter2",
    }))
    .unwrap();

    match frame {
        ServerFrame::WifiConfig { ssid, password } => {
            assert_eq!(ssid, "shopfloor");
            assert_eq!(password, "hunter2");
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_ota_frames() {
    let frame = parse(json!({
        "type": "ota_update",
        "update": {"url": "https://firmware.example/v2.bin"},
    }))
    .unwrap();
    match frame {
        ServerFrame::OtaUpdate { update } => {
            assert_eq!(update.url, "https://firmware.example/v2.bin");
        }
        other => panic!("unexpected frame: {other:?}"),
    }

    let frame = parse(json!({"type": "ota_progress", "progress": 60})).unwrap();
    match frame {
        ServerFrame::OtaProgress { progress } => assert_eq!(progress, 60),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_config_with_partial_fields() {
    let frame = parse(json!({
        "type": "config",
        "config": {"heartbeatInterval": 15000},
    }))
    .unwrap();

    match frame {
        ServerFrame::Config { config } => {
            assert_eq!(config.heartbeat_interval, Some(15_000));
            assert_eq!(config.metrics_interval, None);
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_parse_project_info() {
    let frame = parse(json!({
        "type": "project_info",
        "project": {"name": "greenhouse", "devices": 3},
    }))
    .unwrap();

    match frame {
        ServerFrame::ProjectInfo { project } => {
            assert_eq!(project.unwrap()["devices"], 3);
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_unknown_type_is_an_error() {
    assert!(parse(json!({"type": "mystery", "payload": 1})).is_err());
}

#[test]
fn test_missing_required_field_is_an_error() {
    assert!(parse(json!({"type": "wifi_config", "ssid": "only-ssid"})).is_err());
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(serde_json::from_str::<ServerFrame>("{not json").is_err());
}
