//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use packet_buffer::config::{BufferConfig, LoggingConfig, ObfuscationConfig, PacketConfig};
use packet_buffer::core::byte_order::ByteOrder;
use packet_buffer::error::PacketError;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = PacketConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_zero_initial_capacity() {
    let mut config = PacketConfig::default();
    config.buffer.initial_capacity = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Initial capacity must be greater than 0")));
}

#[test]
fn test_initial_above_max_capacity() {
    let mut config = PacketConfig::default();
    config.buffer.initial_capacity = 4096;
    config.buffer.max_capacity = 1024;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("cannot exceed max capacity")));
}

#[test]
fn test_max_capacity_must_fit_prefix() {
    let mut config = PacketConfig::default();
    config.buffer.max_capacity = i32::MAX as usize + 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max capacity too large")));
}

#[test]
fn test_rotation_range() {
    for rotation in [0u32, 8, 100] {
        let obfuscation = ObfuscationConfig::with_rotation(rotation);
        assert!(!obfuscation.validate().is_empty(), "rotation {rotation}");
    }
    for rotation in 1..=7 {
        assert!(ObfuscationConfig::with_rotation(rotation)
            .validate()
            .is_empty());
    }

    // Disabled obfuscation ignores the rotation
    let disabled = ObfuscationConfig {
        enabled: false,
        rotation: 0,
    };
    assert!(disabled.validate().is_empty());
    assert_eq!(disabled.active_rotation(), None);
}

#[test]
fn test_empty_app_name() {
    let mut config = PacketConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_validate_strict_collects_errors() {
    let config = PacketConfig::default_with_overrides(|c| {
        c.buffer.initial_capacity = 0;
        c.logging.app_name = String::new();
    });

    let err = config.validate_strict().expect_err("Should fail");
    let message = err.to_string();
    assert!(message.contains("Initial capacity"));
    assert!(message.contains("Application name"));
}

#[test]
fn test_from_toml() {
    let toml = r#"
        [buffer]
        initial_capacity = 64
        max_capacity = 65536
        insert_length_on_send = true
        byte_order = "big"

        [buffer.obfuscation]
        enabled = true
        rotation = 2

        [logging]
        app_name = "replay"
        log_level = "debug"
        json_format = true
    "#;

    let config = PacketConfig::from_toml(toml).expect("Should parse");
    assert_eq!(config.buffer.initial_capacity, 64);
    assert!(config.buffer.insert_length_on_send);
    assert_eq!(config.buffer.byte_order, ByteOrder::Big);
    assert_eq!(config.buffer.obfuscation.active_rotation(), Some(2));
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.validate().is_empty());
}

#[test]
fn test_from_toml_defaults_missing_sections() {
    let config = PacketConfig::from_toml("").expect("Empty config should parse");
    assert_eq!(config.buffer.initial_capacity, BufferConfig::default().initial_capacity);
    assert_eq!(config.logging.app_name, LoggingConfig::default().app_name);
}

#[test]
fn test_invalid_toml() {
    assert!(PacketConfig::from_toml("[buffer\ninitial_capacity = ").is_err());
    assert!(PacketConfig::from_toml("[logging]\napp_name = \"x\"\nlog_level = \"loud\"\njson_format = false").is_err());
}

#[test]
fn test_save_and_load_file() {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("test_packet_config_{id}.toml"));

    let config = PacketConfig::default_with_overrides(|c| {
        c.buffer.insert_length_on_send = true;
        c.buffer.byte_order = ByteOrder::Little;
    });
    config.save_to_file(&path).expect("Should save");

    let loaded = PacketConfig::from_file(&path).expect("Should load");
    assert!(loaded.buffer.insert_length_on_send);
    assert_eq!(loaded.buffer.byte_order, ByteOrder::Little);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_example_config_parses() {
    let example = PacketConfig::example_config();
    assert!(example.contains("initial_capacity"));
    PacketConfig::from_toml(&example).expect("Example should parse");
}

#[test]
fn test_from_env() {
    // All variables are set and removed inside this one test so no other
    // test observes them
    const VARS: [&str; 5] = [
        "PACKET_BUFFER_INITIAL_CAPACITY",
        "PACKET_BUFFER_MAX_CAPACITY",
        "PACKET_BUFFER_INSERT_LENGTH",
        "PACKET_BUFFER_BYTE_ORDER",
        "PACKET_BUFFER_ROTATION",
    ];
    let clear = || VARS.iter().for_each(|var| std::env::remove_var(var));
    clear();

    let config = PacketConfig::from_env().expect("Defaults without variables");
    assert!(!config.buffer.insert_length_on_send);
    assert_eq!(config.buffer.obfuscation.active_rotation(), None);

    std::env::set_var("PACKET_BUFFER_INITIAL_CAPACITY", "128");
    std::env::set_var("PACKET_BUFFER_MAX_CAPACITY", "4096");
    std::env::set_var("PACKET_BUFFER_INSERT_LENGTH", "true");
    std::env::set_var("PACKET_BUFFER_BYTE_ORDER", "network");
    std::env::set_var("PACKET_BUFFER_ROTATION", "5");
    let config = PacketConfig::from_env().expect("Should load from env");
    assert_eq!(config.buffer.initial_capacity, 128);
    assert_eq!(config.buffer.max_capacity, 4096);
    assert!(config.buffer.insert_length_on_send);
    assert_eq!(config.buffer.byte_order, ByteOrder::Big);
    assert!(config.buffer.obfuscation.enabled);
    assert_eq!(config.buffer.obfuscation.active_rotation(), Some(5));

    let invalid = [
        ("PACKET_BUFFER_BYTE_ORDER", "middle"),
        ("PACKET_BUFFER_INSERT_LENGTH", "yes"),
        ("PACKET_BUFFER_INITIAL_CAPACITY", "-1"),
        ("PACKET_BUFFER_MAX_CAPACITY", "lots"),
        ("PACKET_BUFFER_ROTATION", "three"),
    ];
    for (var, value) in invalid {
        clear();
        std::env::set_var(var, value);
        let err = PacketConfig::from_env().expect_err("Unparsable variable must fail");
        assert!(
            matches!(err, PacketError::ConfigError(ref msg) if msg.contains(var)),
            "{var}={value} gave {err:?}"
        );
    }

    clear();
}
