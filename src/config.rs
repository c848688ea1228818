//! # Configuration Management
//!
//! Centralized configuration for packet buffers.
//!
//! Everything the buffer used to read from process-wide statics (whether a
//! length prefix goes in front of sent data, the obfuscation rotation) is a
//! per-instance setting here, passed at construction.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment variables via `from_env()`

use crate::core::byte_order::ByteOrder;
use crate::error::{constants, PacketError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default capacity of each region when a buffer is created or reset
pub const DEFAULT_INITIAL_CAPACITY: usize = 512;

/// Max allowed region size (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default bit rotation used by the obfuscation layer
pub const DEFAULT_ROTATION: u32 = 3;

/// Width of the length prefix written by sized writes and send framing
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PacketConfig {
    /// Buffer configuration
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PacketConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| PacketError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| PacketError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| PacketError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; a variable that is set but does
    /// not parse is a `ConfigError`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(val) = env_value::<usize>("PACKET_BUFFER_INITIAL_CAPACITY")? {
            config.buffer.initial_capacity = val;
        }

        if let Some(val) = env_value::<usize>("PACKET_BUFFER_MAX_CAPACITY")? {
            config.buffer.max_capacity = val;
        }

        if let Some(val) = env_value::<bool>("PACKET_BUFFER_INSERT_LENGTH")? {
            config.buffer.insert_length_on_send = val;
        }

        if let Some(val) = env_value::<ByteOrder>("PACKET_BUFFER_BYTE_ORDER")? {
            config.buffer.byte_order = val;
        }

        if let Some(val) = env_value::<u32>("PACKET_BUFFER_ROTATION")? {
            config.buffer.obfuscation.enabled = true;
            config.buffer.obfuscation.rotation = val;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PacketError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| PacketError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.buffer.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
    }
}

fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| PacketError::ConfigError(format!("Invalid {name}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Per-buffer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Capacity reserved for each region on creation and on `reset()`
    pub initial_capacity: usize,

    /// Hard upper bound for either region; growth past it fails
    pub max_capacity: usize,

    /// Put a 4-byte length in front of the outbound bytes when framing a send
    pub insert_length_on_send: bool,

    /// Byte order for every fixed-width value, length prefixes included
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// Rotation obfuscation applied on send and reversed on receive
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: MAX_PAYLOAD_SIZE,
            insert_length_on_send: false,
            byte_order: ByteOrder::Native,
            obfuscation: ObfuscationConfig::default(),
        }
    }
}

impl BufferConfig {
    /// Validate buffer configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.initial_capacity == 0 {
            errors.push(constants::ERR_ZERO_INITIAL_CAPACITY.to_string());
        }

        if self.max_capacity < LENGTH_PREFIX_SIZE {
            errors.push(format!(
                "Max capacity too small: {} (minimum: {LENGTH_PREFIX_SIZE})",
                self.max_capacity
            ));
        } else if self.max_capacity > i32::MAX as usize {
            errors.push(format!(
                "Max capacity too large: {} (must fit a 4-byte length prefix)",
                self.max_capacity
            ));
        }

        if self.initial_capacity > self.max_capacity {
            errors.push(constants::ERR_CAPACITY_ORDER.to_string());
        }

        errors.extend(self.obfuscation.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
    }
}

/// Obfuscation settings
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ObfuscationConfig {
    /// Whether send framing obscures bytes and receive framing restores them
    pub enabled: bool,

    /// Bits each byte is rotated by
    pub rotation: u32,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rotation: DEFAULT_ROTATION,
        }
    }
}

impl ObfuscationConfig {
    /// Enabled obfuscation with the given rotation
    pub fn with_rotation(rotation: u32) -> Self {
        Self {
            enabled: true,
            rotation,
        }
    }

    /// Rotation to apply, or `None` when obfuscation is off
    pub fn active_rotation(&self) -> Option<u32> {
        self.enabled.then_some(self.rotation)
    }

    /// Validate obfuscation configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // A rotation of 0 or 8 is the identity on a byte
        if self.enabled && !(1..=7).contains(&self.rotation) {
            errors.push(format!(
                "{}: got {}",
                constants::ERR_ROTATION_RANGE,
                self.rotation
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-buffer"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

fn strict(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PacketError::ConfigError(format!(
            "Configuration validation failed:\n  - {}",
            errors.join("\n  - ")
        )))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
