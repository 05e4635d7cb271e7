//! Configuration for the VRCar binary
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! on either end of the session. Every field has a built-in default so the
//! binary runs without a config file at all.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default camera stream port
pub const DEFAULT_CAMERA_PORT: u16 = 12_345;

/// Default control channel port
pub const DEFAULT_CONTROLS_PORT: u16 = 23_456;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration (both ports, shared by server and client modes)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Camera stream port (robot listens, console connects)
    #[serde(default = "default_camera_port")]
    pub camera_port: u16,
    /// Control channel port (robot listens, console connects)
    #[serde(default = "default_controls_port")]
    pub controls_port: u16,
}

/// Hardware backend selection (robot side)
///
/// `mock` backends run without hardware; real capture and PWM hardware sit
/// behind the [`crate::robot::camera::CaptureSource`] and
/// [`crate::robot::pwm::PwmDriver`] traits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Capture backend ("mock")
    #[serde(default = "default_backend")]
    pub capture: String,
    /// PWM backend for motors and servos ("mock")
    #[serde(default = "default_backend")]
    pub pwm: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log filter (trace, debug, info, warn, error);
    /// `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_camera_port() -> u16 {
    DEFAULT_CAMERA_PORT
}

fn default_controls_port() -> u16 {
    DEFAULT_CONTROLS_PORT
}

fn default_backend() -> String {
    "mock".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            camera_port: DEFAULT_CAMERA_PORT,
            controls_port: DEFAULT_CONTROLS_PORT,
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            capture: default_backend(),
            pwm: default_backend(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network.camera_port, 12_345);
        assert_eq!(config.network.controls_port, 23_456);
        assert_eq!(config.hardware.capture, "mock");
        assert_eq!(config.hardware.pwm, "mock");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[network]
camera_port = 15000
controls_port = 15001

[hardware]
capture = "mock"
pwm = "mock"

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.camera_port, 15000);
        assert_eq!(config.network.controls_port, 15001);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[network]\ncamera_port = 9000\n").unwrap();
        assert_eq!(config.network.camera_port, 9000);
        assert_eq!(config.network.controls_port, 23_456);
        assert_eq!(config.hardware.pwm, "mock");
    }
}
