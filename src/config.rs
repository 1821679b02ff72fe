//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub inputs: InputsConfig,

    #[serde(default)]
    pub pins: PinConfig,

    #[serde(default)]
    pub led: LedConfig,

    #[serde(default)]
    pub adc: AdcConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_max_connections() -> usize {
    32
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Digital input sampling
#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_debounce() -> u64 {
    50
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            debounce_ms: default_debounce(),
        }
    }
}

impl InputsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// BCM pin assignments
#[derive(Debug, Clone, Deserialize)]
pub struct PinConfig {
    #[serde(default = "default_led_pin")]
    pub led: u8,

    #[serde(default = "default_like_pin")]
    pub like_button: u8,

    #[serde(default = "default_map_pin")]
    pub map_toggle: u8,

    #[serde(default = "default_metadata_pin")]
    pub metadata_toggle: u8,

    #[serde(default = "default_message_pin")]
    pub message_button: u8,
}

fn default_led_pin() -> u8 {
    17
}

fn default_like_pin() -> u8 {
    18
}

fn default_map_pin() -> u8 {
    27
}

fn default_metadata_pin() -> u8 {
    22
}

fn default_message_pin() -> u8 {
    23
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            led: default_led_pin(),
            like_button: default_like_pin(),
            map_toggle: default_map_pin(),
            metadata_toggle: default_metadata_pin(),
            message_button: default_message_pin(),
        }
    }
}

impl PinConfig {
    /// All assignments as (role, pin), LED first
    pub fn assignments(&self) -> [(&'static str, u8); 5] {
        [
            ("led", self.led),
            ("like_button", self.like_button),
            ("map_toggle", self.map_toggle),
            ("metadata_toggle", self.metadata_toggle),
            ("message_button", self.message_button),
        ]
    }
}

/// LED output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedConfig {
    #[serde(default = "default_pwm_frequency")]
    pub pwm_frequency_hz: f64,
}

fn default_pwm_frequency() -> f64 {
    1000.0
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: default_pwm_frequency(),
        }
    }
}

/// ADS1115 zoom dial configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdcConfig {
    #[serde(default = "default_adc_enabled")]
    pub enabled: bool,

    #[serde(default = "default_i2c_address")]
    pub i2c_address: u8,

    #[serde(default)]
    pub channel: u8,

    #[serde(default = "default_poll_rate")]
    pub poll_rate_hz: f64,

    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
}

fn default_adc_enabled() -> bool {
    true
}

fn default_i2c_address() -> u8 {
    0x48
}

fn default_poll_rate() -> f64 {
    10.0
}

fn default_change_threshold() -> f64 {
    0.02
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            enabled: default_adc_enabled(),
            i2c_address: default_i2c_address(),
            channel: 0,
            poll_rate_hz: default_poll_rate(),
            change_threshold: default_change_threshold(),
        }
    }
}

/// Sampling rates accepted for the zoom dial
pub const ADC_POLL_RATE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=1000.0;

impl AdcConfig {
    /// Sampling period, never shorter than 1 ms
    ///
    /// Rates that do not give a representable period fall back to the default.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.poll_rate_hz)
            .unwrap_or_else(|_| Duration::from_secs_f64(1.0 / default_poll_rate()))
            .max(Duration::from_millis(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("portal-bridge").join("config.toml")),
            Some(PathBuf::from("/etc/portal-bridge/config.toml")),
            Some(PathBuf::from("./portal-bridge.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<u8, &str> = HashMap::new();
        for (role, pin) in self.pins.assignments() {
            if let Some(other) = seen.insert(pin, role) {
                return Err(ConfigError::Invalid(format!(
                    "GPIO {} assigned to both {} and {}",
                    pin, other, role
                )));
            }
        }

        if self.server.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "server.max_connections must be at least 1".to_string(),
            ));
        }

        if !(self.led.pwm_frequency_hz.is_finite() && self.led.pwm_frequency_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "led.pwm_frequency_hz must be a positive finite number, got {}",
                self.led.pwm_frequency_hz
            )));
        }

        if self.adc.channel > 3 {
            return Err(ConfigError::Invalid(format!(
                "adc.channel must be 0-3, got {}",
                self.adc.channel
            )));
        }
        if !ADC_POLL_RATE_RANGE.contains(&self.adc.poll_rate_hz) {
            return Err(ConfigError::Invalid(format!(
                "adc.poll_rate_hz must be within {}-{}, got {}",
                ADC_POLL_RATE_RANGE.start(),
                ADC_POLL_RATE_RANGE.end(),
                self.adc.poll_rate_hz
            )));
        }
        if !(self.adc.change_threshold > 0.0 && self.adc.change_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "adc.change_threshold must be in (0, 1], got {}",
                self.adc.change_threshold
            )));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                other
            ))),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PORTAL_WS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORTAL_WS_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(enabled) = std::env::var("PORTAL_ADC_ENABLED") {
            self.adc.enabled = enabled.to_lowercase() != "false" && enabled != "0";
        }

        if let Ok(level) = std::env::var("PORTAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PORTAL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Photo Portal GPIO bridge configuration
#
# Environment variables override these settings:
# - PORTAL_WS_HOST
# - PORTAL_WS_PORT
# - PORTAL_ADC_ENABLED
# - PORTAL_LOG_LEVEL
# - PORTAL_LOG_FORMAT

[server]
# WebSocket bind address (the webapp connects to ws://localhost:8765)
host = "127.0.0.1"
port = 8765

# Maximum simultaneous WebSocket clients
max_connections = 32

[inputs]
# How often each input pin is sampled (ms)
poll_interval_ms = 5

# A level must hold this long before it counts as a change (ms)
debounce_ms = 50

[pins]
# BCM numbering. All inputs are pulled up and active low.
led = 17
like_button = 18
map_toggle = 27
metadata_toggle = 22
message_button = 23

[led]
# Software PWM frequency for LED dimming
pwm_frequency_hz = 1000.0

[adc]
# ADS1115 on /dev/i2c-1 reading the zoom potentiometer
enabled = true
i2c_address = 0x48
channel = 0

# Samples per second (0.1-1000)
poll_rate_hz = 10.0

# Minimum change (fraction of full range) before a ZOOM_DIAL event is sent
change_threshold = 0.02

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
