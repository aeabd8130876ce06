//! Agent Configuration
//!
//! Everything deployment-specific: credentials, broker address, calibration,
//! cadences and identifiers. The pipeline treats the result as a set of
//! constants injected once at startup.
//!
//! ## Loading
//!
//! Every field has a default matching the reference deployment, so a config
//! file only needs to name what differs:
//!
//! ```json
//! {
//!   "wifi": { "ssid": "greenhouse", "password": "hunter2" },
//!   "broker": { "host": "192.168.1.100", "username": "plant", "password": "secret" },
//!   "calibration": { "dry": 41000, "wet": 18000 }
//! }
//! ```
//!
//! ## Validation
//!
//! [`AgentConfig::validate`] runs once before the main loop. Any error is
//! fatal: an inverted calibration would silently publish inverted moisture
//! for the lifetime of the process, which is worse than not starting.

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::aggregator::window_size;
use crate::calibration::CalibrationRange;
use crate::constants::buffers::MAX_WINDOW_CAPACITY;
use crate::constants::sensors::{DEFAULT_SOIL_DRY_REFERENCE, DEFAULT_SOIL_WET_REFERENCE};
use crate::constants::time::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS, DEFAULT_CONNECT_ATTEMPTS,
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_COOLDOWN_MS, DEFAULT_HOUSEKEEPING_INTERVAL_MS,
    DEFAULT_KEEP_ALIVE_SECS, DEFAULT_PUBLISH_INTERVAL_MS, DEFAULT_SAMPLE_INTERVAL_MS,
    DEFAULT_STATUS_INTERVAL_MS, STALE_AFTER_PUBLISH_INTERVALS,
};
use crate::errors::ConfigError;

/// What to do with readings while the broker is unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflinePolicy {
    /// Keep sampling and averaging; averages update the display and their
    /// publishes are dropped
    #[default]
    Discard,
    /// Stop feeding windows until the broker is back, and discard in-flight
    /// windows when the connection drops
    Pause,
}

/// Complete agent configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Wireless network; `None` where the platform owns the link
    pub wifi: Option<WifiConfig>,
    /// MQTT broker
    pub broker: BrokerConfig,
    /// Identity announced to the hub
    pub device: DeviceConfig,
    /// Soil probe reference points
    pub calibration: CalibrationConfig,
    /// Scheduler cadences
    pub timing: TimingConfig,
    /// Connection retry budget
    pub transport: RetryConfig,
    /// Topic layout
    pub topics: TopicConfig,
    /// Handling of readings while disconnected
    pub offline_policy: OfflinePolicy,
}

/// Wireless network credentials
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Network name
    pub ssid: String,
    /// Pre-shared key, empty for open networks
    pub password: String,
}

/// Broker address and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Username, empty for anonymous brokers
    pub username: String,
    /// Password, requires `username`
    pub password: String,
    /// MQTT client identifier
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".to_string(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            client_id: "pico_w_sensor_01".to_string(),
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
        }
    }
}

/// Device identity, grouped as one device on the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Stable identifier; part of every topic and unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Manufacturer string
    pub manufacturer: String,
    /// Model string
    pub model: String,
    /// Firmware version string
    pub sw_version: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: "pico_w_01".to_string(),
            name: "Pico W Plant Sensor".to_string(),
            manufacturer: "Raspberry Pi".to_string(),
            model: "Raspberry Pi Pico W".to_string(),
            sw_version: crate::VERSION.to_string(),
        }
    }
}

/// Soil probe reference points (raw ADC counts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Reading in completely dry soil
    pub dry: u32,
    /// Reading in saturated soil
    pub wet: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            dry: DEFAULT_SOIL_DRY_REFERENCE,
            wet: DEFAULT_SOIL_WET_REFERENCE,
        }
    }
}

/// Scheduler cadences in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Between sensor reads
    pub sample_interval_ms: u64,
    /// Between averaged publishes; divided by the sample interval gives the window size
    pub publish_interval_ms: u64,
    /// Between periodic device status publishes
    pub status_interval_ms: u64,
    /// Between liveness probes and resource checks
    pub housekeeping_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            housekeeping_interval_ms: DEFAULT_HOUSEKEEPING_INTERVAL_MS,
        }
    }
}

impl TimingConfig {
    /// Age after which a displayed average is replaced by a placeholder
    pub fn stale_after_ms(&self) -> u64 {
        self.publish_interval_ms.saturating_mul(STALE_AFTER_PUBLISH_INTERVALS)
    }
}

/// Bounded reconnection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Connect attempts per cycle before giving up
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub backoff_base_ms: u64,
    /// Upper bound on the delay between attempts
    pub backoff_max_ms: u64,
    /// Pause after a cycle exhausts its attempts
    pub cooldown_ms: u64,
    /// Bound on one broker handshake
    pub connect_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CONNECT_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, given `attempt` failures so far
    ///
    /// `base * 2^(attempt - 1)`, capped at `backoff_max_ms`.
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(31);
        self.backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.backoff_max_ms)
    }
}

/// Topic layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Prefix of state topics: `<namespace>/<device>/<metric>/state`
    pub namespace: String,
    /// Prefix the hub watches for discovery configs
    pub discovery_prefix: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            namespace: "homeassistant/sensor".to_string(),
            discovery_prefix: "homeassistant".to_string(),
        }
    }
}

impl AgentConfig {
    /// Set the device identifier
    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device.id = id.into();
        self
    }

    /// Set broker host and port
    pub fn with_broker(mut self, host: impl Into<String>, port: u16) -> Self {
        self.broker.host = host.into();
        self.broker.port = port;
        self
    }

    /// Set broker credentials
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.broker.username = username.into();
        self.broker.password = password.into();
        self
    }

    /// Set soil probe references
    pub fn with_calibration(mut self, dry: u32, wet: u32) -> Self {
        self.calibration = CalibrationConfig { dry, wet };
        self
    }

    /// Set sample and publish cadences
    pub fn with_intervals(mut self, sample_interval_ms: u64, publish_interval_ms: u64) -> Self {
        self.timing.sample_interval_ms = sample_interval_ms;
        self.timing.publish_interval_ms = publish_interval_ms;
        self
    }

    /// Set the offline policy
    pub fn with_offline_policy(mut self, policy: OfflinePolicy) -> Self {
        self.offline_policy = policy;
        self
    }

    /// Check every setting once; any error is fatal at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(wifi) = &self.wifi {
            require(&wifi.ssid, "wifi.ssid")?;
        }

        require(&self.broker.host, "broker.host")?;
        require(&self.broker.client_id, "broker.client_id")?;
        if !self.broker.password.is_empty() {
            require(&self.broker.username, "broker.username")?;
        }
        if self.broker.port == 0 {
            return Err(ConfigError::MissingCredential { field: "broker.port" });
        }

        require(&self.device.id, "device.id")?;
        require(&self.topics.namespace, "topics.namespace")?;
        require(&self.topics.discovery_prefix, "topics.discovery_prefix")?;

        self.calibration_range()?;
        self.window_size()?;

        if self.timing.status_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval {
                reason: "status interval must be positive",
            });
        }
        if self.timing.housekeeping_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval {
                reason: "housekeeping interval must be positive",
            });
        }

        let retry = &self.transport;
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "at least one connect attempt is required",
            });
        }
        if retry.backoff_max_ms < retry.backoff_base_ms {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "maximum backoff is below base backoff",
            });
        }
        if retry.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "connect timeout must be positive",
            });
        }

        Ok(())
    }

    /// Validated calibration
    pub fn calibration_range(&self) -> Result<CalibrationRange, ConfigError> {
        CalibrationRange::new(self.calibration.dry, self.calibration.wet)
    }

    /// Samples per averaging window
    pub fn window_size(&self) -> Result<usize, ConfigError> {
        let size = window_size(self.timing.sample_interval_ms, self.timing.publish_interval_ms)?;
        if size > MAX_WINDOW_CAPACITY {
            return Err(ConfigError::WindowTooLarge {
                requested: size,
                capacity: MAX_WINDOW_CAPACITY,
            });
        }
        Ok(size)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingCredential { field })
    } else {
        Ok(())
    }
}
