//! Device Status
//!
//! One line of health text, published to the status entity and shown on the
//! last display line. The first condition that holds wins:
//!
//! | Priority | Condition                                   | Text                      |
//! |----------|---------------------------------------------|---------------------------|
//! | 1        | network not associated                      | `WiFi Disconnected`       |
//! | 2        | broker session not established              | `MQTT Disconnected`       |
//! | 3        | no present sensor is working                | `All Sensors Failed`      |
//! | 4        | some present sensors are not working        | `Partial (w/t sensors)`   |
//! | 5        | no average published for `PUBLISH_TIMEOUT`  | `Publish Timeout`         |
//! | 6        | otherwise                                   | `Online`                  |

use std::fmt;

use plantwatch_core::constants::time::PUBLISH_TIMEOUT_MS;
use plantwatch_core::time::{elapsed, Timestamp};

/// Derived device health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Network layer down
    WifiDisconnected,
    /// Network up, broker session down
    MqttDisconnected,
    /// No sensor is delivering readings
    AllSensorsFailed,
    /// Some sensors are failing
    Partial {
        /// Present sensors below the failure threshold
        working: usize,
        /// Sensors detected at startup
        total: usize,
    },
    /// Connected, yet no average has been published for too long
    PublishTimeout,
    /// Everything nominal
    Online,
}

/// Snapshot the status is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInputs {
    /// Network layer is associated
    pub network_up: bool,
    /// Broker session is established
    pub broker_up: bool,
    /// Present sensors currently working
    pub working_sensors: usize,
    /// Sensors detected at startup
    pub total_sensors: usize,
    /// Last successful average publish, if any
    pub last_publish: Option<Timestamp>,
    /// When the agent started; stands in for the last publish until there is one
    pub started_at: Timestamp,
    /// Evaluation time
    pub now: Timestamp,
}

impl DeviceStatus {
    /// Apply the priority table
    pub fn evaluate(inputs: &StatusInputs) -> Self {
        if !inputs.network_up {
            return DeviceStatus::WifiDisconnected;
        }
        if !inputs.broker_up {
            return DeviceStatus::MqttDisconnected;
        }
        if inputs.working_sensors == 0 {
            return DeviceStatus::AllSensorsFailed;
        }
        if inputs.working_sensors < inputs.total_sensors {
            return DeviceStatus::Partial {
                working: inputs.working_sensors,
                total: inputs.total_sensors,
            };
        }

        let reference = inputs.last_publish.unwrap_or(inputs.started_at);
        if elapsed(reference, inputs.now) > PUBLISH_TIMEOUT_MS {
            return DeviceStatus::PublishTimeout;
        }

        DeviceStatus::Online
    }

    /// Whether this status means the device is fully healthy
    pub fn is_online(&self) -> bool {
        matches!(self, DeviceStatus::Online)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::WifiDisconnected => f.write_str("WiFi Disconnected"),
            DeviceStatus::MqttDisconnected => f.write_str("MQTT Disconnected"),
            DeviceStatus::AllSensorsFailed => f.write_str("All Sensors Failed"),
            DeviceStatus::Partial { working, total } => write!(f, "Partial ({}/{} sensors)", working, total),
            DeviceStatus::PublishTimeout => f.write_str("Publish Timeout"),
            DeviceStatus::Online => f.write_str("Online"),
        }
    }
}
