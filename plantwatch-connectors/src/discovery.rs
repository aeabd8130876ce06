//! Home Assistant MQTT Discovery
//!
//! ## Overview
//!
//! Each reported quantity becomes a Home Assistant entity by publishing a
//! retained JSON config to
//! `<discovery_prefix>/sensor/<device_id>/<slug>/config`. All entities carry
//! the same `device` block, so the hub groups them under one device.
//!
//! ```json
//! {
//!   "name": "Soil Moisture",
//!   "state_topic": "homeassistant/sensor/pico_w_01/soil_moisture/state",
//!   "unique_id": "pico_w_01_soil_moisture",
//!   "device": {
//!     "identifiers": ["pico_w_01"],
//!     "name": "Pico W Plant Sensor",
//!     "manufacturer": "Raspberry Pi",
//!     "model": "Raspberry Pi Pico W",
//!     "sw_version": "0.1.0"
//!   },
//!   "force_update": true,
//!   "device_class": "moisture",
//!   "unit_of_measurement": "%",
//!   "state_class": "measurement"
//! }
//! ```
//!
//! ## Idempotence
//!
//! Unique ids are `<device_id>_<slug>`, never random, so re-announcing after
//! a reconnect updates the existing entities instead of creating new ones.
//! Within one broker session the publisher also remembers what it already
//! sent and skips repeats; [`DiscoveryPublisher::begin_session`] forgets
//! that, because a fresh session may be talking to a restarted broker that
//! lost its retained messages.

use std::collections::BTreeSet;

use serde::Serialize;

use plantwatch_core::config::{AgentConfig, DeviceConfig};
use plantwatch_core::MetricKind;

use crate::error::TransportError;
use crate::link::Publish;
use crate::topics::Topics;

/// Icon of the device status entity
pub const STATUS_ICON: &str = "mdi:check-circle";

/// A discoverable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityKind {
    /// One averaged measurement
    Metric(MetricKind),
    /// Device health text
    Status,
}

impl EntityKind {
    /// Every entity the agent announces, metrics first
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Metric(MetricKind::Temperature),
        EntityKind::Metric(MetricKind::Humidity),
        EntityKind::Metric(MetricKind::Illuminance),
        EntityKind::Metric(MetricKind::SoilMoisture),
        EntityKind::Status,
    ];

    /// Topic and unique id segment
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Metric(kind) => kind.slug(),
            EntityKind::Status => "status",
        }
    }

    /// Entity display name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Metric(kind) => kind.display_name(),
            EntityKind::Status => "Device Status",
        }
    }

    fn device_class(&self) -> Option<&'static str> {
        match self {
            EntityKind::Metric(kind) => Some(kind.device_class()),
            EntityKind::Status => None,
        }
    }

    fn unit(&self) -> Option<&'static str> {
        match self {
            EntityKind::Metric(kind) => Some(kind.unit()),
            EntityKind::Status => None,
        }
    }

    fn state_class(&self) -> Option<&'static str> {
        match self {
            EntityKind::Metric(_) => Some("measurement"),
            EntityKind::Status => None,
        }
    }

    fn icon(&self) -> Option<&'static str> {
        match self {
            EntityKind::Metric(_) => None,
            EntityKind::Status => Some(STATUS_ICON),
        }
    }
}

/// Device block shared by every entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Identifiers the hub groups entities by
    pub identifiers: [String; 1],
    /// Device display name
    pub name: String,
    /// Manufacturer
    pub manufacturer: String,
    /// Model
    pub model: String,
    /// Firmware version
    pub sw_version: String,
}

impl From<&DeviceConfig> for DeviceInfo {
    fn from(device: &DeviceConfig) -> Self {
        Self {
            identifiers: [device.id.clone()],
            name: device.name.clone(),
            manufacturer: device.manufacturer.clone(),
            model: device.model.clone(),
            sw_version: device.sw_version.clone(),
        }
    }
}

/// Wire form of a discovery config
#[derive(Debug, Serialize)]
pub struct DiscoveryPayload<'a> {
    /// Entity name
    pub name: &'a str,
    /// Where values are published
    pub state_topic: &'a str,
    /// `<device_id>_<slug>`
    pub unique_id: &'a str,
    /// Shared device block
    pub device: &'a DeviceInfo,
    /// Record every value, even unchanged ones
    pub force_update: bool,
    /// Home Assistant device class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'a str>,
    /// Unit of the state value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'a str>,
    /// Enables long-term statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<&'a str>,
    /// Only for entities without a device class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
}

/// Everything needed to announce one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    /// Which entity this describes
    pub entity: EntityKind,
    /// `<device_id>_<slug>`
    pub unique_id: String,
    /// State topic of the entity
    pub state_topic: String,
    /// Topic the config is published to
    pub config_topic: String,
    /// Shared device block
    pub device: DeviceInfo,
}

impl DiscoveryRecord {
    /// Record for `entity` of the device described by `device`
    pub fn new(entity: EntityKind, device: DeviceInfo, topics: &Topics) -> Self {
        let slug = entity.slug();
        Self {
            entity,
            unique_id: format!("{}_{}", topics.device_id(), slug),
            state_topic: topics.state(slug),
            config_topic: topics.config(slug),
            device,
        }
    }

    /// Borrowed wire form
    pub fn payload(&self) -> DiscoveryPayload<'_> {
        DiscoveryPayload {
            name: self.entity.name(),
            state_topic: &self.state_topic,
            unique_id: &self.unique_id,
            device: &self.device,
            force_update: true,
            device_class: self.entity.device_class(),
            unit_of_measurement: self.entity.unit(),
            state_class: self.entity.state_class(),
            // Home Assistant derives the icon from the device class otherwise
            icon: self.entity.icon().filter(|_| self.entity.device_class().is_none()),
        }
    }

    /// Encoded config
    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(&self.payload())?)
    }
}

/// Announces entities, at most once per broker session each
#[derive(Debug, Clone)]
pub struct DiscoveryPublisher {
    records: Vec<DiscoveryRecord>,
    announced: BTreeSet<String>,
}

impl DiscoveryPublisher {
    /// Publisher for the given records
    pub fn new(records: Vec<DiscoveryRecord>) -> Self {
        Self { records, announced: BTreeSet::new() }
    }

    /// Records for every metric plus the status entity
    pub fn from_config(config: &AgentConfig) -> Self {
        let topics = Topics::from(config);
        let device = DeviceInfo::from(&config.device);
        let records = EntityKind::ALL
            .iter()
            .map(|entity| DiscoveryRecord::new(*entity, device.clone(), &topics))
            .collect();
        Self::new(records)
    }

    /// Forget what was announced; call on every new broker session
    pub fn begin_session(&mut self) {
        self.announced.clear();
    }

    /// Publish the config for `entity` unless already done this session
    pub fn announce<P: Publish>(&mut self, link: &mut P, entity: EntityKind) -> Result<(), TransportError> {
        let record = self
            .records
            .iter()
            .find(|r| r.entity == entity)
            .ok_or(TransportError::UnknownEntity(entity.slug()))?;

        if self.announced.contains(&record.unique_id) {
            return Ok(());
        }

        let payload = record.to_json()?;
        link.publish(&record.config_topic, payload.as_bytes(), true)?;
        log::info!("announced {} as {}", entity.slug(), record.unique_id);
        self.announced.insert(record.unique_id.clone());
        Ok(())
    }

    /// Announce every record; stops at the first failure
    ///
    /// Returns how many configs were published in this call.
    pub fn announce_all<P: Publish>(&mut self, link: &mut P) -> Result<usize, TransportError> {
        let before = self.announced.len();
        let entities: Vec<EntityKind> = self.records.iter().map(|r| r.entity).collect();
        for entity in entities {
            self.announce(link, entity)?;
        }
        Ok(self.announced.len() - before)
    }

    /// Make sure `entity` is announced before its first state publish
    pub fn ensure_announced<P: Publish>(&mut self, link: &mut P, entity: EntityKind) -> Result<(), TransportError> {
        self.announce(link, entity)
    }

    /// Whether `entity` was announced in the current session
    pub fn is_announced(&self, entity: EntityKind) -> bool {
        self.record(entity)
            .map_or(false, |r| self.announced.contains(&r.unique_id))
    }

    /// Record of `entity`
    pub fn record(&self, entity: EntityKind) -> Option<&DiscoveryRecord> {
        self.records.iter().find(|r| r.entity == entity)
    }

    /// All records
    pub fn records(&self) -> &[DiscoveryRecord] {
        &self.records
    }
}
