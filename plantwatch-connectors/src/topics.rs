//! Topic layout
//!
//! ```text
//! state:     <namespace>/<device_id>/<slug>/state
//! discovery: <discovery_prefix>/sensor/<device_id>/<slug>/config
//! ```
//!
//! With the default namespace `homeassistant/sensor` both topics share the
//! `homeassistant/sensor/<device_id>/<slug>/` stem.

use plantwatch_core::config::AgentConfig;

/// Topic builder bound to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    namespace: String,
    discovery_prefix: String,
    device_id: String,
}

impl Topics {
    /// Topics for `device_id` under the given prefixes
    pub fn new(
        namespace: impl Into<String>,
        discovery_prefix: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: trim(namespace.into()),
            discovery_prefix: trim(discovery_prefix.into()),
            device_id: device_id.into(),
        }
    }

    /// Where values for `slug` are published
    pub fn state(&self, slug: &str) -> String {
        format!("{}/{}/{}/state", self.namespace, self.device_id, slug)
    }

    /// Where the discovery config for `slug` is published
    pub fn config(&self, slug: &str) -> String {
        format!("{}/sensor/{}/{}/config", self.discovery_prefix, self.device_id, slug)
    }

    /// Device identifier
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl From<&AgentConfig> for Topics {
    fn from(config: &AgentConfig) -> Self {
        Self::new(
            config.topics.namespace.as_str(),
            config.topics.discovery_prefix.as_str(),
            config.device.id.as_str(),
        )
    }
}

fn trim(prefix: String) -> String {
    prefix.trim_end_matches('/').to_string()
}
