//! plantwatch host binary
//!
//! ```bash
//! RUST_LOG=debug plantwatch ./plantwatch.json
//! ```

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use plantwatch_agent::host::{simulated_sensors, ConsoleDisplay, HostMemoryProbe, HostNetwork};
use plantwatch_agent::{ConfigSource, Scheduler};
use plantwatch_connectors::{BrokerCredentials, MqttBrokerLink, NetworkCredentials, TransportSession};
use plantwatch_core::time::MonotonicTime;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let source = ConfigSource::from_env();
    let config = source
        .load()
        .with_context(|| format!("loading configuration from {}", source.path().display()))?;

    log::info!(
        "plantwatch {} starting as {} ({}:{})",
        plantwatch_core::VERSION, config.device.id, config.broker.host, config.broker.port
    );

    let network_credentials = config
        .wifi
        .as_ref()
        .map(NetworkCredentials::from)
        .unwrap_or_default();
    let transport = TransportSession::new(
        HostNetwork::new(),
        MqttBrokerLink::new(),
        network_credentials,
        BrokerCredentials::from(&config),
        config.transport,
    );

    let mut scheduler = Scheduler::new(
        &config,
        simulated_sensors(),
        transport,
        Some(ConsoleDisplay::new()),
        HostMemoryProbe,
    )
    .context("building scheduler")?;

    let clock = MonotonicTime::new();
    scheduler.run(&clock, |ms| thread::sleep(Duration::from_millis(ms)))
}
