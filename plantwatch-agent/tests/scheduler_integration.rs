//! End-to-end runs of the scheduler over fake links and a fixed clock

mod common;

use plantwatch_agent::Scheduler;
use plantwatch_connectors::{BrokerCredentials, NetworkCredentials, TransportSession};
use plantwatch_core::traits::NoMemoryProbe;
use plantwatch_core::{MetricKind, SensorCapability};

use common::{three_sample_config, FakeBroker, FakeDisplay, FakeNetwork, Harness, SharedSensor};

#[test]
fn three_readings_publish_their_mean() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 20.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp.clone()], true);

    h.run_until(0);
    temp.set(21.0);
    h.run_until(6_000);
    temp.set(22.0);
    h.run_until(12_000);

    assert_eq!(h.broker.payloads(&Harness::state_topic("temperature")), vec!["21.0"]);
    assert_eq!(h.scheduler.stats().published, 1);
    assert_eq!(temp.reads(), 4); // probe + three samples
}

#[test]
fn soil_probe_is_calibrated_before_averaging() {
    let soil = SharedSensor::new("soil_moisture", MetricKind::SoilMoisture, 29_500.0);
    let mut h = Harness::new(&three_sample_config(), vec![soil], true);

    h.run_until(12_000);

    assert_eq!(h.broker.payloads(&Harness::state_topic("soil_moisture")), vec!["50.0"]);
}

#[test]
fn partial_window_is_never_published() {
    let lux = SharedSensor::new("bh1750", MetricKind::Illuminance, 300.0);
    let mut h = Harness::new(&three_sample_config(), vec![lux], true);

    h.run_until(11_500);

    assert!(h.broker.payloads(&Harness::state_topic("lux")).is_empty());
    assert_eq!(h.scheduler.aggregator().fill(MetricKind::Illuminance), 2);
}

#[test]
fn discovery_precedes_first_state() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 20.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], true);

    h.run_until(12_000);

    let config = h.broker.first_index(&Harness::config_topic("temperature")).unwrap();
    let state = h.broker.first_index(&Harness::state_topic("temperature")).unwrap();
    assert!(config < state);

    let messages = h.broker.messages();
    assert!(messages[config].retain);
    assert!(messages[state].retain);
}

#[test]
fn every_entity_announced_on_connect() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 20.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], true);

    h.run_until(0);

    for slug in ["temperature", "humidity", "lux", "soil_moisture", "status"] {
        assert_eq!(h.broker.payloads(&Harness::config_topic(slug)).len(), 1, "{slug}");
    }
}

#[test]
fn reconnect_reannounces_before_next_state() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 20.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], true);

    h.run_until(55_000);
    h.broker.kill_session();
    h.run_until(70_000);

    assert_eq!(h.broker.connects(), 2);
    let configs: Vec<_> = h
        .broker
        .messages()
        .into_iter()
        .filter(|m| m.topic == Harness::config_topic("temperature"))
        .collect();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].payload, configs[1].payload);

    // The 66 s window closes after the reconnect at 60.5 s
    let last_state = h
        .broker
        .messages()
        .into_iter()
        .filter(|m| m.topic == Harness::state_topic("temperature"))
        .last()
        .unwrap();
    assert!(configs[1].at < last_state.at);
}

#[test]
fn display_shows_placeholders_for_missing_metrics() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 21.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], true);

    h.run_until(12_000);

    assert_eq!(
        h.display.frame(),
        vec!["Lux: --", "Temp: 21.0C", "Humidity: --", "Moisture: --", "Online"]
    );
}

#[test]
fn display_drops_stale_values() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 21.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp.clone()], true);

    h.run_until(12_000);
    temp.fail(plantwatch_core::SensorError::Timeout);
    // Stale after three publish intervals (54 s)
    h.run_until(12_000 + 54_500);

    let lines = h.scheduler.display().compose("", h.now());
    assert_eq!(lines[1].as_str(), "Temp: --");
}

#[test]
fn housekeeping_probes_memory_every_minute() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 21.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], true);
    h.memory.free.set(Some(4 * 1024));

    h.run_until(120_000);

    assert_eq!(h.memory.probes.get(), 3);
}

#[test]
fn runs_without_display_or_memory_statistics() {
    let config = three_sample_config();
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 21.0);
    let broker = FakeBroker::default();
    let transport = TransportSession::new(
        FakeNetwork::default(),
        broker.clone(),
        NetworkCredentials::default(),
        BrokerCredentials::from(&config),
        config.transport,
    );
    let sensors = vec![Box::new(temp) as Box<dyn SensorCapability>];
    let mut scheduler = Scheduler::new(&config, sensors, transport, None::<FakeDisplay>, NoMemoryProbe)
        .unwrap_or_else(|e| panic!("scheduler rejected config: {e}"));

    for now in (0..=60_000).step_by(500) {
        scheduler.step(now);
    }

    assert!(!scheduler.display().has_display());
    assert_eq!(broker.payloads(&Harness::state_topic("temperature")).len(), 3);
}
