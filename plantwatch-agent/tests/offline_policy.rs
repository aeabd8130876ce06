//! Handling of readings while the broker is unreachable

mod common;

use plantwatch_core::{MetricKind, OfflinePolicy};

use common::{three_sample_config, Harness, SharedSensor};

/// 10 °C while connected, 100 °C during an outage from 54.5 s to 90 s,
/// 20 °C afterwards. The broker accepts again from 89.5 s; the fifth
/// connect attempt of the cycle lands at 90.5 s.
fn outage(policy: OfflinePolicy) -> Harness {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 10.0);
    let config = three_sample_config().with_offline_policy(policy);
    let mut h = Harness::new(&config, vec![temp.clone()], true);

    h.run_until(54_000);
    temp.set(100.0);
    h.broker.kill_session();
    h.broker.refuse_connects(true);
    h.run_until(89_500);
    h.broker.refuse_connects(false);
    h.run_until(90_000);
    temp.set(20.0);
    h.run_until(120_000);
    h
}

#[test]
fn discard_keeps_averaging_and_drops_publishes() {
    let h = outage(OfflinePolicy::Discard);

    // 70.0 and 100.0 closed while offline; the first window after the
    // reconnect still holds the 100 °C sample taken at 90 s
    assert_eq!(
        h.broker.payloads(&Harness::state_topic("temperature")),
        vec!["10.0", "10.0", "10.0", "46.7", "20.0"]
    );
    assert_eq!(h.scheduler.stats().dropped, 2);
    assert_eq!(h.scheduler.stats().paused_ticks, 0);
}

#[test]
fn pause_discards_in_flight_windows() {
    let h = outage(OfflinePolicy::Pause);

    assert_eq!(
        h.broker.payloads(&Harness::state_topic("temperature")),
        vec!["10.0", "10.0", "10.0", "20.0"]
    );
    assert_eq!(h.scheduler.stats().dropped, 0);
    // 60, 66, 72, 78, 84 and 90 s
    assert_eq!(h.scheduler.stats().paused_ticks, 6);
}

#[test]
fn offline_from_start_still_drives_display() {
    let temp = SharedSensor::new("dht11", MetricKind::Temperature, 21.0);
    let mut h = Harness::new(&three_sample_config(), vec![temp], false);

    h.run_until(12_000);

    assert!(h.broker.messages().is_empty());
    assert_eq!(h.scheduler.stats().dropped, 1);
    let frame = h.display.frame();
    assert_eq!(frame[1], "Temp: 21.0C");
    assert_eq!(frame[4], "MQTT Disconnected");
}
