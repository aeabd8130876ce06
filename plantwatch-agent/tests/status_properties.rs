//! Priority properties of the device status

use plantwatch_agent::{DeviceStatus, StatusInputs};
use proptest::prelude::*;

fn inputs() -> impl Strategy<Value = StatusInputs> {
    (
        any::<bool>(),
        any::<bool>(),
        0usize..4,
        proptest::option::of(0u64..1_000_000),
        0u64..1_000_000,
        0u64..1_000_000,
    )
        .prop_flat_map(|(network_up, broker_up, total, last_publish, started_at, span)| {
            (0..=total).prop_map(move |working| StatusInputs {
                network_up,
                broker_up,
                working_sensors: working,
                total_sensors: total,
                last_publish,
                started_at,
                now: started_at.max(last_publish.unwrap_or(0)) + span,
            })
        })
}

proptest! {
    #[test]
    fn network_down_wins(inputs in inputs()) {
        let down = StatusInputs { network_up: false, ..inputs };
        prop_assert_eq!(DeviceStatus::evaluate(&down), DeviceStatus::WifiDisconnected);
    }

    #[test]
    fn online_only_when_everything_holds(inputs in inputs()) {
        if DeviceStatus::evaluate(&inputs).is_online() {
            prop_assert!(inputs.network_up && inputs.broker_up);
            prop_assert!(inputs.working_sensors > 0);
            prop_assert_eq!(inputs.working_sensors, inputs.total_sensors);
        }
    }

    #[test]
    fn partial_reports_counts(inputs in inputs()) {
        if let DeviceStatus::Partial { working, total } = DeviceStatus::evaluate(&inputs) {
            prop_assert!(working > 0 && working < total);
            prop_assert_eq!(
                DeviceStatus::evaluate(&inputs).to_string(),
                format!("Partial ({}/{} sensors)", working, total)
            );
        }
    }
}
