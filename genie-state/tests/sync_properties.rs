//! Property tests for device table synchronisation

use std::sync::Arc;

use genie_api::{Device, DeviceId, DeviceMap, Light, Music};
use genie_state::{DeviceSyncEngine, StateError};
use proptest::prelude::*;

fn device_strategy() -> impl Strategy<Value = Device> {
    prop_oneof![
        (any::<bool>(), 1u32..=100).prop_map(|(on, brightness)| Device::Light(Light {
            name: "Light".to_string(),
            on,
            brightness,
            color: "#FFFFFF".to_string(),
        })),
        (any::<bool>(), 0u32..=100).prop_map(|(playing, volume)| Device::Music(Music {
            name: "Music Player".to_string(),
            playing,
            track: "None".to_string(),
            volume,
            playlist: None,
        })),
    ]
}

fn table_strategy() -> impl Strategy<Value = DeviceMap> {
    prop::collection::btree_map("[a-z_]{3,10}".prop_map(DeviceId::new), device_strategy(), 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_untouched_devices_keep_identity(
        table in table_strategy(),
        pick in prop::collection::vec(any::<bool>(), 10),
    ) {
        let engine = DeviceSyncEngine::new();
        engine.apply_scene(table.clone()).unwrap();
        let before = engine.snapshot().unwrap();

        let delta: DeviceMap = table
            .iter()
            .zip(pick.iter())
            .filter(|(_, chosen)| **chosen)
            .map(|((id, device), _)| (id.clone(), device.clone()))
            .collect();
        engine.apply_update(delta.clone()).unwrap();

        for (id, old) in before.iter() {
            let now = engine.get(id).unwrap();
            prop_assert_eq!(delta.contains_key(id), !Arc::ptr_eq(old, &now));
        }
    }

    #[test]
    fn prop_apply_scene_idempotent(table in table_strategy()) {
        let once = DeviceSyncEngine::new();
        once.apply_scene(table.clone()).unwrap();

        let twice = DeviceSyncEngine::new();
        twice.apply_scene(table.clone()).unwrap();
        twice.apply_scene(table).unwrap();

        prop_assert!(once.snapshot().unwrap().value_eq(&twice.snapshot().unwrap()));
    }

    #[test]
    fn prop_out_of_range_delta_rejected_whole(
        table in table_strategy(),
        brightness in prop_oneof![Just(0u32), 101u32..1000],
    ) {
        let engine = DeviceSyncEngine::new();
        engine.apply_scene(table.clone()).unwrap();
        let before = engine.snapshot().unwrap();

        let mut delta = table;
        delta.insert(DeviceId::new("zz_bad_light"), Device::Light(Light {
            name: "Bad".to_string(),
            on: true,
            brightness,
            color: "#000000".to_string(),
        }));

        let result = engine.apply_update(delta);
        prop_assert!(matches!(result, Err(StateError::Validation { .. })), "expected validation error");
        let after = engine.snapshot().unwrap();
        prop_assert_eq!(after.revision(), before.revision());
        for (id, old) in before.iter() {
            prop_assert!(Arc::ptr_eq(old, after.get(id).unwrap()));
        }
    }
}
