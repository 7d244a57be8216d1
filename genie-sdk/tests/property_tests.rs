//! Property tests for playback bookkeeping

use std::time::Duration;

use genie_sdk::audio::{Progress, TrackCatalog};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #[test]
    fn prop_progress_ratio_is_bounded(position_ms in 0u64..1_000_000, duration_ms in 0u64..1_000_000) {
        let progress = Progress {
            position: Duration::from_millis(position_ms),
            duration: Duration::from_millis(duration_ms),
        };
        let ratio = progress.ratio();
        prop_assert!((0.0..=1.0).contains(&ratio));
        if duration_ms == 0 {
            prop_assert_eq!(ratio, 0.0);
        }
    }

    #[test]
    fn prop_pick_stays_in_catalog(seed in any::<u64>()) {
        let catalog = TrackCatalog::bundled();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..8 {
            let track = catalog.pick(&mut rng);
            prop_assert!(catalog.tracks().contains(track));
        }
    }
}
