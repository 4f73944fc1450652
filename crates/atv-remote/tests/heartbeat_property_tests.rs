//! Property-based tests for the heartbeat policy

use std::time::Duration;

use atv_remote::{HeartbeatDecision, HeartbeatPolicy};
use proptest::prelude::*;
use tokio::time::Instant;

proptest! {
    /// A probe happens exactly when the idle time exceeds the threshold
    #[test]
    fn prop_probe_iff_stale(idle_ms in 0u64..120_000) {
        let policy = HeartbeatPolicy::default();
        let last = Instant::now();
        let now = last + Duration::from_millis(idle_ms);

        let decision = policy.check(Some(last), now);

        if idle_ms > 45_000 {
            prop_assert_eq!(decision, HeartbeatDecision::Probe);
        } else {
            prop_assert_eq!(
                decision,
                HeartbeatDecision::Skip {
                    since_last: Duration::from_millis(idle_ms),
                    remaining: Duration::from_millis(45_000 - idle_ms),
                }
            );
        }
    }

    /// Custom policies honour their own threshold
    #[test]
    fn prop_custom_threshold(threshold_ms in 1u64..10_000, idle_ms in 0u64..20_000) {
        let policy = HeartbeatPolicy::new(
            Duration::from_millis(threshold_ms * 2),
            Duration::from_millis(threshold_ms),
        );
        let last = Instant::now();

        let probed = policy.check(Some(last), last + Duration::from_millis(idle_ms)) == HeartbeatDecision::Probe;

        prop_assert_eq!(probed, idle_ms > threshold_ms);
    }
}
