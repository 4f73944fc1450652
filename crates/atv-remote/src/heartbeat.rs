//! Keep-alive policy
//!
//! `atvremote` sessions go stale when nothing is sent for a while. Every period the
//! session either probes with a harmless command or skips because a real command
//! went out recently.

use std::time::Duration;

use tokio::time::Instant;

/// Interval between heartbeat checks
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);

/// Idle time after which a probe is sent
pub const STALE_THRESHOLD: Duration = Duration::from_secs(45);

/// Outcome of one heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatDecision {
    /// Send the probe
    Probe,
    /// A command went out `since_last` ago; `remaining` until it would go stale
    Skip {
        since_last: Duration,
        remaining: Duration,
    },
}

/// Heartbeat timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatPolicy {
    pub period: Duration,
    pub threshold: Duration,
}

impl Default for HeartbeatPolicy {
    fn default() -> Self {
        Self {
            period: HEARTBEAT_PERIOD,
            threshold: STALE_THRESHOLD,
        }
    }
}

impl HeartbeatPolicy {
    pub fn new(period: Duration, threshold: Duration) -> Self {
        Self { period, threshold }
    }

    /// Decide whether to probe at `now` given the last send time.
    ///
    /// A session that has never sent anything is always probed.
    pub fn check(&self, last_sent: Option<Instant>, now: Instant) -> HeartbeatDecision {
        let Some(last) = last_sent else {
            return HeartbeatDecision::Probe;
        };

        let since_last = now.saturating_duration_since(last);
        if since_last > self.threshold {
            HeartbeatDecision::Probe
        } else {
            HeartbeatDecision::Skip {
                since_last,
                remaining: self.threshold - since_last,
            }
        }
    }
}
