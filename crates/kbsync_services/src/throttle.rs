use std::time::Duration;

use kbsync_domain::ThrottleSchedule;
use tracing::debug;

/// Applies a [`ThrottleSchedule`] between dispatches.
#[derive(Debug, Clone)]
pub struct Throttle {
    schedule: ThrottleSchedule,
}

impl Throttle {
    pub fn new(schedule: ThrottleSchedule) -> Self {
        Self { schedule }
    }

    /// Sleeps for the pause owed before record `position` and returns it.
    /// `previous` is the last dispatched record, or 0 before the first one.
    pub async fn wait_before(&self, previous: usize, position: usize) -> Duration {
        let pause = self.schedule.pause_since(previous, position);
        if !pause.is_zero() {
            debug!(position, pause_ms = pause.as_millis() as u64, "Throttling");
            tokio::time::sleep(pause).await;
        }
        pause
    }
}
