use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Wall clock advanced by the tokio monotonic clock.
///
/// Timestamps shown to the user (`lastFetchAt`, `nextFetchAt`) are wall-clock
/// values, while every timer runs on `tokio::time`. Anchoring one to the other
/// keeps them consistent, including under a paused test clock.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    wall: DateTime<Utc>,
    mono: Instant,
}

impl Clock {
    /// Anchors at the current wall-clock time.
    pub fn start() -> Self {
        Self::anchored_at(Utc::now())
    }

    pub fn anchored_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            mono: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.mono.elapsed()).unwrap_or(TimeDelta::zero());
        self.wall + elapsed
    }
}
