//! Millisecond clock backed by the embassy time driver

use embassy_time::Instant;
use grblpanel_hal::Clock;

/// Free-running millisecond tick since boot (wraps after ~49 days)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
