//! Timing window shared by every wait loop of the link.
//!
//! The window is a single reference timestamp. Sending or receiving a byte
//! resets it; loops then poll [`TimingWindow::elapsed_at_least`] against one of
//! the ISO bounds. The comparison is strictly greater-than: firing on equality
//! sends requests too early.
use crate::protocol::transport::traits::kline_clock::KlineClock;
use embassy_time::Duration;

/// Elapsed-time tracker measured from the last reset.
#[derive(Debug)]
pub struct TimingWindow<C: KlineClock> {
    clock: C,
    start: u32,
}

impl<C: KlineClock> TimingWindow<C> {
    /// Create a window whose reference point is the current clock value.
    pub fn new(mut clock: C) -> Self {
        let start = clock.now_micros();
        Self { clock, start }
    }

    /// Capture the current time as the new reference point.
    #[inline]
    pub fn reset(&mut self) {
        self.start = self.clock.now_micros();
    }

    /// Microseconds since the last reset, wraparound-safe.
    #[inline]
    pub fn elapsed_micros(&mut self) -> u32 {
        self.clock.now_micros().wrapping_sub(self.start)
    }

    /// `true` once strictly more than `threshold` has passed since the last reset.
    pub fn elapsed_at_least(&mut self, threshold: Duration) -> bool {
        u64::from(self.elapsed_micros()) > threshold.as_micros()
    }

    /// Give the clock back.
    pub fn release(self) -> C {
        self.clock
    }
}
