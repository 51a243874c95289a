//! Monotonic time source backing the timing window.

/// Free-running microsecond counter.
///
/// The counter is expected to wrap around at `u32::MAX`; consumers only ever
/// look at differences computed with wrapping arithmetic.
pub trait KlineClock {
    /// Current counter value in microseconds.
    fn now_micros(&mut self) -> u32;
}

impl<T: KlineClock + ?Sized> KlineClock for &mut T {
    fn now_micros(&mut self) -> u32 {
        (**self).now_micros()
    }
}
