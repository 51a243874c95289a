//! K-line transport layer: frame layout and checksum, the timing window,
//! hardware abstraction traits, and the half-duplex request/response link.
//!
//! ## ISO 14230 Timing Parameters
//!
//! The P1–P4 parameters bound every delay on the line. The link enforces
//! P2 max (response and inter-frame timeout), P3 min and max (spacing between
//! the end of a response and the next request), and P4 min (inter-byte gap of
//! the tester, used as the echo window). The other bounds are carried for
//! completeness and for callers that build their own schedules.
use embassy_time::Duration;

pub mod frame;
pub mod link;
pub mod timing;
pub mod traits;

/// Line rate of the reference configuration (baud).
///
/// The serial line is opened by the caller; the driver never changes its rate.
pub const KLINE_BAUD_RATE: u32 = 10_400;

/// ISO 14230 timing bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingParameters {
    /// Inter-byte time of the ECU response (min).
    pub p1_min: Duration,
    /// Inter-byte time of the ECU response (max).
    pub p1_max: Duration,
    /// Delay between request end and response start (min).
    pub p2_min: Duration,
    /// Response timeout, also used to detect pending frames (max).
    pub p2_max: Duration,
    /// Delay between response end and the next request (min).
    pub p3_min: Duration,
    /// Session idle timeout before a new request (max).
    pub p3_max: Duration,
    /// Inter-byte time of the tester request (min), doubles as echo window.
    pub p4_min: Duration,
    /// Inter-byte time of the tester request (max).
    pub p4_max: Duration,
}

impl TimingParameters {
    /// Default timing set mandated by ISO 14230-2.
    pub const ISO_14230: Self = Self {
        p1_min: Duration::from_millis(5),
        p1_max: Duration::from_millis(20),
        p2_min: Duration::from_millis(25),
        p2_max: Duration::from_millis(50),
        p3_min: Duration::from_millis(55),
        p3_max: Duration::from_millis(5000),
        p4_min: Duration::from_millis(5),
        p4_max: Duration::from_millis(20),
    };
}

impl Default for TimingParameters {
    fn default() -> Self {
        Self::ISO_14230
    }
}
