//! Driver configuration: node addresses, timing bounds, and the fast-init
//! wake-up pattern. The default matches the reference wiring (tester `0xF1`
//! talking to engine ECU `0x11` at 10400 baud).
use crate::protocol::transport::{frame::FORMAT_WITH_LENGTH, TimingParameters};
use embassy_time::Duration;

/// Default ECU address.
pub const DEFAULT_ECU_ADDRESS: u8 = 0x11;
/// Default tester address.
pub const DEFAULT_TESTER_ADDRESS: u8 = 0xF1;
/// Default number of response frames accepted for a single request.
pub const DEFAULT_MAX_RESPONSE_FRAMES: usize = 8;

//==================================================================================WAKEUP_PATTERN
/// Fast-init pulse driven on the K-line before the start-communication request.
///
/// ```text
///   idle (high)          low    high
/// ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_____|‾‾‾‾‾‾| -> start communication
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupPattern {
    /// Bus idle time before the pulse.
    pub idle: Duration,
    /// Low phase.
    pub low: Duration,
    /// High phase before the UART takes over again.
    pub high: Duration,
}

impl WakeupPattern {
    /// ISO 14230-2 fast initialization (Tidle, TiniL, TWuP − TiniL).
    pub const FAST_INIT: Self = Self {
        idle: Duration::from_millis(350),
        low: Duration::from_millis(25),
        high: Duration::from_millis(25),
    };
}

impl Default for WakeupPattern {
    fn default() -> Self {
        Self::FAST_INIT
    }
}

//==================================================================================KLINE_CONFIG
/// Static parameters of one tester/ECU pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KlineConfig {
    /// Address of the ECU: request target, response source.
    pub ecu_address: u8,
    /// Address of this node: request source, response target.
    pub tester_address: u8,
    /// Format byte every response must start with.
    pub response_format: u8,
    /// ISO timing bounds.
    pub timing: TimingParameters,
    /// Fast-init pulse.
    pub wakeup: WakeupPattern,
    /// Upper bound on frames read by one exchange.
    pub max_response_frames: usize,
}

impl Default for KlineConfig {
    fn default() -> Self {
        Self {
            ecu_address: DEFAULT_ECU_ADDRESS,
            tester_address: DEFAULT_TESTER_ADDRESS,
            response_format: FORMAT_WITH_LENGTH,
            timing: TimingParameters::ISO_14230,
            wakeup: WakeupPattern::FAST_INIT,
            max_response_frames: DEFAULT_MAX_RESPONSE_FRAMES,
        }
    }
}

impl KlineConfig {
    /// Target a different ECU.
    pub fn with_ecu_address(mut self, address: u8) -> Self {
        self.ecu_address = address;
        self
    }

    /// Use a different tester address.
    pub fn with_tester_address(mut self, address: u8) -> Self {
        self.tester_address = address;
        self
    }

    /// Expect another response format byte.
    pub fn with_response_format(mut self, format: u8) -> Self {
        self.response_format = format;
        self
    }

    /// Override the timing bounds.
    pub fn with_timing(mut self, timing: TimingParameters) -> Self {
        self.timing = timing;
        self
    }

    /// Override the wake-up pattern.
    pub fn with_wakeup(mut self, wakeup: WakeupPattern) -> Self {
        self.wakeup = wakeup;
        self
    }

    /// Cap the number of frames an exchange accepts (at least one).
    pub fn with_max_response_frames(mut self, limit: usize) -> Self {
        self.max_response_frames = limit.max(1);
        self
    }
}
