//! Half-duplex request/response link over the K-line.
//!
//! [`KlineLink`] owns the serial line and the timing window. Requests are
//! written byte by byte with echo verification ([`KlineLink::send_request`]);
//! responses are assembled and validated into a caller-provided
//! [`FrameBuffer`](crate::core::FrameBuffer) ([`KlineLink::receive_response`]).
//! Every wait is a polling loop bounded by one of the ISO timing parameters.
use crate::error::CommunicationError;
use crate::protocol::config::KlineConfig;
use crate::protocol::transport::{
    timing::TimingWindow,
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};

mod request;
mod response;

pub use response::ResponseStatus;

/// Serial line, timing window, and last-error slot of one tester/ECU session.
#[derive(Debug)]
pub struct KlineLink<S: SerialLine, C: KlineClock> {
    serial: S,
    window: TimingWindow<C>,
    config: KlineConfig,
    last_error: Option<CommunicationError>,
}

impl<S: SerialLine, C: KlineClock> KlineLink<S, C> {
    /// Wrap an opened serial line. The timing window starts now.
    pub fn new(serial: S, clock: C, config: KlineConfig) -> Self {
        Self {
            serial,
            window: TimingWindow::new(clock),
            config,
            last_error: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &KlineConfig {
        &self.config
    }

    /// Cause of the most recent failed send or receive.
    ///
    /// Overwritten by the next failure; only meaningful immediately after an
    /// operation returned an error.
    pub fn last_error(&self) -> Option<CommunicationError> {
        self.last_error
    }

    /// Restart the timing window from the current instant.
    pub fn reset_timing_window(&mut self) {
        self.window.reset();
    }

    /// Mutable access to the serial line (wake-up sequence, custom drivers).
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Give back the serial line and the clock.
    pub fn release(self) -> (S, C) {
        (self.serial, self.window.release())
    }

    fn record(&mut self, kind: CommunicationError) {
        #[cfg(feature = "defmt")]
        defmt::warn!("K-line communication error: {}", kind);

        self.last_error = Some(kind);
    }
}
