//! Request transmission with half-duplex echo verification.
use super::KlineLink;
use crate::error::RequestError;
use crate::protocol::transport::{
    frame::{request_length, FRAME_OVERHEAD},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};

impl<S: SerialLine, C: KlineClock> KlineLink<S, C> {
    /// Send a complete request frame.
    ///
    /// Steps:
    /// 1. Derive the frame length from its header.
    /// 2. Fail if P3 max already elapsed (session timed out).
    /// 3. Wait until P3 min has elapsed since the previous exchange.
    /// 4. Write each byte, restart the window, and spend P4 min reading back
    ///    its echo. Every byte arriving during that window must equal the
    ///    transmitted one; the first differing byte aborts the request.
    ///
    /// The line is never retried here; callers decide whether to repeat the
    /// whole exchange.
    pub fn send_request(&mut self, request: &[u8]) -> Result<(), RequestError<S::Error>> {
        let result = self.transmit(request);
        if let Err(error) = &result {
            self.record(error.kind());
        }
        result
    }

    fn transmit(&mut self, request: &[u8]) -> Result<(), RequestError<S::Error>> {
        let declared = request_length(request).unwrap_or(FRAME_OVERHEAD);
        if declared > request.len() {
            return Err(RequestError::Truncated {
                declared,
                available: request.len(),
            });
        }
        let timing = self.config.timing;

        if self.window.elapsed_at_least(timing.p3_max) {
            return Err(RequestError::P3MaxExceeded);
        }
        while !self.window.elapsed_at_least(timing.p3_min) {
            core::hint::spin_loop();
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Sending request: {=[u8]:#x}", &request[..declared]);

        for &byte in &request[..declared] {
            self.serial.write_byte(byte).map_err(RequestError::Line)?;
            self.window.reset();

            // A collision shows up as extra or altered bytes in the echo window.
            while !self.window.elapsed_at_least(timing.p4_min) {
                if self.serial.available() == 0 {
                    continue;
                }
                let echo = self.serial.read_byte().map_err(RequestError::Line)?;
                if echo != byte {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Echo mismatch: sent {:#x}, read {:#x}", byte, echo);
                    return Err(RequestError::EchoMismatch { sent: byte, echoed: echo });
                }
            }
        }

        Ok(())
    }
}
