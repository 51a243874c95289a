//! Response reception: byte-position state machine, checksum verification,
//! and detection of additional pending frames.
use super::KlineLink;
use crate::core::FrameBuffer;
use crate::error::ResponseError;
use crate::protocol::transport::{
    frame::{checksum, FrameFormat, FRAME_OVERHEAD, NO_LENGTH_FRAME_LEN},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};

/// Outcome of a successful [`KlineLink::receive_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseStatus {
    /// One frame was received and nothing followed within P2 max.
    Finished,
    /// One frame was received and the ECU already started sending another;
    /// call `receive_response` again to read it.
    Pending,
}

impl<S: SerialLine, C: KlineClock> KlineLink<S, C> {
    /// Assemble one response frame into `buffer`.
    ///
    /// Bytes are checked as they arrive: format byte, tester address (target),
    /// ECU address (source), then the length byte, which must describe a frame
    /// fitting into `N`. When the configured format byte is `0x81` there is no
    /// length byte and the frame is five bytes long. The final byte must equal the checksum of the
    /// preceding ones. Each byte restarts the timing window; a gap longer
    /// than P2 max fails the reception.
    ///
    /// Once complete, the line is observed for another P2 max without touching
    /// `buffer`: any incoming byte means another frame is pending.
    pub fn receive_response<const N: usize>(
        &mut self,
        buffer: &mut FrameBuffer<N>,
    ) -> Result<ResponseStatus, ResponseError<S::Error>> {
        let result = self.assemble(buffer).map(|()| self.observe_pending());
        match &result {
            Err(error) => self.record(error.kind()),
            Ok(_status) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Response received ({}): {=[u8]:#x}",
                    _status,
                    buffer.as_slice()
                );
            }
        }
        result
    }

    fn assemble<const N: usize>(
        &mut self,
        buffer: &mut FrameBuffer<N>,
    ) -> Result<(), ResponseError<S::Error>> {
        let timing = self.config.timing;
        let format = FrameFormat::of(self.config.response_format);
        let mut frame_len: Option<usize> = None;
        buffer.clear();

        loop {
            if self.serial.available() == 0 {
                if self.window.elapsed_at_least(timing.p2_max) {
                    return Err(ResponseError::P2MaxTimeout);
                }
                continue;
            }

            self.window.reset();
            let byte = self.serial.read_byte().map_err(ResponseError::Line)?;
            let index = buffer.len();

            match index {
                0 if byte != self.config.response_format => {
                    return Err(ResponseError::BadFormat { found: byte });
                }
                0 if format == FrameFormat::NoLength => {
                    frame_len = Some(Self::fit(NO_LENGTH_FRAME_LEN, N)?);
                }
                1 if byte != self.config.tester_address => {
                    return Err(ResponseError::BadTargetAddress { found: byte });
                }
                2 if byte != self.config.ecu_address => {
                    return Err(ResponseError::BadSourceAddress { found: byte });
                }
                3 if format == FrameFormat::WithLength => {
                    frame_len = Some(Self::fit(byte as usize + FRAME_OVERHEAD, N)?);
                }
                _ => {}
            }

            buffer
                .push(byte)
                .map_err(|_| ResponseError::BufferOverflow {
                    required: index + 1,
                    capacity: N,
                })?;

            if frame_len == Some(buffer.len()) {
                let (body, trailer) = buffer.as_slice().split_at(index);
                let expected = checksum(body);
                let found = trailer[0];
                if expected != found {
                    return Err(ResponseError::ChecksumMismatch { expected, found });
                }
                return Ok(());
            }
        }
    }

    fn fit(required: usize, capacity: usize) -> Result<usize, ResponseError<S::Error>> {
        if required > capacity {
            return Err(ResponseError::BufferOverflow { required, capacity });
        }
        Ok(required)
    }

    fn observe_pending(&mut self) -> ResponseStatus {
        let p2_max = self.config.timing.p2_max;
        while !self.window.elapsed_at_least(p2_max) {
            if self.serial.available() > 0 {
                return ResponseStatus::Pending;
            }
        }
        ResponseStatus::Finished
    }
}
