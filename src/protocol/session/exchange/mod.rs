//! Response loop: one request followed by as many frames as the ECU sends.
//!
//! [`KlineLink::receive_response`] reports `Pending` when another frame starts
//! within P2 max of the previous one. [`KlineLink::exchange`] keeps reading
//! until the line goes quiet, handing every frame to the caller.
use crate::core::FrameBuffer;
use crate::error::ExchangeError;
use crate::protocol::transport::{
    link::{KlineLink, ResponseStatus},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};

impl<S: SerialLine, C: KlineClock> KlineLink<S, C> {
    /// Send `request` and read every response frame it triggers.
    ///
    /// `on_frame` sees each validated frame in arrival order; `buffer` is
    /// reused between frames. Returns the number of frames received.
    ///
    /// At most [`KlineConfig::max_response_frames`](crate::protocol::config::KlineConfig::max_response_frames)
    /// frames are read. If the ECU still announces a pending frame after the
    /// last allowed one, the exchange fails with
    /// [`ExchangeError::TooManyResponses`].
    pub fn exchange<const N: usize, F>(
        &mut self,
        request: &[u8],
        buffer: &mut FrameBuffer<N>,
        mut on_frame: F,
    ) -> Result<usize, ExchangeError<S::Error>>
    where
        F: FnMut(&FrameBuffer<N>),
    {
        let limit = self.config().max_response_frames;
        self.send_request(request)?;

        let mut frames = 0;
        loop {
            let status = self.receive_response(buffer)?;
            frames += 1;
            on_frame(&*buffer);

            match status {
                ResponseStatus::Finished => return Ok(frames),
                ResponseStatus::Pending if frames >= limit => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ECU still pending after {} frames", frames);
                    return Err(ExchangeError::TooManyResponses { limit });
                }
                ResponseStatus::Pending => {}
            }
        }
    }
}
