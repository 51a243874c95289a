//! Session layer: ECU bootstrap, the multi-frame response loop, and the
//! [`KlineDriver`] facade bundling them with the link.
use crate::core::FrameBuffer;
use crate::error::{CommunicationError, ExchangeError, InitError, RequestError, ResponseError};
use crate::protocol::config::KlineConfig;
use crate::protocol::transport::{
    link::{KlineLink, ResponseStatus},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};

pub mod exchange;
pub mod initializer;

use initializer::EcuInitializer;

/// Complete K-line tester: link plus wake-up hardware.
///
/// ```rust,ignore
/// let mut driver = KlineDriver::new(uart, clock, k_out_pin, delay, KlineConfig::default());
/// driver.initialize()?;
///
/// let mut buffer = FrameBuffer::<64>::new();
/// driver.exchange(&read_dtc_request, &mut buffer, |frame| handle(frame.as_slice()))?;
/// ```
#[derive(Debug)]
pub struct KlineDriver<S, C, P, D>
where
    S: SerialLine,
    C: KlineClock,
    P: OutputPin,
    D: DelayNs,
{
    link: KlineLink<S, C>,
    initializer: EcuInitializer<P, D>,
}

impl<S, C, P, D> KlineDriver<S, C, P, D>
where
    S: SerialLine,
    C: KlineClock,
    P: OutputPin,
    D: DelayNs,
{
    /// Assemble a driver from its peripherals. The timing window starts now;
    /// call [`initialize`](Self::initialize) before exchanging diagnostic requests.
    pub fn new(serial: S, clock: C, pin: P, delay: D, config: KlineConfig) -> Self {
        Self {
            link: KlineLink::new(serial, clock, config),
            initializer: EcuInitializer::new(pin, delay),
        }
    }

    /// Fast init plus start-communication and start-diagnostic-session.
    pub fn initialize(&mut self) -> Result<(), InitError<S::Error>> {
        self.initializer.initialize(&mut self.link)
    }

    /// See [`KlineLink::send_request`].
    pub fn send_request(&mut self, request: &[u8]) -> Result<(), RequestError<S::Error>> {
        self.link.send_request(request)
    }

    /// See [`KlineLink::receive_response`].
    pub fn receive_response<const N: usize>(
        &mut self,
        buffer: &mut FrameBuffer<N>,
    ) -> Result<ResponseStatus, ResponseError<S::Error>> {
        self.link.receive_response(buffer)
    }

    /// See [`KlineLink::exchange`].
    pub fn exchange<const N: usize, F>(
        &mut self,
        request: &[u8],
        buffer: &mut FrameBuffer<N>,
        on_frame: F,
    ) -> Result<usize, ExchangeError<S::Error>>
    where
        F: FnMut(&FrameBuffer<N>),
    {
        self.link.exchange(request, buffer, on_frame)
    }

    /// See [`KlineLink::last_error`].
    pub fn last_error(&self) -> Option<CommunicationError> {
        self.link.last_error()
    }

    /// Underlying link.
    pub fn link_mut(&mut self) -> &mut KlineLink<S, C> {
        &mut self.link
    }

    /// Give back every hardware resource: serial line, clock, pin, and delay.
    pub fn release(self) -> (S, C, P, D) {
        let (serial, clock) = self.link.release();
        let (pin, delay) = self.initializer.release();
        (serial, clock, pin, delay)
    }
}
