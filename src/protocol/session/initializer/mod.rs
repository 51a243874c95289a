//! ECU bootstrap: fast-init wake-up pulse followed by the start-communication
//! and start-diagnostic-session exchanges.
use crate::core::{FrameBuffer, MAX_FRAME_LEN};
use crate::error::{InitError, InitStage};
use crate::protocol::config::{KlineConfig, WakeupPattern};
use crate::protocol::transport::{
    frame::{
        checksum, is_negative_response, is_positive_response, FORMAT_NO_LENGTH,
        FORMAT_WITH_LENGTH, RESPONSE_SID_OFFSET,
    },
    link::{KlineLink, ResponseStatus},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};
use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, OutputPin},
};

/// Service id of the start-communication request.
pub const START_COMMUNICATION_SID: u8 = 0x81;
/// Service id of the start-diagnostic-session request.
pub const START_DIAGNOSTIC_SESSION_SID: u8 = 0x10;
/// Diagnostic mode requested by the bootstrap (standard diagnostic mode).
pub const STANDARD_DIAGNOSTIC_MODE: u8 = 0x80;

/// Build the start-communication request (format `0x81`, no length byte).
///
/// The single data byte is the StartCommunication service id `0x81`, not
/// `0x00`: ECUs only acknowledge this id (with `0xC1`), so the frame is
/// `{0x81, ecu, tester, 0x81, checksum}`.
pub fn start_communication_request(config: &KlineConfig) -> [u8; 5] {
    let mut frame = [
        FORMAT_NO_LENGTH,
        config.ecu_address,
        config.tester_address,
        START_COMMUNICATION_SID,
        0x00,
    ];
    frame[4] = checksum(&frame[..4]);
    frame
}

/// Build the start-diagnostic-session request in standard diagnostic mode.
pub fn start_diagnostic_session_request(config: &KlineConfig) -> [u8; 7] {
    let mut frame = [
        FORMAT_WITH_LENGTH,
        config.ecu_address,
        config.tester_address,
        0x02,
        START_DIAGNOSTIC_SESSION_SID,
        STANDARD_DIAGNOSTIC_MODE,
        0x00,
    ];
    frame[6] = checksum(&frame[..6]);
    frame
}

/// Drives the wake-up pin and runs the two bootstrap exchanges.
///
/// `P` is the GPIO wired to the transceiver TX input, `D` provides the
/// millisecond delays of the pulse.
#[derive(Debug)]
pub struct EcuInitializer<P: OutputPin, D: DelayNs> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> EcuInitializer<P, D> {
    /// Take ownership of the wake-up pin and the delay provider.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Bring the ECU into a diagnostic session.
    ///
    /// Sequence (first failure aborts):
    /// 1. Reset the timing window so the first request is not held back by a
    ///    stale P3 window.
    /// 2. Suspend the UART and drive the fast-init pulse, then resume it.
    /// 3. Start communication: send, receive exactly one frame, check it is positive.
    /// 4. Start the diagnostic session the same way.
    pub fn initialize<S: SerialLine, C: KlineClock>(
        &mut self,
        link: &mut KlineLink<S, C>,
    ) -> Result<(), InitError<S::Error>> {
        let config = *link.config();

        link.reset_timing_window();
        self.wake_up(link, &config.wakeup)?;

        let start_communication = start_communication_request(&config);
        bootstrap_exchange(link, InitStage::StartCommunication, &start_communication)?;

        let start_diagnostic = start_diagnostic_session_request(&config);
        bootstrap_exchange(link, InitStage::StartDiagnosticSession, &start_diagnostic)?;

        #[cfg(feature = "defmt")]
        defmt::info!("ECU {:#x} initialized", config.ecu_address);

        Ok(())
    }

    /// Suspend the serial line, drive the wake-up pattern, and resume the line.
    ///
    /// The line is resumed even when the pin fails, so the link stays usable.
    pub fn wake_up<S: SerialLine, C: KlineClock>(
        &mut self,
        link: &mut KlineLink<S, C>,
        pattern: &WakeupPattern,
    ) -> Result<(), InitError<S::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Fast init wake-up pulse");

        link.serial_mut().suspend().map_err(InitError::Line)?;
        let pulse = self.drive_pulse(pattern);
        link.serial_mut().resume().map_err(InitError::Line)?;
        pulse.map_err(InitError::WakeupPin)
    }

    /// Give back the pin and the delay provider.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn drive_pulse(
        &mut self,
        pattern: &WakeupPattern,
    ) -> Result<(), embedded_hal::digital::ErrorKind> {
        self.pin.set_high().map_err(|e| e.kind())?;
        self.pause(pattern.idle);
        self.pin.set_low().map_err(|e| e.kind())?;
        self.pause(pattern.low);
        self.pin.set_high().map_err(|e| e.kind())?;
        self.pause(pattern.high);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.delay.delay_ms(millis);
    }
}

/// One bootstrap request: send, expect a single frame, require a positive answer.
fn bootstrap_exchange<S: SerialLine, C: KlineClock>(
    link: &mut KlineLink<S, C>,
    stage: InitStage,
    request: &[u8],
) -> Result<(), InitError<S::Error>> {
    link.send_request(request)
        .map_err(|error| InitError::Request { stage, error })?;

    let mut response = FrameBuffer::<MAX_FRAME_LEN>::new();
    let status = link
        .receive_response(&mut response)
        .map_err(|error| InitError::Response { stage, error })?;
    if status == ResponseStatus::Pending {
        return Err(InitError::UnexpectedPending { stage });
    }

    let response = response.as_slice();
    if is_positive_response(request, response) {
        return Ok(());
    }
    if is_negative_response(response) {
        return Err(InitError::NegativeResponse { stage });
    }
    Err(InitError::UnexpectedResponse {
        stage,
        service_id: response.get(RESPONSE_SID_OFFSET).copied().unwrap_or_default(),
    })
}
