//! Error definitions shared across library modules.
//! Each type models the failures of one operation (request transmission,
//! response reception, session bootstrap, request building), while
//! [`CommunicationError`] is the flat classification kept in the link's
//! last-error slot.
use thiserror_no_std::Error;

//==================================================================================CLASSIFICATION
/// Most recent failure cause recorded by a [`KlineLink`](crate::protocol::transport::link::KlineLink).
///
/// Exactly one value is kept and it is overwritten by every failing send or
/// receive, so it is only meaningful right after an operation reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommunicationError {
    /// The inter-message window already exceeded P3 max before sending.
    P3MaxExceeded,
    /// A transmitted byte did not come back unchanged.
    EchoMismatch,
    /// The request slice is shorter than its own length byte announces.
    TruncatedRequest,
    /// No byte arrived within P2 max while a response was incomplete.
    P2MaxTimeout,
    /// First response byte is not the expected format byte.
    BadFormat,
    /// Response is not addressed to this tester.
    BadTargetAddress,
    /// Response does not come from the configured ECU.
    BadSourceAddress,
    /// Declared response length exceeds the receive buffer.
    BufferOverflow,
    /// Response checksum does not match its content.
    ChecksumMismatch,
    /// The serial line itself reported an error.
    Line,
}

//==================================================================================REQUEST_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised while transmitting a request frame.
pub enum RequestError<E: core::fmt::Debug> {
    /// The session timed out: P3 max elapsed before the request started.
    #[error("P3 max exceeded before sending the request")]
    P3MaxExceeded,
    /// Half-duplex echo differs from the transmitted byte.
    #[error("Echo mismatch: sent {sent:#04X}, read back {echoed:#04X}")]
    EchoMismatch { sent: u8, echoed: u8 },
    /// Request length byte points past the end of the provided slice.
    #[error("Request truncated: {declared} bytes declared, {available} provided")]
    Truncated { declared: usize, available: usize },
    /// Serial line failure.
    #[error("Serial line error: {0:?}")]
    Line(E),
}

impl<E: core::fmt::Debug> RequestError<E> {
    /// Flat classification stored in the last-error slot.
    pub fn kind(&self) -> CommunicationError {
        match self {
            Self::P3MaxExceeded => CommunicationError::P3MaxExceeded,
            Self::EchoMismatch { .. } => CommunicationError::EchoMismatch,
            Self::Truncated { .. } => CommunicationError::TruncatedRequest,
            Self::Line(_) => CommunicationError::Line,
        }
    }
}

//==================================================================================RESPONSE_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised while assembling a response frame.
pub enum ResponseError<E: core::fmt::Debug> {
    /// Nothing arrived within P2 max while the frame was incomplete.
    #[error("P2 max timeout while waiting for response bytes")]
    P2MaxTimeout,
    /// Byte 0 is not the expected format byte.
    #[error("Bad format byte {found:#04X}")]
    BadFormat { found: u8 },
    /// Byte 1 is not the tester address.
    #[error("Bad target address {found:#04X}")]
    BadTargetAddress { found: u8 },
    /// Byte 2 is not the ECU address.
    #[error("Bad source address {found:#04X}")]
    BadSourceAddress { found: u8 },
    /// The declared frame does not fit into the receive buffer.
    #[error("Buffer overflow: frame needs {required} bytes, capacity is {capacity}")]
    BufferOverflow { required: usize, capacity: usize },
    /// Trailing byte does not match the additive checksum.
    #[error("Checksum mismatch: expected {expected:#04X}, found {found:#04X}")]
    ChecksumMismatch { expected: u8, found: u8 },
    /// Serial line failure.
    #[error("Serial line error: {0:?}")]
    Line(E),
}

impl<E: core::fmt::Debug> ResponseError<E> {
    /// Flat classification stored in the last-error slot.
    pub fn kind(&self) -> CommunicationError {
        match self {
            Self::P2MaxTimeout => CommunicationError::P2MaxTimeout,
            Self::BadFormat { .. } => CommunicationError::BadFormat,
            Self::BadTargetAddress { .. } => CommunicationError::BadTargetAddress,
            Self::BadSourceAddress { .. } => CommunicationError::BadSourceAddress,
            Self::BufferOverflow { .. } => CommunicationError::BufferOverflow,
            Self::ChecksumMismatch { .. } => CommunicationError::ChecksumMismatch,
            Self::Line(_) => CommunicationError::Line,
        }
    }
}

//==================================================================================INIT_ERROR
/// Bootstrap exchange during which an initialization failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStage {
    /// Start-communication request (service 0x81).
    StartCommunication,
    /// Start-diagnostic-session request (service 0x10).
    StartDiagnosticSession,
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors encountered while bringing the ECU into a diagnostic session.
pub enum InitError<E: core::fmt::Debug> {
    /// The wake-up pin could not be driven.
    #[error("Wake-up pin error: {0:?}")]
    WakeupPin(embedded_hal::digital::ErrorKind),
    /// The serial line could not be suspended or resumed around the wake-up pulse.
    #[error("Serial line error: {0:?}")]
    Line(E),
    /// Request transmission failed.
    #[error("{stage:?} request failed: {error}")]
    Request {
        stage: InitStage,
        error: RequestError<E>,
    },
    /// Response reception failed.
    #[error("{stage:?} response failed: {error}")]
    Response {
        stage: InitStage,
        error: ResponseError<E>,
    },
    /// The ECU announced more frames where exactly one was expected.
    #[error("{stage:?} response unexpectedly pending")]
    UnexpectedPending { stage: InitStage },
    /// The ECU refused the request (negative response service id `0x7F`).
    #[error("{stage:?} refused by the ECU")]
    NegativeResponse { stage: InitStage },
    /// The response service id matches neither a positive nor a negative answer.
    #[error("{stage:?} answered with unexpected service id {service_id:#04X}")]
    UnexpectedResponse { stage: InitStage, service_id: u8 },
}

//==================================================================================EXCHANGE_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised by a full request/response exchange.
pub enum ExchangeError<E: core::fmt::Debug> {
    /// Request transmission failed.
    #[error("Request failed: {0}")]
    Request(RequestError<E>),
    /// One of the response frames failed.
    #[error("Response failed: {0}")]
    Response(ResponseError<E>),
    /// The ECU kept announcing pending frames beyond the configured limit.
    #[error("More than {limit} response frames for a single request")]
    TooManyResponses { limit: usize },
}

impl<E: core::fmt::Debug> From<RequestError<E>> for ExchangeError<E> {
    fn from(error: RequestError<E>) -> Self {
        Self::Request(error)
    }
}

impl<E: core::fmt::Debug> From<ResponseError<E>> for ExchangeError<E> {
    fn from(error: ResponseError<E>) -> Self {
        Self::Response(error)
    }
}

//==================================================================================FRAME_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors raised while encoding a request frame.
pub enum FrameError {
    /// The encoded frame does not fit into the destination buffer.
    #[error("Frame needs {required} bytes, capacity is {capacity}")]
    Capacity { required: usize, capacity: usize },
    /// Payload size cannot be expressed by the chosen frame format.
    #[error("Invalid data length {len} for the selected format")]
    DataLength { len: usize },
}
