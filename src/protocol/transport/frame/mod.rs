//! K-line frame layout: header fields, additive checksum, request encoding,
//! and positive-response validation.
//!
//! ```text
//! offset  0       1       2       3        4..          last
//!         format  target  source  length   data bytes   checksum
//! ```
//!
//! With format byte `0x81` the length byte is absent: offset 3 is the single
//! data byte and the frame is always five bytes long.
use crate::core::FrameBuffer;
use crate::error::FrameError;

//==================================================================================Constants
/// Format byte of a frame carrying an explicit length byte.
pub const FORMAT_WITH_LENGTH: u8 = 0x80;
/// Format byte of a frame without length byte (one data byte).
pub const FORMAT_NO_LENGTH: u8 = 0x81;
/// Format, target, source, length, and checksum.
pub const FRAME_OVERHEAD: usize = 5;
/// Total length of a frame using [`FORMAT_NO_LENGTH`].
pub const NO_LENGTH_FRAME_LEN: usize = 5;
/// Offset added by the ECU to the request service id to acknowledge it.
pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;
/// Service id of a negative response.
pub const NEGATIVE_RESPONSE_SID: u8 = 0x7F;
/// Offset of the response service id in a frame with length byte.
pub const RESPONSE_SID_OFFSET: usize = 4;

//==================================================================================FrameFormat
/// Addressing mode announced by the format byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    /// `0x80`: length byte at offset 3.
    WithLength,
    /// `0x81`: no length byte, exactly one data byte.
    NoLength,
}

impl FrameFormat {
    /// Raw format byte.
    pub const fn byte(self) -> u8 {
        match self {
            Self::WithLength => FORMAT_WITH_LENGTH,
            Self::NoLength => FORMAT_NO_LENGTH,
        }
    }

    /// Format of the frame starting with `byte`.
    ///
    /// Anything other than `0x81` carries a length byte.
    pub const fn of(byte: u8) -> Self {
        if byte == FORMAT_NO_LENGTH {
            Self::NoLength
        } else {
            Self::WithLength
        }
    }
}

//==================================================================================Checksum
/// 8-bit additive checksum: sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

//==================================================================================Layout
/// Total length of `request` as announced by its header.
///
/// Five bytes for the no-length format, length byte plus five otherwise.
/// Returns `None` when the header itself is incomplete.
pub fn request_length(request: &[u8]) -> Option<usize> {
    let format = *request.first()?;
    match FrameFormat::of(format) {
        FrameFormat::NoLength => Some(NO_LENGTH_FRAME_LEN),
        FrameFormat::WithLength => request.get(3).map(|len| *len as usize + FRAME_OVERHEAD),
    }
}

/// Service id of a request: offset 3 for the no-length format, 4 otherwise.
pub fn service_id(request: &[u8]) -> Option<u8> {
    let format = *request.first()?;
    match FrameFormat::of(format) {
        FrameFormat::NoLength => request.get(3).copied(),
        FrameFormat::WithLength => request.get(4).copied(),
    }
}

//==================================================================================Validation
/// Check whether `response` positively acknowledges `request`.
///
/// The ECU echoes the requested service id plus `0x40`; any other value at
/// response offset 4 is a negative or mismatched answer.
pub fn is_positive_response(request: &[u8], response: &[u8]) -> bool {
    match (service_id(request), response.get(RESPONSE_SID_OFFSET)) {
        (Some(sid), Some(answer)) => *answer == sid.wrapping_add(POSITIVE_RESPONSE_OFFSET),
        _ => false,
    }
}

/// Check whether `response` carries the negative-response service id.
pub fn is_negative_response(response: &[u8]) -> bool {
    response.get(RESPONSE_SID_OFFSET) == Some(&NEGATIVE_RESPONSE_SID)
}

//==================================================================================Encoding
impl<const N: usize> FrameBuffer<N> {
    /// Encode a request frame and append its checksum.
    ///
    /// [`FrameFormat::NoLength`] accepts exactly one data byte; the other
    /// format accepts up to 255.
    pub fn request(
        format: FrameFormat,
        target: u8,
        source: u8,
        data: &[u8],
    ) -> Result<Self, FrameError> {
        let required = match format {
            FrameFormat::NoLength if data.len() == 1 => NO_LENGTH_FRAME_LEN,
            FrameFormat::WithLength if data.len() <= u8::MAX as usize => {
                data.len() + FRAME_OVERHEAD
            }
            _ => return Err(FrameError::DataLength { len: data.len() }),
        };
        if required > N {
            return Err(FrameError::Capacity {
                required,
                capacity: N,
            });
        }

        let overflow = FrameError::Capacity {
            required,
            capacity: N,
        };
        let header_len = match format {
            FrameFormat::NoLength => 3,
            FrameFormat::WithLength => 4,
        };
        let header = [format.byte(), target, source, data.len() as u8];

        let mut frame = Self::new();
        for byte in header[..header_len].iter().chain(data) {
            frame.push(*byte).map_err(|_| overflow)?;
        }
        let sum = checksum(frame.as_slice());
        frame.push(sum).map_err(|_| overflow)?;
        Ok(frame)
    }
}
