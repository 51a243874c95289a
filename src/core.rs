//! Storage contract shared by the request builder and the response receiver.
//!
//! Frames never leave a fixed-capacity array: requests are encoded into a
//! [`FrameBuffer`] by the caller, responses are assembled byte by byte into a
//! caller-provided one. Appending past the capacity is reported, never clamped.

/// Largest frame the length byte can describe: 255 data bytes plus format,
/// target, source, length, and checksum.
pub const MAX_FRAME_LEN: usize = 260;

/// Fixed-capacity byte array with an explicit fill level.
///
/// `N` is the hard upper bound for one frame. The response receiver compares
/// the declared frame length against `N` and rejects frames that would not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBuffer<const N: usize = MAX_FRAME_LEN> {
    len: usize,
    data: [u8; N],
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { len: 0, data: [0; N] }
    }

    /// Build a buffer from an existing byte slice.
    ///
    /// Returns `None` when `bytes` does not fit into `N`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > N {
            return None;
        }
        let mut buffer = Self::new();
        buffer.data[..bytes.len()].copy_from_slice(bytes);
        buffer.len = bytes.len();
        Some(buffer)
    }

    /// Maximum number of bytes the buffer can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of valid bytes stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks whether another byte can be appended.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Reset the buffer.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one byte, returning the rejected byte when the buffer is full.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        if self.is_full() {
            return Err(byte);
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Byte at `index`, if it has been written.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Immutable view over the populated bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const N: usize> AsRef<[u8]> for FrameBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
