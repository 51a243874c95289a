//! Minimal abstraction for the UART attached to the K-line transceiver.
//! Allows the library to plug into any HAL serial driver or a host-side
//! USB adapter.

/// Byte-oriented, non-blocking access to the half-duplex K-line.
///
/// Every byte written is also received back (echo), since transmitter and
/// receiver share the same wire.
pub trait SerialLine {
    type Error: core::fmt::Debug;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read. Must not block.
    fn available(&mut self) -> usize;

    /// Read the oldest received byte. Only called after [`available`](Self::available)
    /// reported at least one byte.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Release the TX pin so the wake-up pattern can be driven as plain GPIO.
    fn suspend(&mut self) -> Result<(), Self::Error>;

    /// Reclaim the TX pin and restart the UART at the line rate.
    fn resume(&mut self) -> Result<(), Self::Error>;
}

impl<T: SerialLine + ?Sized> SerialLine for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }

    fn suspend(&mut self) -> Result<(), Self::Error> {
        (**self).suspend()
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        (**self).resume()
    }
}
