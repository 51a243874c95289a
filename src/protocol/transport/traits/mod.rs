//! Abstraction traits used by the transport layer (serial line and clock).
//!
//! The wake-up pin and millisecond delays come from `embedded-hal`
//! ([`OutputPin`](embedded_hal::digital::OutputPin) and
//! [`DelayNs`](embedded_hal::delay::DelayNs)).
pub mod kline_clock;
pub mod serial_line;
