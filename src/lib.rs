//! `kline-kds` library: ISO 9141-2 / ISO 14230 "K-line" driver for talking to
//! a vehicle ECU from a `no_std` target. The crate exposes the frame layout and
//! checksum helpers, the timing window used by every wait loop, the request and
//! response paths of the half-duplex link, and the fast-init session bootstrap.
#![no_std]
//==================================================================================
/// Fixed-capacity frame buffer shared by requests and responses.
pub mod core;
/// Transport, framing, and session errors plus the last-error classification.
pub mod error;
/// K-line protocol implementation: framing, timing, link, and session bootstrap.
pub mod protocol;
//==================================================================================
