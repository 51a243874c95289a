//! High-level components of the K-line protocol: driver configuration,
//! half-duplex transport, and the session bootstrap built on top of it.
pub mod config;
pub mod session;
pub mod transport;
