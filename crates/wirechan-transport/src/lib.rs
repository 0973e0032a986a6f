//! Byte-pipe transports for the wirechan message channel.
//!
//! The channel layer only requires the [`Transport`] trait: send a buffer,
//! block for the next chunk, observe end-of-stream. This crate provides the
//! trait plus the concrete transports a broker/worker pair actually uses:
//! - [`StreamTransport`] — adapter over any blocking `Read + Write` stream
//! - [`UnixDomainSocket`] / [`IpcStream`] — filesystem UDS endpoints (Unix)
//! - [`LoopbackTransport`] — in-memory pair for same-process use and tests

pub mod error;
pub mod loopback;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use loopback::LoopbackTransport;
pub use stream::StreamTransport;
pub use traits::Transport;

#[cfg(unix)]
pub use uds::{IpcStream, UnixDomainSocket};
