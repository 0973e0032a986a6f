//! Typed, transport-agnostic IPC message channel.
//!
//! wirechan carries messages — an id plus up to [`MAX_ARGS`] tagged
//! arguments — across a privilege boundary, e.g. between a trusted broker
//! and a sandboxed worker. The decode path treats every byte as
//! adversarial: unrecognized tags, malformed lengths, and oversized
//! argument lists abort the message with a distinct error, never a partial
//! dispatch.
//!
//! # Crate structure
//!
//! - [`transport`] — byte-pipe transports (streams, Unix sockets, loopback)
//! - [`wire`] — tagged values, codec contracts, the packed wire format
//! - [`Channel`] — send/receive orchestration over the two
//! - [`Router`]/[`Dispatch`] — message routing on the receive side
//!
//! # Example
//!
//! ```
//! use wirechan::{Channel, Router, WireValue};
//! use wirechan::transport::LoopbackTransport;
//! use wirechan::wire::{PackedDecoder, PackedEncoder, ReceiveAccumulator};
//!
//! let (broker_end, worker_end) = LoopbackTransport::pair();
//! let mut broker = Channel::new(broker_end);
//! let mut worker = Channel::new(worker_end);
//!
//! broker.send::<PackedEncoder>(7, &[WireValue::I32(42), WireValue::from("hello")])?;
//!
//! let mut routes = Router::new().route(
//!     7,
//!     |msg_id: u32, _ch: &mut Channel<LoopbackTransport>, args: &[WireValue]| {
//!         assert_eq!(msg_id, 7);
//!         assert_eq!(args[1].as_str8(), Some("hello"));
//!         0
//!     },
//! );
//! worker.receive::<PackedDecoder<ReceiveAccumulator>, _>(&mut routes)?;
//! # Ok::<(), wirechan::ChannelError>(())
//! ```

pub mod channel;
pub mod dispatch;
pub mod error;

/// Re-export transport types.
pub mod transport {
    pub use wirechan_transport::*;
}

/// Re-export wire-value and codec types.
pub mod wire {
    pub use wirechan_wire::*;
}

pub use channel::Channel;
pub use dispatch::{Dispatch, MessageHandler, Router};
pub use error::{ChannelError, Result};
pub use wirechan_wire::{Tag, WireValue, MAX_ARGS};
