//! Tagged wire values and the codec boundary for the wirechan channel.
//!
//! Everything that crosses the trust boundary is expressed here:
//! - [`WireValue`]/[`Tag`] — the closed set of typed message arguments
//! - [`Encoder`]/[`Decoder`]/[`DecodeHandler`] — the contracts a concrete
//!   wire format implements and the channel sequences
//! - [`ReceiveAccumulator`] — the whitelisting handler that turns decoder
//!   callbacks into an owned argument list
//! - [`PackedEncoder`]/[`PackedDecoder`] — the built-in wire format

pub mod accumulate;
pub mod codec;
pub mod error;
pub mod packed;
pub mod value;

pub use accumulate::ReceiveAccumulator;
pub use codec::{DecodeHandler, Decoder, Encoder};
pub use error::{EncodeError, Result};
pub use packed::{PackedDecoder, PackedEncoder, DEFAULT_MAX_PAYLOAD};
pub use value::{Tag, WireValue};

/// Hard per-message argument bound.
///
/// A protocol limit, not an incidental buffer size: the channel refuses to
/// dispatch any message whose decoded argument count exceeds it.
pub const MAX_ARGS: usize = 8;
