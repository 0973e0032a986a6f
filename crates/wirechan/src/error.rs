use wirechan_transport::TransportError;
use wirechan_wire::{EncodeError, Tag};

/// Errors surfaced by channel send and receive.
///
/// Every failure mode is a distinct variant; the channel never retries and
/// never truncates silently.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The encoder refused to start a session for the argument count.
    #[error("encoder rejected opening a {n_args}-argument session: {source}")]
    EncodeOpen { n_args: usize, source: EncodeError },

    /// The encoder refused a specific argument.
    #[error("encoder rejected argument {index} ({tag:?}): {source}")]
    EncodeArgument {
        index: usize,
        tag: Tag,
        source: EncodeError,
    },

    /// The encoder failed to finalize the session after all arguments were
    /// appended.
    #[error("encoder failed to close the message session: {0}")]
    EncodeClose(#[source] EncodeError),

    /// The encoder reported a successful close but produced no buffer.
    #[error("encoder produced no buffer after close")]
    EncodeBufferMissing,

    /// No complete, well-formed message could be decoded: malformed bytes,
    /// a rejected tag, or the stream ended mid-message.
    #[error("message decoding failed")]
    DecodeFailed,

    /// The decoded argument count exceeds the protocol capacity. A protocol
    /// violation — the message is not dispatched.
    #[error("decoded message carries {count} arguments, limit is {max}")]
    ArgumentCountExceeded { count: usize, max: usize },

    /// The dispatch table has no entry for the decoded message id.
    #[error("no handler registered for message {msg_id}")]
    NoHandler { msg_id: u32 },

    /// Propagated from the transport, uninterpreted.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
