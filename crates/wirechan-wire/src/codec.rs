//! The two codec contracts the channel consumes.
//!
//! A concrete wire format implements [`Encoder`] and [`Decoder`] as a
//! matching pair; the channel stays byte-layout agnostic and only sequences
//! the calls. [`crate::PackedEncoder`]/[`crate::PackedDecoder`] are the
//! built-in pairing.

use crate::error::Result;
use crate::value::Tag;

/// One message-encoding session.
///
/// The channel drives a session in this exact order: [`Encoder::open`] with
/// the argument count, one append call per argument in message order,
/// [`Encoder::set_msg_id`], [`Encoder::close`], then [`Encoder::buffer`].
pub trait Encoder {
    /// Begin a session sized for `n_args` values.
    fn open(&mut self, n_args: usize) -> Result<()>;

    /// Append a word-family value: fixed-size scalars and null-string
    /// markers, identified by `tag`.
    fn on_word(&mut self, bits: u32, tag: Tag) -> Result<()>;

    /// Append a narrow string ([`Tag::String8`]) or opaque bytes
    /// ([`Tag::ByteArray`]).
    fn on_string8(&mut self, bytes: &[u8], tag: Tag) -> Result<()>;

    /// Append a wide string as UTF-16 code units ([`Tag::String16`]).
    fn on_string16(&mut self, units: &[u16], tag: Tag) -> Result<()>;

    /// Append a POSIX descriptor ([`Tag::UnixFd`]).
    fn on_unix_fd(&mut self, fd: i32, tag: Tag) -> Result<()>;

    /// Append a native handle ([`Tag::WinHandle`]).
    fn on_win_handle(&mut self, handle: u64, tag: Tag) -> Result<()>;

    /// Attach the message id to the session.
    fn set_msg_id(&mut self, msg_id: u32);

    /// Finalize the encoding. Fails if the session is inconsistent, e.g.
    /// fewer values were appended than declared at open.
    fn close(&mut self) -> Result<()>;

    /// The finalized buffer. `Some` only after a successful close.
    fn buffer(&self) -> Option<&[u8]>;
}

/// Callback target a [`Decoder`] reconstructs a message into.
///
/// Every callback returns `true` to continue or `false` to abort decoding;
/// an abort must surface as `Decoder::success() == false`. Returning
/// `false` on an unrecognized tag is the whitelist boundary that keeps
/// unexpected wire content out of the process.
pub trait DecodeHandler {
    /// Called exactly once, before any value callback. `declared` is the
    /// sender-claimed argument count — a hint, not a promise.
    fn on_message_start(&mut self, msg_id: u32, declared: usize) -> bool;

    /// One decoded word-family argument.
    fn on_word(&mut self, bits: u32, tag: Tag) -> bool;

    /// One decoded narrow-string or byte-array argument.
    fn on_string8(&mut self, bytes: &[u8], tag: Tag) -> bool;

    /// One decoded wide-string argument.
    fn on_string16(&mut self, units: &[u16], tag: Tag) -> bool;
}

/// Incremental decoder for one message.
///
/// Fed raw chunks by the channel until it stops asking for more; whether it
/// stopped because the message completed or because the input was rejected
/// is disambiguated by [`Decoder::success`].
pub trait Decoder {
    type Handler: DecodeHandler;

    /// Bind a fresh decoder to a fresh handler.
    fn bind(handler: Self::Handler) -> Self;

    /// Feed one chunk. Returns `true` while more data is wanted. An empty
    /// chunk signals end of stream: a decoder mid-message must stop and
    /// report failure rather than wait forever.
    fn on_data(&mut self, chunk: &[u8]) -> bool;

    /// True iff a complete, well-formed message was decoded.
    fn success(&self) -> bool;

    /// Recover the handler and whatever it accumulated.
    fn into_handler(self) -> Self::Handler;
}
