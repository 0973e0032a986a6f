use tracing::{debug, trace};
use wirechan_transport::Transport;
use wirechan_wire::{Decoder, Encoder, ReceiveAccumulator, Tag, WireValue, MAX_ARGS};

use crate::dispatch::Dispatch;
use crate::error::{ChannelError, Result};

/// Coordinator between the transport, the encoder, the decoder, and the
/// dispatch table.
///
/// A channel exclusively owns one bidirectional transport and does not
/// distinguish sender from receiver: either end may [`Channel::send`] or
/// [`Channel::receive`]. Both calls are synchronous and blocking; callers
/// needing concurrent send and receive serialize externally. The encoder
/// and decoder are chosen per call, so one channel can speak any matching
/// codec pairing its peer agrees on.
pub struct Channel<T> {
    transport: T,
}

impl<T: Transport> Channel<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the owned transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the channel and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Encode `args` as one message and transmit it.
    ///
    /// The argument values are borrowed for the duration of the call.
    /// Returns whatever the transport reports as bytes transmitted,
    /// uninterpreted.
    pub fn send<E: Encoder + Default>(&mut self, msg_id: u32, args: &[WireValue]) -> Result<usize> {
        let mut encoder = E::default();
        encoder
            .open(args.len())
            .map_err(|source| ChannelError::EncodeOpen {
                n_args: args.len(),
                source,
            })?;

        for (index, value) in args.iter().enumerate() {
            append_argument(&mut encoder, value).map_err(|source| {
                ChannelError::EncodeArgument {
                    index,
                    tag: value.tag(),
                    source,
                }
            })?;
        }

        encoder.set_msg_id(msg_id);
        encoder.close().map_err(ChannelError::EncodeClose)?;

        let buffer = encoder.buffer().ok_or(ChannelError::EncodeBufferMissing)?;
        debug!(msg_id, n_args = args.len(), bytes = buffer.len(), "sending message");
        Ok(self.transport.send(buffer)?)
    }

    /// Receive one message and dispatch it.
    ///
    /// Reads chunks from the transport into a fresh decoder bound to a
    /// fresh [`ReceiveAccumulator`] until the decoder stops asking for
    /// data; a closed transport is signalled to the decoder as an empty
    /// chunk, so the loop always terminates. The decoded argument count is
    /// checked against [`MAX_ARGS`] before any handler runs. Returns the
    /// resolved handler's status verbatim.
    pub fn receive<D, S>(&mut self, dispatch: &mut S) -> Result<usize>
    where
        D: Decoder<Handler = ReceiveAccumulator>,
        S: Dispatch<T> + ?Sized,
    {
        let mut decoder = D::bind(ReceiveAccumulator::new());
        loop {
            match self.transport.recv_chunk()? {
                Some(chunk) => {
                    trace!(bytes = chunk.len(), "feeding chunk to decoder");
                    if !decoder.on_data(&chunk) {
                        break;
                    }
                }
                None => {
                    decoder.on_data(&[]);
                    break;
                }
            }
        }

        if !decoder.success() {
            return Err(ChannelError::DecodeFailed);
        }

        let accumulated = decoder.into_handler();
        let count = accumulated.len();
        if count > MAX_ARGS {
            return Err(ChannelError::ArgumentCountExceeded {
                count,
                max: MAX_ARGS,
            });
        }

        // A successful decode always saw a message start.
        let msg_id = accumulated.msg_id().ok_or(ChannelError::DecodeFailed)?;
        let handler = dispatch
            .resolve(msg_id)
            .ok_or(ChannelError::NoHandler { msg_id })?;

        debug!(msg_id, n_args = count, "dispatching message");
        Ok(handler.on_message(msg_id, self, accumulated.args()))
    }
}

/// Feed one value into the encoder through the append call its tag selects.
fn append_argument<E: Encoder>(encoder: &mut E, value: &WireValue) -> wirechan_wire::Result<()> {
    match value {
        WireValue::String8(s) => encoder.on_string8(s.as_bytes(), Tag::String8),
        WireValue::ByteArray(bytes) => encoder.on_string8(bytes, Tag::ByteArray),
        WireValue::String16(units) => encoder.on_string16(units, Tag::String16),
        WireValue::UnixFd(fd) => encoder.on_unix_fd(*fd, Tag::UnixFd),
        WireValue::WinHandle(handle) => encoder.on_win_handle(*handle, Tag::WinHandle),
        word => encoder.on_word(word.word_bits().unwrap_or_default(), word.tag()),
    }
}
