use bytes::Bytes;

use crate::error::Result;

/// A bidirectional byte pipe the channel layer sends and receives through.
///
/// The channel treats the transport as opaque: framing below the byte level,
/// timeouts, and cancellation are all the concrete transport's business. A
/// transport is exclusively owned by one channel for its lifetime.
pub trait Transport {
    /// Transmit `buf` in full. Returns the number of bytes handed to the
    /// peer, which the caller reports verbatim.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;

    /// Block until the next chunk of bytes is available.
    ///
    /// Returns `Ok(None)` exactly when the stream is closed and no further
    /// data will arrive. Chunk boundaries carry no meaning.
    fn recv_chunk(&mut self) -> Result<Option<Bytes>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn recv_chunk(&mut self) -> Result<Option<Bytes>> {
        (**self).recv_chunk()
    }
}
