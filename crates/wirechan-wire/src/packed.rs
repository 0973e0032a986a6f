//! The built-in wire format: a packed, little-endian tagged layout.
//!
//! ```text
//! ┌────────────┬────────────┬───────────┬──────────────┬─────────────────┐
//! │ Magic (2B) │ MsgId (4B) │ Args (2B) │ Payload (4B) │ Payload bytes    │
//! │ "WC"       │ LE         │ LE        │ length, LE   │                  │
//! └────────────┴────────────┴───────────┴──────────────┴─────────────────┘
//! ```
//!
//! Payload: per argument, one tag byte followed by the value — 4 LE bytes
//! for the word family and descriptors, a 4-byte LE length plus raw bytes
//! for narrow strings and byte arrays, a 4-byte LE unit count plus 2 LE
//! bytes per unit for wide strings. Null-string markers carry an empty word.
//!
//! The decoder decodes exactly one message and requires message-aligned
//! chunking: bytes beyond the declared total are a protocol violation, not
//! the start of a second message. Native handles ([`Tag::WinHandle`]) are
//! not representable in this format; handle transfer needs a
//! platform-specific codec pairing.

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::codec::{DecodeHandler, Decoder, Encoder};
use crate::error::{EncodeError, Result};
use crate::value::Tag;

/// Header: magic (2) + msg_id (4) + declared args (2) + payload length (4).
pub const HEADER_SIZE: usize = 12;

/// Magic bytes: "WC" (0x57 0x43).
pub const MAGIC: [u8; 2] = [0x57, 0x43];

/// Default maximum payload size: 1 MiB. Generous for an argument list that
/// is capped at [`crate::MAX_ARGS`] values.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

const MAX_DECLARED_ARGS: usize = u16::MAX as usize;

#[derive(Clone, Copy)]
enum Session {
    Idle,
    Open { declared: usize, appended: usize },
    Closed,
}

/// [`Encoder`] for the packed wire format.
pub struct PackedEncoder {
    session: Session,
    msg_id: u32,
    body: BytesMut,
    wire: Option<BytesMut>,
    max_payload: usize,
}

impl Default for PackedEncoder {
    fn default() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }
}

impl PackedEncoder {
    /// An encoder with an explicit payload budget.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            session: Session::Idle,
            msg_id: 0,
            body: BytesMut::new(),
            wire: None,
            // The payload length field is 32 bits wide.
            max_payload: max_payload.min(u32::MAX as usize),
        }
    }

    fn reserve_value(&mut self, value_size: usize) -> Result<()> {
        let Session::Open { declared, appended } = self.session else {
            return Err(EncodeError::SessionNotOpen);
        };
        if appended == declared {
            return Err(EncodeError::ValueOverflow { declared });
        }
        let size = self.body.len() + 1 + value_size;
        if size > self.max_payload {
            return Err(EncodeError::MessageTooLarge {
                size,
                max: self.max_payload,
            });
        }
        Ok(())
    }

    fn commit_value(&mut self) {
        if let Session::Open { appended, .. } = &mut self.session {
            *appended += 1;
        }
    }
}

impl Encoder for PackedEncoder {
    fn open(&mut self, n_args: usize) -> Result<()> {
        if !matches!(self.session, Session::Idle) {
            return Err(EncodeError::SessionAlreadyStarted);
        }
        if n_args > MAX_DECLARED_ARGS {
            return Err(EncodeError::TooManyArguments {
                declared: n_args,
                max: MAX_DECLARED_ARGS,
            });
        }
        self.session = Session::Open {
            declared: n_args,
            appended: 0,
        };
        Ok(())
    }

    fn on_word(&mut self, bits: u32, tag: Tag) -> Result<()> {
        if !tag.is_word() {
            return Err(EncodeError::UnsupportedTag { tag });
        }
        self.reserve_value(4)?;
        self.body.put_u8(tag.wire_byte());
        self.body.put_u32_le(bits);
        self.commit_value();
        Ok(())
    }

    fn on_string8(&mut self, bytes: &[u8], tag: Tag) -> Result<()> {
        if !matches!(tag, Tag::String8 | Tag::ByteArray) {
            return Err(EncodeError::UnsupportedTag { tag });
        }
        self.reserve_value(4 + bytes.len())?;
        self.body.put_u8(tag.wire_byte());
        self.body.put_u32_le(bytes.len() as u32);
        self.body.put_slice(bytes);
        self.commit_value();
        Ok(())
    }

    fn on_string16(&mut self, units: &[u16], tag: Tag) -> Result<()> {
        if tag != Tag::String16 {
            return Err(EncodeError::UnsupportedTag { tag });
        }
        self.reserve_value(4 + units.len() * 2)?;
        self.body.put_u8(tag.wire_byte());
        self.body.put_u32_le(units.len() as u32);
        for unit in units {
            self.body.put_u16_le(*unit);
        }
        self.commit_value();
        Ok(())
    }

    fn on_unix_fd(&mut self, fd: i32, tag: Tag) -> Result<()> {
        if tag != Tag::UnixFd {
            return Err(EncodeError::UnsupportedTag { tag });
        }
        self.reserve_value(4)?;
        self.body.put_u8(tag.wire_byte());
        self.body.put_u32_le(fd as u32);
        self.commit_value();
        Ok(())
    }

    fn on_win_handle(&mut self, _handle: u64, tag: Tag) -> Result<()> {
        // Native handles have no packed representation; see module docs.
        Err(EncodeError::UnsupportedTag { tag })
    }

    fn set_msg_id(&mut self, msg_id: u32) {
        self.msg_id = msg_id;
    }

    fn close(&mut self) -> Result<()> {
        let Session::Open { declared, appended } = self.session else {
            return Err(EncodeError::SessionNotOpen);
        };
        if appended != declared {
            return Err(EncodeError::CountMismatch { declared, appended });
        }

        let mut wire = BytesMut::with_capacity(HEADER_SIZE + self.body.len());
        wire.put_slice(&MAGIC);
        wire.put_u32_le(self.msg_id);
        wire.put_u16_le(declared as u16);
        wire.put_u32_le(self.body.len() as u32);
        wire.put_slice(&self.body);

        self.wire = Some(wire);
        self.session = Session::Closed;
        Ok(())
    }

    fn buffer(&self) -> Option<&[u8]> {
        self.wire.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Reading,
    Done,
    Failed,
}

/// [`Decoder`] for the packed wire format.
///
/// Accumulates chunks until one complete message is buffered, then parses
/// it and fires the handler callbacks in wire order. Every malformed case —
/// bad magic, oversized payload, unknown tag byte, truncated value,
/// trailing bytes, callback rejection, stream end mid-message — surfaces as
/// `success() == false`.
pub struct PackedDecoder<H> {
    handler: H,
    buf: BytesMut,
    state: DecodeState,
    max_payload: usize,
}

impl<H: DecodeHandler> PackedDecoder<H> {
    /// A decoder with an explicit payload budget.
    pub fn with_max_payload(handler: H, max_payload: usize) -> Self {
        Self {
            handler,
            buf: BytesMut::new(),
            state: DecodeState::Reading,
            max_payload,
        }
    }

    fn advance(&mut self) -> bool {
        if self.buf.len() < HEADER_SIZE {
            return true; // need more data
        }

        if self.buf[0..2] != MAGIC {
            trace!("rejecting message with bad magic");
            self.state = DecodeState::Failed;
            return false;
        }

        let msg_id = u32::from_le_bytes([self.buf[2], self.buf[3], self.buf[4], self.buf[5]]);
        let declared = u16::from_le_bytes([self.buf[6], self.buf[7]]) as usize;
        let payload_len =
            u32::from_le_bytes([self.buf[8], self.buf[9], self.buf[10], self.buf[11]]) as usize;

        if payload_len > self.max_payload {
            trace!(payload_len, max = self.max_payload, "rejecting oversized payload");
            self.state = DecodeState::Failed;
            return false;
        }

        let total = HEADER_SIZE + payload_len;
        if self.buf.len() < total {
            return true; // need more data
        }
        if self.buf.len() > total {
            trace!(extra = self.buf.len() - total, "rejecting trailing bytes");
            self.state = DecodeState::Failed;
            return false;
        }

        let payload = self.buf.split_off(HEADER_SIZE);
        let ok = parse_payload(&mut self.handler, msg_id, declared, &payload);
        self.state = if ok {
            DecodeState::Done
        } else {
            DecodeState::Failed
        };
        false
    }
}

impl<H: DecodeHandler> Decoder for PackedDecoder<H> {
    type Handler = H;

    fn bind(handler: H) -> Self {
        Self::with_max_payload(handler, DEFAULT_MAX_PAYLOAD)
    }

    fn on_data(&mut self, chunk: &[u8]) -> bool {
        if self.state != DecodeState::Reading {
            return false;
        }
        if chunk.is_empty() {
            // Stream ended before the message completed.
            trace!(buffered = self.buf.len(), "stream ended mid-message");
            self.state = DecodeState::Failed;
            return false;
        }
        self.buf.extend_from_slice(chunk);
        self.advance()
    }

    fn success(&self) -> bool {
        self.state == DecodeState::Done
    }

    fn into_handler(self) -> H {
        self.handler
    }
}

fn parse_payload<H: DecodeHandler>(
    handler: &mut H,
    msg_id: u32,
    declared: usize,
    payload: &[u8],
) -> bool {
    if !handler.on_message_start(msg_id, declared) {
        return false;
    }

    let mut rest = payload;
    while let Some((&tag_byte, tail)) = rest.split_first() {
        rest = tail;
        let Some(tag) = Tag::from_wire(tag_byte) else {
            trace!(tag_byte, "rejecting unknown tag byte");
            return false;
        };

        match tag {
            t if t.is_word() || t == Tag::UnixFd => {
                let Some(bits) = take_u32(&mut rest) else {
                    return false;
                };
                if !handler.on_word(bits, t) {
                    return false;
                }
            }
            Tag::String8 | Tag::ByteArray => {
                let Some(len) = take_u32(&mut rest) else {
                    return false;
                };
                let len = len as usize;
                if rest.len() < len {
                    trace!(len, available = rest.len(), "rejecting truncated string");
                    return false;
                }
                let (bytes, tail) = rest.split_at(len);
                if !handler.on_string8(bytes, tag) {
                    return false;
                }
                rest = tail;
            }
            Tag::String16 => {
                let Some(count) = take_u32(&mut rest) else {
                    return false;
                };
                let Some(byte_len) = (count as usize).checked_mul(2) else {
                    return false;
                };
                if rest.len() < byte_len {
                    trace!(count, available = rest.len(), "rejecting truncated wide string");
                    return false;
                }
                let (raw, tail) = rest.split_at(byte_len);
                let units: Vec<u16> = raw
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                if !handler.on_string16(&units, tag) {
                    return false;
                }
                rest = tail;
            }
            // Tag::None and Tag::WinHandle never appear in well-formed
            // packed payloads.
            _ => {
                trace!(tag = ?tag, "rejecting tag with no packed representation");
                return false;
            }
        }
    }
    true
}

fn take_u32(rest: &mut &[u8]) -> Option<u32> {
    if rest.len() < 4 {
        return None;
    }
    let (head, tail) = rest.split_at(4);
    *rest = tail;
    Some(u32::from_le_bytes([head[0], head[1], head[2], head[3]]))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::accumulate::ReceiveAccumulator;
    use crate::value::WireValue;

    fn append_value(enc: &mut PackedEncoder, value: &WireValue) -> Result<()> {
        match value {
            WireValue::String8(s) => enc.on_string8(s.as_bytes(), Tag::String8),
            WireValue::ByteArray(b) => enc.on_string8(b, Tag::ByteArray),
            WireValue::String16(units) => enc.on_string16(units, Tag::String16),
            WireValue::UnixFd(fd) => enc.on_unix_fd(*fd, Tag::UnixFd),
            WireValue::WinHandle(h) => enc.on_win_handle(*h, Tag::WinHandle),
            word => enc.on_word(word.word_bits().unwrap(), word.tag()),
        }
    }

    fn encode(msg_id: u32, values: &[WireValue]) -> Vec<u8> {
        let mut enc = PackedEncoder::default();
        enc.open(values.len()).unwrap();
        for value in values {
            append_value(&mut enc, value).unwrap();
        }
        enc.set_msg_id(msg_id);
        enc.close().unwrap();
        enc.buffer().unwrap().to_vec()
    }

    fn decode(wire: &[u8]) -> (bool, ReceiveAccumulator) {
        let mut dec = PackedDecoder::bind(ReceiveAccumulator::new());
        let wants_more = dec.on_data(wire);
        assert!(!wants_more, "one full message should settle the decoder");
        (dec.success(), dec.into_handler())
    }

    #[test]
    fn roundtrip_mixed_arguments_in_order() {
        let values = vec![
            WireValue::I32(-42),
            WireValue::U32(0xDEAD_BEEF),
            WireValue::Char8(b'k'),
            WireValue::Char16(0x2603),
            WireValue::from("hello"),
            WireValue::string16_from_str("wïde"),
            WireValue::NullString8,
            WireValue::NullString16,
        ];

        let wire = encode(7, &values);
        let (ok, acc) = decode(&wire);

        assert!(ok);
        assert_eq!(acc.msg_id(), Some(7));
        assert_eq!(acc.args(), values.as_slice());
    }

    #[test]
    fn roundtrip_byte_array_with_embedded_zeros() {
        let values = vec![WireValue::ByteArray(Bytes::from_static(&[0, 1, 0, 2, 0]))];
        let (ok, acc) = decode(&encode(3, &values));
        assert!(ok);
        assert_eq!(acc.arg(0).as_bytes(), Some(&[0, 1, 0, 2, 0][..]));
    }

    #[test]
    fn empty_string_stays_distinct_from_null_marker() {
        let values = vec![WireValue::String8(String::new()), WireValue::NullString8];
        let (ok, acc) = decode(&encode(4, &values));
        assert!(ok);
        assert_eq!(acc.arg(0), &WireValue::String8(String::new()));
        assert_eq!(acc.arg(1), &WireValue::NullString8);
        assert_ne!(acc.arg(0), acc.arg(1));
    }

    #[test]
    fn byte_by_byte_feed_decodes() {
        let wire = encode(9, &[WireValue::from("incremental"), WireValue::U32(1)]);

        let mut dec = PackedDecoder::bind(ReceiveAccumulator::new());
        for (ix, byte) in wire.iter().enumerate() {
            let wants_more = dec.on_data(std::slice::from_ref(byte));
            assert_eq!(wants_more, ix + 1 < wire.len());
        }

        assert!(dec.success());
        let acc = dec.into_handler();
        assert_eq!(acc.arg(0).as_str8(), Some("incremental"));
    }

    #[test]
    fn stream_end_mid_message_fails() {
        let wire = encode(1, &[WireValue::I32(5)]);

        let mut dec = PackedDecoder::bind(ReceiveAccumulator::new());
        assert!(dec.on_data(&wire[..HEADER_SIZE]));
        assert!(!dec.on_data(&[]));
        assert!(!dec.success());
    }

    #[test]
    fn bad_magic_fails() {
        let mut wire = encode(1, &[]);
        wire[0] = 0xFF;
        let (ok, _) = decode(&wire);
        assert!(!ok);
    }

    #[test]
    fn oversized_payload_header_fails() {
        let mut wire = BytesMut::new();
        wire.put_slice(&MAGIC);
        wire.put_u32_le(1);
        wire.put_u16_le(1);
        wire.put_u32_le((DEFAULT_MAX_PAYLOAD + 1) as u32);

        let mut dec = PackedDecoder::bind(ReceiveAccumulator::new());
        assert!(!dec.on_data(&wire));
        assert!(!dec.success());
    }

    #[test]
    fn unknown_tag_byte_fails() {
        let mut wire = BytesMut::new();
        wire.put_slice(&MAGIC);
        wire.put_u32_le(2);
        wire.put_u16_le(1);
        wire.put_u32_le(5);
        wire.put_u8(12); // no such tag
        wire.put_u32_le(0);

        let (ok, acc) = decode(&wire);
        assert!(!ok);
        assert!(acc.is_empty());
    }

    #[test]
    fn truncated_string_length_fails() {
        let mut wire = BytesMut::new();
        wire.put_slice(&MAGIC);
        wire.put_u32_le(2);
        wire.put_u16_le(1);
        wire.put_u32_le(7);
        wire.put_u8(Tag::String8.wire_byte());
        wire.put_u32_le(1000); // claims far more than the payload holds
        wire.put_slice(b"ab");

        let (ok, _) = decode(&wire);
        assert!(!ok);
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut wire = encode(1, &[WireValue::U32(1)]);
        wire.push(0x00);
        let (ok, _) = decode(&wire);
        assert!(!ok);
    }

    #[test]
    fn descriptor_roundtrip_is_rejected_at_the_accumulator() {
        // The fd travels the word path on the wire; the standard
        // accumulator's whitelist refuses it.
        let wire = encode(5, &[WireValue::UnixFd(3)]);
        let (ok, acc) = decode(&wire);
        assert!(!ok);
        assert!(acc.is_empty());
    }

    #[test]
    fn rejection_after_valid_prefix_still_fails_whole_message() {
        let wire = encode(6, &[WireValue::I32(1), WireValue::from("ok"), WireValue::UnixFd(4)]);
        let (ok, _) = decode(&wire);
        assert!(!ok);
    }

    #[test]
    fn handler_can_reject_at_message_start() {
        struct RejectAll;

        impl DecodeHandler for RejectAll {
            fn on_message_start(&mut self, _msg_id: u32, _declared: usize) -> bool {
                false
            }
            fn on_word(&mut self, _bits: u32, _tag: Tag) -> bool {
                true
            }
            fn on_string8(&mut self, _bytes: &[u8], _tag: Tag) -> bool {
                true
            }
            fn on_string16(&mut self, _units: &[u16], _tag: Tag) -> bool {
                true
            }
        }

        let wire = encode(8, &[]);
        let mut dec = PackedDecoder::bind(RejectAll);
        assert!(!dec.on_data(&wire));
        assert!(!dec.success());
    }

    #[test]
    fn settled_decoder_refuses_more_data() {
        let wire = encode(1, &[]);
        let mut dec = PackedDecoder::bind(ReceiveAccumulator::new());
        assert!(!dec.on_data(&wire));
        assert!(dec.success());
        assert!(!dec.on_data(b"more"));
        assert!(dec.success());
    }

    #[test]
    fn win_handle_rejected_at_encode() {
        let mut enc = PackedEncoder::default();
        enc.open(1).unwrap();
        let err = enc.on_win_handle(0xCAFE, Tag::WinHandle).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedTag { tag: Tag::WinHandle }));
    }

    #[test]
    fn encoder_word_call_rejects_non_word_tags() {
        let mut enc = PackedEncoder::default();
        enc.open(1).unwrap();
        let err = enc.on_word(0, Tag::String8).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedTag { tag: Tag::String8 }));
    }

    #[test]
    fn close_with_missing_values_fails_and_yields_no_buffer() {
        let mut enc = PackedEncoder::default();
        enc.open(2).unwrap();
        enc.on_word(1, Tag::U32).unwrap();
        enc.set_msg_id(1);

        let err = enc.close().unwrap_err();
        assert!(matches!(
            err,
            EncodeError::CountMismatch {
                declared: 2,
                appended: 1
            }
        ));
        assert!(enc.buffer().is_none());
    }

    #[test]
    fn appending_beyond_declared_count_fails() {
        let mut enc = PackedEncoder::default();
        enc.open(1).unwrap();
        enc.on_word(1, Tag::U32).unwrap();
        let err = enc.on_word(2, Tag::U32).unwrap_err();
        assert!(matches!(err, EncodeError::ValueOverflow { declared: 1 }));
    }

    #[test]
    fn append_without_open_fails() {
        let mut enc = PackedEncoder::default();
        let err = enc.on_word(1, Tag::U32).unwrap_err();
        assert!(matches!(err, EncodeError::SessionNotOpen));
    }

    #[test]
    fn reopen_fails() {
        let mut enc = PackedEncoder::default();
        enc.open(0).unwrap();
        let err = enc.open(0).unwrap_err();
        assert!(matches!(err, EncodeError::SessionAlreadyStarted));
    }

    #[test]
    fn payload_budget_enforced_at_encode() {
        let mut enc = PackedEncoder::with_max_payload(16);
        enc.open(1).unwrap();
        let err = enc.on_string8(&[0xAB; 64], Tag::ByteArray).unwrap_err();
        assert!(matches!(err, EncodeError::MessageTooLarge { .. }));
    }

    #[test]
    fn buffer_before_close_is_none() {
        let mut enc = PackedEncoder::default();
        enc.open(0).unwrap();
        assert!(enc.buffer().is_none());
    }
}
