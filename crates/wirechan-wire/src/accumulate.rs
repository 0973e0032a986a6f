use bytes::Bytes;
use tracing::trace;

use crate::codec::DecodeHandler;
use crate::value::{Tag, WireValue};
use crate::MAX_ARGS;

/// Collects decoder callbacks into an ordered, owned argument list.
///
/// This is the receive-side trust boundary: every callback whitelists the
/// tags it recognizes and rejects everything else, and every stored payload
/// is an owned copy whose validity does not depend on decoder-internal
/// buffers. The accumulator does not enforce the declared argument count —
/// the channel checks the accumulated count against [`MAX_ARGS`] before
/// dispatch.
#[derive(Debug, Default)]
pub struct ReceiveAccumulator {
    msg_id: Option<u32>,
    values: Vec<WireValue>,
}

impl ReceiveAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded message id; `None` until the message start arrived.
    pub fn msg_id(&self) -> Option<u32> {
        self.msg_id
    }

    /// Number of accumulated arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All accumulated arguments in wire order.
    pub fn args(&self) -> &[WireValue] {
        &self.values
    }

    /// The argument at `ix`. Indexing past [`Self::len`] is a caller
    /// contract violation and panics.
    pub fn arg(&self, ix: usize) -> &WireValue {
        &self.values[ix]
    }
}

impl DecodeHandler for ReceiveAccumulator {
    fn on_message_start(&mut self, msg_id: u32, declared: usize) -> bool {
        self.msg_id = Some(msg_id);
        // The declared count is attacker-controlled; never let it drive
        // allocation beyond the protocol capacity.
        self.values.reserve(declared.min(MAX_ARGS));
        true
    }

    fn on_word(&mut self, bits: u32, tag: Tag) -> bool {
        let value = match tag {
            Tag::I32 => WireValue::I32(bits as i32),
            Tag::U32 => WireValue::U32(bits),
            Tag::Char8 => WireValue::Char8(bits as u8),
            Tag::Char16 => WireValue::Char16(bits as u16),
            Tag::NullString8 => WireValue::NullString8,
            Tag::NullString16 => WireValue::NullString16,
            other => {
                trace!(tag = ?other, "rejecting word with unrecognized tag");
                return false;
            }
        };
        self.values.push(value);
        true
    }

    fn on_string8(&mut self, bytes: &[u8], tag: Tag) -> bool {
        let value = match tag {
            Tag::String8 => match std::str::from_utf8(bytes) {
                Ok(s) => WireValue::String8(s.to_owned()),
                Err(_) => {
                    trace!("rejecting narrow string with invalid utf-8");
                    return false;
                }
            },
            Tag::ByteArray => WireValue::ByteArray(Bytes::copy_from_slice(bytes)),
            other => {
                trace!(tag = ?other, "rejecting string8 with unrecognized tag");
                return false;
            }
        };
        self.values.push(value);
        true
    }

    fn on_string16(&mut self, units: &[u16], tag: Tag) -> bool {
        match tag {
            Tag::String16 => {
                self.values.push(WireValue::String16(units.to_vec()));
                true
            }
            other => {
                trace!(tag = ?other, "rejecting string16 with unrecognized tag");
                false
            }
        }
    }
}
