use bytes::Bytes;

/// Wire type tag.
///
/// One discriminant per [`WireValue`] variant plus [`Tag::None`], the
/// invalid/uninitialized wire state. `None` has no value variant, so it can
/// never be constructed as an argument — it only exists to be observed (and
/// rejected) as a raw tag byte on the wire. Discriminants are the wire
/// encoding and must not be reordered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    None = 0,
    I32 = 1,
    U32 = 2,
    Char8 = 3,
    Char16 = 4,
    String8 = 5,
    String16 = 6,
    NullString8 = 7,
    NullString16 = 8,
    ByteArray = 9,
    UnixFd = 10,
    WinHandle = 11,
}

impl Tag {
    /// Decode a raw wire byte into a tag. Unknown bytes are `None` (the
    /// `Option`, not [`Tag::None`]) and must abort decoding.
    pub fn from_wire(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Tag::None,
            1 => Tag::I32,
            2 => Tag::U32,
            3 => Tag::Char8,
            4 => Tag::Char16,
            5 => Tag::String8,
            6 => Tag::String16,
            7 => Tag::NullString8,
            8 => Tag::NullString16,
            9 => Tag::ByteArray,
            10 => Tag::UnixFd,
            11 => Tag::WinHandle,
            _ => return None,
        })
    }

    /// The byte this tag encodes to.
    pub fn wire_byte(self) -> u8 {
        self as u8
    }

    /// Whether this tag travels through the word callback: fixed-size
    /// scalars and the null-string markers.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            Tag::I32
                | Tag::U32
                | Tag::Char8
                | Tag::Char16
                | Tag::NullString8
                | Tag::NullString16
        )
    }
}

/// One immutable, tagged message argument.
///
/// A closed sum type: each variant carries exactly one payload and maps to
/// exactly one [`Tag`], so reading a payload through the wrong accessor is
/// not expressible. String and byte payloads are always owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    I32(i32),
    U32(u32),
    Char8(u8),
    Char16(u16),
    /// Narrow string. Distinct from [`WireValue::NullString8`].
    String8(String),
    /// Wide string as UTF-16 code units. Distinct from
    /// [`WireValue::NullString16`].
    String16(Vec<u16>),
    /// Explicit null narrow string marker.
    NullString8,
    /// Explicit null wide string marker.
    NullString16,
    /// Opaque bytes; embedded zeros allowed.
    ByteArray(Bytes),
    /// POSIX file descriptor payload.
    UnixFd(i32),
    /// Native handle payload for the Windows platform family.
    WinHandle(u64),
}

impl WireValue {
    /// Build a wide-string value from UTF-8 text.
    pub fn string16_from_str(s: &str) -> Self {
        WireValue::String16(s.encode_utf16().collect())
    }

    /// The tag for this value. Never [`Tag::None`].
    pub fn tag(&self) -> Tag {
        match self {
            WireValue::I32(_) => Tag::I32,
            WireValue::U32(_) => Tag::U32,
            WireValue::Char8(_) => Tag::Char8,
            WireValue::Char16(_) => Tag::Char16,
            WireValue::String8(_) => Tag::String8,
            WireValue::String16(_) => Tag::String16,
            WireValue::NullString8 => Tag::NullString8,
            WireValue::NullString16 => Tag::NullString16,
            WireValue::ByteArray(_) => Tag::ByteArray,
            WireValue::UnixFd(_) => Tag::UnixFd,
            WireValue::WinHandle(_) => Tag::WinHandle,
        }
    }

    /// The 32-bit wire representation for word-family values (scalars and
    /// null-string markers, which encode as an empty word).
    pub fn word_bits(&self) -> Option<u32> {
        match self {
            WireValue::I32(v) => Some(*v as u32),
            WireValue::U32(v) => Some(*v),
            WireValue::Char8(c) => Some(u32::from(*c)),
            WireValue::Char16(c) => Some(u32::from(*c)),
            WireValue::NullString8 | WireValue::NullString16 => Some(0),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            WireValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            WireValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char8(&self) -> Option<u8> {
        match self {
            WireValue::Char8(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_char16(&self) -> Option<u16> {
        match self {
            WireValue::Char16(c) => Some(*c),
            _ => None,
        }
    }

    /// Narrow string content. `None` for every other tag, including the
    /// null-string marker.
    pub fn as_str8(&self) -> Option<&str> {
        match self {
            WireValue::String8(s) => Some(s),
            _ => None,
        }
    }

    /// Wide string content as UTF-16 code units.
    pub fn as_str16(&self) -> Option<&[u16]> {
        match self {
            WireValue::String16(units) => Some(units),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            WireValue::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_unix_fd(&self) -> Option<i32> {
        match self {
            WireValue::UnixFd(fd) => Some(*fd),
            _ => None,
        }
    }

    pub fn as_win_handle(&self) -> Option<u64> {
        match self {
            WireValue::WinHandle(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<i32> for WireValue {
    fn from(v: i32) -> Self {
        WireValue::I32(v)
    }
}

impl From<u32> for WireValue {
    fn from(v: u32) -> Self {
        WireValue::U32(v)
    }
}

impl From<u8> for WireValue {
    fn from(c: u8) -> Self {
        WireValue::Char8(c)
    }
}

impl From<u16> for WireValue {
    fn from(c: u16) -> Self {
        WireValue::Char16(c)
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        WireValue::String8(s.to_owned())
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        WireValue::String8(s)
    }
}

impl From<Bytes> for WireValue {
    fn from(bytes: Bytes) -> Self {
        WireValue::ByteArray(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_wire_bytes_roundtrip() {
        for byte in 0u8..=11 {
            let tag = Tag::from_wire(byte).unwrap();
            assert_eq!(tag.wire_byte(), byte);
        }
        assert!(Tag::from_wire(12).is_none());
        assert!(Tag::from_wire(0xFF).is_none());
    }

    #[test]
    fn values_report_their_tag() {
        assert_eq!(WireValue::I32(-5).tag(), Tag::I32);
        assert_eq!(WireValue::U32(5).tag(), Tag::U32);
        assert_eq!(WireValue::Char8(b'x').tag(), Tag::Char8);
        assert_eq!(WireValue::Char16(0x2603).tag(), Tag::Char16);
        assert_eq!(WireValue::from("hi").tag(), Tag::String8);
        assert_eq!(WireValue::string16_from_str("hi").tag(), Tag::String16);
        assert_eq!(WireValue::NullString8.tag(), Tag::NullString8);
        assert_eq!(WireValue::NullString16.tag(), Tag::NullString16);
        assert_eq!(WireValue::ByteArray(Bytes::new()).tag(), Tag::ByteArray);
        assert_eq!(WireValue::UnixFd(3).tag(), Tag::UnixFd);
        assert_eq!(WireValue::WinHandle(0xDEAD).tag(), Tag::WinHandle);
    }

    #[test]
    fn mismatched_accessor_is_none() {
        let v = WireValue::I32(42);
        assert_eq!(v.as_i32(), Some(42));
        assert!(v.as_u32().is_none());
        assert!(v.as_str8().is_none());
        assert!(v.as_bytes().is_none());
        assert!(v.as_unix_fd().is_none());
    }

    #[test]
    fn null_string_is_not_empty_string() {
        let null = WireValue::NullString8;
        let empty = WireValue::String8(String::new());
        assert_ne!(null, empty);
        assert!(null.as_str8().is_none());
        assert_eq!(empty.as_str8(), Some(""));
    }

    #[test]
    fn word_bits_cover_the_word_family() {
        assert_eq!(WireValue::I32(-1).word_bits(), Some(u32::MAX));
        assert_eq!(WireValue::U32(7).word_bits(), Some(7));
        assert_eq!(WireValue::Char8(b'a').word_bits(), Some(u32::from(b'a')));
        assert_eq!(WireValue::Char16(0x1234).word_bits(), Some(0x1234));
        assert_eq!(WireValue::NullString8.word_bits(), Some(0));
        assert_eq!(WireValue::NullString16.word_bits(), Some(0));
        assert!(WireValue::from("s").word_bits().is_none());
        assert!(WireValue::UnixFd(1).word_bits().is_none());
    }

    #[test]
    fn string16_helper_encodes_utf16() {
        let v = WireValue::string16_from_str("héllo");
        let units = v.as_str16().unwrap();
        assert_eq!(String::from_utf16(units).unwrap(), "héllo");
    }
}
