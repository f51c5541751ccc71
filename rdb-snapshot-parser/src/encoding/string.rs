use core::{borrow::Borrow, fmt, ops::Deref};
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    cursor::ByteCursor,
    encoding::{
        Decoded,
        length::{Length, SpecialInt, read_length},
    },
    error::Result,
    util::fmt_bytes,
};

/// Binary-safe string as stored in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RdbString(Vec<u8>);

impl RdbString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for RdbString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for RdbString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for RdbString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RdbString {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for RdbString {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl From<&str> for RdbString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Display for RdbString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bytes(f, &self.0)
    }
}

/// Decode one length-prefixed string.
///
/// For the integer sub-encodings the payload bytes are returned verbatim as
/// the content; use [`int_encoded_value`] on `raw` for the numeric reading.
/// Compressed strings fail with `Unsupported` before the payload is read.
pub fn read_string<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Decoded<RdbString>> {
    let Decoded {
        value: len,
        mut raw,
    } = read_length(cursor)?;
    let n = match len {
        Length::Plain(n) => n,
        Length::Special(kind) => kind.payload_len() as u64,
    };
    let content = cursor.read_bytes(n)?;
    raw.extend_from_slice(&content);
    Ok(Decoded::new(RdbString(content), raw))
}

/// Numeric value of an integer-encoded string, given its full raw span
/// (marker byte plus payload). Payloads are little-endian signed integers.
///
/// Returns `None` when `raw` is not an integer-encoded string.
pub fn int_encoded_value(raw: &[u8]) -> Option<i64> {
    let (&marker, payload) = raw.split_first()?;
    let kind = SpecialInt::from_marker(marker)?;
    if payload.len() != kind.payload_len() {
        return None;
    }
    Some(match kind {
        SpecialInt::Int8 => i64::from(payload[0] as i8),
        SpecialInt::Int16 => i64::from(LittleEndian::read_i16(payload)),
        SpecialInt::Int32 => i64::from(LittleEndian::read_i32(payload)),
    })
}
