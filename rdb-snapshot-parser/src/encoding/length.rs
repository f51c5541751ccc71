use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::{
    cursor::ByteCursor,
    encoding::Decoded,
    error::{DecodeError, Feature, Result},
};

const MODE_6BIT: u8 = 0;
const MODE_14BIT: u8 = 1;
const MODE_WIDE: u8 = 2;
const MODE_SPECIAL: u8 = 3;

const WIDE_32BIT: u8 = 0;
const WIDE_64BIT: u8 = 1;

const SPECIAL_INT8: u8 = 0;
const SPECIAL_INT16: u8 = 1;
const SPECIAL_INT32: u8 = 2;
const SPECIAL_LZF: u8 = 3;

/// Result of decoding one length field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Length {
    /// An ordinary unsigned length or count.
    Plain(u64),
    /// Not a length: the next [`SpecialInt::payload_len`] bytes are a small
    /// integer stored as string content.
    Special(SpecialInt),
}

/// Width of an integer-encoded string payload (mode `11`, sub-types 0..=2).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpecialInt {
    Int8,
    Int16,
    Int32,
}

impl SpecialInt {
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
        }
    }

    pub(crate) const fn from_marker(b: u8) -> Option<Self> {
        if b >> 6 != MODE_SPECIAL {
            return None;
        }
        match b & 0x3F {
            SPECIAL_INT8 => Some(Self::Int8),
            SPECIAL_INT16 => Some(Self::Int16),
            SPECIAL_INT32 => Some(Self::Int32),
            _ => None,
        }
    }
}

/// Decode one length field.
///
/// The top two bits of the first byte pick the mode:
///   - `00`: 6-bit value in the same byte
///   - `01`: 14-bit value, low 6 bits + next byte, big-endian
///   - `10`: low bits 0 or 1 select a following big-endian u32 or u64
///   - `11`: special string encoding; 0..=2 are integers, 3 is LZF
pub fn read_length<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Decoded<Length>> {
    let first = cursor.read_byte()?;
    let low = first & 0x3F;

    match first >> 6 {
        MODE_6BIT => Ok(Decoded::new(Length::Plain(u64::from(low)), vec![first])),
        MODE_14BIT => {
            let next = cursor.read_byte()?;
            let value = (u64::from(low) << 8) | u64::from(next);
            Ok(Decoded::new(Length::Plain(value), vec![first, next]))
        }
        MODE_WIDE => {
            let width = match low {
                WIDE_32BIT => 4,
                WIDE_64BIT => 8,
                _ => return Err(DecodeError::MalformedLength("reserved width selector")),
            };
            let mut raw = [0u8; 9];
            raw[0] = first;
            cursor.read_into(&mut raw[1..=width])?;
            let value = match width {
                4 => u64::from(BigEndian::read_u32(&raw[1..5])),
                _ => BigEndian::read_u64(&raw[1..9]),
            };
            Ok(Decoded::new(Length::Plain(value), raw[..=width].to_vec()))
        }
        _ => match low {
            SPECIAL_INT8 => Ok(Decoded::new(Length::Special(SpecialInt::Int8), vec![first])),
            SPECIAL_INT16 => Ok(Decoded::new(Length::Special(SpecialInt::Int16), vec![first])),
            SPECIAL_INT32 => Ok(Decoded::new(Length::Special(SpecialInt::Int32), vec![first])),
            SPECIAL_LZF => Err(DecodeError::Unsupported(Feature::CompressedString)),
            _ => Err(DecodeError::MalformedLength("reserved special encoding")),
        },
    }
}

/// Decode a length field that must be a plain count (database number,
/// element count, expire time, resize hint).
pub fn read_plain_length<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Decoded<u64>> {
    let Decoded { value, raw } = read_length(cursor)?;
    match value {
        Length::Plain(n) => Ok(Decoded::new(n, raw)),
        Length::Special(_) => Err(DecodeError::MalformedLength(
            "special string encoding where a plain length is required",
        )),
    }
}
