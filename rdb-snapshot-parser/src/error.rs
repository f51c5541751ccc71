use core::fmt;
use std::io;

use thiserror::Error;

use crate::{
    constants::{MAX_VERSION, MIN_VERSION},
    value_type::ValueType,
};

pub type Result<T> = core::result::Result<T, DecodeError>;

/// Everything that can go wrong while decoding a snapshot.
///
/// None of these are recoverable inside the decoder: once a session has
/// returned an error it refuses further reads with [`DecodeError::Poisoned`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Magic signature mismatch or an unparseable version field.
    #[error("not an RDB snapshot: {0}")]
    NotThisFormat(&'static str),

    #[error("unsupported RDB version {found} (supported {}..={})", MIN_VERSION, MAX_VERSION)]
    UnsupportedVersion { found: u32 },

    /// A byte other than the opcode(s) valid at this point.
    #[error("unexpected opcode 0x{found:02x}, expected {expected}")]
    BadOpcode { found: u8, expected: &'static str },

    /// Recognized encoding this decoder does not implement.
    #[error("unsupported feature: {0}")]
    Unsupported(Feature),

    /// Reserved or out-of-range bit pattern in a length encoding.
    #[error("malformed length encoding: {0}")]
    MalformedLength(&'static str),

    /// The source ended before a field was complete.
    #[error("input truncated at byte offset {offset}")]
    Truncated { offset: u64 },

    /// The source itself failed (other than running out of data).
    #[error("i/o error reading snapshot: {0}")]
    Io(#[source] io::Error),

    #[error("decoder session already failed; no further reads are possible")]
    Poisoned,
}

impl DecodeError {
    /// Converts a source error, folding end-of-data into [`DecodeError::Truncated`].
    pub(crate) fn from_io(err: io::Error, offset: u64) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated { offset },
            _ => Self::Io(err),
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// What an [`DecodeError::Unsupported`] error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// LZF-compressed string (length sub-type 3).
    CompressedString,
    /// Known value type with no body decoder.
    ValueType(ValueType),
    /// Value-type byte outside the known set.
    UnknownValueType(u8),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompressedString => write!(f, "compressed string"),
            Self::ValueType(vt) if vt.is_compact_encoding() => {
                write!(f, "compact encoding {vt} (code {})", vt.code())
            }
            Self::ValueType(vt) => write!(f, "value type {vt} (code {})", vt.code()),
            Self::UnknownValueType(code) => write!(f, "unknown value type code {code}"),
        }
    }
}
