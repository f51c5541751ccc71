//! Primitive encodings shared by every part of the snapshot: the
//! variable-width length and length-prefixed strings.

pub mod length;
pub mod string;

pub use length::{Length, SpecialInt, read_length, read_plain_length};
pub use string::{RdbString, int_encoded_value, read_string};

/// A decoded value together with the exact bytes it was decoded from.
///
/// Every decode step returns one of these so callers can pass unsupported or
/// uninteresting data through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: T,
    pub raw: Vec<u8>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, raw: Vec<u8>) -> Self {
        Self { value, raw }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            raw: self.raw,
        }
    }

    pub fn into_parts(self) -> (T, Vec<u8>) {
        (self.value, self.raw)
    }
}
