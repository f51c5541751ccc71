use std::io::Read;

use tracing::trace;

use crate::{
    constants::{OPCODE_EXPIRETIME, OPCODE_EXPIRETIME_MS, is_opcode},
    cursor::ByteCursor,
    encoding::{Decoded, RdbString, read_plain_length, read_string},
    error::{DecodeError, Feature, Result},
    parser::value::{Value, read_value},
    value_type::ValueType,
};

/// One key/value entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Database selected when the record was read.
    pub database: u64,
    /// Expiration in milliseconds; 0 means the key does not expire.
    pub ttl_millis: u64,
    pub value_type: ValueType,
    pub key: RdbString,
    /// Decoded value plus the exact body bytes.
    pub value: Decoded<Value>,
}

impl Record {
    pub fn expires(&self) -> bool {
        self.ttl_millis != 0
    }

    /// Value body exactly as stored.
    pub fn raw_value(&self) -> &[u8] {
        &self.value.raw
    }
}

/// Read one record: optional expire opcode, value-type tag, key, body.
pub(crate) fn read_record<R: Read>(cursor: &mut ByteCursor<R>, database: u64) -> Result<Record> {
    let mut tag = cursor.read_byte()?;
    let mut ttl_millis = 0;

    if tag == OPCODE_EXPIRETIME || tag == OPCODE_EXPIRETIME_MS {
        let expire = read_plain_length(cursor)?.value;
        ttl_millis = if tag == OPCODE_EXPIRETIME {
            expire
                .checked_mul(1000)
                .ok_or(DecodeError::MalformedLength("expire seconds overflow milliseconds"))?
        } else {
            expire
        };
        tag = cursor.read_byte()?;
    }

    let value_type = match ValueType::from_code(tag) {
        Some(vt) => vt,
        None if is_opcode(tag) => {
            return Err(DecodeError::BadOpcode {
                found: tag,
                expected: "value type",
            });
        }
        None => return Err(DecodeError::Unsupported(Feature::UnknownValueType(tag))),
    };

    let key = read_string(cursor)?.value;
    let value = read_value(cursor, value_type)?;
    trace!(database, %key, %value_type, ttl_millis, body_len = value.raw.len(), "decoded record");

    Ok(Record {
        database,
        ttl_millis,
        value_type,
        key,
        value,
    })
}
