use std::io::Read;

use crate::{
    constants::MAX_PREALLOCATED_ELEMENTS,
    cursor::ByteCursor,
    encoding::{Decoded, RdbString, read_plain_length, read_string},
    error::{DecodeError, Feature, Result},
    value_type::ValueType,
};

/// Structured payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(RdbString),
    /// Elements in stored order.
    List(Vec<RdbString>),
    /// Members in stored order; duplicates are kept as found.
    Set(Vec<RdbString>),
}

/// Decode the value body for `value_type`.
///
/// Types without a body decoder fail with `Unsupported`. The stream position
/// after that error is inside the unread body.
pub fn read_value<R: Read>(
    cursor: &mut ByteCursor<R>,
    value_type: ValueType,
) -> Result<Decoded<Value>> {
    match value_type {
        ValueType::String => Ok(read_string(cursor)?.map(Value::String)),
        ValueType::List => Ok(read_sequence(cursor)?.map(Value::List)),
        ValueType::Set => Ok(read_sequence(cursor)?.map(Value::Set)),
        ValueType::ZSet
        | ValueType::Hash
        | ValueType::ZSet2
        | ValueType::Module
        | ValueType::Module2
        | ValueType::HashZipmap
        | ValueType::ListZiplist
        | ValueType::SetIntset
        | ValueType::ZSetZiplist
        | ValueType::HashZiplist
        | ValueType::ListQuicklist
        | ValueType::StreamListpacks => {
            Err(DecodeError::Unsupported(Feature::ValueType(value_type)))
        }
    }
}

/// Decode a count followed by that many strings (list and set bodies).
///
/// `raw` is the count's bytes followed by each element's bytes, in order.
pub fn read_sequence<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Decoded<Vec<RdbString>>> {
    let Decoded {
        value: count,
        mut raw,
    } = read_plain_length(cursor)?;
    let count = usize::try_from(count)
        .map_err(|_| DecodeError::MalformedLength("element count exceeds address space"))?;

    let mut elements = Vec::with_capacity(count.min(MAX_PREALLOCATED_ELEMENTS));
    for _ in 0..count {
        let (element, element_raw) = read_string(cursor)?.into_parts();
        raw.extend_from_slice(&element_raw);
        elements.push(element);
    }
    Ok(Decoded::new(elements, raw))
}
