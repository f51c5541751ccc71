use core::fmt;
use std::{collections::BTreeMap, io::Read};

use tracing::{debug, trace};

use crate::{
    constants::{
        MAGIC, MAX_VERSION, MIN_VERSION, OPCODE_AUX, OPCODE_EOF, OPCODE_SELECTDB,
        VERSION_FIELD_LEN,
    },
    cursor::ByteCursor,
    encoding::{RdbString, read_string},
    error::{DecodeError, Result},
};

/// Auxiliary fields written after the header (`redis-ver`, `ctime`, ...).
///
/// Keys are kept byte-for-byte; they are not required to be UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: BTreeMap<RdbString, RdbString>,
}

impl Metadata {
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&RdbString> {
        self.fields.get(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RdbString, &RdbString)> {
        self.fields.iter()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Metadata {{")?;
        for (key, value) in &self.fields {
            writeln!(f, "  {:<12} : {value}", key.to_string())?;
        }
        write!(f, "}}")?;
        Ok(())
    }
}

/// Validate the magic signature and return the snapshot version.
pub fn read_header<R: Read>(cursor: &mut ByteCursor<R>) -> Result<u32> {
    let mut magic = [0u8; MAGIC.len()];
    match cursor.read_into(&mut magic) {
        Ok(()) => {}
        Err(DecodeError::Truncated { .. }) => {
            return Err(DecodeError::NotThisFormat("shorter than the magic signature"));
        }
        Err(e) => return Err(e),
    }
    if &magic != MAGIC {
        return Err(DecodeError::NotThisFormat("magic signature mismatch"));
    }

    let mut field = [0u8; VERSION_FIELD_LEN];
    cursor.read_into(&mut field)?;
    let version = core::str::from_utf8(&field)
        .ok()
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or(DecodeError::NotThisFormat("version field is not a decimal number"))?;

    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }
    debug!(version, "validated snapshot header");
    Ok(version)
}

/// Consume the run of auxiliary fields that may follow the header.
///
/// Stops in front of (without consuming) the select-database or end marker.
/// When the next byte is not an aux opcode nothing is consumed and the
/// metadata is empty.
pub fn read_metadata<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Metadata> {
    let mut metadata = Metadata::default();
    let mut next = peek_opcode(cursor)?;

    while next == OPCODE_AUX {
        cursor.read_byte()?;
        let key = read_string(cursor)?.value;
        let value = read_string(cursor)?.value;
        trace!(key = %key, value = %value, "metadata field");
        if metadata.fields.insert(key.clone(), value).is_some() {
            debug!(key = %key, "duplicate metadata field, keeping the later value");
        }

        next = peek_opcode(cursor)?;
        match next {
            OPCODE_AUX | OPCODE_SELECTDB | OPCODE_EOF => {}
            found => {
                return Err(DecodeError::BadOpcode {
                    found,
                    expected: "aux, select-db or eof",
                });
            }
        }
    }

    debug!(fields = metadata.len(), "read snapshot metadata");
    Ok(metadata)
}

fn peek_opcode<R: Read>(cursor: &mut ByteCursor<R>) -> Result<u8> {
    cursor.peek_byte()?.ok_or(DecodeError::Truncated {
        offset: cursor.offset(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn header(bytes: &[u8]) -> Result<u32> {
        read_header(&mut ByteCursor::new(bytes))
    }

    fn metadata(bytes: &[u8]) -> Result<Metadata> {
        read_metadata(&mut ByteCursor::new(bytes))
    }

    #[test]
    fn valid_header() {
        assert_eq!(header(b"REDIS0008").unwrap(), 8);
        assert_eq!(header(b"REDIS0003").unwrap(), 3);
    }

    #[test]
    fn short_or_wrong_magic() {
        for input in [&b""[..], &b"RED"[..], &b"REDIX0008"[..], &b"redis0008"[..]] {
            assert!(
                matches!(header(input), Err(DecodeError::NotThisFormat(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn unparseable_version() {
        for input in [&b"REDIS00\x002"[..], &b"REDIS+008"[..], &b"REDIS 008"[..]] {
            assert!(matches!(header(input), Err(DecodeError::NotThisFormat(_))));
        }
    }

    #[test]
    fn short_version_is_truncated() {
        assert!(header(b"REDIS00").unwrap_err().is_truncated());
    }

    #[test]
    fn version_out_of_range() {
        assert!(matches!(
            header(b"REDIS0002"),
            Err(DecodeError::UnsupportedVersion { found: 2 })
        ));
        assert!(matches!(
            header(b"REDIS0032"),
            Err(DecodeError::UnsupportedVersion { found: 32 })
        ));
        assert!(matches!(
            header(b"REDIS0009"),
            Err(DecodeError::UnsupportedVersion { found: 9 })
        ));
    }

    #[test]
    fn aux_fields() {
        let input: &[u8] = &[
            0xFA, 0x09, 0x72, 0x65, 0x64, 0x69, 0x73, 0x2D, 0x76, 0x65, 0x72, 0x05, 0x33, 0x2E,
            0x32, 0x2E, 0x36, 0xFA, 0x0A, 0x72, 0x65, 0x64, 0x69, 0x73, 0x2D, 0x62, 0x69, 0x74,
            0x73, 0xC0, 0x40, 0xFA, 0x05, 0x63, 0x74, 0x69, 0x6D, 0x65, 0xC2, 0xB4, 0xF5, 0x88,
            0x5B, 0xFA, 0x08, 0x75, 0x73, 0x65, 0x64, 0x2D, 0x6D, 0x65, 0x6D, 0xC2, 0x08, 0x62,
            0xDF, 0x38, 0xFE,
        ];
        let mut cursor = ByteCursor::new(input);
        let md = read_metadata(&mut cursor).unwrap();

        assert_eq!(md.len(), 4);
        assert_eq!(md.get("redis-ver"), Some(&RdbString::from("3.2.6")));
        assert_eq!(md.get("redis-bits"), Some(&RdbString::from(vec![0x40])));
        assert_eq!(
            md.get("ctime"),
            Some(&RdbString::from(vec![0xB4, 0xF5, 0x88, 0x5B]))
        );
        assert_eq!(
            md.get("used-mem"),
            Some(&RdbString::from(vec![0x08, 0x62, 0xDF, 0x38]))
        );
        // select-db stays for the stream decoder
        assert_eq!(cursor.peek_byte().unwrap(), Some(0xFE));
        assert_eq!(cursor.offset(), input.len() as u64 - 1);
    }

    #[test]
    fn no_aux_fields() {
        let mut cursor = ByteCursor::new(&[0xFEu8, 0x00][..]);
        let md = read_metadata(&mut cursor).unwrap();
        assert!(md.is_empty());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn duplicate_key_keeps_last() {
        let input = b"\xFA\x01k\x01a\xFA\x01k\x01b\xFF";
        let md = metadata(input).unwrap();
        assert_eq!(md.len(), 1);
        assert_eq!(md.get("k"), Some(&RdbString::from("b")));
    }

    #[test]
    fn binary_keys_stay_distinct() {
        let md = metadata(b"\xFA\x01\xFF\x01a\xFA\x01\xFE\x01b\xFF").unwrap();
        assert_eq!(md.len(), 2);
        assert_eq!(md.get([0xFFu8]), Some(&RdbString::from("a")));
        assert_eq!(md.get([0xFEu8]), Some(&RdbString::from("b")));
        let keys: Vec<&[u8]> = md.iter().map(|(k, _)| k.as_bytes()).collect();
        assert_eq!(keys, vec![&[0xFE][..], &[0xFF][..]]);
    }

    #[test]
    fn unexpected_opcode_after_field() {
        let input = b"\xFA\x09redis-ver\x053.2.6\x00";
        assert!(matches!(
            metadata(input),
            Err(DecodeError::BadOpcode { found: 0x00, .. })
        ));
    }

    #[test]
    fn truncated_metadata() {
        for input in [
            &b"\xFA\x09redis-ver\x053.2.6"[..],
            &b"\xFA\x09redis-ver\x05"[..],
            &b"\xFA"[..],
            &b""[..],
        ] {
            assert!(metadata(input).unwrap_err().is_truncated(), "{input:?}");
        }
    }

    #[test]
    fn display_lists_fields() {
        let md = metadata(b"\xFA\x05ctime\xC2\xB4\xF5\x88\x5B\xFA\x09redis-ver\x064.0.11\xFF")
            .unwrap();
        assert_eq!(
            md.to_string(),
            "Metadata {\n  ctime        : 0xb4f5885b\n  redis-ver    : 4.0.11\n}"
        );
    }
}
