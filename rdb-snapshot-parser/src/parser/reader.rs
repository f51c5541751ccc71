use std::io::Read;

use tracing::debug;

use crate::{
    constants::{OPCODE_EOF, OPCODE_RESIZEDB, OPCODE_SELECTDB},
    cursor::ByteCursor,
    encoding::read_plain_length,
    error::{DecodeError, Result},
    headers::{Metadata, read_header, read_metadata},
    parser::record::{Record, read_record},
};

/// Capacity hints that may follow a database selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResizeHint {
    pub hash_table_size: u64,
    pub expire_table_size: u64,
}

/// Result of one select-database transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct DatabaseSelection {
    pub number: u64,
    pub resize_hint: Option<ResizeHint>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// Header and metadata done, no database selected yet.
    Selecting,
    Reading,
    End,
    Failed,
}

/// Decoder session over one snapshot source.
///
/// Construction validates the header and collects metadata; records are
/// then pulled one at a time with [`read_record`](Self::read_record) or by
/// iterating. The session is forward-only and cannot be restarted.
#[derive(Debug)]
pub struct SnapshotReader<R> {
    cursor: ByteCursor<R>,
    version: u32,
    metadata: Metadata,
    current_database: Option<u64>,
    resize_hint: Option<ResizeHint>,
    state: State,
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(source: R) -> Result<Self> {
        let mut cursor = ByteCursor::new(source);
        let version = read_header(&mut cursor)?;
        let metadata = read_metadata(&mut cursor)?;
        Ok(Self {
            cursor,
            version,
            metadata,
            current_database: None,
            resize_hint: None,
            state: State::Selecting,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `None` until the first select-database opcode.
    pub fn current_database(&self) -> Option<u64> {
        self.current_database
    }

    /// Hints from the most recent selection, if it carried any.
    pub fn resize_hint(&self) -> Option<ResizeHint> {
        self.resize_hint
    }

    /// Bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// True once the end marker has been read.
    pub fn is_finished(&self) -> bool {
        self.state == State::End
    }

    /// Read the next record. `Ok(None)` once the end marker is reached.
    ///
    /// Any error leaves the session failed; later calls return
    /// [`DecodeError::Poisoned`].
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        match self.state {
            State::End => return Ok(None),
            State::Failed => return Err(DecodeError::Poisoned),
            State::Selecting | State::Reading => {}
        }
        self.step().inspect_err(|e| {
            debug!(error = %e, offset = self.cursor.offset(), "snapshot decoding failed");
            self.state = State::Failed;
        })
    }

    fn step(&mut self) -> Result<Option<Record>> {
        loop {
            let next = self.cursor.peek_byte()?.ok_or(DecodeError::Truncated {
                offset: self.cursor.offset(),
            })?;

            match (next, self.current_database) {
                (OPCODE_EOF, _) => {
                    self.cursor.read_byte()?;
                    self.state = State::End;
                    debug!(offset = self.cursor.offset(), "reached end of snapshot");
                    return Ok(None);
                }
                (OPCODE_SELECTDB, _) => {
                    let selection = select_database(&mut self.cursor)?;
                    self.current_database = Some(selection.number);
                    self.resize_hint = selection.resize_hint;
                    self.state = State::Reading;
                }
                (_, Some(database)) => {
                    return read_record(&mut self.cursor, database).map(Some);
                }
                (found, None) => {
                    return Err(DecodeError::BadOpcode {
                        found,
                        expected: "select-db or eof",
                    });
                }
            }
        }
    }
}

impl<R: Read> Iterator for SnapshotReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::End | State::Failed => None,
            State::Selecting | State::Reading => self.read_record().transpose(),
        }
    }
}

impl<R: Read> core::iter::FusedIterator for SnapshotReader<R> {}

/// Consume a select-database opcode, its number, and an optional resize hint.
pub(crate) fn select_database<R: Read>(cursor: &mut ByteCursor<R>) -> Result<DatabaseSelection> {
    let opcode = cursor.read_byte()?;
    if opcode != OPCODE_SELECTDB {
        return Err(DecodeError::BadOpcode {
            found: opcode,
            expected: "select-db",
        });
    }
    let number = read_plain_length(cursor)?.value;

    let next = cursor.peek_byte()?.ok_or(DecodeError::Truncated {
        offset: cursor.offset(),
    })?;
    let resize_hint = if next == OPCODE_RESIZEDB {
        cursor.read_byte()?;
        let hash_table_size = read_plain_length(cursor)?.value;
        let expire_table_size = read_plain_length(cursor)?.value;
        Some(ResizeHint {
            hash_table_size,
            expire_table_size,
        })
    } else {
        None
    };

    debug!(database = number, ?resize_hint, "selected database");
    Ok(DatabaseSelection {
        number,
        resize_hint,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn select(bytes: &[u8]) -> (Result<DatabaseSelection>, ByteCursor<&[u8]>) {
        let mut cursor = ByteCursor::new(bytes);
        (select_database(&mut cursor), cursor)
    }

    #[test]
    fn selection_without_hint() {
        let (sel, mut cursor) = select(&[0xFE, 0x01, 0xFF]);
        assert_eq!(
            sel.unwrap(),
            DatabaseSelection {
                number: 1,
                resize_hint: None
            }
        );
        assert_eq!(cursor.peek_byte().unwrap(), Some(0xFF));
    }

    #[test]
    fn selection_with_hint() {
        let (sel, mut cursor) = select(&[0xFE, 0x01, 0xFB, 0x02, 0x03, 0xFF]);
        assert_eq!(
            sel.unwrap().resize_hint,
            Some(ResizeHint {
                hash_table_size: 2,
                expire_table_size: 3
            })
        );
        assert_eq!(cursor.offset(), 5);
        assert_eq!(cursor.peek_byte().unwrap(), Some(0xFF));
    }

    #[test]
    fn selection_truncated() {
        for input in [
            &[][..],
            &[0xFE][..],
            &[0xFE, 0x01][..],
            &[0xFE, 0x01, 0xFB][..],
            &[0xFE, 0x01, 0xFB, 0x02][..],
        ] {
            let (sel, _) = select(input);
            assert!(sel.unwrap_err().is_truncated(), "{input:02x?}");
        }
    }

    #[test]
    fn selection_wrong_opcode() {
        let (sel, _) = select(&[0xFA]);
        assert!(matches!(
            sel,
            Err(DecodeError::BadOpcode { found: 0xFA, .. })
        ));
    }

    #[test]
    fn failed_selection_keeps_previous_database() {
        let mut reader = SnapshotReader::new(&b"REDIS0008\xFE\x02\x00\x01k\x01v\xFE\x05"[..]).unwrap();
        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.database, 2);
        assert!(reader.read_record().unwrap_err().is_truncated());
        assert_eq!(reader.current_database(), Some(2));
    }

    #[test]
    fn record_before_selection() {
        let mut reader = SnapshotReader::new(&b"REDIS0006\x00\x01k\x01v\xFF"[..]).unwrap();
        assert!(matches!(
            reader.read_record(),
            Err(DecodeError::BadOpcode { found: 0x00, .. })
        ));
    }

    #[test]
    fn poisoned_after_error() {
        let mut reader = SnapshotReader::new(&b"REDIS0008\xFE\x00\x04\x01h\x00\xFF"[..]).unwrap();
        assert!(matches!(
            reader.read_record(),
            Err(DecodeError::Unsupported(_))
        ));
        assert!(matches!(reader.read_record(), Err(DecodeError::Poisoned)));
    }

    #[test]
    fn iterator_fuses_after_error() {
        let reader = SnapshotReader::new(&b"REDIS0008\xFE\x00\x00\x01a\x01b\x04\x01h\x00"[..]).unwrap();
        let items: Vec<_> = reader.collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn aux_field_after_selection() {
        let mut reader =
            SnapshotReader::new(&b"REDIS0008\xFE\x00\xFA\x05ctime\x01x\xFF"[..]).unwrap();
        assert!(matches!(
            reader.read_record(),
            Err(DecodeError::BadOpcode { found: 0xFA, .. })
        ));
        assert_eq!(reader.current_database(), Some(0));
        assert!(matches!(reader.read_record(), Err(DecodeError::Poisoned)));
    }

    #[test]
    fn end_marker_is_sticky() {
        let mut reader = SnapshotReader::new(&b"REDIS0008\xFF"[..]).unwrap();
        assert_eq!(reader.read_record().unwrap(), None);
        assert!(reader.is_finished());
        assert_eq!(reader.read_record().unwrap(), None);
        assert!(reader.next().is_none());
    }

    #[test]
    fn missing_end_marker() {
        let mut reader = SnapshotReader::new(&b"REDIS0008\xFE\x00\x00\x01a\x01b"[..]).unwrap();
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap_err().is_truncated());
    }

    #[test]
    fn databases_switch_midstream() {
        let input = b"REDIS0007\xFE\x00\x00\x01a\x01b\xFE\x03\x00\x01c\x01d\xFF";
        let reader = SnapshotReader::new(&input[..]).unwrap();
        let dbs: Vec<u64> = reader.map(|r| r.unwrap().database).collect();
        assert_eq!(dbs, vec![0, 3]);
    }
}
