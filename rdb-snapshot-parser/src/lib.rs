//! Streaming decoder for RDB database snapshots.
//!
//! ```no_run
//! use std::{fs::File, io::BufReader};
//!
//! use rdb_snapshot_parser::SnapshotReader;
//!
//! let file = BufReader::new(File::open("dump.rdb")?);
//! let mut reader = SnapshotReader::new(file)?;
//! println!("{}", reader.metadata());
//! while let Some(record) = reader.read_record()? {
//!     println!("db{} {} {}", record.database, record.value_type, record.key);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constants;
pub mod cursor;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod parser;
pub mod util;
pub mod value_type;

pub use encoding::{Decoded, RdbString};
pub use error::{DecodeError, Feature, Result};
pub use headers::Metadata;
pub use parser::{
    reader::{ResizeHint, SnapshotReader},
    record::Record,
    value::Value,
};
pub use value_type::ValueType;
