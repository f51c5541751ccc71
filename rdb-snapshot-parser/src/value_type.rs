use core::fmt;

/// On-disk value-type discriminant of a key/value record.
///
/// Every encoding the format defines has its own variant, whether or not a
/// body decoder exists for it (see [`crate::parser::value::read_value`]).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ValueType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    /// Sorted set with binary double scores.
    ZSet2,
    Module,
    Module2,
    HashZipmap,
    ListZiplist,
    SetIntset,
    ZSetZiplist,
    HashZiplist,
    ListQuicklist,
    StreamListpacks,
}

impl ValueType {
    /// Look up a tag byte. `None` for bytes the format does not assign.
    pub const fn from_code(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::String,
            1 => Self::List,
            2 => Self::Set,
            3 => Self::ZSet,
            4 => Self::Hash,
            5 => Self::ZSet2,
            6 => Self::Module,
            7 => Self::Module2,
            9 => Self::HashZipmap,
            10 => Self::ListZiplist,
            11 => Self::SetIntset,
            12 => Self::ZSetZiplist,
            13 => Self::HashZiplist,
            14 => Self::ListQuicklist,
            15 => Self::StreamListpacks,
            _ => return None,
        })
    }

    /// Return the on-disk tag byte.
    pub const fn code(self) -> u8 {
        match self {
            Self::String => 0,
            Self::List => 1,
            Self::Set => 2,
            Self::ZSet => 3,
            Self::Hash => 4,
            Self::ZSet2 => 5,
            Self::Module => 6,
            Self::Module2 => 7,
            Self::HashZipmap => 9,
            Self::ListZiplist => 10,
            Self::SetIntset => 11,
            Self::ZSetZiplist => 12,
            Self::HashZiplist => 13,
            Self::ListQuicklist => 14,
            Self::StreamListpacks => 15,
        }
    }

    /// Human-readable name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::ZSet => "zset",
            Self::Hash => "hash",
            Self::ZSet2 => "zset2",
            Self::Module => "module",
            Self::Module2 => "module2",
            Self::HashZipmap => "hash-zipmap",
            Self::ListZiplist => "list-ziplist",
            Self::SetIntset => "set-intset",
            Self::ZSetZiplist => "zset-ziplist",
            Self::HashZiplist => "hash-ziplist",
            Self::ListQuicklist => "list-quicklist",
            Self::StreamListpacks => "stream-listpacks",
        }
    }

    /// True for the compact container encodings (zipmap, ziplist, intset,
    /// quicklist, listpacks) whose body is a single opaque blob.
    pub const fn is_compact_encoding(self) -> bool {
        matches!(
            self,
            Self::HashZipmap
                | Self::ListZiplist
                | Self::SetIntset
                | Self::ZSetZiplist
                | Self::HashZiplist
                | Self::ListQuicklist
                | Self::StreamListpacks
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
