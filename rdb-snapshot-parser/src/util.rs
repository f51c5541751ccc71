use core::fmt;

/// Write bytes as text when they are printable ASCII, otherwise as `0x` + hex.
pub fn fmt_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let printable = bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ');
    match core::str::from_utf8(bytes) {
        Ok(s) if printable => write!(f, "{s}"),
        _ => write!(f, "0x{}", hex::encode(bytes)),
    }
}
