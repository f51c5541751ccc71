/// ASCII signature at bytes 0..5 of every snapshot.
pub const MAGIC: &[u8; 5] = b"REDIS";

/// Width of the ASCII decimal version field that follows the magic.
pub const VERSION_FIELD_LEN: usize = 4;

/// Oldest snapshot version this decoder accepts (inclusive).
pub const MIN_VERSION: u32 = 3;
/// Newest snapshot version this decoder accepts (inclusive).
pub const MAX_VERSION: u32 = 8;

// Opcodes. These are fixed by the on-disk format; keep them as literals.
pub const OPCODE_AUX: u8 = 0xFA;
pub const OPCODE_RESIZEDB: u8 = 0xFB;
pub const OPCODE_EXPIRETIME_MS: u8 = 0xFC;
pub const OPCODE_EXPIRETIME: u8 = 0xFD;
pub const OPCODE_SELECTDB: u8 = 0xFE;
pub const OPCODE_EOF: u8 = 0xFF;

/// Cap for `Vec::with_capacity` when the element count comes from the file.
/// Larger collections still decode, they just grow as they go.
pub const MAX_PREALLOCATED_ELEMENTS: usize = 1024;

/// Returns true for any byte the format reserves as an opcode.
pub const fn is_opcode(b: u8) -> bool {
    matches!(
        b,
        OPCODE_AUX
            | OPCODE_RESIZEDB
            | OPCODE_EXPIRETIME_MS
            | OPCODE_EXPIRETIME
            | OPCODE_SELECTDB
            | OPCODE_EOF
    )
}
