//! The opcode-driven stream decoder and the per-type value bodies.

pub mod reader;
pub mod record;
pub mod value;
