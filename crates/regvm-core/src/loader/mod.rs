//! Stored bytecode format
//!
//! Big-endian layout:
//! magic (u32), version major/minor/patch (u8 x3), reserved (u8),
//! label count (u32) then per label: name length (u16), UTF-8 name, offset (u32),
//! cell count (u32) then per cell: tag (u8) and payload
//! (`0x01` i64, `0x02` f64, `0x03` opcode byte).

pub mod loader;
pub mod writer;

pub use loader::BytecodeLoader;
pub use writer::BytecodeWriter;

/// Bytecode magic: "RGVM"
pub const BYTECODE_MAGIC: u32 = 0x5247_564D;

/// Supported bytecode version
pub const VERSION_MAJOR: u8 = 1;

/// Header plus empty label and cell tables
pub const MIN_FILE_SIZE: usize = 16;

pub const CELL_TAG_INT: u8 = 0x01;
pub const CELL_TAG_FLOAT: u8 = 0x02;
pub const CELL_TAG_OPCODE: u8 = 0x03;
