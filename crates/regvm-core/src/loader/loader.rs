//! Bytecode Loader
//!
//! Loads stored programs. This layer performs structural validation only:
//! cell tags, opcode bytes and label bounds. Instruction shapes and jump
//! targets are checked by the interpreter when it reaches them.

use std::collections::BTreeMap;

use tracing::debug;

use crate::bytecode::buffer::InstructionBuffer;
use crate::bytecode::opcode::OpCode;
use crate::bytecode::program::Program;
use crate::error::{VmError, VmResult};
use crate::vm::value::Value;

use super::{BYTECODE_MAGIC, CELL_TAG_FLOAT, CELL_TAG_INT, CELL_TAG_OPCODE, MIN_FILE_SIZE, VERSION_MAJOR};

/// Bytecode loader
pub struct BytecodeLoader;

impl BytecodeLoader {
    /// Load a program from raw bytes
    pub fn load(bytes: &[u8]) -> VmResult<Program> {
        if bytes.len() < MIN_FILE_SIZE {
            return Err(VmError::BytecodeTooShort);
        }

        let mut cursor = 0;

        // Magic
        let magic = Self::read_u32(bytes, &mut cursor)?;
        if magic != BYTECODE_MAGIC {
            return Err(VmError::InvalidMagicNumber);
        }

        // Version
        let major = Self::read_u8(bytes, &mut cursor)?;
        let _minor = Self::read_u8(bytes, &mut cursor)?;
        let _patch = Self::read_u8(bytes, &mut cursor)?;

        if major != VERSION_MAJOR {
            return Err(VmError::InvalidBytecodeVersion(major));
        }

        // Reserved
        Self::read_u8(bytes, &mut cursor)?;

        // Labels
        let label_count = Self::read_u32(bytes, &mut cursor)? as usize;
        let mut labels = BTreeMap::new();

        for _ in 0..label_count {
            let name_len = Self::read_u16(bytes, &mut cursor)? as usize;
            let name = std::str::from_utf8(Self::take(bytes, &mut cursor, name_len)?)
                .map_err(|_| VmError::MalformedBytecode("label name is not UTF-8".to_string()))?
                .to_string();
            let offset = Self::read_u32(bytes, &mut cursor)? as usize;
            labels.insert(name, offset);
        }

        // Cells
        let cell_count = Self::read_u32(bytes, &mut cursor)? as usize;
        let mut code = InstructionBuffer::new();

        for _ in 0..cell_count {
            code.push(Self::read_cell(bytes, &mut cursor)?);
        }

        if cursor != bytes.len() {
            return Err(VmError::MalformedBytecode(format!(
                "{} trailing bytes",
                bytes.len() - cursor
            )));
        }

        if let Some((name, offset)) = labels.iter().find(|(_, &offset)| offset >= code.len()) {
            return Err(VmError::MalformedBytecode(format!(
                "label `{}` points past the end of the program ({})",
                name, offset
            )));
        }

        debug!(labels = labels.len(), cells = code.len(), "bytecode loaded");

        Ok(Program { code, labels })
    }

    fn read_cell(bytes: &[u8], cursor: &mut usize) -> VmResult<Value> {
        let tag = Self::read_u8(bytes, cursor)?;

        match tag {
            CELL_TAG_INT => Ok(Value::Int(i64::from_be_bytes(Self::read_array(bytes, cursor)?))),
            CELL_TAG_FLOAT => Ok(Value::Float(f64::from_be_bytes(Self::read_array(bytes, cursor)?))),
            CELL_TAG_OPCODE => {
                let byte = Self::read_u8(bytes, cursor)?;
                OpCode::from_u8(byte).map(Value::Op).ok_or_else(|| {
                    VmError::MalformedBytecode(format!("unknown opcode byte 0x{:02X}", byte))
                })
            }
            other => Err(VmError::MalformedBytecode(format!(
                "unknown cell tag 0x{:02X}",
                other
            ))),
        }
    }

    fn take<'b>(bytes: &'b [u8], cursor: &mut usize, len: usize) -> VmResult<&'b [u8]> {
        let end = cursor.checked_add(len).ok_or(VmError::BytecodeTooShort)?;
        let slice = bytes.get(*cursor..end).ok_or(VmError::BytecodeTooShort)?;
        *cursor = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(bytes: &[u8], cursor: &mut usize) -> VmResult<[u8; N]> {
        Self::take(bytes, cursor, N)?
            .try_into()
            .map_err(|_| VmError::BytecodeTooShort)
    }

    fn read_u8(bytes: &[u8], cursor: &mut usize) -> VmResult<u8> {
        Ok(Self::read_array::<1>(bytes, cursor)?[0])
    }

    fn read_u16(bytes: &[u8], cursor: &mut usize) -> VmResult<u16> {
        Ok(u16::from_be_bytes(Self::read_array(bytes, cursor)?))
    }

    fn read_u32(bytes: &[u8], cursor: &mut usize) -> VmResult<u32> {
        Ok(u32::from_be_bytes(Self::read_array(bytes, cursor)?))
    }
}
