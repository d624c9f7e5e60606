//! Bytecode Writer
//!
//! Serializes a `Program` into the stored format read by `BytecodeLoader`.

use crate::bytecode::program::Program;
use crate::error::{VmError, VmResult};
use crate::vm::value::Value;

use super::{BYTECODE_MAGIC, CELL_TAG_FLOAT, CELL_TAG_INT, CELL_TAG_OPCODE, VERSION_MAJOR};

pub struct BytecodeWriter;

impl BytecodeWriter {
    /// Encode `program`. Fails only when a label or count exceeds the
    /// format's field widths.
    pub fn encode(program: &Program) -> VmResult<Vec<u8>> {
        let mut buf = Vec::new();

        buf.extend(&BYTECODE_MAGIC.to_be_bytes());
        buf.push(VERSION_MAJOR);
        buf.push(0u8); // minor
        buf.push(0u8); // patch
        buf.push(0u8); // reserved

        buf.extend(&Self::u32_field(program.labels.len(), "label count")?.to_be_bytes());
        for (name, &offset) in &program.labels {
            let len = u16::try_from(name.len())
                .map_err(|_| VmError::MalformedBytecode(format!("label `{}` is too long", name)))?;
            buf.extend(&len.to_be_bytes());
            buf.extend(name.as_bytes());
            buf.extend(&Self::u32_field(offset, "label offset")?.to_be_bytes());
        }

        buf.extend(&Self::u32_field(program.code.len(), "cell count")?.to_be_bytes());
        for cell in program.code.cells() {
            match cell {
                Value::Int(i) => {
                    buf.push(CELL_TAG_INT);
                    buf.extend(&i.to_be_bytes());
                }
                Value::Float(x) => {
                    buf.push(CELL_TAG_FLOAT);
                    buf.extend(&x.to_be_bytes());
                }
                Value::Op(op) => {
                    buf.push(CELL_TAG_OPCODE);
                    buf.push(*op as u8);
                }
            }
        }

        Ok(buf)
    }

    fn u32_field(n: usize, what: &str) -> VmResult<u32> {
        u32::try_from(n).map_err(|_| VmError::MalformedBytecode(format!("{} {} does not fit in u32", what, n)))
    }
}
