//! Disassembler
//!
//! Best-effort listing of an instruction buffer. Never fails: cells that do
//! not start a well-formed instruction are listed as `???` and skipped one
//! at a time.

use std::fmt;

use crate::bytecode::buffer::InstructionBuffer;
use crate::bytecode::instruction::Instruction;
use crate::vm::value::Value;

/// First offset listed. Offset 0 is a reserved leading cell.
pub const LISTING_ORIGIN: usize = 1;

/// Placeholder printed for cells that do not decode
pub const UNKNOWN_MARKER: &str = "???";

#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Instruction(Instruction<'a>),
    Unknown { offset: usize, cell: Value },
}

impl Line<'_> {
    pub fn offset(&self) -> usize {
        match self {
            Line::Instruction(instr) => instr.offset,
            Line::Unknown { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Instruction(instr) => write!(f, "{}", instr),
            Line::Unknown { cell, .. } => write!(f, "{}\t{}", UNKNOWN_MARKER, cell),
        }
    }
}

/// Decode every instruction from `LISTING_ORIGIN` to the end of the buffer
pub fn disassemble(buffer: &InstructionBuffer) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = LISTING_ORIGIN;

    while let Some(cell) = buffer.get(offset) {
        match Instruction::decode(buffer, offset) {
            Ok(instr) => {
                offset = instr.next_offset();
                lines.push(Line::Instruction(instr));
            }
            Err(_) => {
                lines.push(Line::Unknown { offset, cell: *cell });
                offset += 1;
            }
        }
    }

    lines
}

/// Full listing, one instruction per line
pub fn render(buffer: &InstructionBuffer) -> String {
    let mut out = String::new();
    for line in disassemble(buffer) {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::opcode::OpCode;

    #[test]
    fn listing_skips_reserved_cell() {
        let mut buf = InstructionBuffer::new();
        buf.push_opcode(OpCode::Noop);
        buf.push_opcode(OpCode::Cil);
        buf.push_integer(5);
        buf.push_integer(0);
        buf.push_opcode(OpCode::Ofv);
        buf.push_integer(0);
        buf.push_opcode(OpCode::Halt);

        assert_eq!(render(&buf), "cil \t5\t0\nofv \t0\nhalt\n");
    }

    #[test]
    fn corrupt_cells_become_placeholders() {
        let mut buf = InstructionBuffer::new();
        buf.push_opcode(OpCode::Noop);
        buf.push_float(1.25);
        buf.push_opcode(OpCode::Onl);
        buf.push_opcode(OpCode::Jmp);

        let lines = disassemble(&buf);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], Line::Unknown { offset: 1, cell: Value::Float(1.25) });
        assert_eq!(lines[1].offset(), 2);
        // jmp without its target cell
        assert!(matches!(lines[2], Line::Unknown { offset: 3, .. }));
        assert_eq!(render(&buf), "???\t1.25\nonl \n???\tjmp\n");
    }

    #[test]
    fn empty_buffer_lists_nothing() {
        assert!(disassemble(&InstructionBuffer::new()).is_empty());
    }
}
