//! Decoded Instruction
//!
//! A view of one instruction inside an `InstructionBuffer`: the opcode and
//! exactly as many operand cells as its shape requires.

use std::fmt;

use crate::bytecode::buffer::InstructionBuffer;
use crate::bytecode::opcode::OpCode;
use crate::error::FaultKind;
use crate::vm::value::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction<'a> {
    /// Offset of the opcode cell
    pub offset: usize,
    pub opcode: OpCode,
    pub operands: &'a [Value],
}

impl<'a> Instruction<'a> {
    /// Decode the instruction starting at `offset`.
    ///
    /// Checks that the cell is an opcode, that all operand cells exist and
    /// that each one carries the tag its shape demands.
    pub fn decode(buffer: &'a InstructionBuffer, offset: usize) -> Result<Self, FaultKind> {
        let cell = buffer
            .get(offset)
            .ok_or(FaultKind::UnresolvedJumpTarget(i64::try_from(offset).unwrap_or(i64::MAX)))?;
        let opcode = cell
            .as_op()
            .map_err(|_| FaultKind::InvalidOpcode { found: cell.tag() })?;

        let start = offset + 1;
        let end = offset + opcode.width();
        let operands = buffer
            .cells()
            .get(start..end)
            .ok_or(FaultKind::TruncatedInstruction { opcode, offset })?;

        for (kind, value) in opcode.operands().iter().zip(operands) {
            if value.tag() != kind.tag() {
                return Err(FaultKind::TypeMismatch {
                    expected: kind.tag(),
                    found: value.tag(),
                });
            }
        }

        Ok(Instruction {
            offset,
            opcode,
            operands,
        })
    }

    /// Offset of the instruction that follows this one
    pub fn next_offset(&self) -> usize {
        self.offset + self.opcode.width()
    }

    /// Integer payload of operand `n`
    pub fn int(&self, n: usize) -> Result<i64, FaultKind> {
        self.operand(n)?.as_int()
    }

    /// Float payload of operand `n`
    pub fn float(&self, n: usize) -> Result<f64, FaultKind> {
        self.operand(n)?.as_float()
    }

    fn operand(&self, n: usize) -> Result<&Value, FaultKind> {
        self.operands
            .get(n)
            .ok_or(FaultKind::TruncatedInstruction {
                opcode: self.opcode,
                offset: self.offset,
            })
    }

    /// Append this instruction, cell for cell, to `buffer`
    pub fn encode_into(&self, buffer: &mut InstructionBuffer) {
        buffer.push_opcode(self.opcode);
        for value in self.operands {
            buffer.push(*value);
        }
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<4}", self.opcode)?;
        for value in self.operands {
            write!(f, "\t{}", value)?;
        }
        Ok(())
    }
}
