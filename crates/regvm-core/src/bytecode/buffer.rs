//! Instruction Buffer
//!
//! Append-only sequence of tagged cells holding a whole program.

use crate::bytecode::opcode::OpCode;
use crate::vm::value::Value;

/// Flat program storage: `opcode, operand, ..., opcode, ...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionBuffer {
    cells: Vec<Value>,
}

impl InstructionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an opcode cell, returning its offset
    pub fn push_opcode(&mut self, op: OpCode) -> usize {
        self.push(Value::Op(op))
    }

    /// Append an integer cell (literal, register index or jump target)
    pub fn push_integer(&mut self, i: i64) -> usize {
        self.push(Value::Int(i))
    }

    /// Append a floating point literal cell
    pub fn push_float(&mut self, x: f64) -> usize {
        self.push(Value::Float(x))
    }

    /// Append any cell
    pub fn push(&mut self, value: Value) -> usize {
        let offset = self.cells.len();
        self.cells.push(value);
        offset
    }

    /// Offset the next appended cell will occupy
    pub fn cursor(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, offset: usize) -> Option<&Value> {
        self.cells.get(offset)
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<Value>> for InstructionBuffer {
    fn from(cells: Vec<Value>) -> Self {
        InstructionBuffer { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_advances_cursor() {
        let mut buf = InstructionBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.push_opcode(OpCode::Cil), 0);
        assert_eq!(buf.push_integer(5), 1);
        assert_eq!(buf.push_integer(0), 2);
        assert_eq!(buf.push_float(1.5), 3);
        assert_eq!(buf.cursor(), 4);
        assert_eq!(buf.get(3), Some(&Value::Float(1.5)));
        assert_eq!(buf.get(4), None);
    }
}
