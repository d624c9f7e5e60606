//! Bytecode Opcode Definitions
//!
//! Defines the opcode set and the operand shape of every instruction.
//! The shape table is the single source of instruction width for both the
//! disassembler and the interpreter.

use std::fmt;

use crate::vm::value::Tag;

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // System
    Halt = 0x00,
    Noop = 0x01,

    // Data movement
    Mov  = 0x02,
    Push = 0x03,
    Pop  = 0x04,

    // Arithmetic
    Add = 0x05,
    Sub = 0x06,
    Mul = 0x07,
    Div = 0x08,
    Mod = 0x09,

    // Literals
    Cil = 0x0A,
    Cfl = 0x0B,

    // Output
    Ofv = 0x0C,
    Onl = 0x0D,

    // Comparison
    Cmp  = 0x0E,
    Cmpz = 0x0F,

    // Control flow
    Jmp = 0x10,
    Jgt = 0x11,
    Jeq = 0x12,
    Jlt = 0x13,
}

/// What an operand cell means to the instruction that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Register index, stored as an integer cell
    Register,
    /// Integer literal
    Integer,
    /// Floating point literal
    Float,
    /// Absolute buffer offset, stored as an integer cell
    Target,
}

impl OperandKind {
    /// Tag the operand cell must carry
    pub fn tag(self) -> Tag {
        match self {
            OperandKind::Register | OperandKind::Integer | OperandKind::Target => Tag::Integer,
            OperandKind::Float => Tag::Float,
        }
    }
}

use OperandKind::{Float, Integer, Register, Target};

impl OpCode {
    pub const ALL: [OpCode; 20] = [
        OpCode::Halt,
        OpCode::Noop,
        OpCode::Mov,
        OpCode::Push,
        OpCode::Pop,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Mod,
        OpCode::Cil,
        OpCode::Cfl,
        OpCode::Ofv,
        OpCode::Onl,
        OpCode::Cmp,
        OpCode::Cmpz,
        OpCode::Jmp,
        OpCode::Jgt,
        OpCode::Jeq,
        OpCode::Jlt,
    ];

    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Halt => "halt",
            OpCode::Noop => "noop",
            OpCode::Mov => "mov",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Mod => "mod",
            OpCode::Cil => "cil",
            OpCode::Cfl => "cfl",
            OpCode::Ofv => "ofv",
            OpCode::Onl => "onl",
            OpCode::Cmp => "cmp",
            OpCode::Cmpz => "cmpz",
            OpCode::Jmp => "jmp",
            OpCode::Jgt => "jgt",
            OpCode::Jeq => "jeq",
            OpCode::Jlt => "jlt",
        }
    }

    /// Operand shapes, in encoding order
    pub fn operands(self) -> &'static [OperandKind] {
        match self {
            OpCode::Halt | OpCode::Noop | OpCode::Onl => &[],
            OpCode::Push | OpCode::Pop | OpCode::Ofv | OpCode::Cmpz => &[Register],
            OpCode::Mov
            | OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::Mod
            | OpCode::Cmp => &[Register, Register],
            OpCode::Cil => &[Integer, Register],
            OpCode::Cfl => &[Float, Register],
            OpCode::Jmp | OpCode::Jgt | OpCode::Jeq | OpCode::Jlt => &[Target],
        }
    }

    /// Number of buffer cells the instruction occupies, opcode included
    pub fn width(self) -> usize {
        1 + self.operands().len()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_values_round_trip() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_u8(op as u8), Some(op));
        }
        assert_eq!(OpCode::from_u8(0x14), None);
        assert_eq!(OpCode::from_u8(0xFF), None);
    }

    #[test]
    fn widths_follow_operand_table() {
        assert_eq!(OpCode::Halt.width(), 1);
        assert_eq!(OpCode::Ofv.width(), 2);
        assert_eq!(OpCode::Cfl.width(), 3);
        assert_eq!(OpCode::Jeq.width(), 2);
        assert_eq!(OpCode::Cfl.operands()[0].tag(), Tag::Float);
    }

    #[test]
    fn display_pads_mnemonic() {
        assert_eq!(format!("{:<4}|", OpCode::Mov), "mov |");
        assert_eq!(format!("{:<4}|", OpCode::Cmpz), "cmpz|");
    }
}
