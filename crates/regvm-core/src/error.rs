//! Register VM Error Types
//!
//! Runtime faults are kept apart from configuration and loading errors:
//! a fault always carries the program counter of the instruction that raised it.

use std::io;

use thiserror::Error;

use crate::bytecode::opcode::OpCode;
use crate::vm::value::Tag;

/// Conditions that abort a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultKind {
    /// A cell or register held a different tag than the operation requires.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Tag, found: Tag },

    #[error("stack underflow")]
    StackUnderflow,

    #[error("division by zero")]
    DivisionByZero,

    /// Register operand outside the configured register file.
    #[error("invalid register r{index} (register file has {size})")]
    InvalidRegister { index: i64, size: usize },

    /// An opcode was expected at the program counter.
    #[error("invalid opcode: found {found} cell where an opcode was expected")]
    InvalidOpcode { found: Tag },

    /// Offset outside the instruction buffer.
    #[error("unresolved jump target: {0}")]
    UnresolvedJumpTarget(i64),

    /// Operand cells run past the end of the buffer.
    #[error("truncated {opcode} instruction at offset {offset}")]
    TruncatedInstruction { opcode: OpCode, offset: usize },
}

#[derive(Debug, Error)]
pub enum VmError {
    // Execution
    #[error("fault at pc {pc}: {kind}")]
    Fault { pc: usize, kind: FaultKind },
    /// The run stopped on an output error; there is no fault kind to report.
    #[error("machine already faulted at pc {pc}")]
    AlreadyFaulted { pc: usize },

    // Configuration
    #[error("unsupported register count: {0} (expected 8, 16 or 32)")]
    UnsupportedRegisterCount(usize),
    #[error("unknown entry label: {0}")]
    UnknownEntryLabel(String),
    #[error("entry label `{label}` points past the end of the program ({offset})")]
    EntryOutOfRange { label: String, offset: usize },

    // Bytecode files
    #[error("invalid bytecode magic number")]
    InvalidMagicNumber,
    #[error("incompatible bytecode version: {0}")]
    InvalidBytecodeVersion(u8),
    #[error("malformed bytecode: {0}")]
    MalformedBytecode(String),
    #[error("bytecode is too short")]
    BytecodeTooShort,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl VmError {
    /// The fault kind, if this error aborted a run.
    pub fn fault_kind(&self) -> Option<&FaultKind> {
        match self {
            VmError::Fault { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

pub type VmResult<T> = Result<T, VmError>;
