pub mod buffer;
pub mod disasm;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use buffer::InstructionBuffer;
pub use instruction::Instruction;
pub use opcode::{OpCode, OperandKind};
pub use program::Program;
