//! Register VM - Core Library
//!
//! Tagged values, the instruction buffer and its disassembler, and the
//! register machine that executes it.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod loader;

// Re-export commonly used types
pub use error::{FaultKind, VmError, VmResult};
pub use config::{RegisterCount, RunMode, VmConfig};
pub use bytecode::{InstructionBuffer, OpCode, Program};
pub use bytecode::disasm::{disassemble, render};
pub use vm::{Comparison, Status, Tag, Value, VirtualMachine};
pub use loader::{BytecodeLoader, BytecodeWriter};

#[cfg(test)]
mod tests {
	use super::*;

	fn counting_program() -> Program {
		// r0 = 3; r1 = 1; loop: ofv r0; onl; sub r1 r0; cmpz r0; jgt loop; halt
		let mut code = InstructionBuffer::new();
		code.push_opcode(OpCode::Noop);
		let start = code.push_opcode(OpCode::Cil);
		code.push_integer(3);
		code.push_integer(0);
		code.push_opcode(OpCode::Cil);
		code.push_integer(1);
		code.push_integer(1);
		let body = code.push_opcode(OpCode::Ofv);
		code.push_integer(0);
		code.push_opcode(OpCode::Onl);
		code.push_opcode(OpCode::Sub);
		code.push_integer(1);
		code.push_integer(0);
		code.push_opcode(OpCode::Cmpz);
		code.push_integer(0);
		code.push_opcode(OpCode::Jgt);
		code.push_integer(body as i64);
		code.push_opcode(OpCode::Halt);

		Program::new(code).with_label("start", start).with_label("body", body)
	}

	#[test]
	fn loop_counts_down() {
		let program = counting_program();
		let config = VmConfig::new().with_registers(RegisterCount::R8);
		let mut vm = VirtualMachine::new(&config, &program, Vec::new()).expect("vm");
		vm.execute().expect("execution failed");
		assert_eq!(vm.status(), Status::Halted);
		assert_eq!(vm.output().as_slice(), b"3\n2\n1\n");
		assert_eq!(vm.flag(), Some(Comparison::Equal));
	}

	#[test]
	fn entry_label_selects_start() {
		// Starting at `body` skips the initialisation: r0 = 0, r1 = 0
		let program = counting_program();
		let config = VmConfig::new().with_entry_label("body");
		let mut vm = VirtualMachine::new(&config, &program, Vec::new()).expect("vm");
		vm.execute().expect("execution failed");
		assert_eq!(vm.into_output(), b"0\n".to_vec());
	}

	#[test]
	fn unknown_entry_label_rejected_before_run() {
		let program = counting_program();
		let config = VmConfig::new().with_entry_label("main");
		let res = VirtualMachine::new(&config, &program, Vec::new());
		assert!(matches!(res, Err(VmError::UnknownEntryLabel(_))));
	}

	#[test]
	fn listing_of_counting_program() {
		let program = counting_program();
		let listing = render(&program.code);
		let expected = [
			"cil \t3\t0",
			"cil \t1\t1",
			"ofv \t0",
			"onl ",
			"sub \t1\t0",
			"cmpz\t0",
			"jgt \t7",
			"halt",
		];
		let lines: Vec<&str> = listing.lines().collect();
		assert_eq!(lines, expected);
	}

	#[test]
	fn fault_reports_pc_and_kind() {
		let mut code = InstructionBuffer::new();
		code.push_opcode(OpCode::Noop);
		code.push_opcode(OpCode::Pop);
		code.push_integer(0);
		let program = Program::new(code).with_label("start", 0);

		let mut vm = VirtualMachine::new(&VmConfig::new(), &program, Vec::new()).expect("vm");
		let err = vm.execute().expect_err("pop on empty stack");
		assert_eq!(err.fault_kind(), Some(&FaultKind::StackUnderflow));
		assert_eq!(err.to_string(), "fault at pc 1: stack underflow");
		assert_eq!(vm.status(), Status::Faulted);
	}
}
