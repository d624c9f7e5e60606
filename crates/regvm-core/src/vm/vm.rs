//! Virtual Machine Core
//!
//! Fetch-decode-execute loop over a borrowed instruction buffer. The machine
//! owns its state and output sink for the duration of one run.

use std::io::{self, Write};

use tracing::{debug, error, info, trace};

use crate::bytecode::buffer::InstructionBuffer;
use crate::bytecode::instruction::Instruction;
use crate::bytecode::opcode::OpCode;
use crate::bytecode::program::Program;
use crate::config::{RegisterCount, VmConfig};
use crate::error::{FaultKind, VmError, VmResult};

use super::state::{Comparison, MachineState, Status};
use super::value::{Tag, Value};

/// What the program counter does after an instruction
enum Flow {
    Next(usize),
    Jump(usize),
    Halt,
}

/// Anything that stops a step
enum Trap {
    Fault(FaultKind),
    Io(io::Error),
}

impl From<FaultKind> for Trap {
    fn from(kind: FaultKind) -> Self {
        Trap::Fault(kind)
    }
}

impl From<io::Error> for Trap {
    fn from(err: io::Error) -> Self {
        Trap::Io(err)
    }
}

#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Register Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine<'p, W: Write> {
    code: &'p InstructionBuffer,
    state: MachineState,
    out: W,
}

impl<'p, W: Write> VirtualMachine<'p, W> {
    /// Create a VM for `program`, starting at the configured entry label.
    ///
    /// Fails with `UnknownEntryLabel` or `EntryOutOfRange` before any machine
    /// state is built.
    pub fn new(config: &VmConfig, program: &'p Program, out: W) -> VmResult<Self> {
        let entry = program.entry_offset(&config.entry_label)?;
        Ok(Self::with_entry(config.register_count, &program.code, entry, out))
    }

    /// Create a VM from an already resolved entry offset
    pub fn with_entry(
        registers: RegisterCount,
        code: &'p InstructionBuffer,
        entry: usize,
        out: W,
    ) -> Self {
        VirtualMachine {
            code,
            state: MachineState::new(registers, entry),
            out,
        }
    }

    /// Execute until `halt` or a fault
    pub fn execute(&mut self) -> VmResult<()> {
        info!(
            entry = self.state.pc,
            registers = self.state.registers.len(),
            cells = self.code.len(),
            "execution starting"
        );

        while self.step()? == Status::Running {}

        match self.state.status {
            Status::Faulted => Err(self.last_fault()),
            _ => {
                info!(pc = self.state.pc, "execution halted");
                Ok(())
            }
        }
    }

    /// Error for a machine that is already in the `Faulted` state
    fn last_fault(&self) -> VmError {
        let pc = self.state.pc;
        match &self.state.fault {
            Some(kind) => VmError::Fault { pc, kind: kind.clone() },
            None => VmError::AlreadyFaulted { pc },
        }
    }

    /// Execute a single instruction.
    ///
    /// A machine that already halted or faulted is left untouched.
    pub fn step(&mut self) -> VmResult<Status> {
        if self.state.status != Status::Running {
            return Ok(self.state.status);
        }

        let pc = self.state.pc;
        match self.dispatch(pc) {
            Ok(Flow::Next(next)) | Ok(Flow::Jump(next)) => self.state.pc = next,
            Ok(Flow::Halt) => self.state.status = Status::Halted,
            Err(trap) => {
                self.state.status = Status::Faulted;
                let err = match trap {
                    Trap::Fault(kind) => {
                        self.state.fault = Some(kind.clone());
                        VmError::Fault { pc, kind }
                    }
                    Trap::Io(e) => VmError::Io(e),
                };
                error!(pc, %err, "execution faulted");
                return Err(err);
            }
        }

        Ok(self.state.status)
    }

    fn dispatch(&mut self, pc: usize) -> Result<Flow, Trap> {
        let code = self.code;
        let instr = Instruction::decode(code, pc)?;
        trace!(pc, opcode = %instr.opcode, "step");

        match instr.opcode {
            OpCode::Halt => return Ok(Flow::Halt),
            OpCode::Noop => {}

            OpCode::Mov => {
                let value = self.read_reg(&instr, 0)?;
                self.write_reg(&instr, 1, value)?;
            }
            OpCode::Push => {
                let value = self.read_reg(&instr, 0)?;
                self.state.stack.push(value);
            }
            OpCode::Pop => {
                let value = self.state.stack.pop()?;
                self.write_reg(&instr, 0, value)?;
            }

            OpCode::Add => self.arithmetic(&instr, ArithOp::Add)?,
            OpCode::Sub => self.arithmetic(&instr, ArithOp::Sub)?,
            OpCode::Mul => self.arithmetic(&instr, ArithOp::Mul)?,
            OpCode::Div => self.arithmetic(&instr, ArithOp::Div)?,
            OpCode::Mod => self.arithmetic(&instr, ArithOp::Mod)?,

            OpCode::Cil => {
                let literal = instr.int(0)?;
                self.write_reg(&instr, 1, Value::Int(literal))?;
            }
            OpCode::Cfl => {
                let literal = instr.float(0)?;
                self.write_reg(&instr, 1, Value::Float(literal))?;
            }

            OpCode::Ofv => {
                let value = self.read_reg(&instr, 0)?;
                write!(self.out, "{}", value)?;
            }
            OpCode::Onl => {
                self.out.write_all(b"\n")?;
                self.out.flush()?;
            }

            OpCode::Cmp => {
                let a = self.read_reg(&instr, 0)?;
                let b = self.read_reg(&instr, 1)?;
                self.state.flag = compare(a, b)?;
            }
            OpCode::Cmpz => {
                let a = self.read_reg(&instr, 0)?;
                self.state.flag = compare(a, a.zero_like()?)?;
            }

            OpCode::Jmp => return Ok(Flow::Jump(self.target(&instr)?)),
            OpCode::Jgt => return self.branch(&instr, Comparison::Greater),
            OpCode::Jeq => return self.branch(&instr, Comparison::Equal),
            OpCode::Jlt => return self.branch(&instr, Comparison::Less),
        }

        Ok(Flow::Next(instr.next_offset()))
    }

    fn read_reg(&self, instr: &Instruction<'_>, n: usize) -> Result<Value, FaultKind> {
        self.state.registers.get(instr.int(n)?)
    }

    fn write_reg(&mut self, instr: &Instruction<'_>, n: usize, value: Value) -> Result<(), FaultKind> {
        self.state.registers.set(instr.int(n)?, value)
    }

    /// `b <- b (op) a` for operands `a, b`
    fn arithmetic(&mut self, instr: &Instruction<'_>, op: ArithOp) -> Result<(), FaultKind> {
        let a = self.read_reg(instr, 0)?;
        let b = self.read_reg(instr, 1)?;

        let result = match (a, b) {
            (Value::Int(a), Value::Int(b)) => Value::Int(int_arithmetic(op, a, b)?),
            (Value::Float(a), Value::Float(b)) => Value::Float(float_arithmetic(op, a, b)?),
            (a, b) => return Err(mixed_tags(a, b)),
        };

        self.write_reg(instr, 1, result)
    }

    /// Jump operands are range-checked whether or not the branch is taken.
    fn target(&self, instr: &Instruction<'_>) -> Result<usize, FaultKind> {
        let raw = instr.int(0)?;
        usize::try_from(raw)
            .ok()
            .filter(|&t| t < self.code.len())
            .ok_or(FaultKind::UnresolvedJumpTarget(raw))
    }

    fn branch(&self, instr: &Instruction<'_>, when: Comparison) -> Result<Flow, Trap> {
        let target = self.target(instr)?;
        if self.state.flag == Some(when) {
            debug!(pc = instr.offset, target, opcode = %instr.opcode, "branch taken");
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next(instr.next_offset()))
        }
    }

    pub fn pc(&self) -> usize {
        self.state.pc
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn flag(&self) -> Option<Comparison> {
        self.state.flag
    }

    /// Current content of register `index`, if it exists
    pub fn register(&self, index: i64) -> Option<Value> {
        self.state.registers.get(index).ok()
    }

    pub fn stack_depth(&self) -> usize {
        self.state.stack.depth()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

// Integer arithmetic wraps, matching two's complement hardware.
fn int_arithmetic(op: ArithOp, a: i64, b: i64) -> Result<i64, FaultKind> {
    match op {
        ArithOp::Add => Ok(b.wrapping_add(a)),
        ArithOp::Sub => Ok(b.wrapping_sub(a)),
        ArithOp::Mul => Ok(b.wrapping_mul(a)),
        ArithOp::Div | ArithOp::Mod if a == 0 => Err(FaultKind::DivisionByZero),
        ArithOp::Div => Ok(b.wrapping_div(a)),
        ArithOp::Mod => Ok(b.wrapping_rem(a)),
    }
}

fn float_arithmetic(op: ArithOp, a: f64, b: f64) -> Result<f64, FaultKind> {
    match op {
        ArithOp::Add => Ok(b + a),
        ArithOp::Sub => Ok(b - a),
        ArithOp::Mul => Ok(b * a),
        ArithOp::Div if a == 0.0 => Err(FaultKind::DivisionByZero),
        ArithOp::Div => Ok(b / a),
        // remainder is defined for integers only
        ArithOp::Mod => Err(FaultKind::TypeMismatch {
            expected: Tag::Integer,
            found: Tag::Float,
        }),
    }
}

/// Three-way compare within one tag. Unordered floats clear the flag.
fn compare(a: Value, b: Value) -> Result<Option<Comparison>, FaultKind> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(&b).into())),
        (Value::Float(a), Value::Float(b)) => Ok(a.partial_cmp(&b).map(Comparison::from)),
        (a, b) => Err(mixed_tags(a, b)),
    }
}

fn mixed_tags(a: Value, b: Value) -> FaultKind {
    let expected = match a.tag() {
        Tag::Opcode => Tag::Integer,
        tag => tag,
    };
    let found = if b.tag() != expected { b.tag() } else { a.tag() };
    FaultKind::TypeMismatch { expected, found }
}
