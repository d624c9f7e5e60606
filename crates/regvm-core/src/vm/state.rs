//! Machine State
//!
//! Everything one run mutates: registers, stack, comparison flag, program
//! counter and lifecycle status.

use std::cmp::Ordering;

use crate::config::RegisterCount;
use crate::error::FaultKind;
use super::registers::Registers;
use super::stack::Stack;

/// Result of the last `cmp`/`cmpz`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Equal,
    Less,
}

impl From<Ordering> for Comparison {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Greater => Comparison::Greater,
            Ordering::Equal => Comparison::Equal,
            Ordering::Less => Comparison::Less,
        }
    }
}

/// Run lifecycle. `Halted` and `Faulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
    Faulted,
}

#[derive(Debug)]
pub struct MachineState {
    pub registers: Registers,
    pub stack: Stack,
    /// `None` until the first comparison, and after an unordered one
    pub flag: Option<Comparison>,
    pub pc: usize,
    pub status: Status,
    /// Kind of the fault that stopped the run, kept for later reports
    pub fault: Option<FaultKind>,
}

impl MachineState {
    pub fn new(count: RegisterCount, entry: usize) -> Self {
        MachineState {
            registers: Registers::new(count),
            stack: Stack::new(),
            flag: None,
            pc: entry,
            status: Status::Running,
            fault: None,
        }
    }
}
