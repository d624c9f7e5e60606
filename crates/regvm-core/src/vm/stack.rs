//! VM Stack Implementation
//!
//! Auxiliary LIFO storage for `push`/`pop`. Grows without a fixed limit.

use crate::error::FaultKind;
use super::value::Value;

/// VM value stack
#[derive(Debug, Default)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> Result<Value, FaultKind> {
        self.values.pop().ok_or(FaultKind::StackUnderflow)
    }

    /// Get current stack depth
    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
