//! Register File
//!
//! Fixed-size array of tagged slots. Every slot starts as integer zero so
//! reads before the first write are deterministic.

use crate::config::RegisterCount;
use crate::error::FaultKind;
use super::value::Value;

#[derive(Debug)]
pub struct Registers {
    slots: Vec<Value>,
}

impl Registers {
    pub fn new(count: RegisterCount) -> Self {
        Registers {
            slots: vec![Value::Int(0); count.get()],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read register `index`.
    ///
    /// Indices come straight from integer operand cells, so negative values
    /// are possible and rejected here.
    pub fn get(&self, index: i64) -> Result<Value, FaultKind> {
        let slot = self.slot(index)?;
        Ok(self.slots[slot])
    }

    pub fn set(&mut self, index: i64, value: Value) -> Result<(), FaultKind> {
        let slot = self.slot(index)?;
        self.slots[slot] = value;
        Ok(())
    }

    fn slot(&self, index: i64) -> Result<usize, FaultKind> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.slots.len())
            .ok_or(FaultKind::InvalidRegister {
                index,
                size: self.slots.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let regs = Registers::new(RegisterCount::R8);
        assert_eq!(regs.len(), 8);
        for i in 0..8 {
            assert_eq!(regs.get(i), Ok(Value::Int(0)));
        }
    }

    #[test]
    fn bounds_are_checked() {
        let mut regs = Registers::new(RegisterCount::R8);
        regs.set(7, Value::Float(1.5)).expect("set failed");
        assert_eq!(regs.get(7), Ok(Value::Float(1.5)));
        assert_eq!(
            regs.get(8),
            Err(FaultKind::InvalidRegister { index: 8, size: 8 })
        );
        assert_eq!(
            regs.set(-1, Value::Int(0)),
            Err(FaultKind::InvalidRegister { index: -1, size: 8 })
        );
    }
}
