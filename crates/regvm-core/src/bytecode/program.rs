//! Program bundle
//!
//! An instruction buffer plus the label table the front end resolved for it.
//! Only entry-point selection reads labels; jump operands are already
//! absolute offsets.

use std::collections::BTreeMap;

use crate::bytecode::buffer::InstructionBuffer;
use crate::error::{VmError, VmResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub code: InstructionBuffer,
    pub labels: BTreeMap<String, usize>,
}

impl Program {
    pub fn new(code: InstructionBuffer) -> Self {
        Program {
            code,
            labels: BTreeMap::new(),
        }
    }

    /// Builder-style label registration
    pub fn with_label(mut self, name: impl Into<String>, offset: usize) -> Self {
        self.labels.insert(name.into(), offset);
        self
    }

    /// Resolve the entry point named `label`; it must land inside the code
    pub fn entry_offset(&self, label: &str) -> VmResult<usize> {
        let offset = self
            .labels
            .get(label)
            .copied()
            .ok_or_else(|| VmError::UnknownEntryLabel(label.to_string()))?;
        if offset >= self.code.len() {
            return Err(VmError::EntryOutOfRange {
                label: label.to_string(),
                offset,
            });
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::opcode::OpCode;

    fn noops(count: usize) -> InstructionBuffer {
        let mut code = InstructionBuffer::new();
        for _ in 0..count {
            code.push_opcode(OpCode::Noop);
        }
        code
    }

    #[test]
    fn entry_resolution() {
        let program = Program::new(noops(8))
            .with_label("start", 1)
            .with_label("loop", 7);
        assert_eq!(program.entry_offset("loop").expect("label"), 7);
        assert!(matches!(
            program.entry_offset("main"),
            Err(VmError::UnknownEntryLabel(name)) if name == "main"
        ));
    }

    #[test]
    fn entry_past_end_is_rejected() {
        let program = Program::new(noops(3))
            .with_label("start", 3)
            .with_label("far", 40);
        assert!(matches!(
            program.entry_offset("start"),
            Err(VmError::EntryOutOfRange { label, offset: 3 }) if label == "start"
        ));
        assert!(matches!(
            program.entry_offset("far"),
            Err(VmError::EntryOutOfRange { offset: 40, .. })
        ));
        assert!(matches!(
            Program::default().with_label("start", 0).entry_offset("start"),
            Err(VmError::EntryOutOfRange { offset: 0, .. })
        ));
    }
}
