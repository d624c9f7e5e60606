//! VM Configuration
//!
//! Immutable run settings produced by the host before a machine is built.
//! Validation happens here, so a bad setting never becomes a mid-run fault.

use crate::error::VmError;

/// Default entry-point label
pub const DEFAULT_ENTRY_LABEL: &str = "start";

/// Supported register file sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterCount {
    R8,
    #[default]
    R16,
    R32,
}

impl RegisterCount {
    pub fn get(self) -> usize {
        match self {
            RegisterCount::R8 => 8,
            RegisterCount::R16 => 16,
            RegisterCount::R32 => 32,
        }
    }
}

impl TryFrom<usize> for RegisterCount {
    type Error = VmError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            8 => Ok(RegisterCount::R8),
            16 => Ok(RegisterCount::R16),
            32 => Ok(RegisterCount::R32),
            other => Err(VmError::UnsupportedRegisterCount(other)),
        }
    }
}

/// Whether the host runs the program or only lists it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Execute,
    Disassemble,
}

/// VM Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    pub register_count: RegisterCount,

    /// Label the run starts at
    pub entry_label: String,

    pub mode: RunMode,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            register_count: RegisterCount::default(),
            entry_label: DEFAULT_ENTRY_LABEL.to_string(),
            mode: RunMode::default(),
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registers(mut self, count: RegisterCount) -> Self {
        self.register_count = count;
        self
    }

    pub fn with_entry_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_count_accepts_only_supported_sizes() {
        assert_eq!(RegisterCount::try_from(8).expect("8").get(), 8);
        assert_eq!(RegisterCount::try_from(32).expect("32").get(), 32);
        assert!(matches!(
            RegisterCount::try_from(12),
            Err(VmError::UnsupportedRegisterCount(12))
        ));
    }

    #[test]
    fn defaults() {
        let cfg = VmConfig::new();
        assert_eq!(cfg.register_count, RegisterCount::R16);
        assert_eq!(cfg.entry_label, "start");
        assert_eq!(cfg.mode, RunMode::Execute);
    }
}
