//! Tagged Value Representation
//!
//! The single cell type of the VM. Program code, register contents and stack
//! entries are all `Value`s; reading a payload checks its tag first.

use std::fmt;

use crate::bytecode::opcode::OpCode;
use crate::error::FaultKind;

/// Which payload a `Value` carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Integer,
    Float,
    Opcode,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Integer => "integer",
            Tag::Float => "float",
            Tag::Opcode => "opcode",
        })
    }
}

/// Tagged cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point (IEEE 754)
    Float(f64),

    /// Instruction opcode
    Op(OpCode),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Int(_) => Tag::Integer,
            Value::Float(_) => Tag::Float,
            Value::Op(_) => Tag::Opcode,
        }
    }

    pub fn as_int(&self) -> Result<i64, FaultKind> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(Tag::Integer)),
        }
    }

    pub fn as_float(&self) -> Result<f64, FaultKind> {
        match self {
            Value::Float(x) => Ok(*x),
            other => Err(other.mismatch(Tag::Float)),
        }
    }

    pub fn as_op(&self) -> Result<OpCode, FaultKind> {
        match self {
            Value::Op(op) => Ok(*op),
            other => Err(other.mismatch(Tag::Opcode)),
        }
    }

    /// Zero of the same tag, used by `cmpz`
    pub fn zero_like(&self) -> Result<Value, FaultKind> {
        match self {
            Value::Int(_) => Ok(Value::Int(0)),
            Value::Float(_) => Ok(Value::Float(0.0)),
            Value::Op(_) => Err(FaultKind::TypeMismatch {
                expected: Tag::Integer,
                found: Tag::Opcode,
            }),
        }
    }

    fn mismatch(&self, expected: Tag) -> FaultKind {
        FaultKind::TypeMismatch {
            expected,
            found: self.tag(),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<OpCode> for Value {
    fn from(op: OpCode) -> Self {
        Value::Op(op)
    }
}

// Floats always keep a fractional part so they never read as integers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Op(op) => write!(f, "{}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_check_tag() {
        let v = Value::Int(7);
        assert_eq!(v.as_int(), Ok(7));
        assert_eq!(
            v.as_float(),
            Err(FaultKind::TypeMismatch { expected: Tag::Float, found: Tag::Integer })
        );
        assert!(v.as_op().is_err());

        let op = Value::from(OpCode::Cil);
        assert_eq!(op.tag(), Tag::Opcode);
        assert_eq!(op.as_op(), Ok(OpCode::Cil));
        assert!(op.as_int().is_err());
    }

    #[test]
    fn reassignment_replaces_tag_and_payload() {
        let mut v = Value::Float(1.5);
        assert_eq!(v.tag(), Tag::Float);
        v = Value::from(3i64);
        assert_eq!(v.tag(), Tag::Integer);
        assert_eq!(v.as_int(), Ok(3));
    }

    #[test]
    fn display_distinguishes_int_and_float() {
        assert_eq!(Value::Int(8).to_string(), "8");
        assert_eq!(Value::Float(8.0).to_string(), "8.0");
        assert_eq!(Value::Float(-2.5).to_string(), "-2.5");
        assert_eq!(Value::Op(OpCode::Jmp).to_string(), "jmp");
    }

    #[test]
    fn zero_like_keeps_tag() {
        assert_eq!(Value::Int(9).zero_like(), Ok(Value::Int(0)));
        assert_eq!(Value::Float(9.5).zero_like(), Ok(Value::Float(0.0)));
        assert!(Value::Op(OpCode::Halt).zero_like().is_err());
    }
}
