pub mod registers;
pub mod stack;
pub mod state;
pub mod value;
pub mod vm;

pub use state::{Comparison, MachineState, Status};
pub use value::{Tag, Value};
pub use vm::VirtualMachine;
