//! The register-based control-flow-graph intermediate representation.

pub mod bb;
pub mod cfg;
pub mod dump;
pub mod instr;
pub mod method;
pub mod value;

pub use bb::{BasicBlock, BlockId};
pub use cfg::{Cfg, ClassMetadata};
pub use instr::{BinOp, FailReason, Op, Terminator};
pub use method::MethodIr;
pub use value::{Const, Global, Local, Value, ValueKind};
