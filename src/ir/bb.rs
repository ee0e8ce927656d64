use slotmap::new_key_type;

use super::instr::{Op, Terminator};

new_key_type! {
    pub struct BlockId;
}

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub label: String,
    pub phis: Vec<Op>,
    pub instrs: Vec<Op>,
    pub terminator: Terminator,
}

impl BasicBlock {
    /// A new block hangs until control flow is wired up.
    pub fn new(label: String) -> Self {
        Self {
            label,
            phis: vec![],
            instrs: vec![],
            terminator: Terminator::Hanging,
        }
    }
}
