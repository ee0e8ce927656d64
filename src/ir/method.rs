use std::collections::HashSet;

use slotmap::{SecondaryMap, SlotMap};

use super::bb::{BasicBlock, BlockId};

/// The per-method block graph.
///
/// Blocks are kept in construction order; the first block is the entry and
/// its label carries the parameter-list decoration.
#[derive(Debug, Clone)]
pub struct MethodIr {
    pub name: String,
    pub params: Vec<String>,
    pub locals: Vec<String>,
    temps: Vec<String>,
    blocks: SlotMap<BlockId, BasicBlock>,
    order: Vec<BlockId>,
    entry: BlockId,
}

impl MethodIr {
    pub fn new(name: impl Into<String>, params: Vec<String>, locals: Vec<String>) -> Self {
        let name = name.into();

        let entry_label = if params.is_empty() {
            name.clone()
        } else {
            format!("{}({})", name, params.join(", "))
        };

        let mut blocks = SlotMap::with_key();
        let entry = blocks.insert(BasicBlock::new(entry_label));

        Self {
            name,
            params,
            locals,
            temps: vec![],
            blocks,
            order: vec![entry],
            entry,
        }
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn add_block(&mut self) -> BlockId {
        let label = format!("{}{}", self.name, self.order.len());
        let id = self.blocks.insert(BasicBlock::new(label));
        self.order.push(id);

        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id]
    }

    pub fn label(&self, id: BlockId) -> &str {
        &self.blocks[id].label
    }

    /// Block ids in construction order.
    pub fn order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> + '_ {
        self.order.iter().map(move |&id| (id, &self.blocks[id]))
    }

    pub fn register_temp(&mut self, name: impl Into<String>) {
        self.temps.push(name.into());
    }

    pub fn temps(&self) -> &[String] {
        &self.temps
    }

    /// Predecessors of every block, in construction order of the
    /// predecessor blocks.
    pub fn preds(&self) -> SecondaryMap<BlockId, Vec<BlockId>> {
        let mut preds = SecondaryMap::new();

        for &id in &self.order {
            preds.insert(id, vec![]);
        }

        for &id in &self.order {
            for succ in self.blocks[id].terminator.successors() {
                preds[succ].push(id);
            }
        }

        preds
    }

    /// Reverse postorder from the entry block; conditional successors are
    /// visited true-first.
    pub fn rpo(&self) -> Vec<BlockId> {
        let mut visited: HashSet<BlockId> = HashSet::from([self.entry]);
        let mut stack: Vec<(BlockId, usize)> = vec![(self.entry, 0)];
        let mut post = Vec::with_capacity(self.order.len());

        while let Some(&(id, idx)) = stack.last() {
            match self.blocks[id].terminator.successors().nth(idx) {
                Some(succ) => {
                    stack.last_mut().unwrap().1 += 1;

                    if visited.insert(succ) {
                        stack.push((succ, 0));
                    }
                }

                None => {
                    post.push(id);
                    stack.pop();
                }
            }
        }

        post.reverse();

        post
    }
}
