//! The SSA rewrite.
//!
//! Naive by intent: every block with more than one predecessor gets a phi
//! for every variable, and a single rename walk assigns a fresh version to
//! each definition. Soundness over minimality; the dead phis are accepted.

use indexmap::IndexMap;
use slotmap::SecondaryMap;
use tracing::debug;

use crate::ir::value::THIS;
use crate::ir::{BlockId, Cfg, Local, MethodIr, Op, Terminator, Value};

type Versions = IndexMap<String, u32>;

pub fn run(cfg: &mut Cfg) {
    for method in cfg.methods.values_mut() {
        run_method(method);
    }
}

/// Running this twice is a no-op on the second pass: phis are skipped by
/// the rename walk, and the rename is a function of the underlying names
/// alone, so it reproduces the same versions.
pub fn run_method(method: &mut MethodIr) {
    debug!(method = %method.name, "rewriting into ssa");

    let preds = method.preds();
    let order = method.rpo();

    // every name starts at version 0: parameters (minus `this`), locals,
    // temporaries, in that order
    let mut global: Versions = IndexMap::new();

    for param in &method.params {
        if param != THIS {
            global.insert(param.clone(), 0);
        }
    }

    for local in &method.locals {
        global.insert(local.clone(), 0);
    }

    for temp in method.temps() {
        global.insert(temp.to_owned(), 0);
    }

    let mut phi_dests: SecondaryMap<BlockId, Versions> = SecondaryMap::new();
    let mut state_end: SecondaryMap<BlockId, Versions> = SecondaryMap::new();

    // Rename walk, in reverse postorder. `global` allocates fresh version
    // numbers; the versions *visible* inside a block come from its entry
    // state: the phi destinations at a join, the predecessor's end state
    // along a straight edge, version 0 at the entry block. Reverse
    // postorder guarantees a single predecessor has been walked already.
    for &bb in &order {
        let block_preds = &preds[bb];

        let mut state = if block_preds.len() > 1 {
            let mut dests = Versions::with_capacity(global.len());

            for (name, ver) in global.iter_mut() {
                *ver += 1;
                dests.insert(name.clone(), *ver);
            }

            phi_dests.insert(bb, dests.clone());

            dests
        } else if let Some(&pred) = block_preds.first() {
            state_end
                .get(pred)
                .cloned()
                .unwrap_or_else(|| zero_state(&global))
        } else {
            zero_state(&global)
        };

        let block = method.block_mut(bb);

        for op in &mut block.instrs {
            rename_op(op, &mut state, &mut global);
        }

        rename_terminator(&mut block.terminator, &state);

        state_end.insert(bb, state);
    }

    // second walk: build the phis from the end-of-block states of every
    // predecessor
    for &bb in &order {
        let Some(dests) = phi_dests.get(bb) else {
            continue;
        };

        let mut phis = Vec::with_capacity(dests.len());

        for (name, &ver) in dests {
            let incoming = preds[bb]
                .iter()
                .map(|&pred| {
                    let pred_version = state_end
                        .get(pred)
                        .and_then(|state| state.get(name))
                        .copied()
                        .unwrap_or(0);

                    (
                        method.label(pred).to_owned(),
                        Value::Local(Local::new(name.clone(), pred_version)),
                    )
                })
                .collect();

            phis.push(Op::Phi {
                dest: Local::new(name.clone(), ver),
                incoming,
            });
        }

        method.block_mut(bb).phis = phis;
    }
}

fn zero_state(global: &Versions) -> Versions {
    global.keys().map(|name| (name.clone(), 0)).collect()
}

/// Renames an instruction: uses read the visible version, definitions
/// allocate a fresh one. Phis are left to the insertion walk.
fn rename_op(op: &mut Op, state: &mut Versions, global: &mut Versions) {
    match op {
        Op::Assign { dest, src } => {
            rename_use(src, state);
            rename_def(dest, state, global);
        }

        Op::Bin { dest, lhs, rhs, .. } => {
            rename_use(lhs, state);
            rename_use(rhs, state);
            rename_def(dest, state, global);
        }

        Op::Call { dest, code, args } => {
            rename_use(code, state);

            for arg in args {
                rename_use(arg, state);
            }

            rename_def(dest, state, global);
        }

        Op::Phi { .. } => {}

        Op::Alloc { dest, .. } => rename_def(dest, state, global),

        Op::Print { value } => rename_use(value, state),

        Op::Load { dest, addr } => {
            rename_use(addr, state);
            rename_def(dest, state, global);
        }

        Op::Store { addr, value } => {
            rename_use(addr, state);
            rename_use(value, state);
        }

        Op::GetElt { dest, base, index } => {
            rename_use(base, state);
            rename_use(index, state);
            rename_def(dest, state, global);
        }

        Op::SetElt { base, index, value } => {
            rename_use(base, state);
            rename_use(index, state);
            rename_use(value, state);
        }
    }
}

fn rename_terminator(terminator: &mut Terminator, state: &Versions) {
    match terminator {
        Terminator::Conditional { cond, .. } => rename_use(cond, state),
        Terminator::Return(value) => rename_use(value, state),
        Terminator::Jump(_) | Terminator::Fail(_) | Terminator::Hanging => {}
    }
}

/// Names absent from the seed (`this`, most notably) stay at version 0.
fn rename_use(value: &mut Value, state: &Versions) {
    if let Value::Local(local) = value {
        if let Some(&ver) = state.get(&local.name) {
            local.version = ver;
        }
    }
}

fn rename_def(local: &mut Local, state: &mut Versions, global: &mut Versions) {
    if let Some(ver) = global.get_mut(&local.name) {
        *ver += 1;
        local.version = *ver;
        state.insert(local.name.clone(), *ver);
    }
}
