mod common;

use std::collections::HashMap;

use pretty_assertions::assert_str_eq;

use sufc::ir::{Local, MethodIr, Op, Value};
use sufc::lower::ssa;
use sufc::source::SourceBuffer;

const LOOP_PROGRAM: &str = "\
main with x:
x = 0
while (x < 10): {
x = (x + 1)
}
print(x)
";

fn defs(method: &MethodIr) -> Vec<Local> {
    let mut out = vec![];

    for (_, block) in method.blocks() {
        for op in block.phis.iter().chain(block.instrs.iter()) {
            match op {
                Op::Assign { dest, .. }
                | Op::Bin { dest, .. }
                | Op::Call { dest, .. }
                | Op::Phi { dest, .. }
                | Op::Alloc { dest, .. }
                | Op::Load { dest, .. }
                | Op::GetElt { dest, .. } => out.push(dest.clone()),

                Op::Print { .. } | Op::Store { .. } | Op::SetElt { .. } => {}
            }
        }
    }

    out
}

#[test]
fn loop_header_gets_a_phi_for_the_induction_variable() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, LOOP_PROGRAM, true, true);

    let main = &cfg.methods["main"];

    // the condition block joins the entry and the loop back-edge
    let cond_block = main
        .blocks()
        .map(|(_, block)| block)
        .find(|block| block.label == "main1")
        .unwrap();

    assert!(!cond_block.phis.is_empty());

    let x_phi = cond_block
        .phis
        .iter()
        .find_map(|op| match op {
            Op::Phi { dest, incoming } if dest.name == "x" => Some((dest, incoming)),
            _ => None,
        })
        .expect("the induction variable needs a phi");

    let (dest, incoming) = x_phi;
    assert_eq!(dest, &Local::new("x", 3));
    assert_eq!(incoming.len(), 2);
    assert_eq!(incoming[0], ("main".to_owned(), Value::Local(Local::new("x", 2))));
    assert_eq!(
        incoming[1],
        ("main6".to_owned(), Value::Local(Local::new("x", 13)))
    );
}

#[test]
fn every_definition_gets_a_unique_version() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, LOOP_PROGRAM, true, true);

    for method in cfg.methods.values() {
        let mut seen: HashMap<String, Vec<u32>> = HashMap::new();

        for def in defs(method) {
            let versions = seen.entry(def.name.clone()).or_default();

            assert!(
                !versions.contains(&def.version),
                "{}: duplicate definition of {}{}",
                method.name,
                def.name,
                def.version
            );

            versions.push(def.version);
        }
    }
}

#[test]
fn uses_never_reference_a_later_version_than_defined() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, LOOP_PROGRAM, true, true);

    for method in cfg.methods.values() {
        let defined: Vec<_> = defs(method);

        for (_, block) in method.blocks() {
            for op in block.instrs.iter() {
                for value in op_uses(op) {
                    if let Value::Local(local) = value {
                        if local.version > 0 {
                            assert!(
                                defined.contains(local),
                                "{}: use of undefined {}{}",
                                method.name,
                                local.name,
                                local.version
                            );
                        }
                    }
                }
            }
        }
    }
}

fn op_uses(op: &Op) -> Vec<&Value> {
    match op {
        Op::Assign { src, .. } => vec![src],
        Op::Bin { lhs, rhs, .. } => vec![lhs, rhs],

        Op::Call { code, args, .. } => {
            let mut uses = vec![code];
            uses.extend(args.iter());

            uses
        }

        Op::Phi { incoming, .. } => incoming.iter().map(|(_, value)| value).collect(),
        Op::Alloc { .. } => vec![],
        Op::Print { value } => vec![value],
        Op::Load { addr, .. } => vec![addr],
        Op::Store { addr, value } => vec![addr, value],
        Op::GetElt { base, index, .. } => vec![base, index],
        Op::SetElt { base, index, value } => vec![base, index, value],
    }
}

#[test]
fn this_is_never_versioned() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nfields x\nmethod get(this):\nreturn &this.x\n]\nmain with :\n_ = ^(@C).get()\n",
        true,
        true,
    );

    let get = &cfg.methods["C_get"];

    for (_, block) in get.blocks() {
        for op in block.phis.iter().chain(block.instrs.iter()) {
            for value in op_uses(op) {
                if let Value::Local(local) = value {
                    if local.name == "this" {
                        assert_eq!(local.version, 0);
                    }
                }
            }

            if let Op::Phi { dest, .. } = op {
                assert_ne!(dest.name, "this");
            }
        }
    }
}

/// The rewrite is idempotent: a second run leaves the IR untouched.
#[test]
fn running_twice_changes_nothing() {
    let mut source_buf = SourceBuffer::new();
    let mut cfg = common::compile(&mut source_buf, LOOP_PROGRAM, true, true);

    let once = common::dump(&cfg);
    ssa::run(&mut cfg);
    let twice = common::dump(&cfg);

    assert_str_eq!(once, twice);
}
