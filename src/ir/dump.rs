//! Textual IR emission.
//!
//! The output shape (spacing, punctuation, ordering) is a contract with
//! downstream tooling; change nothing casually.

use std::io::{self, Write};

use itertools::Itertools;

use super::bb::BasicBlock;
use super::cfg::{Cfg, ClassMetadata};
use super::instr::Terminator;
use super::method::MethodIr;

pub fn dump_cfg(cfg: &Cfg, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "data:")?;

    for class in cfg.classes.values() {
        dump_class(class, &mut out)?;
    }

    writeln!(out)?;
    writeln!(out, "code:")?;
    writeln!(out)?;

    for method in cfg.methods.values() {
        dump_method(method, &mut out)?;
    }

    Ok(())
}

fn dump_class(class: &ClassMetadata, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "global array vtable{}: {{ {} }}",
        class.name,
        class.vtable.iter().join(", ")
    )?;

    writeln!(
        out,
        "global array ftable{}: {{ {} }}",
        class.name,
        class.ftable.iter().join(", ")
    )?;

    writeln!(out)
}

pub fn dump_method(method: &MethodIr, out: &mut impl Write) -> io::Result<()> {
    for (_, block) in method.blocks() {
        dump_block(method, block, out)?;
    }

    writeln!(out)
}

fn dump_block(method: &MethodIr, block: &BasicBlock, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}:", block.label)?;

    for phi in &block.phis {
        writeln!(out, "\t{}", phi)?;
    }

    for instr in &block.instrs {
        writeln!(out, "\t{}", instr)?;
    }

    match &block.terminator {
        Terminator::Jump(target) => writeln!(out, "\tjump {}", method.label(*target)),

        Terminator::Conditional {
            cond,
            on_true,
            on_false,
        } => writeln!(
            out,
            "\tif {} then {} else {}",
            cond,
            method.label(*on_true),
            method.label(*on_false)
        ),

        Terminator::Return(value) => writeln!(out, "\tret {}", value),

        Terminator::Fail(reason) => writeln!(out, "\tfail {}", reason),

        // a fall-through in `main` returns zero
        Terminator::Hanging => writeln!(out, "\tret 0"),
    }
}
