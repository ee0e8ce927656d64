//! Per-method and whole-program lowering.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Method, Program};
use crate::ir::{Cfg, ClassMetadata, Const, Local, MethodIr, Op, Terminator};
use crate::position::HasSpan;

use super::builder::IrBuilder;
use super::layout::build_layout;
use super::stmt::process_block;
use super::{LowerError, LowerErrorKind};

fn lower_method(
    class_name: Option<&str>,
    method: &Method<'_>,
    classes: &IndexMap<String, ClassMetadata>,
    field_names: &[String],
    method_names: &[String],
    pinhole: bool,
) -> Result<MethodIr, LowerError> {
    let name = match class_name {
        Some(class_name) => format!("{}_{}", class_name, method.name),
        None => method.name.to_string(),
    };

    debug!(method = %name, "lowering");

    let params: Vec<_> = method.params.iter().map(|param| param.to_string()).collect();
    let locals: Vec<_> = method.locals.iter().map(|local| local.to_string()).collect();

    let mut ir = MethodIr::new(name, params, locals.clone());
    let mut builder = IrBuilder::new(&mut ir, classes, field_names, method_names, pinhole);

    // locals start life as the tagged integer zero
    for local in &locals {
        builder.add_instruction(Op::Assign {
            dest: Local::new(local.clone(), 0),
            src: Const::tagged(0).into(),
        });
    }

    let terminated = process_block(&mut builder, &method.body)?;
    let is_main = class_name.is_none();

    if !terminated && !is_main {
        return Err(LowerError {
            span: method.name.span().into_owned(),
            kind: LowerErrorKind::NonTerminatingMethod(method.name.to_string()),
        });
    }

    if is_main {
        // main may fall through; a hanging end returns zero
        for id in ir.order().to_vec() {
            if ir.block(id).terminator.is_hanging() {
                ir.block_mut(id).terminator = Terminator::Return(Const::untagged(0).into());
            }
        }
    }

    Ok(ir)
}

/// Builds the class layout, then lowers every class method and `main`.
pub fn lower_program(program: &Program<'_>, pinhole: bool) -> Result<Cfg, LowerError> {
    let (field_names, method_names, classes) = build_layout(program);

    let mut methods = IndexMap::new();

    for class in &program.classes {
        let class_name = class.name.to_string();

        for method in &class.methods {
            let ir = lower_method(
                Some(class_name.as_str()),
                method,
                &classes,
                &field_names,
                &method_names,
                pinhole,
            )?;

            methods.insert(ir.name.clone(), ir);
        }
    }

    let main = lower_method(
        None,
        &program.main,
        &classes,
        &field_names,
        &method_names,
        pinhole,
    )?;
    methods.insert(main.name.clone(), main);

    Ok(Cfg {
        field_names,
        method_names,
        classes,
        methods,
    })
}
