//! Statement lowering.

use crate::ast::{FieldAssign, If, IfOnly, Print, Return, Stmt, While};
use crate::ir::{BinOp, Const, FailReason, Local, Op, Terminator};

use super::builder::{IrBuilder, Tag};
use super::expr::lower_expr;
use super::LowerError;

/// Lowers a statement list into the current position.
///
/// A `return` ends the list: the remaining statements are not processed and
/// the caller must not emit a post-return jump. Returns whether that
/// happened.
pub fn process_block(builder: &mut IrBuilder<'_>, stmts: &[Stmt<'_>]) -> Result<bool, LowerError> {
    for stmt in stmts {
        lower_stmt(builder, stmt)?;

        if matches!(stmt, Stmt::Return(_)) {
            return Ok(true);
        }
    }

    Ok(false)
}

pub fn lower_stmt(builder: &mut IrBuilder<'_>, stmt: &Stmt<'_>) -> Result<(), LowerError> {
    match stmt {
        Stmt::Assign(assign) => {
            builder.check_variable(&assign.name)?;
            let dest = Local::new(assign.name.to_string(), 0);
            lower_expr(builder, &assign.value, Some(&dest))?;

            Ok(())
        }

        Stmt::Discard(discard) => {
            lower_expr(builder, &discard.expr, None)?;

            Ok(())
        }

        Stmt::FieldAssign(field_assign) => lower_field_assign(builder, field_assign),
        Stmt::If(if_stmt) => lower_if(builder, if_stmt),
        Stmt::IfOnly(if_only) => lower_if_only(builder, if_only),
        Stmt::While(while_stmt) => lower_while(builder, while_stmt),

        Stmt::Return(Return { value }) => {
            let value = lower_expr(builder, value, None)?;
            builder.terminate(Terminator::Return(value));

            Ok(())
        }

        Stmt::Print(Print { value }) => {
            let value = lower_expr(builder, value, None)?;
            builder.tag_check(&value, Tag::Integer);
            builder.untag_val(&value);
            builder.add_instruction(Op::Print {
                value: value.clone(),
            });
            builder.tag_val(&value, Tag::Integer);

            Ok(())
        }
    }
}

/// Same address computation and hole check as a field read, ending in a
/// store instead of a load.
fn lower_field_assign(
    builder: &mut IrBuilder<'_>,
    field_assign: &FieldAssign<'_>,
) -> Result<(), LowerError> {
    let obj = lower_expr(builder, &field_assign.object, None)?;
    builder.tag_check(&obj, Tag::Pointer);
    builder.untag_val(&obj);

    let value = lower_expr(builder, &field_assign.value, None)?;

    let fmap_addr = builder.next_temp();
    builder.add_instruction(Op::Bin {
        dest: fmap_addr.clone(),
        op: BinOp::Add,
        lhs: obj.clone(),
        rhs: Const::untagged(8).into(),
    });

    let fmap = builder.next_temp();
    builder.add_instruction(Op::Load {
        dest: fmap.clone(),
        addr: fmap_addr.into(),
    });

    let offset = builder.field_offset(&field_assign.field)?;
    let entry = builder.next_temp();
    builder.add_instruction(Op::GetElt {
        dest: entry.clone(),
        base: fmap.into(),
        index: Const::untagged((offset * 8) as i64).into(),
    });

    let exists = builder.create_block();
    let missing = builder.create_block();

    builder.terminate(Terminator::Conditional {
        cond: entry.clone().into(),
        on_true: exists,
        on_false: missing,
    });

    builder.set_current_block(missing);
    builder.terminate(Terminator::Fail(FailReason::NoSuchField));

    builder.set_current_block(exists);

    let field_addr = builder.next_temp();
    builder.add_instruction(Op::Bin {
        dest: field_addr.clone(),
        op: BinOp::Add,
        lhs: obj.clone(),
        rhs: entry.into(),
    });

    builder.add_instruction(Op::Store {
        addr: field_addr.into(),
        value,
    });

    builder.tag_val(&obj, Tag::Pointer);

    Ok(())
}

/// The merge block is allocated lazily by the first arm that needs it; if
/// both arms terminate on their own, none is created.
fn lower_if(builder: &mut IrBuilder<'_>, if_stmt: &If<'_>) -> Result<(), LowerError> {
    let cond = lower_expr(builder, &if_stmt.condition, None)?;

    let then_block = builder.create_block();
    let else_block = builder.create_block();
    let mut merge_block = None;

    builder.terminate(Terminator::Conditional {
        cond,
        on_true: then_block,
        on_false: else_block,
    });

    builder.set_current_block(then_block);

    if !process_block(builder, &if_stmt.then_branch)? {
        let merge = *merge_block.get_or_insert_with(|| builder.create_block());
        builder.terminate(Terminator::Jump(merge));
    }

    builder.set_current_block(else_block);

    if !process_block(builder, &if_stmt.else_branch)? {
        let merge = *merge_block.get_or_insert_with(|| builder.create_block());
        builder.terminate(Terminator::Jump(merge));
    }

    if let Some(merge) = merge_block {
        builder.set_current_block(merge);
    }

    Ok(())
}

fn lower_if_only(builder: &mut IrBuilder<'_>, if_only: &IfOnly<'_>) -> Result<(), LowerError> {
    let cond = lower_expr(builder, &if_only.condition, None)?;

    let body_block = builder.create_block();
    let merge_block = builder.create_block();

    builder.terminate(Terminator::Conditional {
        cond,
        on_true: body_block,
        on_false: merge_block,
    });

    builder.set_current_block(body_block);

    if !process_block(builder, &if_only.body)? {
        builder.terminate(Terminator::Jump(merge_block));
    }

    builder.set_current_block(merge_block);

    Ok(())
}

/// The condition gets its own block so the loop back-edge has a target.
fn lower_while(builder: &mut IrBuilder<'_>, while_stmt: &While<'_>) -> Result<(), LowerError> {
    let cond_block = builder.create_block();
    builder.terminate(Terminator::Jump(cond_block));
    builder.set_current_block(cond_block);

    let cond = lower_expr(builder, &while_stmt.condition, None)?;

    let body_block = builder.create_block();
    let merge_block = builder.create_block();

    builder.terminate(Terminator::Conditional {
        cond,
        on_true: body_block,
        on_false: merge_block,
    });

    builder.set_current_block(body_block);

    if !process_block(builder, &while_stmt.body)? {
        builder.terminate(Terminator::Jump(cond_block));
    }

    builder.set_current_block(merge_block);

    Ok(())
}
