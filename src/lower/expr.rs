//! Expression lowering.
//!
//! Every expression takes a suggested destination: when one is given the
//! result lands there (via an extra `Assign` if nothing else writes it),
//! otherwise a fresh temporary is allocated.

use crate::ast::{BinOpExpr, BinOpKind, Expr, FieldRead, MethodCall, New};
use crate::ir::value::THIS;
use crate::ir::{BinOp, Const, FailReason, Global, Local, Op, Terminator, Value};

use super::builder::{IrBuilder, Tag};
use super::LowerError;

pub fn lower_expr(
    builder: &mut IrBuilder<'_>,
    expr: &Expr<'_>,
    out: Option<&Local>,
) -> Result<Value, LowerError> {
    match expr {
        Expr::This(_) => Ok(forward(builder, Local::new(THIS, 0).into(), out)),

        Expr::Int(lit) => Ok(forward(builder, Const::tagged(lit.0.value).into(), out)),

        Expr::Var(name) => {
            builder.check_variable(name)?;

            Ok(forward(
                builder,
                Local::new(name.to_string(), 0).into(),
                out,
            ))
        }

        Expr::New(new) => lower_new(builder, new, out),
        Expr::BinOp(bin_op) => lower_bin_op(builder, bin_op, out),
        Expr::FieldRead(field_read) => lower_field_read(builder, field_read, out),
        Expr::MethodCall(call) => lower_method_call(builder, call, out),
    }
}

fn forward(builder: &mut IrBuilder<'_>, value: Value, out: Option<&Local>) -> Value {
    match out {
        Some(dest) => {
            builder.add_instruction(Op::Assign {
                dest: dest.clone(),
                src: value,
            });

            Value::Local(dest.clone())
        }

        None => value,
    }
}

/// Allocates the instance and points slots 0 and 1 at the class's dispatch
/// tables.
fn lower_new(
    builder: &mut IrBuilder<'_>,
    new: &New<'_>,
    out: Option<&Local>,
) -> Result<Value, LowerError> {
    let dest = out.cloned().unwrap_or_else(|| builder.next_temp());

    let slots = builder.class_size(&new.0)?;
    builder.add_instruction(Op::Alloc {
        dest: dest.clone(),
        slots,
    });

    builder.add_instruction(Op::Store {
        addr: dest.clone().into(),
        value: Global::new(format!("vtable{}", new.0)).into(),
    });

    let ftable_addr = builder.next_temp();
    builder.add_instruction(Op::Bin {
        dest: ftable_addr.clone(),
        op: BinOp::Add,
        lhs: dest.clone().into(),
        rhs: Const::untagged(8).into(),
    });

    builder.add_instruction(Op::Store {
        addr: ftable_addr.into(),
        value: Global::new(format!("ftable{}", new.0)).into(),
    });

    let value = Value::Local(dest);
    builder.tag_val(&value, Tag::Pointer);

    Ok(value)
}

fn lower_bin_op(
    builder: &mut IrBuilder<'_>,
    bin_op: &BinOpExpr<'_>,
    out: Option<&Local>,
) -> Result<Value, LowerError> {
    let lhs = lower_expr(builder, &bin_op.lhs, None)?;
    builder.tag_check(&lhs, Tag::Integer);

    let rhs = lower_expr(builder, &bin_op.rhs, None)?;
    builder.tag_check(&rhs, Tag::Integer);

    let dest = out.cloned().unwrap_or_else(|| builder.next_temp());

    // equality compares tag bits along with the values, so it skips the
    // untag/retag pair
    let (op, untag) = match bin_op.op {
        BinOpKind::Add => (BinOp::Add, true),
        BinOpKind::Subtract => (BinOp::Sub, true),
        BinOpKind::Multiply => (BinOp::Mul, true),
        BinOpKind::Divide => (BinOp::Div, true),
        BinOpKind::Less => (BinOp::Lt, true),
        BinOpKind::Greater => (BinOp::Gt, true),
        BinOpKind::Equals => (BinOp::Eq, false),
        BinOpKind::NotEquals => (BinOp::Ne, false),
    };

    if untag {
        builder.untag_val(&lhs);
        builder.untag_val(&rhs);
    }

    builder.add_instruction(Op::Bin {
        dest: dest.clone(),
        op,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    });

    if untag {
        builder.tag_val(&lhs, Tag::Integer);
        builder.tag_val(&rhs, Tag::Integer);
    }

    Ok(Value::Local(dest))
}

fn lower_field_read(
    builder: &mut IrBuilder<'_>,
    field_read: &FieldRead<'_>,
    out: Option<&Local>,
) -> Result<Value, LowerError> {
    let obj = lower_expr(builder, &field_read.base, None)?;
    builder.tag_check(&obj, Tag::Pointer);
    builder.untag_val(&obj);

    let target = out.cloned().unwrap_or_else(|| builder.next_temp());

    // the ftable pointer lives at offset 8
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

    let offset = builder.field_offset(&field_read.field)?;
    let entry = builder.next_temp();
    builder.add_instruction(Op::GetElt {
        dest: entry.clone(),
        base: fmap.into(),
        index: Const::untagged((offset * 8) as i64).into(),
    });

    let missing = builder.create_block();
    let exists = builder.create_block();

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

    builder.add_instruction(Op::Load {
        dest: target.clone(),
        addr: field_addr.into(),
    });

    builder.tag_val(&obj, Tag::Pointer);

    Ok(Value::Local(target))
}

fn lower_method_call(
    builder: &mut IrBuilder<'_>,
    call: &MethodCall<'_>,
    out: Option<&Local>,
) -> Result<Value, LowerError> {
    let obj = lower_expr(builder, &call.base, None)?;
    builder.tag_check(&obj, Tag::Pointer);
    builder.untag_val(&obj);

    let dest = out.cloned().unwrap_or_else(|| builder.next_temp());

    // the vtable pointer lives at slot 0, so the receiver address loads it
    // directly
    let vtable = builder.next_temp();
    builder.add_instruction(Op::Load {
        dest: vtable.clone(),
        addr: obj.clone(),
    });
    builder.tag_val(&obj, Tag::Pointer);

    let index = builder.method_offset(&call.method)?;
    let entry = builder.next_temp();
    builder.add_instruction(Op::GetElt {
        dest: entry.clone(),
        base: vtable.into(),
        index: Const::untagged((index * 8) as i64).into(),
    });

    let missing = builder.create_block();
    let exists = builder.create_block();

    builder.terminate(Terminator::Conditional {
        cond: entry.clone().into(),
        on_true: exists,
        on_false: missing,
    });

    builder.set_current_block(missing);
    builder.terminate(Terminator::Fail(FailReason::NoSuchMethod));

    builder.set_current_block(exists);

    // the receiver rides along as argument 0
    let mut args = vec![obj];

    for arg in &call.args {
        args.push(lower_expr(builder, arg, None)?);
    }

    builder.add_instruction(Op::Call {
        dest: dest.clone(),
        code: entry.into(),
        args,
    });

    Ok(Value::Local(dest))
}
