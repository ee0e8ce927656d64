use indexmap::IndexMap;

use crate::ast::Name;
use crate::ir::value::THIS;
use crate::ir::{
    BinOp, BlockId, ClassMetadata, Const, FailReason, Local, MethodIr, Op, Terminator, Value,
};
use crate::position::HasSpan;

use super::{LowerError, LowerErrorKind};

/// The low-bit tag of a runtime word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Pointer = 0,
    Integer = 1,
}

/// Per-method lowering state: the current block, the fresh-temporary
/// counter and the layout tables needed to resolve dispatch.
pub struct IrBuilder<'a> {
    method: &'a mut MethodIr,
    current: BlockId,
    next_temp: usize,
    classes: &'a IndexMap<String, ClassMetadata>,
    field_names: &'a [String],
    method_names: &'a [String],
    pinhole: bool,
}

impl<'a> IrBuilder<'a> {
    pub fn new(
        method: &'a mut MethodIr,
        classes: &'a IndexMap<String, ClassMetadata>,
        field_names: &'a [String],
        method_names: &'a [String],
        pinhole: bool,
    ) -> Self {
        let current = method.entry();

        Self {
            method,
            current,
            next_temp: 1,
            classes,
            field_names,
            method_names,
            pinhole,
        }
    }

    pub fn create_block(&mut self) -> BlockId {
        self.method.add_block()
    }

    pub fn set_current_block(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn add_instruction(&mut self, op: Op) {
        self.method.block_mut(self.current).instrs.push(op);
    }

    /// Replaces the current block's terminator, hanging or not.
    pub fn terminate(&mut self, terminator: Terminator) {
        self.method.block_mut(self.current).terminator = terminator;
    }

    pub fn next_temp(&mut self) -> Local {
        let name = format!("tmp{}v", self.next_temp);
        self.next_temp += 1;
        self.method.register_temp(name.clone());

        Local::new(name, 0)
    }

    pub fn check_variable(&self, name: &Name<'_>) -> Result<(), LowerError> {
        let text = name.to_string();

        if self.method.params.contains(&text) || self.method.locals.contains(&text) {
            Ok(())
        } else {
            Err(LowerError {
                span: name.span().into_owned(),
                kind: LowerErrorKind::UnknownVariable(text),
            })
        }
    }

    pub fn class_size(&self, name: &Name<'_>) -> Result<usize, LowerError> {
        self.classes
            .get(&name.to_string())
            .map(|class| class.objsize)
            .ok_or_else(|| LowerError {
                span: name.span().into_owned(),
                kind: LowerErrorKind::UnknownClass(name.to_string()),
            })
    }

    pub fn field_offset(&self, name: &Name<'_>) -> Result<usize, LowerError> {
        self.field_names
            .iter()
            .position(|field| field.as_bytes() == name.as_slice())
            .ok_or_else(|| LowerError {
                span: name.span().into_owned(),
                kind: LowerErrorKind::UnknownField(name.to_string()),
            })
    }

    pub fn method_offset(&self, name: &Name<'_>) -> Result<usize, LowerError> {
        self.method_names
            .iter()
            .position(|method| method.as_bytes() == name.as_slice())
            .ok_or_else(|| LowerError {
                span: name.span().into_owned(),
                kind: LowerErrorKind::UnknownMethod(name.to_string()),
            })
    }

    /// Tag operations apply to variables only; the pinhole additionally
    /// elides them on the literal `this`, a known pointer.
    fn elide_tag_ops(&self, value: &Value) -> bool {
        match value.as_local() {
            Some(local) => self.pinhole && local.name == THIS,
            None => true,
        }
    }

    /// Branches on the low bit of `value`, diverting the wrong-tag side
    /// into a fresh `fail` block. The surviving side becomes current.
    pub fn tag_check(&mut self, value: &Value, tag: Tag) {
        if self.elide_tag_ops(value) {
            return;
        }

        let is_tag = self.create_block();
        let not_tag = self.create_block();

        let bit = self.next_temp();
        self.add_instruction(Op::Bin {
            dest: bit.clone(),
            op: BinOp::BitAnd,
            lhs: value.clone(),
            rhs: Const::untagged(1).into(),
        });

        let cond = Value::Local(bit);

        self.terminate(match tag {
            Tag::Integer => Terminator::Conditional {
                cond,
                on_true: is_tag,
                on_false: not_tag,
            },

            Tag::Pointer => Terminator::Conditional {
                cond,
                on_true: not_tag,
                on_false: is_tag,
            },
        });

        self.set_current_block(not_tag);
        self.terminate(Terminator::Fail(match tag {
            Tag::Integer => FailReason::NotANumber,
            Tag::Pointer => FailReason::NotAPointer,
        }));

        self.set_current_block(is_tag);
    }

    pub fn tag_val(&mut self, value: &Value, tag: Tag) {
        if self.elide_tag_ops(value) {
            return;
        }

        let Some(dest) = value.as_local().cloned() else {
            return;
        };

        self.add_instruction(Op::Bin {
            dest: dest.clone(),
            op: BinOp::Mul,
            lhs: value.clone(),
            rhs: Const::untagged(2).into(),
        });

        if let Tag::Integer = tag {
            self.add_instruction(Op::Bin {
                dest,
                op: BinOp::BitXor,
                lhs: value.clone(),
                rhs: Const::untagged(1).into(),
            });
        }
    }

    pub fn untag_val(&mut self, value: &Value) {
        if self.elide_tag_ops(value) {
            return;
        }

        let Some(dest) = value.as_local().cloned() else {
            return;
        };

        self.add_instruction(Op::Bin {
            dest,
            op: BinOp::Div,
            lhs: value.clone(),
            rhs: Const::untagged(2).into(),
        });
    }
}
