use std::fmt;

use itertools::Itertools;

use super::bb::BlockId;
use super::value::{Local, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Gt,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Add => "+",
                Self::Sub => "-",
                Self::Mul => "*",
                Self::Div => "/",
                Self::BitAnd => "&",
                Self::BitOr => "|",
                Self::BitXor => "^",
                Self::Eq => "==",
                Self::Ne => "!=",
                Self::Lt => "<",
                Self::Gt => ">",
            }
        )
    }
}

/// A non-terminator instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Assign {
        dest: Local,
        src: Value,
    },

    Bin {
        dest: Local,
        op: BinOp,
        lhs: Value,
        rhs: Value,
    },

    Call {
        dest: Local,
        code: Value,
        args: Vec<Value>,
    },

    /// Selects the value whose predecessor label control flowed from.
    Phi {
        dest: Local,
        incoming: Vec<(String, Value)>,
    },

    Alloc {
        dest: Local,
        slots: usize,
    },

    Print {
        value: Value,
    },

    Load {
        dest: Local,
        addr: Value,
    },

    Store {
        addr: Value,
        value: Value,
    },

    GetElt {
        dest: Local,
        base: Value,
        index: Value,
    },

    SetElt {
        base: Value,
        index: Value,
        value: Value,
    },
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign { dest, src } => write!(f, "{} = {}", dest, src),

            Self::Bin { dest, op, lhs, rhs } => {
                write!(f, "{} = {} {} {}", dest, lhs, op, rhs)
            }

            Self::Call { dest, code, args } => {
                write!(f, "{} = call({}", dest, code)?;

                for arg in args {
                    write!(f, ", {}", arg)?;
                }

                write!(f, ")")
            }

            Self::Phi { dest, incoming } => {
                write!(
                    f,
                    "{} = phi({})",
                    dest,
                    incoming
                        .iter()
                        .map(|(pred, value)| format!("{}, {}", pred, value))
                        .join(", ")
                )
            }

            Self::Alloc { dest, slots } => write!(f, "{} = alloc({})", dest, slots),

            Self::Print { value } => write!(f, "print({})", value),

            Self::Load { dest, addr } => write!(f, "{} = load({})", dest, addr),

            Self::Store { addr, value } => write!(f, "store({}, {})", addr, value),

            Self::GetElt { dest, base, index } => {
                write!(f, "{} = getelt({}, {})", dest, base, index)
            }

            Self::SetElt { base, index, value } => {
                write!(f, "setelt({}, {}, {})", base, index, value)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailReason {
    NotAPointer,
    NotANumber,
    NoSuchField,
    NoSuchMethod,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::NotAPointer => "NotAPointer",
                Self::NotANumber => "NotANumber",
                Self::NoSuchField => "NoSuchField",
                Self::NoSuchMethod => "NoSuchMethod",
            }
        )
    }
}

/// The final control-flow instruction of a basic block.
///
/// Successor edges are block keys into the owning method; label strings
/// exist for printing only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    Jump(BlockId),

    Conditional {
        cond: Value,
        on_true: BlockId,
        on_false: BlockId,
    },

    Return(Value),

    Fail(FailReason),

    /// The in-progress placeholder; never survives lowering except in
    /// `main`, where emission renders it as `ret 0`.
    Hanging,
}

impl Terminator {
    pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        let (first, second) = match *self {
            Self::Jump(target) => (Some(target), None),

            Self::Conditional {
                on_true, on_false, ..
            } => (Some(on_true), Some(on_false)),

            Self::Return(_) | Self::Fail(_) | Self::Hanging => (None, None),
        };

        first.into_iter().chain(second)
    }

    pub fn is_hanging(&self) -> bool {
        matches!(self, Self::Hanging)
    }
}
