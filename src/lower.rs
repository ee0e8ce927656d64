//! AST-to-IR lowering.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use crate::position::{HasSpan, Span};

pub mod builder;
pub mod expr;
pub mod layout;
pub mod method;
pub mod ssa;
pub mod stmt;

pub use method::lower_program;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerErrorKind {
    UnknownVariable(String),
    UnknownClass(String),
    UnknownField(String),
    UnknownMethod(String),
    NonTerminatingMethod(String),
}

impl Display for LowerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable(name) => write!(f, "unknown variable `{}`", name),
            Self::UnknownClass(name) => write!(f, "unknown class `{}`", name),
            Self::UnknownField(name) => write!(f, "unknown field `{}`", name),
            Self::UnknownMethod(name) => write!(f, "unknown method `{}`", name),

            Self::NonTerminatingMethod(name) => {
                write!(f, "method `{}` does not terminate", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerError {
    pub span: Span,
    pub kind: LowerErrorKind,
}

impl Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lowering failed: {}", self.kind)
    }
}

impl Error for LowerError {}

impl HasSpan for LowerError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}
