use std::borrow::Cow;
use std::fmt;

use crate::parse::token::Symbol;
use crate::position::{HasSpan, Span, Spanned};

pub mod dump;

macro_rules! define_op_kind {
    ($name:ident { $( $op:ident => $symbol:ident, )+ }) => {
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum $name {
            $( $op, )+
        }

        impl $name {
            pub fn symbol(self) -> Symbol {
                match self {
                    $( Self::$op => Symbol::$symbol, )+
                }
            }
        }

        impl TryFrom<Symbol> for $name {
            type Error = ();

            fn try_from(symbol: Symbol) -> Result<Self, Self::Error> {
                match symbol {
                    $( Symbol::$symbol => Ok(Self::$op), )+
                    _ => Err(()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Program<'buf> {
    pub classes: Vec<Class<'buf>>,
    pub main: Method<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Class<'buf> {
    pub name: Name<'buf>,
    pub fields: Vec<Name<'buf>>,
    pub methods: Vec<Method<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Method<'buf> {
    pub name: Name<'buf>,
    pub params: Vec<Name<'buf>>,
    pub locals: Vec<Name<'buf>>,
    pub body: Vec<Stmt<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name<'buf>(pub Spanned<&'buf [u8]>);

impl<'buf> Name<'buf> {
    pub fn as_slice(&self) -> &'buf [u8] {
        self.0.value
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0.value))
    }
}

impl HasSpan for Name<'_> {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.0.span)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr<'buf> {
    This(This),
    Int(IntLit),
    Var(Name<'buf>),
    New(New<'buf>),
    BinOp(BinOpExpr<'buf>),
    FieldRead(FieldRead<'buf>),
    MethodCall(MethodCall<'buf>),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct This(pub Span);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct IntLit(pub Spanned<i64>);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct New<'buf>(pub Name<'buf>);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BinOpExpr<'buf> {
    pub op: BinOpKind,
    pub lhs: Box<Expr<'buf>>,
    pub rhs: Box<Expr<'buf>>,
}

define_op_kind!(BinOpKind {
    Add => Plus,
    Subtract => Minus,
    Multiply => Asterisk,
    Divide => Slash,
    Less => Less,
    Greater => Greater,
    Equals => EqualsEquals,
    NotEquals => BangEquals,
});

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldRead<'buf> {
    pub base: Box<Expr<'buf>>,
    pub field: Name<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MethodCall<'buf> {
    pub base: Box<Expr<'buf>>,
    pub method: Name<'buf>,
    pub args: Vec<Expr<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Stmt<'buf> {
    Assign(Assign<'buf>),
    Discard(Discard<'buf>),
    FieldAssign(FieldAssign<'buf>),
    If(If<'buf>),
    IfOnly(IfOnly<'buf>),
    While(While<'buf>),
    Return(Return<'buf>),
    Print(Print<'buf>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Assign<'buf> {
    pub name: Name<'buf>,
    pub value: Expr<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Discard<'buf> {
    pub expr: Expr<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldAssign<'buf> {
    pub object: Expr<'buf>,
    pub field: Name<'buf>,
    pub value: Expr<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct If<'buf> {
    pub condition: Expr<'buf>,
    pub then_branch: Vec<Stmt<'buf>>,
    pub else_branch: Vec<Stmt<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IfOnly<'buf> {
    pub condition: Expr<'buf>,
    pub body: Vec<Stmt<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct While<'buf> {
    pub condition: Expr<'buf>,
    pub body: Vec<Stmt<'buf>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Return<'buf> {
    pub value: Expr<'buf>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Print<'buf> {
    pub value: Expr<'buf>,
}
