use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use itertools::{peek_nth, PeekNth};
use tracing::trace;

use crate::ast::{
    Assign, BinOpExpr, BinOpKind, Class, Discard, Expr, FieldAssign, FieldRead, If, IfOnly,
    IntLit, Method, MethodCall, Name, New, Print, Program, Return, Stmt, This, While,
};
use crate::parse::lexer::{Lexer, LexerError};
use crate::parse::token::{Symbol, Token, TokenType, TokenValue};
use crate::position::{HasSpan, Span, Spanned};
use crate::try_match;

const RECURSION_LIMIT: usize = 1000;

/// The language caps the local-variable count of every method.
pub const MAX_LOCALS: usize = 6;

const STMT_START: &[TokenType] = &[
    TokenType::Ident,
    TokenType::Symbol(Symbol::Underscore),
    TokenType::Symbol(Symbol::Bang),
    TokenType::Symbol(Symbol::If),
    TokenType::Symbol(Symbol::IfOnly),
    TokenType::Symbol(Symbol::While),
    TokenType::Symbol(Symbol::Return),
    TokenType::Symbol(Symbol::Print),
];

const EXPR_START: &[TokenType] = &[
    TokenType::Int,
    TokenType::Ident,
    TokenType::Symbol(Symbol::This),
    TokenType::Symbol(Symbol::ParenLeft),
    TokenType::Symbol(Symbol::Ampersand),
    TokenType::Symbol(Symbol::Caret),
    TokenType::Symbol(Symbol::At),
];

const BIN_OPS: [Symbol; 8] = [
    Symbol::Plus,
    Symbol::Minus,
    Symbol::Asterisk,
    Symbol::Slash,
    Symbol::Less,
    Symbol::Greater,
    Symbol::EqualsEquals,
    Symbol::BangEquals,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    UnexpectedToken {
        expected: Cow<'static, [TokenType]>,
        actual: TokenType,
        span: Span,
    },

    ExpectedMain(Span),

    TooManyLocals {
        count: usize,
        span: Span,
    },

    RecursionLimit(Span),

    Lexer(LexerError),
}

impl From<LexerError> for ParserError {
    fn from(e: LexerError) -> Self {
        Self::Lexer(e)
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken {
                expected, actual, ..
            } => {
                write!(f, "encountered an unexpected token: {}", actual)?;

                match expected.len() {
                    0 => Ok(()),
                    1 => write!(f, " (expected {})", &expected[0]),
                    2 => write!(f, " (expected {} or {})", &expected[0], &expected[1]),

                    _ => {
                        write!(f, " (expected ")?;

                        for ty in expected.iter().take(expected.len() - 1) {
                            write!(f, "{}, ", ty)?;
                        }

                        write!(f, "or {})", &expected[expected.len() - 1])
                    }
                }
            }

            Self::ExpectedMain(_) => {
                write!(f, "expected the `main` method after the class definitions")
            }

            Self::TooManyLocals { count, .. } => {
                write!(
                    f,
                    "a method may declare at most {} locals (found {})",
                    MAX_LOCALS, count
                )
            }

            Self::RecursionLimit(_) => {
                write!(f, "a recursion limit has been reached while parsing")
            }

            Self::Lexer(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ParserError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lexer(err) => Some(err),
            _ => None,
        }
    }
}

impl HasSpan for ParserError {
    fn span(&self) -> Cow<'_, Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Cow::Borrowed(span),
            Self::ExpectedMain(span) => Cow::Borrowed(span),
            Self::TooManyLocals { span, .. } => Cow::Borrowed(span),
            Self::RecursionLimit(span) => Cow::Borrowed(span),
            Self::Lexer(err) => err.span(),
        }
    }
}

trait Matcher {
    fn matches(&self, ty: TokenType) -> bool;

    fn expected_tokens(&self) -> Cow<'static, [TokenType]>;
}

impl Matcher for TokenType {
    fn matches(&self, ty: TokenType) -> bool {
        *self == ty
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        vec![*self].into()
    }
}

impl Matcher for Symbol {
    fn matches(&self, ty: TokenType) -> bool {
        ty == TokenType::Symbol(*self)
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        vec![TokenType::Symbol(*self)].into()
    }
}

impl<const N: usize> Matcher for [Symbol; N] {
    fn matches(&self, ty: TokenType) -> bool {
        match ty {
            TokenType::Symbol(sym) => self.contains(&sym),
            _ => false,
        }
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        self.iter()
            .copied()
            .map(TokenType::Symbol)
            .collect::<Vec<_>>()
            .into()
    }
}

pub struct Parser<'buf> {
    lexer: PeekNth<Lexer<'buf>>,
    recursion_depth: usize,
}

impl<'buf> Parser<'buf> {
    pub fn new(lexer: Lexer<'buf>) -> Self {
        Self {
            lexer: peek_nth(lexer),
            recursion_depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Program<'buf>, ParserError> {
        self.parse_program()
    }

    fn peek_ty(&mut self) -> Result<TokenType, ParserError> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(token.ty()),
            Some(Err(e)) => Err(e.clone().into()),
            None => panic!("peeking past the Eof token"),
        }
    }

    fn peek_span(&mut self) -> Span {
        match self.lexer.peek() {
            Some(Ok(token)) => token.span,
            Some(Err(e)) => e.span().into_owned(),
            None => panic!("peeking past the Eof token"),
        }
    }

    fn advance(&mut self) -> Result<Token<'buf>, ParserError> {
        match self.lexer.next() {
            Some(Ok(token)) => {
                trace!(?token, "consumed");

                Ok(token)
            }

            Some(Err(e)) => Err(e.into()),
            None => panic!("advancing past the Eof token"),
        }
    }

    fn expect<M: Matcher>(&mut self, matcher: M) -> Result<Token<'buf>, ParserError> {
        let token = self.advance()?;

        if matcher.matches(token.ty()) {
            Ok(token)
        } else {
            Err(ParserError::UnexpectedToken {
                expected: matcher.expected_tokens(),
                actual: token.ty(),
                span: token.span,
            })
        }
    }

    fn eat<M: Matcher>(&mut self, matcher: M) -> Result<Option<Token<'buf>>, ParserError> {
        if matcher.matches(self.peek_ty()?) {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_name(&mut self) -> Result<Name<'buf>, ParserError> {
        let token = self.expect(TokenType::Ident)?;
        let bytes = try_match!(token.value, TokenValue::Ident(bytes) => bytes)
            .expect("expect returned an identifier token");

        Ok(Name(Spanned::new(bytes, token.span)))
    }

    fn skip_newlines(&mut self) -> Result<(), ParserError> {
        while self.eat(TokenType::Newline)?.is_some() {}

        Ok(())
    }

    fn parse_program(&mut self) -> Result<Program<'buf>, ParserError> {
        self.skip_newlines()?;

        let mut classes = vec![];

        while self.eat(Symbol::Class)?.is_some() {
            classes.push(self.parse_class()?);
            self.skip_newlines()?;
        }

        let name = self.parse_name()?;

        if name.as_slice() != b"main" {
            return Err(ParserError::ExpectedMain(name.span().into_owned()));
        }

        self.expect(Symbol::With)?;
        let locals = self.parse_name_list(TokenType::Symbol(Symbol::Colon))?;
        self.check_locals(&locals, &name)?;
        self.expect(Symbol::Colon)?;
        self.expect(TokenType::Newline)?;

        let body = self.parse_stmt_list(|ty| ty == TokenType::Eof)?;
        self.expect(TokenType::Eof)?;

        Ok(Program {
            classes,
            main: Method {
                name,
                params: vec![],
                locals,
                body,
            },
        })
    }

    fn parse_class(&mut self) -> Result<Class<'buf>, ParserError> {
        let name = self.parse_name()?;
        self.expect(Symbol::BracketLeft)?;
        self.expect(TokenType::Newline)?;

        let fields = if self.eat(Symbol::Fields)?.is_some() {
            let fields = self.parse_name_list(TokenType::Newline)?;
            self.expect(TokenType::Newline)?;

            fields
        } else {
            vec![]
        };

        let mut methods = vec![];

        while self.eat(Symbol::Method)?.is_some() {
            methods.push(self.parse_method()?);
        }

        self.expect(Symbol::BracketRight)?;
        self.expect(TokenType::Newline)?;

        Ok(Class {
            name,
            fields,
            methods,
        })
    }

    fn parse_method(&mut self) -> Result<Method<'buf>, ParserError> {
        let name = self.parse_name()?;
        self.expect(Symbol::ParenLeft)?;

        // every class method spells out `this` as its first parameter
        let this_token = self.expect(Symbol::This)?;
        let mut params = vec![Name(Spanned::new(&b"this"[..], this_token.span))];

        while self.eat(Symbol::Comma)?.is_some() {
            params.push(self.parse_name()?);
        }

        self.expect(Symbol::ParenRight)?;

        let locals = if self.eat(Symbol::With)?.is_some() {
            self.expect(Symbol::Locals)?;
            self.parse_name_list(TokenType::Symbol(Symbol::Colon))?
        } else {
            vec![]
        };

        self.check_locals(&locals, &name)?;
        self.expect(Symbol::Colon)?;
        self.expect(TokenType::Newline)?;

        let body = self.parse_stmt_list(|ty| {
            ty == TokenType::Symbol(Symbol::Method) || ty == TokenType::Symbol(Symbol::BracketRight)
        })?;

        Ok(Method {
            name,
            params,
            locals,
            body,
        })
    }

    fn check_locals(&self, locals: &[Name<'buf>], name: &Name<'buf>) -> Result<(), ParserError> {
        if locals.len() > MAX_LOCALS {
            Err(ParserError::TooManyLocals {
                count: locals.len(),
                span: name.span().into_owned(),
            })
        } else {
            Ok(())
        }
    }

    /// Parses a possibly empty comma-separated name list; stops (without
    /// consuming) at `terminator`.
    fn parse_name_list(&mut self, terminator: TokenType) -> Result<Vec<Name<'buf>>, ParserError> {
        let mut names = vec![];

        if self.peek_ty()? == terminator {
            return Ok(names);
        }

        loop {
            names.push(self.parse_name()?);

            if self.eat(Symbol::Comma)?.is_none() {
                break;
            }
        }

        Ok(names)
    }

    /// Parses newline-separated statements until `done` matches the token
    /// after a statement boundary. Every list has at least one statement.
    fn parse_stmt_list(
        &mut self,
        done: impl Fn(TokenType) -> bool,
    ) -> Result<Vec<Stmt<'buf>>, ParserError> {
        let mut stmts = vec![self.parse_stmt()?];

        loop {
            if done(self.peek_ty()?) {
                break;
            }

            self.expect(TokenType::Newline)?;

            if done(self.peek_ty()?) {
                break;
            }

            stmts.push(self.parse_stmt()?);
        }

        Ok(stmts)
    }

    fn parse_braced_stmts(&mut self) -> Result<Vec<Stmt<'buf>>, ParserError> {
        self.expect(Symbol::Colon)?;
        self.expect(Symbol::BraceLeft)?;
        self.expect(TokenType::Newline)?;
        let stmts = self.parse_stmt_list(|ty| ty == TokenType::Symbol(Symbol::BraceRight))?;
        self.expect(Symbol::BraceRight)?;

        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt<'buf>, ParserError> {
        self.recursion_depth += 1;

        if self.recursion_depth > RECURSION_LIMIT {
            self.recursion_depth -= 1;

            return Err(ParserError::RecursionLimit(self.peek_span()));
        }

        let result = self.parse_stmt_inner();
        self.recursion_depth -= 1;

        result
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt<'buf>, ParserError> {
        match self.peek_ty()? {
            TokenType::Ident => {
                let name = self.parse_name()?;
                self.expect(Symbol::Equals)?;
                let value = self.parse_expr()?;

                Ok(Stmt::Assign(Assign { name, value }))
            }

            TokenType::Symbol(Symbol::Underscore) => {
                self.advance()?;
                self.expect(Symbol::Equals)?;

                Ok(Stmt::Discard(Discard {
                    expr: self.parse_expr()?,
                }))
            }

            TokenType::Symbol(Symbol::Bang) => {
                self.advance()?;
                let object = self.parse_expr()?;
                self.expect(Symbol::Dot)?;
                let field = self.parse_name()?;
                self.expect(Symbol::Equals)?;
                let value = self.parse_expr()?;

                Ok(Stmt::FieldAssign(FieldAssign {
                    object,
                    field,
                    value,
                }))
            }

            TokenType::Symbol(Symbol::If) => {
                self.advance()?;
                let condition = self.parse_expr()?;
                let then_branch = self.parse_braced_stmts()?;
                self.expect(Symbol::Else)?;
                self.expect(Symbol::BraceLeft)?;
                self.expect(TokenType::Newline)?;
                let else_branch =
                    self.parse_stmt_list(|ty| ty == TokenType::Symbol(Symbol::BraceRight))?;
                self.expect(Symbol::BraceRight)?;

                Ok(Stmt::If(If {
                    condition,
                    then_branch,
                    else_branch,
                }))
            }

            TokenType::Symbol(Symbol::IfOnly) => {
                self.advance()?;
                let condition = self.parse_expr()?;
                let body = self.parse_braced_stmts()?;

                Ok(Stmt::IfOnly(IfOnly { condition, body }))
            }

            TokenType::Symbol(Symbol::While) => {
                self.advance()?;
                let condition = self.parse_expr()?;
                let body = self.parse_braced_stmts()?;

                Ok(Stmt::While(While { condition, body }))
            }

            TokenType::Symbol(Symbol::Return) => {
                self.advance()?;

                Ok(Stmt::Return(Return {
                    value: self.parse_expr()?,
                }))
            }

            TokenType::Symbol(Symbol::Print) => {
                self.advance()?;
                self.expect(Symbol::ParenLeft)?;
                let value = self.parse_expr()?;
                self.expect(Symbol::ParenRight)?;

                Ok(Stmt::Print(Print { value }))
            }

            _ => {
                let token = self.advance()?;

                Err(ParserError::UnexpectedToken {
                    expected: Cow::Borrowed(STMT_START),
                    actual: token.ty(),
                    span: token.span,
                })
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr<'buf>, ParserError> {
        self.recursion_depth += 1;

        if self.recursion_depth > RECURSION_LIMIT {
            self.recursion_depth -= 1;

            return Err(ParserError::RecursionLimit(self.peek_span()));
        }

        let result = self.parse_expr_inner();
        self.recursion_depth -= 1;

        result
    }

    fn parse_expr_inner(&mut self) -> Result<Expr<'buf>, ParserError> {
        let token = self.advance()?;

        match token.value {
            TokenValue::Int(value) => Ok(Expr::Int(IntLit(Spanned::new(value, token.span)))),

            TokenValue::Ident(bytes) => Ok(Expr::Var(Name(Spanned::new(bytes, token.span)))),

            TokenValue::Symbol(Symbol::This) => Ok(Expr::This(This(token.span))),

            TokenValue::Symbol(Symbol::ParenLeft) => {
                let lhs = self.parse_expr()?;

                // `( expr )` with no operator is grouping
                if self.eat(Symbol::ParenRight)?.is_some() {
                    return Ok(lhs);
                }

                let op_token = self.expect(BIN_OPS)?;

                let op = match op_token.ty() {
                    TokenType::Symbol(sym) => {
                        BinOpKind::try_from(sym).expect("BIN_OPS contains operators only")
                    }
                    _ => unreachable!(),
                };

                let rhs = self.parse_expr()?;
                self.expect(Symbol::ParenRight)?;

                Ok(Expr::BinOp(BinOpExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }))
            }

            TokenValue::Symbol(Symbol::Ampersand) => {
                let base = self.parse_expr()?;
                self.expect(Symbol::Dot)?;
                let field = self.parse_name()?;

                Ok(Expr::FieldRead(FieldRead {
                    base: Box::new(base),
                    field,
                }))
            }

            TokenValue::Symbol(Symbol::Caret) => {
                let base = self.parse_expr()?;
                self.expect(Symbol::Dot)?;
                let method = self.parse_name()?;
                self.expect(Symbol::ParenLeft)?;

                let mut args = vec![];

                if self.peek_ty()? != TokenType::Symbol(Symbol::ParenRight) {
                    loop {
                        args.push(self.parse_expr()?);

                        if self.eat(Symbol::Comma)?.is_none() {
                            break;
                        }
                    }
                }

                self.expect(Symbol::ParenRight)?;

                Ok(Expr::MethodCall(MethodCall {
                    base: Box::new(base),
                    method,
                    args,
                }))
            }

            TokenValue::Symbol(Symbol::At) => Ok(Expr::New(New(self.parse_name()?))),

            _ => Err(ParserError::UnexpectedToken {
                expected: Cow::Borrowed(EXPR_START),
                actual: token.ty(),
                span: token.span,
            }),
        }
    }
}
