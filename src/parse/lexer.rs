use std::borrow::Cow;
use std::error::Error;
use std::fmt::Display;
use std::iter::FusedIterator;
use std::num::{IntErrorKind, ParseIntError};

use crate::parse::cursor::Cursor;
use crate::parse::token::{Symbol, Token, TokenValue};
use crate::position::{HasSpan, Position, Span};

type ScanResult<'buf> = Result<TokenValue<'buf>, PosLexerError>;

const FORM_FEED: u8 = 0x0c;
const VERTICAL_TAB: u8 = 0x0b;

fn is_inline_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | FORM_FEED | VERTICAL_TAB)
}

fn is_line_break(c: u8) -> bool {
    matches!(c, b'\n' | b'\r')
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_continuation(c: u8) -> bool {
    c.is_ascii_alphanumeric()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LexerErrorKind {
    NumberTooLarge,
    UnrecognizedCharacter(u8),
}

impl From<ParseIntError> for LexerErrorKind {
    fn from(err: ParseIntError) -> Self {
        match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Self::NumberTooLarge,
            _ => unimplemented!(),
        }
    }
}

impl Display for LexerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NumberTooLarge => write!(f, "the number literal is too large"),

            Self::UnrecognizedCharacter(c) => {
                write!(f, "encountered an unrecognized character '")?;

                if c.is_ascii_graphic() {
                    write!(f, "{}", *c as char)?;
                } else {
                    write!(f, "\\x{:02x}", c)?;
                }

                write!(f, "'")
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct PosLexerError {
    end: Position,
    kind: LexerErrorKind,
}

impl PosLexerError {
    fn with_start(self, start: Position) -> LexerError {
        LexerError {
            span: Span {
                start,
                end: self.end,
            },
            kind: self.kind,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LexerError {
    span: Span,
    kind: LexerErrorKind,
}

impl LexerError {
    pub fn kind(&self) -> LexerErrorKind {
        self.kind
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexical analysis failed: {}", self.kind)
    }
}

impl Error for LexerError {}

impl HasSpan for LexerError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}

#[derive(Debug, Clone)]
pub struct Lexer<'buf> {
    cursor: Cursor<'buf>,
    eof: bool,
}

impl<'buf> Lexer<'buf> {
    pub fn new(cursor: Cursor<'buf>) -> Self {
        Self { cursor, eof: false }
    }

    pub fn pos(&self) -> Position {
        self.cursor.pos()
    }

    fn create_error_at_pos(&self, kind: LexerErrorKind) -> PosLexerError {
        PosLexerError {
            end: self.cursor.pos(),
            kind,
        }
    }

    fn create_error_behind(&self, kind: LexerErrorKind) -> PosLexerError {
        PosLexerError {
            end: self.cursor.prev_pos(),
            kind,
        }
    }

    fn scan_int(&mut self) -> ScanResult<'buf> {
        let digits = self.cursor.consume_while(u8::is_ascii_digit);
        let value = std::str::from_utf8(digits)
            .unwrap()
            .parse::<i64>()
            .map_err(|e| self.create_error_behind(e.into()))?;

        Ok(TokenValue::Int(value))
    }

    fn scan_ident_or_keyword(&mut self) -> ScanResult<'buf> {
        let ident = self.cursor.consume_while(|&c| is_ident_continuation(c));

        Ok(Symbol::parse_exact(ident)
            .map(TokenValue::Symbol)
            .unwrap_or(TokenValue::Ident(ident)))
    }

    /// Consumes a whitespace run containing at least one line break.
    ///
    /// Blank lines thereby collapse into a single newline token.
    fn scan_newline(&mut self) -> ScanResult<'buf> {
        self.cursor
            .consume_while(|&c| is_line_break(c) || is_inline_whitespace(c));

        Ok(TokenValue::Newline)
    }

    fn skip_whitespace(&mut self) {
        self.cursor.consume_while(|&c| is_inline_whitespace(c));
    }
}

impl<'buf> Iterator for Lexer<'buf> {
    type Item = Result<Token<'buf>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }

        let mut start;

        let scan_result = loop {
            start = self.cursor.pos();

            break match self.cursor.peek() {
                None => {
                    self.eof = true;

                    return Some(Ok(Token {
                        value: TokenValue::Eof,
                        span: Span { start, end: start },
                    }));
                }

                Some(c) if is_line_break(c) => self.scan_newline(),

                Some(c) if is_inline_whitespace(c) => {
                    self.skip_whitespace();

                    continue;
                }

                Some(c) if c.is_ascii_digit() => self.scan_int(),

                Some(c) if is_ident_start(c) => self.scan_ident_or_keyword(),

                Some(c) => match Symbol::parse_prefix(self.cursor.remaining()) {
                    Some(sym) => {
                        self.cursor.consume_n(sym.as_slice().len());

                        Ok(TokenValue::Symbol(sym))
                    }

                    None => Err(self.create_error_at_pos(LexerErrorKind::UnrecognizedCharacter(c))),
                },
            };
        };

        Some(match scan_result {
            Ok(value) => Ok(Token {
                span: Span {
                    start,
                    end: self.cursor.prev_pos(),
                },
                value,
            }),

            Err(err) => {
                self.eof = true;

                Err(err.with_start(start))
            }
        })
    }
}

impl FusedIterator for Lexer<'_> {}
