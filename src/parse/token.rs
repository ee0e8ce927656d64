use std::borrow::Cow;
use std::fmt;

use itertools::Itertools;
use once_cell::sync::OnceCell;
use phf::phf_map;

use crate::position::{HasSpan, Span};
use crate::util::slice_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'buf> {
    pub span: Span,
    pub value: TokenValue<'buf>,
}

impl<'buf> Token<'buf> {
    pub fn ty(&self) -> TokenType {
        self.value.ty()
    }
}

impl HasSpan for Token<'_> {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenValue<'buf> {
    Int(i64),
    Ident(&'buf [u8]),
    Symbol(Symbol),
    Newline,
    Eof,
}

impl<'buf> TokenValue<'buf> {
    pub fn ty(&self) -> TokenType {
        match *self {
            Self::Int(_) => TokenType::Int,
            Self::Ident(_) => TokenType::Ident,
            Self::Symbol(sym) => TokenType::Symbol(sym),
            Self::Newline => TokenType::Newline,
            Self::Eof => TokenType::Eof,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Int,
    Ident,
    Symbol(Symbol),
    Newline,
    Eof,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "an integer literal"),
            Self::Ident => write!(f, "an identifier"),
            Self::Symbol(sym) => write!(f, "`{}`", slice_formatter(sym.as_slice())),
            Self::Newline => write!(f, "a line break"),
            Self::Eof => write!(f, "end of file"),
        }
    }
}

macro_rules! symbols {
    ($( $lit:literal => $variant:ident ),+,) => { symbols!($( $lit => $variant ),+); };

    ($( $lit:literal => $variant:ident ),+) => {
        #[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
        pub enum Symbol {
            $( $variant ),+
        }

        const fn max_arr<const N: usize>(values: [usize; N]) -> usize {
            const fn max_arr_impl<const N: usize>(acc: usize, idx: usize, values: [usize; N]) -> usize {
                if idx >= N {
                    acc
                } else {
                    let x = values[idx];

                    max_arr_impl(if x > acc { x } else { acc }, idx + 1, values)
                }
            }

            max_arr_impl(0, 0, values)
        }

        impl Symbol {
            const SYMBOLS: phf::Map<&'static [u8], Symbol> = phf_map! {
                $( $lit => Self::$variant ),+
            };

            const MAX_LENGTH: usize = max_arr([$( $lit.len() ),+]);

            fn get_prefix_lengths() -> &'static [usize] {
                static PREFIX_LENGTHS: OnceCell<Vec<usize>> = OnceCell::new();

                PREFIX_LENGTHS.get_or_init(|| {
                    let mut lengths = [$( $lit.len() ),+];
                    lengths.sort_unstable();
                    lengths.into_iter().rev().dedup().collect()
                })
            }

            /// Tries to parse the beginning of `input` as a symbol,
            /// preferring the longest match.
            pub fn parse_prefix(input: &[u8]) -> Option<Symbol> {
                let len = Self::MAX_LENGTH.min(input.len());

                Self::get_prefix_lengths()
                    .iter()
                    .filter_map(|&prefix_len| input.get(0..prefix_len.min(len)))
                    .find_map(|prefix| Self::SYMBOLS.get(prefix))
                    .copied()
            }

            /// Tries to parse the whole of `input` as a symbol.
            pub fn parse_exact(input: &[u8]) -> Option<Symbol> {
                Self::SYMBOLS.get(input).copied()
            }

            pub fn as_slice(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $lit, )+
                }
            }
        }
    };
}

symbols! {
    // keywords
    b"class" => Class,
    b"else" => Else,
    b"fields" => Fields,
    b"if" => If,
    b"ifonly" => IfOnly,
    b"locals" => Locals,
    b"method" => Method,
    b"print" => Print,
    b"return" => Return,
    b"this" => This,
    b"while" => While,
    b"with" => With,

    // operators
    b"+" => Plus,
    b"-" => Minus,
    b"*" => Asterisk,
    b"/" => Slash,
    b"<" => Less,
    b">" => Greater,
    b"==" => EqualsEquals,
    b"!=" => BangEquals,

    // punctuation
    b"(" => ParenLeft,
    b")" => ParenRight,
    b"{" => BraceLeft,
    b"}" => BraceRight,
    b"[" => BracketLeft,
    b"]" => BracketRight,
    b":" => Colon,
    b"," => Comma,
    b"." => Dot,
    b"=" => Equals,
    b"!" => Bang,
    b"@" => At,
    b"^" => Caret,
    b"&" => Ampersand,
    b"_" => Underscore,
}
