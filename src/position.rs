use std::borrow::Cow;
use std::fmt;

use crate::source::{Source, SourceFile, SourceId};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Position {
    pub src: Option<SourceId>,
    pub byte: usize,
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn with_source_id(src: SourceId) -> Self {
        Self {
            src: Some(src),
            ..Self::default()
        }
    }

    pub fn with_source_file(src_file: &SourceFile<'_>) -> Self {
        Self::with_source_id(src_file.id())
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            src: None,
            byte: 0,
            line: 1,
            col: 1,
        }
    }
}

/// A span between two positions, inclusive on the both ends.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn display<'a, 'buf>(&'a self, source: &'a Source<'buf>) -> SpanDisplay<'a, 'buf> {
        SpanDisplay { span: self, source }
    }
}

pub struct SpanDisplay<'a, 'buf> {
    span: &'a Span,
    source: &'a Source<'buf>,
}

impl fmt::Display for SpanDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = &self.span.start;

        if let Some(src_file) = start.src.and_then(|id| self.source.get(id)) {
            write!(f, "{}:", src_file.path().display())?;
        }

        write!(f, "{}:{}", start.line, start.col)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

pub trait HasSpan {
    fn span(&self) -> Cow<'_, Span>;
}

impl HasSpan for Span {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(self)
    }
}

impl<T> HasSpan for Spanned<T> {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}
