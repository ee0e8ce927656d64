use std::error::Error;
use std::fmt::{self, Display};

use crate::position::{HasSpan, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Fatal,
    Error,
    Warn,
    Info,
}

#[derive(Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub span: Option<Span>,
    pub message: String,
    pub source: Option<Box<dyn Error + 'static>>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

pub trait SpannedError: Error + HasSpan {}

impl<T: Error + HasSpan> SpannedError for T {}

#[must_use = "DiagnosticBuilder is useless unless emitted"]
pub struct DiagnosticBuilder<'a, 'e> {
    owner: &'a mut Diagnostics<'e>,
    level: Level,
    span: Option<Span>,
    message: Option<String>,
    source: Option<Box<dyn Error + 'static>>,
}

impl<'a, 'e> DiagnosticBuilder<'a, 'e> {
    fn new(owner: &'a mut Diagnostics<'e>, level: Level) -> Self {
        Self {
            owner,
            level,
            span: None,
            message: None,
            source: None,
        }
    }

    pub fn with_span(self, span: Span) -> Self {
        Self {
            span: Some(span),
            ..self
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    pub fn with_source(self, source: Box<dyn Error + 'static>) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    /// Uses the `error` to fill in the following details of the diagnostic
    /// to be emitted:
    /// - the span (unless already set)
    /// - the message (unless already set)
    /// - the source
    pub fn with_span_and_error(mut self, error: impl SpannedError + 'static) -> Self {
        self.span = self.span.or_else(|| Some(error.span().into_owned()));
        self.message = self.message.or_else(|| Some(format!("{}", error)));
        self.source = Some(Box::new(error));

        self
    }

    /// Emits the diagnostic.
    ///
    /// Panics if the message is not set.
    pub fn emit(self) {
        let diagnostic = Diagnostic {
            level: self.level,
            span: self.span,
            message: self.message.expect("message must be set"),
            source: self.source,
        };

        self.owner.emit(diagnostic);
    }
}

fn null_emitter(_: &Diagnostic) {}

pub struct Diagnostics<'e> {
    diagnostics: Vec<Diagnostic>,
    emitter: Box<dyn FnMut(&Diagnostic) + 'e>,
    has_errors: bool,
}

impl<'e> Diagnostics<'e> {
    pub fn new() -> Self {
        Self {
            diagnostics: vec![],
            emitter: Box::new(null_emitter),
            has_errors: false,
        }
    }

    pub fn set_emitter(&mut self, emitter: Box<dyn FnMut(&Diagnostic) + 'e>) {
        self.emitter = emitter;
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn with_level(&mut self, level: Level) -> DiagnosticBuilder<'_, 'e> {
        DiagnosticBuilder::new(self, level)
    }

    pub fn fatal(&mut self) -> DiagnosticBuilder<'_, 'e> {
        self.with_level(Level::Fatal)
    }

    pub fn error(&mut self) -> DiagnosticBuilder<'_, 'e> {
        self.with_level(Level::Error)
    }

    pub fn warn(&mut self) -> DiagnosticBuilder<'_, 'e> {
        self.with_level(Level::Warn)
    }

    pub fn info(&mut self) -> DiagnosticBuilder<'_, 'e> {
        self.with_level(Level::Info)
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        self.has_errors = self.has_errors || diagnostic.level <= Level::Error;
        (self.emitter)(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Default for Diagnostics<'_> {
    fn default() -> Self {
        Self::new()
    }
}
