use owo_colors::{OwoColorize, Stream};

use sufc::errors::{Diagnostic, Level};
use sufc::source::Source;
use sufc::util::slice_formatter;

fn level_tag(level: Level) -> String {
    match level {
        Level::Fatal => "fatal"
            .if_supports_color(Stream::Stderr, |tag| tag.red())
            .to_string(),

        Level::Error => "error"
            .if_supports_color(Stream::Stderr, |tag| tag.bright_red())
            .to_string(),

        Level::Warn => "warning"
            .if_supports_color(Stream::Stderr, |tag| tag.yellow())
            .to_string(),

        Level::Info => "info"
            .if_supports_color(Stream::Stderr, |tag| tag.bright_cyan())
            .to_string(),
    }
}

/// Prints `path:line:col level: message` and, when the diagnostic carries
/// a span into a loaded file, quotes the offending line with a caret
/// under the reported column.
pub fn print_diagnostic(src: &Source<'_>, diagnostic: &Diagnostic) {
    let tag = level_tag(diagnostic.level);

    let Some(span) = &diagnostic.span else {
        eprintln!("{}: {}", tag, diagnostic.message);
        return;
    };

    eprintln!("{} {}: {}", span.display(src), tag, diagnostic.message);

    let line = span
        .start
        .src
        .and_then(|id| src.get(id))
        .and_then(|file| file.line(span.start.line));

    if let Some(line) = line {
        eprintln!("    {}", slice_formatter(line));
        eprintln!("    {}^", " ".repeat(span.start.col.saturating_sub(1)));
    }
}
