//! CLI support for pseudo-lang
//!
//! Provides programmatic access to the run/check functionality for
//! embedding in other tools.

mod run;

pub use run::{RunOptions, RunOutcome, execute_run};

use std::io;

use crate::ast::Span;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Lexer or parser diagnostic
    Parse(crate::ParseError),
    /// Runtime exception
    Runtime(crate::RuntimeError),
    /// IO error
    Io(io::Error),
    /// No program provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Runtime(e) => write!(f, "Runtime error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No program provided. Pass a file, use --eval, or pipe source to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::RuntimeError> for CliError {
    fn from(e: crate::RuntimeError) -> Self {
        CliError::Runtime(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Renders an error the way the binary reports it: the diagnostic message
/// plus the literal source slice its span covers, when there is one.
///
/// Slicing is checked: a span that lands inside a multibyte character (the
/// lexer reports single-byte spans) falls back to the message-only form
/// instead of panicking.
pub fn render_error(source: &str, err: &CliError) -> String {
    let span = match err {
        CliError::Parse(e) => Some(e.span()),
        CliError::Runtime(e) => Some(e.span()),
        CliError::Io(_) | CliError::NoInput => None,
    };
    let slice = match span {
        Some(Span { start, end }) if start < end => source.get(start..end),
        _ => None,
    };
    match slice {
        Some(slice) => format!("error: {}\n  --> {}", err, slice),
        None => format!("error: {}", err),
    }
}
