//! Error reporting for the tokenizer and parser.
//!
//! Both phases stop at the first error. A `Diagnostic` carries the byte
//! position of the offending input, a formatted message, and which phase
//! produced it so callers can distinguish lexical from syntactic failures.

use serde::Serialize;
use std::fmt;

/// Which phase produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticSource {
    Tokenizer,
    Parser,
}

/// A front-end error: byte position plus formatted message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Byte offset into the source where the error was detected.
    pub pos: u32,
    pub message: String,
    pub source: DiagnosticSource,
}

impl Diagnostic {
    pub fn tokenizer(pos: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            pos,
            message: message.into(),
            source: DiagnosticSource::Tokenizer,
        }
    }

    pub fn parser(pos: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            pos,
            message: message.into(),
            source: DiagnosticSource::Parser,
        }
    }

    pub fn is_token_error(&self) -> bool {
        self.source == DiagnosticSource::Tokenizer
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.pos)
    }
}

impl std::error::Error for Diagnostic {}
