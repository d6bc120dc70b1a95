//! Errors produced while reading the grammar meta-language.

use std::{fmt::Display, io};

/// Types of errors that can happen while reading a grammar.
#[derive(Debug)]
pub enum ErrorKind {
    /// The input contained no rules at all
    EmptyGrammar,
    /// Some byte other than the expected construct was found
    Unexpected {
        /// What the reader was looking for
        expected: &'static str,
        /// The byte it found instead, [None] at end of line or input
        found: Option<u8>,
    },
    /// `<` without a matching `>` on the same line
    UnterminatedAngle,
    /// Opening quote without a matching closing quote on the same line
    UnterminatedQuote,
    /// Quote terminal with no characters; it would collide with ε
    EmptyQuote,
    /// `$` is the reserved end-of-input marker
    ReservedEndMarker,
    /// Regex terminal declaration with an empty pattern
    EmptyPattern,
    /// Quote terminals cannot be declared, only used
    QuoteOnLhs,
    /// A production with no symbols
    EmptyProduction,
    /// ε may only appear alone in a production
    EpsilonNotAlone,
    /// A regex terminal was used before (or without) its declaration
    UndefinedTerminal(String),
    /// A non-terminal was used without any defining rule
    UndefinedNonTerminal(String),
    /// Errors occurring because of I/O
    Io(io::Error),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Self::EmptyGrammar => "empty grammar",
            Self::Unexpected { expected, found } => {
                return match found {
                    Some(b) => write!(f, "expected {}, found `{}`", expected, *b as char),
                    None => write!(f, "expected {}, found end of line", expected),
                }
            }
            Self::UnterminatedAngle => "unterminated `<`",
            Self::UnterminatedQuote => "unterminated quote terminal",
            Self::EmptyQuote => "empty quote terminal",
            Self::ReservedEndMarker => "`$` is reserved for the end of input",
            Self::EmptyPattern => "regex terminal declared with an empty pattern",
            Self::QuoteOnLhs => "quote terminal on the left-hand side of a declaration",
            Self::EmptyProduction => "empty production",
            Self::EpsilonNotAlone => "EPSILON may only appear alone in a production",
            Self::UndefinedTerminal(name) => {
                return write!(f, "regex terminal `{}` has no declaration", name)
            }
            Self::UndefinedNonTerminal(name) => {
                return write!(f, "non-terminal `{}` has no defining rule", name)
            }
            Self::Io(e) => return write!(f, "i/o error occurred ({:?})", e),
        };

        write!(f, "{}", str)
    }
}

/// A reader error: what went wrong and the 1-based line it happened on.
#[derive(Debug)]
pub struct Error {
    /// The line the error was detected on
    pub line: usize,
    /// The type of error that occurred
    pub kind: ErrorKind,
}

impl Error {
    /// Construct a new `Error`
    pub fn new(line: usize, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {})", self.kind, self.line)
    }
}
