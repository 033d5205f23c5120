use std::ops::Range;

use thiserror::Error;

use crate::{
    diagnostic::{Diagnostic, DiagnosticKind},
    lexer::LexerError,
    token::TokenKind,
};

/// Any error that can be emitted by the parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    /// None of the accepted tokens was found
    #[error("expected {}, found {found}", describe(.expected, .what))]
    Expected {
        expected: Vec<TokenKind>,
        what: Option<&'static str>,
        got: TokenKind,
        found: String,
        span: Range<usize>,
    },

    /// Recursion depth limit reached in the parser (try to avoid stack overflow)
    #[error("nesting depth limit exceeded")]
    ParserDepthExceeded { offset: usize },

    /// An error token was found
    #[error(transparent)]
    LexerError(#[from] LexerError),

    /// A name with the wrong case for the definition it is used in
    #[error("{message}")]
    Disambiguation { message: String, span: Range<usize> },

    /// An object that does not follow the syntax of its class
    #[error("object does not match the syntax of class `{class}`, found {found}")]
    SyntaxMatch {
        class: String,
        expected: Vec<String>,
        found: String,
        span: Range<usize>,
    },

    /// A structural rule that is not about a single token
    #[error("{message}")]
    Structure { message: String, span: Range<usize> },
}

pub type Result<T = (), E = ParserError> = std::result::Result<T, E>;

/// Describe the accepted tokens of an error
fn describe(expected: &[TokenKind], what: &Option<&str>) -> String {
    let mut items: Vec<String> = what.iter().map(|w| w.to_string()).collect();
    items.extend(expected.iter().map(|k| k.to_string()));

    match items.as_slice() {
        [] => "something else".to_string(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{} or {last}", rest.join(", ")),
    }
}

impl ParserError {
    /// Byte range the error should be reported at
    pub fn span(&self) -> Range<usize> {
        match self {
            ParserError::Expected { span, .. }
            | ParserError::Disambiguation { span, .. }
            | ParserError::SyntaxMatch { span, .. }
            | ParserError::Structure { span, .. } => span.clone(),
            ParserError::ParserDepthExceeded { offset } => *offset..*offset,
            ParserError::LexerError(err) => err.location(),
        }
    }

    /// Convert the error into a user facing diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (kind, expected) = match self {
            ParserError::Expected { expected, what, .. } => (
                DiagnosticKind::Structural,
                what.iter()
                    .map(|w| w.to_string())
                    .chain(expected.iter().map(|k| k.to_string()))
                    .collect(),
            ),
            ParserError::ParserDepthExceeded { .. } => (DiagnosticKind::DepthExceeded, vec![]),
            ParserError::LexerError(_) => (DiagnosticKind::Lexical, vec![]),
            ParserError::Disambiguation { .. } => (DiagnosticKind::Disambiguation, vec![]),
            ParserError::SyntaxMatch { expected, .. } => {
                (DiagnosticKind::SyntaxMatch, expected.clone())
            }
            ParserError::Structure { .. } => (DiagnosticKind::Structural, vec![]),
        };

        Diagnostic::error(kind)
            .name(self.to_string())
            .at(self.span())
            .expected(expected)
    }
}
