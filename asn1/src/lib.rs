//! Parser for ASN.1 module definitions, covering X.680 (basic notation),
//! X.681 (information objects), X.682 (constraints) and X.683
//! (parameterization).
//!
//! ```
//! let (ast, diagnostics) = asn1::parse("M DEFINITIONS ::= BEGIN T ::= INTEGER END");
//! assert!(diagnostics.is_empty());
//! assert_eq!(ast.modules[0].assignments[0].name, "T");
//! ```

#![forbid(unsafe_code)]

mod analysis;
pub mod ast;
mod compiler;
mod diagnostic;
mod lexer;
mod parser;
mod token;
mod util;

pub use compiler::{parse, parse_with, AsnCompiler, Features, LineCommentEnd, SourceId};
pub use diagnostic::{Diagnostic, DiagnosticKind, Label, Level, Position};
pub use lexer::{Lexer, LexerError};
pub use token::{Token, TokenKind};
