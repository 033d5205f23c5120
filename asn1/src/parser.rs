mod assignment;
mod constraint;
mod error;
mod module;
mod parameterized;
mod reference;
mod type_or_value;
mod xml_value;

use std::collections::HashMap;

use tracing::debug;

use crate::{
    analysis::{Environment, ParameterKind},
    ast::{Asn1, ObjectClass, Type},
    compiler::Features,
    diagnostic::{Diagnostic, Label},
    lexer::{Lexer, LexerError},
    token::{Token, TokenKind},
};

pub use self::error::{ParserError, Result};

/// Parser for ASN.1 definition files
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    /// The whole source text
    source: &'a str,

    /// Every token of the source except comments
    tokens: Vec<Token<'a>>,

    /// Index of the next token to consume
    pos: usize,

    /// Tokens from this index onwards read as end of input, used to confine
    /// the parser to a single assignment
    limit: usize,

    /// Token kinds tested against the current token since the last one was
    /// consumed, reported if no alternative matches
    expected: Vec<TokenKind>,

    /// Current recursion depth of the parser.
    depth: usize,

    features: Features,

    /// Symbols of the module being parsed
    env: Environment,

    /// Dummy references of the parameterized assignment being parsed
    dummies: HashMap<String, ParameterKind>,

    /// Parsed type and value set assignments, used to decide the notation of
    /// values
    types: HashMap<String, Type>,

    /// Parsed object class assignments, used to parse objects
    classes: HashMap<String, ObjectClass>,

    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a source text
    pub fn new(source: &'a str, features: Features) -> Self {
        let tokens = tokenize(source, features);
        let limit = tokens.len();

        Self {
            source,
            tokens,
            pos: 0,
            limit,
            expected: vec![],
            depth: 0,
            features,
            env: Environment::default(),
            dummies: HashMap::new(),
            types: HashMap::new(),
            classes: HashMap::new(),
            diagnostics: vec![],
        }
    }

    /// Run the parser to produce a set of ASN.1 definitions and every problem
    /// found on the way
    pub fn run(mut self) -> (Asn1, Vec<Diagnostic>) {
        let mut asn1 = Asn1::default();

        while self.pos < self.tokens.len() {
            let start = self.pos;
            match self.module_definition() {
                Ok(module) => asn1.modules.push(module),
                Err(err) => {
                    // skip the rest of the broken module
                    let end = self.tokens[self.pos.max(start)..]
                        .iter()
                        .position(|t| t.kind == TokenKind::KwEnd)
                        .map_or(self.tokens.len(), |i| self.pos.max(start) + i + 1);
                    self.report(&err, end);
                    self.pos = end;
                }
            }
            self.limit = self.tokens.len();
            self.depth = 0;
        }

        (asn1, self.diagnostics)
    }

    /// Record an error, with a label covering the tokens skipped up to `end`
    fn report(&mut self, err: &ParserError, end: usize) {
        let span = err.span();
        let mut diag = err.to_diagnostic();

        let skipped_end = end
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(span.end, |t| t.end());
        if skipped_end > span.start {
            diag = diag.label(
                Label::new()
                    .message("tokens skipped up to here")
                    .loc(span.start..skipped_end),
            );
        }

        debug!(error = %err, skipped_to = skipped_end, "recovering from error");
        self.diagnostics.push(diag);
    }

    /// The token `n` places after the current one, reading end of input past
    /// the limit
    fn token(&self, n: usize) -> Token<'a> {
        let index = self.pos + n;
        if index < self.limit {
            self.tokens[index]
        } else {
            let offset = self
                .tokens
                .get(self.limit)
                .map_or(self.source.len(), |t| t.offset);
            Token {
                kind: TokenKind::Eof,
                value: "",
                offset,
            }
        }
    }

    /// Kind of the token `n` places ahead, without recording it as expected
    fn kind(&self, n: usize) -> TokenKind {
        self.token(n).kind
    }

    /// Is the current token of the given kind.  The kind is recorded so it
    /// is reported if the parser cannot continue at this token.
    fn at(&mut self, kind: TokenKind) -> bool {
        if !self.expected.contains(&kind) {
            self.expected.push(kind);
        }
        self.kind(0) == kind
    }

    /// Consume the current token if it is of the given kind
    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consume the current token, whatever it is
    fn bump(&mut self) -> Token<'a> {
        let tok = self.token(0);
        if self.pos < self.limit {
            self.pos += 1;
        }
        self.expected.clear();
        tok
    }

    /// Consume a token of the given kind or return an error.  If an empty list
    /// is given, returns any token.
    fn next(&mut self, kind: &[TokenKind]) -> Result<Token<'a>> {
        self.peek(kind)?;
        Ok(self.bump())
    }

    /// Peek a token without consuming it or return an error if the token is not
    /// of one of the provided kinds. If an empty list is given, returns any token.
    fn peek(&mut self, kind: &[TokenKind]) -> Result<Token<'a>> {
        let tok = self.token(0);

        if tok.kind.is_error() {
            return Err(self.unexpected(&[], None));
        }

        if kind.is_empty() || kind.contains(&tok.kind) {
            Ok(tok)
        } else {
            Err(self.unexpected(kind, None))
        }
    }

    /// Create the error for a token that no alternative accepts
    fn unexpected(&self, kind: &[TokenKind], what: Option<&'static str>) -> ParserError {
        let tok = self.token(0);

        if let Some(err) = LexerError::from_token(tok) {
            return ParserError::LexerError(err);
        }

        let mut expected = self.expected.clone();
        for k in kind {
            if !expected.contains(k) {
                expected.push(*k);
            }
        }

        ParserError::Expected {
            expected,
            what,
            got: tok.kind,
            found: describe_token(tok),
            span: tok.offset..tok.end(),
        }
    }

    /// Error for a token that cannot start the named construct
    fn expected_item(&self, what: &'static str) -> ParserError {
        self.unexpected(&[], Some(what))
    }

    /// Run a parse function one nesting level deeper, failing when the
    /// configured maximum depth would be exceeded
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.features.max_depth {
            return Err(ParserError::ParserDepthExceeded {
                offset: self.token(0).offset,
            });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Try a parse function, rewinding to the current token if it fails
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Option<T> {
        let pos = self.pos;
        let expected = self.expected.clone();
        let depth = self.depth;

        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = pos;
                self.expected = expected;
                self.depth = depth;
                None
            }
        }
    }

    /// Source text between two token indices, inclusive of both tokens
    fn text_between(&self, first: usize, last: usize) -> &'a str {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(a), Some(b)) if b.end() >= a.offset => &self.source[a.offset..b.end()],
            _ => "",
        }
    }

    /// Byte range from the start of a token to the end of the last consumed one
    fn span_from(&self, first: usize) -> std::ops::Range<usize> {
        let start = self.tokens.get(first).map_or(self.source.len(), |t| t.offset);
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(start, |t| t.end());
        start..end.max(start)
    }
}

/// Lex a source text, dropping comments.  XML character data and the
/// instructions of encoding control sections are not ASN.1 tokens, so they
/// are stepped over here and read from the source by their own parsers.
fn tokenize(source: &str, features: Features) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token> = vec![];
    let mut lexer = Lexer::new(source, features);

    while let Some(tok) = lexer.next() {
        if tok.kind.is_comment() {
            continue;
        }

        let skip_to = match (tokens.last().map(|t| t.kind), tok.kind) {
            (Some(TokenKind::Assignment), TokenKind::Less) => xml_element_end(source, tok.offset),
            (
                Some(TokenKind::KwEncodingControl),
                TokenKind::TypeOrModuleRef | TokenKind::ObjectClassRef,
            ) => Some(encoding_instructions_end(source, tok.end())),
            _ => None,
        };
        tokens.push(tok);

        let Some(end) = skip_to else {
            continue;
        };

        // keep the closing `>` so the assignment still ends with a token
        if tok.kind == TokenKind::Less && end > tok.end() {
            tokens.push(Token {
                kind: TokenKind::Greater,
                value: &source[end - 1..end],
                offset: end - 1,
            });
        }
        lexer = Lexer::new_at(source, end, features);
    }

    tokens
}

/// Byte offset just past the XML element whose start tag begins at `start`,
/// found by matching tags without looking at the text between them.  `None`
/// if the tags are not well formed.
fn xml_element_end(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut offset = start;

    loop {
        let open = offset + source.get(offset..)?.find('<')?;
        let close = open + source[open..].find('>')?;
        let tag = &source[open + 1..close];

        let name = if let Some(name) = tag.strip_prefix('/') {
            depth = depth.checked_sub(1)?;
            name
        } else if let Some(name) = tag.strip_suffix('/') {
            name
        } else {
            depth += 1;
            tag
        };

        let name = name.trim_end();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return None;
        }

        offset = close + 1;
        if depth == 0 {
            return Some(offset);
        }
    }
}

/// Offset of the `END` or `ENCODING-CONTROL` after the instructions of an
/// encoding control section
fn encoding_instructions_end(source: &str, from: usize) -> usize {
    let rest = source.get(from..).unwrap_or("");
    let is_name_char = |c: char| c.is_alphanumeric() || c == '-';

    rest.char_indices()
        .map(|(i, _)| i)
        .filter(|&i| !rest[..i].ends_with(is_name_char))
        .find(|&i| {
            ["END", "ENCODING-CONTROL"].iter().any(|word| {
                rest[i..].starts_with(word) && !rest[i + word.len()..].starts_with(is_name_char)
            })
        })
        .map_or(source.len(), |i| from + i)
}

/// Text describing a token for error messages
fn describe_token(tok: Token) -> String {
    match tok.kind {
        TokenKind::Eof => tok.kind.to_string(),
        kind if kind.is_keyword() => kind.to_string(),
        TokenKind::TypeOrModuleRef
        | TokenKind::ValueRefOrIdent
        | TokenKind::ObjectClassRef
        | TokenKind::TypeField
        | TokenKind::ValueField
        | TokenKind::Number
        | TokenKind::RealNumber
        | TokenKind::BString
        | TokenKind::HString
        | TokenKind::CString => format!("{} `{}`", tok.kind, tok.value),
        kind => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Features;

    #[test]
    fn expected_set_accumulates_until_consumed() {
        let mut parser = Parser::new("a b", Features::default());
        assert!(!parser.at(TokenKind::Comma));
        assert!(parser.eat(TokenKind::RightCurly).is_none());

        let err = parser.next(&[TokenKind::Number]).unwrap_err();
        let ParserError::Expected { expected, got, .. } = err else {
            panic!("wrong error {err:?}");
        };
        assert_eq!(
            expected,
            vec![TokenKind::Comma, TokenKind::RightCurly, TokenKind::Number]
        );
        assert_eq!(got, TokenKind::ValueRefOrIdent);

        parser.bump();
        assert!(parser.expected.is_empty());
        assert_eq!(parser.token(0).value, "b");
    }

    #[test]
    fn limit_reads_as_end_of_input() {
        let mut parser = Parser::new("a b c", Features::default());
        parser.limit = 2;
        parser.bump();
        parser.bump();
        assert_eq!(parser.kind(0), TokenKind::Eof);
        assert_eq!(parser.token(0).offset, 4);
        parser.bump();
        assert_eq!(parser.pos, 2);
    }

    #[test]
    fn depth_guard() {
        let mut parser = Parser::new("a", Features {
            max_depth: 3,
            ..Default::default()
        });

        fn recurse(p: &mut Parser) -> Result<usize> {
            p.nested(|p| recurse(p).map(|d| d + 1))
        }

        let err = recurse(&mut parser).unwrap_err();
        assert!(matches!(err, ParserError::ParserDepthExceeded { offset: 0 }));
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn attempt_rewinds() {
        let mut parser = Parser::new("a b", Features::default());
        let result = parser.attempt(|p| {
            p.bump();
            p.next(&[TokenKind::Number])
        });
        assert!(result.is_none());
        assert_eq!(parser.pos, 0);
    }

    #[test]
    fn lexer_errors_surface_on_peek() {
        let mut parser = Parser::new("\"abc", Features::default());
        let err = parser.peek(&[]).unwrap_err();
        assert!(matches!(
            err,
            ParserError::LexerError(LexerError::NonTerminatedString { offset: 0 })
        ));
    }
}
