use std::{collections::HashMap, str::CharIndices, sync::OnceLock};

use thiserror::Error;

use crate::{
    compiler::{Features, LineCommentEnd},
    token::{self, Token, TokenKind},
    util::{Peek, Peekable},
};

/// State for converting a source string into a token stream
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /// Iterator over all chars in the file
    chars: Peekable<CharIndices<'a>>,

    /// The original source text
    source: &'a str,

    /// Offset of the first character the iterator was created at
    start: usize,

    /// Enabled lexical extensions
    features: Features,
}

/// Invalid source text found while lexing.  The offset is the position of the
/// opening delimiter of the offending token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum LexerError {
    #[error("unrecognised character {character:?}")]
    Unrecognised { character: char, offset: usize },

    #[error("block comment is never terminated")]
    NonTerminatedComment { offset: usize },

    #[error("string literal is never terminated")]
    NonTerminatedString { offset: usize },

    #[error("invalid binary or hexadecimal string literal")]
    InvalidString { offset: usize, length: usize },
}

impl LexerError {
    /// Convert an error token into the error it describes
    pub fn from_token(tok: Token) -> Option<LexerError> {
        let offset = tok.offset;
        Some(match tok.kind {
            TokenKind::Unrecognised => LexerError::Unrecognised {
                character: tok.value.chars().next().unwrap_or('\0'),
                offset,
            },
            TokenKind::NonTerminatedComment => LexerError::NonTerminatedComment { offset },
            TokenKind::NonTerminatedString => LexerError::NonTerminatedString { offset },
            TokenKind::InvalidString => LexerError::InvalidString {
                offset,
                length: tok.value.len(),
            },
            _ => return None,
        })
    }

    /// The byte range of the opening delimiter of the token
    pub fn location(&self) -> std::ops::Range<usize> {
        match *self {
            LexerError::Unrecognised { character, offset } => {
                offset..offset + character.len_utf8()
            }
            LexerError::NonTerminatedComment { offset } => offset..offset + 2,
            LexerError::NonTerminatedString { offset } => offset..offset + 1,
            LexerError::InvalidString { offset, length } => offset..offset + length,
        }
    }
}

impl<'a> Lexer<'a> {
    /// Create a new Lexer for a given source file.
    pub fn new(source: &'a str, features: Features) -> Self {
        Self::new_at(source, 0, features)
    }

    /// Create a lexer that starts part way through a source file.  Used when
    /// the parser re-scans text after XML character data.
    pub fn new_at(source: &'a str, offset: usize, features: Features) -> Self {
        let offset = offset.min(source.len());
        Self {
            chars: source[offset..].char_indices().n_peekable(),
            source,
            start: offset,
            features,
        }
    }

    /// Peek the character `n` places ahead with its absolute offset
    fn peek_char(&mut self, n: usize) -> Option<(usize, char)> {
        let start = self.start;
        self.chars.peek(n).map(|&(o, c)| (o + start, c))
    }

    /// Skip whitespace, returning the next character, if any
    fn skip_whitespace(&mut self) -> Option<(usize, char)> {
        while let Some((_, c)) = self.peek_char(0) {
            if !self.is_whitespace(c) {
                break;
            }
            self.chars.next();
        }

        self.peek_char(0)
    }

    /// Consume `len` characters and make a token starting at `offset`
    fn token(&mut self, kind: TokenKind, offset: usize, chars: usize) -> Token<'a> {
        let mut end = offset;
        for _ in 0..chars {
            if let Some((o, c)) = self.peek_char(0) {
                end = o + c.len_utf8();
                self.chars.next();
            }
        }

        Token {
            kind,
            value: &self.source[offset..end],
            offset,
        }
    }

    /// Make a token that ends at the current position
    fn token_to_here(&mut self, kind: TokenKind, offset: usize) -> Token<'a> {
        let end = self.peek_char(0).map_or(self.source.len(), |(o, _)| o);
        Token {
            kind,
            value: &self.source[offset..end],
            offset,
        }
    }

    /// Lex a single token from the current position
    fn lex_token(&mut self, offset: usize, c: char) -> Token<'a> {
        let next = self.peek_char(1).map(|(_, c)| c);

        match c {
            '{' => self.token(TokenKind::LeftCurly, offset, 1),
            '}' => self.token(TokenKind::RightCurly, offset, 1),
            '>' => self.token(TokenKind::Greater, offset, 1),
            ',' => self.token(TokenKind::Comma, offset, 1),
            '(' => self.token(TokenKind::LeftParen, offset, 1),
            ')' => self.token(TokenKind::RightParen, offset, 1),
            ';' => self.token(TokenKind::SemiColon, offset, 1),
            '@' => self.token(TokenKind::At, offset, 1),
            '|' => self.token(TokenKind::Pipe, offset, 1),
            '!' => self.token(TokenKind::Exclamation, offset, 1),
            '^' => self.token(TokenKind::Caret, offset, 1),
            '<' if next == Some('/') => self.token(TokenKind::XMLEndTag, offset, 2),
            '<' => self.token(TokenKind::Less, offset, 1),
            '/' if next == Some('>') => self.token(TokenKind::XMLSingleTagEnd, offset, 2),
            '/' if next == Some('*') => self.multi_comment(offset),
            '[' if next == Some('[') => self.token(TokenKind::LeftVersionBrackets, offset, 2),
            '[' => self.token(TokenKind::LeftSquare, offset, 1),
            ']' if next == Some(']') => self.token(TokenKind::RightVersionBrackets, offset, 2),
            ']' => self.token(TokenKind::RightSquare, offset, 1),
            ':' if self.source[offset..].starts_with("::=") => {
                self.token(TokenKind::Assignment, offset, 3)
            }
            ':' => self.token(TokenKind::Colon, offset, 1),
            '.' if self.source[offset..].starts_with("...") => {
                self.token(TokenKind::Ellipsis, offset, 3)
            }
            '.' if next == Some('.') => self.token(TokenKind::Range, offset, 2),
            '.' => self.token(TokenKind::Dot, offset, 1),
            '-' | '\u{2011}' if matches!(next, Some('-' | '\u{2011}')) => {
                self.single_comment(offset)
            }
            '-' | '\u{2011}' => self.token(TokenKind::Hyphen, offset, 1),
            '\'' => self.binary_string(offset),
            '"' => self.character_string(offset),
            '&' if next.is_some_and(|c| self.is_identifier_start(c)) => {
                self.chars.next();
                let ident = self.identifier(offset + 1);
                let kind = if ident.value.starts_with(char::is_lowercase) {
                    TokenKind::ValueField
                } else {
                    TokenKind::TypeField
                };

                Token {
                    kind,
                    value: &self.source[offset..ident.end()],
                    offset,
                }
            }
            _ if c.is_ascii_digit() => self.number(offset),
            _ if self.is_identifier_start(c) => self.identifier(offset),
            _ => self.token(TokenKind::Unrecognised, offset, 1),
        }
    }

    /// Parse a single line comment.  Depending on the enabled features the
    /// comment either ends at the end of the line or at the next pair of
    /// hyphens, whichever comes first.  Non-breaking hyphens are also accepted
    /// instead of hyphens.
    fn single_comment(&mut self, offset: usize) -> Token<'a> {
        // the opening pair
        self.chars.next();
        self.chars.next();

        let hyphens_end = self.features.line_comments == LineCommentEnd::EndOfLineOrHyphens;

        while let Some((_, c)) = self.peek_char(0) {
            if is_newline(c) {
                break;
            }

            if hyphens_end && matches!(c, '-' | '\u{2011}') {
                if let Some((_, '-' | '\u{2011}')) = self.peek_char(1) {
                    self.chars.next();
                    self.chars.next();
                    break;
                }
            }

            self.chars.next();
        }

        self.token_to_here(TokenKind::SingleComment, offset)
    }

    /// Parse a multi line comment which is text between `/*` and `*/`.  The
    /// comment ends at the first `*/`, comments do not nest.
    fn multi_comment(&mut self, offset: usize) -> Token<'a> {
        self.chars.next();
        self.chars.next();

        while let Some((_, c)) = self.peek_char(0) {
            self.chars.next();

            if c == '*' && matches!(self.peek_char(0), Some((_, '/'))) {
                self.chars.next();
                return self.token_to_here(TokenKind::MultiComment, offset);
            }
        }

        self.token_to_here(TokenKind::NonTerminatedComment, offset)
    }

    /// Parse a quoted character string, `""` inside the string is an escaped
    /// quote character.
    fn character_string(&mut self, offset: usize) -> Token<'a> {
        self.chars.next();

        while let Some((_, c)) = self.peek_char(0) {
            self.chars.next();

            if c == '"' {
                if matches!(self.peek_char(0), Some((_, '"'))) {
                    self.chars.next();
                    continue;
                }
                return self.token_to_here(TokenKind::CString, offset);
            }
        }

        self.token_to_here(TokenKind::NonTerminatedString, offset)
    }

    /// Parse `'0101'B` or `'AF09'H`.  Whitespace is allowed between the
    /// digits of either form.
    fn binary_string(&mut self, offset: usize) -> Token<'a> {
        self.chars.next();

        let mut binary = true;
        let mut hex = true;
        loop {
            let Some((_, c)) = self.peek_char(0) else {
                return self.token_to_here(TokenKind::NonTerminatedString, offset);
            };
            self.chars.next();

            if c == '\'' {
                break;
            }

            if self.is_whitespace(c) {
                continue;
            }

            binary &= c == '0' || c == '1';
            hex &= c.is_ascii_hexdigit();
        }

        let kind = match self.peek_char(0) {
            Some((_, 'B')) if binary => TokenKind::BString,
            Some((_, 'H')) if hex => TokenKind::HString,
            Some((_, 'B' | 'H')) => TokenKind::InvalidString,
            _ => return self.token_to_here(TokenKind::InvalidString, offset),
        };
        self.chars.next();

        if self
            .peek_char(0)
            .is_some_and(|(_, c)| c.is_alphanumeric())
        {
            return self.token_to_here(TokenKind::InvalidString, offset);
        }

        self.token_to_here(kind, offset)
    }

    /// Parse an identifier.  Could be a type reference, identifier, value
    /// reference, module reference, object class reference or keyword.
    fn identifier(&mut self, offset: usize) -> Token<'a> {
        let mut contains_lower = false;
        let mut first = true;

        while let Some((_, c)) = self.peek_char(0) {
            if self.is_identifier_char(c) {
                contains_lower |= c.is_lowercase();
                self.chars.next();
                first = false;
                continue;
            }

            if !first && matches!(c, '-' | '\u{2011}') {
                if let Some((_, c)) = self.peek_char(1) {
                    if self.is_identifier_char(c) {
                        // does not check the hyphen as it does not count as
                        // lower or upper case
                        self.chars.next();
                        continue;
                    }
                }
            }

            break;
        }

        let value = self.token_to_here(TokenKind::Unrecognised, offset).value;
        let ident_kind = if value.starts_with(char::is_lowercase) {
            TokenKind::ValueRefOrIdent
        } else if contains_lower {
            TokenKind::TypeOrModuleRef
        } else {
            TokenKind::ObjectClassRef
        };

        let kind = keywords().get(value).copied().unwrap_or(ident_kind);

        Token {
            kind,
            value,
            offset,
        }
    }

    /// Parse a number `[0-9]+` or a real number with an optional fraction and
    /// exponent.  `1..2` is a range between two numbers, not a real.
    fn number(&mut self, offset: usize) -> Token<'a> {
        let mut kind = TokenKind::Number;
        self.digits();

        if let (Some((_, '.')), Some((_, c))) = (self.peek_char(0), self.peek_char(1)) {
            if c.is_ascii_digit() {
                kind = TokenKind::RealNumber;
                self.chars.next();
                self.digits();
            }
        }

        if let Some((_, 'e' | 'E')) = self.peek_char(0) {
            let sign = matches!(self.peek_char(1), Some((_, '-' | '+')));
            let digit = self.peek_char(1 + usize::from(sign));
            if digit.is_some_and(|(_, c)| c.is_ascii_digit()) {
                kind = TokenKind::RealNumber;
                self.chars.next();
                if sign {
                    self.chars.next();
                }
                self.digits();
            }
        }

        self.token_to_here(kind, offset)
    }

    /// Skip over ascii digits
    fn digits(&mut self) {
        while let Some((_, c)) = self.peek_char(0) {
            if !c.is_ascii_digit() {
                break;
            }
            self.chars.next();
        }
    }

    /// Can an identifier begin with this character
    fn is_identifier_start(&self, c: char) -> bool {
        if self.features.unicode_identifiers {
            c.is_alphabetic()
        } else {
            c.is_ascii_alphabetic()
        }
    }

    /// Can an identifier contain this character (hyphens are dealt with separately)
    fn is_identifier_char(&self, c: char) -> bool {
        if self.features.unicode_identifiers {
            c.is_alphanumeric()
        } else {
            c.is_ascii_alphanumeric()
        }
    }

    /// Is the character any valid whitespace
    fn is_whitespace(&self, c: char) -> bool {
        if self.features.unicode_whitespace {
            c.is_whitespace() || c == '\u{A0}'
        } else {
            // A0 = Non breaking space
            "\t \u{A0}".contains(c) || is_newline(c)
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, c) = self.skip_whitespace()?;
        Some(self.lex_token(offset, c))
    }
}

/// Is the character a valid newline character
fn is_newline(c: char) -> bool {
    // 0B = Vertical Tab
    // 0C = Form Feed
    "\n\x0B\x0C\r".contains(c)
}

/// Get a mapping from keyword strings to their token kind
fn keywords() -> &'static HashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| HashMap::from(token::KEYWORD_DATA))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, Features::default())
            .map(|t| t.kind)
            .collect()
    }

    fn values(source: &str) -> Vec<&str> {
        Lexer::new(source, Features::default())
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_identifier_classes() {
        assert_eq!(
            kinds("Foo-Type foo-value TEST-CLASS T &Type &id INTEGER"),
            vec![
                TokenKind::TypeOrModuleRef,
                TokenKind::ValueRefOrIdent,
                TokenKind::ObjectClassRef,
                TokenKind::ObjectClassRef,
                TokenKind::TypeField,
                TokenKind::ValueField,
                TokenKind::KwInteger,
            ]
        );
    }

    #[test]
    fn test_keywords_take_priority() {
        assert_eq!(
            kinds("TYPE-IDENTIFIER UTF8String Integer"),
            vec![
                TokenKind::KwTypeIdentifier,
                TokenKind::KwUTF8String,
                TokenKind::TypeOrModuleRef
            ]
        );
    }

    #[test]
    fn test_identifier_hyphens() {
        assert_eq!(values("a-b c- d--x"), vec!["a-b", "c", "-", "d", "--x"]);
    }

    #[test]
    fn test_compound_punctuation() {
        assert_eq!(
            kinds("::= : .. ... . [[ ]] [ ] </ /> < >"),
            vec![
                TokenKind::Assignment,
                TokenKind::Colon,
                TokenKind::Range,
                TokenKind::Ellipsis,
                TokenKind::Dot,
                TokenKind::LeftVersionBrackets,
                TokenKind::RightVersionBrackets,
                TokenKind::LeftSquare,
                TokenKind::RightSquare,
                TokenKind::XMLEndTag,
                TokenKind::XMLSingleTagEnd,
                TokenKind::Less,
                TokenKind::Greater,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1..10 3.14 2e10 1.5E-3 7"),
            vec![
                TokenKind::Number,
                TokenKind::Range,
                TokenKind::Number,
                TokenKind::RealNumber,
                TokenKind::RealNumber,
                TokenKind::RealNumber,
                TokenKind::Number,
            ]
        );
        assert_eq!(values("1.5E-3"), vec!["1.5E-3"]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#"'0101'B 'DEAD BEEF'H "a ""quoted"" word" '012'B 'AB'"#),
            vec![
                TokenKind::BString,
                TokenKind::HString,
                TokenKind::CString,
                TokenKind::InvalidString,
                TokenKind::InvalidString,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_reported_at_opening() {
        let toks: Vec<_> = Lexer::new("a \"never closed", Features::default()).collect();
        assert_eq!(toks[1].kind, TokenKind::NonTerminatedString);
        assert_eq!(toks[1].offset, 2);
    }

    #[test]
    fn test_line_comment_end_of_line() {
        assert_eq!(
            kinds("a -- comment -- b\nc"),
            vec![
                TokenKind::ValueRefOrIdent,
                TokenKind::SingleComment,
                TokenKind::ValueRefOrIdent,
            ]
        );
    }

    #[test]
    fn test_line_comment_hyphens() {
        let features = Features {
            line_comments: LineCommentEnd::EndOfLineOrHyphens,
            ..Features::default()
        };
        let kinds: Vec<_> = Lexer::new("a -- comment -- b\nc", features)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::ValueRefOrIdent,
                TokenKind::SingleComment,
                TokenKind::ValueRefOrIdent,
                TokenKind::ValueRefOrIdent,
            ]
        );
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        assert_eq!(
            values("/* a /* b */ c */"),
            vec!["/* a /* b */", "c", "*", "/"]
        );
        assert_eq!(kinds("/* open"), vec![TokenKind::NonTerminatedComment]);
    }

    #[test]
    fn test_unrecognised() {
        let toks: Vec<_> = Lexer::new("a # b", Features::default()).collect();
        assert_eq!(toks[1].kind, TokenKind::Unrecognised);
        assert_eq!(
            LexerError::from_token(toks[1]),
            Some(LexerError::Unrecognised {
                character: '#',
                offset: 2
            })
        );
    }

    #[test]
    fn test_new_at() {
        let source = "<a>text 'here</a>";
        let toks: Vec<_> = Lexer::new_at(source, 13, Features::default())
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            toks,
            vec![
                TokenKind::XMLEndTag,
                TokenKind::ValueRefOrIdent,
                TokenKind::Greater
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        let features = Features {
            unicode_identifiers: true,
            ..Features::default()
        };
        let toks: Vec<_> = Lexer::new("größe Änderung", features)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            toks,
            vec![TokenKind::ValueRefOrIdent, TokenKind::TypeOrModuleRef]
        );

        let toks: Vec<_> = Lexer::new("größe", Features::default())
            .map(|t| t.kind)
            .collect();
        assert_eq!(toks[0], TokenKind::ValueRefOrIdent);
        assert_eq!(toks[1], TokenKind::Unrecognised);
    }
}
