//! `WITH SYNTAX` lists of object classes, and objects written in that syntax

use std::collections::HashMap;

use crate::{
    ast::{
        DefinedSyntaxToken, Literal, Object, ObjectClassDefn, Setting, TokenOrGroupSpec, Type,
    },
    parser::{describe_token, Parser, ParserError, Result},
    token::{Token, TokenKind},
};

/// A syntax list with its optional group brackets not yet matched up
#[derive(Debug, Clone)]
enum SyntaxEntry<'a> {
    Open(Token<'a>),
    Close(Token<'a>),
    Item(TokenOrGroupSpec),
}

/// Progress through an object written in the syntax of a class
struct SyntaxMatch<'s> {
    class: &'s str,
    defn: &'s ObjectClassDefn,

    /// Every literal of the syntax, a field setting stops at any of them
    literals: Vec<&'s Literal>,

    tokens: Vec<DefinedSyntaxToken>,

    /// Type settings so far, for fields whose type is given by another field
    types: HashMap<String, Type>,

    /// Descriptions of the optional groups skipped since the last match
    pending: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Parse the braced syntax list of a class
    /// ```bnf
    /// SyntaxList ::= "{" TokenOrGroupSpec+ "}"
    /// TokenOrGroupSpec ::= RequiredToken | "[" TokenOrGroupSpec+ "]"
    /// RequiredToken ::= Literal | PrimitiveFieldName
    /// ```
    pub(super) fn syntax_list(&mut self) -> Result<Vec<TokenOrGroupSpec>> {
        let open = self.next(&[TokenKind::LeftCurly])?;

        let mut entries = vec![];
        loop {
            let tok = self.peek(&[])?;
            match tok.kind {
                TokenKind::RightCurly => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => return Err(self.unexpected(&[TokenKind::RightCurly], None)),
                TokenKind::LeftSquare => entries.push(SyntaxEntry::Open(tok)),
                TokenKind::LeftVersionBrackets => {
                    entries.push(SyntaxEntry::Open(tok));
                    entries.push(SyntaxEntry::Open(tok));
                }
                TokenKind::RightSquare => entries.push(SyntaxEntry::Close(tok)),
                TokenKind::RightVersionBrackets => {
                    entries.push(SyntaxEntry::Close(tok));
                    entries.push(SyntaxEntry::Close(tok));
                }
                TokenKind::TypeField | TokenKind::ValueField => {
                    entries.push(SyntaxEntry::Item(TokenOrGroupSpec::Field(
                        tok.value.to_string(),
                    )))
                }
                TokenKind::Comma => {
                    entries.push(SyntaxEntry::Item(TokenOrGroupSpec::Literal(Literal::Comma)))
                }
                kind if kind.is_syntax_word() => entries.push(SyntaxEntry::Item(
                    TokenOrGroupSpec::Literal(Literal::Word(tok.value.to_string())),
                )),
                _ => {
                    return Err(ParserError::Structure {
                        message: format!(
                            "{} cannot be used in a syntax list",
                            describe_token(tok)
                        ),
                        span: tok.offset..tok.end(),
                    })
                }
            }
            self.bump();
        }

        if entries.is_empty() {
            return Err(ParserError::Structure {
                message: "syntax list is empty".to_string(),
                span: open.offset..open.end(),
            });
        }

        self.syntax_group(&mut entries.into_iter(), None)
    }

    /// Build the items of a syntax list up to the close of the group opened
    /// by `open`
    fn syntax_group(
        &mut self,
        entries: &mut std::vec::IntoIter<SyntaxEntry<'a>>,
        open: Option<Token<'a>>,
    ) -> Result<Vec<TokenOrGroupSpec>> {
        self.nested(|p| {
            let mut items = vec![];

            while let Some(entry) = entries.next() {
                match entry {
                    SyntaxEntry::Item(item) => items.push(item),
                    SyntaxEntry::Open(tok) => {
                        items.push(TokenOrGroupSpec::Group(p.syntax_group(entries, Some(tok))?))
                    }
                    SyntaxEntry::Close(tok) => {
                        let Some(open) = open else {
                            return Err(ParserError::Structure {
                                message: "`]` does not close an optional group".to_string(),
                                span: tok.offset..tok.end(),
                            });
                        };
                        if items.is_empty() {
                            return Err(ParserError::Structure {
                                message: "optional group is empty".to_string(),
                                span: open.offset..tok.end(),
                            });
                        }
                        return Ok(items);
                    }
                }
            }

            match open {
                Some(open) => Err(ParserError::Structure {
                    message: "optional group is not closed".to_string(),
                    span: open.offset..open.end(),
                }),
                None => Ok(items),
            }
        })
    }

    /// Parse a braced object by matching its tokens against the syntax list
    /// of its class.  Optional groups are skipped when their first item does
    /// not match.
    pub(super) fn defined_syntax(
        &mut self,
        defn: &ObjectClassDefn,
        syntax: &[TokenOrGroupSpec],
        class: &str,
    ) -> Result<Object> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut state = SyntaxMatch {
            class,
            defn,
            literals: vec![],
            tokens: vec![],
            types: HashMap::new(),
            pending: vec![],
        };
        collect_literals(syntax, &mut state.literals);

        self.match_items(syntax, false, &mut state)?;

        if !self.at(TokenKind::RightCurly) {
            let mut expected = state.pending.clone();
            expected.push("`}`".to_string());
            return Err(self.syntax_mismatch(&state, expected));
        }
        self.bump();

        Ok(Object::DefinedSyntax(state.tokens))
    }

    /// Match a list of syntax items, returns false when an optional group was
    /// skipped
    fn match_items(
        &mut self,
        items: &[TokenOrGroupSpec],
        optional: bool,
        state: &mut SyntaxMatch,
    ) -> Result<bool> {
        self.nested(|p| {
            for (i, item) in items.iter().enumerate() {
                match item {
                    TokenOrGroupSpec::Literal(literal) => {
                        if p.literal_matches(literal) {
                            p.bump();
                            state.tokens.push(DefinedSyntaxToken::Literal(literal.clone()));
                            state.pending.clear();
                        } else if optional && i == 0 {
                            state.pending.push(describe_literal(literal));
                            return Ok(false);
                        } else {
                            let mut expected = state.pending.clone();
                            expected.push(describe_literal(literal));
                            return Err(p.syntax_mismatch(state, expected));
                        }
                    }
                    TokenOrGroupSpec::Field(field) => {
                        if p.at_syntax_stop(state) {
                            let description = format!("a setting for `{field}`");
                            if optional && i == 0 {
                                state.pending.push(description);
                                return Ok(false);
                            }
                            let mut expected = state.pending.clone();
                            expected.push(description);
                            return Err(p.syntax_mismatch(state, expected));
                        }

                        let setting = match state.defn.field(field) {
                            Some(spec) => p.setting(spec, &state.types)?,
                            None => p.guess_setting(Some(field))?,
                        };
                        if let Setting::Type(ty) = &setting {
                            state.types.insert(field.clone(), ty.clone());
                        }
                        state.tokens.push(DefinedSyntaxToken::Setting {
                            field: Some(field.clone()),
                            setting,
                        });
                        state.pending.clear();
                    }
                    TokenOrGroupSpec::Group(group) => {
                        p.match_items(group, true, state)?;
                    }
                }
            }

            Ok(true)
        })
    }

    fn literal_matches(&self, literal: &Literal) -> bool {
        let tok = self.token(0);
        match literal {
            Literal::Comma => tok.kind == TokenKind::Comma,
            Literal::Word(word) => tok.kind.is_syntax_word() && tok.value == word,
        }
    }

    /// Is the current token the end of the object or one of the literals of
    /// the syntax, so cannot start a setting
    fn at_syntax_stop(&self, state: &SyntaxMatch) -> bool {
        matches!(self.kind(0), TokenKind::RightCurly | TokenKind::Eof)
            || state.literals.iter().any(|l| self.literal_matches(l))
    }

    fn syntax_mismatch(&self, state: &SyntaxMatch, expected: Vec<String>) -> ParserError {
        let tok = self.token(0);
        ParserError::SyntaxMatch {
            class: state.class.to_string(),
            expected,
            found: describe_token(tok),
            span: tok.offset..tok.end(),
        }
    }
}

fn collect_literals<'s>(items: &'s [TokenOrGroupSpec], literals: &mut Vec<&'s Literal>) {
    for item in items {
        match item {
            TokenOrGroupSpec::Literal(literal) => literals.push(literal),
            TokenOrGroupSpec::Group(group) => collect_literals(group, literals),
            TokenOrGroupSpec::Field(_) => {}
        }
    }
}

fn describe_literal(literal: &Literal) -> String {
    match literal {
        Literal::Word(word) => format!("`{word}`"),
        Literal::Comma => "`,`".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    const CLASS: &str = "OPERATION ::= CLASS {
        &ArgumentType OPTIONAL,
        &ResultType OPTIONAL,
        &code INTEGER UNIQUE
    } WITH SYNTAX {
        [ARGUMENT &ArgumentType]
        [RESULT &ResultType]
        CODE &code
    }";

    fn parse_body(body: &str) -> (Asn1, Vec<crate::diagnostic::Diagnostic>) {
        parse(&format!("M DEFINITIONS ::= BEGIN {CLASS} {body} END"))
    }

    fn word(w: &str) -> DefinedSyntaxToken {
        DefinedSyntaxToken::Literal(Literal::Word(w.into()))
    }

    #[test]
    fn syntax_list_groups() {
        let (ast, diagnostics) = parse_body("");
        assert_eq!(diagnostics, vec![]);
        let AssignmentKind::ObjectClass(ObjectClass::Definition(defn)) =
            &ast.modules[0].assignments[0].kind
        else {
            panic!("not a class");
        };
        assert_eq!(
            defn.syntax,
            Some(vec![
                TokenOrGroupSpec::Group(vec![
                    TokenOrGroupSpec::Literal(Literal::Word("ARGUMENT".into())),
                    TokenOrGroupSpec::Field("&ArgumentType".into()),
                ]),
                TokenOrGroupSpec::Group(vec![
                    TokenOrGroupSpec::Literal(Literal::Word("RESULT".into())),
                    TokenOrGroupSpec::Field("&ResultType".into()),
                ]),
                TokenOrGroupSpec::Literal(Literal::Word("CODE".into())),
                TokenOrGroupSpec::Field("&code".into()),
            ])
        );
    }

    #[test]
    fn optional_groups_are_skipped() {
        let (ast, diagnostics) = parse_body("op OPERATION ::= { RESULT BOOLEAN CODE 7 }");
        assert_eq!(diagnostics, vec![]);
        let AssignmentKind::Object { object, .. } = &ast.modules[0].assignments[1].kind else {
            panic!("not an object");
        };
        assert_eq!(
            object,
            &Object::DefinedSyntax(vec![
                word("RESULT"),
                DefinedSyntaxToken::Setting {
                    field: Some("&ResultType".into()),
                    setting: Setting::Type(Type::new(TypeKind::Boolean)),
                },
                word("CODE"),
                DefinedSyntaxToken::Setting {
                    field: Some("&code".into()),
                    setting: Setting::Value(Value::Integer(7)),
                },
            ])
        );
        assert_eq!(object.setting("&ArgumentType"), None);
    }

    #[test]
    fn missing_required_literal() {
        let (_, diagnostics) = parse_body("op OPERATION ::= { ARGUMENT INTEGER 7 }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SyntaxMatch);
        assert_eq!(diagnostics[0].expected, vec!["`RESULT`", "`CODE`"]);
    }

    #[test]
    fn trailing_tokens_after_syntax() {
        let (_, diagnostics) = parse_body("op OPERATION ::= { CODE 7 EXTRA }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SyntaxMatch);
        assert_eq!(diagnostics[0].expected, vec!["`}`"]);
    }

    #[test]
    fn unbalanced_syntax_lists() {
        let (_, diagnostics) =
            parse("M DEFINITIONS ::= BEGIN CLS ::= CLASS { &a INTEGER } WITH SYNTAX { [A &a } END");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Structural);

        let (_, diagnostics) =
            parse("M DEFINITIONS ::= BEGIN CLS ::= CLASS { &a INTEGER } WITH SYNTAX { A &a ] } END");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn version_brackets_are_nested_groups() {
        let (ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            CLS ::= CLASS { &a INTEGER OPTIONAL } WITH SYNTAX { [[A] &a] }
            END",
        );
        assert_eq!(diagnostics, vec![]);
        let AssignmentKind::ObjectClass(ObjectClass::Definition(defn)) =
            &ast.modules[0].assignments[0].kind
        else {
            panic!("not a class");
        };
        assert_eq!(
            defn.syntax,
            Some(vec![TokenOrGroupSpec::Group(vec![
                TokenOrGroupSpec::Group(vec![TokenOrGroupSpec::Literal(Literal::Word(
                    "A".into()
                ))]),
                TokenOrGroupSpec::Field("&a".into()),
            ])])
        );
    }
}
