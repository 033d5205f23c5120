//! Finds every assignment of a module body and the kind of definition each
//! one declares, without parsing any assignment body.

use std::{collections::HashMap, ops::Range};

use tracing::trace;

use crate::{
    token::{Token, TokenKind},
    util::NameCase,
};

use super::{Environment, ParameterKind, Symbol, SymbolKind};

/// The position of a single assignment within the token list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// Index of the name token
    pub start: usize,

    /// Index of the `::=` token
    pub assign: usize,

    /// Index one past the last token of the assignment body
    pub end: usize,

    pub name: Token<'a>,

    pub kind: SymbolKind,

    /// Token range of the dummy parameter list, including the braces
    pub parameters: Option<Range<usize>>,

    /// Token range of the governor
    pub governor: Option<Range<usize>>,
}

/// Every assignment header in a module body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<'a> {
    pub headers: Vec<Header<'a>>,

    /// Tokens before the first assignment that belong to no assignment
    pub stray: Option<Range<usize>>,
}

/// Scan the tokens of a module body, recording every assignment in the
/// environment.  Assignment boundaries are found from the `::=` tokens that
/// are not nested in any brackets: the name of each assignment is the first
/// identifier after the previous `::=` that can end the previous body and is
/// followed by a well formed header.  When the brackets of the body do not
/// balance, every `::=` is a candidate so that one broken assignment does not
/// hide the rest of the module.
pub fn collect<'a>(
    source: &str,
    tokens: &[Token<'a>],
    body: Range<usize>,
    env: &mut Environment,
) -> Collection<'a> {
    let (depth, balanced) = nesting(tokens, body.clone());
    let at_top = |i: usize| !balanced || depth[i - body.start] == 0;

    let assigns: Vec<usize> = body
        .clone()
        .filter(|&i| tokens[i].kind == TokenKind::Assignment && at_top(i))
        .collect();

    let mut headers: Vec<Header<'a>> = vec![];
    for (k, &assign) in assigns.iter().enumerate() {
        let region = if k == 0 { body.start } else { assigns[k - 1] + 1 };

        let found = (region..assign).find_map(|n| {
            let starts = if n == region {
                k == 0
            } else {
                ends_body(tokens[n - 1].kind)
            };
            if !starts || !at_top(n) || !is_name(tokens[n].kind) {
                return None;
            }
            header_shape(tokens, n, assign).map(|shape| (n, shape))
        });

        let Some((mut start, (parameters, mut governor))) = found else {
            continue;
        };

        // `oops Name ::=` where `Name` begins a line is the leftover of a
        // broken body followed by a header
        let leftover = match (&parameters, &governor) {
            (None, Some(range))
                if range.len() == 1
                    && is_name(tokens[range.start].kind)
                    && starts_line(source, tokens[range.start])
                    && !starts_line(source, tokens[start]) =>
            {
                Some(range.start)
            }
            _ => None,
        };
        if let Some(name) = leftover {
            start = name;
            governor = None;
        }

        if let Some(last) = headers.last_mut() {
            last.end = start;
        }
        headers.push(Header {
            start,
            assign,
            end: body.end,
            name: tokens[start],
            kind: SymbolKind::Type,
            parameters,
            governor,
        });
    }

    let stray = match headers.first() {
        Some(first) if first.start > body.start => Some(body.start..first.start),
        None if !body.is_empty() => Some(body.clone()),
        _ => None,
    };

    classify(tokens, &mut headers, env);

    Collection { headers, stray }
}

/// Bracket nesting depth before each token of the range, and whether every
/// bracket is closed.  `[[` and `]]` count as two brackets, as they may also
/// open or close two nested optional groups of a syntax list.
fn nesting(tokens: &[Token], range: Range<usize>) -> (Vec<usize>, bool) {
    let mut depth = 0usize;
    let mut balanced = true;

    let levels = tokens[range]
        .iter()
        .map(|tok| {
            let before = depth;
            let close = match tok.kind {
                TokenKind::LeftCurly | TokenKind::LeftParen | TokenKind::LeftSquare => {
                    depth += 1;
                    0
                }
                TokenKind::LeftVersionBrackets => {
                    depth += 2;
                    0
                }
                TokenKind::RightCurly | TokenKind::RightParen | TokenKind::RightSquare => 1,
                TokenKind::RightVersionBrackets => 2,
                _ => 0,
            };
            if close == 0 {
                return before;
            }

            balanced &= depth >= close;
            depth = depth.saturating_sub(close);
            depth
        })
        .collect();

    (levels, balanced && depth == 0)
}

/// Is the token the first one on its line
fn starts_line(source: &str, tok: Token) -> bool {
    source
        .get(..tok.offset)
        .unwrap_or("")
        .trim_end_matches(|c: char| c.is_whitespace() && c != '\n')
        .ends_with('\n')
}

fn is_name(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::TypeOrModuleRef | TokenKind::ValueRefOrIdent | TokenKind::ObjectClassRef
    )
}

/// Can an assignment body end with a token of this kind
fn ends_body(kind: TokenKind) -> bool {
    kind.is_string_type()
        || matches!(
            kind,
            TokenKind::TypeOrModuleRef
                | TokenKind::ValueRefOrIdent
                | TokenKind::ObjectClassRef
                | TokenKind::TypeField
                | TokenKind::ValueField
                | TokenKind::RightCurly
                | TokenKind::RightParen
                | TokenKind::Greater
                | TokenKind::XMLSingleTagEnd
                | TokenKind::Number
                | TokenKind::RealNumber
                | TokenKind::BString
                | TokenKind::HString
                | TokenKind::CString
                | TokenKind::KwBoolean
                | TokenKind::KwInteger
                | TokenKind::KwNull
                | TokenKind::KwReal
                | TokenKind::KwIdentifier
                | TokenKind::KwString
                | TokenKind::KwPdv
                | TokenKind::KwExternal
                | TokenKind::KwRelativeOid
                | TokenKind::KwRelativeOidIri
                | TokenKind::KwOidIri
                | TokenKind::KwTime
                | TokenKind::KwDate
                | TokenKind::KwTimeOfDay
                | TokenKind::KwDateTime
                | TokenKind::KwDuration
                | TokenKind::KwGeneralizedTime
                | TokenKind::KwUTCTime
                | TokenKind::KwObjectDescriptor
                | TokenKind::KwTypeIdentifier
                | TokenKind::KwAbstractSyntax
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwPlusInfinity
                | TokenKind::KwMinusInfinity
                | TokenKind::KwNotANumber
        )
}

/// Can a governor start with this token
fn starts_governor(tokens: &[Token], i: usize) -> bool {
    let kind = tokens[i].kind;
    kind.is_builtin_type_start()
        || matches!(
            kind,
            TokenKind::TypeOrModuleRef
                | TokenKind::ObjectClassRef
                | TokenKind::KwTypeIdentifier
                | TokenKind::KwAbstractSyntax
        )
        || (kind == TokenKind::ValueRefOrIdent
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Dot))
}

/// Token ranges of the parameter list and governor of a header
type Shape = (Option<Range<usize>>, Option<Range<usize>>);

/// Check the tokens between a name and `::=`: an optional dummy parameter
/// list followed by an optional governor.
fn header_shape(tokens: &[Token], name: usize, assign: usize) -> Option<Shape> {
    let mut i = name + 1;
    let mut parameters = None;

    if i < assign && tokens[i].kind == TokenKind::LeftCurly {
        let close = matching_curly(tokens, i, assign)?;
        parameters = Some(i..close + 1);
        i = close + 1;
    }

    if i == assign {
        Some((parameters, None))
    } else if starts_governor(tokens, i) {
        Some((parameters, Some(i..assign)))
    } else {
        None
    }
}

/// Index of the `}` closing the `{` at `open`, searching before `limit`
fn matching_curly(tokens: &[Token], open: usize, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().take(limit).skip(open) {
        match tok.kind {
            TokenKind::LeftCurly => depth += 1,
            TokenKind::RightCurly => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// If the range is a single reference, optionally with actual parameters,
/// return the reference token.
fn single_reference<'a>(tokens: &[Token<'a>], range: Range<usize>) -> Option<Token<'a>> {
    let first = *tokens.get(range.start)?;
    if !matches!(
        first.kind,
        TokenKind::TypeOrModuleRef
            | TokenKind::ObjectClassRef
            | TokenKind::KwTypeIdentifier
            | TokenKind::KwAbstractSyntax
    ) {
        return None;
    }

    let next = range.start + 1;
    if next == range.end
        || (tokens[next].kind == TokenKind::LeftCurly
            && matching_curly(tokens, next, range.end) == Some(range.end - 1))
    {
        Some(first)
    } else {
        None
    }
}

/// Decide the kind of every header.  Object classes are found first, as the
/// kind of every other assignment with a governor depends on them.
fn classify(tokens: &[Token], headers: &mut [Header], env: &mut Environment) {
    let local: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.name.value, i))
        .collect();

    let mut classes = vec![false; headers.len()];
    for (i, header) in headers.iter().enumerate() {
        if header.governor.is_some() {
            continue;
        }
        let body = header.assign + 1..header.end;
        classes[i] = match tokens.get(body.start).map(|t| t.kind) {
            Some(TokenKind::KwClass) => true,
            Some(TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax) => {
                body.len() == 1
            }
            _ => false,
        };
    }

    // a class defined as another class, possibly further down the module
    loop {
        let mut changed = false;
        for (i, header) in headers.iter().enumerate() {
            if classes[i] || header.governor.is_some() {
                continue;
            }
            if NameCase::of(header.name.value) != NameCase::Yell {
                continue;
            }
            let Some(target) = single_reference(tokens, header.assign + 1..header.end) else {
                continue;
            };
            let is_class = match local.get(target.value) {
                Some(&j) => classes[j],
                None => {
                    target.kind != TokenKind::TypeOrModuleRef
                        && (target.kind != TokenKind::ObjectClassRef || env.is_class(target.value))
                }
            };
            if is_class {
                classes[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let is_class_governor = |range: &Range<usize>| -> Option<bool> {
        let target = single_reference(tokens, range.clone())?;
        Some(match target.kind {
            TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax => true,
            _ => match local.get(target.value) {
                Some(&j) => classes[j],
                None => env.is_class(target.value),
            },
        })
    };

    let mut symbols = vec![];
    for (i, header) in headers.iter().enumerate() {
        let case = NameCase::of(header.name.value);
        let mut governor_name = None;

        let kind = match &header.governor {
            None if classes[i] => SymbolKind::ObjectClass,
            None if case == NameCase::Lower
                && tokens.get(header.assign + 1).map(|t| t.kind) == Some(TokenKind::Less) =>
            {
                SymbolKind::XmlValue
            }
            None => SymbolKind::Type,
            Some(governor) => {
                let class = is_class_governor(governor).unwrap_or(false);
                governor_name = single_reference(tokens, governor.clone()).map(|t| t.value.to_string());
                match (case, class) {
                    (NameCase::Lower, true) => SymbolKind::Object,
                    (NameCase::Lower, false) => SymbolKind::Value,
                    (_, true) => SymbolKind::ObjectSet,
                    (_, false) => SymbolKind::ValueSet,
                }
            }
        };

        let parameters = header
            .parameters
            .clone()
            .map(|range| parameter_kinds(tokens, range, &|name| {
                match local.get(name) {
                    Some(&j) => classes[j],
                    None => env.is_class(name),
                }
            }))
            .unwrap_or_default();

        trace!(name = header.name.value, ?kind, "collected symbol");
        symbols.push(Symbol {
            kind,
            parameters,
            governor: governor_name,
        });
    }

    for (header, symbol) in headers.iter_mut().zip(symbols) {
        header.kind = symbol.kind;
        env.define(header.name.value, symbol);
    }
}

/// Work out what each dummy reference of a parameter list stands for.  The
/// range includes the braces of the list.
fn parameter_kinds(
    tokens: &[Token],
    range: Range<usize>,
    is_class: &dyn Fn(&str) -> bool,
) -> Vec<(String, ParameterKind)> {
    let inner = range.start + 1..range.end.saturating_sub(1);
    let (depth, _) = nesting(tokens, inner.clone());

    // split the list into its comma separated items
    let mut items: Vec<Range<usize>> = vec![];
    let mut start = inner.start;
    for i in inner.clone() {
        if tokens[i].kind == TokenKind::Comma && depth[i - inner.start] == 0 {
            items.push(start..i);
            start = i + 1;
        }
    }
    items.push(start..inner.end);

    let mut parameters: Vec<(String, Option<Range<usize>>)> = vec![];
    for item in items {
        let colon = item
            .clone()
            .find(|&i| tokens[i].kind == TokenKind::Colon && depth[i - inner.start] == 0);
        match colon {
            Some(colon) if colon + 1 < item.end => {
                parameters.push((tokens[item.end - 1].value.to_string(), Some(item.start..colon)))
            }
            _ if !item.is_empty() => parameters.push((tokens[item.start].value.to_string(), None)),
            _ => {}
        }
    }

    let dummies: Vec<String> = parameters.iter().map(|(d, _)| d.clone()).collect();

    parameters
        .into_iter()
        .map(|(dummy, governor)| {
            let Some(governor) = governor else {
                return (dummy, ParameterKind::TypeOrClass);
            };

            let class = match single_reference(tokens, governor) {
                Some(tok) if dummies.iter().any(|d| d == tok.value) => {
                    tok.value.len() > 1 && NameCase::of(tok.value) == NameCase::Yell
                }
                Some(tok) => match tok.kind {
                    TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax => true,
                    _ => is_class(tok.value),
                },
                None => false,
            };

            let kind = match (NameCase::of(&dummy), class) {
                (NameCase::Lower, true) => ParameterKind::Object,
                (NameCase::Lower, false) => ParameterKind::Value,
                (_, true) => ParameterKind::ObjectSet,
                (_, false) => ParameterKind::ValueSet,
            };
            (dummy, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compiler::Features, lexer::Lexer};

    fn run(source: &str) -> (Vec<(String, SymbolKind)>, Option<Range<usize>>, Environment) {
        let tokens: Vec<Token> = Lexer::new(source, Features::default())
            .filter(|t| !t.kind.is_comment())
            .collect();
        let mut env = Environment::new("Test");
        let collection = collect(source, &tokens, 0..tokens.len(), &mut env);
        let headers = collection
            .headers
            .iter()
            .map(|h| (h.name.value.to_string(), h.kind))
            .collect();
        (headers, collection.stray, env)
    }

    #[test]
    fn assignment_kinds() {
        let (headers, stray, _) = run(r#"
            Foo-Type ::= INTEGER
            foo-value Foo-Type ::= 5
            TEST-CLASS ::= CLASS { &id INTEGER UNIQUE } WITH SYNTAX { ID &id }
            inst TEST-CLASS ::= { ID 5 }
            Insts TEST-CLASS ::= { inst, ... }
            Small Foo-Type ::= { 1 | 2 }
            OTHER ::= TEST-CLASS
            xml ::= <Foo-Type>5</Foo-Type>
            Open ::= TEST-CLASS.&id
        "#);

        assert_eq!(stray, None);
        assert_eq!(
            headers,
            vec![
                ("Foo-Type".to_string(), SymbolKind::Type),
                ("foo-value".to_string(), SymbolKind::Value),
                ("TEST-CLASS".to_string(), SymbolKind::ObjectClass),
                ("inst".to_string(), SymbolKind::Object),
                ("Insts".to_string(), SymbolKind::ObjectSet),
                ("Small".to_string(), SymbolKind::ValueSet),
                ("OTHER".to_string(), SymbolKind::ObjectClass),
                ("xml".to_string(), SymbolKind::XmlValue),
                ("Open".to_string(), SymbolKind::Type),
            ]
        );
    }

    #[test]
    fn class_aliases_are_resolved_forwards() {
        let (headers, _, _) = run(r#"
            obj ALIAS ::= { &id 1 }
            ALIAS ::= BASE
            BASE ::= CLASS { &id INTEGER }
            INT ::= INTEGER
            NOT-CLASS ::= INT
        "#);
        assert_eq!(headers[0].1, SymbolKind::Object);
        assert_eq!(headers[1].1, SymbolKind::ObjectClass);
        assert_eq!(headers[4].1, SymbolKind::Type);
    }

    #[test]
    fn bodies_with_nested_assignment_tokens() {
        let (headers, _, _) = run(r#"
            T ::= SEQUENCE { a INTEGER b BOOLEAN }
            U ::= INTEGER
            v T ::= { a 1, b TRUE }
            w INTEGER ::= v
            X ::= SEQUENCE OF Foo
            Y ::= [1] IMPLICIT U
        "#);
        let names: Vec<_> = headers.iter().map(|h| h.0.as_str()).collect();
        assert_eq!(names, ["T", "U", "v", "w", "X", "Y"]);
    }

    #[test]
    fn nested_optional_groups_closed_together() {
        let (headers, _, _) = run(r#"
            OP ::= CLASS { &code INTEGER, &Arg OPTIONAL, &Res OPTIONAL }
                WITH SYNTAX { CODE &code [ARGUMENT &Arg [RESULT &Res]] }
            T ::= INTEGER
            V ::= SEQUENCE { a INTEGER, ..., [[ b BOOLEAN ]] }
            W ::= NULL
        "#);
        let names: Vec<_> = headers.iter().map(|h| h.0.as_str()).collect();
        assert_eq!(names, ["OP", "T", "V", "W"]);
        assert_eq!(headers[0].1, SymbolKind::ObjectClass);
    }

    #[test]
    fn unclosed_brackets_do_not_hide_later_assignments() {
        let (headers, _, _) = run("
            T ::= SEQUENCE { a INTEGER
            U ::= BOOLEAN
            V ::= NULL
        ");
        let names: Vec<_> = headers.iter().map(|h| h.0.as_str()).collect();
        assert_eq!(names, ["T", "U", "V"]);
    }

    #[test]
    fn leftover_tokens_before_a_header_line() {
        let (headers, _, _) = run("
            T ::= INTEGER oops oops
            U ::= BOOLEAN
            v U ::= TRUE
        ");
        assert_eq!(
            headers,
            vec![
                ("T".to_string(), SymbolKind::Type),
                ("U".to_string(), SymbolKind::Type),
                ("v".to_string(), SymbolKind::Value),
            ]
        );
    }

    #[test]
    fn stray_tokens_before_first_assignment() {
        let (headers, stray, _) = run("junk 5 T ::= INTEGER");
        assert_eq!(headers.len(), 1);
        assert_eq!(stray, Some(0..2));
    }

    #[test]
    fn parameter_kinds_from_governors() {
        let (_, _, env) = run(r#"
            CLS ::= CLASS { &id INTEGER }
            P { Gov, Gov : val, INTEGER : Set, CLS : obj, CLS : Objs, CLASS-DUMMY, CLASS-DUMMY : o }
                ::= SEQUENCE { a Gov }
        "#);
        assert_eq!(
            env.parameters("P"),
            &[
                ("Gov".to_string(), ParameterKind::TypeOrClass),
                ("val".to_string(), ParameterKind::Value),
                ("Set".to_string(), ParameterKind::ValueSet),
                ("obj".to_string(), ParameterKind::Object),
                ("Objs".to_string(), ParameterKind::ObjectSet),
                ("CLASS-DUMMY".to_string(), ParameterKind::TypeOrClass),
                ("o".to_string(), ParameterKind::Object),
            ]
        );
    }

    #[test]
    fn imported_names_decide_governors() {
        let source = "x Imported-Type ::= 1 y IMPORTED ::= {}";
        let tokens: Vec<Token> = Lexer::new(source, Features::default()).collect();
        let mut env = Environment::new("Test");
        env.import("Imported-Type");
        env.import("IMPORTED");
        let collection = collect(source, &tokens, 0..tokens.len(), &mut env);
        assert_eq!(collection.headers[0].kind, SymbolKind::Value);
        assert_eq!(collection.headers[1].kind, SymbolKind::Object);
    }
}
