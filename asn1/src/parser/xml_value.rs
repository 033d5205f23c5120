//! XML value notation.  Character data between tags does not follow the
//! ASN.1 token rules, so this part of the parser walks the source text
//! directly and only lexes the tags.

use crate::{
    ast::{SpecialReal, XmlOidArc, XmlTypedValue, XmlValue},
    lexer::{Lexer, LexerError},
    token::{Token, TokenKind},
};

use super::{describe_token, Parser, ParserError, Result};

/// Read position in the source while parsing XML
#[derive(Debug, Clone, Copy)]
struct XmlCursor {
    offset: usize,

    /// Start of the first token after the assignment
    end: usize,
}

impl<'a> Parser<'a> {
    /// Parse `<Type>value</Type>` or `<Type/>` after the `::=` of an XML
    /// value assignment
    pub(super) fn xml_typed_value(&mut self) -> Result<XmlTypedValue> {
        let mut cursor = XmlCursor {
            offset: self.token(0).offset,
            end: self
                .tokens
                .get(self.limit)
                .map_or(self.source.len(), |tok| tok.offset),
        };

        let value = self.xml_element(&mut cursor)?;

        // carry on with the first token after the element
        self.pos = self
            .tokens
            .partition_point(|tok| tok.offset < cursor.offset)
            .clamp(self.pos, self.limit);
        self.expected.clear();

        Ok(value)
    }

    fn xml_element(&mut self, cursor: &mut XmlCursor) -> Result<XmlTypedValue> {
        self.nested(|p| {
            p.xml_next(cursor, &[TokenKind::Less])?;
            let name = p.xml_name(cursor)?;

            let tok = p.xml_next(cursor, &[TokenKind::Greater, TokenKind::XMLSingleTagEnd])?;
            if tok.kind == TokenKind::XMLSingleTagEnd {
                return Ok(XmlTypedValue {
                    name: name.to_string(),
                    value: None,
                });
            }

            let value = p.xml_content(name, cursor)?;

            p.xml_next(cursor, &[TokenKind::XMLEndTag])?;
            let close_start = cursor.offset;
            let close = p.xml_name(cursor)?;
            if close != name {
                return Err(ParserError::Structure {
                    message: format!("expected closing tag `</{name}>`, found `</{close}>`"),
                    span: close_start..cursor.offset,
                });
            }
            p.xml_next(cursor, &[TokenKind::Greater])?;

            Ok(XmlTypedValue {
                name: name.to_string(),
                value: Some(value),
            })
        })
    }

    /// Everything between a start tag and its end tag
    fn xml_content(&mut self, name: &str, cursor: &mut XmlCursor) -> Result<XmlValue> {
        if self.xml_at_child(cursor) {
            let mut children = vec![];
            while self.xml_at_child(cursor) {
                children.push(self.xml_element(cursor)?);
            }

            return Ok(special_element(&children).unwrap_or(XmlValue::Elements(children)));
        }

        let rest = self.xml_rest(cursor);
        let text = &rest[..rest.find('<').unwrap_or(rest.len())];
        let start = cursor.offset;

        if let Some(index) = text.find('&') {
            return Err(ParserError::Structure {
                message: "`&` is not allowed in XML character data".to_string(),
                span: start + index..start + index + 1,
            });
        }

        cursor.offset += text.len();
        Ok(xml_text(name, text))
    }

    /// Does a start tag follow, ignoring whitespace
    fn xml_at_child(&self, cursor: &XmlCursor) -> bool {
        let rest = self.xml_rest(cursor).trim_start();
        rest.starts_with('<') && !rest.starts_with("</")
    }

    /// Read an element name directly after `<` or `</`
    fn xml_name(&self, cursor: &mut XmlCursor) -> Result<&'a str> {
        let rest = self.xml_rest(cursor);
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
            .unwrap_or(rest.len());

        if len == 0 {
            let tok = self.xml_token(cursor)?;
            return Err(xml_unexpected(tok, &[], Some("an element name")));
        }

        cursor.offset += len;
        Ok(&rest[..len])
    }

    /// Source text from the cursor to the end of the assignment
    fn xml_rest(&self, cursor: &XmlCursor) -> &'a str {
        self.source.get(cursor.offset..cursor.end).unwrap_or("")
    }

    /// Lex the next token at the cursor, reading end of input after the
    /// assignment
    fn xml_token(&self, cursor: &XmlCursor) -> Result<Token<'a>> {
        let tok = Lexer::new_at(self.source, cursor.offset, self.features)
            .find(|tok| !tok.kind.is_comment());

        match tok {
            Some(tok) if tok.offset < cursor.end => match LexerError::from_token(tok) {
                Some(err) => Err(err.into()),
                None => Ok(tok),
            },
            _ => Ok(Token {
                kind: TokenKind::Eof,
                value: "",
                offset: cursor.end,
            }),
        }
    }

    /// Consume a token of one of the given kinds
    fn xml_next(&self, cursor: &mut XmlCursor, kind: &[TokenKind]) -> Result<Token<'a>> {
        let tok = self.xml_token(cursor)?;
        if !kind.contains(&tok.kind) {
            return Err(xml_unexpected(tok, kind, None));
        }

        cursor.offset = tok.end();
        Ok(tok)
    }
}

fn xml_unexpected(tok: Token, kind: &[TokenKind], what: Option<&'static str>) -> ParserError {
    ParserError::Expected {
        expected: kind.to_vec(),
        what,
        got: tok.kind,
        found: describe_token(tok),
        span: tok.offset..tok.end(),
    }
}

/// Boolean and special real values written as a single empty element
fn special_element(children: &[XmlTypedValue]) -> Option<XmlValue> {
    let [XmlTypedValue { name, value: None }] = children else {
        return None;
    };

    match name.as_str() {
        "true" => Some(XmlValue::Boolean(true)),
        "false" => Some(XmlValue::Boolean(false)),
        "PLUS-INFINITY" => Some(XmlValue::SpecialReal(SpecialReal::PlusInfinity)),
        "MINUS-INFINITY" => Some(XmlValue::SpecialReal(SpecialReal::MinusInfinity)),
        "NOT-A-NUMBER" => Some(XmlValue::SpecialReal(SpecialReal::NotANumber)),
        _ => None,
    }
}

/// Classify character data, keeping anything unrecognised as text.  The
/// content of builtin string and time types is always text.
fn xml_text(name: &str, text: &str) -> XmlValue {
    if is_text_element(name) {
        return XmlValue::Text(text.to_string());
    }

    let trimmed = text.trim();

    match trimmed {
        "true" => return XmlValue::Boolean(true),
        "false" => return XmlValue::Boolean(false),
        "INF" => return XmlValue::SpecialReal(SpecialReal::PlusInfinity),
        "-INF" => return XmlValue::SpecialReal(SpecialReal::MinusInfinity),
        "NaN" => return XmlValue::SpecialReal(SpecialReal::NotANumber),
        _ => {}
    }

    if is_digits(trimmed.strip_prefix('-').unwrap_or(trimmed)) {
        // too large for `i128`, keep the digits
        return trimmed
            .parse()
            .map_or_else(|_| XmlValue::Text(text.to_string()), XmlValue::Integer);
    }

    if is_real(trimmed) {
        return XmlValue::Real(trimmed.to_string());
    }

    if let Some(arcs) = oid_arcs(trimmed) {
        return XmlValue::ObjectIdentifier(arcs);
    }

    if let Some(iri) = trimmed.strip_prefix('/') {
        if !iri.is_empty() && !iri.contains(char::is_whitespace) {
            return XmlValue::Iri(iri.split('/').map(str::to_string).collect());
        }
    }

    XmlValue::Text(text.to_string())
}

/// Element names of the builtin types whose values are written as plain
/// character data
fn is_text_element(name: &str) -> bool {
    matches!(
        name,
        "BIT_STRING"
            | "OCTET_STRING"
            | "CHARACTER_STRING"
            | "BMPString"
            | "GeneralString"
            | "GraphicString"
            | "IA5String"
            | "ISO646String"
            | "NumericString"
            | "PrintableString"
            | "TeletexString"
            | "T61String"
            | "UniversalString"
            | "UTF8String"
            | "VideotexString"
            | "VisibleString"
            | "GeneralizedTime"
            | "UTCTime"
            | "ObjectDescriptor"
            | "TIME"
            | "DATE"
            | "TIME-OF-DAY"
            | "DATE-TIME"
            | "DURATION"
    )
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// `-1.5`, `2e10`, `1.0E-3`
fn is_real(text: &str) -> bool {
    let text = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (text, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    if !is_digits(whole) || (fraction.is_none() && exponent.is_none()) {
        return false;
    }

    fraction.map_or(true, |f| f.is_empty() || is_digits(f))
        && exponent.map_or(true, |e| is_digits(e.strip_prefix(['+', '-']).unwrap_or(e)))
}

/// Dotted object identifier arcs, at least one of them numbered
fn oid_arcs(text: &str) -> Option<Vec<XmlOidArc>> {
    let arcs = text.split('.').map(oid_arc).collect::<Option<Vec<_>>>()?;

    if arcs.len() < 2 || arcs.iter().all(|arc| arc.number.is_none()) {
        return None;
    }
    Some(arcs)
}

/// `2`, `iso` or `iso(1)`
fn oid_arc(arc: &str) -> Option<XmlOidArc> {
    if is_digits(arc) {
        return Some(XmlOidArc {
            name: None,
            number: Some(arc.to_string()),
        });
    }

    let (name, number) = match arc.split_once('(') {
        Some((name, rest)) => {
            let number = rest.strip_suffix(')')?;
            if !is_digits(number) {
                return None;
            }
            (name, Some(number.to_string()))
        }
        None => (arc, None),
    };

    is_identifier(name).then(|| XmlOidArc {
        name: Some(name.to_string()),
        number,
    })
}

/// A lower case ASN.1 identifier
fn is_identifier(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.ends_with('-')
        && !name.contains("--")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    fn xml_value(body: &str) -> XmlTypedValue {
        let (mut ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
        assert_eq!(diagnostics, vec![], "{body}");
        let assignment = ast.modules.remove(0).assignments.remove(0);
        let AssignmentKind::XmlValue(value) = assignment.kind else {
            panic!("not an XML value");
        };
        value
    }

    fn arc(name: Option<&str>, number: Option<&str>) -> XmlOidArc {
        XmlOidArc {
            name: name.map(str::to_string),
            number: number.map(str::to_string),
        }
    }

    #[rstest]
    #[case("<T>true</T>", XmlValue::Boolean(true))]
    #[case("<T><false/></T>", XmlValue::Boolean(false))]
    #[case("<T> -42 </T>", XmlValue::Integer(-42))]
    #[case("<T>1.5e-3</T>", XmlValue::Real("1.5e-3".into()))]
    #[case("<T>-INF</T>", XmlValue::SpecialReal(SpecialReal::MinusInfinity))]
    #[case("<T><NOT-A-NUMBER/></T>", XmlValue::SpecialReal(SpecialReal::NotANumber))]
    #[case("<T>/ISO/Registration_Authority</T>", XmlValue::Iri(vec!["ISO".into(), "Registration_Authority".into()]))]
    #[case("<T>hello, world</T>", XmlValue::Text("hello, world".into()))]
    #[case("<T></T>", XmlValue::Text("".into()))]
    fn simple_xml_values(#[case] text: &str, #[case] expected: XmlValue) {
        let value = xml_value(&format!("v ::= {text}"));
        assert_eq!(value.name, "T");
        assert_eq!(value.value, Some(expected));
    }

    #[rstest]
    #[case("<BIT_STRING>0011</BIT_STRING>", "0011")]
    #[case("<UTF8String>007</UTF8String>", "007")]
    #[case("<NumericString>1234567890123456789012345678901234567890</NumericString>", "1234567890123456789012345678901234567890")]
    #[case("<T>1234567890123456789012345678901234567890</T>", "1234567890123456789012345678901234567890")]
    fn digits_that_are_not_integers_stay_text(#[case] text: &str, #[case] expected: &str) {
        let value = xml_value(&format!("v ::= {text}"));
        assert_eq!(value.value, Some(XmlValue::Text(expected.into())));
    }

    #[rstest]
    #[case("<T>it's</T>", "it's")]
    #[case("<T>say \"hi</T>", "say \"hi")]
    #[case("<T>END</T>", "END")]
    #[case("<T>a -- b</T>", "a -- b")]
    #[case("<T>x ::= y</T>", "x ::= y")]
    fn free_text_is_not_asn1(#[case] text: &str, #[case] expected: &str) {
        let (ast, diagnostics) = parse(&format!(
            "M DEFINITIONS ::= BEGIN\nv ::= {text}\nw ::= <T>x</T>\nU ::= INTEGER\nEND"
        ));
        assert_eq!(diagnostics, vec![], "{text}");

        let assignments = &ast.modules[0].assignments;
        let names: Vec<_> = assignments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["v", "w", "U"]);
        let AssignmentKind::XmlValue(value) = &assignments[0].kind else {
            panic!("not an XML value");
        };
        assert_eq!(value.value, Some(XmlValue::Text(expected.into())));
    }

    #[test]
    fn object_identifiers() {
        let value = xml_value("v ::= <OBJECT_IDENTIFIER>iso(1).member-body.840</OBJECT_IDENTIFIER>");
        assert_eq!(
            value.value,
            Some(XmlValue::ObjectIdentifier(vec![
                arc(Some("iso"), Some("1")),
                arc(Some("member-body"), None),
                arc(None, Some("840")),
            ]))
        );
    }

    #[test]
    fn nested_elements_and_following_assignments() {
        let (ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            v ::= <Pair> <a>1</a> <b><true/></b> <c/> </Pair>
            T ::= INTEGER
            END",
        );
        assert_eq!(diagnostics, vec![]);

        let module = &ast.modules[0];
        let AssignmentKind::XmlValue(value) = &module.assignments[0].kind else {
            panic!("not an XML value");
        };
        assert_eq!(
            value.value,
            Some(XmlValue::Elements(vec![
                XmlTypedValue {
                    name: "a".into(),
                    value: Some(XmlValue::Integer(1)),
                },
                XmlTypedValue {
                    name: "b".into(),
                    value: Some(XmlValue::Boolean(true)),
                },
                XmlTypedValue {
                    name: "c".into(),
                    value: None,
                },
            ]))
        );
        assert_eq!(module.assignments[1].name, "T");
    }

    #[test]
    fn empty_and_qualified_elements() {
        let value = xml_value("v ::= <Other-Module.Empty/>");
        assert_eq!(value.name, "Other-Module.Empty");
        assert_eq!(value.value, None);
    }

    #[rstest]
    #[case("v ::= <T>1</U>", DiagnosticKind::Structural)]
    #[case("v ::= <T>a & b</T>", DiagnosticKind::Structural)]
    #[case("v ::= <T>1", DiagnosticKind::Structural)]
    #[case("v ::= < T>1</T>", DiagnosticKind::Structural)]
    fn malformed_xml(#[case] body: &str, #[case] kind: DiagnosticKind) {
        let (_, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
        assert_eq!(diagnostics.len(), 1, "{body}");
        assert_eq!(diagnostics[0].kind, kind);
    }
}
