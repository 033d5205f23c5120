//! Value notation.  Most values are read according to the type that governs
//! them; braced values of types that are not known are recognised from their
//! contents.

use std::ops::Range;

use crate::{
    ast::{
        NamedValue, NumberForm, ObjIdComponent, Reference, ReferencedObjects, SpecialReal, Type,
        TypeKind, Value,
    },
    parser::{module::unquote, Parser, ParserError, Result},
    token::{Token, TokenKind},
};

/// Object identifier arcs that can start a value on their own
const ROOT_ARCS: [&str; 5] = ["itu-t", "ccitt", "iso", "joint-iso-itu-t", "joint-iso-ccitt"];

/// One arc of what might be an object identifier value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OidUnit<'a> {
    Number,
    Name(&'a str),
    NameAndNumber,
    Qualified,
}

impl<'a> Parser<'a> {
    /// Convert a number token to an integer
    pub(in crate::parser) fn integer_literal(&self, tok: Token<'a>, negative: bool) -> Result<i128> {
        let text = if negative {
            format!("-{}", tok.value)
        } else {
            tok.value.to_string()
        };

        text.parse().map_err(|_| ParserError::Structure {
            message: format!("number `{text}` does not fit in 128 bits"),
            span: tok.offset..tok.end(),
        })
    }

    /// An integer value, which is unbounded in ASN.1 so keeps the digits of
    /// numbers that do not fit in `i128`
    fn integer_value(&self, tok: Token<'a>, negative: bool) -> Value {
        match self.integer_literal(tok, negative) {
            Ok(number) => Value::Integer(number),
            Err(_) if negative => Value::LargeInteger(format!("-{}", tok.value)),
            Err(_) => Value::LargeInteger(tok.value.to_string()),
        }
    }

    /// An integer with an optional leading `-`
    pub(in crate::parser) fn signed_number(&mut self) -> Result<i128> {
        let negative = self.eat(TokenKind::Hyphen).is_some();
        let tok = self.next(&[TokenKind::Number])?;
        self.integer_literal(tok, negative)
    }

    /// A signed number or a reference to an integer value
    pub(in crate::parser) fn number_form(&mut self) -> Result<NumberForm> {
        if self.at(TokenKind::Number) || self.at(TokenKind::Hyphen) {
            Ok(NumberForm::Number(self.signed_number()?))
        } else {
            Ok(NumberForm::Defined(self.defined_value()?))
        }
    }

    /// Parse a value of the given type.  Without a type, or when the type is
    /// not known, the notation decides what kind of value is produced.
    pub(in crate::parser) fn value(&mut self, hint: Option<&Type>) -> Result<Value> {
        self.nested(|p| p.value_inner(hint))
    }

    fn value_inner(&mut self, hint: Option<&Type>) -> Result<Value> {
        let resolved = hint.map(|ty| self.resolve_type(ty));
        let open = hint.is_some_and(|ty| self.is_open_type(ty));

        let lower_reference = self.kind(0) == TokenKind::ValueRefOrIdent
            || (self.is_module_prefix(0) && self.kind(2) == TokenKind::ValueRefOrIdent);
        if open && !lower_reference {
            return self.open_type_value();
        }

        let tok = self.peek(&[])?;
        let value = match tok.kind {
            TokenKind::KwTrue => Value::Boolean(true),
            TokenKind::KwFalse => Value::Boolean(false),
            TokenKind::KwNull => Value::Null,
            TokenKind::Number => self.integer_value(tok, false),
            TokenKind::RealNumber => Value::Real(tok.value.to_string()),
            TokenKind::KwPlusInfinity => Value::SpecialReal(SpecialReal::PlusInfinity),
            TokenKind::KwMinusInfinity => Value::SpecialReal(SpecialReal::MinusInfinity),
            TokenKind::KwNotANumber => Value::SpecialReal(SpecialReal::NotANumber),
            TokenKind::BString => Value::BString(binary_contents(tok.value)),
            TokenKind::HString => Value::HString(binary_contents(tok.value)),
            TokenKind::CString => match resolved.as_ref().map(|ty| &ty.kind) {
                Some(TypeKind::OidIri | TypeKind::RelativeOidIri) => {
                    let text = unquote(tok.value);
                    Value::Iri(
                        text.split('/')
                            .filter(|arc| !arc.is_empty())
                            .map(str::to_string)
                            .collect(),
                    )
                }
                _ => Value::CString(unquote(tok.value)),
            },
            TokenKind::Hyphen => {
                self.bump();
                let number = self.next(&[TokenKind::Number, TokenKind::RealNumber])?;
                return Ok(if number.kind == TokenKind::Number {
                    self.integer_value(number, true)
                } else {
                    Value::Real(format!("-{}", number.value))
                });
            }
            TokenKind::KwContaining => {
                self.bump();
                return Ok(Value::Containing(Box::new(self.value(None)?)));
            }
            TokenKind::LeftCurly => return self.braced_value(resolved.as_ref()),
            TokenKind::ValueRefOrIdent => {
                if self.kind(1) == TokenKind::Colon {
                    self.bump();
                    self.bump();
                    let alternative = hint.and_then(|ty| self.component_type(ty, tok.value));
                    return Ok(Value::Choice {
                        alternative: tok.value.to_string(),
                        value: Box::new(self.value(alternative.as_ref())?),
                    });
                }

                if self.is_value_reference(tok.value) || self.at_field_access(1) {
                    return self.referenced_value();
                }
                Value::Identifier(tok.value.to_string())
            }
            _ if lower_reference => return self.referenced_value(),
            _ if self.starts_type(0) => return self.open_type_value(),
            _ => return Err(self.expected_item("a value")),
        };

        self.bump();
        Ok(value)
    }

    /// A value reference, or a value field of an object
    fn referenced_value(&mut self) -> Result<Value> {
        let reference = self.reference(&[TokenKind::ValueRefOrIdent])?;

        if self.at_field_access(0) {
            self.bump();
            let field = self.field_name()?;
            return Ok(Value::FromObject {
                objects: ReferencedObjects::Object(reference),
                field,
            });
        }

        Ok(Value::Referenced(reference))
    }

    /// `Type : Value`
    fn open_type_value(&mut self) -> Result<Value> {
        let ty = self.ty()?;
        self.next(&[TokenKind::Colon])?;
        let value = self.value(Some(&ty))?;

        Ok(Value::OpenType {
            ty: Box::new(ty),
            value: Box::new(value),
        })
    }

    /// A value in curly braces, read according to its resolved type
    fn braced_value(&mut self, resolved: Option<&Type>) -> Result<Value> {
        let Some(ty) = resolved else {
            return self.guessed_braced_value();
        };

        match &ty.kind {
            TypeKind::Sequence(_) | TypeKind::Set(_) => {
                self.named_values(|p, name| p.component_type(ty, name))
            }
            TypeKind::SequenceOf(of) | TypeKind::SetOf(of) if of.name.is_some() => {
                self.named_values(|_, _| Some(of.ty.clone()))
            }
            TypeKind::SequenceOf(of) | TypeKind::SetOf(of) => {
                Ok(Value::SequenceOf(self.value_list(Some(&of.ty))?))
            }
            TypeKind::ObjectIdentifier | TypeKind::RelativeOid => {
                Ok(Value::ObjectIdentifier(self.oid_components()?))
            }
            TypeKind::BitString(_) => Ok(Value::IdentifierList(self.identifier_list()?)),
            TypeKind::CharacterString(_) => self.character_string_value(ty),
            _ => self.guessed_braced_value(),
        }
    }

    /// `{ name value, ... }` with the type of each value found from its name
    fn named_values(&mut self, hint: impl Fn(&Self, &str) -> Option<Type>) -> Result<Value> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut values = vec![];
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(Value::Sequence(values));
        }

        loop {
            let name = self.next(&[TokenKind::ValueRefOrIdent])?;
            let ty = hint(&*self, name.value);
            values.push(NamedValue {
                name: name.value.to_string(),
                value: self.value(ty.as_ref())?,
            });

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(Value::Sequence(values))
    }

    /// `{ value, ... }`, possibly empty
    fn value_list(&mut self, hint: Option<&Type>) -> Result<Vec<Value>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut values = vec![];
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(values);
        }

        loop {
            values.push(self.value(hint)?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(values)
    }

    /// `{ a, b }`, the named bits of a bit string
    fn identifier_list(&mut self) -> Result<Vec<String>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut names = vec![];
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(names);
        }

        loop {
            names.push(self.next(&[TokenKind::ValueRefOrIdent])?.value.to_string());

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(names)
    }

    /// A quadruple, tuple or list of strings for a restricted character string
    fn character_string_value(&mut self, ty: &Type) -> Result<Value> {
        if self.number_cells(4) || self.number_cells(2) {
            self.next(&[TokenKind::LeftCurly])?;
            let mut cells = vec![];
            loop {
                let tok = self.next(&[TokenKind::Number])?;
                cells.push(self.integer_literal(tok, false)?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.next(&[TokenKind::RightCurly])?;

            return Ok(match cells[..] {
                [group, plane, row, cell] => Value::Quadruple {
                    group,
                    plane,
                    row,
                    cell,
                },
                [column, row] => Value::Tuple { column, row },
                _ => Value::SequenceOf(cells.into_iter().map(Value::Integer).collect()),
            });
        }

        Ok(Value::CharacterStringList(self.value_list(Some(ty))?))
    }

    /// Is the braced value exactly `count` comma separated numbers
    fn number_cells(&self, count: usize) -> bool {
        (0..count).all(|i| {
            let after = if i + 1 == count {
                TokenKind::RightCurly
            } else {
                TokenKind::Comma
            };
            self.kind(1 + i * 2) == TokenKind::Number && self.kind(2 + i * 2) == after
        })
    }

    /// Read a braced value without a known type.  The items between the braces
    /// decide whether it is an object identifier, a sequence, a list of names
    /// or a list of values.
    fn guessed_braced_value(&mut self) -> Result<Value> {
        let Some(items) = self.braced_items() else {
            // unbalanced, let the list parser report the problem
            return Ok(Value::SequenceOf(self.value_list(None)?));
        };

        if items.is_empty() {
            self.next(&[TokenKind::LeftCurly])?;
            self.next(&[TokenKind::RightCurly])?;
            return Ok(Value::SequenceOf(vec![]));
        }

        if let [item] = &items[..] {
            if self.looks_like_oid(item.clone()) {
                return Ok(Value::ObjectIdentifier(self.oid_components()?));
            }
        }

        let named = items.iter().all(|item| {
            let name = self.token(item.start);
            item.len() >= 2
                && name.kind == TokenKind::ValueRefOrIdent
                && match self.kind(item.start + 1) {
                    TokenKind::Colon => false,
                    TokenKind::Dot => !self.at_field_access(item.start + 1),
                    TokenKind::LeftCurly => self.env.parameters(name.value).is_empty(),
                    _ => true,
                }
        });
        if named {
            return self.named_values(|_, _| None);
        }

        let single_names = items
            .iter()
            .all(|item| item.len() == 1 && self.kind(item.start) == TokenKind::ValueRefOrIdent);
        if single_names {
            let references = items
                .iter()
                .all(|item| self.is_value_reference(self.token(item.start).value));
            if !references {
                return Ok(Value::IdentifierList(self.identifier_list()?));
            }
        }

        Ok(Value::SequenceOf(self.value_list(None)?))
    }

    /// Token ranges, relative to the current `{`, of the comma separated items
    /// of a braced value.  `None` if the braces are not closed.
    fn braced_items(&self) -> Option<Vec<Range<usize>>> {
        let mut items = vec![];
        let mut depth = 0usize;
        let mut start = 1;

        for n in 1.. {
            match self.kind(n) {
                TokenKind::Eof => return None,
                TokenKind::LeftCurly | TokenKind::LeftParen | TokenKind::LeftSquare => depth += 1,
                TokenKind::RightCurly if depth == 0 => {
                    if start < n || !items.is_empty() {
                        items.push(start..n);
                    }
                    return Some(items);
                }
                TokenKind::RightCurly | TokenKind::RightParen | TokenKind::RightSquare => {
                    depth = depth.checked_sub(1)?;
                }
                TokenKind::Comma if depth == 0 => {
                    items.push(start..n);
                    start = n + 1;
                }
                _ => {}
            }
        }

        None
    }

    /// Is a single braced item a list of object identifier arcs
    fn looks_like_oid(&self, item: Range<usize>) -> bool {
        let Some(units) = self.oid_units(item) else {
            return false;
        };

        match units[..] {
            [] | [_] => false,
            [OidUnit::Name(first), _] => {
                ROOT_ARCS.contains(&first) || self.is_value_reference(first)
            }
            _ => true,
        }
    }

    /// Split a token range into object identifier arcs
    fn oid_units(&self, item: Range<usize>) -> Option<Vec<OidUnit<'a>>> {
        let mut units = vec![];
        let mut n = item.start;

        while n < item.end {
            let tok = self.token(n);
            let unit = match tok.kind {
                TokenKind::Number => {
                    n += 1;
                    OidUnit::Number
                }
                TokenKind::ValueRefOrIdent if self.kind(n + 1) == TokenKind::LeftParen => {
                    let close = match (self.kind(n + 2), self.kind(n + 3)) {
                        (TokenKind::Number | TokenKind::ValueRefOrIdent, TokenKind::RightParen) => n + 3,
                        _ if self.is_module_prefix(n + 2)
                            && self.kind(n + 4) == TokenKind::ValueRefOrIdent
                            && self.kind(n + 5) == TokenKind::RightParen =>
                        {
                            n + 5
                        }
                        _ => return None,
                    };
                    n = close + 1;
                    OidUnit::NameAndNumber
                }
                TokenKind::ValueRefOrIdent => {
                    n += 1;
                    OidUnit::Name(tok.value)
                }
                _ if self.is_module_prefix(n) && self.kind(n + 2) == TokenKind::ValueRefOrIdent => {
                    n += 3;
                    OidUnit::Qualified
                }
                _ => return None,
            };
            units.push(unit);
        }

        (n == item.end).then_some(units)
    }

    /// `{ iso member-body(2) 840 }`
    pub(in crate::parser) fn oid_components(&mut self) -> Result<Vec<ObjIdComponent>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut components = vec![self.oid_component()?];
        while !self.at(TokenKind::RightCurly) {
            components.push(self.oid_component()?);
        }
        self.bump();

        Ok(components)
    }

    fn oid_component(&mut self) -> Result<ObjIdComponent> {
        if let Some(tok) = self.eat(TokenKind::Number) {
            return Ok(ObjIdComponent::Number(tok.value.to_string()));
        }

        if self.is_module_prefix(0) {
            return Ok(ObjIdComponent::Defined(self.defined_value()?));
        }

        let name = self.next(&[TokenKind::ValueRefOrIdent])?;
        if self.eat(TokenKind::LeftParen).is_some() {
            let component = if let Some(number) = self.eat(TokenKind::Number) {
                ObjIdComponent::NameAndNumber(name.value.to_string(), number.value.to_string())
            } else {
                ObjIdComponent::NameAndDefined(name.value.to_string(), self.defined_value()?)
            };
            self.next(&[TokenKind::RightParen])?;
            return Ok(component);
        }

        if self.is_value_reference(name.value) {
            Ok(ObjIdComponent::Defined(Reference::local(name.value)))
        } else {
            Ok(ObjIdComponent::Name(name.value.to_string()))
        }
    }
}

/// The digits of a `'0101'B` or `'0F'H` literal without quotes, suffix or
/// whitespace
fn binary_contents(text: &str) -> String {
    let text = text.strip_prefix('\'').unwrap_or(text);
    let text = text
        .strip_suffix(|c: char| matches!(c, 'B' | 'H'))
        .unwrap_or(text);
    let text = text.strip_suffix('\'').unwrap_or(text);
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::binary_contents;
    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    /// Parse the value of the last assignment of a module body
    fn last_value(body: &str) -> Value {
        let (ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
        assert_eq!(diagnostics, vec![], "{body}");
        match ast.modules[0].assignments.last().map(|a| &a.kind) {
            Some(AssignmentKind::Value { value, .. }) => value.clone(),
            kind => panic!("not a value assignment: {kind:?}"),
        }
    }

    #[rstest]
    #[case("v INTEGER ::= -42", Value::Integer(-42))]
    #[case("v REAL ::= 1.5e10", Value::Real("1.5e10".into()))]
    #[case("v REAL ::= -0.5", Value::Real("-0.5".into()))]
    #[case("v REAL ::= MINUS-INFINITY", Value::SpecialReal(SpecialReal::MinusInfinity))]
    #[case("v BOOLEAN ::= FALSE", Value::Boolean(false))]
    #[case("v NULL ::= NULL", Value::Null)]
    #[case("v BIT STRING ::= '0101 1'B", Value::BString("01011".into()))]
    #[case("v OCTET STRING ::= 'DEAD BEEF'H", Value::HString("DEADBEEF".into()))]
    #[case("v IA5String ::= \"say \"\"hi\"\"\"", Value::CString("say \"hi\"".into()))]
    #[case("v OID-IRI ::= \"/ISO/Registration_Authority\"", Value::Iri(vec!["ISO".into(), "Registration_Authority".into()]))]
    #[case("v INTEGER ::= named", Value::Identifier("named".into()))]
    fn simple_values(#[case] body: &str, #[case] value: Value) {
        assert_eq!(last_value(body), value);
    }

    #[rstest]
    #[case("999999999999999999999999999999999999999999")]
    #[case("-170141183460469231731687303715884105729")]
    fn integers_beyond_128_bits_keep_their_digits(#[case] number: &str) {
        assert_eq!(
            last_value(&format!("v INTEGER ::= {number}")),
            Value::LargeInteger(number.to_string())
        );
    }

    #[test]
    fn oversized_tag_numbers_are_reported() {
        let (_, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN T ::= [999999999999999999999999999999999999999999] INTEGER END",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Structural);
    }

    #[test]
    fn object_identifiers() {
        let value = last_value("v OBJECT IDENTIFIER ::= { iso member-body(2) us(840) 113549 }");
        assert_eq!(
            value,
            Value::ObjectIdentifier(vec![
                ObjIdComponent::Name("iso".into()),
                ObjIdComponent::NameAndNumber("member-body".into(), "2".into()),
                ObjIdComponent::NameAndNumber("us".into(), "840".into()),
                ObjIdComponent::Number("113549".into()),
            ])
        );

        let value = last_value(
            "base OBJECT IDENTIFIER ::= { 1 2 }
            v OBJECT IDENTIFIER ::= { base 3 }",
        );
        assert_eq!(
            value,
            Value::ObjectIdentifier(vec![
                ObjIdComponent::Defined(Reference::local("base")),
                ObjIdComponent::Number("3".into()),
            ])
        );
    }

    #[test]
    fn values_follow_their_types() {
        let value = last_value(
            "T ::= SEQUENCE { flags BIT STRING { a(0), b(1) }, items SEQUENCE OF INTEGER }
            v T ::= { flags { a, b }, items { 1, 2 } }",
        );
        assert_eq!(
            value,
            Value::Sequence(vec![
                NamedValue {
                    name: "flags".into(),
                    value: Value::IdentifierList(vec!["a".into(), "b".into()]),
                },
                NamedValue {
                    name: "items".into(),
                    value: Value::SequenceOf(vec![Value::Integer(1), Value::Integer(2)]),
                },
            ])
        );
    }

    #[test]
    fn choice_and_containing() {
        let value = last_value("C ::= CHOICE { a INTEGER, b BOOLEAN } v C ::= b : TRUE");
        assert_eq!(
            value,
            Value::Choice {
                alternative: "b".into(),
                value: Box::new(Value::Boolean(true)),
            }
        );

        let value = last_value("v OCTET STRING ::= CONTAINING 5");
        assert_eq!(value, Value::Containing(Box::new(Value::Integer(5))));
    }

    #[test]
    fn character_string_values() {
        let value = last_value("v UTF8String ::= { \"abc\", { 0, 0, 0, 65 }, { 3, 4 } }");
        assert_eq!(
            value,
            Value::CharacterStringList(vec![
                Value::CString("abc".into()),
                Value::Quadruple {
                    group: 0,
                    plane: 0,
                    row: 0,
                    cell: 65
                },
                Value::Tuple { column: 3, row: 4 },
            ])
        );
    }

    #[rstest]
    #[case("{ }", Value::SequenceOf(vec![]))]
    #[case("{ iso 3 }", Value::ObjectIdentifier(vec![
        ObjIdComponent::Name("iso".into()),
        ObjIdComponent::Number("3".into()),
    ]))]
    #[case("{ a 1, b TRUE }", Value::Sequence(vec![
        NamedValue { name: "a".into(), value: Value::Integer(1) },
        NamedValue { name: "b".into(), value: Value::Boolean(true) },
    ]))]
    #[case("{ x, y }", Value::IdentifierList(vec!["x".into(), "y".into()]))]
    #[case("{ 1, 2 }", Value::SequenceOf(vec![Value::Integer(1), Value::Integer(2)]))]
    fn braced_values_of_unknown_types(#[case] text: &str, #[case] value: Value) {
        assert_eq!(last_value(&format!("v Imported ::= {text}")), value);
    }

    #[test]
    fn binary_literal_contents() {
        assert_eq!(binary_contents("'01 10'B"), "0110");
        assert_eq!(binary_contents("''H"), "");
    }
}
