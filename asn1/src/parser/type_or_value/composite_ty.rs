//! Sequence, set, choice and enumerated types, and the named number lists of
//! integer and bit string types

use crate::{
    ast::{
        AlternativeExtension, AlternativeTypeLists, ComponentExtension, ComponentPresence,
        ComponentType, ComponentTypeLists, EnumerationExtension, EnumerationItem, Enumerations,
        ExceptionIdentification, ExtensionAddition, NamedNumber, NamedType,
    },
    parser::{Parser, Result},
    token::TokenKind,
};

impl<'a> Parser<'a> {
    /// Parse the braced components of a set or sequence type
    /// ```bnf
    /// ComponentTypeLists ::=
    ///     RootComponentTypeList
    ///   | RootComponentTypeList "," ExtensionAndException ExtensionAdditions
    ///         OptionalExtensionMarker
    ///   | RootComponentTypeList "," ExtensionAndException ExtensionAdditions
    ///         ExtensionEndMarker "," RootComponentTypeList
    ///   | ExtensionAndException ExtensionAdditions ExtensionEndMarker ","
    ///         RootComponentTypeList
    ///   | ExtensionAndException ExtensionAdditions OptionalExtensionMarker
    /// ```
    pub(super) fn component_type_lists(&mut self) -> Result<ComponentTypeLists> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut lists = ComponentTypeLists::default();
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(lists);
        }

        if !self.at(TokenKind::Ellipsis) {
            loop {
                lists.root.push(self.component_definition()?);

                let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
                if tok.kind == TokenKind::RightCurly {
                    return Ok(lists);
                }
                if self.at(TokenKind::Ellipsis) {
                    break;
                }
            }
        }

        self.next(&[TokenKind::Ellipsis])?;
        let mut extension = ComponentExtension {
            exception: self.exception_spec()?,
            additions: vec![],
            end_marker: false,
        };

        loop {
            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                lists.extension = Some(extension);
                return Ok(lists);
            }

            if self.eat(TokenKind::Ellipsis).is_some() {
                extension.end_marker = true;
                break;
            }
            extension
                .additions
                .push(self.extension_addition(Self::component_definition)?);
        }
        lists.extension = Some(extension);

        while self.eat(TokenKind::Comma).is_some() {
            lists.trailing_root.push(self.component_definition()?);
        }
        self.next(&[TokenKind::RightCurly])?;

        Ok(lists)
    }

    /// Parse the braced alternatives of a choice type, which must have at least
    /// one root alternative
    pub(super) fn alternative_type_lists(&mut self) -> Result<AlternativeTypeLists> {
        self.next(&[TokenKind::KwChoice])?;
        self.next(&[TokenKind::LeftCurly])?;

        let mut lists = AlternativeTypeLists::default();
        loop {
            lists.root.push(self.named_type()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                return Ok(lists);
            }
            if self.at(TokenKind::Ellipsis) {
                break;
            }
        }

        self.next(&[TokenKind::Ellipsis])?;
        let mut extension = AlternativeExtension {
            exception: self.exception_spec()?,
            additions: vec![],
            end_marker: false,
        };

        while self.eat(TokenKind::Comma).is_some() {
            if self.eat(TokenKind::Ellipsis).is_some() {
                extension.end_marker = true;
                break;
            }
            extension
                .additions
                .push(self.extension_addition(Self::named_type)?);
        }
        lists.extension = Some(extension);
        self.next(&[TokenKind::RightCurly])?;

        Ok(lists)
    }

    /// A single extension addition or a `[[ ]]` version group of them
    fn extension_addition<T>(
        &mut self,
        item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<ExtensionAddition<T>> {
        if self.eat(TokenKind::LeftVersionBrackets).is_none() {
            return Ok(ExtensionAddition::Single(item(self)?));
        }

        self.nested(|p| {
            let version = if p.kind(0) == TokenKind::Number && p.kind(1) == TokenKind::Colon {
                let tok = p.bump();
                p.bump();
                Some(tok.value.to_string())
            } else {
                None
            };

            let mut items = vec![];
            loop {
                items.push(item(p)?);

                let tok = p.next(&[TokenKind::Comma, TokenKind::RightVersionBrackets])?;
                if tok.kind == TokenKind::RightVersionBrackets {
                    break;
                }
            }

            Ok(ExtensionAddition::Group { version, items })
        })
    }

    /// `COMPONENTS OF Type` or `name Type`, optionally followed by `OPTIONAL`
    /// or `DEFAULT value`
    fn component_definition(&mut self) -> Result<ComponentType> {
        if self.eat(TokenKind::KwComponents).is_some() {
            self.next(&[TokenKind::KwOf])?;
            return Ok(ComponentType::ComponentsOf(self.ty()?));
        }

        let name = self.next(&[TokenKind::ValueRefOrIdent])?;
        let ty = self.ty()?;

        let presence = if self.eat(TokenKind::KwOptional).is_some() {
            Some(ComponentPresence::Optional)
        } else if self.eat(TokenKind::KwDefault).is_some() {
            Some(ComponentPresence::Default(self.value(Some(&ty))?))
        } else {
            None
        };

        Ok(ComponentType::Named {
            name: name.value.to_string(),
            ty,
            presence,
        })
    }

    fn named_type(&mut self) -> Result<NamedType> {
        let name = self.next(&[TokenKind::ValueRefOrIdent])?;
        let ty = self.ty()?;

        Ok(NamedType {
            name: name.value.to_string(),
            ty,
        })
    }

    /// `{ a(1), b(-2), c(defined) }` after `INTEGER` or `BIT STRING`
    pub(super) fn named_number_list(&mut self) -> Result<Vec<NamedNumber>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut list = vec![];
        loop {
            let name = self.next(&[TokenKind::ValueRefOrIdent])?;
            self.next(&[TokenKind::LeftParen])?;
            let value = self.number_form()?;
            self.next(&[TokenKind::RightParen])?;

            list.push(NamedNumber {
                name: name.value.to_string(),
                value,
            });

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(list)
    }

    /// `ENUMERATED { a, b(5), ..., c }`
    pub(super) fn enumerations(&mut self) -> Result<Enumerations> {
        self.next(&[TokenKind::KwEnumerated])?;
        self.next(&[TokenKind::LeftCurly])?;

        let mut enumerations = Enumerations {
            root: vec![],
            extension: None,
        };

        loop {
            enumerations.root.push(self.enumeration_item()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                return Ok(enumerations);
            }
            if self.at(TokenKind::Ellipsis) {
                break;
            }
        }

        self.next(&[TokenKind::Ellipsis])?;
        let mut extension = EnumerationExtension {
            exception: self.exception_spec()?,
            additions: vec![],
        };
        while self.eat(TokenKind::Comma).is_some() {
            extension.additions.push(self.enumeration_item()?);
        }
        enumerations.extension = Some(extension);
        self.next(&[TokenKind::RightCurly])?;

        Ok(enumerations)
    }

    fn enumeration_item(&mut self) -> Result<EnumerationItem> {
        let name = self.next(&[TokenKind::ValueRefOrIdent])?;

        let value = if self.eat(TokenKind::LeftParen).is_some() {
            let value = self.number_form()?;
            self.next(&[TokenKind::RightParen])?;
            Some(value)
        } else {
            None
        };

        Ok(EnumerationItem {
            name: name.value.to_string(),
            value,
        })
    }

    /// Parse an optional exception identification, `! 5`, `! -1`, `! value` or
    /// `! Type : value`
    pub(in crate::parser) fn exception_spec(&mut self) -> Result<Option<ExceptionIdentification>> {
        if self.eat(TokenKind::Exclamation).is_none() {
            return Ok(None);
        }

        if self.at(TokenKind::Number) || self.at(TokenKind::Hyphen) {
            return Ok(Some(ExceptionIdentification::Number(self.signed_number()?)));
        }

        let defined = (self.kind(0) == TokenKind::ValueRefOrIdent && self.kind(1) != TokenKind::Less)
            || (self.is_module_prefix(0) && self.kind(2) == TokenKind::ValueRefOrIdent);
        if defined {
            return Ok(Some(ExceptionIdentification::Defined(self.defined_value()?)));
        }

        let ty = self.ty()?;
        self.next(&[TokenKind::Colon])?;
        let value = self.value(Some(&ty))?;

        Ok(Some(ExceptionIdentification::TypeValue(
            Box::new(ty),
            Box::new(value),
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, compiler::parse};

    fn parse_type(text: &str) -> Type {
        let (ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN T ::= {text} END"));
        assert_eq!(diagnostics, vec![], "{text}");
        match &ast.modules[0].assignments[0].kind {
            AssignmentKind::Type(ty) => ty.clone(),
            kind => panic!("not a type assignment: {kind:?}"),
        }
    }

    fn components(text: &str) -> ComponentTypeLists {
        match parse_type(text).kind {
            TypeKind::Sequence(lists) | TypeKind::Set(lists) => lists,
            kind => panic!("not a sequence: {kind:?}"),
        }
    }

    fn named(name: &str, kind: TypeKind) -> ComponentType {
        ComponentType::Named {
            name: name.into(),
            ty: Type::new(kind),
            presence: None,
        }
    }

    #[test]
    fn sequence_with_extensions() {
        let lists = components(
            "SEQUENCE { a INTEGER, ..., [[ 2: b BOOLEAN, c NULL ]], d REAL, ..., e NULL }",
        );
        assert_eq!(lists.root, vec![named("a", TypeKind::Integer(vec![]))]);
        let extension = lists.extension.unwrap();
        assert!(extension.end_marker);
        assert_eq!(
            extension.additions,
            vec![
                ExtensionAddition::Group {
                    version: Some("2".into()),
                    items: vec![named("b", TypeKind::Boolean), named("c", TypeKind::Null)],
                },
                ExtensionAddition::Single(named("d", TypeKind::Real)),
            ]
        );
        assert_eq!(lists.trailing_root, vec![named("e", TypeKind::Null)]);
    }

    #[test]
    fn empty_and_extension_only_sequences() {
        assert_eq!(components("SEQUENCE {}"), ComponentTypeLists::default());

        let lists = components("SET { ... ! 5 }");
        assert!(lists.root.is_empty());
        assert_eq!(
            lists.extension.unwrap().exception,
            Some(ExceptionIdentification::Number(5))
        );
    }

    #[test]
    fn optional_default_and_components_of() {
        let lists = components(
            "SEQUENCE { a INTEGER OPTIONAL, b BOOLEAN DEFAULT TRUE, COMPONENTS OF Other }",
        );
        assert_eq!(
            lists.root,
            vec![
                ComponentType::Named {
                    name: "a".into(),
                    ty: Type::new(TypeKind::Integer(vec![])),
                    presence: Some(ComponentPresence::Optional),
                },
                ComponentType::Named {
                    name: "b".into(),
                    ty: Type::new(TypeKind::Boolean),
                    presence: Some(ComponentPresence::Default(Value::Boolean(true))),
                },
                ComponentType::ComponentsOf(Type::new(TypeKind::Referenced(Reference::local(
                    "Other"
                )))),
            ]
        );
    }

    #[test]
    fn missing_comma_lists_every_continuation() {
        let (_, diagnostics) =
            parse("M DEFINITIONS ::= BEGIN T ::= SEQUENCE { a INTEGER b BOOLEAN } END");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].expected,
            vec!["`{`", "`(`", "`OPTIONAL`", "`DEFAULT`", "`,`", "`}`"]
        );
        assert_eq!(diagnostics[0].location, 51..52);
    }

    #[test]
    fn choice_alternatives() {
        let ty = parse_type("CHOICE { a INTEGER, ..., b BOOLEAN, ... }");
        let TypeKind::Choice(lists) = ty.kind else {
            panic!("not a choice");
        };
        assert_eq!(lists.root.len(), 1);
        let extension = lists.extension.unwrap();
        assert_eq!(extension.additions.len(), 1);
        assert!(extension.end_marker);
    }

    #[test]
    fn choice_needs_an_alternative() {
        let (_, diagnostics) = parse("M DEFINITIONS ::= BEGIN T ::= CHOICE { } END");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn enumerations() {
        let ty = parse_type("ENUMERATED { red, green(5), ..., blue(-1) }");
        assert_eq!(
            ty.kind,
            TypeKind::Enumerated(Enumerations {
                root: vec![
                    EnumerationItem {
                        name: "red".into(),
                        value: None
                    },
                    EnumerationItem {
                        name: "green".into(),
                        value: Some(NumberForm::Number(5))
                    },
                ],
                extension: Some(EnumerationExtension {
                    exception: None,
                    additions: vec![EnumerationItem {
                        name: "blue".into(),
                        value: Some(NumberForm::Number(-1))
                    }],
                }),
            })
        );
    }

    #[test]
    fn named_numbers() {
        let ty = parse_type("INTEGER { low(-5), high(max-value) }");
        assert_eq!(
            ty.kind,
            TypeKind::Integer(vec![
                NamedNumber {
                    name: "low".into(),
                    value: NumberForm::Number(-5)
                },
                NamedNumber {
                    name: "high".into(),
                    value: NumberForm::Defined(Reference::local("max-value"))
                },
            ])
        );
    }

    #[test]
    fn exception_with_type_and_value() {
        let lists = components("SEQUENCE { ... ! INTEGER : 7 }");
        assert_eq!(
            lists.extension.unwrap().exception,
            Some(ExceptionIdentification::TypeValue(
                Box::new(Type::new(TypeKind::Integer(vec![]))),
                Box::new(Value::Integer(7)),
            ))
        );
    }
}
