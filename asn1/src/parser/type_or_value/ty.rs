use crate::{
    ast::{
        CollectionOf, DefinedObjectClass, NumberForm, OfConstraint, Reference, ReferencedObjects,
        StringKind, Tag, TagClass, TagMode, Type, TypeKind,
    },
    parser::{Parser, Result},
    token::TokenKind,
};

impl<'a> Parser<'a> {
    /// Parse a type, including any constraints that follow it
    pub(in crate::parser) fn ty(&mut self) -> Result<Type> {
        self.nested(|p| {
            let kind = p.type_kind()?;
            let mut ty = Type::new(kind);

            while p.at(TokenKind::LeftParen) {
                let constraint = p.constraint(Some(&ty))?;
                ty.constraints.push(constraint);
            }

            Ok(ty)
        })
    }

    /// Parse a type without its constraints
    fn type_kind(&mut self) -> Result<TypeKind> {
        let tok = self.token(0);

        if tok.kind.is_string_type() {
            self.bump();
            return Ok(TypeKind::CharacterString(string_kind(tok.kind)));
        }

        let simple = match tok.kind {
            TokenKind::KwBoolean => Some(TypeKind::Boolean),
            TokenKind::KwReal => Some(TypeKind::Real),
            TokenKind::KwNull => Some(TypeKind::Null),
            TokenKind::KwRelativeOid => Some(TypeKind::RelativeOid),
            TokenKind::KwOidIri => Some(TypeKind::OidIri),
            TokenKind::KwRelativeOidIri => Some(TypeKind::RelativeOidIri),
            TokenKind::KwExternal => Some(TypeKind::External),
            TokenKind::KwTime => Some(TypeKind::Time),
            TokenKind::KwDate => Some(TypeKind::Date),
            TokenKind::KwTimeOfDay => Some(TypeKind::TimeOfDay),
            TokenKind::KwDateTime => Some(TypeKind::DateTime),
            TokenKind::KwDuration => Some(TypeKind::Duration),
            TokenKind::KwGeneralizedTime => Some(TypeKind::GeneralizedTime),
            TokenKind::KwUTCTime => Some(TypeKind::UtcTime),
            TokenKind::KwObjectDescriptor => Some(TypeKind::ObjectDescriptor),
            _ => None,
        };
        if let Some(kind) = simple {
            self.bump();
            return Ok(kind);
        }

        match tok.kind {
            TokenKind::KwInteger => {
                self.bump();
                let named = if self.at(TokenKind::LeftCurly) {
                    self.named_number_list()?
                } else {
                    vec![]
                };
                Ok(TypeKind::Integer(named))
            }
            TokenKind::KwEnumerated => Ok(TypeKind::Enumerated(self.enumerations()?)),
            TokenKind::KwBit => {
                self.bump();
                self.next(&[TokenKind::KwString])?;
                let named = if self.at(TokenKind::LeftCurly) {
                    self.named_number_list()?
                } else {
                    vec![]
                };
                Ok(TypeKind::BitString(named))
            }
            TokenKind::KwOctet => {
                self.bump();
                self.next(&[TokenKind::KwString])?;
                Ok(TypeKind::OctetString)
            }
            TokenKind::KwObject => {
                self.bump();
                self.next(&[TokenKind::KwIdentifier])?;
                Ok(TypeKind::ObjectIdentifier)
            }
            TokenKind::KwCharacter => {
                self.bump();
                self.next(&[TokenKind::KwString])?;
                Ok(TypeKind::UnrestrictedCharacterString)
            }
            TokenKind::KwEmbedded => {
                self.bump();
                self.next(&[TokenKind::KwPdv])?;
                Ok(TypeKind::EmbeddedPdv)
            }
            TokenKind::KwInstance => {
                self.bump();
                self.next(&[TokenKind::KwOf])?;
                Ok(TypeKind::InstanceOf(self.defined_object_class()?))
            }
            TokenKind::KwSequence | TokenKind::KwSet => self.collection_type(),
            TokenKind::KwChoice => Ok(TypeKind::Choice(self.alternative_type_lists()?)),
            TokenKind::LeftSquare => self.prefixed_type(),
            TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax => {
                let class = self.defined_object_class()?;
                self.next(&[TokenKind::Dot])?;
                let field = self.field_name()?;
                Ok(TypeKind::ObjectClassField { class, field })
            }
            TokenKind::TypeOrModuleRef
            | TokenKind::ObjectClassRef
            | TokenKind::ValueRefOrIdent => self.referenced_type(),
            _ => Err(self.expected_item("a type")),
        }
    }

    /// A type defined elsewhere, a field of a class, object or object set or a
    /// selection type
    fn referenced_type(&mut self) -> Result<TypeKind> {
        let module = self.module_prefix();
        let name = self.next(&[
            TokenKind::TypeOrModuleRef,
            TokenKind::ObjectClassRef,
            TokenKind::ValueRefOrIdent,
        ])?;

        if name.kind == TokenKind::ValueRefOrIdent && module.is_none() && self.eat(TokenKind::Less).is_some() {
            let ty = self.ty()?;
            return Ok(TypeKind::Selection {
                alternative: name.value.to_string(),
                ty: Box::new(ty),
            });
        }

        let parameters = self.reference_parameters(module.as_deref(), name.value)?;
        let is_class = name.kind == TokenKind::ObjectClassRef && self.is_class_name(name.value);
        let reference = Reference {
            module,
            name: name.value.to_string(),
            parameters,
        };

        if name.kind == TokenKind::ValueRefOrIdent {
            self.next(&[TokenKind::Dot])?;
            let field = self.field_name()?;
            return Ok(TypeKind::FromObject {
                objects: ReferencedObjects::Object(reference),
                field,
            });
        }

        if self.at_field_access(0) {
            self.bump();
            let field = self.field_name()?;

            return Ok(if is_class {
                TypeKind::ObjectClassField {
                    class: DefinedObjectClass::Reference(reference),
                    field,
                }
            } else {
                TypeKind::FromObject {
                    objects: ReferencedObjects::ObjectSet(reference),
                    field,
                }
            });
        }

        Ok(TypeKind::Referenced(reference))
    }

    /// `SEQUENCE` or `SET`, with components or as a collection of a type
    fn collection_type(&mut self) -> Result<TypeKind> {
        let tok = self.next(&[TokenKind::KwSequence, TokenKind::KwSet])?;
        let sequence = tok.kind == TokenKind::KwSequence;

        if self.at(TokenKind::LeftCurly) {
            let components = self.component_type_lists()?;
            return Ok(if sequence {
                TypeKind::Sequence(components)
            } else {
                TypeKind::Set(components)
            });
        }

        let constraint = if self.eat(TokenKind::KwSize).is_some() {
            let size = Type::new(TypeKind::Integer(vec![]));
            Some(OfConstraint::Size(self.constraint(Some(&size))?))
        } else if self.at(TokenKind::LeftParen) {
            Some(OfConstraint::Constraint(self.constraint(None)?))
        } else {
            None
        };

        self.next(&[TokenKind::KwOf])?;

        // `SEQUENCE OF item Type`, an identifier that does not start a type
        let name = if self.kind(0) == TokenKind::ValueRefOrIdent
            && !matches!(self.kind(1), TokenKind::Dot | TokenKind::Less)
        {
            Some(self.bump().value.to_string())
        } else {
            None
        };

        let collection = Box::new(CollectionOf {
            constraint,
            name,
            ty: self.ty()?,
        });

        Ok(if sequence {
            TypeKind::SequenceOf(collection)
        } else {
            TypeKind::SetOf(collection)
        })
    }

    /// A tagged type, `[APPLICATION 5] IMPLICIT Type`, or a type with an
    /// encoding instruction, `[XER:ATTRIBUTE] Type`
    fn prefixed_type(&mut self) -> Result<TypeKind> {
        self.next(&[TokenKind::LeftSquare])?;

        let encoding_reference =
            if self.kind(0).is_uppercase_ref() && self.kind(1) == TokenKind::Colon {
                let tok = self.bump();
                self.bump();
                Some(tok.value.to_string())
            } else {
                None
            };

        let class = if self.eat(TokenKind::KwUniversal).is_some() {
            Some(TagClass::Universal)
        } else if self.eat(TokenKind::KwApplication).is_some() {
            Some(TagClass::Application)
        } else if self.eat(TokenKind::KwPrivate).is_some() {
            Some(TagClass::Private)
        } else {
            None
        };

        let defined_number = (self.kind(0) == TokenKind::ValueRefOrIdent
            && self.kind(1) == TokenKind::RightSquare)
            || (self.is_module_prefix(0)
                && self.kind(2) == TokenKind::ValueRefOrIdent
                && self.kind(3) == TokenKind::RightSquare);

        if class.is_some() || self.at(TokenKind::Number) || defined_number {
            let number = if let Some(tok) = self.eat(TokenKind::Number) {
                NumberForm::Number(self.integer_literal(tok, false)?)
            } else {
                NumberForm::Defined(self.defined_value()?)
            };
            self.next(&[TokenKind::RightSquare])?;

            let mode = if self.eat(TokenKind::KwImplicit).is_some() {
                Some(TagMode::Implicit)
            } else if self.eat(TokenKind::KwExplicit).is_some() {
                Some(TagMode::Explicit)
            } else {
                None
            };

            let ty = self.ty()?;
            return Ok(TypeKind::Tagged {
                tag: Tag {
                    encoding_reference,
                    class,
                    number,
                },
                mode,
                ty: Box::new(ty),
            });
        }

        // the encoding instruction is kept as written, up to the matching `]`
        let first = self.pos;
        let mut depth = 0usize;
        loop {
            let tok = self.peek(&[])?;
            match tok.kind {
                TokenKind::Eof => return Err(self.unexpected(&[TokenKind::RightSquare], None)),
                TokenKind::LeftSquare => depth += 1,
                TokenKind::RightSquare if depth == 0 => break,
                TokenKind::RightSquare => depth -= 1,
                _ => {}
            }
            self.bump();
        }

        let instruction = if self.pos > first {
            self.text_between(first, self.pos - 1).to_string()
        } else {
            String::new()
        };
        self.next(&[TokenKind::RightSquare])?;

        let ty = self.ty()?;
        Ok(TypeKind::EncodingPrefixed {
            encoding_reference,
            instruction,
            ty: Box::new(ty),
        })
    }
}

/// The restricted character string type of a keyword
fn string_kind(kind: TokenKind) -> StringKind {
    match kind {
        TokenKind::KwBMPString => StringKind::Bmp,
        TokenKind::KwGeneralString => StringKind::General,
        TokenKind::KwGraphicString => StringKind::Graphic,
        TokenKind::KwIA5String => StringKind::Ia5,
        TokenKind::KwISO646String => StringKind::Iso646,
        TokenKind::KwNumericString => StringKind::Numeric,
        TokenKind::KwPrintableString => StringKind::Printable,
        TokenKind::KwTeletexString => StringKind::Teletex,
        TokenKind::KwT61String => StringKind::T61,
        TokenKind::KwUniversalString => StringKind::Universal,
        TokenKind::KwUTF8String => StringKind::Utf8,
        TokenKind::KwVideotexString => StringKind::Videotex,
        _ => StringKind::Visible,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    fn parse_type(text: &str) -> Type {
        let (ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN T ::= {text} END"));
        assert_eq!(diagnostics, vec![], "{text}");
        match &ast.modules[0].assignments[0].kind {
            AssignmentKind::Type(ty) => ty.clone(),
            kind => panic!("not a type assignment: {kind:?}"),
        }
    }

    #[rstest]
    #[case("BOOLEAN", TypeKind::Boolean)]
    #[case("OCTET STRING", TypeKind::OctetString)]
    #[case("OBJECT IDENTIFIER", TypeKind::ObjectIdentifier)]
    #[case("CHARACTER STRING", TypeKind::UnrestrictedCharacterString)]
    #[case("EMBEDDED PDV", TypeKind::EmbeddedPdv)]
    #[case("RELATIVE-OID-IRI", TypeKind::RelativeOidIri)]
    #[case("DATE-TIME", TypeKind::DateTime)]
    #[case("UTF8String", TypeKind::CharacterString(StringKind::Utf8))]
    #[case("T61String", TypeKind::CharacterString(StringKind::T61))]
    #[case("GeneralizedTime", TypeKind::GeneralizedTime)]
    #[case("INSTANCE OF TYPE-IDENTIFIER", TypeKind::InstanceOf(DefinedObjectClass::TypeIdentifier))]
    fn builtin_types(#[case] text: &str, #[case] kind: TypeKind) {
        assert_eq!(parse_type(text).kind, kind);
    }

    #[test]
    fn tagged_types() {
        let ty = parse_type("[APPLICATION 5] IMPLICIT INTEGER");
        assert_eq!(
            ty.kind,
            TypeKind::Tagged {
                tag: Tag {
                    encoding_reference: None,
                    class: Some(TagClass::Application),
                    number: NumberForm::Number(5),
                },
                mode: Some(TagMode::Implicit),
                ty: Box::new(Type::new(TypeKind::Integer(vec![]))),
            }
        );

        let ty = parse_type("[tag-number] BOOLEAN");
        assert!(matches!(
            ty.kind,
            TypeKind::Tagged {
                tag: Tag {
                    number: NumberForm::Defined(_),
                    ..
                },
                mode: None,
                ..
            }
        ));
    }

    #[test]
    fn encoding_prefixed_type() {
        let ty = parse_type("[XER:ATTRIBUTE] [XER:NAME AS \"x\"] INTEGER");
        let TypeKind::EncodingPrefixed {
            encoding_reference,
            instruction,
            ty,
        } = ty.kind
        else {
            panic!("not prefixed");
        };
        assert_eq!(encoding_reference.as_deref(), Some("XER"));
        assert_eq!(instruction, "ATTRIBUTE");
        assert!(matches!(
            &ty.kind,
            TypeKind::EncodingPrefixed { instruction, .. } if instruction == "NAME AS \"x\""
        ));
    }

    #[test]
    fn collections() {
        let ty = parse_type("SEQUENCE SIZE (1..4) OF item INTEGER");
        let TypeKind::SequenceOf(of) = ty.kind else {
            panic!("not a sequence of");
        };
        assert!(matches!(of.constraint, Some(OfConstraint::Size(_))));
        assert_eq!(of.name.as_deref(), Some("item"));

        let ty = parse_type("SET (SIZE (2)) OF BOOLEAN");
        let TypeKind::SetOf(of) = ty.kind else {
            panic!("not a set of");
        };
        assert!(matches!(of.constraint, Some(OfConstraint::Constraint(_))));
        assert_eq!(of.name, None);
    }

    #[test]
    fn selection_and_object_fields() {
        let ty = parse_type("alt < Choice-Type");
        assert!(matches!(ty.kind, TypeKind::Selection { .. }));

        let ty = parse_type("TYPE-IDENTIFIER.&Type");
        assert_eq!(
            ty.kind,
            TypeKind::ObjectClassField {
                class: DefinedObjectClass::TypeIdentifier,
                field: vec!["&Type".into()],
            }
        );

        let ty = parse_type("object.&Type");
        assert!(matches!(
            ty.kind,
            TypeKind::FromObject {
                objects: ReferencedObjects::Object(_),
                ..
            }
        ));
    }

    #[rstest]
    #[case("INSTANCE OF foo", "foo")]
    #[case("INSTANCE OF Foo", "Foo")]
    #[case("INSTANCE OF Other.foo", "foo")]
    fn class_references_must_be_upper_case(#[case] text: &str, #[case] name: &str) {
        let source = format!("M DEFINITIONS ::= BEGIN\nT ::= {text}\nU ::= INSTANCE OF MY-CLASS\nEND");
        let (ast, diagnostics) = parse(&source);
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Disambiguation);
        assert_eq!(&source[diagnostics[0].location.clone()], name);

        let names: Vec<_> = ast.modules[0].assignments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["U"]);
    }

    #[test]
    fn constraints_repeat() {
        let ty = parse_type("INTEGER (0..10) (1..5)");
        assert_eq!(ty.constraints.len(), 2);
    }
}
