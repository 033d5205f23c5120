//! Constraints, and the element set notation shared by constraints, value
//! sets and object sets

use crate::{
    ast::{
        AtNotation, Constraint, ConstraintSpec, DefinedObjectClass, ElementSetSpec,
        ElementSetSpecs, Elements, EndpointValue, Intersection, IntersectionElement,
        NamedConstraint, Object, ObjectSet, ObjectSetElement, PresenceConstraint, RangeEndpoint,
        Reference, ReferencedObjects, SubtypeElement, TableConstraint, Type, TypeKind,
        UserDefinedParameter,
    },
    analysis::{ParameterKind, SymbolKind},
    token::TokenKind,
};

use super::{module::unquote, Parser, ParserError, Result};

/// What the elements of an element set are
#[derive(Debug, Clone, Copy)]
pub(super) enum ElementMode<'t> {
    /// Values of a type, or subtype elements of a constraint
    Value(Option<&'t Type>),

    /// Objects of a class
    Object(Option<&'t DefinedObjectClass>),
}

/// An element set with a single element and no extension
pub(super) fn single_element(elements: Elements) -> ElementSetSpecs {
    ElementSetSpecs {
        root: Some(ElementSetSpec::Unions(vec![Intersection(vec![
            IntersectionElement {
                elements,
                except: None,
            },
        ])])),
        extensible: false,
        additional: None,
    }
}

/// The reference of an object set written as `{ Reference }`
fn single_reference(set: &ObjectSet) -> Option<Reference> {
    let ElementSetSpecs {
        root: Some(ElementSetSpec::Unions(unions)),
        extensible: false,
        additional: None,
    } = &set.0
    else {
        return None;
    };

    match unions.as_slice() {
        [Intersection(items)] => match items.as_slice() {
            [IntersectionElement {
                elements: Elements::Object(ObjectSetElement::ObjectSet(reference)),
                except: None,
            }] => Some(reference.clone()),
            _ => None,
        },
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Parse a constraint on a type, the type decides how values in the
    /// constraint are read
    /// ```bnf
    /// Constraint ::= "(" ConstraintSpec ExceptionSpec ")"
    /// ```
    pub(super) fn constraint(&mut self, hint: Option<&Type>) -> Result<Constraint> {
        self.nested(|p| {
            p.next(&[TokenKind::LeftParen])?;
            let spec = p.constraint_spec(hint)?;
            let exception = p.exception_spec()?;
            p.next(&[TokenKind::RightParen])?;

            Ok(Constraint { spec, exception })
        })
    }

    fn constraint_spec(&mut self, hint: Option<&Type>) -> Result<ConstraintSpec> {
        if self.eat(TokenKind::KwConstrained).is_some() {
            self.next(&[TokenKind::KwBy])?;
            return Ok(ConstraintSpec::UserDefined(self.user_defined_parameters()?));
        }

        if self.at(TokenKind::KwContaining) || self.at(TokenKind::KwEncoded) {
            return self.contents_constraint();
        }

        let class = hint.and_then(|ty| match self.resolve_reference(ty).kind {
            TypeKind::ObjectClassField { class, .. } | TypeKind::InstanceOf(class) => Some(class),
            _ => None,
        });
        if let Some(class) = class {
            if self.at(TokenKind::LeftCurly) {
                return Ok(ConstraintSpec::Table(self.table_constraint(&class)?));
            }
        }

        Ok(ConstraintSpec::Subtype(
            self.element_set_specs(ElementMode::Value(hint))?,
        ))
    }

    /// `CONTAINING Type`, `ENCODED BY value` or both
    fn contents_constraint(&mut self) -> Result<ConstraintSpec> {
        let containing = if self.eat(TokenKind::KwContaining).is_some() {
            Some(self.ty()?)
        } else {
            None
        };

        let encoded_by = if self.eat(TokenKind::KwEncoded).is_some() {
            self.next(&[TokenKind::KwBy])?;
            let oid = Type::new(TypeKind::ObjectIdentifier);
            Some(self.value(Some(&oid))?)
        } else {
            None
        };

        Ok(ConstraintSpec::Contents {
            containing,
            encoded_by,
        })
    }

    /// `{ObjectSet}` or `{ObjectSet}{@a, @.b}`
    fn table_constraint(&mut self, class: &DefinedObjectClass) -> Result<TableConstraint> {
        let start = self.token(0).offset;
        let set = self.braced_object_set(Some(class))?;

        if !(self.at(TokenKind::LeftCurly) && self.kind(1) == TokenKind::At) {
            return Ok(TableConstraint::Simple(set));
        }

        let Some(reference) = single_reference(&set) else {
            return Err(ParserError::Structure {
                message: "a component relation constraint must name a single object set"
                    .to_string(),
                span: start..self.token(0).offset,
            });
        };

        self.next(&[TokenKind::LeftCurly])?;
        let mut at = vec![];
        loop {
            at.push(self.at_notation()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(TableConstraint::ComponentRelation { set: reference, at })
    }

    /// `@a.b`, `@.a` or `@..a`, where `..` and `...` are single tokens
    fn at_notation(&mut self) -> Result<AtNotation> {
        self.next(&[TokenKind::At])?;

        let mut level = 0;
        loop {
            if self.eat(TokenKind::Dot).is_some() {
                level += 1;
            } else if self.eat(TokenKind::Range).is_some() {
                level += 2;
            } else if self.eat(TokenKind::Ellipsis).is_some() {
                level += 3;
            } else {
                break;
            }
        }

        let mut components = vec![self.next(&[TokenKind::ValueRefOrIdent])?.value.to_string()];
        while self.eat(TokenKind::Dot).is_some() {
            components.push(self.next(&[TokenKind::ValueRefOrIdent])?.value.to_string());
        }

        Ok(AtNotation { level, components })
    }

    /// `{ Type, CLASS, INTEGER : 5, Objects }` after `CONSTRAINED BY`
    fn user_defined_parameters(&mut self) -> Result<Vec<UserDefinedParameter>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut parameters = vec![];
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(parameters);
        }

        loop {
            parameters.push(self.user_defined_parameter()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(parameters)
    }

    fn user_defined_parameter(&mut self) -> Result<UserDefinedParameter> {
        let after = if self.is_module_prefix(0) { 3 } else { 1 };

        if self.is_class_start(0) && !self.at_field_access(after) {
            let class = self.defined_object_class()?;
            if self.eat(TokenKind::Colon).is_some() {
                let object = self.object(Some(&class))?;
                return Ok(UserDefinedParameter::Object(class, object));
            }
            return Ok(UserDefinedParameter::Class(class));
        }

        let tok = self.token(0);
        if tok.kind.is_uppercase_ref() && self.is_object_set_name(tok.value) {
            let reference = self.reference(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;
            return Ok(UserDefinedParameter::ObjectSet(reference));
        }

        let ty = self.ty()?;
        if self.eat(TokenKind::Colon).is_some() {
            let value = self.value(Some(&ty))?;
            return Ok(UserDefinedParameter::Value(ty, value));
        }
        Ok(UserDefinedParameter::Type(ty))
    }

    fn is_object_set_name(&self, name: &str) -> bool {
        match self.dummies.get(name) {
            Some(kind) => *kind == ParameterKind::ObjectSet,
            None => self.env.kind(name) == Some(SymbolKind::ObjectSet),
        }
    }

    /// Parse a root element set with an optional extension marker and
    /// additional elements
    /// ```bnf
    /// ElementSetSpecs ::=
    ///     RootElementSetSpec
    ///   | RootElementSetSpec "," "..."
    ///   | RootElementSetSpec "," "..." "," AdditionalElementSetSpec
    /// ```
    /// Object sets may also have an empty root, `{ ... }`.
    pub(super) fn element_set_specs(&mut self, mode: ElementMode) -> Result<ElementSetSpecs> {
        if let Some(tok) = self.eat(TokenKind::Ellipsis) {
            if let ElementMode::Value(_) = mode {
                return Err(ParserError::Structure {
                    message: "a value set or constraint must have root elements".to_string(),
                    span: tok.offset..tok.end(),
                });
            }

            let additional = if self.eat(TokenKind::Comma).is_some() {
                Some(self.element_set_spec(mode)?)
            } else {
                None
            };
            return Ok(ElementSetSpecs {
                root: None,
                extensible: true,
                additional,
            });
        }

        let root = self.element_set_spec(mode)?;
        let mut specs = ElementSetSpecs {
            root: Some(root),
            extensible: false,
            additional: None,
        };

        if self.at(TokenKind::Comma) && self.kind(1) == TokenKind::Ellipsis {
            self.bump();
            self.bump();
            specs.extensible = true;

            if self.eat(TokenKind::Comma).is_some() {
                specs.additional = Some(self.element_set_spec(mode)?);
            }
        }

        Ok(specs)
    }

    /// `ALL EXCEPT Elements`, or unions of intersections
    fn element_set_spec(&mut self, mode: ElementMode) -> Result<ElementSetSpec> {
        if self.eat(TokenKind::KwAll).is_some() {
            self.next(&[TokenKind::KwExcept])?;
            return Ok(ElementSetSpec::AllExcept(Box::new(self.elements(mode)?)));
        }

        let mut unions = vec![self.intersection(mode)?];
        while self.eat(TokenKind::Pipe).is_some() || self.eat(TokenKind::KwUnion).is_some() {
            unions.push(self.intersection(mode)?);
        }

        Ok(ElementSetSpec::Unions(unions))
    }

    fn intersection(&mut self, mode: ElementMode) -> Result<Intersection> {
        let mut items = vec![self.intersection_element(mode)?];
        while self.eat(TokenKind::Caret).is_some() || self.eat(TokenKind::KwIntersection).is_some()
        {
            items.push(self.intersection_element(mode)?);
        }

        Ok(Intersection(items))
    }

    fn intersection_element(&mut self, mode: ElementMode) -> Result<IntersectionElement> {
        let elements = self.elements(mode)?;
        let except = if self.eat(TokenKind::KwExcept).is_some() {
            Some(self.elements(mode)?)
        } else {
            None
        };

        Ok(IntersectionElement { elements, except })
    }

    fn elements(&mut self, mode: ElementMode) -> Result<Elements> {
        self.nested(|p| {
            if p.eat(TokenKind::LeftParen).is_some() {
                let spec = p.element_set_spec(mode)?;
                p.next(&[TokenKind::RightParen])?;
                return Ok(Elements::Nested(Box::new(spec)));
            }

            match mode {
                ElementMode::Value(hint) => Ok(Elements::Subtype(p.subtype_element(hint)?)),
                ElementMode::Object(class) => Ok(Elements::Object(p.object_set_element(class)?)),
            }
        })
    }

    fn subtype_element(&mut self, hint: Option<&Type>) -> Result<SubtypeElement> {
        if self.eat(TokenKind::KwSize).is_some() {
            let size = Type::new(TypeKind::Integer(vec![]));
            return Ok(SubtypeElement::Size(Box::new(self.constraint(Some(&size))?)));
        }
        if self.eat(TokenKind::KwFrom).is_some() {
            return Ok(SubtypeElement::PermittedAlphabet(Box::new(
                self.constraint(hint)?,
            )));
        }
        if self.eat(TokenKind::KwPattern).is_some() {
            return Ok(SubtypeElement::Pattern(self.value(None)?));
        }
        if self.eat(TokenKind::KwSettings).is_some() {
            let tok = self.next(&[TokenKind::CString])?;
            return Ok(SubtypeElement::Settings(unquote(tok.value)));
        }
        if self.eat(TokenKind::KwWith).is_some() {
            return self.inner_type_constraints(hint);
        }
        if self.eat(TokenKind::KwIncludes).is_some() {
            return Ok(SubtypeElement::ContainedSubtype {
                includes: true,
                ty: self.ty()?,
            });
        }

        let open = hint.is_some_and(|ty| self.is_open_type(ty));
        if !open && self.kind(0) != TokenKind::KwNull && self.starts_type(0) {
            return Ok(SubtypeElement::ContainedSubtype {
                includes: false,
                ty: self.ty()?,
            });
        }

        let lower = if self.eat(TokenKind::KwMin).is_some() {
            EndpointValue::Min
        } else {
            EndpointValue::Value(self.value(hint)?)
        };
        let lower_open = self.eat(TokenKind::Less).is_some();

        if !self.at(TokenKind::Range) {
            if let (EndpointValue::Value(value), false) = (&lower, lower_open) {
                return Ok(SubtypeElement::SingleValue(value.clone()));
            }
            // `MIN` and `<` are only valid as part of a range
            self.next(&[TokenKind::Range])?;
        }
        self.bump();

        let upper_open = self.eat(TokenKind::Less).is_some();
        let upper = if self.eat(TokenKind::KwMax).is_some() {
            EndpointValue::Max
        } else {
            EndpointValue::Value(self.value(hint)?)
        };

        Ok(SubtypeElement::ValueRange {
            lower: RangeEndpoint {
                value: lower,
                open: lower_open,
            },
            upper: RangeEndpoint {
                value: upper,
                open: upper_open,
            },
        })
    }

    /// `WITH COMPONENT (...)` or `WITH COMPONENTS { ... }`, after `WITH`
    fn inner_type_constraints(&mut self, hint: Option<&Type>) -> Result<SubtypeElement> {
        if self.eat(TokenKind::KwComponent).is_some() {
            let element = hint.and_then(|ty| self.element_type(ty));
            let constraint = self.constraint(element.as_ref())?;
            return Ok(SubtypeElement::SingleTypeConstraint(Box::new(constraint)));
        }

        self.next(&[TokenKind::KwComponents])?;
        self.next(&[TokenKind::LeftCurly])?;

        let partial = if self.eat(TokenKind::Ellipsis).is_some() {
            self.next(&[TokenKind::Comma])?;
            true
        } else {
            false
        };

        let mut components = vec![];
        loop {
            components.push(self.named_constraint(hint)?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(SubtypeElement::MultipleTypeConstraints {
            partial,
            components,
        })
    }

    /// `name (constraint) PRESENT`, both the constraint and presence are
    /// optional
    fn named_constraint(&mut self, hint: Option<&Type>) -> Result<NamedConstraint> {
        let name = self.next(&[TokenKind::ValueRefOrIdent])?;
        let component = hint.and_then(|ty| self.component_type(ty, name.value));

        let constraint = if self.at(TokenKind::LeftParen) {
            Some(self.constraint(component.as_ref())?)
        } else {
            None
        };

        let presence = if self.eat(TokenKind::KwPresent).is_some() {
            Some(PresenceConstraint::Present)
        } else if self.eat(TokenKind::KwAbsent).is_some() {
            Some(PresenceConstraint::Absent)
        } else if self.eat(TokenKind::KwOptional).is_some() {
            Some(PresenceConstraint::Optional)
        } else {
            None
        };

        Ok(NamedConstraint {
            name: name.value.to_string(),
            constraint,
            presence,
        })
    }

    /// An object, object set reference or objects selected from a field
    fn object_set_element(&mut self, class: Option<&DefinedObjectClass>) -> Result<ObjectSetElement> {
        if self.at(TokenKind::LeftCurly) {
            return Ok(ObjectSetElement::Object(self.object(class)?));
        }

        let lower = self.kind(0) == TokenKind::ValueRefOrIdent
            || (self.is_module_prefix(0) && self.kind(2) == TokenKind::ValueRefOrIdent);
        if lower {
            let reference = self.reference(&[TokenKind::ValueRefOrIdent])?;
            if self.at_field_access(0) {
                self.bump();
                return Ok(ObjectSetElement::FromObjects {
                    objects: ReferencedObjects::Object(reference),
                    field: self.field_name()?,
                });
            }
            return Ok(ObjectSetElement::Object(Object::Defined(reference)));
        }

        if self.kind(0).is_uppercase_ref() {
            let reference =
                self.reference(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;
            if self.at_field_access(0) {
                self.bump();
                return Ok(ObjectSetElement::FromObjects {
                    objects: ReferencedObjects::ObjectSet(reference),
                    field: self.field_name()?,
                });
            }
            return Ok(ObjectSetElement::ObjectSet(reference));
        }

        Err(self.expected_item("an object set element"))
    }
}
