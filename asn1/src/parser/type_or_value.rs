//! Types, values and information objects.  Values and objects are parsed
//! with the type or class that governs them, so that notation which is the
//! same for several kinds of value (mostly `{ ... }`) is read correctly.

mod composite_ty;
mod object;
mod syntax;
mod ty;
mod value;

use crate::{
    ast::{
        ComponentType, DefinedObjectClass, ExtensionAddition, FieldSpec, FieldSpecKind,
        ObjectClass, ObjectClassDefn, Type, TypeKind,
    },
    token::TokenKind,
    util::NameCase,
};

use super::Parser;

/// Maximum number of references followed while looking for the definition
/// of a type or class, so reference cycles terminate
const MAX_HOPS: usize = 16;

impl<'a> Parser<'a> {
    /// Can the tokens `n` places ahead start a type
    pub(super) fn starts_type(&self, n: usize) -> bool {
        let (n, qualified) = if self.is_module_prefix(n) {
            (n + 2, true)
        } else {
            (n, false)
        };
        let tok = self.token(n);

        match tok.kind {
            TokenKind::TypeOrModuleRef => true,
            TokenKind::ObjectClassRef => {
                !self.is_class_name(tok.value) || self.at_field_access(n + 1)
            }
            TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax => {
                !qualified && self.at_field_access(n + 1)
            }
            TokenKind::ValueRefOrIdent => {
                self.kind(n + 1) == TokenKind::Dot && self.kind(n + 2) == TokenKind::TypeField
            }
            kind => !qualified && kind.is_builtin_type_start(),
        }
    }

    /// Follow references, tags and class fields with a fixed type to find the
    /// type that decides the notation of a value
    pub(super) fn resolve_type(&self, ty: &Type) -> Type {
        self.resolve(ty, true)
    }

    /// Follow references and tags, stopping at class field types
    pub(super) fn resolve_reference(&self, ty: &Type) -> Type {
        self.resolve(ty, false)
    }

    fn resolve(&self, ty: &Type, through_fields: bool) -> Type {
        let mut current = ty.clone();

        for _ in 0..MAX_HOPS {
            let next = match &current.kind {
                TypeKind::Referenced(reference)
                    if reference.module.is_none() && !self.dummies.contains_key(&reference.name) =>
                {
                    self.types.get(&reference.name).cloned()
                }
                TypeKind::Tagged { ty, .. } | TypeKind::EncodingPrefixed { ty, .. } => {
                    Some((**ty).clone())
                }
                TypeKind::ObjectClassField { class, field } if through_fields => {
                    match self.field_spec(class, field).map(|f| f.kind) {
                        Some(
                            FieldSpecKind::FixedTypeValue { ty, .. }
                            | FieldSpecKind::FixedTypeValueSet { ty, .. },
                        ) => Some(ty),
                        _ => None,
                    }
                }
                _ => None,
            };

            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        current
    }

    /// Find the definition of an object class, following class references
    /// within the module
    pub(super) fn class_definition(&self, class: &DefinedObjectClass) -> Option<ObjectClassDefn> {
        let mut current = class.clone();

        for _ in 0..MAX_HOPS {
            let reference = match current {
                DefinedObjectClass::TypeIdentifier => {
                    return Some(ObjectClassDefn::type_identifier())
                }
                DefinedObjectClass::AbstractSyntax => {
                    return Some(ObjectClassDefn::abstract_syntax())
                }
                DefinedObjectClass::Reference(reference) => reference,
            };

            if reference.module.is_some() {
                return None;
            }

            match self.classes.get(&reference.name)? {
                ObjectClass::Definition(defn) => return Some(defn.clone()),
                ObjectClass::Defined(next) => current = next.clone(),
            }
        }

        None
    }

    /// Find the specification of a field, following object and object set
    /// fields for a chain of field names
    pub(super) fn field_spec(&self, class: &DefinedObjectClass, field: &[String]) -> Option<FieldSpec> {
        let (first, rest) = field.split_first()?;
        let spec = self.class_definition(class)?.field(first)?.clone();

        if rest.is_empty() {
            return Some(spec);
        }

        match &spec.kind {
            FieldSpecKind::Object { class, .. } | FieldSpecKind::ObjectSet { class, .. } => {
                self.field_spec(class, rest)
            }
            _ => None,
        }
    }

    /// Is the type an open type, whose values are written `Type : Value`.  A
    /// field of a class that is not known is an open type when its name looks
    /// like a type field.
    pub(super) fn is_open_type(&self, ty: &Type) -> bool {
        let TypeKind::ObjectClassField { class, field } = self.resolve_reference(ty).kind else {
            return false;
        };

        match self.field_spec(&class, &field) {
            Some(spec) => matches!(spec.kind, FieldSpecKind::Type { .. }),
            None => {
                self.class_definition(&class).is_none()
                    && field.last().is_some_and(|f| NameCase::of(f).is_upper())
            }
        }
    }

    /// The type of a named component of a sequence, set or choice
    pub(super) fn component_type(&self, ty: &Type, name: &str) -> Option<Type> {
        let resolved = self.resolve_type(ty);
        match resolved.kind {
            TypeKind::Sequence(lists) | TypeKind::Set(lists) => {
                let extension = lists.extension.iter().flat_map(|e| &e.additions);
                lists
                    .root
                    .iter()
                    .chain(lists.trailing_root.iter())
                    .chain(extension.flat_map(addition_items))
                    .find_map(|c| match c {
                        ComponentType::Named { name: n, ty, .. } if n == name => Some(ty.clone()),
                        _ => None,
                    })
            }
            TypeKind::Choice(lists) => {
                let extension = lists.extension.iter().flat_map(|e| &e.additions);
                lists
                    .root
                    .iter()
                    .chain(extension.flat_map(addition_items))
                    .find(|alt| alt.name == name)
                    .map(|alt| alt.ty.clone())
            }
            _ => None,
        }
    }

    /// The element type of a sequence of or set of type
    pub(super) fn element_type(&self, ty: &Type) -> Option<Type> {
        match self.resolve_type(ty).kind {
            TypeKind::SequenceOf(of) | TypeKind::SetOf(of) => Some(of.ty),
            _ => None,
        }
    }
}

/// Every item of an extension addition, whether or not it is in a group
fn addition_items<T>(addition: &ExtensionAddition<T>) -> &[T] {
    match addition {
        ExtensionAddition::Single(item) => std::slice::from_ref(item),
        ExtensionAddition::Group { items, .. } => items,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::*,
        compiler::{Features, parse},
        parser::Parser,
    };

    #[test]
    fn open_types_are_values_with_types() {
        let (ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            CLS ::= CLASS { &id INTEGER, &Type }
            T ::= SEQUENCE { id CLS.&id, val CLS.&Type }
            v T ::= { id 5, val BOOLEAN : TRUE }
            END",
        );
        assert_eq!(diagnostics, vec![]);

        let AssignmentKind::Value { value, .. } = &ast.modules[0].assignments[2].kind else {
            panic!("not a value");
        };
        assert_eq!(
            value,
            &Value::Sequence(vec![
                NamedValue {
                    name: "id".into(),
                    value: Value::Integer(5)
                },
                NamedValue {
                    name: "val".into(),
                    value: Value::OpenType {
                        ty: Box::new(Type::new(TypeKind::Boolean)),
                        value: Box::new(Value::Boolean(true)),
                    }
                },
            ])
        );
    }

    #[test]
    fn open_type_values_need_their_type() {
        let (_, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            CLS ::= CLASS { &Type }
            v CLS.&Type ::= TRUE
            END",
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn reference_cycles_terminate() {
        let mut parser = Parser::new("", Features::default());
        let a = Type::new(TypeKind::Referenced(Reference::local("A")));
        let b = Type::new(TypeKind::Referenced(Reference::local("B")));
        parser.types.insert("A".into(), b.clone());
        parser.types.insert("B".into(), a.clone());

        let resolved = parser.resolve_type(&a);
        assert!(matches!(resolved.kind, TypeKind::Referenced(_)));
    }

    #[test]
    fn builtin_classes_have_fields() {
        let parser = Parser::new("", Features::default());
        let spec = parser
            .field_spec(&DefinedObjectClass::TypeIdentifier, &["&id".to_string()])
            .unwrap();
        assert!(matches!(
            spec.kind,
            FieldSpecKind::FixedTypeValue { unique: true, .. }
        ));
        assert!(parser
            .field_spec(&DefinedObjectClass::AbstractSyntax, &["&property".to_string()])
            .is_some());
    }
}
