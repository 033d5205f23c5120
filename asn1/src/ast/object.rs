//! Information object classes, objects and object sets

use super::{ElementSetSpecs, Reference, ReferencedObjects, Type, Value};

/// `&a.&b`, a chain of primitive field names including the `&`
pub type FieldName = Vec<String>;

/// `{ ElementSetSpecs }` with values as elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet(pub ElementSetSpecs);

/// `{ ObjectSetSpec }` with objects as elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSet(pub ElementSetSpecs);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectClass {
    Defined(DefinedObjectClass),
    Definition(ObjectClassDefn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinedObjectClass {
    TypeIdentifier,
    AbstractSyntax,

    /// A possibly parameterized or module qualified class reference
    Reference(Reference),
}

/// `CLASS { ... } WITH SYNTAX { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectClassDefn {
    pub fields: Vec<FieldSpec>,
    pub syntax: Option<Vec<TokenOrGroupSpec>>,
}

impl ObjectClassDefn {
    /// Find a field by its name, including the `&`
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The class `TYPE-IDENTIFIER` as defined in X.681 annex A
    pub fn type_identifier() -> Self {
        ObjectClassDefn {
            fields: vec![
                FieldSpec {
                    name: "&id".into(),
                    kind: FieldSpecKind::FixedTypeValue {
                        ty: Type::new(super::TypeKind::ObjectIdentifier),
                        unique: true,
                        optionality: None,
                    },
                },
                FieldSpec {
                    name: "&Type".into(),
                    kind: FieldSpecKind::Type { optionality: None },
                },
            ],
            syntax: Some(vec![
                TokenOrGroupSpec::Field("&Type".into()),
                TokenOrGroupSpec::Literal(Literal::Word("IDENTIFIED".into())),
                TokenOrGroupSpec::Literal(Literal::Word("BY".into())),
                TokenOrGroupSpec::Field("&id".into()),
            ]),
        }
    }

    /// The class `ABSTRACT-SYNTAX` as defined in X.681 annex B
    pub fn abstract_syntax() -> Self {
        let mut class = Self::type_identifier();
        class.fields.push(FieldSpec {
            name: "&property".into(),
            kind: FieldSpecKind::FixedTypeValue {
                ty: Type::new(super::TypeKind::BitString(vec![super::NamedNumber {
                    name: "handles-invalid-encodings".into(),
                    value: super::NumberForm::Number(0),
                }])),
                unique: false,
                optionality: Some(Optionality::Default(Value::IdentifierList(vec![]))),
            },
        });
        if let Some(syntax) = &mut class.syntax {
            syntax.push(TokenOrGroupSpec::Group(vec![
                TokenOrGroupSpec::Literal(Literal::Word("HAS".into())),
                TokenOrGroupSpec::Literal(Literal::Word("PROPERTY".into())),
                TokenOrGroupSpec::Field("&property".into()),
            ]));
        }
        class
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name of the field including the `&`
    pub name: String,
    pub kind: FieldSpecKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpecKind {
    /// `&Type`
    Type { optionality: Option<Optionality<Type>> },

    /// `&value INTEGER UNIQUE`
    FixedTypeValue {
        ty: Type,
        unique: bool,
        optionality: Option<Optionality<Value>>,
    },

    /// `&value &Type`
    VariableTypeValue {
        field: FieldName,
        optionality: Option<Optionality<Value>>,
    },

    /// `&Values INTEGER`
    FixedTypeValueSet {
        ty: Type,
        optionality: Option<Optionality<ValueSet>>,
    },

    /// `&Values &Type`
    VariableTypeValueSet {
        field: FieldName,
        optionality: Option<Optionality<ValueSet>>,
    },

    /// `&object OTHER-CLASS`
    Object {
        class: DefinedObjectClass,
        optionality: Option<Optionality<Object>>,
    },

    /// `&Objects OTHER-CLASS`
    ObjectSet {
        class: DefinedObjectClass,
        optionality: Option<Optionality<ObjectSet>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optionality<T> {
    Optional,
    Default(T),
}

/// An item of a `WITH SYNTAX` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOrGroupSpec {
    Literal(Literal),

    /// A field setting slot, the field name includes the `&`
    Field(String),

    /// `[ ... ]` optional group
    Group(Vec<TokenOrGroupSpec>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Word(String),
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// A possibly parameterized or module qualified object reference
    Defined(Reference),

    /// `{ &id 5, &Type INTEGER }`
    DefaultSyntax(Vec<FieldSetting>),

    /// `{ ID 5 TYPE INTEGER }`, matched against the class `WITH SYNTAX`
    DefinedSyntax(Vec<DefinedSyntaxToken>),

    /// `object.&object`
    FromObject {
        objects: ReferencedObjects,
        field: FieldName,
    },
}

impl Object {
    /// All field settings of an object written in either syntax.  Settings of
    /// objects whose class was not available have no field name.
    pub fn settings(&self) -> Vec<(Option<&str>, &Setting)> {
        match self {
            Object::DefaultSyntax(settings) => settings
                .iter()
                .map(|s| (Some(s.field.as_str()), &s.setting))
                .collect(),
            Object::DefinedSyntax(tokens) => tokens
                .iter()
                .filter_map(|t| match t {
                    DefinedSyntaxToken::Setting { field, setting } => {
                        Some((field.as_deref(), setting))
                    }
                    DefinedSyntaxToken::Literal(_) => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// The setting bound to a field, if any
    pub fn setting(&self, field: &str) -> Option<&Setting> {
        self.settings()
            .into_iter()
            .find(|(name, _)| *name == Some(field))
            .map(|(_, setting)| setting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSetting {
    pub field: String,
    pub setting: Setting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinedSyntaxToken {
    Literal(Literal),
    Setting {
        field: Option<String>,
        setting: Setting,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Type(Type),
    Value(Value),
    ValueSet(ValueSet),
    Object(Object),
    ObjectSet(ObjectSet),
}
