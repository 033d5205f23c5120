//! Types and values, the two halves of most ASN.1 definitions

use super::{Constraint, DefinedObjectClass, FieldName, Object, ObjectSet, ValueSet};

/// A type with any number of trailing constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub kind: TypeKind,
    pub constraints: Vec<Constraint>,
}

impl Type {
    /// An unconstrained type
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            constraints: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Boolean,
    Integer(Vec<NamedNumber>),
    Enumerated(Enumerations),
    Real,
    BitString(Vec<NamedNumber>),
    OctetString,
    Null,
    Sequence(ComponentTypeLists),
    SequenceOf(Box<CollectionOf>),
    Set(ComponentTypeLists),
    SetOf(Box<CollectionOf>),
    Choice(AlternativeTypeLists),
    ObjectIdentifier,
    RelativeOid,
    OidIri,
    RelativeOidIri,
    CharacterString(StringKind),
    UnrestrictedCharacterString,
    EmbeddedPdv,
    External,
    InstanceOf(DefinedObjectClass),
    Time,
    Date,
    TimeOfDay,
    DateTime,
    Duration,
    GeneralizedTime,
    UtcTime,
    ObjectDescriptor,

    /// `[APPLICATION 5] IMPLICIT Type`
    Tagged {
        tag: Tag,
        mode: Option<TagMode>,
        ty: Box<Type>,
    },

    /// `[XER:ATTRIBUTE] Type`, the instruction is kept as written
    EncodingPrefixed {
        encoding_reference: Option<String>,
        instruction: String,
        ty: Box<Type>,
    },

    /// `CLASS-NAME.&field`, an open type when the field is a type field
    ObjectClassField {
        class: DefinedObjectClass,
        field: FieldName,
    },

    /// `object.&Type` or `ObjectSet.&Type`
    FromObject {
        objects: ReferencedObjects,
        field: FieldName,
    },

    /// `alternative < Type`
    Selection { alternative: String, ty: Box<Type> },

    /// A reference to a type defined elsewhere
    Referenced(Reference),
}

/// The 13 restricted character string types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Bmp,
    General,
    Graphic,
    Ia5,
    Iso646,
    Numeric,
    Printable,
    Teletex,
    T61,
    Universal,
    Utf8,
    Videotex,
    Visible,
}

/// Element of `SEQUENCE OF` or `SET OF`, with an optional constraint between
/// the keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOf {
    pub constraint: Option<OfConstraint>,
    pub name: Option<String>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfConstraint {
    /// `SEQUENCE SIZE (1..4) OF`
    Size(Constraint),

    /// `SEQUENCE (SIZE (1..4)) OF`
    Constraint(Constraint),
}

/// `a(5)` or `b(Module.value)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedNumber {
    pub name: String,
    pub value: NumberForm,
}

/// Either a literal number or a reference to a defined integer value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberForm {
    Number(i128),
    Defined(Reference),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerations {
    pub root: Vec<EnumerationItem>,
    pub extension: Option<EnumerationExtension>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationExtension {
    pub exception: Option<ExceptionIdentification>,
    pub additions: Vec<EnumerationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationItem {
    pub name: String,
    pub value: Option<NumberForm>,
}

/// Members of a `SEQUENCE` or `SET`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentTypeLists {
    pub root: Vec<ComponentType>,
    pub extension: Option<ComponentExtension>,

    /// Root components after a second extension marker
    pub trailing_root: Vec<ComponentType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentExtension {
    pub exception: Option<ExceptionIdentification>,
    pub additions: Vec<ExtensionAddition<ComponentType>>,

    /// The extension is closed with a second `...`
    pub end_marker: bool,
}

/// A component of an extension, possibly inside a `[[ ]]` version group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionAddition<T> {
    Single(T),
    Group { version: Option<String>, items: Vec<T> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentType {
    Named {
        name: String,
        ty: Type,
        presence: Option<ComponentPresence>,
    },
    ComponentsOf(Type),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentPresence {
    Optional,
    Default(Value),
}

/// Alternatives of a `CHOICE`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlternativeTypeLists {
    pub root: Vec<NamedType>,
    pub extension: Option<AlternativeExtension>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeExtension {
    pub exception: Option<ExceptionIdentification>,
    pub additions: Vec<ExtensionAddition<NamedType>>,
    pub end_marker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub ty: Type,
}

/// `! 5`, `! value` or `! INTEGER : 5`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionIdentification {
    Number(i128),
    Defined(Reference),
    TypeValue(Box<Type>, Box<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub encoding_reference: Option<String>,
    pub class: Option<TagClass>,
    pub number: NumberForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    Implicit,
    Explicit,
}

/// A reference to a definition, optionally module qualified and with actual
/// parameters.  Used for types, values, object sets and objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub module: Option<String>,
    pub name: String,
    pub parameters: Option<Vec<ActualParameter>>,
}

impl Reference {
    /// A plain local reference
    pub fn local(name: impl Into<String>) -> Self {
        Reference {
            module: None,
            name: name.into(),
            parameters: None,
        }
    }
}

/// A parameter given at the use site of a parameterized definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActualParameter {
    Type(Type),
    Value(Value),
    ValueSet(ValueSet),
    Class(DefinedObjectClass),
    Object(Object),
    ObjectSet(ObjectSet),
}

/// The object or object set a field is selected from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferencedObjects {
    Object(Reference),
    ObjectSet(Reference),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Integer(i128),

    /// An integer too large for `i128`, kept as written with its sign
    LargeInteger(String),

    /// A real number kept as written, e.g. `-1.5e10`
    Real(String),
    SpecialReal(SpecialReal),
    Null,

    /// Contents of a `'0101'B` literal without quotes or whitespace
    BString(String),

    /// Contents of a `'AF'H` literal without quotes or whitespace
    HString(String),

    /// A character string with `""` escapes resolved
    CString(String),

    /// `{ a, b }` named bits
    IdentifierList(Vec<String>),

    /// `{ "abc", value }`
    CharacterStringList(Vec<Value>),

    Quadruple {
        group: i128,
        plane: i128,
        row: i128,
        cell: i128,
    },

    Tuple {
        column: i128,
        row: i128,
    },

    /// `CONTAINING Value` for bit and octet strings
    Containing(Box<Value>),

    /// Sequence, set and named sequence-of values
    Sequence(Vec<NamedValue>),

    /// Sequence-of and set-of values
    SequenceOf(Vec<Value>),

    /// `alternative : Value`
    Choice { alternative: String, value: Box<Value> },

    ObjectIdentifier(Vec<ObjIdComponent>),

    /// `"/ISO/Registration_Authority"`, split into arcs
    Iri(Vec<String>),

    /// An identifier that is not a known value reference, so a named number,
    /// enumeration item or a reference resolved by a later stage
    Identifier(String),

    Referenced(Reference),

    /// `object.&value`
    FromObject {
        objects: ReferencedObjects,
        field: FieldName,
    },

    /// `Type : Value`, the value of an open type
    OpenType { ty: Box<Type>, value: Box<Value> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialReal {
    PlusInfinity,
    MinusInfinity,
    NotANumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

/// A single arc of an object identifier value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjIdComponent {
    Name(String),
    Number(String),
    NameAndNumber(String, String),

    /// `name(DefinedValue)`
    NameAndDefined(String, Reference),
    Defined(Reference),
}
