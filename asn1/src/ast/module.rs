use std::ops::Range;

use super::{Object, ObjectClass, ObjectSet, Reference, Type, Value, ValueSet, XmlTypedValue};
use super::{DefinedObjectClass, ObjIdComponent};

/// Root of a parsed source unit, which may contain several modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Asn1 {
    pub modules: Vec<ModuleDefinition>,
}

/// A group of ASN.1 assignments and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    /// Identifier for the module
    pub identifier: ModuleIdentifier,

    /// Name of the default encoding, `XER INSTRUCTIONS`
    pub encoding_reference: Option<String>,

    /// How automatic tagging should be performed
    pub tag_default: Option<TagDefault>,

    /// Is extensibility implied in this module
    pub extensibility_implied: bool,

    /// `None` if there is no `EXPORTS` clause, which exports everything
    pub exports: Option<Exports>,

    /// `None` if there is no `IMPORTS` clause
    pub imports: Option<Vec<SymbolsFromModule>>,

    pub assignments: Vec<Assignment>,

    pub encoding_control: Vec<EncodingControlSection>,

    /// Byte range of the whole module in the source text
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentifier {
    /// Identifier for the module
    pub name: String,

    /// The module's object identifier
    pub oid: Option<Vec<DefinitiveOidComponent>>,

    /// The module's internationalized resource identifier value, without quotes
    pub iri: Option<String>,
}

/// A single component of the object identifier after a module name.  Numbers
/// are not stored as integers as math should not be done to them, they are
/// identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitiveOidComponent {
    Name(String),
    Number(String),
    NameAndNumber(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDefault {
    Automatic,
    Implicit,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exports {
    /// `EXPORTS ALL;`
    All,

    /// `EXPORTS a, B;`, which may be empty
    Symbols(Vec<Symbol>),
}

/// An exported or imported name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,

    /// Written as `Name{}`, a reference to a parameterized assignment
    pub parameterized: bool,
}

/// One `a, b FROM Module` group of an imports list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolsFromModule {
    pub symbols: Vec<Symbol>,
    pub module: GlobalModuleReference,
    pub selection: Option<SelectionOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalModuleReference {
    pub name: String,
    pub assigned_identifier: Option<AssignedIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedIdentifier {
    Oid(Vec<ObjIdComponent>),
    Defined(Reference),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOption {
    Successors,
    Descendants,
}

/// `ENCODING-CONTROL XER ...` section, the instructions are kept as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingControlSection {
    pub encoding_reference: String,
    pub instructions: String,
}

/// A named top level definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,

    /// Dummy references when this is a parameterized assignment
    pub parameters: Option<Vec<Parameter>>,

    pub kind: AssignmentKind,

    /// Byte range of the assignment in the source text
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentKind {
    /// `Name ::= Type`
    Type(Type),

    /// `name Type ::= Value`
    Value { governor: Type, value: Value },

    /// `Name Type ::= { ... }`
    ValueSet { governor: Type, set: ValueSet },

    /// `NAME ::= CLASS { ... }`
    ObjectClass(ObjectClass),

    /// `name CLASS-NAME ::= { ... }`
    Object {
        class: DefinedObjectClass,
        object: Object,
    },

    /// `Name CLASS-NAME ::= { ... }`
    ObjectSet {
        class: DefinedObjectClass,
        set: ObjectSet,
    },

    /// `name ::= <Type>...</Type>`
    XmlValue(XmlTypedValue),
}

impl AssignmentKind {
    /// Human readable name of the assignment kind
    pub fn description(&self) -> &'static str {
        match self {
            AssignmentKind::Type(_) => "type",
            AssignmentKind::Value { .. } => "value",
            AssignmentKind::ValueSet { .. } => "value set",
            AssignmentKind::ObjectClass(_) => "object class",
            AssignmentKind::Object { .. } => "object",
            AssignmentKind::ObjectSet { .. } => "object set",
            AssignmentKind::XmlValue(_) => "XML value",
        }
    }
}

/// A dummy reference in a parameter list, `Governor : dummy` or `Dummy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub governor: Option<ParamGovernor>,
    pub dummy: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamGovernor {
    Type(Type),
    Class(DefinedObjectClass),

    /// Another dummy reference of the same parameter list
    Dummy(String),
}
