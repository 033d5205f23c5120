use super::{ExceptionIdentification, Object, Reference, ReferencedObjects, Type, Value};
use super::{DefinedObjectClass, FieldName};

/// `( ConstraintSpec ! Exception )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub spec: ConstraintSpec,
    pub exception: Option<ExceptionIdentification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintSpec {
    Subtype(ElementSetSpecs),
    UserDefined(Vec<UserDefinedParameter>),
    Table(TableConstraint),

    /// `CONTAINING Type ENCODED BY value`, at least one part is present
    Contents {
        containing: Option<Type>,
        encoded_by: Option<Value>,
    },
}

/// A root element set with optional extension.  Only object sets may have an
/// empty root (`{ ... }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSetSpecs {
    pub root: Option<ElementSetSpec>,
    pub extensible: bool,
    pub additional: Option<ElementSetSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSetSpec {
    /// Intersections joined by `|` or `UNION`
    Unions(Vec<Intersection>),

    /// `ALL EXCEPT Elements`
    AllExcept(Box<Elements>),
}

/// Elements joined by `^` or `INTERSECTION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection(pub Vec<IntersectionElement>);

/// `Elements EXCEPT Elements`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionElement {
    pub elements: Elements,
    pub except: Option<Elements>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elements {
    Subtype(SubtypeElement),
    Object(ObjectSetElement),

    /// `( ElementSetSpec )`
    Nested(Box<ElementSetSpec>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtypeElement {
    SingleValue(Value),

    /// `INCLUDES Type`, or a bare type or value set reference
    ContainedSubtype { includes: bool, ty: Type },

    ValueRange { lower: RangeEndpoint, upper: RangeEndpoint },

    /// `FROM ( ... )`
    PermittedAlphabet(Box<Constraint>),

    /// `SIZE ( ... )`
    Size(Box<Constraint>),

    /// `WITH COMPONENT ( ... )`
    SingleTypeConstraint(Box<Constraint>),

    /// `WITH COMPONENTS { ..., a (1..5) PRESENT }`
    MultipleTypeConstraints {
        partial: bool,
        components: Vec<NamedConstraint>,
    },

    /// `PATTERN "[a-z]+"`
    Pattern(Value),

    /// `SETTINGS "..."`
    Settings(String),
}

/// One end of a value range, open when written with `<`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEndpoint {
    pub value: EndpointValue,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointValue {
    Min,
    Max,
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedConstraint {
    pub name: String,
    pub constraint: Option<Constraint>,
    pub presence: Option<PresenceConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceConstraint {
    Present,
    Absent,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectSetElement {
    Object(Object),

    /// A possibly parameterized object set reference
    ObjectSet(Reference),

    /// `object.&ObjectSet` or `ObjectSet.&objects`
    FromObjects {
        objects: ReferencedObjects,
        field: FieldName,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    /// `({ObjectSet})`
    Simple(super::ObjectSet),

    /// `({ObjectSet}{@component})`
    ComponentRelation {
        set: Reference,
        at: Vec<AtNotation>,
    },
}

/// `@a.b`, `@.a`, `@..a`.  `level` is the number of dots after `@`: zero refers
/// to the outermost enclosing type, one to the same level, and each further dot
/// one level up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtNotation {
    pub level: usize,
    pub components: Vec<String>,
}

/// A parameter of `CONSTRAINED BY { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDefinedParameter {
    /// `Type : Value`
    Value(Type, Value),

    /// `CLASS : object`
    Object(DefinedObjectClass, Object),

    /// A type, class or object set
    Type(Type),
    Class(DefinedObjectClass),
    ObjectSet(Reference),
}
