//! XML value notation, only used by XML value assignments

use super::SpecialReal;

/// `<Type>value</Type>` or `<Type/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTypedValue {
    /// The element name, a type reference, builtin type keyword or `Module.Type`
    pub name: String,

    /// `None` for an empty element
    pub value: Option<XmlValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// `<true/>`, `<false/>` or the text `true` / `false`
    Boolean(bool),

    Integer(i128),

    /// A real number kept as written
    Real(String),

    /// `INF`, `-INF`, `NaN` or the matching empty elements
    SpecialReal(SpecialReal),

    /// `1.2.840` or `iso.member-body(2)`, with the optional number of each arc
    ObjectIdentifier(Vec<XmlOidArc>),

    /// `/ISO/Registration_Authority`, split into arcs
    Iri(Vec<String>),

    /// Character data that is none of the above, kept as written
    Text(String),

    /// Nested elements, used for sequence, set, choice and list values
    Elements(Vec<XmlTypedValue>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOidArc {
    pub name: Option<String>,
    pub number: Option<String>,
}
