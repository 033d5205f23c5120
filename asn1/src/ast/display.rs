//! ASN.1 notation for every node of the tree.  The output is not laid out the
//! way the source was, but parses back into an equal tree.

use std::fmt::{Display, Formatter, Result};

use super::*;

/// Write items separated by `sep`
fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// `{ a, b }`, or `{}` when empty
fn braced<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> Result {
    if items.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    join(f, items, sep)?;
    f.write_str(" }")
}

/// A character string literal with `"` doubled
fn quoted(f: &mut Formatter<'_>, text: &str) -> Result {
    write!(f, "\"{}\"", text.replace('"', "\"\""))
}

/// `...` or `... ! exception`
fn extension_marker(exception: &Option<ExceptionIdentification>) -> String {
    match exception {
        Some(exception) => format!("... ! {exception}"),
        None => "...".to_string(),
    }
}

impl Display for Asn1 {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        join(f, &self.modules, "\n\n")
    }
}

impl Display for ModuleDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} DEFINITIONS", self.identifier)?;
        if let Some(encoding) = &self.encoding_reference {
            write!(f, " {encoding} INSTRUCTIONS")?;
        }
        if let Some(tags) = self.tag_default {
            write!(f, " {tags} TAGS")?;
        }
        if self.extensibility_implied {
            f.write_str(" EXTENSIBILITY IMPLIED")?;
        }
        f.write_str(" ::=\nBEGIN\n")?;

        match &self.exports {
            Some(Exports::All) => f.write_str("EXPORTS ALL;\n")?,
            Some(Exports::Symbols(symbols)) => {
                f.write_str("EXPORTS ")?;
                join(f, symbols, ", ")?;
                f.write_str(";\n")?;
            }
            None => {}
        }

        if let Some(imports) = &self.imports {
            f.write_str("IMPORTS")?;
            for group in imports {
                write!(f, "\n    {group}")?;
            }
            f.write_str(";\n")?;
        }

        for assignment in &self.assignments {
            writeln!(f, "{assignment}")?;
        }
        for section in &self.encoding_control {
            writeln!(f, "{section}")?;
        }

        f.write_str("END")
    }
}

impl Display for ModuleIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        if let Some(oid) = &self.oid {
            f.write_str(" ")?;
            braced(f, oid, " ")?;
        }
        if let Some(iri) = &self.iri {
            f.write_str(" ")?;
            quoted(f, iri)?;
        }
        Ok(())
    }
}

impl Display for DefinitiveOidComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DefinitiveOidComponent::Name(name) => f.write_str(name),
            DefinitiveOidComponent::Number(number) => f.write_str(number),
            DefinitiveOidComponent::NameAndNumber(name, number) => write!(f, "{name}({number})"),
        }
    }
}

impl Display for TagDefault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(match self {
            TagDefault::Automatic => "AUTOMATIC",
            TagDefault::Implicit => "IMPLICIT",
            TagDefault::Explicit => "EXPLICIT",
        })
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        if self.parameterized {
            f.write_str("{}")?;
        }
        Ok(())
    }
}

impl Display for SymbolsFromModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        join(f, &self.symbols, ", ")?;
        write!(f, " FROM {}", self.module)?;
        match self.selection {
            Some(SelectionOption::Successors) => f.write_str(" WITH SUCCESSORS"),
            Some(SelectionOption::Descendants) => f.write_str(" WITH DESCENDANTS"),
            None => Ok(()),
        }
    }
}

impl Display for GlobalModuleReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        match &self.assigned_identifier {
            Some(AssignedIdentifier::Oid(oid)) => {
                f.write_str(" ")?;
                braced(f, oid, " ")
            }
            Some(AssignedIdentifier::Defined(reference)) => write!(f, " {reference}"),
            None => Ok(()),
        }
    }
}

impl Display for EncodingControlSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "ENCODING-CONTROL {} {}",
            self.encoding_reference, self.instructions
        )
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        if let Some(parameters) = &self.parameters {
            f.write_str(" ")?;
            braced(f, parameters, ", ")?;
        }

        match &self.kind {
            AssignmentKind::Type(ty) => write!(f, " ::= {ty}"),
            AssignmentKind::Value { governor, value } => write!(f, " {governor} ::= {value}"),
            AssignmentKind::ValueSet { governor, set } => write!(f, " {governor} ::= {set}"),
            AssignmentKind::ObjectClass(class) => write!(f, " ::= {class}"),
            AssignmentKind::Object { class, object } => write!(f, " {class} ::= {object}"),
            AssignmentKind::ObjectSet { class, set } => write!(f, " {class} ::= {set}"),
            AssignmentKind::XmlValue(value) => write!(f, " ::= {value}"),
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if let Some(governor) = &self.governor {
            write!(f, "{governor} : ")?;
        }
        f.write_str(&self.dummy)
    }
}

impl Display for ParamGovernor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ParamGovernor::Type(ty) => write!(f, "{ty}"),
            ParamGovernor::Class(class) => write!(f, "{class}"),
            ParamGovernor::Dummy(name) => f.write_str(name),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.kind)?;
        for constraint in &self.constraints {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TypeKind::Boolean => f.write_str("BOOLEAN"),
            TypeKind::Integer(numbers) => {
                f.write_str("INTEGER")?;
                if !numbers.is_empty() {
                    f.write_str(" ")?;
                    braced(f, numbers, ", ")?;
                }
                Ok(())
            }
            TypeKind::Enumerated(items) => write!(f, "ENUMERATED {items}"),
            TypeKind::Real => f.write_str("REAL"),
            TypeKind::BitString(bits) => {
                f.write_str("BIT STRING")?;
                if !bits.is_empty() {
                    f.write_str(" ")?;
                    braced(f, bits, ", ")?;
                }
                Ok(())
            }
            TypeKind::OctetString => f.write_str("OCTET STRING"),
            TypeKind::Null => f.write_str("NULL"),
            TypeKind::Sequence(components) => write!(f, "SEQUENCE {components}"),
            TypeKind::SequenceOf(of) => write!(f, "SEQUENCE{of}"),
            TypeKind::Set(components) => write!(f, "SET {components}"),
            TypeKind::SetOf(of) => write!(f, "SET{of}"),
            TypeKind::Choice(alternatives) => write!(f, "CHOICE {alternatives}"),
            TypeKind::ObjectIdentifier => f.write_str("OBJECT IDENTIFIER"),
            TypeKind::RelativeOid => f.write_str("RELATIVE-OID"),
            TypeKind::OidIri => f.write_str("OID-IRI"),
            TypeKind::RelativeOidIri => f.write_str("RELATIVE-OID-IRI"),
            TypeKind::CharacterString(kind) => write!(f, "{kind}"),
            TypeKind::UnrestrictedCharacterString => f.write_str("CHARACTER STRING"),
            TypeKind::EmbeddedPdv => f.write_str("EMBEDDED PDV"),
            TypeKind::External => f.write_str("EXTERNAL"),
            TypeKind::InstanceOf(class) => write!(f, "INSTANCE OF {class}"),
            TypeKind::Time => f.write_str("TIME"),
            TypeKind::Date => f.write_str("DATE"),
            TypeKind::TimeOfDay => f.write_str("TIME-OF-DAY"),
            TypeKind::DateTime => f.write_str("DATE-TIME"),
            TypeKind::Duration => f.write_str("DURATION"),
            TypeKind::GeneralizedTime => f.write_str("GeneralizedTime"),
            TypeKind::UtcTime => f.write_str("UTCTime"),
            TypeKind::ObjectDescriptor => f.write_str("ObjectDescriptor"),
            TypeKind::Tagged { tag, mode, ty } => {
                write!(f, "{tag}")?;
                match mode {
                    Some(TagMode::Implicit) => f.write_str(" IMPLICIT")?,
                    Some(TagMode::Explicit) => f.write_str(" EXPLICIT")?,
                    None => {}
                }
                write!(f, " {ty}")
            }
            TypeKind::EncodingPrefixed {
                encoding_reference,
                instruction,
                ty,
            } => match encoding_reference {
                Some(encoding) => write!(f, "[{encoding}: {instruction}] {ty}"),
                None => write!(f, "[{instruction}] {ty}"),
            },
            TypeKind::ObjectClassField { class, field } => {
                write!(f, "{class}.")?;
                join(f, field, ".")
            }
            TypeKind::FromObject { objects, field } => {
                write!(f, "{objects}.")?;
                join(f, field, ".")
            }
            TypeKind::Selection { alternative, ty } => write!(f, "{alternative} < {ty}"),
            TypeKind::Referenced(reference) => write!(f, "{reference}"),
        }
    }
}

impl Display for StringKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(match self {
            StringKind::Bmp => "BMPString",
            StringKind::General => "GeneralString",
            StringKind::Graphic => "GraphicString",
            StringKind::Ia5 => "IA5String",
            StringKind::Iso646 => "ISO646String",
            StringKind::Numeric => "NumericString",
            StringKind::Printable => "PrintableString",
            StringKind::Teletex => "TeletexString",
            StringKind::T61 => "T61String",
            StringKind::Universal => "UniversalString",
            StringKind::Utf8 => "UTF8String",
            StringKind::Videotex => "VideotexString",
            StringKind::Visible => "VisibleString",
        })
    }
}

/// Everything after `SEQUENCE` or `SET`
impl Display for CollectionOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.constraint {
            Some(OfConstraint::Size(constraint)) => write!(f, " SIZE {constraint}")?,
            Some(OfConstraint::Constraint(constraint)) => write!(f, " {constraint}")?,
            None => {}
        }
        f.write_str(" OF ")?;
        if let Some(name) = &self.name {
            write!(f, "{name} ")?;
        }
        write!(f, "{}", self.ty)
    }
}

impl Display for NamedNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

impl Display for NumberForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NumberForm::Number(number) => write!(f, "{number}"),
            NumberForm::Defined(reference) => write!(f, "{reference}"),
        }
    }
}

impl Display for Enumerations {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut items: Vec<String> = self.root.iter().map(ToString::to_string).collect();
        if let Some(extension) = &self.extension {
            items.push(extension_marker(&extension.exception));
            items.extend(extension.additions.iter().map(ToString::to_string));
        }
        braced(f, &items, ", ")
    }
}

impl Display for EnumerationItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            write!(f, "({value})")?;
        }
        Ok(())
    }
}

impl Display for ComponentTypeLists {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut items: Vec<String> = self.root.iter().map(ToString::to_string).collect();
        if let Some(extension) = &self.extension {
            items.push(extension_marker(&extension.exception));
            items.extend(extension.additions.iter().map(ToString::to_string));
            if extension.end_marker || !self.trailing_root.is_empty() {
                items.push("...".to_string());
            }
        }
        items.extend(self.trailing_root.iter().map(ToString::to_string));
        braced(f, &items, ", ")
    }
}

impl<T: Display> Display for ExtensionAddition<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ExtensionAddition::Single(item) => write!(f, "{item}"),
            ExtensionAddition::Group { version, items } => {
                f.write_str("[[ ")?;
                if let Some(version) = version {
                    write!(f, "{version}: ")?;
                }
                join(f, items, ", ")?;
                f.write_str(" ]]")
            }
        }
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ComponentType::Named { name, ty, presence } => {
                write!(f, "{name} {ty}")?;
                match presence {
                    Some(ComponentPresence::Optional) => f.write_str(" OPTIONAL"),
                    Some(ComponentPresence::Default(value)) => write!(f, " DEFAULT {value}"),
                    None => Ok(()),
                }
            }
            ComponentType::ComponentsOf(ty) => write!(f, "COMPONENTS OF {ty}"),
        }
    }
}

impl Display for AlternativeTypeLists {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut items: Vec<String> = self.root.iter().map(ToString::to_string).collect();
        if let Some(extension) = &self.extension {
            items.push(extension_marker(&extension.exception));
            items.extend(extension.additions.iter().map(ToString::to_string));
            if extension.end_marker {
                items.push("...".to_string());
            }
        }
        braced(f, &items, ", ")
    }
}

impl Display for NamedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.name, self.ty)
    }
}

/// The part after `!`
impl Display for ExceptionIdentification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ExceptionIdentification::Number(number) => write!(f, "{number}"),
            ExceptionIdentification::Defined(reference) => write!(f, "{reference}"),
            ExceptionIdentification::TypeValue(ty, value) => write!(f, "{ty} : {value}"),
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("[")?;
        if let Some(encoding) = &self.encoding_reference {
            write!(f, "{encoding}: ")?;
        }
        match self.class {
            Some(TagClass::Universal) => f.write_str("UNIVERSAL ")?,
            Some(TagClass::Application) => f.write_str("APPLICATION ")?,
            Some(TagClass::Private) => f.write_str("PRIVATE ")?,
            None => {}
        }
        write!(f, "{}]", self.number)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if let Some(module) = &self.module {
            write!(f, "{module}.")?;
        }
        f.write_str(&self.name)?;
        if let Some(parameters) = &self.parameters {
            f.write_str(" ")?;
            braced(f, parameters, ", ")?;
        }
        Ok(())
    }
}

impl Display for ActualParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ActualParameter::Type(ty) => write!(f, "{ty}"),
            ActualParameter::Value(value) => write!(f, "{value}"),
            ActualParameter::ValueSet(set) => write!(f, "{set}"),
            ActualParameter::Class(class) => write!(f, "{class}"),
            ActualParameter::Object(object) => write!(f, "{object}"),
            ActualParameter::ObjectSet(set) => write!(f, "{set}"),
        }
    }
}

impl Display for ReferencedObjects {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ReferencedObjects::Object(reference) | ReferencedObjects::ObjectSet(reference) => {
                write!(f, "{reference}")
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Integer(number) => write!(f, "{number}"),
            Value::LargeInteger(text) | Value::Real(text) => f.write_str(text),
            Value::SpecialReal(special) => write!(f, "{special}"),
            Value::Null => f.write_str("NULL"),
            Value::BString(bits) => write!(f, "'{bits}'B"),
            Value::HString(hex) => write!(f, "'{hex}'H"),
            Value::CString(text) => quoted(f, text),
            Value::IdentifierList(names) => braced(f, names, ", "),
            Value::CharacterStringList(items) => braced(f, items, ", "),
            Value::Quadruple {
                group,
                plane,
                row,
                cell,
            } => write!(f, "{{ {group}, {plane}, {row}, {cell} }}"),
            Value::Tuple { column, row } => write!(f, "{{ {column}, {row} }}"),
            Value::Containing(value) => write!(f, "CONTAINING {value}"),
            Value::Sequence(values) => braced(f, values, ", "),
            Value::SequenceOf(values) => braced(f, values, ", "),
            Value::Choice { alternative, value } => write!(f, "{alternative} : {value}"),
            Value::ObjectIdentifier(components) => braced(f, components, " "),
            Value::Iri(arcs) => quoted(f, &format!("/{}", arcs.join("/"))),
            Value::Identifier(name) => f.write_str(name),
            Value::Referenced(reference) => write!(f, "{reference}"),
            Value::FromObject { objects, field } => {
                write!(f, "{objects}.")?;
                join(f, field, ".")
            }
            Value::OpenType { ty, value } => write!(f, "{ty} : {value}"),
        }
    }
}

impl Display for SpecialReal {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(match self {
            SpecialReal::PlusInfinity => "PLUS-INFINITY",
            SpecialReal::MinusInfinity => "MINUS-INFINITY",
            SpecialReal::NotANumber => "NOT-A-NUMBER",
        })
    }
}

impl Display for NamedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

impl Display for ObjIdComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ObjIdComponent::Name(name) | ObjIdComponent::Number(name) => f.write_str(name),
            ObjIdComponent::NameAndNumber(name, number) => write!(f, "{name}({number})"),
            ObjIdComponent::NameAndDefined(name, reference) => write!(f, "{name}({reference})"),
            ObjIdComponent::Defined(reference) => write!(f, "{reference}"),
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "({}", self.spec)?;
        if let Some(exception) = &self.exception {
            write!(f, " ! {exception}")?;
        }
        f.write_str(")")
    }
}

impl Display for ConstraintSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ConstraintSpec::Subtype(specs) => write!(f, "{specs}"),
            ConstraintSpec::UserDefined(parameters) => {
                f.write_str("CONSTRAINED BY ")?;
                braced(f, parameters, ", ")
            }
            ConstraintSpec::Table(TableConstraint::Simple(set)) => write!(f, "{set}"),
            ConstraintSpec::Table(TableConstraint::ComponentRelation { set, at }) => {
                write!(f, "{{{set}}}{{")?;
                join(f, at, ", ")?;
                f.write_str("}")
            }
            ConstraintSpec::Contents {
                containing,
                encoded_by,
            } => {
                if let Some(ty) = containing {
                    write!(f, "CONTAINING {ty}")?;
                }
                if let Some(value) = encoded_by {
                    if containing.is_some() {
                        f.write_str(" ")?;
                    }
                    write!(f, "ENCODED BY {value}")?;
                }
                Ok(())
            }
        }
    }
}

impl Display for AtNotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "@{}", ".".repeat(self.level))?;
        join(f, &self.components, ".")
    }
}

impl Display for UserDefinedParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            UserDefinedParameter::Value(ty, value) => write!(f, "{ty} : {value}"),
            UserDefinedParameter::Object(class, object) => write!(f, "{class} : {object}"),
            UserDefinedParameter::Type(ty) => write!(f, "{ty}"),
            UserDefinedParameter::Class(class) => write!(f, "{class}"),
            UserDefinedParameter::ObjectSet(reference) => write!(f, "{reference}"),
        }
    }
}

impl Display for ElementSetSpecs {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.root {
            Some(root) => {
                write!(f, "{root}")?;
                if self.extensible {
                    f.write_str(", ...")?;
                }
            }
            None => f.write_str("...")?,
        }
        if let Some(additional) = &self.additional {
            write!(f, ", {additional}")?;
        }
        Ok(())
    }
}

impl Display for ElementSetSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ElementSetSpec::Unions(unions) => join(f, unions, " | "),
            ElementSetSpec::AllExcept(elements) => write!(f, "ALL EXCEPT {elements}"),
        }
    }
}

impl Display for Intersection {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        join(f, &self.0, " ^ ")
    }
}

impl Display for IntersectionElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.elements)?;
        if let Some(except) = &self.except {
            write!(f, " EXCEPT {except}")?;
        }
        Ok(())
    }
}

impl Display for Elements {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Elements::Subtype(element) => write!(f, "{element}"),
            Elements::Object(element) => write!(f, "{element}"),
            Elements::Nested(spec) => write!(f, "({spec})"),
        }
    }
}

impl Display for SubtypeElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SubtypeElement::SingleValue(value) => write!(f, "{value}"),
            SubtypeElement::ContainedSubtype { includes, ty } => {
                if *includes {
                    f.write_str("INCLUDES ")?;
                }
                write!(f, "{ty}")
            }
            SubtypeElement::ValueRange { lower, upper } => write!(
                f,
                "{}{} ..{} {}",
                lower.value,
                if lower.open { " <" } else { "" },
                if upper.open { "<" } else { "" },
                upper.value
            ),
            SubtypeElement::PermittedAlphabet(constraint) => write!(f, "FROM {constraint}"),
            SubtypeElement::Size(constraint) => write!(f, "SIZE {constraint}"),
            SubtypeElement::SingleTypeConstraint(constraint) => {
                write!(f, "WITH COMPONENT {constraint}")
            }
            SubtypeElement::MultipleTypeConstraints {
                partial,
                components,
            } => {
                f.write_str("WITH COMPONENTS { ")?;
                if *partial {
                    f.write_str("..., ")?;
                }
                join(f, components, ", ")?;
                f.write_str(" }")
            }
            SubtypeElement::Pattern(value) => write!(f, "PATTERN {value}"),
            SubtypeElement::Settings(settings) => {
                f.write_str("SETTINGS ")?;
                quoted(f, settings)
            }
        }
    }
}

impl Display for EndpointValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            EndpointValue::Min => f.write_str("MIN"),
            EndpointValue::Max => f.write_str("MAX"),
            EndpointValue::Value(value) => write!(f, "{value}"),
        }
    }
}

impl Display for NamedConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " {constraint}")?;
        }
        match self.presence {
            Some(PresenceConstraint::Present) => f.write_str(" PRESENT"),
            Some(PresenceConstraint::Absent) => f.write_str(" ABSENT"),
            Some(PresenceConstraint::Optional) => f.write_str(" OPTIONAL"),
            None => Ok(()),
        }
    }
}

impl Display for ObjectSetElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ObjectSetElement::Object(object) => write!(f, "{object}"),
            ObjectSetElement::ObjectSet(reference) => write!(f, "{reference}"),
            ObjectSetElement::FromObjects { objects, field } => {
                write!(f, "{objects}.")?;
                join(f, field, ".")
            }
        }
    }
}

impl Display for ValueSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{{ {} }}", self.0)
    }
}

impl Display for ObjectSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{{ {} }}", self.0)
    }
}

impl Display for ObjectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ObjectClass::Defined(class) => write!(f, "{class}"),
            ObjectClass::Definition(defn) => write!(f, "{defn}"),
        }
    }
}

impl Display for DefinedObjectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DefinedObjectClass::TypeIdentifier => f.write_str("TYPE-IDENTIFIER"),
            DefinedObjectClass::AbstractSyntax => f.write_str("ABSTRACT-SYNTAX"),
            DefinedObjectClass::Reference(reference) => write!(f, "{reference}"),
        }
    }
}

impl Display for ObjectClassDefn {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("CLASS ")?;
        braced(f, &self.fields, ", ")?;
        if let Some(syntax) = &self.syntax {
            f.write_str(" WITH SYNTAX ")?;
            braced(f, syntax, " ")?;
        }
        Ok(())
    }
}

impl Display for FieldSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.name)?;

        match &self.kind {
            FieldSpecKind::Type { optionality } => write_optionality(f, optionality),
            FieldSpecKind::FixedTypeValue {
                ty,
                unique,
                optionality,
            } => {
                write!(f, " {ty}")?;
                if *unique {
                    f.write_str(" UNIQUE")?;
                }
                write_optionality(f, optionality)
            }
            FieldSpecKind::VariableTypeValue { field, optionality } => {
                f.write_str(" ")?;
                join(f, field, ".")?;
                write_optionality(f, optionality)
            }
            FieldSpecKind::FixedTypeValueSet { ty, optionality } => {
                write!(f, " {ty}")?;
                write_optionality(f, optionality)
            }
            FieldSpecKind::VariableTypeValueSet { field, optionality } => {
                f.write_str(" ")?;
                join(f, field, ".")?;
                write_optionality(f, optionality)
            }
            FieldSpecKind::Object { class, optionality } => {
                write!(f, " {class}")?;
                write_optionality(f, optionality)
            }
            FieldSpecKind::ObjectSet { class, optionality } => {
                write!(f, " {class}")?;
                write_optionality(f, optionality)
            }
        }
    }
}

fn write_optionality<T: Display>(f: &mut Formatter<'_>, optionality: &Option<Optionality<T>>) -> Result {
    match optionality {
        Some(Optionality::Optional) => f.write_str(" OPTIONAL"),
        Some(Optionality::Default(default)) => write!(f, " DEFAULT {default}"),
        None => Ok(()),
    }
}

impl Display for TokenOrGroupSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TokenOrGroupSpec::Literal(literal) => write!(f, "{literal}"),
            TokenOrGroupSpec::Field(name) => f.write_str(name),
            TokenOrGroupSpec::Group(items) => {
                f.write_str("[")?;
                join(f, items, " ")?;
                f.write_str("]")
            }
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Literal::Word(word) => f.write_str(word),
            Literal::Comma => f.write_str(","),
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Object::Defined(reference) => write!(f, "{reference}"),
            Object::DefaultSyntax(settings) => braced(f, settings, ", "),
            Object::DefinedSyntax(tokens) => braced(f, tokens, " "),
            Object::FromObject { objects, field } => {
                write!(f, "{objects}.")?;
                join(f, field, ".")
            }
        }
    }
}

impl Display for FieldSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.field, self.setting)
    }
}

impl Display for DefinedSyntaxToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DefinedSyntaxToken::Literal(literal) => write!(f, "{literal}"),
            DefinedSyntaxToken::Setting { setting, .. } => write!(f, "{setting}"),
        }
    }
}

impl Display for Setting {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Setting::Type(ty) => write!(f, "{ty}"),
            Setting::Value(value) => write!(f, "{value}"),
            Setting::ValueSet(set) => write!(f, "{set}"),
            Setting::Object(object) => write!(f, "{object}"),
            Setting::ObjectSet(set) => write!(f, "{set}"),
        }
    }
}

impl Display for XmlTypedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.value {
            Some(value) => write!(f, "<{0}>{value}</{0}>", self.name),
            None => write!(f, "<{}/>", self.name),
        }
    }
}

impl Display for XmlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            XmlValue::Boolean(value) => write!(f, "{value}"),
            XmlValue::Integer(number) => write!(f, "{number}"),
            XmlValue::Real(real) => f.write_str(real),
            XmlValue::SpecialReal(SpecialReal::PlusInfinity) => f.write_str("INF"),
            XmlValue::SpecialReal(SpecialReal::MinusInfinity) => f.write_str("-INF"),
            XmlValue::SpecialReal(SpecialReal::NotANumber) => f.write_str("NaN"),
            XmlValue::ObjectIdentifier(arcs) => join(f, arcs, "."),
            XmlValue::Iri(arcs) => write!(f, "/{}", arcs.join("/")),
            XmlValue::Text(text) => f.write_str(text),
            XmlValue::Elements(elements) => join(f, elements, ""),
        }
    }
}

impl Display for XmlOidArc {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match (&self.name, &self.number) {
            (Some(name), Some(number)) => write!(f, "{name}({number})"),
            (Some(name), None) => f.write_str(name),
            (None, Some(number)) => f.write_str(number),
            (None, None) => Ok(()),
        }
    }
}
