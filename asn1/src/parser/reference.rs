use crate::{
    analysis::{ParameterKind, SymbolKind},
    ast::{ActualParameter, DefinedObjectClass, FieldName, Reference},
    token::TokenKind,
    util::NameCase,
};

use super::{Parser, ParserError, Result};

impl<'a> Parser<'a> {
    /// Consume `Module.` when the current token is a module reference
    /// qualifying another name
    pub(super) fn module_prefix(&mut self) -> Option<String> {
        if self.is_module_prefix(0) {
            let module = self.bump();
            self.bump();
            Some(module.value.to_string())
        } else {
            None
        }
    }

    /// Is the token `n` places ahead the start of a module qualified name
    pub(super) fn is_module_prefix(&self, n: usize) -> bool {
        self.kind(n).is_uppercase_ref()
            && self.kind(n + 1) == TokenKind::Dot
            && matches!(
                self.kind(n + 2),
                TokenKind::TypeOrModuleRef | TokenKind::ValueRefOrIdent | TokenKind::ObjectClassRef
            )
    }

    /// Parse a possibly module qualified reference whose name is one of the
    /// given kinds, followed by actual parameters when the name refers to a
    /// parameterized definition.
    pub(super) fn reference(&mut self, kind: &[TokenKind]) -> Result<Reference> {
        let module = self.module_prefix();
        let name = self.next(kind)?;
        let parameters = self.reference_parameters(module.as_deref(), name.value)?;

        Ok(Reference {
            module,
            name: name.value.to_string(),
            parameters,
        })
    }

    /// Actual parameters following an already consumed name, if the name may
    /// be parameterized and a `{` follows
    pub(super) fn reference_parameters(
        &mut self,
        module: Option<&str>,
        name: &str,
    ) -> Result<Option<Vec<ActualParameter>>> {
        if self.takes_parameters(module, name) && self.at(TokenKind::LeftCurly) {
            Ok(Some(self.actual_parameters(module, name)?))
        } else {
            Ok(None)
        }
    }

    /// Could a `{` after this name be a list of actual parameters.  Names from
    /// other modules are unknown, so they may always be parameterized.
    pub(super) fn takes_parameters(&self, module: Option<&str>, name: &str) -> bool {
        if module.is_some() {
            return true;
        }
        if self.dummies.contains_key(name) {
            return false;
        }

        match self.env.get(name) {
            None => true,
            Some(symbol) => {
                symbol.kind == SymbolKind::Imported || !symbol.parameters.is_empty()
            }
        }
    }

    /// A value reference, as used in named numbers, tags and exceptions
    pub(super) fn defined_value(&mut self) -> Result<Reference> {
        self.reference(&[TokenKind::ValueRefOrIdent])
    }

    /// Parse a reference to an object class
    pub(super) fn defined_object_class(&mut self) -> Result<DefinedObjectClass> {
        if self.eat(TokenKind::KwTypeIdentifier).is_some() {
            return Ok(DefinedObjectClass::TypeIdentifier);
        }
        if self.eat(TokenKind::KwAbstractSyntax).is_some() {
            return Ok(DefinedObjectClass::AbstractSyntax);
        }

        let n = if self.is_module_prefix(0) { 2 } else { 0 };
        let name = self.token(n);
        if matches!(name.kind, TokenKind::ValueRefOrIdent | TokenKind::TypeOrModuleRef) {
            return Err(ParserError::Disambiguation {
                message: format!(
                    "`{}` must be an object class reference, which only contains upper case letters",
                    name.value
                ),
                span: name.offset..name.end(),
            });
        }

        let reference = self.reference(&[TokenKind::ObjectClassRef])?;
        Ok(DefinedObjectClass::Reference(reference))
    }

    /// Is there a field access, `.&field`, `n` tokens ahead
    pub(super) fn at_field_access(&self, n: usize) -> bool {
        self.kind(n) == TokenKind::Dot
            && matches!(self.kind(n + 1), TokenKind::TypeField | TokenKind::ValueField)
    }

    /// Parse `&a.&b.&c`, a chain of fields through objects
    pub(super) fn field_name(&mut self) -> Result<FieldName> {
        let first = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
        let mut name = vec![first.value.to_string()];

        while self.at_field_access(0) {
            self.bump();
            name.push(self.bump().value.to_string());
        }

        Ok(name)
    }

    /// Is the token `n` places ahead, possibly module qualified, a reference
    /// to an object class
    pub(super) fn is_class_start(&self, n: usize) -> bool {
        let n = if self.is_module_prefix(n) { n + 2 } else { n };
        let tok = self.token(n);

        match tok.kind {
            TokenKind::KwTypeIdentifier | TokenKind::KwAbstractSyntax => true,
            TokenKind::ObjectClassRef => self.is_class_name(tok.value),
            _ => false,
        }
    }

    /// Does the name refer to an object class, either through a local
    /// definition, a dummy reference or its case
    pub(super) fn is_class_name(&self, name: &str) -> bool {
        match self.dummies.get(name) {
            Some(ParameterKind::TypeOrClass) => name.len() > 1 && NameCase::of(name) == NameCase::Yell,
            Some(_) => false,
            None => self.env.is_class(name),
        }
    }

    /// Does a lower case name refer to a value or object, rather than being a
    /// named number or other identifier
    pub(super) fn is_value_reference(&self, name: &str) -> bool {
        if self.dummies.contains_key(name) {
            return true;
        }
        matches!(
            self.env.kind(name),
            Some(
                SymbolKind::Value
                    | SymbolKind::Object
                    | SymbolKind::XmlValue
                    | SymbolKind::Imported
            )
        )
    }

    /// Does a name refer to an object
    pub(super) fn is_object_reference(&self, name: &str) -> bool {
        match self.dummies.get(name) {
            Some(kind) => *kind == ParameterKind::Object,
            None => self.env.kind(name) == Some(SymbolKind::Object),
        }
    }
}
