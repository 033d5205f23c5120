use tracing::{debug, trace};

use crate::{
    analysis::{collect, Environment, Header, SymbolKind},
    ast::{
        AssignedIdentifier, Assignment, AssignmentKind, DefinitiveOidComponent,
        EncodingControlSection, Exports, GlobalModuleReference, ModuleDefinition,
        ModuleIdentifier, Reference, SelectionOption, Symbol, SymbolsFromModule, TagDefault,
    },
    token::TokenKind,
};

use super::{Parser, ParserError, Result};

impl<'a> Parser<'a> {
    /// Parse a single ASN.1 module definition
    pub(super) fn module_definition(&mut self) -> Result<ModuleDefinition> {
        let start = self.pos;

        let identifier = self.module_identifier()?;
        debug!(module = %identifier.name, "parsing module");

        self.next(&[TokenKind::KwDefinitions])?;
        let encoding_reference = self.encoding_reference_default()?;
        let tag_default = self.tag_default()?;
        let extensibility_implied = self.extension_default()?;
        self.next(&[TokenKind::Assignment])?;
        self.next(&[TokenKind::KwBegin])?;

        let exports = self.exports()?;
        let imports = self.imports()?;

        self.env = Environment::new(identifier.name.clone());
        for group in imports.iter().flatten() {
            for symbol in &group.symbols {
                self.env.import(&symbol.name);
            }
        }

        let assignments = self.module_body(exports.is_some(), imports.is_some())?;

        let mut encoding_control = vec![];
        while self.at(TokenKind::KwEncodingControl) {
            encoding_control.push(self.encoding_control_section()?);
        }
        self.next(&[TokenKind::KwEnd])?;

        debug!(module = %identifier.name, assignments = assignments.len(), "parsed module");

        Ok(ModuleDefinition {
            identifier,
            encoding_reference,
            tag_default,
            extensibility_implied,
            exports,
            imports,
            assignments,
            encoding_control,
            span: self.span_from(start),
        })
    }

    /// Identifier at the start of a module
    fn module_identifier(&mut self) -> Result<ModuleIdentifier> {
        let name = self.next(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;

        let mut oid = None;
        let mut iri = None;
        if self.at(TokenKind::LeftCurly) {
            oid = Some(self.definitive_oid()?);

            if let Some(tok) = self.eat(TokenKind::CString) {
                iri = Some(unquote(tok.value));
            }
        }

        Ok(ModuleIdentifier {
            name: name.value.to_string(),
            oid,
            iri,
        })
    }

    /// Object identifier after the name of a module
    /// - no local variables in scope
    /// - we know it must be an OID so don't just parse it as a braced value
    fn definitive_oid(&mut self) -> Result<Vec<DefinitiveOidComponent>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut components = vec![];
        loop {
            components.push(self.definitive_oid_component()?);
            if self.eat(TokenKind::RightCurly).is_some() {
                break;
            }
        }

        Ok(components)
    }

    /// Single component of the object identifier after the name of a module
    fn definitive_oid_component(&mut self) -> Result<DefinitiveOidComponent> {
        let tok = self.next(&[TokenKind::ValueRefOrIdent, TokenKind::Number])?;

        if tok.kind == TokenKind::Number {
            return Ok(DefinitiveOidComponent::Number(tok.value.to_string()));
        }

        if self.eat(TokenKind::LeftParen).is_some() {
            let number = self.next(&[TokenKind::Number])?;
            self.next(&[TokenKind::RightParen])?;
            Ok(DefinitiveOidComponent::NameAndNumber(
                tok.value.to_string(),
                number.value.to_string(),
            ))
        } else {
            Ok(DefinitiveOidComponent::Name(tok.value.to_string()))
        }
    }

    /// Parse an encoding reference specifier, `XER INSTRUCTIONS`
    fn encoding_reference_default(&mut self) -> Result<Option<String>> {
        let tok = self.token(0);
        if tok.kind.is_uppercase_ref() && self.kind(1) == TokenKind::KwInstructions {
            self.bump();
            self.bump();
            return Ok(Some(tok.value.to_string()));
        }
        Ok(None)
    }

    /// Parse `EXPLICIT TAGS` or `IMPLICIT TAGS` or `AUTOMATIC TAGS` or none
    fn tag_default(&mut self) -> Result<Option<TagDefault>> {
        let tag = if self.eat(TokenKind::KwExplicit).is_some() {
            TagDefault::Explicit
        } else if self.eat(TokenKind::KwImplicit).is_some() {
            TagDefault::Implicit
        } else if self.eat(TokenKind::KwAutomatic).is_some() {
            TagDefault::Automatic
        } else {
            return Ok(None);
        };

        self.next(&[TokenKind::KwTags])?;
        Ok(Some(tag))
    }

    /// Parse `EXTENSIBILITY IMPLIED` or none
    fn extension_default(&mut self) -> Result<bool> {
        if self.eat(TokenKind::KwExtensibility).is_some() {
            self.next(&[TokenKind::KwImplied])?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Exported symbols section
    fn exports(&mut self) -> Result<Option<Exports>> {
        if self.eat(TokenKind::KwExports).is_none() {
            return Ok(None);
        }

        let exports = if self.eat(TokenKind::KwAll).is_some() {
            Exports::All
        } else if self.at(TokenKind::SemiColon) {
            Exports::Symbols(vec![])
        } else {
            Exports::Symbols(self.symbol_list()?)
        };

        self.next(&[TokenKind::SemiColon])?;
        Ok(Some(exports))
    }

    /// Imported symbols section
    fn imports(&mut self) -> Result<Option<Vec<SymbolsFromModule>>> {
        if self.eat(TokenKind::KwImports).is_none() {
            return Ok(None);
        }

        let mut groups = vec![];
        while !self.at(TokenKind::SemiColon) {
            groups.push(self.symbols_from_module()?);
        }

        self.next(&[TokenKind::SemiColon])?;
        Ok(Some(groups))
    }

    /// ```bnf
    /// SymbolsFromModule ::= SymbolList FROM GlobalModuleReference SelectionOption?
    /// ```
    fn symbols_from_module(&mut self) -> Result<SymbolsFromModule> {
        let symbols = self.symbol_list()?;
        self.next(&[TokenKind::KwFrom])?;
        let name = self.next(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;

        // a lower case name is the start of the next symbol list if it is
        // followed by a comma or `FROM` or is a parameterized reference
        let assigned_identifier = if self.at(TokenKind::LeftCurly) {
            Some(AssignedIdentifier::Oid(self.oid_components()?))
        } else if self.kind(0) == TokenKind::ValueRefOrIdent
            && !matches!(
                self.kind(1),
                TokenKind::Comma | TokenKind::KwFrom | TokenKind::LeftCurly
            )
        {
            let tok = self.bump();
            Some(AssignedIdentifier::Defined(Reference::local(tok.value)))
        } else {
            None
        };

        let selection = if self.kind(0) == TokenKind::KwWith {
            self.bump();
            let tok = self.next(&[TokenKind::KwSuccessors, TokenKind::KwDescendants])?;
            Some(if tok.kind == TokenKind::KwSuccessors {
                SelectionOption::Successors
            } else {
                SelectionOption::Descendants
            })
        } else {
            None
        };

        Ok(SymbolsFromModule {
            symbols,
            module: GlobalModuleReference {
                name: name.value.to_string(),
                assigned_identifier,
            },
            selection,
        })
    }

    /// List of symbols within an import or export statement
    fn symbol_list(&mut self) -> Result<Vec<Symbol>> {
        let mut symbols = vec![self.symbol()?];
        while self.eat(TokenKind::Comma).is_some() {
            symbols.push(self.symbol()?);
        }
        Ok(symbols)
    }

    /// Reference or parameterized reference.
    fn symbol(&mut self) -> Result<Symbol> {
        let name = self.next(&[
            TokenKind::TypeOrModuleRef,
            TokenKind::ValueRefOrIdent,
            TokenKind::ObjectClassRef,
        ])?;

        let parameterized = if self.eat(TokenKind::LeftCurly).is_some() {
            self.next(&[TokenKind::RightCurly])?;
            true
        } else {
            false
        };

        Ok(Symbol {
            name: name.value.to_string(),
            parameterized,
        })
    }

    /// Parse every assignment between the imports and the end of the module.
    /// Each assignment is parsed on its own, so that an error in one of them
    /// is reported and the others are still parsed.
    fn module_body(&mut self, has_exports: bool, has_imports: bool) -> Result<Vec<Assignment>> {
        let body_start = self.pos;
        let body_end = self.tokens[body_start..]
            .iter()
            .position(|t| matches!(t.kind, TokenKind::KwEnd | TokenKind::KwEncodingControl))
            .map_or(self.tokens.len(), |i| body_start + i);

        let collection = collect(self.source, &self.tokens, body_start..body_end, &mut self.env);

        if (has_exports || has_imports) && collection.headers.is_empty() && !(has_exports && has_imports) {
            return Err(ParserError::Structure {
                message: "a module without assignments must have both exports and imports".into(),
                span: self.token(0).offset..self.token(0).end(),
            });
        }

        if let Some(stray) = collection.stray.clone() {
            self.pos = stray.start;
            self.limit = stray.end;
            let err = self.expected_item("an assignment");
            self.report(&err, stray.end);
        }

        self.types.clear();
        self.classes.clear();

        let mut results: Vec<Option<Assignment>> = vec![None; collection.headers.len()];
        for pass in 0..3 {
            for (i, header) in collection.headers.iter().enumerate() {
                if parse_order(header.kind) != pass {
                    continue;
                }

                match self.assignment_in(header) {
                    Ok(assignment) => {
                        self.remember(&assignment);
                        results[i] = Some(assignment);
                    }
                    Err(err) => self.report(&err, header.end),
                }
            }
        }

        self.pos = body_end;
        self.limit = self.tokens.len();
        self.expected.clear();
        self.dummies.clear();

        Ok(results.into_iter().flatten().collect())
    }

    /// Parse the assignment of a header, confined to its own tokens
    fn assignment_in(&mut self, header: &Header<'a>) -> Result<Assignment> {
        self.pos = header.start;
        self.limit = header.end;
        self.expected.clear();
        self.depth = 0;

        trace!(name = header.name.value, kind = ?header.kind, "parsing assignment");
        let result = self.assignment(header);
        self.dummies.clear();
        result
    }

    /// Keep parsed definitions that later assignments need to look up
    fn remember(&mut self, assignment: &Assignment) {
        match &assignment.kind {
            AssignmentKind::Type(ty) => {
                self.types.insert(assignment.name.clone(), ty.clone());
            }
            AssignmentKind::ValueSet { governor, .. } => {
                self.types.insert(assignment.name.clone(), governor.clone());
            }
            AssignmentKind::ObjectClass(class) => {
                self.classes.insert(assignment.name.clone(), class.clone());
            }
            _ => {}
        }
    }

    /// Parse the inside of a single encoding control section, which is kept as
    /// written
    fn encoding_control_section(&mut self) -> Result<EncodingControlSection> {
        self.next(&[TokenKind::KwEncodingControl])?;
        let reference = self.next(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;

        // the instructions are not tokens, the next token ends the section
        let instructions = self
            .source
            .get(reference.end()..self.token(0).offset)
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(EncodingControlSection {
            encoding_reference: reference.value.to_string(),
            instructions,
        })
    }
}

/// Classes are parsed before types and value sets, which are parsed before
/// everything else, so objects and values can look up the definitions they
/// depend on.
fn parse_order(kind: SymbolKind) -> usize {
    match kind {
        SymbolKind::ObjectClass => 0,
        SymbolKind::Type | SymbolKind::ValueSet => 1,
        _ => 2,
    }
}

/// Remove the quotes around a character string token
pub(super) fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    #[test]
    fn module_header() {
        let (ast, diagnostics) = parse(
            r#"Test-Module { iso(1) standard 8824 } "/ISO/Test"
            DEFINITIONS XER INSTRUCTIONS AUTOMATIC TAGS EXTENSIBILITY IMPLIED ::= BEGIN
            EXPORTS ALL;
            IMPORTS a, B{} FROM Other { 1 2 3 } WITH SUCCESSORS
                    C FROM Third other-value
                    d FROM Fourth;
            T ::= INTEGER
            ENCODING-CONTROL XER GLOBAL-DEFAULTS MODIFIED-ENCODINGS
            END"#,
        );
        assert_eq!(diagnostics, vec![]);

        let module = &ast.modules[0];
        assert_eq!(module.identifier.name, "Test-Module");
        assert_eq!(
            module.identifier.oid,
            Some(vec![
                DefinitiveOidComponent::NameAndNumber("iso".into(), "1".into()),
                DefinitiveOidComponent::Name("standard".into()),
                DefinitiveOidComponent::Number("8824".into()),
            ])
        );
        assert_eq!(module.identifier.iri.as_deref(), Some("/ISO/Test"));
        assert_eq!(module.encoding_reference.as_deref(), Some("XER"));
        assert_eq!(module.tag_default, Some(TagDefault::Automatic));
        assert!(module.extensibility_implied);
        assert_eq!(module.exports, Some(Exports::All));

        let imports = module.imports.as_ref().unwrap();
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].symbols.len(), 2);
        assert!(imports[0].symbols[1].parameterized);
        assert_eq!(imports[0].selection, Some(SelectionOption::Successors));
        assert!(matches!(
            imports[0].module.assigned_identifier,
            Some(AssignedIdentifier::Oid(_))
        ));
        assert_eq!(
            imports[1].module.assigned_identifier,
            Some(AssignedIdentifier::Defined(Reference::local("other-value")))
        );
        assert_eq!(imports[2].symbols[0].name, "d");

        assert_eq!(module.assignments.len(), 1);
        assert_eq!(module.encoding_control[0].encoding_reference, "XER");
        assert_eq!(
            module.encoding_control[0].instructions,
            "GLOBAL-DEFAULTS MODIFIED-ENCODINGS"
        );
    }

    #[test]
    fn encoding_instructions_are_raw_text() {
        let (ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            T ::= INTEGER
            ENCODING-CONTROL XER it's raw \"text
            ENCODING-CONTROL PER [[ } {
            END",
        );
        assert_eq!(diagnostics, vec![]);

        let sections = &ast.modules[0].encoding_control;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].encoding_reference, "XER");
        assert_eq!(sections[0].instructions, "it's raw \"text");
        assert_eq!(sections[1].encoding_reference, "PER");
        assert_eq!(sections[1].instructions, "[[ } {");
    }

    #[test]
    fn imported_lower_case_symbols_are_not_assigned_identifiers() {
        let (ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN IMPORTS A FROM X b, c FROM Y; T ::= A END",
        );
        assert_eq!(diagnostics, vec![]);
        let imports = ast.modules[0].imports.as_ref().unwrap();
        assert_eq!(imports[0].module.assigned_identifier, None);
        assert_eq!(imports[1].symbols.len(), 2);
    }

    #[test]
    fn empty_modules() {
        let (ast, diagnostics) = parse("A DEFINITIONS ::= BEGIN END B DEFINITIONS ::= BEGIN END");
        assert_eq!(diagnostics, vec![]);
        assert_eq!(ast.modules.len(), 2);
        assert_eq!(ast.modules[1].identifier.name, "B");
    }

    #[test]
    fn module_body_needs_assignments_or_both_clauses() {
        let (_, diagnostics) = parse("A DEFINITIONS ::= BEGIN EXPORTS ALL; END");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Structural);

        let (_, diagnostics) =
            parse("A DEFINITIONS ::= BEGIN EXPORTS ALL; IMPORTS T FROM B; END");
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn stray_tokens_are_reported() {
        let (ast, diagnostics) = parse("A DEFINITIONS ::= BEGIN 5 6 T ::= INTEGER END");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location, 24..25);
        assert_eq!(ast.modules[0].assignments.len(), 1);
    }
}
