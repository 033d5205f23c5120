//! Object class definitions and information objects

use std::collections::HashMap;

use crate::{
    analysis::SymbolKind,
    ast::{
        DefinedObjectClass, DefinedSyntaxToken, FieldSetting, FieldSpec, FieldSpecKind, Literal,
        Object, ObjectClass, ObjectClassDefn, Optionality, ReferencedObjects, Setting, Type,
    },
    parser::{describe_token, Parser, ParserError, Result},
    token::TokenKind,
    util::NameCase,
};

impl<'a> Parser<'a> {
    /// Parse an object class definition, or a reference to another class
    /// ```bnf
    /// ObjectClassDefn ::= "CLASS" "{" FieldSpec ("," FieldSpec)* "}" WithSyntaxSpec?
    /// WithSyntaxSpec ::= "WITH" "SYNTAX" SyntaxList
    /// ```
    pub(in crate::parser) fn object_class(&mut self) -> Result<ObjectClass> {
        if self.eat(TokenKind::KwClass).is_none() {
            return Ok(ObjectClass::Defined(self.defined_object_class()?));
        }

        self.next(&[TokenKind::LeftCurly])?;
        let mut fields = vec![];
        loop {
            fields.push(self.field_definition()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        let syntax = if self.eat(TokenKind::KwWith).is_some() {
            self.next(&[TokenKind::KwSyntax])?;
            Some(self.syntax_list()?)
        } else {
            None
        };

        Ok(ObjectClass::Definition(ObjectClassDefn { fields, syntax }))
    }

    /// Parse a single field of a class.  The kind of field is decided by the
    /// case of its name and what follows it.
    fn field_definition(&mut self) -> Result<FieldSpec> {
        let name = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
        let field_follows = matches!(self.kind(0), TokenKind::TypeField | TokenKind::ValueField);
        let class_follows = {
            let after = if self.is_module_prefix(0) { 3 } else { 1 };
            self.is_class_start(0) && !self.at_field_access(after)
        };

        let kind = if name.kind == TokenKind::TypeField {
            if matches!(
                self.kind(0),
                TokenKind::Comma | TokenKind::RightCurly | TokenKind::KwOptional | TokenKind::KwDefault
            ) {
                FieldSpecKind::Type {
                    optionality: self.optionality(Self::ty)?,
                }
            } else if field_follows {
                FieldSpecKind::VariableTypeValueSet {
                    field: self.field_name()?,
                    optionality: self.optionality(|p| p.braced_value_set(None))?,
                }
            } else if class_follows {
                let class = self.defined_object_class()?;
                let optionality = self.optionality(|p| p.braced_object_set(Some(&class)))?;
                FieldSpecKind::ObjectSet { class, optionality }
            } else {
                let ty = self.ty()?;
                let optionality = self.optionality(|p| p.braced_value_set(Some(&ty)))?;
                FieldSpecKind::FixedTypeValueSet { ty, optionality }
            }
        } else if field_follows {
            FieldSpecKind::VariableTypeValue {
                field: self.field_name()?,
                optionality: self.optionality(|p| p.value(None))?,
            }
        } else if class_follows {
            let class = self.defined_object_class()?;
            let optionality = self.optionality(|p| p.object(Some(&class)))?;
            FieldSpecKind::Object { class, optionality }
        } else {
            let ty = self.ty()?;
            let unique = self.eat(TokenKind::KwUnique).is_some();
            let optionality = self.optionality(|p| p.value(Some(&ty)))?;
            FieldSpecKind::FixedTypeValue {
                ty,
                unique,
                optionality,
            }
        };

        Ok(FieldSpec {
            name: name.value.to_string(),
            kind,
        })
    }

    /// `OPTIONAL` or `DEFAULT` followed by a setting
    fn optionality<T>(
        &mut self,
        default: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<Optionality<T>>> {
        if self.eat(TokenKind::KwOptional).is_some() {
            Ok(Some(Optionality::Optional))
        } else if self.eat(TokenKind::KwDefault).is_some() {
            Ok(Some(Optionality::Default(default(self)?)))
        } else {
            Ok(None)
        }
    }

    /// Parse an object of a class.  Braced objects use the syntax of the class
    /// when it is known.
    pub(in crate::parser) fn object(&mut self, class: Option<&DefinedObjectClass>) -> Result<Object> {
        self.nested(|p| {
            if p.at(TokenKind::LeftCurly) {
                return p.braced_object(class);
            }

            let lower = p.kind(0) == TokenKind::ValueRefOrIdent
                || (p.is_module_prefix(0) && p.kind(2) == TokenKind::ValueRefOrIdent);
            if lower {
                let reference = p.reference(&[TokenKind::ValueRefOrIdent])?;
                if p.at_field_access(0) {
                    p.bump();
                    return Ok(Object::FromObject {
                        objects: ReferencedObjects::Object(reference),
                        field: p.field_name()?,
                    });
                }
                return Ok(Object::Defined(reference));
            }

            if p.kind(0).is_uppercase_ref() {
                let reference = p.reference(&[TokenKind::TypeOrModuleRef, TokenKind::ObjectClassRef])?;
                p.next(&[TokenKind::Dot])?;
                return Ok(Object::FromObject {
                    objects: ReferencedObjects::ObjectSet(reference),
                    field: p.field_name()?,
                });
            }

            Err(p.expected_item("an object"))
        })
    }

    fn braced_object(&mut self, class: Option<&DefinedObjectClass>) -> Result<Object> {
        let defn = class.and_then(|c| self.class_definition(c));
        let class_name = class.map(|c| c.to_string()).unwrap_or_default();

        if matches!(self.kind(1), TokenKind::TypeField | TokenKind::ValueField) {
            return self.default_syntax(defn.as_ref(), &class_name);
        }

        match defn {
            Some(defn) => match &defn.syntax {
                Some(syntax) => self.defined_syntax(&defn, syntax, &class_name),
                None => self.default_syntax(Some(&defn), &class_name),
            },
            None => self.guessed_syntax(),
        }
    }

    /// `{ &id 5, &Type INTEGER }`
    fn default_syntax(&mut self, defn: Option<&ObjectClassDefn>, class: &str) -> Result<Object> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut settings = vec![];
        let mut types = HashMap::new();
        if self.eat(TokenKind::RightCurly).is_some() {
            return Ok(Object::DefaultSyntax(settings));
        }

        loop {
            let field = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;

            let setting = match defn {
                Some(defn) => {
                    let Some(spec) = defn.field(field.value) else {
                        return Err(ParserError::SyntaxMatch {
                            class: class.to_string(),
                            expected: defn.fields.iter().map(|f| format!("`{}`", f.name)).collect(),
                            found: describe_token(field),
                            span: field.offset..field.end(),
                        });
                    };
                    self.setting(spec, &types)?
                }
                None => self.guess_setting(Some(field.value))?,
            };

            if let Setting::Type(ty) = &setting {
                types.insert(field.value.to_string(), ty.clone());
            }
            settings.push(FieldSetting {
                field: field.value.to_string(),
                setting,
            });

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(Object::DefaultSyntax(settings))
    }

    /// Parse the setting of a field according to its specification.  `types`
    /// holds the type settings already made in the object, which give the
    /// type of variable type value fields.
    pub(super) fn setting(
        &mut self,
        spec: &FieldSpec,
        types: &HashMap<String, Type>,
    ) -> Result<Setting> {
        let variable = |field: &[String]| field.first().and_then(|f| types.get(f));

        Ok(match &spec.kind {
            FieldSpecKind::Type { .. } => Setting::Type(self.ty()?),
            FieldSpecKind::FixedTypeValue { ty, .. } => Setting::Value(self.value(Some(ty))?),
            FieldSpecKind::VariableTypeValue { field, .. } => {
                Setting::Value(self.value(variable(field))?)
            }
            FieldSpecKind::FixedTypeValueSet { ty, .. } => {
                Setting::ValueSet(self.braced_value_set(Some(ty))?)
            }
            FieldSpecKind::VariableTypeValueSet { field, .. } => {
                Setting::ValueSet(self.braced_value_set(variable(field))?)
            }
            FieldSpecKind::Object { class, .. } => Setting::Object(self.object(Some(class))?),
            FieldSpecKind::ObjectSet { class, .. } => {
                Setting::ObjectSet(self.braced_object_set(Some(class))?)
            }
        })
    }

    /// An object of a class whose definition is not available, with literal
    /// words and settings told apart by their notation
    fn guessed_syntax(&mut self) -> Result<Object> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut tokens = vec![];
        while !self.at(TokenKind::RightCurly) {
            let tok = self.token(0);
            if tok.kind == TokenKind::Comma {
                self.bump();
                tokens.push(DefinedSyntaxToken::Literal(Literal::Comma));
            } else if self.is_guessed_word(0) {
                self.bump();
                tokens.push(DefinedSyntaxToken::Literal(Literal::Word(tok.value.to_string())));
            } else {
                tokens.push(DefinedSyntaxToken::Setting {
                    field: None,
                    setting: self.guess_setting(None)?,
                });
            }
        }
        self.bump();

        Ok(Object::DefinedSyntax(tokens))
    }

    /// Could the token `n` places ahead be a literal word of a class syntax
    fn is_guessed_word(&self, n: usize) -> bool {
        let tok = self.token(n);
        if !tok.kind.is_syntax_word() {
            return false;
        }
        if tok.kind != TokenKind::ObjectClassRef {
            return true;
        }

        !self.dummies.contains_key(tok.value)
            && !self.at_field_access(n + 1)
            && !matches!(
                self.env.kind(tok.value),
                Some(SymbolKind::Type | SymbolKind::ValueSet)
            )
    }

    /// Parse a setting whose field specification is not known
    pub(super) fn guess_setting(&mut self, field: Option<&str>) -> Result<Setting> {
        if self.at(TokenKind::LeftCurly) {
            let upper = field.map(|f| NameCase::of(f).is_upper());

            if upper == Some(false) {
                return Ok(Setting::Value(self.value(None)?));
            }
            if let Some(set) = self.attempt(|p| p.braced_value_set(None)) {
                return Ok(Setting::ValueSet(set));
            }
            if upper.is_none() {
                if let Some(value) = self.attempt(|p| p.value(None)) {
                    return Ok(Setting::Value(value));
                }
            }
            return Ok(Setting::ObjectSet(self.braced_object_set(None)?));
        }

        if self.starts_type(0) {
            return Ok(Setting::Type(self.ty()?));
        }

        let tok = self.token(0);
        if tok.kind == TokenKind::ValueRefOrIdent && self.is_object_reference(tok.value) {
            return Ok(Setting::Object(self.object(None)?));
        }

        Ok(Setting::Value(self.value(None)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, compiler::parse, diagnostic::DiagnosticKind};

    fn assignments(body: &str) -> Vec<Assignment> {
        let (mut ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
        assert_eq!(diagnostics, vec![], "{body}");
        ast.modules.remove(0).assignments
    }

    fn object_of(assignment: &Assignment) -> &Object {
        match &assignment.kind {
            AssignmentKind::Object { object, .. } => object,
            kind => panic!("not an object: {kind:?}"),
        }
    }

    #[test]
    fn field_kinds() {
        let list = assignments(
            "CLS ::= CLASS {
                &id INTEGER UNIQUE,
                &Type OPTIONAL,
                &value &Type,
                &Values INTEGER,
                &VarValues &Type,
                &obj OTHER DEFAULT { &a 1 },
                &Objs OTHER
            }
            OTHER ::= CLASS { &a INTEGER }",
        );
        let AssignmentKind::ObjectClass(ObjectClass::Definition(defn)) = &list[0].kind else {
            panic!("not a class definition");
        };

        let kinds: Vec<_> = defn
            .fields
            .iter()
            .map(|f| match &f.kind {
                FieldSpecKind::Type { .. } => "type",
                FieldSpecKind::FixedTypeValue { unique: true, .. } => "unique value",
                FieldSpecKind::FixedTypeValue { .. } => "value",
                FieldSpecKind::VariableTypeValue { .. } => "variable value",
                FieldSpecKind::FixedTypeValueSet { .. } => "value set",
                FieldSpecKind::VariableTypeValueSet { .. } => "variable value set",
                FieldSpecKind::Object { .. } => "object",
                FieldSpecKind::ObjectSet { .. } => "object set",
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "unique value",
                "type",
                "variable value",
                "value set",
                "variable value set",
                "object",
                "object set"
            ]
        );
        assert_eq!(
            defn.field("&Type").map(|f| &f.kind),
            Some(&FieldSpecKind::Type {
                optionality: Some(Optionality::Optional)
            })
        );
    }

    #[test]
    fn default_syntax_objects() {
        let list = assignments(
            "CLS ::= CLASS { &id INTEGER, &Type, &val &Type }
            obj CLS ::= { &id 5, &Type BOOLEAN, &val TRUE }",
        );
        let object = object_of(&list[1]);
        assert_eq!(object.setting("&id"), Some(&Setting::Value(Value::Integer(5))));
        assert_eq!(
            object.setting("&Type"),
            Some(&Setting::Type(Type::new(TypeKind::Boolean)))
        );
        assert_eq!(object.setting("&val"), Some(&Setting::Value(Value::Boolean(true))));
    }

    #[test]
    fn unknown_field_in_default_syntax() {
        let (_, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            CLS ::= CLASS { &id INTEGER }
            obj CLS ::= { &other 5 }
            END",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SyntaxMatch);
        assert_eq!(diagnostics[0].expected, vec!["`&id`"]);
    }

    #[test]
    fn builtin_class_syntax() {
        let list = assignments("obj TYPE-IDENTIFIER ::= { INTEGER IDENTIFIED BY { 1 2 3 } }");
        let object = object_of(&list[0]);
        assert_eq!(
            object.setting("&Type"),
            Some(&Setting::Type(Type::new(TypeKind::Integer(vec![]))))
        );
        assert!(matches!(
            object.setting("&id"),
            Some(Setting::Value(Value::ObjectIdentifier(arcs))) if arcs.len() == 3
        ));
    }

    #[test]
    fn objects_of_unknown_classes_are_guessed() {
        let (mut ast, diagnostics) = parse(
            "M DEFINITIONS ::= BEGIN
            IMPORTS OPERATION FROM Remote-Operations;
            op OPERATION ::= { ARGUMENT Arg RESULT BOOLEAN CODE local : 5 }
            END",
        );
        assert_eq!(diagnostics, vec![]);
        let list = ast.modules.remove(0).assignments;
        let Object::DefinedSyntax(tokens) = object_of(&list[0]) else {
            panic!("not defined syntax");
        };

        let word = |w: &str| DefinedSyntaxToken::Literal(Literal::Word(w.into()));
        let setting = |s: Setting| DefinedSyntaxToken::Setting {
            field: None,
            setting: s,
        };
        assert_eq!(
            tokens,
            &vec![
                word("ARGUMENT"),
                setting(Setting::Type(Type::new(TypeKind::Referenced(
                    Reference::local("Arg")
                )))),
                word("RESULT"),
                setting(Setting::Type(Type::new(TypeKind::Boolean))),
                word("CODE"),
                setting(Setting::Value(Value::Choice {
                    alternative: "local".into(),
                    value: Box::new(Value::Integer(5)),
                })),
            ]
        );
    }

    #[test]
    fn field_of_object_set() {
        let list = assignments(
            "CLS ::= CLASS { &obj OTHER }
            OTHER ::= CLASS { &a INTEGER }
            Objs CLS ::= { ... }
            o OTHER ::= Objs.&obj",
        );
        assert!(matches!(
            object_of(&list[3]),
            Object::FromObject {
                objects: ReferencedObjects::ObjectSet(_),
                ..
            }
        ));
    }
}
