use crate::{
    analysis::ParameterKind,
    ast::{
        ActualParameter, DefinedObjectClass, Elements, ObjectSet, ObjectSetElement,
        ParamGovernor, Parameter, Type, ValueSet,
    },
    token::TokenKind,
};

use super::{
    constraint::{single_element, ElementMode},
    Parser, Result,
};

impl<'a> Parser<'a> {
    /// Parse the dummy references of a parameterized assignment
    /// ```bnf
    /// ParameterList ::= "{" Parameter ("," Parameter)* "}"
    /// Parameter ::= ParamGovernor ":" DummyReference | DummyReference
    /// ```
    pub(super) fn parameter_list(&mut self) -> Result<Vec<Parameter>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut parameters = vec![];
        loop {
            parameters.push(self.parameter()?);

            let tok = self.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
            if tok.kind == TokenKind::RightCurly {
                break;
            }
        }

        Ok(parameters)
    }

    fn parameter(&mut self) -> Result<Parameter> {
        let names = &[
            TokenKind::TypeOrModuleRef,
            TokenKind::ValueRefOrIdent,
            TokenKind::ObjectClassRef,
        ];

        if matches!(self.kind(1), TokenKind::Comma | TokenKind::RightCurly) {
            let dummy = self.next(names)?;
            return Ok(Parameter {
                governor: None,
                dummy: dummy.value.to_string(),
            });
        }

        let tok = self.token(0);
        let governor = if self.dummies.contains_key(tok.value) && self.kind(1) == TokenKind::Colon {
            self.bump();
            ParamGovernor::Dummy(tok.value.to_string())
        } else if self.is_class_start(0) {
            ParamGovernor::Class(self.defined_object_class()?)
        } else {
            ParamGovernor::Type(self.ty()?)
        };

        self.next(&[TokenKind::Colon])?;
        let dummy = self.next(names)?;

        Ok(Parameter {
            governor: Some(governor),
            dummy: dummy.value.to_string(),
        })
    }

    /// Parse the actual parameters given to a reference.  Each parameter is
    /// parsed according to the governor of the matching dummy reference in the
    /// referenced definition.  Definitions from other modules are not known,
    /// so their parameters are guessed from the notation.
    /// ```bnf
    /// ActualParameterList ::= "{" ActualParameter ("," ActualParameter)* "}"
    /// ```
    pub(super) fn actual_parameters(
        &mut self,
        module: Option<&str>,
        name: &str,
    ) -> Result<Vec<ActualParameter>> {
        let kinds: Vec<ParameterKind> = match module {
            Some(_) => vec![],
            None => self.env.parameters(name).iter().map(|(_, k)| *k).collect(),
        };

        self.nested(|p| {
            p.next(&[TokenKind::LeftCurly])?;

            let mut parameters = vec![];
            loop {
                let kind = kinds.get(parameters.len()).copied();
                parameters.push(p.actual_parameter(kind)?);

                let tok = p.next(&[TokenKind::Comma, TokenKind::RightCurly])?;
                if tok.kind == TokenKind::RightCurly {
                    break;
                }
            }

            Ok(parameters)
        })
    }

    fn actual_parameter(&mut self, kind: Option<ParameterKind>) -> Result<ActualParameter> {
        match kind {
            Some(ParameterKind::TypeOrClass) => {
                if self.is_class_start(0) {
                    Ok(ActualParameter::Class(self.defined_object_class()?))
                } else {
                    Ok(ActualParameter::Type(self.ty()?))
                }
            }
            Some(ParameterKind::Value) => Ok(ActualParameter::Value(self.value(None)?)),
            Some(ParameterKind::ValueSet) => {
                if self.at(TokenKind::LeftCurly) {
                    Ok(ActualParameter::ValueSet(self.braced_value_set(None)?))
                } else {
                    Ok(ActualParameter::Type(self.ty()?))
                }
            }
            Some(ParameterKind::Object) => Ok(ActualParameter::Object(self.object(None)?)),
            Some(ParameterKind::ObjectSet) => {
                if self.at(TokenKind::LeftCurly) {
                    Ok(ActualParameter::ObjectSet(self.braced_object_set(None)?))
                } else {
                    let reference = self.reference(&[
                        TokenKind::TypeOrModuleRef,
                        TokenKind::ObjectClassRef,
                    ])?;
                    Ok(ActualParameter::ObjectSet(ObjectSet(single_element(
                        Elements::Object(ObjectSetElement::ObjectSet(reference)),
                    ))))
                }
            }
            None => self.guess_actual_parameter(),
        }
    }

    /// Parameter of a definition whose dummy references are unknown
    fn guess_actual_parameter(&mut self) -> Result<ActualParameter> {
        if self.is_class_start(0) && !self.at_field_access(1) {
            return Ok(ActualParameter::Class(self.defined_object_class()?));
        }

        if self.starts_type(0) {
            return Ok(ActualParameter::Type(self.ty()?));
        }

        if self.at(TokenKind::LeftCurly) {
            let value = self.attempt(|p| {
                let value = p.value(None)?;
                p.peek(&[TokenKind::Comma, TokenKind::RightCurly])?;
                Ok(value)
            });
            if let Some(value) = value {
                return Ok(ActualParameter::Value(value));
            }

            if let Some(set) = self.attempt(|p| p.braced_value_set(None)) {
                return Ok(ActualParameter::ValueSet(set));
            }
            return Ok(ActualParameter::ObjectSet(self.braced_object_set(None)?));
        }

        Ok(ActualParameter::Value(self.value(None)?))
    }

    /// `{ ElementSetSpecs }` of values
    pub(super) fn braced_value_set(&mut self, governor: Option<&Type>) -> Result<ValueSet> {
        self.next(&[TokenKind::LeftCurly])?;
        let set = self.element_set_specs(ElementMode::Value(governor))?;
        self.next(&[TokenKind::RightCurly])?;
        Ok(ValueSet(set))
    }

    /// `{ ObjectSetSpec }`
    pub(super) fn braced_object_set(
        &mut self,
        class: Option<&DefinedObjectClass>,
    ) -> Result<ObjectSet> {
        self.next(&[TokenKind::LeftCurly])?;
        let set = self.element_set_specs(ElementMode::Object(class))?;
        self.next(&[TokenKind::RightCurly])?;
        Ok(ObjectSet(set))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, compiler::parse};

    fn parse_ok(body: &str) -> ModuleDefinition {
        let (mut ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
        assert_eq!(diagnostics, vec![]);
        ast.modules.remove(0)
    }

    #[test]
    fn governed_parameters() {
        let module = parse_ok(
            "Pair { CLS, CLS : obj, INTEGER : low, CLS : Objs } ::= SEQUENCE { a INTEGER }
            CLS ::= CLASS { &id INTEGER }",
        );
        let parameters = module.assignments[0].parameters.clone().unwrap();
        assert_eq!(parameters[0].governor, None);
        assert_eq!(
            parameters[1].governor,
            Some(ParamGovernor::Dummy("CLS".into()))
        );
        assert_eq!(
            parameters[2].governor,
            Some(ParamGovernor::Type(Type::new(TypeKind::Integer(vec![]))))
        );
        assert_eq!(parameters[3].dummy, "Objs");
    }

    #[test]
    fn actual_parameters_follow_dummy_kinds() {
        let module = parse_ok(
            "Use ::= Gen { INTEGER, 5, { 1 | 2 }, { obj } }
            Gen { T, INTEGER : v, INTEGER : Vs, CLS : Os } ::= SEQUENCE { a T }
            CLS ::= CLASS { &id INTEGER }
            obj CLS ::= { &id 1 }",
        );
        let AssignmentKind::Type(ty) = &module.assignments[0].kind else {
            panic!("not a type");
        };
        let TypeKind::Referenced(reference) = &ty.kind else {
            panic!("not a reference");
        };
        let parameters = reference.parameters.as_ref().unwrap();
        assert!(matches!(parameters[0], ActualParameter::Type(_)));
        assert_eq!(parameters[1], ActualParameter::Value(Value::Integer(5)));
        assert!(matches!(parameters[2], ActualParameter::ValueSet(_)));
        assert!(matches!(parameters[3], ActualParameter::ObjectSet(_)));
    }

    #[test]
    fn imported_parameters_are_guessed() {
        let module = parse_ok(
            "IMPORTS Gen, CLS FROM Other;
            Use ::= Gen { INTEGER, 5, CLS, { 1 | 2 } }",
        );
        let AssignmentKind::Type(ty) = &module.assignments[0].kind else {
            panic!("not a type");
        };
        let TypeKind::Referenced(reference) = &ty.kind else {
            panic!("not a reference");
        };
        let parameters = reference.parameters.as_ref().unwrap();
        assert!(matches!(parameters[0], ActualParameter::Type(_)));
        assert_eq!(parameters[1], ActualParameter::Value(Value::Integer(5)));
        assert!(matches!(parameters[2], ActualParameter::Class(_)));
        assert!(matches!(parameters[3], ActualParameter::ValueSet(_)));
    }
}
