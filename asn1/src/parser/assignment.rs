use tracing::trace;

use crate::{
    analysis::{Header, SymbolKind},
    ast::{Assignment, AssignmentKind, ObjectSet, ValueSet},
    token::TokenKind,
    util::NameCase,
};

use super::{constraint::ElementMode, Parser, ParserError, Result};

impl<'a> Parser<'a> {
    /// Parse the assignment starting at a header.  The kind of the assignment
    /// was decided while collecting symbols, here it is only checked against
    /// the case of the name.
    pub(super) fn assignment(&mut self, header: &Header<'a>) -> Result<Assignment> {
        let start = self.pos;
        let name = self.bump();
        let case = NameCase::of(name.value);

        match header.kind {
            SymbolKind::ObjectClass if case != NameCase::Yell => {
                return Err(ParserError::Disambiguation {
                    message: format!(
                        "object class reference `{}` must only contain upper case letters",
                        name.value
                    ),
                    span: name.offset..name.end(),
                })
            }
            SymbolKind::Type if case == NameCase::Lower => {
                return Err(ParserError::Disambiguation {
                    message: format!(
                        "value reference `{}` must be followed by its type",
                        name.value
                    ),
                    span: name.offset..name.end(),
                })
            }
            _ => {}
        }

        self.dummies = self
            .env
            .parameters(name.value)
            .iter()
            .cloned()
            .collect();

        let parameters = if header.parameters.is_some() {
            Some(self.parameter_list()?)
        } else {
            None
        };

        trace!(name = name.value, kind = ?header.kind, "dispatching assignment");

        let kind = match header.kind {
            SymbolKind::Type => {
                self.next(&[TokenKind::Assignment])?;
                AssignmentKind::Type(self.ty()?)
            }
            SymbolKind::Value => {
                let governor = self.ty()?;
                self.next(&[TokenKind::Assignment])?;
                let value = self.value(Some(&governor))?;
                AssignmentKind::Value { governor, value }
            }
            SymbolKind::ValueSet => {
                let governor = self.ty()?;
                self.next(&[TokenKind::Assignment])?;
                self.next(&[TokenKind::LeftCurly])?;
                let set = self.element_set_specs(ElementMode::Value(Some(&governor)))?;
                self.next(&[TokenKind::RightCurly])?;
                AssignmentKind::ValueSet {
                    governor,
                    set: ValueSet(set),
                }
            }
            SymbolKind::ObjectClass => {
                self.next(&[TokenKind::Assignment])?;
                AssignmentKind::ObjectClass(self.object_class()?)
            }
            SymbolKind::Object => {
                let class = self.defined_object_class()?;
                self.next(&[TokenKind::Assignment])?;
                let object = self.object(Some(&class))?;
                AssignmentKind::Object { class, object }
            }
            SymbolKind::ObjectSet => {
                let class = self.defined_object_class()?;
                self.next(&[TokenKind::Assignment])?;
                self.next(&[TokenKind::LeftCurly])?;
                let set = self.element_set_specs(ElementMode::Object(Some(&class)))?;
                self.next(&[TokenKind::RightCurly])?;
                AssignmentKind::ObjectSet {
                    class,
                    set: ObjectSet(set),
                }
            }
            SymbolKind::XmlValue => {
                self.next(&[TokenKind::Assignment])?;
                AssignmentKind::XmlValue(self.xml_typed_value()?)
            }
            SymbolKind::Imported => return Err(self.expected_item("an assignment")),
        };

        // the whole assignment must have been consumed
        self.peek(&[TokenKind::Eof])?;

        Ok(Assignment {
            name: name.value.to_string(),
            parameters,
            kind,
            span: self.span_from(start),
        })
    }
}
