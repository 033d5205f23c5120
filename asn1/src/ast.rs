//! Typed syntax tree produced by the parser.  Every node implements `Display`,
//! printing ASN.1 notation that parses back into the same tree.

mod constraint;
mod display;
mod module;
mod object;
mod ty_or_value;
mod xml_value;

pub use self::{constraint::*, module::*, object::*, ty_or_value::*, xml_value::*};
