//! Symbol collection, the first pass over a module body that decides what
//! each assigned name refers to before any assignment body is parsed.

mod collector;
mod environment;

pub(crate) use self::{
    collector::{collect, Header},
    environment::{Environment, ParameterKind, Symbol, SymbolKind},
};
