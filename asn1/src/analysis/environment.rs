use std::collections::HashMap;

use crate::util::NameCase;

/// Names declared by one module, built before any assignment body is parsed
/// and read only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Environment {
    /// The name of the module the symbols belong to
    pub name: String,

    symbols: HashMap<String, Symbol>,
}

/// What a declared name refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,

    /// Dummy references of a parameterized assignment, in declaration order
    pub parameters: Vec<(String, ParameterKind)>,

    /// The governor, when it is a single (possibly parameterized) reference
    pub governor: Option<String>,
}

/// The kind of definition a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Type,
    Value,
    ValueSet,
    ObjectClass,
    Object,
    ObjectSet,
    XmlValue,

    /// Listed in an import clause, so the kind is unknown
    Imported,
}

/// What must be supplied for a dummy reference at a use site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterKind {
    /// A dummy without a governor, either a type or an object class
    TypeOrClass,
    Value,
    ValueSet,
    Object,
    ObjectSet,
}

impl Environment {
    /// Create a new empty environment for a given module
    pub fn new(name: impl Into<String>) -> Environment {
        Environment {
            name: name.into(),
            symbols: HashMap::new(),
        }
    }

    /// Record an imported name, local definitions replace imports
    pub fn import(&mut self, name: &str) {
        self.symbols.entry(name.to_string()).or_insert(Symbol {
            kind: SymbolKind::Imported,
            parameters: vec![],
            governor: None,
        });
    }

    /// Record a definition of the module
    pub fn define(&mut self, name: &str, symbol: Symbol) {
        self.symbols.insert(name.to_string(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(|s| s.kind)
    }

    /// Does the name refer to an object class.  Names whose kind is unknown
    /// are classes when they are written in upper case only.
    pub fn is_class(&self, name: &str) -> bool {
        match self.kind(name) {
            Some(SymbolKind::ObjectClass) => true,
            Some(SymbolKind::Imported) | None => name.len() > 1 && NameCase::of(name) == NameCase::Yell,
            Some(_) => false,
        }
    }

    /// Parameters of a parameterized assignment, empty if the name is unknown
    pub fn parameters(&self, name: &str) -> &[(String, ParameterKind)] {
        self.get(name).map_or(&[], |s| &s.parameters)
    }
}
