//! Symbol resolution for state expressions.

use std::collections::HashMap;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SymbolKind {
    /// State-holding element; has a next-state value.
    Latch,
    /// Free input, chosen anew at every step.
    Input,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Dense index in declaration order.
    pub index: usize,
}

/// Maps identifiers occurring in expressions to declared symbols.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, name: impl Into<String>, kind: SymbolKind) -> usize {
        let name = name.into();
        if let Some(&index) = self.by_name.get(&name) {
            assert_eq!(
                self.symbols[index].kind, kind,
                "Symbol '{}' redeclared with a different kind",
                name
            );
            return index;
        }
        let index = self.symbols.len();
        self.by_name.insert(name.clone(), index);
        self.symbols.push(Symbol { name, kind, index });
        index
    }

    /// Declares a latch and returns its index. Redeclaring a latch returns
    /// the existing index.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared as an input.
    pub fn add_latch(&mut self, name: impl Into<String>) -> usize {
        self.declare(name, SymbolKind::Latch)
    }

    /// Declares a primary input and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared as a latch.
    pub fn add_input(&mut self, name: impl Into<String>) -> usize {
        self.declare(name, SymbolKind::Input)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&i| &self.symbols[i])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn latches(&self) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(|s| s.kind == SymbolKind::Latch)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(|s| s.kind == SymbolKind::Input)
    }
}
