//! Convenience queries over a unit model or the merged table

use std::collections::BTreeSet;

use crate::symbol::{Symbol, SymbolModel};
use crate::table::SymbolTable;
use crate::types::{ScopeId, SymbolKind};

/// Anything that can enumerate normalized symbols
pub trait SymbolSource {
    fn all_symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_>;

    /// Methods with this simple name, ordered by qualified name
    fn methods_named(&self, name: &str) -> Vec<&Symbol> {
        let mut methods: Vec<&Symbol> = self
            .all_symbols()
            .filter(|symbol| symbol.kind == SymbolKind::Method && symbol.name.as_ref() == name)
            .collect();
        methods.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        methods
    }

    /// Types with at least one bound method, ordered by qualified name
    fn types_with_methods(&self) -> Vec<&Symbol> {
        let owners: BTreeSet<&str> = self
            .all_symbols()
            .filter(|symbol| symbol.kind == SymbolKind::Method)
            .filter_map(|method| method.parent_qualified())
            .collect();
        let mut types: Vec<&Symbol> = self
            .all_symbols()
            .filter(|symbol| symbol.kind == SymbolKind::Type)
            .filter(|symbol| owners.contains(symbol.qualified_name.as_str()))
            .collect();
        types.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        types
    }

    /// Package-level definitions in source order
    fn top_level_definitions(&self) -> Vec<&Symbol> {
        let mut definitions: Vec<&Symbol> = self
            .all_symbols()
            .filter(|symbol| symbol.scope == ScopeId::ROOT)
            .filter(|symbol| symbol.kind.is_definition() && symbol.kind != SymbolKind::Method)
            .collect();
        definitions.sort_by(|a, b| {
            (a.unit, a.range.start(), &a.qualified_name).cmp(&(b.unit, b.range.start(), &b.qualified_name))
        });
        definitions
    }
}

impl SymbolSource for SymbolModel {
    fn all_symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_> {
        Box::new(self.symbols.iter())
    }
}

impl SymbolSource for SymbolTable {
    fn all_symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_> {
        Box::new(self.symbols().map(|(_, symbol)| symbol))
    }
}

/// Types of the table satisfying a capability, by qualified name
pub fn types_satisfying(table: &SymbolTable, capability: &str) -> Vec<String> {
    table.satisfiers(capability)
}
