//! Per-unit id allocation

use super::{ScopeId, SymbolId};

/// Hands out symbol and scope ids for one unit.
///
/// Both sequences are dense and start at 1; scope 1 is the unit root, so
/// the first allocated scope is 2. A fresh allocator per unit keeps ids
/// stable no matter which worker normalizes the unit.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    symbols: u32,
    scopes: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            symbols: 0,
            scopes: ScopeId::ROOT.0,
        }
    }

    pub fn next_symbol(&mut self) -> SymbolId {
        self.symbols = self.symbols.saturating_add(1);
        SymbolId(self.symbols)
    }

    pub fn next_scope(&mut self) -> ScopeId {
        self.scopes = self.scopes.saturating_add(1);
        ScopeId(self.scopes)
    }

    /// Symbols allocated so far
    pub fn symbol_count(&self) -> u32 {
        self.symbols
    }

    /// Scopes allocated so far, root included
    pub fn scope_count(&self) -> u32 {
        self.scopes
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_independent() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_symbol(), SymbolId(1));
        assert_eq!(ids.next_scope(), ScopeId(2));
        assert_eq!(ids.next_symbol(), SymbolId(2));
        assert_eq!(ids.next_scope(), ScopeId(3));
        assert_eq!(ids.symbol_count(), 2);
        assert_eq!(ids.scope_count(), 3);
    }

    #[test]
    fn test_fresh_allocator_restarts() {
        let mut first = IdAllocator::new();
        first.next_symbol();
        let mut second = IdAllocator::default();
        assert_eq!(second.next_symbol(), SymbolId(1));
        assert_eq!(second.scope_count(), 1);
    }
}
