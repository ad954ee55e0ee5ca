//! Per-unit symbol model: scope tree, symbols, references, capability sets

use super::{ScopeNode, Signature, Symbol};
use crate::error::Diagnostic;
use crate::parsing::Language;
use crate::types::{Range, ScopeId, SymbolId, SymbolKind, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identity of a language package; units sharing a key share a root scope
/// in the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey {
    pub language: Language,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    Call,
    TypeUse,
    /// Method receiver pointing at its Type
    Receiver,
    /// Embedded field or base class
    Embed,
}

/// Resolution state of a reference's head name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "target", rename_all = "kebab-case")]
pub enum Resolution {
    /// Resolved to a symbol's qualified name
    Symbol(String),
    /// Resolved to a non-symbol local binding
    Local,
    /// Head names an imported package/module
    Import,
    /// Head names a language builtin
    Builtin,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Target as written (`fmt.Printf`, `adder`, `Comprehensive`)
    pub name: String,
    pub range: Range,
    /// Scope the use site sits in
    pub scope: ScopeId,
    /// Innermost enclosing symbol, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<SymbolId>,
    pub resolution: Resolution,
}

impl Reference {
    /// First dotted segment, the part lexical lookup resolves
    pub fn head(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn is_unresolved(&self) -> bool {
        self.resolution == Resolution::Unresolved
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub signature: Signature,
    pub range: Range,
}

/// Named set of method signatures declared by an interface-like construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub name: String,
    pub qualified_name: String,
    /// Interface symbol declaring the set
    pub symbol: SymbolId,
    pub methods: Vec<MethodSignature>,
    /// Other capability sets folded in by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolModel {
    pub unit: UnitId,
    /// Path-like identifier of the source unit
    pub source_id: String,
    pub language: Language,
    pub package: PackageKey,
    pub package_name: String,
    pub scopes: Vec<ScopeNode>,
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    pub capabilities: Vec<CapabilitySet>,
    /// Local names introduced by imports
    pub imports: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics beyond the configured per-unit cap
    #[serde(default)]
    pub dropped_diagnostics: usize,
}

impl SymbolModel {
    pub fn root(&self) -> Option<&ScopeNode> {
        self.scope(ScopeId::ROOT)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ScopeNode> {
        self.scopes
            .get(id.index())
            .filter(|scope| scope.id == id)
            .or_else(|| self.scopes.iter().find(|scope| scope.id == id))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        let index = id.value().checked_sub(1)? as usize;
        self.symbols
            .get(index)
            .filter(|symbol| symbol.id == id)
            .or_else(|| self.symbols.iter().find(|symbol| symbol.id == id))
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        let index = id.value().checked_sub(1)? as usize;
        if self.symbols.get(index).is_some_and(|symbol| symbol.id == id) {
            return self.symbols.get_mut(index);
        }
        self.symbols.iter_mut().find(|symbol| symbol.id == id)
    }

    /// Exact qualified-name match
    pub fn find(&self, qualified_name: &str) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|symbol| symbol.qualified_name == qualified_name)
    }

    /// All symbols with a simple name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols
            .iter()
            .filter(move |symbol| symbol.name.as_ref() == name)
    }

    /// First symbol with this simple name and kind
    pub fn find_kind(&self, kind: SymbolKind, name: &str) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|symbol| symbol.kind == kind && symbol.name.as_ref() == name)
    }

    pub fn of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter().filter(move |symbol| symbol.kind == kind)
    }

    /// Methods bound to a Type of this unit
    pub fn methods_of<'a>(&'a self, type_qualified: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.of_kind(SymbolKind::Method).filter(move |method| {
            method
                .receiver
                .as_ref()
                .and_then(|receiver| receiver.qualified.as_deref())
                == Some(type_qualified)
        })
    }

    pub fn capability(&self, name: &str) -> Option<&CapabilitySet> {
        self.capabilities
            .iter()
            .find(|set| set.qualified_name == name || set.name == name)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.references.iter().filter(|r| r.is_unresolved())
    }

    /// Record a diagnostic, honoring a per-unit cap.
    ///
    /// Fatal diagnostics are always kept; others beyond `cap` are only counted.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic, cap: usize) {
        if diagnostic.is_fatal() || self.diagnostics.len() < cap {
            self.diagnostics.push(diagnostic);
        } else {
            self.dropped_diagnostics += 1;
        }
    }

    pub fn has_fatal_diagnostic(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    /// Chain of scopes from `id` outwards to the root
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = &ScopeNode> + '_ {
        let mut next = self.scope(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.and_then(|parent| self.scope(parent));
            Some(current)
        })
    }

    /// Checks the structural invariants of the model and returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        let mut owned: HashSet<SymbolId> = HashSet::new();

        for scope in &self.scopes {
            let mut names = HashSet::new();
            let mut previous: Option<&Symbol> = None;

            for id in &scope.symbols {
                let Some(symbol) = self.symbol(*id) else {
                    problems.push(format!("scope {:?} lists missing symbol {id:?}", scope.id));
                    continue;
                };
                if !owned.insert(*id) {
                    problems.push(format!("symbol '{}' belongs to two scopes", symbol.qualified_name));
                }
                if symbol.scope != scope.id {
                    problems.push(format!(
                        "symbol '{}' records scope {:?} but is listed in {:?}",
                        symbol.qualified_name, symbol.scope, scope.id
                    ));
                }
                if !names.insert(symbol.qualified_name.as_str()) {
                    problems.push(format!(
                        "duplicate qualified name '{}' in scope {:?}",
                        symbol.qualified_name, scope.id
                    ));
                }
                if let Some(prev) = previous {
                    if prev.range.start() > symbol.range.start() {
                        problems.push(format!(
                            "symbols '{}' and '{}' out of source order",
                            prev.qualified_name, symbol.qualified_name
                        ));
                    }
                    if prev.range.overlaps(&symbol.range) {
                        problems.push(format!(
                            "sibling spans overlap: '{}' and '{}'",
                            prev.qualified_name, symbol.qualified_name
                        ));
                    }
                }
                previous = Some(symbol);
            }

            let child_starts: Vec<_> = scope
                .children
                .iter()
                .filter_map(|child| self.scope(*child))
                .map(|child| child.range.start())
                .collect();
            if child_starts.windows(2).any(|pair| pair[0] > pair[1]) {
                problems.push(format!("children of scope {:?} out of source order", scope.id));
            }
        }

        for symbol in &self.symbols {
            if !owned.contains(&symbol.id) {
                problems.push(format!("symbol '{}' belongs to no scope", symbol.qualified_name));
            }
            if let Some(qualified) = symbol.receiver.as_ref().and_then(|r| r.qualified.as_ref()) {
                let declared = self
                    .find(qualified)
                    .is_some_and(|target| target.kind == SymbolKind::Type);
                if !declared {
                    problems.push(format!(
                        "method '{}' receiver '{qualified}' is not a Type of this unit",
                        symbol.qualified_name
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}
