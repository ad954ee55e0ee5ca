//! Language-specific behavior abstraction
//!
//! A front-end lowers syntax; the paired behavior answers the questions the
//! normalizer and resolver need answered per language: how names bind, which
//! names are builtins, and what package a unit belongs to.

use super::Language;
use crate::symbol::PackageKey;
use crate::types::SymbolKind;

/// How local bindings become visible inside a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingRule {
    /// Visible from the declaration point to the end of the enclosing block (Go)
    Sequential,
    /// Visible throughout the enclosing function, blocks do not scope (Python)
    FunctionWide,
}

/// Package identity of a unit plus the prefix used for qualified names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub key: PackageKey,
    pub qualified: String,
}

impl PackageInfo {
    /// Last segment of the qualified package name
    pub fn simple_name(&self) -> &str {
        self.qualified
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified)
    }
}

/// Trait for language-specific behavior and configuration
pub trait LanguageBehavior: Send + Sync {
    fn language(&self) -> Language;

    fn binding_rule(&self) -> BindingRule;

    /// Predeclared names that never resolve to user symbols
    fn is_builtin(&self, name: &str) -> bool;

    /// Package identity for a unit, given the package name the source declares
    fn package_for(&self, source_id: &str, declared: Option<&str>) -> PackageInfo;

    /// Whether a declaration may legally repeat in one scope.
    ///
    /// Repeats get a `#N` suffix on their qualified name instead of colliding.
    fn allows_redeclaration(&self, _kind: SymbolKind, _name: &str) -> bool {
        false
    }

    /// Whether a bare call inside a method may name a sibling member (Java's implicit `this`)
    fn implicit_receiver(&self) -> bool {
        false
    }

    /// Blank identifier that binds nothing (`_` in Go)
    fn is_blank(&self, _name: &str) -> bool {
        false
    }

    /// Get the tree-sitter grammar backing this language
    fn grammar(&self) -> tree_sitter::Language;

    /// Validate that a node kind exists in this language's grammar
    fn validate_node_kind(&self, node_kind: &str) -> bool {
        self.grammar().id_for_node_kind(node_kind, true) != 0
    }

    /// Get the ABI version of the language grammar
    fn abi_version(&self) -> usize {
        self.grammar().abi_version()
    }
}

/// Split a unit identifier into directory and file stem
pub(crate) fn split_source_id(source_id: &str) -> (&str, &str) {
    let normalized = source_id.trim_start_matches("./");
    let (dir, file) = match normalized.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", normalized),
    };
    let stem = file.split_once('.').map(|(stem, _)| stem).unwrap_or(file);
    (dir, stem)
}
