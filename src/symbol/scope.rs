//! Lexical scopes of a symbol model

use crate::types::{Range, ScopeId, SymbolId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    /// Root scope of a source unit
    Unit,
    /// Struct/class/interface body
    TypeBody,
    /// Function, method or closure body, including its parameters
    Function,
    /// Nested block; `looping` marks loop bodies
    Block { looping: bool },
    /// List/set/dict comprehension or generator expression
    Comprehension,
}

impl ScopeKind {
    pub fn is_function(&self) -> bool {
        matches!(self, ScopeKind::Function)
    }
}

/// A non-symbol local (`x := 1`, `for _, item := range`), kept for capture analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBinding {
    pub name: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeNode {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub range: Range,
    /// Symbol whose body this scope is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<SymbolId>,
    /// Qualified-name prefix for symbols declared here
    pub prefix: String,
    /// Symbols declared directly in this scope, ordered by position
    pub symbols: Vec<SymbolId>,
    /// Nested scopes, ordered by position
    pub children: Vec<ScopeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LocalBinding>,
}

impl ScopeNode {
    pub fn new(
        id: ScopeId,
        parent: Option<ScopeId>,
        kind: ScopeKind,
        range: Range,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent,
            kind,
            range,
            owner: None,
            prefix: prefix.into(),
            symbols: Vec::new(),
            children: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_loop(&self) -> bool {
        matches!(self.kind, ScopeKind::Block { looping: true })
    }

    /// Qualified name for a simple name declared in this scope
    pub fn qualify(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }
}
