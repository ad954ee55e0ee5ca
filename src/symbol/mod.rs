//! Normalized symbol model
//!
//! [`Symbol`] is the language-neutral declaration record. Scopes live in
//! [`scope`], and the per-unit container with references and capability
//! sets lives in [`model`].

pub mod model;
pub mod scope;

pub use model::{
    CapabilitySet, MethodSignature, PackageKey, Reference, ReferenceKind, Resolution, SymbolModel,
};
pub use scope::{LocalBinding, ScopeKind, ScopeNode};

use crate::types::{CompactString, Range, ScopeId, SymbolId, SymbolKind, UnitId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Exported,
    Unexported,
}

/// Synchronization primitive observed around spawned work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarrierKind {
    /// Wait-group style: count launches, wait for all
    CountingBarrier,
    /// Results or completion flow through a channel/queue
    Channel,
    None,
}

/// Shape of a launch-and-wait block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOut {
    pub barrier: BarrierKind,
    /// Number of spawn statements in the callable
    pub spawn_sites: usize,
    /// Whether any spawn sits inside a loop body
    pub in_loop: bool,
    /// Variables captured by closures handed to spawned work
    pub captured: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trait", rename_all = "kebab-case")]
pub enum SymbolTrait {
    ProcessWide,
    ConcurrentFanout(FanOut),
    PointerReceiver,
    Async,
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub type_text: Option<String>,
}

/// Callable shape used for capability matching
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Param>,
    /// Number of results; `None` when the source does not say (unannotated Python)
    pub results: Option<usize>,
    pub variadic: bool,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Structural compatibility: same parameter count, and result counts agree
    /// when both sides know them.
    pub fn compatible_with(&self, required: &Signature) -> bool {
        if self.arity() != required.arity() {
            return false;
        }
        match (self.results, required.results) {
            (Some(have), Some(want)) => have == want,
            _ => true,
        }
    }
}

/// Type a method is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    /// Bare type name as written (`Comprehensive` for `*Comprehensive`)
    pub type_name: String,
    /// Qualified name of the declaring Type, when it lives in the same unit
    pub qualified: Option<String>,
    pub pointer: bool,
}

impl Receiver {
    pub fn is_resolved(&self) -> bool {
        self.qualified.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: CompactString,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub unit: UnitId,
    pub scope: ScopeId,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    pub visibility: Visibility,
    pub mutable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<SymbolTrait>,
    /// Exact captured-variable list (closures and nested functions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<String>,
    /// Embedded/base types of a Type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,
    /// Source construct kind for Unclassified symbols
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_kind: Option<String>,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        name: impl Into<CompactString>,
        qualified_name: impl Into<String>,
        kind: SymbolKind,
        unit: UnitId,
        range: Range,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            qualified_name: qualified_name.into(),
            kind,
            unit,
            scope: ScopeId::ROOT,
            range,
            doc_comment: None,
            signature: None,
            receiver: None,
            visibility: Visibility::Unexported,
            mutable: false,
            traits: Vec::new(),
            captures: Vec::new(),
            embeds: Vec::new(),
            type_text: None,
            raw_kind: None,
        }
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn with_trait(mut self, symbol_trait: SymbolTrait) -> Self {
        self.add_trait(symbol_trait);
        self
    }

    pub fn with_type_text(mut self, type_text: Option<String>) -> Self {
        self.type_text = type_text;
        self
    }

    /// Adds a trait unless an equal one is already present
    pub fn add_trait(&mut self, symbol_trait: SymbolTrait) {
        if !self.traits.contains(&symbol_trait) {
            self.traits.push(symbol_trait);
        }
    }

    pub fn is_process_wide(&self) -> bool {
        self.traits.contains(&SymbolTrait::ProcessWide)
    }

    pub fn fan_out(&self) -> Option<&FanOut> {
        self.traits.iter().find_map(|t| match t {
            SymbolTrait::ConcurrentFanout(fan_out) => Some(fan_out),
            _ => None,
        })
    }

    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Exported
    }

    /// Qualified name without the last segment
    pub fn parent_qualified(&self) -> Option<&str> {
        self.qualified_name
            .rsplit_once('.')
            .map(|(parent, _)| parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(params: usize, results: Option<usize>) -> Signature {
        Signature {
            params: (0..params)
                .map(|_| Param {
                    name: None,
                    type_text: None,
                })
                .collect(),
            results,
            variadic: false,
        }
    }

    #[test]
    fn test_signature_compatibility() {
        assert!(sig(1, Some(0)).compatible_with(&sig(1, Some(0))));
        assert!(!sig(2, Some(0)).compatible_with(&sig(1, Some(0))));
        assert!(!sig(1, Some(1)).compatible_with(&sig(1, Some(0))));
        // Unknown result arity is compatible with anything
        assert!(sig(1, None).compatible_with(&sig(1, Some(2))));
    }

    #[test]
    fn test_symbol_builder_and_traits() {
        let mut symbol = Symbol::new(
            SymbolId(1),
            "GlobalCounter",
            "comprehensive.GlobalCounter",
            SymbolKind::GlobalVariable,
            UnitId(1),
            Range::new(4, 0, 4, 21),
        )
        .with_visibility(Visibility::Exported)
        .with_mutable(true)
        .with_trait(SymbolTrait::ProcessWide);

        symbol.add_trait(SymbolTrait::ProcessWide);
        assert_eq!(symbol.traits.len(), 1);
        assert!(symbol.is_process_wide());
        assert!(symbol.is_exported());
        assert_eq!(symbol.parent_qualified(), Some("comprehensive"));
        assert!(symbol.fan_out().is_none());
    }

    #[test]
    fn test_trait_serialization_tag() {
        let fan_out = SymbolTrait::ConcurrentFanout(FanOut {
            barrier: BarrierKind::CountingBarrier,
            spawn_sites: 1,
            in_loop: true,
            captured: vec!["wg".into()],
        });
        let json = serde_json::to_value(&fan_out).unwrap();
        assert_eq!(json["trait"], "concurrent-fanout");
        assert_eq!(json["barrier"], "counting-barrier");

        let json = serde_json::to_value(SymbolTrait::ProcessWide).unwrap();
        assert_eq!(json["trait"], "process-wide");
    }
}
