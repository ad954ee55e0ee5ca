//! Language-agnostic symbol extraction
//!
//! Source units go through a per-language tree-sitter front-end, are lowered
//! into a small neutral syntax tree, normalized into a [`SymbolModel`] and
//! merged into a cross-unit [`SymbolTable`] by the [`ExtractionEngine`].

pub mod config;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod normalize;
pub mod parsing;
pub mod query;
pub mod symbol;
pub mod table;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{
    Diagnostic, DuplicateNameError, ErrorContext, ExtractError, ExtractResult, ParseError,
};
pub use indexing::{
    CancellationToken, ExtractionEngine, ExtractionResult, ExtractionStats, FileWalker,
    SourceUnit, UnitReport, UnitState, UnresolvedReference,
};
pub use normalize::Normalizer;
pub use parsing::Language;
pub use query::SymbolSource;
pub use symbol::{
    BarrierKind, CapabilitySet, FanOut, Reference, ReferenceKind, Resolution, ScopeKind,
    ScopeNode, Signature, Symbol, SymbolModel, SymbolTrait, Visibility,
};
pub use table::{Satisfaction, SymbolKey, SymbolTable, TableScope};
pub use types::{CompactString, Range, ScopeId, SymbolId, SymbolKind, UnitId, compact_string};
