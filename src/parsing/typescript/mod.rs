//! TypeScript and JavaScript front-end
//!
//! One lowering pass serves both grammars: TypeScript sources parse with the
//! TSX grammar, JavaScript sources with tree-sitter-javascript. Each module
//! file is its own package, named after its path.
//!
//! Classes become types whose `extends` target is an embedding; interfaces
//! become capability sets of their method signatures. Timers, microtasks and
//! workers are spawn sites; `Promise.all` and message channels are barriers.

pub mod behavior;
pub mod definition;
pub mod parser;

pub use behavior::TypeScriptBehavior;
pub use definition::{JavaScriptLanguage, TypeScriptLanguage};
pub use parser::TypeScriptParser;

// Re-export for registry registration
pub(crate) use definition::register;
