//! Go front-end
//!
//! Lowers tree-sitter-go trees into the shared syntax vocabulary.
//!
//! ## Coverage
//!
//! - **Package clause and imports**: the package name seeds qualified names;
//!   imports bind their alias (or last path segment) at unit level
//! - **Types**: struct types with fields and embedded fields, interfaces with
//!   method elements and embedded interfaces, named types and aliases
//! - **Functions and methods**: value and pointer receivers, parameters,
//!   result arity, variadic parameters
//! - **Package state**: `var` and `const` groups
//! - **Bodies**: block scoping for `if`/`for`/`switch`/`select`, closures
//!   (`func` literals), `go` statements, and synchronization hints
//!   (`sync.WaitGroup`, `.Wait()`, channel sends/receives, `make(chan ...)`)
//!
//! Top-level statements that are not declarations are lowered as unknown
//! constructs; the normalizer keeps their span as an unclassified symbol.

pub mod behavior;
pub mod definition;
pub mod parser;

pub use behavior::GoBehavior;
pub use definition::GoLanguage;
pub use parser::GoParser;

// Re-export for registry registration
pub(crate) use definition::register;
