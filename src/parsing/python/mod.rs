//! Python front-end
//!
//! Lowers tree-sitter-python trees into the shared syntax vocabulary. Each
//! module is a package of its own; the module docstring documents it.
//!
//! Classes become types (or interfaces when they derive from `Protocol` or
//! `ABC`), `def` becomes a function or method depending on where it sits, and
//! `global`/`nonlocal` are passed through as binding directives. Thread,
//! process, executor and asyncio launches are reported as spawn sites.

pub mod behavior;
pub mod definition;
pub mod parser;

pub use behavior::PythonBehavior;
pub use definition::PythonLanguage;
pub use parser::PythonParser;

// Re-export for registry registration
pub(crate) use definition::register;
