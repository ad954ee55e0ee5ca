//! Java front-end
//!
//! Lowers tree-sitter-java trees into the shared syntax vocabulary. The
//! `package` declaration names the package; a unit without one falls back to
//! its directory.
//!
//! Classes, records and enums become types whose superclass is an embedding,
//! so inherited methods count toward capability checks. Interfaces become
//! capability sets built from their abstract methods. Thread creation and
//! executor submissions are spawn sites; joins, latches and queues are the
//! barriers.

pub mod behavior;
pub mod definition;
pub mod parser;

pub use behavior::JavaBehavior;
pub use definition::JavaLanguage;
pub use parser::JavaParser;

// Re-export for registry registration
pub(crate) use definition::register;
