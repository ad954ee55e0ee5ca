pub mod go;
pub mod java;
pub mod language;
pub mod language_behavior;
pub mod parser;
pub mod python;
pub mod registry;
pub mod syntax;
pub mod typescript;

pub use go::{GoBehavior, GoParser};
pub use java::{JavaBehavior, JavaParser};
pub use language::Language;
pub use language_behavior::{BindingRule, LanguageBehavior, PackageInfo};
pub use parser::{
    FrontEnd, HandledNode, MAX_NESTING_DEPTH, NodeTracker, NodeTrackingState, ParseOutput,
};
pub use python::{PythonBehavior, PythonParser};
pub use typescript::{TypeScriptBehavior, TypeScriptParser};
pub use registry::{
    FrontEndPair, LanguageDefinition, LanguageRegistry, RegistryError, get_registry,
};
pub use syntax::{
    BindingDirective, ReceiverSpec, SyncHint, SyntaxKind, SyntaxNode, SyntaxTree,
};
