//! Java-specific language behavior implementation

use crate::parsing::language_behavior::split_source_id;
use crate::parsing::{BindingRule, Language, LanguageBehavior, PackageInfo};
use crate::symbol::PackageKey;
use crate::types::SymbolKind;

/// Names visible without an import (`java.lang`) plus `this`/`super`
const BUILTINS: &[&str] = &[
    "this", "super", "Object", "String", "StringBuilder", "StringBuffer", "CharSequence",
    "System", "Math", "StrictMath", "Integer", "Long", "Short", "Byte", "Double", "Float",
    "Boolean", "Character", "Number", "Void", "Class", "Enum", "Record", "Iterable",
    "Comparable", "AutoCloseable", "Runnable", "Thread", "ThreadLocal", "Runtime", "Process",
    "ProcessBuilder", "Throwable", "Exception", "Error", "RuntimeException",
    "IllegalArgumentException", "IllegalStateException", "NullPointerException",
    "IndexOutOfBoundsException", "ArrayIndexOutOfBoundsException", "ClassCastException",
    "ArithmeticException", "NumberFormatException", "UnsupportedOperationException",
    "InterruptedException", "CloneNotSupportedException", "AssertionError",
    "OutOfMemoryError", "StackOverflowError", "Override", "Deprecated", "SuppressWarnings",
    "FunctionalInterface", "SafeVarargs",
];

/// Java language behavior implementation
#[derive(Debug, Clone, Default)]
pub struct JavaBehavior;

impl JavaBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageBehavior for JavaBehavior {
    fn language(&self) -> Language {
        Language::Java
    }

    fn binding_rule(&self) -> BindingRule {
        BindingRule::Sequential
    }

    fn is_builtin(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    /// The declared package is the identity; without one the directory is,
    /// and a unit at the root is a package of its own.
    fn package_for(&self, source_id: &str, declared: Option<&str>) -> PackageInfo {
        let qualified = match declared.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let (dir, stem) = split_source_id(source_id);
                if dir.is_empty() {
                    stem.to_string()
                } else {
                    dir.replace('/', ".")
                }
            }
        };

        PackageInfo {
            key: PackageKey {
                language: Language::Java,
                path: qualified.replace('.', "/"),
            },
            qualified,
        }
    }

    /// Overloads share a name, and fields live apart from methods
    fn allows_redeclaration(&self, kind: SymbolKind, _name: &str) -> bool {
        matches!(kind, SymbolKind::Method | SymbolKind::Function | SymbolKind::Field)
    }

    fn implicit_receiver(&self) -> bool {
        true
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }
}
