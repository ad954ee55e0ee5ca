//! Go-specific language behavior implementation

use crate::parsing::language_behavior::split_source_id;
use crate::parsing::{BindingRule, Language, LanguageBehavior, PackageInfo};
use crate::symbol::PackageKey;
use crate::types::SymbolKind;

/// Predeclared identifiers of the Go universe block
const BUILTINS: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "true", "false", "iota", "nil", "append", "cap",
    "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max", "min", "new",
    "panic", "print", "println", "real", "recover",
];

/// Go language behavior implementation
#[derive(Debug, Clone, Default)]
pub struct GoBehavior;

impl GoBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageBehavior for GoBehavior {
    fn language(&self) -> Language {
        Language::Go
    }

    fn binding_rule(&self) -> BindingRule {
        BindingRule::Sequential
    }

    fn is_builtin(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    /// Go packages are directories: `(dir, package name)` identifies one.
    /// A unit without a package clause falls back to its file stem.
    fn package_for(&self, source_id: &str, declared: Option<&str>) -> PackageInfo {
        let (dir, stem) = split_source_id(source_id);
        let name = declared.filter(|name| !name.is_empty()).unwrap_or(stem);
        let path = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };

        PackageInfo {
            key: PackageKey {
                language: Language::Go,
                path,
            },
            qualified: name.to_string(),
        }
    }

    /// `func init()` may appear any number of times per package
    fn allows_redeclaration(&self, kind: SymbolKind, name: &str) -> bool {
        kind == SymbolKind::Function && name == "init"
    }

    /// `_` fields, functions and types are legal and may repeat
    fn is_blank(&self, name: &str) -> bool {
        name == "_"
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_identity() {
        let behavior = GoBehavior::new();

        let info = behavior.package_for("svc/api/handler.go", Some("api"));
        assert_eq!(info.qualified, "api");
        assert_eq!(info.key.path, "svc/api/api");

        // Two files of one directory and package share a key
        let other = behavior.package_for("svc/api/routes.go", Some("api"));
        assert_eq!(info.key, other.key);

        // Same package name in another directory is a different package
        let elsewhere = behavior.package_for("cmd/api/main.go", Some("api"));
        assert_ne!(info.key, elsewhere.key);
    }

    #[test]
    fn test_missing_package_clause_uses_stem() {
        let info = GoBehavior::new().package_for("broken.go", None);
        assert_eq!(info.qualified, "broken");
        assert_eq!(info.key.path, "broken");
    }

    #[test]
    fn test_builtins_and_redeclaration() {
        let behavior = GoBehavior::new();
        assert!(behavior.is_builtin("len"));
        assert!(behavior.is_builtin("error"));
        assert!(!behavior.is_builtin("Compute"));
        assert!(behavior.allows_redeclaration(SymbolKind::Function, "init"));
        assert!(!behavior.allows_redeclaration(SymbolKind::Function, "main"));
        assert!(behavior.is_blank("_"));
        assert!(!behavior.is_blank("_private"));
        assert!(behavior.validate_node_kind("function_declaration"));
        assert!(!behavior.validate_node_kind("class_definition"));
    }
}
