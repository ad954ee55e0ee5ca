//! TypeScript/JavaScript language behavior implementation

use crate::parsing::{BindingRule, Language, LanguageBehavior, PackageInfo};
use crate::symbol::PackageKey;
use crate::types::SymbolKind;

/// Host globals and `this`/`super`
const BUILTINS: &[&str] = &[
    "this", "super", "undefined", "globalThis", "window", "document", "console", "process",
    "require", "module", "exports", "__dirname", "__filename", "Object", "Array", "String",
    "Number", "Boolean", "Symbol", "BigInt", "Function", "Date", "RegExp", "Math", "JSON",
    "Reflect", "Proxy", "Promise", "Map", "Set", "WeakMap", "WeakSet", "Error", "TypeError",
    "RangeError", "SyntaxError", "ReferenceError", "Intl", "ArrayBuffer", "Uint8Array",
    "DataView", "TextEncoder", "TextDecoder", "URL", "URLSearchParams", "AbortController",
    "fetch", "setTimeout", "setInterval", "setImmediate", "clearTimeout", "clearInterval",
    "queueMicrotask", "structuredClone", "parseInt", "parseFloat", "isNaN", "isFinite",
    "encodeURIComponent", "decodeURIComponent", "Worker", "MessageChannel", "SharedArrayBuffer",
    "Atomics", "NaN", "Infinity", "arguments",
];

/// Extensions stripped from a unit identifier, longest first
const EXTENSIONS: &[&str] = &[
    ".d.ts", ".tsx", ".ts", ".mts", ".cts", ".jsx", ".js", ".mjs", ".cjs",
];

/// Module path of a unit: `src/utils/index.ts` is the module `src/utils`
fn module_path(source_id: &str) -> &str {
    let normalized = source_id.trim_start_matches("./");
    let without_ext = EXTENSIONS
        .iter()
        .find_map(|ext| normalized.strip_suffix(ext))
        .unwrap_or(normalized);
    match without_ext.strip_suffix("/index") {
        Some(dir) if !dir.is_empty() => dir,
        _ => without_ext,
    }
}

/// TypeScript/JavaScript language behavior implementation
#[derive(Debug, Clone)]
pub struct TypeScriptBehavior {
    language: Language,
}

impl TypeScriptBehavior {
    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }
}

impl Default for TypeScriptBehavior {
    fn default() -> Self {
        Self::typescript()
    }
}

impl LanguageBehavior for TypeScriptBehavior {
    fn language(&self) -> Language {
        self.language
    }

    /// `let`/`const` are block scoped; `var` hoisting is not modeled
    fn binding_rule(&self) -> BindingRule {
        BindingRule::Sequential
    }

    fn is_builtin(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    /// Each module file is its own package
    fn package_for(&self, source_id: &str, _declared: Option<&str>) -> PackageInfo {
        let path = module_path(source_id);
        PackageInfo {
            key: PackageKey {
                language: self.language,
                path: path.to_string(),
            },
            qualified: path.replace('/', "."),
        }
    }

    /// Overload signatures and get/set pairs share a name
    fn allows_redeclaration(&self, kind: SymbolKind, _name: &str) -> bool {
        matches!(kind, SymbolKind::Method | SymbolKind::Function)
    }

    fn grammar(&self) -> tree_sitter::Language {
        match self.language {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_strips_extension_and_index() {
        assert_eq!(module_path("src/utils/helpers.ts"), "src/utils/helpers");
        assert_eq!(module_path("src/utils/index.tsx"), "src/utils");
        assert_eq!(module_path("types/api.d.ts"), "types/api");
        assert_eq!(module_path("./lib/run.mjs"), "lib/run");
        assert_eq!(module_path("index.js"), "index");
    }

    #[test]
    fn test_package_per_module() {
        let behavior = TypeScriptBehavior::typescript();
        let info = behavior.package_for("app/services/cart.ts", None);
        assert_eq!(info.qualified, "app.services.cart");
        assert_eq!(info.key.path, "app/services/cart");
        assert_eq!(info.key.language, Language::TypeScript);
        assert_eq!(info.simple_name(), "cart");

        let js = TypeScriptBehavior::javascript().package_for("app/services/cart.js", None);
        assert_ne!(js.key, info.key);
    }

    #[test]
    fn test_grammars_and_builtins() {
        let ts = TypeScriptBehavior::typescript();
        let js = TypeScriptBehavior::javascript();
        assert!(ts.validate_node_kind("interface_declaration"));
        assert!(!js.validate_node_kind("interface_declaration"));
        assert!(js.validate_node_kind("arrow_function"));
        assert!(ts.is_builtin("console"));
        assert!(ts.is_builtin("Promise"));
        assert!(!ts.is_builtin("cart"));
        assert_eq!(js.language(), Language::JavaScript);
        assert!(ts.allows_redeclaration(SymbolKind::Method, "value"));
        assert!(!ts.implicit_receiver());
    }
}
