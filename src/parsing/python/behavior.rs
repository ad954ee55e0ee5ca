//! Python-specific language behavior implementation

use crate::parsing::{BindingRule, Language, LanguageBehavior, PackageInfo};
use crate::symbol::PackageKey;
use crate::types::SymbolKind;

/// Names resolved from the `builtins` module
const BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "breakpoint", "bytearray", "bytes", "callable",
    "chr", "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod", "enumerate",
    "eval", "exec", "filter", "float", "format", "frozenset", "getattr", "globals", "hasattr",
    "hash", "help", "hex", "id", "input", "int", "isinstance", "issubclass", "iter", "len",
    "list", "locals", "map", "max", "memoryview", "min", "next", "object", "oct", "open", "ord",
    "pow", "print", "property", "range", "repr", "reversed", "round", "set", "setattr", "slice",
    "sorted", "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
    "__import__", "__name__", "__file__", "__doc__", "__package__", "__spec__", "__builtins__",
    "True", "False", "None", "NotImplemented", "Ellipsis", "self", "cls",
    "BaseException", "Exception", "ArithmeticError", "AssertionError", "AttributeError",
    "EOFError", "ImportError", "ModuleNotFoundError", "IndexError", "KeyError",
    "KeyboardInterrupt", "LookupError", "MemoryError", "NameError", "NotImplementedError",
    "OSError", "IOError", "OverflowError", "RecursionError", "RuntimeError", "StopIteration",
    "StopAsyncIteration", "SyntaxError", "SystemExit", "TimeoutError", "TypeError",
    "ValueError", "ZeroDivisionError", "FileNotFoundError", "PermissionError",
    "UnicodeDecodeError", "UnicodeEncodeError", "Warning", "DeprecationWarning",
];

/// Python language behavior implementation
#[derive(Debug, Clone, Default)]
pub struct PythonBehavior;

impl PythonBehavior {
    pub fn new() -> Self {
        Self
    }
}

/// Dotted module path for a unit identifier
///
/// `pkg/app/__init__.py` is the package `pkg.app` itself.
fn module_path(source_id: &str) -> String {
    let normalized = source_id.trim_start_matches("./");
    let without_ext = normalized
        .strip_suffix(".py")
        .or_else(|| normalized.strip_suffix(".pyi"))
        .unwrap_or(normalized);
    let dotted = without_ext.replace('/', ".");
    let dotted = dotted
        .strip_suffix(".__init__")
        .or_else(|| (dotted == "__init__").then_some(""))
        .unwrap_or(dotted.as_str())
        .to_string();

    if dotted.is_empty() {
        "__main__".to_string()
    } else {
        dotted
    }
}

impl LanguageBehavior for PythonBehavior {
    fn language(&self) -> Language {
        Language::Python
    }

    fn binding_rule(&self) -> BindingRule {
        BindingRule::FunctionWide
    }

    fn is_builtin(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    /// Each module is its own package; modules never declare a name
    fn package_for(&self, source_id: &str, _declared: Option<&str>) -> PackageInfo {
        let qualified = module_path(source_id);
        PackageInfo {
            key: PackageKey {
                language: Language::Python,
                path: qualified.replace('.', "/"),
            },
            qualified,
        }
    }

    /// Rebinding a `def` or `class` is legal (property setters, conditional definitions)
    fn allows_redeclaration(&self, kind: SymbolKind, _name: &str) -> bool {
        matches!(
            kind,
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Type | SymbolKind::Interface
        )
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }
}
