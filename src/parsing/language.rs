//! Language detection and enumeration
//!
//! This module provides language detection from file extensions, with a
//! content-based fallback for units whose identifier carries no usable
//! extension.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Java,
    TypeScript,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Go,
        Language::Python,
        Language::Java,
        Language::TypeScript,
        Language::JavaScript,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.extensions().contains(&ext_lower.as_str()))
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse a language tag (`"go"`, `"Python"`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "go" | "golang" => Some(Language::Go),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "typescript" | "ts" => Some(Language::TypeScript),
            "javascript" | "js" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Guess from source text when the identifier has no known extension
    pub fn sniff(text: &str) -> Option<Self> {
        let has_line = |prefix: &str| text.lines().any(|line| line.trim_start().starts_with(prefix));

        let java_package = text.lines().any(|line| {
            let line = line.trim();
            line.starts_with("package ") && line.ends_with(';')
        });
        if java_package || has_line("public class ") || has_line("public interface ") {
            return Some(Language::Java);
        }
        if has_line("package ") && (text.contains("func ") || text.contains("import ")) {
            return Some(Language::Go);
        }
        let es_import = text.contains(" from '") || text.contains(" from \"");
        if has_line("export ") || has_line("function ") || has_line("const ") || es_import {
            let typed = [": string", ": number", ": boolean", "interface ", "implements "]
                .iter()
                .any(|marker| text.contains(marker));
            return Some(if typed {
                Language::TypeScript
            } else {
                Language::JavaScript
            });
        }
        if (has_line("def ") || has_line("class ") || has_line("import ")) && text.contains(':') {
            return Some(Language::Python);
        }
        None
    }

    /// Extension first, then content
    pub fn detect(id: &str, text: &str) -> Option<Self> {
        Self::from_path(Path::new(id)).or_else(|| Self::sniff(text))
    }

    /// Get default file extensions for this language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Go => &["go"],
            Language::Python => &["py", "pyi"],
            Language::Java => &["java"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
        }
    }

    /// Get the configuration key for this language
    pub fn config_key(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Java => "java",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
