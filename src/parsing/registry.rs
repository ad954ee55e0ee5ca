//! Language registry for front-end discovery and management
//!
//! The registry separates "available" from "enabled":
//! - Available: all languages compiled into the binary
//! - Enabled: languages activated in settings.toml
//!
//! Each language module registers a [`LanguageDefinition`] at first access
//! of the global registry.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use thiserror::Error;

use super::{FrontEnd, Language, LanguageBehavior};
use crate::{ExtractResult, Settings};

/// Front-end and behavior pair for one language
pub type FrontEndPair = (Box<dyn FrontEnd>, Box<dyn LanguageBehavior>);

/// Registry errors with actionable suggestions
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(
        "Language '{0}' not found in registry\nSuggestion: Only languages compiled into symbolscope can be extracted"
    )]
    LanguageNotFound(Language),

    #[error(
        "Language '{0}' is available but disabled\nSuggestion: Enable it in .symbolscope/settings.toml by setting languages.{key}.enabled = true",
        key = .0.config_key()
    )]
    LanguageDisabled(Language),

    #[error(
        "No language found for extension '.{0}'\nSuggestion: Check if the file type is supported or add a language mapping in settings.toml"
    )]
    ExtensionNotMapped(String),

    #[error(
        "Failed to create front-end for language '{language}': {reason}\nSuggestion: Check that the grammar ABI matches the tree-sitter runtime"
    )]
    FrontEndCreationFailed { language: Language, reason: String },
}

/// Trait for language modules to implement
pub trait LanguageDefinition: Send + Sync {
    fn language(&self) -> Language;

    /// Human-readable name (e.g., "Go", "Python")
    fn name(&self) -> &'static str {
        self.language().name()
    }

    /// File extensions this language handles, without the dot
    fn extensions(&self) -> &'static [&'static str] {
        self.language().extensions()
    }

    /// Create a front-end instance for this language
    fn create_front_end(&self, settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>>;

    /// Behaviors are stateless and need no configuration
    fn create_behavior(&self) -> Box<dyn LanguageBehavior>;

    /// Default enabled state when settings do not mention the language
    fn default_enabled(&self) -> bool {
        true
    }

    /// Check `settings.languages[key].enabled`
    fn is_enabled(&self, settings: &Settings) -> bool {
        settings.language_enabled(self.language().config_key(), self.default_enabled())
    }
}

/// Language registry that manages available and enabled languages
pub struct LanguageRegistry {
    definitions: HashMap<Language, Arc<dyn LanguageDefinition>>,

    /// Built from all available languages, not just enabled ones
    extension_map: HashMap<&'static str, Language>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            extension_map: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: Arc<dyn LanguageDefinition>) {
        let language = definition.language();
        for ext in definition.extensions() {
            self.extension_map.insert(ext, language);
        }
        self.definitions.insert(language, definition);
    }

    #[must_use]
    pub fn get(&self, language: Language) -> Option<&dyn LanguageDefinition> {
        self.definitions.get(&language).map(|def| def.as_ref())
    }

    /// The language may still be disabled in settings
    #[must_use]
    pub fn get_by_extension(&self, extension: &str) -> Option<&dyn LanguageDefinition> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        self.extension_map
            .get(ext)
            .and_then(|language| self.get(*language))
    }

    pub fn language_for_extension(&self, extension: &str) -> Result<Language, RegistryError> {
        self.get_by_extension(extension)
            .map(|def| def.language())
            .ok_or_else(|| RegistryError::ExtensionNotMapped(extension.to_string()))
    }

    /// All available languages, sorted for stable output
    pub fn iter_all(&self) -> impl Iterator<Item = &dyn LanguageDefinition> {
        let mut definitions: Vec<_> = self.definitions.values().collect();
        definitions.sort_by_key(|def| def.language());
        definitions.into_iter().map(|def| def.as_ref())
    }

    pub fn iter_enabled<'a>(
        &'a self,
        settings: &'a Settings,
    ) -> impl Iterator<Item = &'a dyn LanguageDefinition> {
        self.iter_all().filter(move |def| def.is_enabled(settings))
    }

    /// Extensions of enabled languages; `languages.<key>.extensions` overrides the defaults
    pub fn enabled_extensions(&self, settings: &Settings) -> Vec<(String, Language)> {
        self.iter_enabled(settings)
            .flat_map(|def| {
                let language = def.language();
                let configured = settings
                    .languages
                    .get(language.config_key())
                    .map(|config| config.extensions.clone())
                    .filter(|extensions| !extensions.is_empty());
                let extensions = configured.unwrap_or_else(|| {
                    def.extensions().iter().map(|ext| ext.to_string()).collect()
                });
                extensions
                    .into_iter()
                    .map(move |ext| (ext.trim_start_matches('.').to_string(), language))
            })
            .collect()
    }

    #[must_use]
    pub fn is_available(&self, language: Language) -> bool {
        self.definitions.contains_key(&language)
    }

    #[must_use]
    pub fn is_enabled(&self, language: Language, settings: &Settings) -> bool {
        self.get(language)
            .map(|def| def.is_enabled(settings))
            .unwrap_or(false)
    }

    /// Create a front-end and behavior pair, checking availability and settings
    pub fn create_front_end(
        &self,
        language: Language,
        settings: &Settings,
    ) -> Result<FrontEndPair, RegistryError> {
        let def = self
            .get(language)
            .ok_or(RegistryError::LanguageNotFound(language))?;
        if !def.is_enabled(settings) {
            return Err(RegistryError::LanguageDisabled(language));
        }

        let front_end =
            def.create_front_end(settings)
                .map_err(|e| RegistryError::FrontEndCreationFailed {
                    language,
                    reason: e.to_string(),
                })?;

        Ok((front_end, def.create_behavior()))
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instance, populated on first access
static REGISTRY: LazyLock<Mutex<LanguageRegistry>> = LazyLock::new(|| {
    let mut registry = LanguageRegistry::new();
    initialize_registry(&mut registry);
    Mutex::new(registry)
});

fn initialize_registry(registry: &mut LanguageRegistry) {
    super::go::register(registry);
    super::python::register(registry);
    super::java::register(registry);
    super::typescript::register(registry);
}

pub fn get_registry() -> &'static Mutex<LanguageRegistry> {
    &REGISTRY
}
