//! TypeScript and JavaScript language definitions for the registry

use std::sync::Arc;

use super::{TypeScriptBehavior, TypeScriptParser};
use crate::error::ExtractError;
use crate::parsing::{FrontEnd, Language, LanguageBehavior, LanguageDefinition, LanguageRegistry};
use crate::{ExtractResult, Settings};

/// TypeScript language definition
pub struct TypeScriptLanguage;

impl LanguageDefinition for TypeScriptLanguage {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn create_front_end(&self, _settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>> {
        let parser = TypeScriptParser::new().map_err(ExtractError::General)?;
        Ok(Box::new(parser))
    }

    fn create_behavior(&self) -> Box<dyn LanguageBehavior> {
        Box::new(TypeScriptBehavior::typescript())
    }
}

/// JavaScript language definition
pub struct JavaScriptLanguage;

impl LanguageDefinition for JavaScriptLanguage {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn create_front_end(&self, _settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>> {
        let parser = TypeScriptParser::javascript().map_err(ExtractError::General)?;
        Ok(Box::new(parser))
    }

    fn create_behavior(&self) -> Box<dyn LanguageBehavior> {
        Box::new(TypeScriptBehavior::javascript())
    }
}

/// Register TypeScript and JavaScript with the global registry
pub(crate) fn register(registry: &mut LanguageRegistry) {
    registry.register(Arc::new(TypeScriptLanguage));
    registry.register(Arc::new(JavaScriptLanguage));
}
