//! Java language definition for the registry

use std::sync::Arc;

use super::{JavaBehavior, JavaParser};
use crate::error::ExtractError;
use crate::parsing::{FrontEnd, Language, LanguageBehavior, LanguageDefinition, LanguageRegistry};
use crate::{ExtractResult, Settings};

/// Java language definition
pub struct JavaLanguage;

impl LanguageDefinition for JavaLanguage {
    fn language(&self) -> Language {
        Language::Java
    }

    fn create_front_end(&self, _settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>> {
        let parser = JavaParser::new().map_err(ExtractError::General)?;
        Ok(Box::new(parser))
    }

    fn create_behavior(&self) -> Box<dyn LanguageBehavior> {
        Box::new(JavaBehavior::new())
    }
}

/// Register Java language with the global registry
pub(crate) fn register(registry: &mut LanguageRegistry) {
    registry.register(Arc::new(JavaLanguage));
}
