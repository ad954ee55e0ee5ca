//! Python language definition for the registry

use std::sync::Arc;

use super::{PythonBehavior, PythonParser};
use crate::error::ExtractError;
use crate::parsing::{FrontEnd, Language, LanguageBehavior, LanguageDefinition, LanguageRegistry};
use crate::{ExtractResult, Settings};

/// Python language definition
pub struct PythonLanguage;

impl LanguageDefinition for PythonLanguage {
    fn language(&self) -> Language {
        Language::Python
    }

    fn create_front_end(&self, _settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>> {
        let parser = PythonParser::new().map_err(ExtractError::General)?;
        Ok(Box::new(parser))
    }

    fn create_behavior(&self) -> Box<dyn LanguageBehavior> {
        Box::new(PythonBehavior::new())
    }
}

/// Register Python language with the global registry
pub(crate) fn register(registry: &mut LanguageRegistry) {
    registry.register(Arc::new(PythonLanguage));
}
