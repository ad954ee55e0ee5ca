//! Go language definition and registration

use crate::error::ExtractError;
use crate::parsing::{FrontEnd, Language, LanguageBehavior, LanguageDefinition, LanguageRegistry};
use crate::{ExtractResult, Settings};
use std::sync::Arc;

use super::{GoBehavior, GoParser};

/// Go language definition
pub struct GoLanguage;

impl LanguageDefinition for GoLanguage {
    fn language(&self) -> Language {
        Language::Go
    }

    fn create_front_end(&self, _settings: &Settings) -> ExtractResult<Box<dyn FrontEnd>> {
        let parser = GoParser::new().map_err(ExtractError::General)?;
        Ok(Box::new(parser))
    }

    fn create_behavior(&self) -> Box<dyn LanguageBehavior> {
        Box::new(GoBehavior::new())
    }
}

/// Register Go language with the registry
pub(crate) fn register(registry: &mut LanguageRegistry) {
    registry.register(Arc::new(GoLanguage));
}
