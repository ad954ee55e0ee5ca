//! Configuration module for the extraction pipeline.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SYMBOLSCOPE_` and use double
//! underscores to separate nested levels:
//! - `SYMBOLSCOPE_EXTRACTION__WORKER_THREADS=8` sets `extraction.worker_threads`
//! - `SYMBOLSCOPE_EXTRACTION__FAIL_FAST=true` sets `extraction.fail_fast`
//! - `SYMBOLSCOPE_LOGGING__LEVEL=debug` sets `logging.level`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory holding workspace configuration
pub const CONFIG_DIR: &str = ".symbolscope";

const ENV_PREFIX: &str = "SYMBOLSCOPE_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode (raises the default log level)
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Extraction engine configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Language-specific settings
    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Filesystem ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Upper bound on parallel workers
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Abort the batch on the first failed unit
    #[serde(default = "default_false")]
    pub fail_fast: bool,

    /// Diagnostics kept per unit; the rest are counted but dropped
    #[serde(default = "default_max_diagnostics")]
    pub max_diagnostics_per_unit: usize,

    /// Retry unit-unresolved references against the merged table
    #[serde(default = "default_true")]
    pub resolve_cross_unit: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File extensions for this language
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// One of error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestConfig {
    /// Follow symlinks while walking
    #[serde(default = "default_false")]
    pub follow_links: bool,

    /// Files above this size are skipped
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Extra gitignore-style patterns applied on top of `.gitignore`
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_worker_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_max_diagnostics() -> usize {
    crate::normalize::DEFAULT_MAX_DIAGNOSTICS
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_max_file_bytes() -> u64 {
    4 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            extraction: ExtractionConfig::default(),
            languages: default_languages(),
            logging: LoggingConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            fail_fast: false,
            max_diagnostics_per_unit: default_max_diagnostics(),
            resolve_cross_unit: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_file_bytes: default_max_file_bytes(),
            ignore_patterns: Vec::new(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();

    langs.insert(
        "go".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["go".to_string()],
        },
    );

    langs.insert(
        "python".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["py".to_string(), "pyi".to_string()],
        },
    );

    langs.insert(
        "java".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["java".to_string()],
        },
    );

    langs.insert(
        "typescript".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec![
                "ts".to_string(),
                "tsx".to_string(),
                "mts".to_string(),
                "cts".to_string(),
            ],
        },
    );

    langs.insert(
        "javascript".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec![
                "js".to_string(),
                "jsx".to_string(),
                "mjs".to_string(),
                "cjs".to_string(),
            ],
        },
    );

    langs
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting levels; single underscores stay in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.symbolscope/settings.toml` from the current directory upwards
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Whether a language key (`"go"`, `"python"`) is enabled.
    /// Languages missing from the table fall back to `default`.
    pub fn language_enabled(&self, key: &str, default: bool) -> bool {
        self.languages
            .get(key)
            .map(|config| config.enabled)
            .unwrap_or(default)
    }
}
