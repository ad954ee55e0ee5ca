//! Error types for the extraction pipeline
//!
//! Two layers:
//! - [`Diagnostic`]: per-unit problems. These are collected into a unit's
//!   diagnostics list and never abort a batch on their own.
//! - [`ExtractError`]: batch-level failures (fail-fast aborts, worker pool,
//!   configuration, ingestion I/O).

use crate::parsing::RegistryError;
use crate::types::{Range, UnitId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Front-end parse failure at a location
///
/// `recoverable` errors are localized syntax problems in an otherwise usable
/// tree; the unit still proceeds. Unrecoverable ones fail the unit.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} at {range}")]
pub struct ParseError {
    pub message: String,
    pub range: Range,
    pub recoverable: bool,
}

impl ParseError {
    pub fn recoverable(message: impl Into<String>, range: Range) -> Self {
        Self {
            message: message.into(),
            range,
            recoverable: true,
        }
    }

    pub fn fatal(message: impl Into<String>, range: Range) -> Self {
        Self {
            message: message.into(),
            range,
            recoverable: false,
        }
    }
}

/// Two symbols with one qualified name in a single scope
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "Duplicate symbol '{qualified_name}' at {rejected_range} (unit {rejected_unit:?}); already declared at {existing_range} (unit {existing_unit:?})"
)]
pub struct DuplicateNameError {
    pub qualified_name: String,
    pub existing_unit: UnitId,
    pub existing_range: Range,
    pub rejected_unit: UnitId,
    pub rejected_range: Range,
}

/// Per-unit diagnostic
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    #[error("Parse error: {0}")]
    Parse(ParseError),

    #[error("Unclassified construct '{raw_kind}' at {range}")]
    UnclassifiedConstruct { raw_kind: String, range: Range },

    #[error(transparent)]
    DuplicateName(DuplicateNameError),

    #[error("Unresolved reference '{name}' at {range}")]
    UnresolvedReference { name: String, range: Range },
}

impl Diagnostic {
    /// Whether this diagnostic moves its unit to `Failed`
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Parse(e) => !e.recoverable,
            Self::DuplicateName(_) => true,
            Self::UnclassifiedConstruct { .. } | Self::UnresolvedReference { .. } => false,
        }
    }

    /// Stable identifier for programmatic consumers
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Parse(e) if e.recoverable => "SYNTAX_RECOVERED",
            Self::Parse(_) => "PARSE_ERROR",
            Self::UnclassifiedConstruct { .. } => "UNCLASSIFIED_CONSTRUCT",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Self::Parse(e) => e.range,
            Self::UnclassifiedConstruct { range, .. } => *range,
            Self::DuplicateName(e) => e.rejected_range,
            Self::UnresolvedReference { range, .. } => *range,
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<DuplicateNameError> for Diagnostic {
    fn from(e: DuplicateNameError) -> Self {
        Self::DuplicateName(e)
    }
}

/// Batch-level error type
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Extraction aborted at unit '{unit}': {diagnostic}")]
    FailFast {
        unit: String,
        diagnostic: Box<Diagnostic>,
    },

    #[error("Failed to build worker pool with {threads} threads: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// General errors for context-wrapped failures
    #[error("{0}")]
    General(String),
}

impl ExtractError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::FailFast { .. } => "FAIL_FAST",
            Self::ThreadPool { .. } => "THREAD_POOL_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Registry(_) => "REGISTRY_ERROR",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FailFast { .. } => vec![
                "Disable extraction.fail_fast to collect diagnostics for every unit",
                "Inspect the reported unit; other units were not merged",
            ],
            Self::ThreadPool { .. } => vec![
                "Lower extraction.worker_threads",
                "Set SYMBOLSCOPE_EXTRACTION__WORKER_THREADS=1 to run single-threaded",
            ],
            Self::Config { .. } => vec![
                "Check .symbolscope/settings.toml for typos",
                "Remove the file to fall back to defaults",
            ],
            Self::Registry(_) => vec![
                "Enable the language under [languages.<name>] in settings.toml",
            ],
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Non UTF-8 files are skipped by the walker",
            ],
            Self::General(_) => vec![],
        }
    }
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, ExtractError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, ExtractError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, ExtractError> {
        self.map_err(|e| ExtractError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, ExtractError> {
        self.map_err(|e| {
            ExtractError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_fatality() {
        let range = Range::new(0, 0, 0, 1);
        assert!(Diagnostic::from(ParseError::fatal("no tree", range)).is_fatal());
        assert!(!Diagnostic::from(ParseError::recoverable("missing }", range)).is_fatal());
        assert!(
            !Diagnostic::UnclassifiedConstruct {
                raw_kind: "for_statement".into(),
                range
            }
            .is_fatal()
        );
        assert!(
            !Diagnostic::UnresolvedReference {
                name: "Helper".into(),
                range
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_status_codes_are_stable() {
        let range = Range::new(3, 0, 3, 4);
        let dup = DuplicateNameError {
            qualified_name: "shapes.X".into(),
            existing_unit: UnitId(1),
            existing_range: range,
            rejected_unit: UnitId(2),
            rejected_range: range,
        };
        let diag = Diagnostic::from(dup);
        assert_eq!(diag.status_code(), "DUPLICATE_NAME");
        assert!(diag.is_fatal());
        assert!(diag.to_string().contains("shapes.X"));
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let diag = Diagnostic::UnresolvedReference {
            name: "Helper".into(),
            range: Range::new(0, 0, 0, 6),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "UnresolvedReference");
        assert_eq!(json["name"], "Helper");
    }

    #[test]
    fn test_extract_error_suggestions() {
        let err = ExtractError::ThreadPool {
            threads: 0,
            reason: "zero".into(),
        };
        assert_eq!(err.status_code(), "THREAD_POOL_ERROR");
        assert!(!err.recovery_suggestions().is_empty());
    }
}
