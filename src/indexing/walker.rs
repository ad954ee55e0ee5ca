//! Filesystem ingestion: discover source files and turn them into units
//!
//! The extraction core never walks directories itself; this walker is the
//! outer collaborator that builds a batch. It honors:
//! - .gitignore rules and `.symbolscopeignore` files
//! - `ingest.ignore_patterns` from settings
//! - enabled languages and their configured extensions
//! - `ingest.max_file_bytes` and `ingest.follow_links`

use crate::error::ExtractError;
use crate::indexing::SourceUnit;
use crate::parsing::{Language, get_registry};
use crate::{ExtractResult, Settings};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Custom ignore file honored next to `.gitignore`
pub const IGNORE_FILE: &str = ".symbolscopeignore";

/// Walks directories to find source files to extract
#[derive(Debug)]
pub struct FileWalker {
    settings: Arc<Settings>,
}

impl FileWalker {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Walk a directory and yield every extractable file with its language
    pub fn walk(&self, root: &Path) -> ExtractResult<impl Iterator<Item = (PathBuf, Language)>> {
        let ingest = &self.settings.ingest;
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(ingest.follow_links)
            .max_depth(None)
            .require_git(false)
            .max_filesize(Some(ingest.max_file_bytes))
            .sort_by_file_path(|a, b| a.cmp(b));
        builder.add_custom_ignore_filename(IGNORE_FILE);

        if !ingest.ignore_patterns.is_empty() {
            let mut overrides = OverrideBuilder::new(root);
            for pattern in &ingest.ignore_patterns {
                // Overrides whitelist by default; `!` turns a glob into an exclusion
                overrides
                    .add(&format!("!{pattern}"))
                    .map_err(|e| ExtractError::Config {
                        reason: format!("invalid ignore pattern '{pattern}': {e}"),
                    })?;
            }
            let overrides = overrides.build().map_err(|e| ExtractError::Config {
                reason: e.to_string(),
            })?;
            builder.overrides(overrides);
        }

        let extensions = get_registry().lock().enabled_extensions(&self.settings);

        Ok(builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(move |entry| {
                let path = entry.path();
                let extension = path.extension()?.to_str()?;
                let language = extensions
                    .iter()
                    .find(|(ext, _)| ext == extension)
                    .map(|(_, language)| *language)?;
                Some((path.to_path_buf(), language))
            }))
    }

    /// Read every discovered file into a batch, identified relative to `root`.
    ///
    /// Unreadable and non UTF-8 files are skipped with a warning.
    pub fn collect_units(&self, root: &Path) -> ExtractResult<Vec<SourceUnit>> {
        let mut units = Vec::new();
        for (path, language) in self.walk(root)? {
            match read_unit(root, &path, language) {
                Ok(unit) => units.push(unit),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        debug!("Collected {} units under {}", units.len(), root.display());
        Ok(units)
    }

    /// Count files that would be extracted (useful for dry runs)
    pub fn count_files(&self, root: &Path) -> ExtractResult<usize> {
        Ok(self.walk(root)?.count())
    }
}

/// Load one file as a unit; the id is the `/`-separated path under `root`
pub fn read_unit(root: &Path, path: &Path, language: Language) -> ExtractResult<SourceUnit> {
    let text = std::fs::read_to_string(path).map_err(|source| ExtractError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let relative = path.strip_prefix(root).unwrap_or(path);
    let id = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Ok(SourceUnit::new(id, language, text))
}
