#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use symbolscope::{ExtractionEngine, ExtractionResult, FileWalker, Settings, SourceUnit};
use tempfile::TempDir;

/// Directory holding the per-language fixture files
pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/languages")
}

/// Load one fixture as a source unit with a `<language>/<file>` id
pub fn fixture_unit(relative: &str) -> SourceUnit {
    let path = fixtures_root().join(relative);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
    SourceUnit::detect(relative, text)
        .unwrap_or_else(|| panic!("no language for fixture {relative}"))
}

/// Settings pinned to a given worker count so runs are comparable
pub fn settings_with_threads(threads: usize) -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.extraction.worker_threads = threads;
    Arc::new(settings)
}

pub fn extract_units(units: Vec<SourceUnit>) -> ExtractionResult {
    ExtractionEngine::new(settings_with_threads(2))
        .extract(units)
        .expect("extraction should not abort")
}

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Walk the project and run the whole batch
    pub fn extract(&self, settings: Arc<Settings>) -> ExtractionResult {
        let units = FileWalker::new(Arc::clone(&settings))
            .collect_units(self.path())
            .expect("walk should succeed");
        ExtractionEngine::new(settings)
            .extract(units)
            .expect("extraction should not abort")
    }
}
