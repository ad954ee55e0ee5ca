//! Batch extraction and filesystem ingestion

pub mod engine;
pub mod progress;
pub mod walker;

pub use engine::{
    CancellationToken, ExtractionEngine, ExtractionResult, SourceUnit, UnitReport, UnitState,
    UnresolvedReference,
};
pub use progress::ExtractionStats;
pub use walker::FileWalker;
