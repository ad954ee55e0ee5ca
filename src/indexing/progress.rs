//! Statistics for extraction batches

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Statistics collected during one extraction batch
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Units that reached `Indexed`
    pub units_indexed: usize,

    /// Units that ended `Failed`
    pub units_failed: usize,

    /// Units skipped by cancellation
    pub units_pending: usize,

    /// Symbols merged into the table
    pub symbols: usize,

    /// Diagnostics kept across all units
    pub diagnostics: usize,

    /// References still unresolved after the cross-unit pass
    pub unresolved: usize,

    /// Time elapsed during extraction
    pub elapsed: Duration,

    #[serde(skip)]
    start_time: Option<Instant>,
}

impl ExtractionStats {
    /// Create new stats and start timing
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Stop timing and record elapsed time
    pub fn stop_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = start.elapsed();
            self.start_time = None;
        }
    }

    pub fn total_units(&self) -> usize {
        self.units_indexed + self.units_failed + self.units_pending
    }

    /// Human-readable summary for terminals
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Extraction Complete:".to_string(),
            format!("  Units indexed: {}", self.units_indexed),
            format!("  Units failed: {}", self.units_failed),
        ];
        if self.units_pending > 0 {
            lines.push(format!("  Units skipped: {}", self.units_pending));
        }
        lines.push(format!("  Symbols: {}", self.symbols));
        lines.push(format!("  Diagnostics: {}", self.diagnostics));
        lines.push(format!("  Unresolved references: {}", self.unresolved));
        lines.push(format!("  Time elapsed: {:.2}s", self.elapsed.as_secs_f64()));

        if self.units_indexed > 0 {
            let symbols_per_unit = self.symbols as f64 / self.units_indexed as f64;
            lines.push(format!("  Average symbols/unit: {symbols_per_unit:.1}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut stats = ExtractionStats::new();
        stats.units_indexed = 4;
        stats.units_failed = 1;
        stats.symbols = 40;
        stats.elapsed = Duration::from_millis(1500);

        let summary = stats.summary();
        assert!(summary.contains("Units indexed: 4"));
        assert!(summary.contains("Average symbols/unit: 10.0"));
        assert!(!summary.contains("skipped"));
        assert_eq!(stats.total_units(), 5);
    }

    #[test]
    fn test_stop_timing_is_idempotent() {
        let mut stats = ExtractionStats::new();
        stats.stop_timing();
        let first = stats.elapsed;
        stats.stop_timing();
        assert_eq!(stats.elapsed, first);
    }
}
