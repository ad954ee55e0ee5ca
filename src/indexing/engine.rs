//! Batch extraction engine
//!
//! Units are parsed and normalized on a dedicated rayon pool. Each worker
//! sends its finished model over a channel to the calling thread, which is
//! the only writer of the symbol table. The writer merges in batch order,
//! buffering early arrivals, so duplicate detection always blames the later
//! unit of the batch.
//!
//! Per unit state machine:
//!
//! ```text
//! Pending -> Parsed -> Normalized -> Indexed
//!                  \-> Failed      \-> Failed
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::progress::ExtractionStats;
use crate::error::{Diagnostic, ExtractError, ParseError};
use crate::normalize::Normalizer;
use crate::parsing::{Language, LanguageBehavior, get_registry};
use crate::symbol::{
    PackageKey, Reference, Resolution, ScopeKind, ScopeNode, SymbolModel,
};
use crate::table::SymbolTable;
use crate::types::{Range, ScopeId, UnitId};
use crate::{ExtractResult, Settings};

/// Worker stack size; lowering and normalization recurse up to `MAX_NESTING_DEPTH`
const WORKER_STACK_BYTES: usize = 8 * 1024 * 1024;

/// One unit of source text to extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Path-like identifier, unique within a batch
    pub id: String,
    pub language: Language,
    pub text: String,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, language: Language, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language,
            text: text.into(),
        }
    }

    /// Build a unit whose language is inferred from its identifier or content
    pub fn detect(id: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let text = text.into();
        let language = Language::detect(&id, &text)?;
        Some(Self { id, language, text })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitState {
    Pending,
    Parsed,
    Normalized,
    Indexed,
    Failed,
}

impl UnitState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UnitState::Indexed | UnitState::Failed)
    }
}

/// Outcome of one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: UnitId,
    pub source_id: String,
    pub language: Language,
    pub state: UnitState,
    /// Every state the unit passed through, starting at `Pending`
    pub transitions: Vec<UnitState>,
    /// Absent for units that never left `Pending`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<SymbolModel>,
}

impl UnitReport {
    fn advance(&mut self, state: UnitState) {
        debug!("{}: {:?} -> {:?}", self.source_id, self.state, state);
        self.state = state;
        self.transitions.push(state);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.model
            .as_ref()
            .map(|model| model.diagnostics.as_slice())
            .unwrap_or_default()
    }

    /// First diagnostic that failed the unit
    pub fn fatal_diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostics().iter().find(|d| d.is_fatal())
    }
}

/// A reference no unit of the batch could resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub unit: UnitId,
    pub source_id: String,
    pub reference: Reference,
}

/// Aggregate output of one batch
#[derive(Debug)]
pub struct ExtractionResult {
    /// Reports in batch order
    pub units: Vec<UnitReport>,
    pub table: SymbolTable,
    pub unresolved: Vec<UnresolvedReference>,
    pub stats: ExtractionStats,
    /// Whether the batch was cut short by cancellation
    pub cancelled: bool,
}

#[derive(Serialize)]
struct ResultView<'a> {
    units: &'a [UnitReport],
    unresolved: &'a [UnresolvedReference],
    stats: &'a ExtractionStats,
    cancelled: bool,
}

impl ExtractionResult {
    pub fn unit(&self, source_id: &str) -> Option<&UnitReport> {
        self.units.iter().find(|report| report.source_id == source_id)
    }

    pub fn model(&self, source_id: &str) -> Option<&SymbolModel> {
        self.unit(source_id).and_then(|report| report.model.as_ref())
    }

    pub fn state(&self, source_id: &str) -> Option<UnitState> {
        self.unit(source_id).map(|report| report.state)
    }

    /// Models of every unit that produced one, in batch order
    pub fn models(&self) -> impl Iterator<Item = &SymbolModel> + '_ {
        self.units.iter().filter_map(|report| report.model.as_ref())
    }

    /// JSON rendering of reports, unresolved references and stats
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ResultView {
            units: &self.units,
            unresolved: &self.unresolved,
            stats: &self.stats,
            cancelled: self.cancelled,
        })
    }
}

/// Cooperative cancellation signal, checked between units
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Worker output for one unit
struct Processed {
    index: usize,
    report: UnitReport,
    behavior: Option<Box<dyn LanguageBehavior>>,
}

pub struct ExtractionEngine {
    settings: Arc<Settings>,
    cancel: CancellationToken,
}

impl ExtractionEngine {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Extract a batch of units.
    ///
    /// Per-unit failures are recorded in the unit's report; only fail-fast
    /// mode or a worker pool that cannot start returns an error.
    pub fn extract(&self, units: Vec<SourceUnit>) -> ExtractResult<ExtractionResult> {
        let mut stats = ExtractionStats::new();
        let config = &self.settings.extraction;
        let threads = config.worker_threads.max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("symbolscope-worker-{index}"))
            .stack_size(WORKER_STACK_BYTES)
            .build()
            .map_err(|e| ExtractError::ThreadPool {
                threads,
                reason: e.to_string(),
            })?;

        let total = units.len();
        let units: Arc<Vec<SourceUnit>> = Arc::new(units);
        let (sender, receiver) = unbounded::<Processed>();

        for index in 0..total {
            let sender = sender.clone();
            let units = Arc::clone(&units);
            let settings = Arc::clone(&self.settings);
            let cancel = self.cancel.clone();
            pool.spawn(move || {
                let unit = &units[index];
                let processed = if cancel.is_cancelled() {
                    Processed {
                        index,
                        report: pending_report(index, unit),
                        behavior: None,
                    }
                } else {
                    process_unit(index, unit, &settings)
                };
                // The writer may have stopped early in fail-fast mode
                let _ = sender.send(processed);
            });
        }
        drop(sender);

        let mut table = SymbolTable::new();
        let mut reports: Vec<UnitReport> = Vec::with_capacity(total);
        let mut buffer: BTreeMap<usize, Processed> = BTreeMap::new();
        let mut next = 0;

        for processed in receiver.iter() {
            buffer.insert(processed.index, processed);
            while let Some(processed) = buffer.remove(&next) {
                next += 1;
                let report = self.merge(&mut table, processed);
                if config.fail_fast && report.state == UnitState::Failed {
                    self.cancel.cancel();
                    let diagnostic = report
                        .fatal_diagnostic()
                        .cloned()
                        .unwrap_or_else(|| {
                            Diagnostic::Parse(ParseError::fatal(
                                "unit failed",
                                Range::new(0, 0, 0, 0),
                            ))
                        });
                    warn!("Fail-fast: aborting batch at {}", report.source_id);
                    return Err(ExtractError::FailFast {
                        unit: report.source_id,
                        diagnostic: Box::new(diagnostic),
                    });
                }
                reports.push(report);
            }
        }

        let unresolved = resolve_cross_unit(
            &table,
            &mut reports,
            config.resolve_cross_unit,
            config.max_diagnostics_per_unit,
        );

        for report in &reports {
            match report.state {
                UnitState::Indexed => stats.units_indexed += 1,
                UnitState::Failed => stats.units_failed += 1,
                _ => stats.units_pending += 1,
            }
            stats.diagnostics += report.diagnostics().len();
        }
        stats.symbols = table.len();
        stats.unresolved = unresolved.len();
        stats.stop_timing();

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            warn!(
                "Extraction cancelled: {} of {} units left pending",
                stats.units_pending, total
            );
        }
        info!(
            "Extracted {} units ({} indexed, {} failed) with {} symbols in {:.2}s",
            total,
            stats.units_indexed,
            stats.units_failed,
            stats.symbols,
            stats.elapsed.as_secs_f64()
        );

        Ok(ExtractionResult {
            units: reports,
            table,
            unresolved,
            stats,
            cancelled,
        })
    }

    /// Serialized phase: move a normalized unit into the table
    fn merge(&self, table: &mut SymbolTable, processed: Processed) -> UnitReport {
        let Processed {
            mut report,
            behavior,
            ..
        } = processed;
        if report.state != UnitState::Normalized {
            return report;
        }
        let (Some(model), Some(behavior)) = (report.model.as_mut(), behavior) else {
            return report;
        };

        if model.has_fatal_diagnostic() {
            warn!("{}: duplicate declarations inside the unit", report.source_id);
            report.advance(UnitState::Failed);
            return report;
        }

        match table.merge_model(model, behavior.as_ref()) {
            Ok(count) => {
                debug!("{}: merged {count} symbols", report.source_id);
                report.advance(UnitState::Indexed);
            }
            Err(errors) => {
                for error in errors {
                    warn!("{}: {error}", report.source_id);
                    model.push_diagnostic(Diagnostic::DuplicateName(error), 0);
                }
                report.advance(UnitState::Failed);
            }
        }
        report
    }
}

fn pending_report(index: usize, unit: &SourceUnit) -> UnitReport {
    UnitReport {
        unit: unit_id(index),
        source_id: unit.id.clone(),
        language: unit.language,
        state: UnitState::Pending,
        transitions: vec![UnitState::Pending],
        model: None,
    }
}

fn unit_id(index: usize) -> UnitId {
    UnitId(index as u32 + 1)
}

/// Parse and normalize one unit; runs on a worker thread
fn process_unit(index: usize, unit: &SourceUnit, settings: &Settings) -> Processed {
    let mut report = pending_report(index, unit);

    let pair = get_registry()
        .lock()
        .create_front_end(unit.language, settings);
    let (mut front_end, behavior) = match pair {
        Ok(pair) => pair,
        Err(e) => {
            warn!("{}: {e}", unit.id);
            report.model = Some(unavailable_model(report.unit, unit, e.to_string()));
            report.advance(UnitState::Failed);
            return Processed {
                index,
                report,
                behavior: None,
            };
        }
    };

    let output = front_end.parse(&unit.text);
    report.advance(UnitState::Parsed);
    let failed = output.is_failed();

    let model = Normalizer::new(behavior.as_ref())
        .with_max_diagnostics(settings.extraction.max_diagnostics_per_unit)
        .normalize(report.unit, &unit.id, output);
    report.model = Some(model);

    if failed {
        report.advance(UnitState::Failed);
    } else {
        report.advance(UnitState::Normalized);
    }

    Processed {
        index,
        report,
        behavior: Some(behavior),
    }
}

/// Model for a unit whose language has no usable front-end
fn unavailable_model(unit: UnitId, source: &SourceUnit, reason: String) -> SymbolModel {
    let range = Range::new(0, 0, 0, 0);
    SymbolModel {
        unit,
        source_id: source.id.clone(),
        language: source.language,
        package: PackageKey {
            language: source.language,
            path: source.id.clone(),
        },
        package_name: String::new(),
        scopes: vec![ScopeNode::new(
            ScopeId::ROOT,
            None,
            ScopeKind::Unit,
            range,
            "",
        )],
        symbols: Vec::new(),
        references: Vec::new(),
        capabilities: Vec::new(),
        imports: Vec::new(),
        diagnostics: vec![Diagnostic::Parse(ParseError::fatal(reason, range))],
        dropped_diagnostics: 0,
    }
}

/// Retry references left unresolved inside their unit against the merged
/// table, then report the rest
fn resolve_cross_unit(
    table: &SymbolTable,
    reports: &mut [UnitReport],
    enabled: bool,
    max_diagnostics: usize,
) -> Vec<UnresolvedReference> {
    let mut unresolved = Vec::new();

    for report in reports.iter_mut() {
        if report.state != UnitState::Indexed {
            continue;
        }
        let Some(model) = report.model.as_mut() else {
            continue;
        };

        let mut remaining = Vec::new();
        for reference in model.references.iter_mut().filter(|r| r.is_unresolved()) {
            let found = enabled
                .then(|| table.scope_for(model.unit, reference.scope))
                .flatten()
                .and_then(|scope| table.lookup_symbol(reference.head(), scope));
            match found {
                Some(symbol) => {
                    reference.resolution = Resolution::Symbol(symbol.qualified_name.clone())
                }
                None => remaining.push(reference.clone()),
            }
        }

        for reference in remaining {
            model.push_diagnostic(
                Diagnostic::UnresolvedReference {
                    name: reference.name.clone(),
                    range: reference.range,
                },
                max_diagnostics,
            );
            unresolved.push(UnresolvedReference {
                unit: model.unit,
                source_id: model.source_id.clone(),
                reference,
            });
        }
    }

    unresolved
}
