//! Whole-batch behavior: walking, ordering, cross-unit merging and the
//! failure modes of the engine.

mod common;

use common::{TestProject, extract_units, fixture_unit, settings_with_threads};
use std::sync::Arc;
use symbolscope::{
    CancellationToken, ExtractError, ExtractionEngine, Resolution, ScopeId, Settings, SourceUnit,
    SymbolKind, SymbolSource, TableScope, UnitState,
};

const SHAPE: &str = r#"package geometry

type Shape interface {
    Area() float64
    Scale(factor float64)
}
"#;

const SQUARE: &str = r#"package geometry

type Square struct {
    side float64
}
"#;

const SQUARE_METHODS: &str = r#"package geometry

func (s *Square) Area() float64 { return s.side * s.side }

func (s *Square) Scale(factor float64) { s.side *= factor }

func NewSquare() *Square { return &Square{side: 1} }
"#;

#[test]
fn test_capability_spans_three_units() {
    let project = TestProject::new();
    project.add_file("geometry/shape.go", SHAPE);
    project.add_file("geometry/square.go", SQUARE);
    project.add_file("geometry/square_methods.go", SQUARE_METHODS);

    let result = project.extract(settings_with_threads(3));
    assert_eq!(result.stats.units_indexed, 3);
    assert_eq!(result.stats.units_failed, 0);

    assert_eq!(
        result.table.satisfiers("Shape"),
        vec!["geometry.Square".to_string()]
    );
    assert!(
        result
            .table
            .resolve_capability("geometry.Square", "geometry.Shape")
            .is_satisfied()
    );

    // Methods are attached to a type declared in another unit of the package
    let owners: Vec<_> = result
        .table
        .types_with_methods()
        .iter()
        .map(|symbol| symbol.qualified_name.clone())
        .collect();
    assert_eq!(owners, vec!["geometry.Square".to_string()]);
    assert_eq!(result.table.methods_named("Scale").len(), 1);
}

#[test]
fn test_duplicate_across_units_fails_later_unit() {
    let project = TestProject::new();
    project.add_file("svc/a.go", "package svc\n\nfunc Start() {}\n\nfunc OnlyA() {}\n");
    project.add_file("svc/b.go", "package svc\n\nfunc OnlyB() {}\n\nfunc Start() {}\n");

    let result = project.extract(settings_with_threads(4));
    assert_eq!(result.state("svc/a.go"), Some(UnitState::Indexed));
    assert_eq!(result.state("svc/b.go"), Some(UnitState::Failed));

    let report = result.unit("svc/b.go").unwrap();
    let fatal = report.fatal_diagnostic().unwrap();
    assert_eq!(fatal.status_code(), "DUPLICATE_NAME");
    assert_eq!(
        report.transitions,
        vec![
            UnitState::Pending,
            UnitState::Parsed,
            UnitState::Normalized,
            UnitState::Failed
        ]
    );

    // The rejected unit contributes nothing to the table
    assert!(result.table.find("svc.OnlyA").is_some());
    assert!(result.table.find("svc.OnlyB").is_none());
    let start = result.table.find("svc.Start").unwrap();
    assert_eq!(result.table.source_id(start.unit), Some("svc/a.go"));
}

#[test]
fn test_same_name_in_different_packages_is_fine() {
    let project = TestProject::new();
    project.add_file("alpha/run.go", "package alpha\n\nfunc Run() {}\n");
    project.add_file("beta/run.go", "package beta\n\nfunc Run() {}\n");
    project.add_file("tools/run.py", "def Run():\n    pass\n");

    let result = project.extract(settings_with_threads(2));
    assert_eq!(result.stats.units_indexed, 3);
    assert!(result.table.find("alpha.Run").is_some());
    assert!(result.table.find("beta.Run").is_some());
    assert!(result.table.find("tools.run.Run").is_some());
}

#[test]
fn test_cross_unit_reference_and_lookup() {
    let project = TestProject::new();
    project.add_file("app/helpers.go", "package app\n\nfunc Helper() int { return 1 }\n");
    project.add_file(
        "app/main.go",
        "package app\n\nfunc Main() int {\n    return Helper() + Missing()\n}\n",
    );

    let result = project.extract(settings_with_threads(2));
    let model = result.model("app/main.go").unwrap();
    let helper = model
        .references
        .iter()
        .find(|reference| reference.name == "Helper")
        .unwrap();
    assert_eq!(helper.resolution, Resolution::Symbol("app.Helper".into()));

    assert_eq!(result.unresolved.len(), 1);
    assert_eq!(result.unresolved[0].reference.name, "Missing");
    assert_eq!(result.unresolved[0].source_id, "app/main.go");
    assert!(
        model
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.status_code() == "UNRESOLVED_REFERENCE")
    );

    // Both units share one package scope in the table
    let main_unit = model.unit;
    let scope = result.table.scope_for(main_unit, ScopeId::ROOT).unwrap();
    assert!(matches!(scope, TableScope::Package(_)));
    let found = result.table.lookup_symbol("Helper", scope).unwrap();
    assert_eq!(found.qualified_name, "app.Helper");
    assert!(result.table.lookup("Nowhere", scope).is_none());

    // Position lookup lands on the innermost declaration
    let at = result.table.symbol_at(main_unit, 3, 8).unwrap();
    assert_eq!(at.qualified_name, "app.Main");
}

#[test]
fn test_unclassified_construct_does_not_fail_unit() {
    let units = vec![SourceUnit::new(
        "odd/odd.go",
        symbolscope::Language::Go,
        "package odd\n\nfunc Fine() {}\n\nstray := 1\n",
    )];
    let result = extract_units(units);
    let report = result.unit("odd/odd.go").unwrap();
    assert_eq!(report.state, UnitState::Indexed);
    assert!(
        report
            .diagnostics()
            .iter()
            .any(|diagnostic| diagnostic.status_code() == "UNCLASSIFIED_CONSTRUCT")
    );
    let model = report.model.as_ref().unwrap();
    assert!(model.find("odd.Fine").is_some());
    assert!(model.of_kind(SymbolKind::Unclassified).next().is_some());
}

#[test]
fn test_results_are_independent_of_worker_count() {
    let units = || {
        vec![
            fixture_unit("go/comprehensive.go"),
            fixture_unit("go/workers.go"),
            fixture_unit("go/server.go"),
            fixture_unit("python/comprehensive.py"),
            fixture_unit("python/malformed.py"),
        ]
    };
    let run = |threads: usize| {
        ExtractionEngine::new(settings_with_threads(threads))
            .extract(units())
            .unwrap()
    };

    let single = run(1);
    let parallel = run(8);
    let order: Vec<_> = single.units.iter().map(|r| r.source_id.clone()).collect();
    let parallel_order: Vec<_> = parallel.units.iter().map(|r| r.source_id.clone()).collect();
    assert_eq!(order, parallel_order);

    let single_models: Vec<_> = single.models().cloned().collect();
    let parallel_models: Vec<_> = parallel.models().cloned().collect();
    assert_eq!(single_models, parallel_models);
    assert_eq!(single.table.len(), parallel.table.len());
    assert_eq!(
        single.table.satisfiers("Processor"),
        parallel.table.satisfiers("Processor")
    );
}

#[test]
fn test_cancelled_batch_leaves_units_pending() {
    let token = CancellationToken::new();
    token.cancel();
    let engine = ExtractionEngine::new(settings_with_threads(2)).with_cancellation(token);

    let result = engine
        .extract(vec![
            fixture_unit("go/comprehensive.go"),
            fixture_unit("python/comprehensive.py"),
        ])
        .unwrap();
    assert!(result.cancelled);
    assert_eq!(result.stats.units_pending, 2);
    assert!(result.table.is_empty());
    assert!(result.units.iter().all(|report| report.state == UnitState::Pending));
    assert!(result.units.iter().all(|report| report.model.is_none()));
}

#[test]
fn test_fail_fast_stops_at_broken_unit() {
    let mut settings = Settings::default();
    settings.extraction.worker_threads = 2;
    settings.extraction.fail_fast = true;
    let engine = ExtractionEngine::new(Arc::new(settings));

    let outcome = engine.extract(vec![
        fixture_unit("go/comprehensive.go"),
        SourceUnit::new("junk/junk.go", symbolscope::Language::Go, "}}}} ))) {{{\n"),
        fixture_unit("go/server.go"),
    ]);
    match outcome {
        Err(ExtractError::FailFast { unit, diagnostic }) => {
            assert_eq!(unit, "junk/junk.go");
            assert_eq!(diagnostic.status_code(), "PARSE_ERROR");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("fail-fast batch should abort"),
    }
    assert!(engine.cancellation_token().is_cancelled());
}

#[test]
fn test_broken_unit_without_fail_fast_is_isolated() {
    let result = extract_units(vec![
        SourceUnit::new("junk/junk.go", symbolscope::Language::Go, "}}}} ))) {{{\n"),
        fixture_unit("go/server.go"),
    ]);
    assert_eq!(result.state("junk/junk.go"), Some(UnitState::Failed));
    assert_eq!(result.state("go/server.go"), Some(UnitState::Indexed));
    assert_eq!(result.stats.units_failed, 1);
    assert_eq!(result.stats.units_indexed, 1);

    let junk = result.model("junk/junk.go").unwrap();
    assert!(junk.symbols.is_empty());
    assert!(result.table.find("main.main").is_some());
}

#[test]
fn test_json_output_lists_units() {
    let result = extract_units(vec![fixture_unit("go/server.go")]);
    let json = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let units = value["units"].as_array().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["source_id"], "go/server.go");
}

#[test]
fn test_disabled_language_is_not_walked() {
    let project = TestProject::new();
    project.add_file("lib/a.go", "package lib\n\nfunc A() {}\n");
    project.add_file("lib/b.py", "def b():\n    pass\n");

    let mut settings = Settings::default();
    settings.extraction.worker_threads = 1;
    if let Some(python) = settings.languages.get_mut("python") {
        python.enabled = false;
    }
    let result = project.extract(Arc::new(settings));
    assert_eq!(result.units.len(), 1);
    assert_eq!(result.units[0].source_id, "lib/a.go");
}

#[test]
fn test_deeply_nested_expression_is_indexed() {
    let depth = 10_000;
    let code = format!(
        "package deep\n\nvar X = {}1{}\n\nfunc After() {{}}\n",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let result = extract_units(vec![SourceUnit::new(
        "deep/deep.go",
        symbolscope::Language::Go,
        code,
    )]);

    let report = result.unit("deep/deep.go").unwrap();
    assert_eq!(report.state, UnitState::Indexed);
    assert!(
        report
            .diagnostics()
            .iter()
            .any(|diagnostic| diagnostic.status_code() == "UNCLASSIFIED_CONSTRUCT")
    );
    assert!(result.table.find("deep.X").is_some());
    assert!(result.table.find("deep.After").is_some());
}
