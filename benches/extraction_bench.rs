//! Extraction benchmarks
//!
//! Measures the three stages separately: front-end parsing, normalization of
//! one unit, and a whole batch through the engine at several worker counts.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use std::path::PathBuf;
use std::sync::Arc;
use symbolscope::parsing::{
    FrontEnd, GoBehavior, GoParser, JavaParser, PythonBehavior, PythonParser, TypeScriptParser,
};
use symbolscope::{ExtractionEngine, Language, Normalizer, Settings, SourceUnit, UnitId};

fn fixture(relative: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/languages")
        .join(relative);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

/// Go package with `count` types, each with a method and a fan-out helper
fn generate_go_package(count: usize) -> String {
    let mut code = String::from("package generated\n\nimport \"sync\"\n\n");
    for i in 0..count {
        code.push_str(&format!(
            r#"// Item{i} is generated.
type Item{i} struct {{
    ID    int
    Label string
}}

func (it *Item{i}) Process(values []int) int {{
    total := 0
    var wg sync.WaitGroup
    for _, v := range values {{
        wg.Add(1)
        go func(n int) {{
            defer wg.Done()
            total += n + it.ID
        }}(v)
    }}
    wg.Wait()
    return total
}}

"#
        ));
    }
    code
}

fn bench_front_ends(c: &mut Criterion) {
    let mut group = c.benchmark_group("front_end_parse");

    let go = fixture("go/comprehensive.go");
    group.throughput(Throughput::Bytes(go.len() as u64));
    group.bench_function("go_comprehensive", |b| {
        let mut parser = GoParser::new().expect("Failed to create Go parser");
        b.iter(|| black_box(parser.parse(black_box(&go))));
    });

    let python = fixture("python/comprehensive.py");
    group.throughput(Throughput::Bytes(python.len() as u64));
    group.bench_function("python_comprehensive", |b| {
        let mut parser = PythonParser::new().expect("Failed to create Python parser");
        b.iter(|| black_box(parser.parse(black_box(&python))));
    });

    let java = fixture("java/Store.java");
    group.throughput(Throughput::Bytes(java.len() as u64));
    group.bench_function("java_store", |b| {
        let mut parser = JavaParser::new().expect("Failed to create Java parser");
        b.iter(|| black_box(parser.parse(black_box(&java))));
    });

    let typescript = fixture("typescript/inventory.ts");
    group.throughput(Throughput::Bytes(typescript.len() as u64));
    group.bench_function("typescript_inventory", |b| {
        let mut parser = TypeScriptParser::new().expect("Failed to create TypeScript parser");
        b.iter(|| black_box(parser.parse(black_box(&typescript))));
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for count in [10, 100] {
        let code = generate_go_package(count);
        let mut parser = GoParser::new().expect("Failed to create Go parser");
        let behavior = GoBehavior::new();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("go_types", count), &code, |b, code| {
            b.iter(|| {
                let output = parser.parse(code);
                let model = Normalizer::new(&behavior).normalize(
                    UnitId(1),
                    "generated/generated.go",
                    output,
                );
                black_box(model)
            });
        });
    }

    let python = fixture("python/comprehensive.py");
    let mut parser = PythonParser::new().expect("Failed to create Python parser");
    let behavior = PythonBehavior::new();
    group.bench_function("python_comprehensive", |b| {
        b.iter(|| {
            let output = parser.parse(&python);
            black_box(Normalizer::new(&behavior).normalize(UnitId(1), "app/comprehensive.py", output))
        });
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_extract");
    group.sample_size(20);

    let units: Vec<SourceUnit> = (0..32)
        .map(|i| {
            SourceUnit::new(
                format!("pkg{i}/generated.go"),
                Language::Go,
                generate_go_package(20),
            )
        })
        .collect();
    group.throughput(Throughput::Elements(units.len() as u64));

    for threads in [1, 4] {
        let mut settings = Settings::default();
        settings.extraction.worker_threads = threads;
        let settings = Arc::new(settings);
        group.bench_with_input(BenchmarkId::new("threads", threads), &units, |b, units| {
            b.iter(|| {
                let engine = ExtractionEngine::new(Arc::clone(&settings));
                black_box(engine.extract(units.clone()).expect("batch should succeed"))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_front_ends, bench_normalize, bench_batch);
criterion_main!(benches);
