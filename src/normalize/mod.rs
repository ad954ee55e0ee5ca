//! Normalization of lowered syntax trees into symbol models
//!
//! One [`Normalizer`] pass turns a front-end's [`ParseOutput`] into the
//! [`SymbolModel`] of a single unit: scope tree, symbols, references and
//! capability sets. Nothing here touches shared state, so units normalize
//! independently on worker threads.
//!
//! The pass is fail-soft. Constructs the front-end could not map become
//! `Unclassified` symbols plus a diagnostic; only an unusable tree or an
//! illegal duplicate inside the unit produces a fatal diagnostic.

mod captures;
mod concurrency;
mod context;
pub mod docs;

use context::ModelBuilder;

use crate::error::Diagnostic;
use crate::parsing::{BindingRule, LanguageBehavior, ParseOutput, SyntaxKind};
use crate::symbol::{Resolution, ScopeKind, SymbolModel};
use crate::types::{Range, ScopeId, SymbolKind, UnitId};

/// Default cap on non-fatal diagnostics kept per unit
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 500;

pub struct Normalizer<'b> {
    behavior: &'b dyn LanguageBehavior,
    max_diagnostics: usize,
}

impl<'b> Normalizer<'b> {
    pub fn new(behavior: &'b dyn LanguageBehavior) -> Self {
        Self {
            behavior,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }

    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = max;
        self
    }

    /// Build the symbol model of one unit
    pub fn normalize(&self, unit: UnitId, source_id: &str, output: ParseOutput) -> SymbolModel {
        let failed = output.is_failed();
        let ParseOutput { tree, errors } = output;

        let clause = tree
            .nodes
            .iter()
            .find(|node| node.kind == SyntaxKind::Package);
        let package = self
            .behavior
            .package_for(source_id, clause.and_then(|node| node.name.as_deref()));
        let clause_range = clause.map_or(Range::new(0, 0, 0, 0), |node| node.range);

        let mut builder = ModelBuilder::new(
            self.behavior,
            unit,
            source_id,
            package,
            tree.range,
            self.max_diagnostics,
        );
        for error in errors {
            builder.push_diagnostic(Diagnostic::Parse(error));
        }

        if failed {
            let (model, ..) = builder.finish();
            return model;
        }

        builder.declare_package(clause_range);
        builder.walk_nodes(&tree.nodes);

        let (mut model, uses, targets, frames) = builder.finish();
        resolve_receivers(&mut model);
        captures::compute(&mut model, &uses, self.behavior.binding_rule(), &targets);
        concurrency::annotate(&mut model, &frames);
        resolve_references(&mut model, self.behavior);
        model
    }
}

/// Link receiver-bound methods to a Type declared in the same unit
fn resolve_receivers(model: &mut SymbolModel) {
    let types: Vec<(String, String)> = model
        .symbols
        .iter()
        .filter(|symbol| symbol.kind == SymbolKind::Type && symbol.scope == ScopeId::ROOT)
        .map(|symbol| (symbol.name.to_string(), symbol.qualified_name.clone()))
        .collect();

    for symbol in &mut model.symbols {
        let Some(receiver) = symbol.receiver.as_mut() else {
            continue;
        };
        if receiver.qualified.is_some() {
            continue;
        }
        receiver.qualified = types
            .iter()
            .find(|(name, _)| *name == receiver.type_name)
            .map(|(_, qualified)| qualified.clone());
    }

    let receivers: Vec<(usize, String)> = model
        .references
        .iter()
        .enumerate()
        .filter(|(_, reference)| reference.kind == crate::symbol::ReferenceKind::Receiver)
        .filter_map(|(index, reference)| {
            types
                .iter()
                .find(|(name, _)| *name == reference.name)
                .map(|(_, qualified)| (index, qualified.clone()))
        })
        .collect();
    for (index, qualified) in receivers {
        model.references[index].resolution = Resolution::Symbol(qualified);
    }
}

/// Classify the head segment of every pending reference by lexical lookup
fn resolve_references(model: &mut SymbolModel, behavior: &dyn LanguageBehavior) {
    let rule = behavior.binding_rule();
    let resolutions: Vec<Option<Resolution>> = model
        .references
        .iter()
        .map(|reference| {
            if !reference.is_unresolved() {
                return None;
            }
            Some(resolve_head(
                model,
                behavior,
                rule,
                reference.head(),
                reference.scope,
                reference.range,
            ))
        })
        .collect();

    for (reference, resolution) in model.references.iter_mut().zip(resolutions) {
        if let Some(resolution) = resolution {
            reference.resolution = resolution;
        }
    }
}

fn resolve_head(
    model: &SymbolModel,
    behavior: &dyn LanguageBehavior,
    rule: BindingRule,
    head: &str,
    from: ScopeId,
    at: Range,
) -> Resolution {
    for scope in model.ancestors(from) {
        let members = scope.kind == ScopeKind::TypeBody;
        if members && scope.id != from && !behavior.implicit_receiver() {
            continue;
        }
        let symbol = scope
            .symbols
            .iter()
            .filter_map(|id| model.symbol(*id))
            .find(|symbol| {
                symbol.name.as_ref() == head
                    && match symbol.kind {
                        SymbolKind::Closure | SymbolKind::Unclassified => false,
                        SymbolKind::Method => members,
                        _ => true,
                    }
            });
        if let Some(symbol) = symbol {
            return Resolution::Symbol(symbol.qualified_name.clone());
        }
        let bound = scope.bindings.iter().any(|binding| {
            binding.name == head
                && (rule == BindingRule::FunctionWide || binding.range.start() <= at.start())
        });
        if bound {
            return Resolution::Local;
        }
    }

    if model.imports.iter().any(|alias| alias == head) {
        Resolution::Import
    } else if behavior.is_builtin(head) {
        Resolution::Builtin
    } else if model.imports.iter().any(|alias| alias == "*") {
        // Anything left may come from a wildcard import
        Resolution::Import
    } else {
        Resolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{
        FrontEnd, GoBehavior, GoParser, JavaBehavior, JavaParser, Language, PythonBehavior,
        PythonParser, SyntaxNode, SyntaxTree, TypeScriptBehavior, TypeScriptParser,
    };
    use crate::symbol::{BarrierKind, ReferenceKind, SymbolTrait, Visibility};

    fn go_model(code: &str) -> SymbolModel {
        let mut parser = GoParser::new().unwrap();
        let behavior = GoBehavior::new();
        let output = parser.parse(code);
        Normalizer::new(&behavior).normalize(UnitId(1), "svc/sample.go", output)
    }

    fn python_model(code: &str) -> SymbolModel {
        let mut parser = PythonParser::new().unwrap();
        let behavior = PythonBehavior::new();
        let output = parser.parse(code);
        Normalizer::new(&behavior).normalize(UnitId(1), "app/sample.py", output)
    }

    fn java_model(code: &str) -> SymbolModel {
        let mut parser = JavaParser::new().unwrap();
        let behavior = JavaBehavior::new();
        let output = parser.parse(code);
        Normalizer::new(&behavior).normalize(UnitId(1), "shop/Sample.java", output)
    }

    fn ts_model(code: &str) -> SymbolModel {
        let mut parser = TypeScriptParser::new().unwrap();
        let behavior = TypeScriptBehavior::typescript();
        let output = parser.parse(code);
        Normalizer::new(&behavior).normalize(UnitId(1), "app/cart.ts", output)
    }

    fn js_model(code: &str) -> SymbolModel {
        let mut parser = TypeScriptParser::javascript().unwrap();
        let behavior = TypeScriptBehavior::javascript();
        let output = parser.parse(code);
        Normalizer::new(&behavior).normalize(UnitId(1), "app/fetch.js", output)
    }

    fn call_resolution(model: &SymbolModel, name: &str) -> Resolution {
        model
            .references
            .iter()
            .find(|r| r.kind == ReferenceKind::Call && r.name == name)
            .map(|r| r.resolution.clone())
            .unwrap()
    }

    #[test]
    fn test_go_type_with_methods() {
        let model = go_model(
            r#"package sample

// Worker does work.
type Worker struct {
    Name string
}

// Run runs.
func (w *Worker) Run(n int) error {
    return nil
}
"#,
        );

        let package = model.find_kind(SymbolKind::Package, "sample").unwrap();
        assert_eq!(package.qualified_name, "sample");

        let worker = model.find("sample.Worker").unwrap();
        assert_eq!(worker.kind, SymbolKind::Type);
        assert_eq!(worker.doc_comment.as_deref(), Some("Worker does work."));

        let run = model.find("sample.Worker.Run").unwrap();
        assert_eq!(run.kind, SymbolKind::Method);
        assert_eq!(run.doc_comment.as_deref(), Some("Run runs."));
        let receiver = run.receiver.as_ref().unwrap();
        assert_eq!(receiver.qualified.as_deref(), Some("sample.Worker"));
        assert!(run.traits.contains(&SymbolTrait::PointerReceiver));

        let field = model.find("sample.Worker.Name").unwrap();
        assert_eq!(field.kind, SymbolKind::Field);

        let receiver_ref = model
            .references
            .iter()
            .find(|r| r.kind == ReferenceKind::Receiver)
            .unwrap();
        assert_eq!(
            receiver_ref.resolution,
            Resolution::Symbol("sample.Worker".into())
        );
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_go_closure_captures_exact() {
        let model = go_model(
            r#"package sample

func Compute(a int, b int) int {
    c := 3
    f := func(x int) int {
        y := x + a
        return y + b
    }
    return f(c)
}
"#,
        );

        let closure = model.of_kind(SymbolKind::Closure).next().unwrap();
        assert_eq!(closure.captures, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(closure.qualified_name, "sample.Compute.<closure#1>");
    }

    #[test]
    fn test_go_shadowing_redeclaration_reads_outer() {
        let model = go_model(
            r#"package sample

func F() {
    item := 1
    g := func() {
        item := item + 1
        _ = item
    }
    g()
}

func G(ch chan int) {
    n := 2
    h := func() {
        var n = n * 2
        n, ok := <-ch
        _, _ = n, ok
    }
    h()
}
"#,
        );

        let captures = |prefix: &str| {
            model
                .of_kind(SymbolKind::Closure)
                .find(|closure| closure.qualified_name.starts_with(prefix))
                .map(|closure| closure.captures.clone())
                .unwrap()
        };
        assert_eq!(captures("sample.F."), vec!["item".to_string()]);
        assert_eq!(captures("sample.G."), vec!["ch".to_string(), "n".to_string()]);
    }

    #[test]
    fn test_go_blank_declarations_are_not_duplicates() {
        let model = go_model(
            r#"package sample

type Padded struct {
    a int32
    _ [4]byte
    b int64
    _ [8]byte
}

func _() {}

func _() {}
"#,
        );
        assert!(!model.has_fatal_diagnostic());
        assert!(model.find("sample.Padded.a").is_some());
        assert!(model.find("sample.Padded.b").is_some());
        assert!(model.find("sample.Padded._").is_none());
        assert!(model.of_kind(SymbolKind::Function).next().is_none());
    }

    #[test]
    fn test_python_comprehension_keeps_loop_captures() {
        let model = python_model(
            r#"def launch(jobs):
    results = []
    fs = [lambda: results.append(j) for j in jobs]
    return fs
"#,
        );
        let lambda = model.of_kind(SymbolKind::Closure).next().unwrap();
        assert_eq!(lambda.captures, vec!["j".to_string(), "results".to_string()]);
    }

    #[test]
    fn test_python_comprehension_iterable_reads_enclosing_name() {
        let model = python_model(
            r#"def outer(x):
    def inner():
        return [x for x in x]
    return inner
"#,
        );
        let inner = model.find("app.sample.outer.inner").unwrap();
        assert_eq!(inner.captures, vec!["x".to_string()]);

        let scopes = model
            .scopes
            .iter()
            .filter(|scope| scope.kind == ScopeKind::Comprehension)
            .count();
        assert_eq!(scopes, 1);
    }

    #[test]
    fn test_deep_nesting_is_cut_off_softly() {
        let range = Range::new(1, 0, 1, 4);
        let mut node = SyntaxNode::new(SyntaxKind::Ident, range).named("leaf");
        for _ in 0..(crate::parsing::MAX_NESTING_DEPTH * 4) {
            node = SyntaxNode::new(SyntaxKind::Block { looping: false }, range).with_children(vec![node]);
        }
        let mut tree = SyntaxTree::new(Language::Go, range);
        tree.nodes.push(node);
        let output = ParseOutput {
            tree,
            errors: Vec::new(),
        };
        let behavior = GoBehavior::new();
        let model = Normalizer::new(&behavior).normalize(UnitId(1), "svc/deep.go", output);

        assert!(!model.has_fatal_diagnostic());
        assert!(model.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::UnclassifiedConstruct { raw_kind, .. } if raw_kind == "nesting limit"
        )));
    }

    #[test]
    fn test_go_sequential_binding_not_visible_before_declaration() {
        let model = go_model(
            r#"package sample

func Outer() {
    f := func() int {
        return later
    }
    later := 1
    _ = f
    _ = later
}
"#,
        );
        let closure = model.of_kind(SymbolKind::Closure).next().unwrap();
        assert!(closure.captures.is_empty());
    }

    #[test]
    fn test_go_fan_out_with_wait_group() {
        let model = go_model(
            r#"package sample

import "sync"

func Fan(items []int) {
    var wg sync.WaitGroup
    for _, item := range items {
        wg.Add(1)
        go func(v int) {
            defer wg.Done()
            _ = v
        }(item)
    }
    wg.Wait()
}
"#,
        );

        let fan = model.find("sample.Fan").unwrap();
        let fan_out = fan.fan_out().unwrap();
        assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
        assert_eq!(fan_out.spawn_sites, 1);
        assert!(fan_out.in_loop);
        assert_eq!(fan_out.captured, vec!["wg".to_string()]);
    }

    #[test]
    fn test_go_barrier_belongs_to_innermost_callable() {
        let model = go_model(
            r#"package sample

func Mixed(items []int) {
    notify := func() chan int { return make(chan int) }
    _ = notify
    for _, item := range items {
        go func(v int) { _ = v }(item)
    }
}

func Drained(items []int) {
    done := make(chan bool)
    go func() {
        _ = items
        done <- true
    }()
}

func Signalled(done chan bool) {
    go func() {
        done <- true
    }()
}
"#,
        );

        let mixed = model.find("sample.Mixed").unwrap().fan_out().unwrap();
        assert_eq!(mixed.barrier, BarrierKind::None);
        assert_eq!(mixed.spawn_sites, 1);

        // A barrier inside the spawned closure still belongs to its launcher
        let drained = model.find("sample.Drained").unwrap().fan_out().unwrap();
        assert_eq!(drained.barrier, BarrierKind::Channel);
        let signalled = model.find("sample.Signalled").unwrap().fan_out().unwrap();
        assert_eq!(signalled.barrier, BarrierKind::Channel);
        assert_eq!(signalled.captured, vec!["done".to_string()]);
    }

    #[test]
    fn test_go_global_state_and_const() {
        let model = go_model(
            r#"package sample

var Counter int

const Limit = 10
"#,
        );
        let counter = model.find("sample.Counter").unwrap();
        assert_eq!(counter.kind, SymbolKind::GlobalVariable);
        assert!(counter.is_process_wide());

        let limit = model.find("sample.Limit").unwrap();
        assert!(!limit.mutable);
        assert!(!limit.is_process_wide());
    }

    #[test]
    fn test_go_init_redeclaration_is_suffixed() {
        let model = go_model(
            r#"package sample

func init() {}

func init() {}
"#,
        );
        assert!(model.find("sample.init").is_some());
        assert!(model.find("sample.init#2").is_some());
        assert!(!model.has_fatal_diagnostic());
    }

    #[test]
    fn test_go_duplicate_function_is_fatal() {
        let model = go_model(
            r#"package sample

func Twice() {}

func Twice() {}
"#,
        );
        assert!(model.has_fatal_diagnostic());
        assert_eq!(model.of_kind(SymbolKind::Function).count(), 1);
    }

    #[test]
    fn test_go_references_are_classified() {
        let model = go_model(
            r#"package sample

import "fmt"

func helper() int { return 1 }

func Main() {
    n := helper()
    fmt.Println(len("x"), n)
    missing()
}
"#,
        );

        let resolution = |name: &str| {
            model
                .references
                .iter()
                .find(|r| r.kind == ReferenceKind::Call && r.name == name)
                .map(|r| r.resolution.clone())
                .unwrap()
        };
        assert_eq!(resolution("helper"), Resolution::Symbol("sample.helper".into()));
        assert_eq!(resolution("fmt.Println"), Resolution::Import);
        assert_eq!(resolution("len"), Resolution::Builtin);
        assert_eq!(resolution("missing"), Resolution::Unresolved);
    }

    #[test]
    fn test_go_unknown_top_level_is_unclassified() {
        let model = go_model("package sample\n\nfunc Ok() {}\n\nx := 1\n");
        assert!(model.find("sample.Ok").is_some());
        let unclassified = model.of_kind(SymbolKind::Unclassified).next().unwrap();
        assert!(unclassified.raw_kind.is_some());
        assert!(model.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::UnclassifiedConstruct { .. }
        )));
        assert!(!model.has_fatal_diagnostic());
    }

    #[test]
    fn test_failed_output_has_no_symbols() {
        let model = go_model("}}}} ((((");
        assert!(model.has_fatal_diagnostic());
        assert!(model.symbols.is_empty());
        assert_eq!(model.scopes.len(), 1);
    }

    #[test]
    fn test_orphan_comment_is_discarded() {
        let model = go_model(
            r#"package sample

// Floating note.

func Plain() {}
"#,
        );
        assert_eq!(model.find("sample.Plain").unwrap().doc_comment, None);
    }

    #[test]
    fn test_diagnostic_cap_keeps_fatal() {
        let mut parser = GoParser::new().unwrap();
        let behavior = GoBehavior::new();
        let output = parser.parse("package sample\n\na := 1\nb := 2\nc := 3\n");
        let model = Normalizer::new(&behavior)
            .with_max_diagnostics(1)
            .normalize(UnitId(1), "sample.go", output);
        assert_eq!(model.diagnostics.len(), 1);
        assert_eq!(model.dropped_diagnostics, 2);
    }

    #[test]
    fn test_python_class_and_nested_function() {
        let model = python_model(
            r#"GLOBAL_VAR = 1

class Shape:
    sides: int = 0

    def area(self, scale):
        return scale

def outer(x):
    def inner():
        """Inner doc."""
        return x
    return inner
"#,
        );

        assert_eq!(model.package_name, "app.sample");
        let shape = model.find("app.sample.Shape").unwrap();
        assert_eq!(shape.kind, SymbolKind::Type);
        let area = model.find("app.sample.Shape.area").unwrap();
        assert_eq!(area.kind, SymbolKind::Method);
        assert_eq!(
            area.receiver.as_ref().and_then(|r| r.qualified.as_deref()),
            Some("app.sample.Shape")
        );
        assert_eq!(model.find("app.sample.Shape.sides").unwrap().kind, SymbolKind::Field);

        let inner = model.find("app.sample.outer.inner").unwrap();
        assert_eq!(inner.kind, SymbolKind::Function);
        assert_eq!(inner.doc_comment.as_deref(), Some("Inner doc."));
        assert_eq!(inner.captures, vec!["x".to_string()]);

        let global = model.find("app.sample.GLOBAL_VAR").unwrap();
        assert_eq!(global.kind, SymbolKind::GlobalVariable);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_python_function_wide_and_directives() {
        let model = python_model(
            r#"counter = 0

def outer():
    total = 0
    def bump():
        nonlocal total
        global counter
        total += 1
        counter += 1
        local = total
        return local
    return bump
"#,
        );
        let bump = model.find("app.sample.outer.bump").unwrap();
        assert_eq!(bump.captures, vec!["total".to_string()]);
    }

    #[test]
    fn test_python_lambda_in_thread() {
        let model = python_model(
            r#"import threading

def launch(jobs):
    results = []
    workers = [threading.Thread(target=lambda: results.append(j)) for j in jobs]
    for w in workers:
        w.start()
    for w in workers:
        w.join()
"#,
        );
        let launch = model.find("app.sample.launch").unwrap();
        let fan_out = launch.fan_out().unwrap();
        assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
        assert_eq!(fan_out.spawn_sites, 1);
        assert!(fan_out.captured.contains(&"results".to_string()));
    }

    #[test]
    fn test_python_redefinition_is_suffixed() {
        let model = python_model("def f():\n    pass\n\ndef f():\n    pass\n");
        assert!(model.find("app.sample.f").is_some());
        assert!(model.find("app.sample.f#2").is_some());
        assert!(!model.has_fatal_diagnostic());
    }

    #[test]
    fn test_java_bare_call_resolves_to_sibling_method() {
        let model = java_model(
            r#"package com.shop;

import java.util.*;

/** Items waiting for checkout. */
public class Cart {
    private int count;

    public int size() { return count; }

    public boolean isEmpty() { return size() == 0; }

    void fill() { List<String> xs = new ArrayList<>(); }
}
"#,
        );
        assert!(!model.has_fatal_diagnostic());
        assert_eq!(model.package_name, "com.shop");

        let cart = model.find("com.shop.Cart").unwrap();
        assert_eq!(cart.doc_comment.as_deref(), Some("Items waiting for checkout."));
        let size = model.find("com.shop.Cart.size").unwrap();
        assert_eq!(size.kind, SymbolKind::Method);
        assert_eq!(
            size.receiver.as_ref().and_then(|r| r.qualified.as_deref()),
            Some("com.shop.Cart")
        );

        assert_eq!(
            call_resolution(&model, "size"),
            Resolution::Symbol("com.shop.Cart.size".into())
        );
        // Resolved through `java.util.*`
        assert_eq!(call_resolution(&model, "ArrayList"), Resolution::Import);
    }

    #[test]
    fn test_java_overloads_and_namesake_field() {
        let model = java_model(
            r#"class Counter {
    int total() { return total; }
    int total;
    void add(int n) {}
    void add(int n, int m) {}
}
"#,
        );
        assert!(!model.has_fatal_diagnostic());
        assert!(model.find("shop.Counter.add").is_some());
        assert!(model.find("shop.Counter.add#2").is_some());
        assert_eq!(model.find("shop.Counter.total").unwrap().kind, SymbolKind::Method);
        assert_eq!(model.find("shop.Counter.total#2").unwrap().kind, SymbolKind::Field);
        assert_eq!(
            model.find("shop.Counter").unwrap().visibility,
            Visibility::Unexported
        );
    }

    #[test]
    fn test_java_executor_fan_out() {
        let model = java_model(
            r#"package jobs;

import java.util.concurrent.*;

public class Batch {
    public void run(ExecutorService pool, int[] items) throws Exception {
        CountDownLatch latch = new CountDownLatch(items.length);
        for (int item : items) {
            pool.submit(() -> {
                process(item);
                latch.countDown();
            });
        }
        pool.awaitTermination(1, TimeUnit.SECONDS);
    }

    void process(int v) {}
}
"#,
        );
        let run = model.find("jobs.Batch.run").unwrap();
        let fan_out = run.fan_out().unwrap();
        assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
        assert_eq!(fan_out.spawn_sites, 1);
        assert!(fan_out.in_loop);
        assert!(fan_out.captured.contains(&"item".to_string()));
        assert!(fan_out.captured.contains(&"latch".to_string()));
    }

    #[test]
    fn test_typescript_module_package_and_captures() {
        let model = ts_model(
            r#"import { Item } from "./item";

export function makeCounter(start: number) {
    let count = start;
    const step = 1;
    return () => {
        count += step;
        return count;
    };
}

const helper = (item: Item) => item;
"#,
        );
        assert!(!model.has_fatal_diagnostic());
        assert_eq!(model.package_name, "app.cart");

        let counter = model.find("app.cart.makeCounter").unwrap();
        assert_eq!(counter.kind, SymbolKind::Function);
        assert_eq!(counter.visibility, Visibility::Exported);

        let closure = model.of_kind(SymbolKind::Closure).next().unwrap();
        assert_eq!(closure.captures, vec!["count".to_string(), "step".to_string()]);

        let helper = model.find("app.cart.helper").unwrap();
        assert_eq!(helper.kind, SymbolKind::Function);
        assert_eq!(helper.visibility, Visibility::Unexported);
    }

    #[test]
    fn test_typescript_this_calls_are_builtin_heads() {
        let model = ts_model(
            r#"class Cart {
    total(): number { return 0; }
    size(): number { return this.total(); }
    clear(): void { total(); }
}
"#,
        );
        assert_eq!(model.find("app.cart.Cart.total").unwrap().kind, SymbolKind::Method);
        assert_eq!(call_resolution(&model, "this.total"), Resolution::Builtin);
        // No implicit receiver: a bare name does not reach class members
        assert_eq!(call_resolution(&model, "total"), Resolution::Unresolved);
    }

    #[test]
    fn test_javascript_timer_fan_out() {
        let model = js_model(
            r#"async function fetchAll(urls) {
  const results = [];
  for (const url of urls) {
    setTimeout(() => results.push(url), 0);
  }
  await Promise.all(results);
}
"#,
        );
        let fetch_all = model.find("app.fetch.fetchAll").unwrap();
        let fan_out = fetch_all.fan_out().unwrap();
        assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
        assert_eq!(fan_out.spawn_sites, 1);
        assert!(fan_out.in_loop);
        assert_eq!(
            fan_out.captured,
            vec!["results".to_string(), "url".to_string()]
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let code = "package sample\n\nfunc A() { f := func() {}; f() }\n";
        assert_eq!(go_model(code), go_model(code));
    }
}
