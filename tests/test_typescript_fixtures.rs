//! TypeScript and JavaScript fixture extraction
//!
//! Every module is its own package, named after its path.

mod common;

use common::{extract_units, fixture_unit};
use symbolscope::{BarrierKind, ReferenceKind, Resolution, SymbolKind, UnitState, Visibility};

const INVENTORY: &str = "typescript/inventory.ts";
const DOWNLOADER: &str = "javascript/downloader.js";

#[test]
fn test_module_declarations() {
    let result = extract_units(vec![fixture_unit(INVENTORY)]);
    assert_eq!(result.state(INVENTORY), Some(UnitState::Indexed));
    let model = result.model(INVENTORY).unwrap();
    assert!(model.validate().is_ok());
    assert_eq!(model.package_name, "typescript.inventory");

    let source = model.find("typescript.inventory.StockSource").unwrap();
    assert_eq!(source.kind, SymbolKind::Interface);
    assert_eq!(source.visibility, Visibility::Exported);
    assert_eq!(
        source.doc_comment.as_deref(),
        Some("Anything that can report stock levels.")
    );

    let stock = model.find("typescript.inventory.MemoryStock").unwrap();
    assert_eq!(stock.kind, SymbolKind::Type);
    assert_eq!(stock.doc_comment.as_deref(), Some("Stock kept in memory"));

    let levels = model.find("typescript.inventory.MemoryStock.levels").unwrap();
    assert_eq!(levels.kind, SymbolKind::Field);
    assert_eq!(levels.visibility, Visibility::Unexported);
    assert!(!levels.mutable);
    // Constructor parameter properties are fields too
    let name = model.find("typescript.inventory.MemoryStock.name").unwrap();
    assert_eq!(name.kind, SymbolKind::Field);

    assert_eq!(
        model.find("typescript.inventory.Level").unwrap().kind,
        SymbolKind::Type
    );
    assert!(model.find("typescript.inventory.Channel.Web").is_some());

    let default_sku = model.find("typescript.inventory.DEFAULT_SKU").unwrap();
    assert_eq!(default_sku.kind, SymbolKind::GlobalVariable);
    assert_eq!(default_sku.visibility, Visibility::Unexported);
}

#[test]
fn test_class_satisfies_interface() {
    let result = extract_units(vec![fixture_unit(INVENTORY)]);
    assert_eq!(
        result.table.satisfiers("StockSource"),
        vec!["typescript.inventory.MemoryStock".to_string()]
    );
}

#[test]
fn test_timer_fan_out_skips_module_bindings() {
    let result = extract_units(vec![fixture_unit(INVENTORY)]);
    let model = result.model(INVENTORY).unwrap();

    let refresh = model.find("typescript.inventory.refreshAll").unwrap();
    assert_eq!(refresh.kind, SymbolKind::Function);
    let fan_out = refresh.fan_out().unwrap();
    assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
    assert_eq!(fan_out.spawn_sites, 1);
    assert!(fan_out.in_loop);
    // `DEFAULT_SKU` is module level and never captured
    assert_eq!(fan_out.captured, vec!["counts".to_string(), "source".to_string()]);

    let emitter = model
        .references
        .iter()
        .find(|reference| reference.kind == ReferenceKind::Call && reference.name == "EventEmitter")
        .unwrap();
    assert_eq!(emitter.resolution, Resolution::Import);
}

#[test]
fn test_javascript_classes_and_worker() {
    let result = extract_units(vec![fixture_unit(DOWNLOADER)]);
    assert_eq!(result.state(DOWNLOADER), Some(UnitState::Indexed));
    let model = result.model(DOWNLOADER).unwrap();
    assert_eq!(model.package_name, "javascript.downloader");

    let base = model.find("javascript.downloader.Downloader").unwrap();
    assert_eq!(base.doc_comment.as_deref(), Some("Base class for every downloader"));
    let embed = model
        .references
        .iter()
        .find(|reference| reference.kind == ReferenceKind::Embed)
        .unwrap();
    assert_eq!(
        embed.resolution,
        Resolution::Symbol("javascript.downloader.Downloader".into())
    );

    let fetch_all = model
        .find("javascript.downloader.BatchDownloader.fetchAll")
        .unwrap();
    assert_eq!(fetch_all.kind, SymbolKind::Method);
    let fan_out = fetch_all.fan_out().unwrap();
    assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
    assert_eq!(fan_out.captured, vec!["results".to_string(), "url".to_string()]);

    // A worker started once and signalled over its port
    let start = model.find("javascript.downloader.startWorker").unwrap();
    let fan_out = start.fan_out().unwrap();
    assert_eq!(fan_out.barrier, BarrierKind::Channel);
    assert_eq!(fan_out.spawn_sites, 1);
    assert!(!fan_out.in_loop);
    assert!(fan_out.captured.is_empty());

    assert!(model.find("javascript.downloader.readFile").is_some());
}

#[test]
fn test_modules_are_separate_packages() {
    let result = extract_units(vec![fixture_unit(INVENTORY), fixture_unit(DOWNLOADER)]);
    assert_eq!(result.stats.units_indexed, 2);
    assert!(result.table.find("typescript.inventory.refreshAll").is_some());
    assert!(result.table.find("javascript.downloader.startWorker").is_some());
    // No module sees another's declarations without an import
    assert!(result.table.find("javascript.downloader.StockSource").is_none());
}
