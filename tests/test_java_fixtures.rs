//! Java fixture extraction
//!
//! The `shop` package is split over three files: the interface, the store
//! implementing it and a record. Together they exercise cross-unit package
//! merging, implicit `this` calls and executor fan-out.

mod common;

use common::{extract_units, fixture_unit};
use symbolscope::{BarrierKind, ReferenceKind, Resolution, SymbolKind, UnitState, Visibility};

fn shop_units() -> Vec<symbolscope::SourceUnit> {
    vec![
        fixture_unit("java/Inventory.java"),
        fixture_unit("java/Store.java"),
        fixture_unit("java/Item.java"),
    ]
}

#[test]
fn test_package_spans_three_units() {
    let result = extract_units(shop_units());
    assert_eq!(result.stats.units_indexed, 3);
    assert_eq!(result.stats.units_failed, 0);

    let model = result.model("java/Store.java").unwrap();
    assert!(model.validate().is_ok());
    assert_eq!(model.package_name, "shop");

    let store = model.find("shop.Store").unwrap();
    assert_eq!(store.kind, SymbolKind::Type);
    assert_eq!(store.visibility, Visibility::Exported);
    assert_eq!(store.doc_comment.as_deref(), Some("In-memory store backed by a map."));

    let limit = model.find("shop.Store.LIMIT").unwrap();
    assert_eq!(limit.kind, SymbolKind::Field);
    assert!(!limit.mutable);
    let stock = model.find("shop.Store.stock").unwrap();
    assert_eq!(stock.visibility, Visibility::Unexported);

    // The implemented interface lives in a sibling unit
    let implemented = model
        .references
        .iter()
        .find(|reference| reference.kind == ReferenceKind::TypeUse && reference.name == "Inventory")
        .unwrap();
    assert_eq!(implemented.resolution, Resolution::Symbol("shop.Inventory".into()));
    assert!(result.unresolved.is_empty());
}

#[test]
fn test_store_satisfies_inventory() {
    let result = extract_units(shop_units());

    let inventory = result.table.find("shop.Inventory").unwrap();
    assert_eq!(inventory.kind, SymbolKind::Interface);
    assert_eq!(
        inventory.doc_comment.as_deref(),
        Some("Stock lookups shared by every store.")
    );

    // Default methods are not requirements
    assert_eq!(
        result.table.satisfiers("Inventory"),
        vec!["shop.Store".to_string()]
    );
    assert!(
        !result
            .table
            .resolve_capability("shop.Item", "shop.Inventory")
            .is_satisfied()
    );
}

#[test]
fn test_implicit_this_call_resolves_to_method() {
    let result = extract_units(shop_units());
    let model = result.model("java/Store.java").unwrap();

    let count = model.find("shop.Store.count").unwrap();
    assert_eq!(count.kind, SymbolKind::Method);
    assert_eq!(
        count.receiver.as_ref().and_then(|r| r.qualified.as_deref()),
        Some("shop.Store")
    );

    let call = model
        .references
        .iter()
        .find(|reference| reference.kind == ReferenceKind::Call && reference.name == "count")
        .unwrap();
    assert_eq!(call.resolution, Resolution::Symbol("shop.Store.count".into()));

    let capacity = model.find("shop.Store.capacity").unwrap();
    assert_eq!(capacity.visibility, Visibility::Unexported);
    assert!(capacity.fan_out().is_none());
}

#[test]
fn test_executor_restock_fan_out() {
    let result = extract_units(shop_units());
    let model = result.model("java/Store.java").unwrap();

    let restock = model.find("shop.Store.restock").unwrap();
    assert_eq!(restock.doc_comment.as_deref(), Some("Restock every sku on a worker pool"));
    let fan_out = restock.fan_out().unwrap();
    assert_eq!(fan_out.barrier, BarrierKind::CountingBarrier);
    assert_eq!(fan_out.spawn_sites, 1);
    assert!(fan_out.in_loop);
    // `stock` is a field reached through `this`, not a capture
    assert_eq!(fan_out.captured, vec!["latch".to_string(), "sku".to_string()]);
}

#[test]
fn test_record_and_enum() {
    let result = extract_units(shop_units());
    let model = result.model("java/Item.java").unwrap();

    let item = model.find("shop.Item").unwrap();
    assert_eq!(item.kind, SymbolKind::Type);
    assert_eq!(item.doc_comment.as_deref(), Some("One line of an order."));

    let quantity = model.find("shop.Item.quantity").unwrap();
    assert_eq!(quantity.kind, SymbolKind::Field);
    assert!(!quantity.mutable);
    let total = model.find("shop.Item.total").unwrap();
    assert_eq!(total.kind, SymbolKind::Method);
    assert_eq!(total.signature.as_ref().map(|s| s.arity()), Some(1));

    let unit = model.find("shop.Unit").unwrap();
    assert_eq!(unit.visibility, Visibility::Unexported);
    let piece = model.find("shop.Unit.PIECE").unwrap();
    assert_eq!(piece.kind, SymbolKind::Field);
    assert!(!piece.mutable);
}

#[test]
fn test_units_report_in_input_order() {
    let result = extract_units(shop_units());
    let order: Vec<_> = result.units.iter().map(|report| report.source_id.as_str()).collect();
    assert_eq!(
        order,
        vec!["java/Inventory.java", "java/Store.java", "java/Item.java"]
    );
    assert!(result.units.iter().all(|report| report.state == UnitState::Indexed));
}
