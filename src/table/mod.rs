//! Cross-unit symbol table
//!
//! Symbols are keyed by `(unit, scope)`. A unit's root scope folds into the
//! scope of its package, so every unit of one package shares a root and a
//! package-level name can only be claimed once. Nested scopes stay private
//! to their unit.
//!
//! The table has a single writer (the extraction engine's merge loop) and
//! is read freely afterwards.

pub mod capability;

pub use capability::Satisfaction;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DuplicateNameError;
use crate::parsing::LanguageBehavior;
use crate::symbol::{CapabilitySet, PackageKey, Symbol, SymbolModel};
use crate::types::{ScopeId, SymbolId, SymbolKind, UnitId};

/// Identity of a symbol in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolKey {
    pub unit: UnitId,
    pub id: SymbolId,
}

/// A scope of the merged table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableScope {
    /// Shared root of every unit in a package
    Package(usize),
    /// Non-root scope of one unit
    Unit(UnitId, ScopeId),
}

#[derive(Debug, Default)]
struct ScopeEntry {
    parent: Option<TableScope>,
    prefix: String,
    by_qualified: HashMap<String, SymbolKey>,
    /// Symbols whose qualified name is `prefix.name`
    by_simple: HashMap<String, Vec<SymbolKey>>,
}

#[derive(Debug)]
struct PackageEntry {
    key: PackageKey,
    qualified: String,
    units: Vec<UnitId>,
    /// Receiver-bound methods of every unit in the package
    methods: Vec<SymbolKey>,
}

#[derive(Debug)]
struct UnitEntry {
    package: usize,
    source_id: String,
    symbols: Vec<SymbolKey>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<SymbolKey, Symbol>,
    locations: HashMap<SymbolKey, TableScope>,
    scopes: HashMap<TableScope, ScopeEntry>,
    packages: Vec<PackageEntry>,
    package_index: HashMap<PackageKey, usize>,
    units: HashMap<UnitId, UnitEntry>,
    by_qualified: HashMap<String, Vec<SymbolKey>>,
    capabilities: Vec<(SymbolKey, CapabilitySet)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn get(&self, key: SymbolKey) -> Option<&Symbol> {
        self.symbols.get(&key)
    }

    pub fn scope_of(&self, key: SymbolKey) -> Option<TableScope> {
        self.locations.get(&key).copied()
    }

    /// Table scope a unit-local scope maps to
    pub fn scope_for(&self, unit: UnitId, scope: ScopeId) -> Option<TableScope> {
        let entry = self.units.get(&unit)?;
        if scope == ScopeId::ROOT {
            Some(TableScope::Package(entry.package))
        } else {
            let table_scope = TableScope::Unit(unit, scope);
            self.scopes.contains_key(&table_scope).then_some(table_scope)
        }
    }

    pub fn source_id(&self, unit: UnitId) -> Option<&str> {
        self.units.get(&unit).map(|entry| entry.source_id.as_str())
    }

    pub fn package_key(&self, scope: TableScope) -> Option<&PackageKey> {
        match scope {
            TableScope::Package(index) => self.packages.get(index).map(|p| &p.key),
            TableScope::Unit(unit, _) => {
                let entry = self.units.get(&unit)?;
                self.packages.get(entry.package).map(|p| &p.key)
            }
        }
    }

    /// Claim a package so units can attach to it
    fn package(&mut self, key: &PackageKey, qualified: &str) -> usize {
        if let Some(index) = self.package_index.get(key) {
            return *index;
        }
        let index = self.packages.len();
        self.packages.push(PackageEntry {
            key: key.clone(),
            qualified: qualified.to_string(),
            units: Vec::new(),
            methods: Vec::new(),
        });
        self.package_index.insert(key.clone(), index);
        self.scopes.insert(
            TableScope::Package(index),
            ScopeEntry {
                parent: None,
                prefix: qualified.to_string(),
                ..ScopeEntry::default()
            },
        );
        index
    }

    /// Add one symbol to a scope.
    ///
    /// A second Package symbol for the same package scope is unified with the
    /// first and returns its key.
    pub fn insert(
        &mut self,
        unit: UnitId,
        scope: TableScope,
        symbol: Symbol,
    ) -> Result<SymbolKey, DuplicateNameError> {
        let key = SymbolKey {
            unit,
            id: symbol.id,
        };
        let entry = self.scopes.entry(scope).or_default();

        if let Some(existing) = entry.by_qualified.get(&symbol.qualified_name).copied() {
            let existing_symbol = self.symbols.get(&existing);
            if symbol.kind == SymbolKind::Package
                && existing_symbol.is_some_and(|s| s.kind == SymbolKind::Package)
            {
                return Ok(existing);
            }
            return Err(DuplicateNameError {
                qualified_name: symbol.qualified_name.clone(),
                existing_unit: existing.unit,
                existing_range: existing_symbol.map_or(symbol.range, |s| s.range),
                rejected_unit: unit,
                rejected_range: symbol.range,
            });
        }

        entry
            .by_qualified
            .insert(symbol.qualified_name.clone(), key);
        let simple_qualified = if entry.prefix.is_empty() {
            symbol.name.to_string()
        } else {
            format!("{}.{}", entry.prefix, symbol.name)
        };
        if simple_qualified == symbol.qualified_name {
            entry
                .by_simple
                .entry(symbol.name.to_string())
                .or_default()
                .push(key);
        }

        self.by_qualified
            .entry(symbol.qualified_name.clone())
            .or_default()
            .push(key);
        if let Some(unit_entry) = self.units.get_mut(&unit) {
            unit_entry.symbols.push(key);
        }
        self.locations.insert(key, scope);
        self.symbols.insert(key, symbol);
        Ok(key)
    }

    /// Merge a unit's model into the table.
    ///
    /// Every conflicting symbol is reported; on any conflict the unit is rolled
    /// back and the table is left as it was.
    pub fn merge_model(
        &mut self,
        model: &SymbolModel,
        behavior: &dyn LanguageBehavior,
    ) -> Result<usize, Vec<DuplicateNameError>> {
        let unit = model.unit;
        self.remove_unit(unit);

        let package = self.package(&model.package, &model.package_name);
        self.packages[package].units.push(unit);
        self.units.insert(
            unit,
            UnitEntry {
                package,
                source_id: model.source_id.clone(),
                symbols: Vec::new(),
            },
        );

        for scope in model.scopes.iter().filter(|scope| !scope.is_root()) {
            let parent = scope.parent.map(|parent| {
                if parent == ScopeId::ROOT {
                    TableScope::Package(package)
                } else {
                    TableScope::Unit(unit, parent)
                }
            });
            self.scopes.insert(
                TableScope::Unit(unit, scope.id),
                ScopeEntry {
                    parent,
                    prefix: scope.prefix.clone(),
                    ..ScopeEntry::default()
                },
            );
        }

        let mut errors = Vec::new();
        let mut inserted = 0;
        for symbol in &model.symbols {
            let scope = if symbol.scope == ScopeId::ROOT {
                TableScope::Package(package)
            } else {
                TableScope::Unit(unit, symbol.scope)
            };
            let mut symbol = symbol.clone();
            if scope == TableScope::Package(package)
                && behavior.allows_redeclaration(symbol.kind, &symbol.name)
            {
                symbol.qualified_name = self.free_name(scope, &symbol.qualified_name);
            }

            match self.insert(unit, scope, symbol) {
                Ok(key) => {
                    if key.unit == unit {
                        inserted += 1;
                        if self.symbols.get(&key).is_some_and(|s| s.receiver.is_some()) {
                            self.packages[package].methods.push(key);
                        }
                    }
                }
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            self.remove_unit(unit);
            return Err(errors);
        }

        for set in &model.capabilities {
            self.capabilities.push((
                SymbolKey {
                    unit,
                    id: set.symbol,
                },
                set.clone(),
            ));
        }
        Ok(inserted)
    }

    /// Next unclaimed `name#N` in a scope, or `name` itself when free
    fn free_name(&self, scope: TableScope, name: &str) -> String {
        let Some(entry) = self.scopes.get(&scope) else {
            return name.to_string();
        };
        let base = name.split_once('#').map_or(name, |(base, _)| base);
        if !entry.by_qualified.contains_key(name) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}#{n}");
            if !entry.by_qualified.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Drop every symbol and scope a unit contributed.
    ///
    /// The unified Package symbol passes to another unit of the package
    /// while one remains.
    pub fn remove_unit(&mut self, unit: UnitId) {
        let Some(entry) = self.units.remove(&unit) else {
            return;
        };
        let heir = self
            .packages
            .get(entry.package)
            .and_then(|package| package.units.iter().copied().find(|u| *u != unit));
        let package_scope = TableScope::Package(entry.package);

        for key in &entry.symbols {
            if let Some(heir) = heir
                && self.locations.get(key) == Some(&package_scope)
                && let Some(symbol) = self.symbols.get_mut(key)
                && symbol.kind == SymbolKind::Package
            {
                symbol.unit = heir;
                if let Some(heir_entry) = self.units.get_mut(&heir) {
                    heir_entry.symbols.push(*key);
                }
                continue;
            }

            let Some(symbol) = self.symbols.remove(key) else {
                continue;
            };
            if let Some(scope) = self.locations.remove(key)
                && let Some(scope_entry) = self.scopes.get_mut(&scope)
            {
                scope_entry.by_qualified.remove(&symbol.qualified_name);
                if let Some(keys) = scope_entry.by_simple.get_mut(symbol.name.as_ref()) {
                    keys.retain(|k| k != key);
                    if keys.is_empty() {
                        scope_entry.by_simple.remove(symbol.name.as_ref());
                    }
                }
            }
            if let Some(keys) = self.by_qualified.get_mut(&symbol.qualified_name) {
                keys.retain(|k| k != key);
                if keys.is_empty() {
                    self.by_qualified.remove(&symbol.qualified_name);
                }
            }
        }

        self.scopes
            .retain(|scope, _| !matches!(scope, TableScope::Unit(owner, _) if *owner == unit));
        self.capabilities.retain(|(key, _)| key.unit != unit);
        if let Some(package) = self.packages.get_mut(entry.package) {
            package.units.retain(|u| *u != unit);
            package.methods.retain(|key| key.unit != unit);
        }
    }

    /// Lexical lookup from `from` outwards.
    ///
    /// `name` may be a qualified name or a simple name declared directly in a
    /// scope; the nearest scope that declares it wins.
    pub fn lookup(&self, name: &str, from: TableScope) -> Option<SymbolKey> {
        let mut current = Some(from);
        while let Some(scope) = current {
            let entry = self.scopes.get(&scope)?;
            if let Some(key) = entry.by_qualified.get(name) {
                return Some(*key);
            }
            if let Some(key) = entry.by_simple.get(name).and_then(|keys| keys.first()) {
                return Some(*key);
            }
            current = entry.parent;
        }
        None
    }

    pub fn lookup_symbol(&self, name: &str, from: TableScope) -> Option<&Symbol> {
        self.lookup(name, from).and_then(|key| self.get(key))
    }

    /// First symbol with this qualified name across all packages
    pub fn find(&self, qualified_name: &str) -> Option<&Symbol> {
        self.find_key(qualified_name).and_then(|key| self.get(key))
    }

    pub fn find_key(&self, qualified_name: &str) -> Option<SymbolKey> {
        self.by_qualified
            .get(qualified_name)
            .and_then(|keys| keys.iter().min().copied())
    }

    /// Innermost symbol of a unit whose span contains the position
    pub fn symbol_at(&self, unit: UnitId, line: u32, column: u16) -> Option<&Symbol> {
        self.units
            .get(&unit)?
            .symbols
            .iter()
            .filter_map(|key| self.symbols.get(key))
            .filter(|symbol| symbol.range.contains(line, column))
            .min_by(|a, b| {
                a.range
                    .start()
                    .cmp(&b.range.start())
                    .reverse()
                    .then(a.range.end().cmp(&b.range.end()))
            })
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolKey, &Symbol)> + '_ {
        self.symbols.iter().map(|(key, symbol)| (*key, symbol))
    }

    /// Symbols contributed by one unit, in insertion order
    pub fn unit_symbols(&self, unit: UnitId) -> impl Iterator<Item = &Symbol> + '_ {
        self.units
            .get(&unit)
            .into_iter()
            .flat_map(|entry| entry.symbols.iter())
            .filter_map(|key| self.symbols.get(key))
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilitySet> + '_ {
        self.capabilities.iter().map(|(_, set)| set)
    }

    fn package_of_key(&self, key: SymbolKey) -> Option<&PackageEntry> {
        let unit = self.units.get(&key.unit)?;
        self.packages.get(unit.package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{GoBehavior, Language, PythonBehavior};
    use crate::symbol::{ScopeKind, ScopeNode};
    use crate::types::Range;

    fn go_package(path: &str) -> PackageKey {
        PackageKey {
            language: Language::Go,
            path: path.to_string(),
        }
    }

    fn model(unit: u32, package: &str, names: &[(&str, SymbolKind, u32)]) -> SymbolModel {
        let mut root = ScopeNode::new(
            ScopeId::ROOT,
            None,
            ScopeKind::Unit,
            Range::new(0, 0, 100, 0),
            package,
        );
        let mut symbols = vec![
            Symbol::new(
                SymbolId(1),
                package,
                package,
                SymbolKind::Package,
                UnitId(unit),
                Range::new(0, 0, 0, 10),
            ),
        ];
        root.symbols.push(SymbolId(1));
        for (index, (name, kind, line)) in names.iter().enumerate() {
            let id = SymbolId(index as u32 + 2);
            symbols.push(Symbol::new(
                id,
                *name,
                format!("{package}.{name}"),
                *kind,
                UnitId(unit),
                Range::new(*line, 0, *line + 2, 1),
            ));
            root.symbols.push(id);
        }

        SymbolModel {
            unit: UnitId(unit),
            source_id: format!("pkg/file{unit}.go"),
            language: Language::Go,
            package: go_package("pkg/sample"),
            package_name: package.to_string(),
            scopes: vec![root],
            symbols,
            references: Vec::new(),
            capabilities: Vec::new(),
            imports: Vec::new(),
            diagnostics: Vec::new(),
            dropped_diagnostics: 0,
        }
    }

    #[test]
    fn test_shared_package_root_and_unified_package_symbol() {
        let behavior = GoBehavior::new();
        let mut table = SymbolTable::new();

        table
            .merge_model(&model(1, "sample", &[("A", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        table
            .merge_model(&model(2, "sample", &[("B", SymbolKind::Function, 2)]), &behavior)
            .unwrap();

        assert_eq!(table.unit_count(), 2);
        assert_eq!(
            table.symbols().filter(|(_, s)| s.kind == SymbolKind::Package).count(),
            1
        );

        let root = table.scope_for(UnitId(2), ScopeId::ROOT).unwrap();
        let a = table.lookup_symbol("A", root).unwrap();
        assert_eq!(a.unit, UnitId(1));
        assert_eq!(table.lookup("sample.B", root).unwrap().unit, UnitId(2));
    }

    #[test]
    fn test_package_symbol_outlives_its_first_unit() {
        let behavior = GoBehavior::new();
        let mut table = SymbolTable::new();
        table
            .merge_model(&model(1, "sample", &[("A", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        table
            .merge_model(&model(2, "sample", &[("B", SymbolKind::Function, 2)]), &behavior)
            .unwrap();

        table.remove_unit(UnitId(1));
        let package = table.find("sample").unwrap();
        assert_eq!(package.kind, SymbolKind::Package);
        assert_eq!(package.unit, UnitId(2));
        assert!(table.find("sample.A").is_none());
        let root = table.scope_for(UnitId(2), ScopeId::ROOT).unwrap();
        assert!(table.lookup_symbol("sample", root).is_some());
        assert_eq!(table.lookup_symbol("B", root).unwrap().unit, UnitId(2));

        // Re-merging the first unit unifies with the inherited symbol
        table
            .merge_model(&model(1, "sample", &[("A", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        assert_eq!(
            table.symbols().filter(|(_, s)| s.kind == SymbolKind::Package).count(),
            1
        );

        table.remove_unit(UnitId(2));
        table.remove_unit(UnitId(1));
        assert!(table.find("sample").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_across_units_rolls_back_second() {
        let behavior = GoBehavior::new();
        let mut table = SymbolTable::new();

        table
            .merge_model(&model(1, "sample", &[("X", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        let errors = table
            .merge_model(
                &model(
                    2,
                    "sample",
                    &[("Y", SymbolKind::Function, 2), ("X", SymbolKind::Type, 6)],
                ),
                &behavior,
            )
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].qualified_name, "sample.X");
        assert_eq!(errors[0].existing_unit, UnitId(1));
        assert_eq!(errors[0].rejected_unit, UnitId(2));

        assert!(table.find("sample.Y").is_none());
        assert_eq!(table.find("sample.X").unwrap().unit, UnitId(1));
        assert_eq!(table.unit_count(), 1);
    }

    #[test]
    fn test_go_init_across_units_is_allowed() {
        let behavior = GoBehavior::new();
        let mut table = SymbolTable::new();
        table
            .merge_model(&model(1, "sample", &[("init", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        table
            .merge_model(&model(2, "sample", &[("init", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        assert!(table.find("sample.init").is_some());
        assert!(table.find("sample.init#2").is_some());
    }

    #[test]
    fn test_shadowing_in_nested_scope_is_permitted() {
        let behavior = PythonBehavior::new();
        let mut table = SymbolTable::new();
        let mut unit = model(1, "sample", &[("f", SymbolKind::Function, 2)]);
        let mut body = ScopeNode::new(
            ScopeId(2),
            Some(ScopeId::ROOT),
            ScopeKind::Function,
            Range::new(2, 0, 4, 1),
            "sample.f",
        );
        body.owner = Some(SymbolId(2));
        body.symbols.push(SymbolId(3));
        unit.scopes[0].children.push(ScopeId(2));
        unit.scopes.push(body);
        unit.symbols.push(
            Symbol::new(
                SymbolId(3),
                "f",
                "sample.f.f",
                SymbolKind::Function,
                UnitId(1),
                Range::new(3, 4, 3, 20),
            )
            .with_scope(ScopeId(2)),
        );

        table.merge_model(&unit, &behavior).unwrap();
        let inner = table.scope_for(UnitId(1), ScopeId(2)).unwrap();
        assert_eq!(table.lookup_symbol("f", inner).unwrap().qualified_name, "sample.f.f");
        let root = table.scope_for(UnitId(1), ScopeId::ROOT).unwrap();
        assert_eq!(table.lookup_symbol("f", root).unwrap().qualified_name, "sample.f");
        assert_eq!(table.lookup("nothing", inner), None);

        let at = table.symbol_at(UnitId(1), 3, 8).unwrap();
        assert_eq!(at.qualified_name, "sample.f.f");
    }

    #[test]
    fn test_remerge_replaces_unit() {
        let behavior = GoBehavior::new();
        let mut table = SymbolTable::new();
        table
            .merge_model(&model(1, "sample", &[("Old", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        table
            .merge_model(&model(1, "sample", &[("New", SymbolKind::Function, 2)]), &behavior)
            .unwrap();
        assert!(table.find("sample.Old").is_none());
        assert!(table.find("sample.New").is_some());
    }
}
