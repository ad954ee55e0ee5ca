//! Structural capability resolution
//!
//! A type satisfies a capability set when it has a method of every required
//! name with a compatible signature. Nothing is cached: the answer reflects
//! whatever the table holds at the time of the call.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{SymbolKey, SymbolTable, TableScope};
use crate::symbol::{CapabilitySet, Signature};
use crate::types::SymbolKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Satisfaction {
    Satisfied,
    NotSatisfied {
        /// Required names with no method at all
        missing: Vec<String>,
        /// Names present with an incompatible signature
        mismatched: Vec<String>,
    },
    UnknownType,
    UnknownCapability,
}

impl Satisfaction {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Satisfaction::Satisfied)
    }
}

impl SymbolTable {
    /// Check whether `type_name` structurally satisfies `capability`.
    ///
    /// Both names are qualified names, or simple names when unambiguous.
    /// An Interface may stand in for the type, using its own method set.
    pub fn resolve_capability(&self, type_name: &str, capability: &str) -> Satisfaction {
        let Some(set) = self.capability_named(capability) else {
            return Satisfaction::UnknownCapability;
        };
        let Some(type_key) = self.type_named(type_name) else {
            return Satisfaction::UnknownType;
        };
        self.check(type_key, set)
    }

    /// Every Type currently satisfying `capability`, sorted by qualified name
    pub fn satisfiers(&self, capability: &str) -> Vec<String> {
        let Some(set) = self.capability_named(capability) else {
            return Vec::new();
        };
        let mut types: Vec<String> = self
            .symbols()
            .filter(|(_, symbol)| symbol.kind == SymbolKind::Type)
            .filter(|(key, _)| self.check(*key, set).is_satisfied())
            .map(|(_, symbol)| symbol.qualified_name.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    fn check(&self, type_key: SymbolKey, set: &CapabilitySet) -> Satisfaction {
        let required = self.required_methods(set);
        let available = self.method_set(type_key);

        let mut missing = Vec::new();
        let mut mismatched = Vec::new();
        for (name, wanted) in &required {
            match available.get(name) {
                None => missing.push(name.clone()),
                Some(have) if !have.compatible_with(wanted) => mismatched.push(name.clone()),
                Some(_) => {}
            }
        }

        if missing.is_empty() && mismatched.is_empty() {
            Satisfaction::Satisfied
        } else {
            Satisfaction::NotSatisfied {
                missing,
                mismatched,
            }
        }
    }

    fn capability_named(&self, name: &str) -> Option<&CapabilitySet> {
        self.capabilities
            .iter()
            .find(|(_, set)| set.qualified_name == name)
            .or_else(|| self.capabilities.iter().find(|(_, set)| set.name == name))
            .map(|(_, set)| set)
    }

    fn type_named(&self, name: &str) -> Option<SymbolKey> {
        let is_type = |kind: SymbolKind| matches!(kind, SymbolKind::Type | SymbolKind::Interface);
        if let Some(key) = self
            .by_qualified
            .get(name)
            .and_then(|keys| {
                keys.iter()
                    .copied()
                    .filter(|key| self.get(*key).is_some_and(|s| is_type(s.kind)))
                    .min()
            })
        {
            return Some(key);
        }
        self.symbols()
            .filter(|(_, symbol)| is_type(symbol.kind) && symbol.name.as_ref() == name)
            .map(|(key, _)| key)
            .min()
    }

    /// Method requirements of a set, embedded sets folded in
    fn required_methods(&self, set: &CapabilitySet) -> BTreeMap<String, Signature> {
        let mut required = BTreeMap::new();
        let mut visited = HashSet::new();
        self.collect_required(set, &mut required, &mut visited);
        required
    }

    fn collect_required(
        &self,
        set: &CapabilitySet,
        required: &mut BTreeMap<String, Signature>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(set.qualified_name.clone()) {
            return;
        }
        for method in &set.methods {
            required
                .entry(method.name.clone())
                .or_insert_with(|| method.signature.clone());
        }
        let scope = self.find_key(&set.qualified_name).and_then(|key| self.scope_of(key));
        for embed in &set.embeds {
            let embedded = scope
                .and_then(|scope| self.lookup_symbol(bare(embed), scope))
                .and_then(|symbol| {
                    self.capabilities
                        .iter()
                        .find(|(_, other)| other.qualified_name == symbol.qualified_name)
                })
                .map(|(_, other)| other);
            if let Some(embedded) = embedded {
                self.collect_required(embedded, required, visited);
            }
        }
    }

    /// Methods a type (or interface) provides, own methods shadowing promoted ones
    fn method_set(&self, key: SymbolKey) -> BTreeMap<String, Signature> {
        let mut methods = BTreeMap::new();
        let mut visited = HashSet::new();
        self.collect_methods(key, &mut methods, &mut visited);
        methods
    }

    fn collect_methods(
        &self,
        key: SymbolKey,
        methods: &mut BTreeMap<String, Signature>,
        visited: &mut HashSet<SymbolKey>,
    ) {
        if !visited.insert(key) {
            return;
        }
        let Some(symbol) = self.get(key) else {
            return;
        };

        if symbol.kind == SymbolKind::Interface {
            if let Some((_, set)) = self
                .capabilities
                .iter()
                .find(|(owner, _)| *owner == key)
            {
                for (name, signature) in self.required_methods(set) {
                    methods.entry(name).or_insert(signature);
                }
            }
            return;
        }

        if let Some(package) = self.package_of_key(key) {
            for method_key in &package.methods {
                let Some(method) = self.get(*method_key) else {
                    continue;
                };
                let Some(receiver) = method.receiver.as_ref() else {
                    continue;
                };
                let bound = match receiver.qualified.as_deref() {
                    Some(qualified) => qualified == symbol.qualified_name,
                    None => {
                        format!("{}.{}", package.qualified, receiver.type_name)
                            == symbol.qualified_name
                    }
                };
                if bound {
                    methods
                        .entry(method.name.to_string())
                        .or_insert_with(|| method.signature.clone().unwrap_or_default());
                }
            }
        }

        let Some(scope) = self.scope_of(key) else {
            return;
        };
        for embed in &symbol.embeds {
            if let Some(embedded) = self.embedded_type(bare(embed), scope) {
                self.collect_methods(embedded, methods, visited);
            }
        }
    }

    fn embedded_type(&self, name: &str, scope: TableScope) -> Option<SymbolKey> {
        self.lookup(name, scope)
            .or_else(|| self.find_key(name))
            .filter(|key| {
                self.get(*key)
                    .is_some_and(|s| matches!(s.kind, SymbolKind::Type | SymbolKind::Interface))
            })
    }
}

/// Type name without pointer or generic decoration
fn bare(name: &str) -> &str {
    let name = name.trim_start_matches('*');
    name.split(['[', '(']).next().unwrap_or(name).trim()
}
