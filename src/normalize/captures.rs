//! Captured-variable analysis for closures and nested functions

use std::collections::{BTreeSet, HashSet};

use super::context::Use;
use crate::parsing::BindingRule;
use crate::symbol::{ScopeKind, SymbolModel};
use crate::types::{ScopeId, SymbolId, SymbolKind};

/// Where a name use binds
enum Binding {
    /// Inside the callable under analysis
    Inner,
    /// A function-level scope outside it
    Outer,
    /// Package level, imports, builtins or nothing at all
    Free,
}

/// Fill `captures` for every target callable
pub(super) fn compute(
    model: &mut SymbolModel,
    uses: &[Use],
    rule: BindingRule,
    targets: &[SymbolId],
) {
    for target in targets {
        let Some(body) = model
            .scopes
            .iter()
            .find(|scope| scope.owner == Some(*target) && scope.kind == ScopeKind::Function)
            .map(|scope| scope.id)
        else {
            continue;
        };
        let inner = subtree(model, body);

        let captured: BTreeSet<String> = uses
            .iter()
            .filter(|use_site| inner.contains(&use_site.scope))
            .filter(|use_site| {
                matches!(binding_of(model, use_site, rule, &inner), Binding::Outer)
            })
            .map(|use_site| use_site.name.clone())
            .collect();

        if let Some(symbol) = model.symbol_mut(*target) {
            symbol.captures = captured.into_iter().collect();
        }
    }
}

fn subtree(model: &SymbolModel, root: ScopeId) -> HashSet<ScopeId> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(scope) = model.scope(id) {
            stack.extend(scope.children.iter().copied());
        }
    }
    seen
}

fn binding_of(
    model: &SymbolModel,
    use_site: &Use,
    rule: BindingRule,
    inner: &HashSet<ScopeId>,
) -> Binding {
    let visible = |start: (u32, u16)| {
        rule == BindingRule::FunctionWide || start <= use_site.range.start()
    };

    for scope in model.ancestors(use_site.scope) {
        if scope.kind == ScopeKind::TypeBody && scope.id != use_site.scope {
            continue;
        }

        let binds = scope
            .bindings
            .iter()
            .any(|binding| binding.name == use_site.name && visible(binding.range.start()))
            || scope.symbols.iter().filter_map(|id| model.symbol(*id)).any(|symbol| {
                symbol.name.as_ref() == use_site.name
                    && !matches!(symbol.kind, SymbolKind::Closure | SymbolKind::Unclassified)
                    && (scope.kind == ScopeKind::Unit || visible(symbol.range.start()))
            });
        if !binds {
            continue;
        }

        return if inner.contains(&scope.id) {
            Binding::Inner
        } else if scope.kind == ScopeKind::Unit {
            Binding::Free
        } else {
            Binding::Outer
        };
    }

    Binding::Free
}
