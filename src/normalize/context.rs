//! Builder context for one normalization pass
//!
//! Tracks the scope stack, the enclosing symbol, and one frame per callable
//! (closure counters, loop depth, spawn sites and barrier kind) while the
//! lowered tree is walked.

use std::collections::{HashMap, HashSet};

use super::docs;
use crate::error::{Diagnostic, DuplicateNameError};
use crate::parsing::{
    BindingDirective, BindingRule, LanguageBehavior, MAX_NESTING_DEPTH, PackageInfo, ReceiverSpec,
    SyncHint, SyntaxKind, SyntaxNode,
};
use crate::symbol::{
    BarrierKind, CapabilitySet, LocalBinding, MethodSignature, Receiver, Reference, ReferenceKind,
    Resolution, ScopeKind, ScopeNode, Signature, Symbol, SymbolModel, SymbolTrait,
};
use crate::types::{IdAllocator, Range, ScopeId, SymbolId, SymbolKind, UnitId};

/// Identifier use recorded for capture analysis
#[derive(Debug, Clone)]
pub(crate) struct Use {
    pub name: String,
    pub range: Range,
    pub scope: ScopeId,
}

/// Per-callable bookkeeping
#[derive(Debug)]
pub(crate) struct Frame {
    /// `None` for the unit-level frame
    pub symbol: Option<SymbolId>,
    pub closures: usize,
    pub loop_depth: usize,
    pub spawn_depth: usize,
    pub spawn_sites: usize,
    pub spawn_in_loop: bool,
    pub barrier: BarrierKind,
    pub spawned_closures: Vec<SymbolId>,
    nonlocal: HashSet<String>,
    global: HashSet<String>,
}

impl Frame {
    fn new(symbol: Option<SymbolId>) -> Self {
        Self {
            symbol,
            closures: 0,
            loop_depth: 0,
            spawn_depth: 0,
            spawn_sites: 0,
            spawn_in_loop: false,
            barrier: BarrierKind::None,
            spawned_closures: Vec::new(),
            nonlocal: HashSet::new(),
            global: HashSet::new(),
        }
    }
}

/// Counting barrier outranks channel, channel outranks none
fn stronger(current: BarrierKind, observed: BarrierKind) -> BarrierKind {
    let rank = |kind: BarrierKind| match kind {
        BarrierKind::CountingBarrier => 2,
        BarrierKind::Channel => 1,
        BarrierKind::None => 0,
    };
    if rank(observed) > rank(current) {
        observed
    } else {
        current
    }
}

pub(crate) struct ModelBuilder<'b> {
    behavior: &'b dyn LanguageBehavior,
    rule: BindingRule,
    max_diagnostics: usize,
    pub(crate) model: SymbolModel,
    ids: IdAllocator,
    scope_stack: Vec<ScopeId>,
    owners: Vec<SymbolId>,
    frames: Vec<Frame>,
    /// Qualified names claimed per scope
    claimed: HashMap<ScopeId, HashMap<String, SymbolId>>,
    unclassified: HashMap<ScopeId, usize>,
    depth: usize,
    pub(crate) uses: Vec<Use>,
    /// Closures and nested functions, in declaration order
    pub(crate) capture_targets: Vec<SymbolId>,
    pub(crate) finished_frames: Vec<Frame>,
}

impl<'b> ModelBuilder<'b> {
    pub(crate) fn new(
        behavior: &'b dyn LanguageBehavior,
        unit: UnitId,
        source_id: &str,
        package: PackageInfo,
        unit_range: Range,
        max_diagnostics: usize,
    ) -> Self {
        let root = ScopeNode::new(
            ScopeId::ROOT,
            None,
            ScopeKind::Unit,
            unit_range,
            package.qualified.clone(),
        );
        let model = SymbolModel {
            unit,
            source_id: source_id.to_string(),
            language: behavior.language(),
            package: package.key,
            package_name: package.qualified,
            scopes: vec![root],
            symbols: Vec::new(),
            references: Vec::new(),
            capabilities: Vec::new(),
            imports: Vec::new(),
            diagnostics: Vec::new(),
            dropped_diagnostics: 0,
        };

        Self {
            behavior,
            rule: behavior.binding_rule(),
            max_diagnostics,
            model,
            ids: IdAllocator::new(),
            scope_stack: vec![ScopeId::ROOT],
            owners: Vec::new(),
            frames: vec![Frame::new(None)],
            claimed: HashMap::new(),
            unclassified: HashMap::new(),
            depth: 0,
            uses: Vec::new(),
            capture_targets: Vec::new(),
            finished_frames: Vec::new(),
        }
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.model.push_diagnostic(diagnostic, self.max_diagnostics);
    }

    /// Create the Package symbol; must run before anything else is declared
    pub(crate) fn declare_package(&mut self, range: Range) {
        let qualified = self.model.package_name.clone();
        let name = qualified.rsplit('.').next().unwrap_or(&qualified).to_string();
        let id = self.ids.next_symbol();
        let symbol = Symbol::new(id, name, qualified.clone(), SymbolKind::Package, self.model.unit, range)
            .with_visibility(crate::symbol::Visibility::Exported);
        self.claimed
            .entry(ScopeId::ROOT)
            .or_default()
            .insert(qualified, id);
        self.commit(symbol);
    }

    fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(ScopeId::ROOT)
    }

    fn scope(&self, id: ScopeId) -> &ScopeNode {
        &self.model.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeNode {
        &mut self.model.scopes[id.index()]
    }

    fn frame(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn owner(&self) -> Option<SymbolId> {
        self.owners.last().copied()
    }

    fn open_scope(&mut self, kind: ScopeKind, range: Range, owner: Option<SymbolId>) -> ScopeId {
        let parent = self.current_scope();
        let prefix = match owner.and_then(|id| self.model.symbol(id)) {
            Some(symbol) => symbol.qualified_name.clone(),
            None => self.scope(parent).prefix.clone(),
        };
        let id = self.ids.next_scope();
        let mut scope = ScopeNode::new(id, Some(parent), kind, range, prefix);
        scope.owner = owner;
        self.model.scopes.push(scope);
        self.scope_mut(parent).children.push(id);
        self.scope_stack.push(id);
        id
    }

    fn close_scope(&mut self) {
        if self.scope_stack.len() > 1 {
            self.scope_stack.pop();
        }
    }

    /// Reserve a qualified name for a new symbol in the current scope.
    ///
    /// Legal redeclarations get a `#N` suffix; anything else is a duplicate.
    fn declare(
        &mut self,
        kind: SymbolKind,
        name: &str,
        local_name: &str,
        range: Range,
    ) -> Option<Symbol> {
        let scope = self.current_scope();
        let base = self.scope(scope).qualify(local_name);
        let claimed = self.claimed.entry(scope).or_default();

        let qualified = match claimed.get(&base).copied() {
            None => base,
            Some(_) if self.behavior.allows_redeclaration(kind, name) => {
                let mut n = 2;
                while claimed.contains_key(&format!("{base}#{n}")) {
                    n += 1;
                }
                format!("{base}#{n}")
            }
            Some(existing) => {
                let existing_range = self
                    .model
                    .symbol(existing)
                    .map_or(range, |symbol| symbol.range);
                self.push_diagnostic(Diagnostic::DuplicateName(DuplicateNameError {
                    qualified_name: base,
                    existing_unit: self.model.unit,
                    existing_range,
                    rejected_unit: self.model.unit,
                    rejected_range: range,
                }));
                return None;
            }
        };

        let id = self.ids.next_symbol();
        self.claimed
            .entry(scope)
            .or_default()
            .insert(qualified.clone(), id);
        Some(Symbol::new(id, name, qualified, kind, self.model.unit, range).with_scope(scope))
    }

    fn commit(&mut self, symbol: Symbol) -> SymbolId {
        let id = symbol.id;
        let scope = symbol.scope;
        self.scope_mut(scope).symbols.push(id);
        self.model.symbols.push(symbol);
        id
    }

    fn reference(&mut self, kind: ReferenceKind, name: &str, range: Range) {
        self.model.references.push(Reference {
            kind,
            name: name.to_string(),
            range,
            scope: self.current_scope(),
            from: self.owner(),
            resolution: Resolution::Unresolved,
        });
    }

    fn record_use(&mut self, name: &str, range: Range) {
        self.uses.push(Use {
            name: name.to_string(),
            range,
            scope: self.current_scope(),
        });
    }

    /// Walk sibling nodes, grouping comments into doc text for the next declaration
    pub(crate) fn walk_nodes(&mut self, nodes: &[SyntaxNode]) {
        let mut pending: Vec<&SyntaxNode> = Vec::new();
        let mut previous_end: Option<u32> = None;

        for node in nodes {
            if let SyntaxKind::Comment { .. } = node.kind {
                // Trailing comment on the previous construct's last line
                if pending.is_empty() && previous_end == Some(node.range.start_line) {
                    continue;
                }
                if pending
                    .last()
                    .is_some_and(|last| node.range.start_line > last.range.end_line + 1)
                {
                    pending.clear();
                }
                pending.push(node);
                continue;
            }

            let doc = docs::comment_group(&pending);
            pending.clear();
            self.visit(node, doc);
            previous_end = Some(node.range.end_line);
        }
    }

    fn visit(&mut self, node: &SyntaxNode, doc: Option<String>) {
        if self.depth >= MAX_NESTING_DEPTH {
            self.visit_unknown(node, "nesting limit");
            return;
        }
        self.depth += 1;
        self.visit_node(node, doc);
        self.depth -= 1;
    }

    fn visit_node(&mut self, node: &SyntaxNode, doc: Option<String>) {
        let doc = node.doc.clone().or(doc);
        match &node.kind {
            SyntaxKind::Package => {
                if let Some(package) = self.model.symbols.first_mut()
                    && doc.is_some()
                {
                    package.doc_comment = doc;
                }
            }
            SyntaxKind::Import { alias } => {
                if !self.model.imports.contains(alias) {
                    self.model.imports.push(alias.clone());
                }
                if self.frames.len() > 1 {
                    let scope = self.current_scope();
                    self.scope_mut(scope).bindings.push(LocalBinding {
                        name: alias.clone(),
                        range: node.range,
                    });
                }
            }
            SyntaxKind::TypeDecl { embeds } => self.visit_type(node, embeds, doc),
            SyntaxKind::InterfaceDecl { embeds } => self.visit_interface(node, embeds, doc),
            SyntaxKind::MethodSpec(_) => {}
            SyntaxKind::Field {
                type_text,
                embedded,
                mutable,
            } => {
                let Some(name) = node.name.as_deref() else {
                    return;
                };
                // Blank padding fields may repeat and declare nothing
                if !self.behavior.is_blank(name)
                    && let Some(mut symbol) = self.declare(SymbolKind::Field, name, name, node.range)
                {
                    symbol.visibility = node.visibility;
                    symbol.mutable = *mutable;
                    symbol.type_text = type_text.clone();
                    symbol.doc_comment = doc;
                    if *embedded {
                        symbol.add_trait(SymbolTrait::Embedded);
                    }
                    self.commit(symbol);
                }
                self.walk_nodes(&node.children);
            }
            SyntaxKind::Function {
                signature,
                is_async,
            } => self.visit_function(node, signature, *is_async, None, doc),
            SyntaxKind::Method {
                receiver,
                signature,
                is_async,
            } => self.visit_function(node, signature, *is_async, Some(receiver), doc),
            SyntaxKind::Param { type_text } => {
                let Some(name) = node.name.as_deref().filter(|name| *name != "_") else {
                    return;
                };
                if let Some(mut symbol) =
                    self.declare(SymbolKind::Parameter, name, name, node.range)
                {
                    symbol.type_text = type_text.clone();
                    symbol.mutable = true;
                    self.commit(symbol);
                }
            }
            SyntaxKind::Variable { type_text, mutable } => {
                self.visit_variable(node, type_text.as_ref(), *mutable, doc);
                self.walk_nodes(&node.children);
            }
            SyntaxKind::Closure { signature } => self.visit_closure(node, signature),
            SyntaxKind::Block { looping } => {
                if *looping {
                    self.frame().loop_depth += 1;
                }
                if self.rule == BindingRule::Sequential {
                    self.open_scope(ScopeKind::Block { looping: *looping }, node.range, None);
                    self.walk_nodes(&node.children);
                    self.close_scope();
                } else {
                    self.walk_nodes(&node.children);
                }
                if *looping {
                    self.frame().loop_depth -= 1;
                }
            }
            SyntaxKind::Comprehension => {
                self.frame().loop_depth += 1;
                self.open_scope(ScopeKind::Comprehension, node.range, None);
                self.walk_nodes(&node.children);
                self.close_scope();
                self.frame().loop_depth -= 1;
            }
            SyntaxKind::Spawn => {
                let frame = self.frame();
                frame.spawn_sites += 1;
                frame.spawn_in_loop |= frame.loop_depth > 0;
                frame.spawn_depth += 1;
                self.walk_nodes(&node.children);
                self.frame().spawn_depth -= 1;
            }
            SyntaxKind::Sync(hint) => {
                let observed = match hint {
                    SyncHint::CountingBarrier => BarrierKind::CountingBarrier,
                    SyncHint::Channel => BarrierKind::Channel,
                };
                let frame = self.frame();
                frame.barrier = stronger(frame.barrier, observed);
            }
            SyntaxKind::Ident => {
                let Some(name) = node.name.as_deref() else {
                    return;
                };
                if !self.frame().global.contains(name) {
                    self.record_use(name, node.range);
                }
            }
            SyntaxKind::BindingDecl(directive) => {
                let Some(name) = node.name.clone() else {
                    return;
                };
                match directive {
                    BindingDirective::Nonlocal => {
                        self.record_use(&name, node.range);
                        self.frame().nonlocal.insert(name);
                    }
                    BindingDirective::Global => {
                        self.frame().global.insert(name);
                    }
                }
            }
            SyntaxKind::Call => {
                if let Some(name) = node.name.as_deref() {
                    self.reference(ReferenceKind::Call, name, node.range);
                }
                self.walk_nodes(&node.children);
            }
            SyntaxKind::TypeRef => {
                if let Some(name) = node.name.as_deref() {
                    self.reference(ReferenceKind::TypeUse, name, node.range);
                }
            }
            SyntaxKind::Comment { .. } => {}
            SyntaxKind::Unknown { raw_kind } => self.visit_unknown(node, raw_kind),
        }
    }

    fn visit_type(&mut self, node: &SyntaxNode, embeds: &[String], doc: Option<String>) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let Some(mut symbol) = self.declare(SymbolKind::Type, name, name, node.range) else {
            return;
        };
        symbol.visibility = node.visibility;
        symbol.doc_comment = doc;
        symbol.embeds = embeds.to_vec();
        let id = self.commit(symbol);

        self.owners.push(id);
        for embed in embeds {
            self.reference(ReferenceKind::Embed, embed, node.range);
        }
        self.open_scope(ScopeKind::TypeBody, node.range, Some(id));
        self.walk_nodes(&node.children);
        self.close_scope();
        self.owners.pop();
    }

    fn visit_interface(&mut self, node: &SyntaxNode, embeds: &[String], doc: Option<String>) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let Some(mut symbol) = self.declare(SymbolKind::Interface, name, name, node.range) else {
            return;
        };
        symbol.visibility = node.visibility;
        symbol.doc_comment = doc;
        symbol.embeds = embeds.to_vec();

        let methods = node
            .children
            .iter()
            .filter_map(|child| match &child.kind {
                SyntaxKind::MethodSpec(signature) => Some(MethodSignature {
                    name: child.name.clone()?,
                    signature: signature.clone(),
                    range: child.range,
                }),
                _ => None,
            })
            .collect();
        self.model.capabilities.push(CapabilitySet {
            name: name.to_string(),
            qualified_name: symbol.qualified_name.clone(),
            symbol: symbol.id,
            methods,
            embeds: embeds.to_vec(),
        });
        self.commit(symbol);
    }

    fn visit_function(
        &mut self,
        node: &SyntaxNode,
        signature: &Signature,
        is_async: bool,
        receiver: Option<&ReceiverSpec>,
        doc: Option<String>,
    ) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let scope_kind = self.scope(self.current_scope()).kind;
        let in_type_body = scope_kind == ScopeKind::TypeBody;

        let (kind, local_name) = match receiver {
            Some(spec) => (SymbolKind::Method, format!("{}.{}", spec.type_name, name)),
            None if in_type_body => (SymbolKind::Method, name.to_string()),
            None => (SymbolKind::Function, name.to_string()),
        };
        let Some(mut symbol) = self.declare(kind, name, &local_name, node.range) else {
            return;
        };

        symbol.visibility = node.visibility;
        symbol.doc_comment = doc;
        symbol.signature = Some(signature.clone());
        if is_async {
            symbol.add_trait(SymbolTrait::Async);
        }
        match receiver {
            Some(spec) => {
                symbol.receiver = Some(Receiver {
                    type_name: spec.type_name.clone(),
                    qualified: None,
                    pointer: spec.pointer,
                });
                if spec.pointer {
                    symbol.add_trait(SymbolTrait::PointerReceiver);
                }
            }
            None if in_type_body => {
                let owner = self
                    .scope(self.current_scope())
                    .owner
                    .and_then(|id| self.model.symbol(id));
                symbol.receiver = owner.map(|owner| Receiver {
                    type_name: owner.name.to_string(),
                    qualified: Some(owner.qualified_name.clone()),
                    pointer: false,
                });
            }
            None => {}
        }

        let nested = self.frames.len() > 1 && kind == SymbolKind::Function;
        let id = self.commit(symbol);
        if nested {
            self.capture_targets.push(id);
        }
        if let Some(spec) = receiver {
            self.owners.push(id);
            self.reference(ReferenceKind::Receiver, &spec.type_name, node.range);
            self.owners.pop();
        }

        self.enter_callable(node, id);
    }

    fn visit_closure(&mut self, node: &SyntaxNode, signature: &Signature) {
        let frame = self.frame();
        frame.closures += 1;
        let name = format!("<closure#{}>", frame.closures);
        let spawned = frame.spawn_depth > 0;

        let Some(mut symbol) = self.declare(SymbolKind::Closure, &name, &name, node.range) else {
            return;
        };
        symbol.signature = Some(signature.clone());
        let id = self.commit(symbol);
        self.capture_targets.push(id);
        if spawned {
            self.frame().spawned_closures.push(id);
        }

        self.enter_callable(node, id);
    }

    /// Name of a declaration node, unless it is missing or blank
    fn declared_name<'n>(&self, node: &'n SyntaxNode) -> Option<&'n str> {
        node.name
            .as_deref()
            .filter(|name| !self.behavior.is_blank(name))
    }

    /// Function scope plus frame for a callable body.
    ///
    /// A spawned closure hands its barrier to the callable that launched it.
    fn enter_callable(&mut self, node: &SyntaxNode, id: SymbolId) {
        self.owners.push(id);
        self.frames.push(Frame::new(Some(id)));
        self.open_scope(ScopeKind::Function, node.range, Some(id));
        self.walk_nodes(&node.children);
        self.close_scope();
        if let Some(frame) = self.frames.pop() {
            let launcher = self.frame();
            if launcher.spawned_closures.contains(&id) {
                launcher.barrier = stronger(launcher.barrier, frame.barrier);
            }
            self.finished_frames.push(frame);
        }
        self.owners.pop();
    }

    fn visit_variable(
        &mut self,
        node: &SyntaxNode,
        type_text: Option<&String>,
        mutable: bool,
        doc: Option<String>,
    ) {
        let Some(name) = node.name.as_deref().filter(|name| *name != "_") else {
            return;
        };
        if self.frame().global.contains(name) {
            return;
        }
        if self.frame().nonlocal.contains(name) {
            self.record_use(name, node.range);
            return;
        }

        let scope = self.current_scope();
        let kind = self.scope(scope).kind;
        if self.rule == BindingRule::FunctionWide && self.binds_here(scope, name) {
            return;
        }

        match kind {
            ScopeKind::Unit => {
                if let Some(mut symbol) =
                    self.declare(SymbolKind::GlobalVariable, name, name, node.range)
                {
                    symbol.visibility = node.visibility;
                    symbol.mutable = mutable;
                    symbol.type_text = type_text.cloned();
                    symbol.doc_comment = doc;
                    if mutable {
                        symbol.add_trait(SymbolTrait::ProcessWide);
                    }
                    self.commit(symbol);
                }
            }
            ScopeKind::TypeBody => {
                if let Some(mut symbol) = self.declare(SymbolKind::Field, name, name, node.range) {
                    symbol.visibility = node.visibility;
                    symbol.mutable = mutable;
                    symbol.type_text = type_text.cloned();
                    symbol.doc_comment = doc;
                    self.commit(symbol);
                }
            }
            ScopeKind::Function | ScopeKind::Block { .. } | ScopeKind::Comprehension => {
                let target = match self.rule {
                    BindingRule::Sequential => scope,
                    BindingRule::FunctionWide => self.function_level_scope(scope),
                };
                self.scope_mut(target).bindings.push(LocalBinding {
                    name: name.to_string(),
                    range: node.range,
                });
            }
        }
    }

    /// Whether `name` already has a symbol or binding in `scope`
    fn binds_here(&self, scope: ScopeId, name: &str) -> bool {
        let node = self.scope(scope);
        node.bindings.iter().any(|binding| binding.name == name)
            || node.symbols.iter().any(|id| {
                self.model.symbol(*id).is_some_and(|symbol| {
                    symbol.name.as_ref() == name && symbol.kind != SymbolKind::Closure
                })
            })
    }

    fn function_level_scope(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let node = self.scope(scope);
            match (node.kind, node.parent) {
                (ScopeKind::Function | ScopeKind::Comprehension | ScopeKind::Unit, _)
                | (_, None) => return scope,
                (_, Some(parent)) => scope = parent,
            }
        }
    }

    fn visit_unknown(&mut self, node: &SyntaxNode, raw_kind: &str) {
        let scope = self.current_scope();
        let count = self.unclassified.entry(scope).or_insert(0);
        *count += 1;
        let name = format!("<unclassified#{count}>");

        if let Some(mut symbol) = self.declare(SymbolKind::Unclassified, &name, &name, node.range) {
            symbol.raw_kind = Some(raw_kind.to_string());
            self.commit(symbol);
        }
        self.push_diagnostic(Diagnostic::UnclassifiedConstruct {
            raw_kind: raw_kind.to_string(),
            range: node.range,
        });
    }

    /// Order scope contents by source position and hand back the model
    pub(crate) fn finish(mut self) -> (SymbolModel, Vec<Use>, Vec<SymbolId>, Vec<Frame>) {
        let starts: HashMap<SymbolId, (u32, u16)> = self
            .model
            .symbols
            .iter()
            .map(|symbol| (symbol.id, symbol.range.start()))
            .collect();
        let scope_starts: Vec<(u32, u16)> =
            self.model.scopes.iter().map(|scope| scope.range.start()).collect();

        for scope in &mut self.model.scopes {
            scope
                .symbols
                .sort_by_key(|id| starts.get(id).copied().unwrap_or_default());
            scope.children.sort_by_key(|id| {
                scope_starts
                    .get(id.index())
                    .copied()
                    .unwrap_or_default()
            });
        }

        while let Some(frame) = self.frames.pop() {
            if frame.symbol.is_some() {
                self.finished_frames.push(frame);
            }
        }

        (
            self.model,
            self.uses,
            self.capture_targets,
            self.finished_frames,
        )
    }
}
