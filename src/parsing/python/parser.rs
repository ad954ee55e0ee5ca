//! Python front-end implementation
//!
//! Uses tree-sitter-python crate's LANGUAGE constant (converted via .into()).

use crate::parsing::parser::{lower_with, nesting_limit_node, node_text};
use crate::parsing::{
    BindingDirective, FrontEnd, HandledNode, Language, MAX_NESTING_DEPTH, NodeTracker,
    NodeTrackingState, ParseOutput, SyncHint, SyntaxKind, SyntaxNode,
};
use crate::symbol::{Param, Signature, Visibility};
use crate::types::Range;
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Bases that turn a class into a capability set
const INTERFACE_BASES: &[&str] = &["Protocol", "ABC"];

/// Bases that carry no methods worth promoting
const IGNORED_BASES: &[&str] = &["object", "Protocol", "ABC", "Generic"];

const QUEUE_TYPES: &[&str] = &[
    "Queue",
    "SimpleQueue",
    "JoinableQueue",
    "LifoQueue",
    "PriorityQueue",
];

/// Python language front-end
pub struct PythonParser {
    parser: Parser,
    node_tracker: NodeTrackingState,
}

impl std::fmt::Debug for PythonParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonParser")
            .field("language", &"Python")
            .finish()
    }
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| format!("Failed to set Python language: {e}"))?;

        Ok(Self {
            parser,
            node_tracker: NodeTrackingState::new(),
        })
    }
}

impl FrontEnd for PythonParser {
    fn parse(&mut self, text: &str) -> ParseOutput {
        let tracker = &mut self.node_tracker;
        lower_with(&mut self.parser, Language::Python, text, |root, code| {
            Lowerer {
                code,
                tracker,
                depth: 0,
            }
            .module(root)
        })
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

impl NodeTracker for PythonParser {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        self.node_tracker.get_handled_nodes()
    }

    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.node_tracker.register_handled_node(node_kind, node_id);
    }
}

/// Leading underscore hides a name; dunder names stay public
fn python_visibility(name: &str) -> Visibility {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    if name.starts_with('_') && !dunder {
        Visibility::Unexported
    } else {
        Visibility::Exported
    }
}

/// `UPPER_CASE` names are treated as constants
fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase()) && !name.chars().any(|c| c.is_lowercase())
}

fn last_segment(dotted: &str) -> &str {
    dotted.rsplit('.').next().unwrap_or(dotted)
}

/// Strip quotes and surrounding blank lines from a docstring literal
fn normalize_docstring(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);

    let content = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            (trimmed.len() >= quote.len() * 2)
                .then(|| trimmed.strip_prefix(quote)?.strip_suffix(quote))
                .flatten()
        })
        .unwrap_or(trimmed);

    let lines: Vec<&str> = content.lines().collect();
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |last| last + 1);

    lines[start..end]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One lowering pass over a single module
struct Lowerer<'a> {
    code: &'a str,
    tracker: &'a mut NodeTrackingState,
    depth: usize,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.code)
    }

    fn handled(&mut self, node: Node) {
        self.tracker.register_handled_node(node.kind(), node.kind_id());
    }

    fn descend(&mut self, node: Node, out: &mut Vec<SyntaxNode>) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            out.push(nesting_limit_node(node));
            return false;
        }
        self.depth += 1;
        true
    }

    /// First statement of a module or body when it is a bare string
    fn docstring(&self, body: Node) -> Option<String> {
        let first = body
            .named_children(&mut body.walk())
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let expr = first.named_child(0)?;
        (expr.kind() == "string").then(|| normalize_docstring(self.text(expr)))
    }

    fn module(&mut self, root: Node) -> Vec<SyntaxNode> {
        let mut out = vec![
            SyntaxNode::new(SyntaxKind::Package, Range::new(0, 0, 0, 0))
                .with_doc(self.docstring(root)),
        ];
        self.statements(root, &mut out);
        out
    }

    fn statements(&mut self, block: Node, out: &mut Vec<SyntaxNode>) {
        for statement in block.named_children(&mut block.walk()) {
            self.statement(statement, out);
        }
    }

    fn comment(&self, node: Node) -> SyntaxNode {
        SyntaxNode::new(SyntaxKind::Comment { block: false }, Range::from_node(&node))
            .with_text(self.text(node))
    }

    fn statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if self.descend(node, out) {
            self.lower_statement(node, out);
            self.depth -= 1;
        }
    }

    fn lower_statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "comment" => out.push(self.comment(node)),
            "function_definition" => out.push(self.function(node, false)),
            "class_definition" => out.push(self.class(node)),
            "decorated_definition" => self.decorated(node, false, out),
            "import_statement" | "import_from_statement" => self.import(node, out),
            "future_import_statement" | "pass_statement" | "break_statement"
            | "continue_statement" => {}
            "expression_statement" => {
                for child in node.named_children(&mut node.walk()) {
                    match child.kind() {
                        "assignment" | "augmented_assignment" => {
                            self.assignment(child, false, out)
                        }
                        _ => self.expression(child, out),
                    }
                }
            }
            "global_statement" | "nonlocal_statement" => {
                self.handled(node);
                let directive = if node.kind() == "global_statement" {
                    BindingDirective::Global
                } else {
                    BindingDirective::Nonlocal
                };
                for name in node.named_children(&mut node.walk()) {
                    if name.kind() == "identifier" {
                        out.push(
                            SyntaxNode::new(
                                SyntaxKind::BindingDecl(directive),
                                Range::from_node(&name),
                            )
                            .named(self.text(name)),
                        );
                    }
                }
            }
            "for_statement" | "while_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                if let Some(targets) = node.child_by_field_name("left") {
                    self.bindings(targets, false, &mut children);
                }
                if let Some(iterable) = node.child_by_field_name("right") {
                    self.expression(iterable, &mut children);
                }
                if let Some(condition) = node.child_by_field_name("condition") {
                    self.expression(condition, &mut children);
                }
                for child in node.named_children(&mut node.walk()) {
                    if matches!(child.kind(), "block" | "else_clause") {
                        self.compound(child, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "if_statement" | "elif_clause" | "else_clause" | "try_statement"
            | "finally_clause" | "block" | "ERROR" => self.compound(node, out),
            "except_clause" | "except_group_clause" => {
                let mut after_as = false;
                for child in node.children(&mut node.walk()) {
                    if !child.is_named() {
                        after_as |= child.kind() == "as";
                        continue;
                    }
                    match child.kind() {
                        "block" => self.statements(child, out),
                        "as_pattern" => self.as_pattern(child, out),
                        "identifier" if after_as => self.bindings(child, false, out),
                        _ => self.expression(child, out),
                    }
                }
            }
            "with_statement" => {
                for child in node.named_children(&mut node.walk()) {
                    match child.kind() {
                        "with_clause" => {
                            for item in child.named_children(&mut child.walk()) {
                                let value = item.child_by_field_name("value").unwrap_or(item);
                                if value.kind() == "as_pattern" {
                                    self.as_pattern(value, out);
                                } else {
                                    self.expression(value, out);
                                }
                            }
                        }
                        "block" => self.statements(child, out),
                        _ => self.expression(child, out),
                    }
                }
            }
            "type_alias_statement" => out.push(SyntaxNode::new(
                SyntaxKind::Unknown {
                    raw_kind: node.kind().to_string(),
                },
                Range::from_node(&node),
            )),
            _ => self.expression(node, out),
        }
    }

    /// Blocks do not scope in Python; compound statements flatten
    fn compound(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        for child in node.named_children(&mut node.walk()) {
            if child.kind() == "block" {
                self.statements(child, out);
            } else {
                self.statement(child, out);
            }
        }
    }

    /// `expr as name` inside `with` and `except`
    fn as_pattern(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        let alias = node.child_by_field_name("alias").map(|alias| alias.id());
        for child in node.named_children(&mut node.walk()) {
            if Some(child.id()) == alias || child.kind() == "as_pattern_target" {
                self.bindings(child, false, out);
            } else {
                self.expression(child, out);
            }
        }
    }

    /// Variable (or Field) nodes for assignment targets
    fn bindings(&mut self, target: Node, field: bool, out: &mut Vec<SyntaxNode>) {
        self.binding_with_type(target, field, None, out);
    }

    fn binding_with_type(
        &mut self,
        target: Node,
        field: bool,
        type_text: Option<&str>,
        out: &mut Vec<SyntaxNode>,
    ) {
        if !self.descend(target, out) {
            return;
        }
        match target.kind() {
            "identifier" => {
                let name = self.text(target);
                let mutable = !is_constant_name(name);
                let type_text = type_text.map(str::to_string);
                let kind = if field {
                    SyntaxKind::Field {
                        type_text,
                        embedded: false,
                        mutable,
                    }
                } else {
                    SyntaxKind::Variable { type_text, mutable }
                };
                out.push(
                    SyntaxNode::new(kind, Range::from_node(&target))
                        .named(name)
                        .with_visibility(python_visibility(name)),
                );
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
            | "list" | "parenthesized_expression" | "list_splat_pattern" | "list_splat"
            | "as_pattern_target" => {
                for child in target.named_children(&mut target.walk()) {
                    self.binding_with_type(child, field, None, out);
                }
            }
            // Attribute and subscript targets only use their object
            _ => self.expression(target, out),
        }
        self.depth -= 1;
    }

    fn assignment(&mut self, node: Node, field: bool, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let type_node = node.child_by_field_name("type");
        let type_text = type_node.map(|t| self.text(t));

        if let Some(left) = node.child_by_field_name("left") {
            if node.kind() == "augmented_assignment" {
                self.expression(left, out);
            }
            self.binding_with_type(left, field, type_text, out);
        }
        if let Some(type_node) = type_node {
            self.type_refs(type_node, out);
        }
        if let Some(right) = node.child_by_field_name("right") {
            if matches!(right.kind(), "assignment" | "augmented_assignment") {
                self.assignment(right, field, out);
            } else {
                self.expression(right, out);
            }
        }
    }

    fn import(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let module = node
            .child_by_field_name("module_name")
            .map(|module| self.text(module));

        for name in node.children_by_field_name("name", &mut node.walk()) {
            let (path, alias) = match name.kind() {
                "aliased_import" => {
                    let path = name.child_by_field_name("name").map(|n| self.text(n));
                    let alias = name.child_by_field_name("alias").map(|a| self.text(a));
                    match (path, alias) {
                        (Some(path), Some(alias)) => (path, alias),
                        _ => continue,
                    }
                }
                _ => {
                    let path = self.text(name);
                    // `import os.path` binds `os`; `from x import y` binds `y`
                    let alias = if module.is_some() {
                        path
                    } else {
                        path.split('.').next().unwrap_or(path)
                    };
                    (path, alias)
                }
            };

            let full_path = match module {
                Some(module) if module.ends_with('.') => format!("{module}{path}"),
                Some(module) => format!("{module}.{path}"),
                None => path.to_string(),
            };
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Import {
                        alias: alias.to_string(),
                    },
                    Range::from_node(&name),
                )
                .named(full_path),
            );
        }

        if let Some(module) = module
            && let Some(wildcard) = node
                .named_children(&mut node.walk())
                .find(|child| child.kind() == "wildcard_import")
        {
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Import {
                        alias: "*".to_string(),
                    },
                    Range::from_node(&wildcard),
                )
                .named(module),
            );
        }
    }

    /// Signature plus Param nodes.
    ///
    /// Inside a class the leading `self`/`cls` is a parameter symbol but not
    /// part of the signature.
    fn parameters(
        &mut self,
        params: Option<Node>,
        in_class: bool,
        out: &mut Vec<SyntaxNode>,
    ) -> Signature {
        let mut signature = Signature::default();
        let Some(params) = params else {
            return signature;
        };
        self.handled(params);

        for (index, param) in params.named_children(&mut params.walk()).enumerate() {
            let (name_node, type_node, default) = match param.kind() {
                "identifier" => (Some(param), None, None),
                "typed_parameter" => (
                    param
                        .named_children(&mut param.walk())
                        .find(|child| {
                            matches!(
                                child.kind(),
                                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern"
                            )
                        }),
                    param.child_by_field_name("type"),
                    None,
                ),
                "default_parameter" | "typed_default_parameter" => (
                    param.child_by_field_name("name"),
                    param.child_by_field_name("type"),
                    param.child_by_field_name("value"),
                ),
                "list_splat_pattern" | "dictionary_splat_pattern" => (Some(param), None, None),
                _ => (None, None, None),
            };
            let Some(mut name_node) = name_node else {
                continue;
            };

            let splat = matches!(
                name_node.kind(),
                "list_splat_pattern" | "dictionary_splat_pattern"
            );
            if splat {
                signature.variadic = true;
                match name_node.named_child(0) {
                    Some(inner) => name_node = inner,
                    None => continue,
                }
            }

            let name = self.text(name_node);
            let type_text = type_node.map(|t| self.text(t).to_string());
            let receiver = in_class && index == 0 && matches!(name, "self" | "cls");
            if !splat && !receiver {
                signature.params.push(Param {
                    name: Some(name.to_string()),
                    type_text: type_text.clone(),
                });
            }

            out.push(
                SyntaxNode::new(SyntaxKind::Param { type_text }, Range::from_node(&name_node))
                    .named(name),
            );
            if let Some(type_node) = type_node {
                self.type_refs(type_node, out);
            }
            if let Some(default) = default {
                self.expression(default, out);
            }
        }

        signature
    }

    /// Unannotated returns are unknown; `-> None` returns nothing
    fn results(&self, return_type: Option<Node>) -> Option<usize> {
        return_type.map(|ret| if self.text(ret).trim() == "None" { 0 } else { 1 })
    }

    fn function(&mut self, node: Node, in_class: bool) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
        let return_type = node.child_by_field_name("return_type");

        let mut children = Vec::new();
        let mut signature =
            self.parameters(node.child_by_field_name("parameters"), in_class, &mut children);
        signature.results = self.results(return_type);
        if let Some(return_type) = return_type {
            self.type_refs(return_type, &mut children);
        }

        let body = node.child_by_field_name("body");
        let doc = body.and_then(|body| self.docstring(body));
        if let Some(body) = body {
            self.statements(body, &mut children);
        }

        SyntaxNode::new(
            SyntaxKind::Function {
                signature,
                is_async,
            },
            Range::from_node(&node),
        )
        .named(name)
        .with_visibility(python_visibility(name))
        .with_doc(doc)
        .with_children(children)
    }

    /// The definition is lowered first; decorator expressions follow it
    fn decorated(&mut self, node: Node, in_class: bool, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        if let Some(definition) = node.child_by_field_name("definition") {
            match definition.kind() {
                "function_definition" => out.push(self.function(definition, in_class)),
                "class_definition" => out.push(self.class(definition)),
                _ => {}
            }
        }
        for decorator in node.named_children(&mut node.walk()) {
            if decorator.kind() == "decorator" {
                for expr in decorator.named_children(&mut decorator.walk()) {
                    self.expression(expr, out);
                }
            }
        }
    }

    fn class(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for base in superclasses.named_children(&mut superclasses.walk()) {
                let base = match base.kind() {
                    "identifier" | "attribute" => base,
                    "subscript" | "generic_type" => match base.named_child(0) {
                        Some(inner) => inner,
                        None => continue,
                    },
                    _ => continue,
                };
                bases.push(self.text(base).to_string());
            }
        }

        let is_interface = bases
            .iter()
            .any(|base| INTERFACE_BASES.contains(&last_segment(base)));
        let embeds: Vec<String> = bases
            .into_iter()
            .filter(|base| !IGNORED_BASES.contains(&last_segment(base)))
            .collect();

        let body = node.child_by_field_name("body");
        let doc = body.and_then(|body| self.docstring(body));
        let mut children = Vec::new();
        let kind = if is_interface {
            if let Some(body) = body {
                self.interface_body(body, &mut children);
            }
            SyntaxKind::InterfaceDecl { embeds }
        } else {
            if let Some(body) = body {
                self.class_body(body, &mut children);
            }
            SyntaxKind::TypeDecl { embeds }
        };

        SyntaxNode::new(kind, Range::from_node(&node))
            .named(name)
            .with_visibility(python_visibility(name))
            .with_doc(doc)
            .with_children(children)
    }

    fn class_body(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        for statement in body.named_children(&mut body.walk()) {
            match statement.kind() {
                "function_definition" => out.push(self.function(statement, true)),
                "decorated_definition" => self.decorated(statement, true, out),
                "expression_statement" => {
                    for child in statement.named_children(&mut statement.walk()) {
                        match child.kind() {
                            "assignment" | "augmented_assignment" => {
                                self.assignment(child, true, out)
                            }
                            _ => self.expression(child, out),
                        }
                    }
                }
                _ => self.statement(statement, out),
            }
        }
    }

    /// Protocol/ABC bodies contribute method requirements only
    fn interface_body(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        for statement in body.named_children(&mut body.walk()) {
            let function = match statement.kind() {
                "function_definition" => statement,
                "decorated_definition" => match statement.child_by_field_name("definition") {
                    Some(def) if def.kind() == "function_definition" => def,
                    _ => continue,
                },
                _ => continue,
            };
            let Some(name) = function.child_by_field_name("name").map(|n| self.text(n)) else {
                continue;
            };

            let mut discarded = Vec::new();
            let mut signature =
                self.parameters(function.child_by_field_name("parameters"), true, &mut discarded);
            signature.results = self.results(function.child_by_field_name("return_type"));
            out.push(
                SyntaxNode::new(SyntaxKind::MethodSpec(signature), Range::from_node(&function))
                    .named(name)
                    .with_visibility(python_visibility(name)),
            );
        }
    }

    fn type_refs(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if self.descend(node, out) {
            self.lower_type_refs(node, out);
            self.depth -= 1;
        }
    }

    fn lower_type_refs(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "identifier" | "attribute" => {
                let name = self.text(node);
                if name != "None" {
                    out.push(SyntaxNode::new(SyntaxKind::TypeRef, Range::from_node(&node)).named(name));
                }
            }
            "string" | "none" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.type_refs(child, out);
                }
            }
        }
    }

    fn expression(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if self.descend(node, out) {
            self.lower_expression(node, out);
            self.depth -= 1;
        }
    }

    fn lower_expression(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "identifier" => {
                out.push(
                    SyntaxNode::new(SyntaxKind::Ident, Range::from_node(&node)).named(self.text(node)),
                );
            }
            "attribute" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.expression(object, out);
                }
            }
            "call" => self.call(node, out),
            "lambda" => {
                self.handled(node);
                let mut children = Vec::new();
                let signature =
                    self.parameters(node.child_by_field_name("parameters"), false, &mut children);
                if let Some(body) = node.child_by_field_name("body") {
                    self.expression(body, &mut children);
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Closure { signature }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.expression(value, out);
                }
            }
            "named_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bindings(name, false, out);
                }
                if let Some(value) = node.child_by_field_name("value") {
                    self.expression(value, out);
                }
            }
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => self.comprehension(node, out),
            "comment" | "integer" | "float" | "true" | "false" | "none" | "ellipsis"
            | "string_content" | "escape_sequence" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.expression(child, out);
                }
            }
        }
    }

    /// Comprehension targets live in a scope of their own.
    ///
    /// The first iterable is evaluated in the enclosing scope and lowered
    /// outside the comprehension node.
    fn comprehension(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let clauses: Vec<Node> = node.named_children(&mut node.walk()).collect();
        let first_iterable = clauses
            .iter()
            .find(|clause| clause.kind() == "for_in_clause")
            .and_then(|clause| clause.child_by_field_name("right"));
        if let Some(iterable) = first_iterable {
            self.expression(iterable, out);
        }

        let mut children = Vec::new();
        for clause in &clauses {
            if clause.kind() == "for_in_clause"
                && let Some(left) = clause.child_by_field_name("left")
            {
                self.bindings(left, false, &mut children);
            }
        }
        for clause in clauses {
            match clause.kind() {
                "for_in_clause" => {
                    if let Some(right) = clause.child_by_field_name("right")
                        && Some(right.id()) != first_iterable.map(|first| first.id())
                    {
                        self.expression(right, &mut children);
                    }
                }
                _ => self.expression(clause, &mut children),
            }
        }

        out.push(
            SyntaxNode::new(SyntaxKind::Comprehension, Range::from_node(&node))
                .with_children(children),
        );
    }

    fn call(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let callee = self.text(function);
        let method = last_segment(callee);

        let mut children = Vec::new();
        self.expression(function, &mut children);
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }

        let range = Range::from_node(&node);
        let named_callee = matches!(function.kind(), "identifier" | "attribute")
            && !callee.contains(['(', '[', '\n']);
        let lowered = if named_callee {
            vec![
                SyntaxNode::new(SyntaxKind::Call, range)
                    .named(callee)
                    .with_children(children),
            ]
        } else {
            children
        };

        let spawns = named_callee
            && matches!(
                method,
                "Thread" | "Process" | "submit" | "create_task" | "ensure_future" | "gather"
            );
        if spawns {
            out.push(SyntaxNode::new(SyntaxKind::Spawn, range).with_children(lowered));
        } else {
            out.extend(lowered);
        }

        if named_callee && self.is_barrier_call(function, callee, method) {
            out.push(SyntaxNode::new(SyntaxKind::Sync(SyncHint::CountingBarrier), range));
        }
        if named_callee && QUEUE_TYPES.contains(&method) {
            out.push(SyntaxNode::new(SyntaxKind::Sync(SyncHint::Channel), range));
        }
    }

    fn is_barrier_call(&self, function: Node, callee: &str, method: &str) -> bool {
        match method {
            "gather" | "as_completed" => true,
            "wait" => callee == "wait" || callee.ends_with("futures.wait") || callee.ends_with("asyncio.wait"),
            // `", ".join(...)` and `os.path.join(...)` are string operations
            "join" => {
                function.kind() == "attribute"
                    && !callee.ends_with("path.join")
                    && function
                        .child_by_field_name("object")
                        .is_some_and(|object| object.kind() != "string")
            }
            _ => false,
        }
    }
}
