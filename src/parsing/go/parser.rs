//! Go front-end implementation
//!
//! Uses tree-sitter-go crate's LANGUAGE constant (converted via .into()).

use crate::parsing::parser::{lower_with, nesting_limit_node, node_text, range_after};
use crate::parsing::{
    FrontEnd, HandledNode, Language, MAX_NESTING_DEPTH, NodeTracker, NodeTrackingState,
    ParseOutput, ReceiverSpec, SyncHint, SyntaxKind, SyntaxNode,
};
use crate::symbol::{Param, Signature, Visibility};
use crate::types::Range;
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Go language front-end
pub struct GoParser {
    parser: Parser,
    node_tracker: NodeTrackingState,
}

impl GoParser {
    /// Create a new Go parser
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        let lang = tree_sitter_go::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| format!("Failed to set Go language: {e}"))?;

        Ok(Self {
            parser,
            node_tracker: NodeTrackingState::new(),
        })
    }
}

impl FrontEnd for GoParser {
    fn parse(&mut self, text: &str) -> ParseOutput {
        let tracker = &mut self.node_tracker;
        lower_with(&mut self.parser, Language::Go, text, |root, code| {
            Lowerer {
                code,
                tracker,
                depth: 0,
            }
            .source_file(root)
        })
    }

    fn language(&self) -> Language {
        Language::Go
    }
}

impl NodeTracker for GoParser {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        self.node_tracker.get_handled_nodes()
    }

    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.node_tracker.register_handled_node(node_kind, node_id);
    }
}

fn determine_go_visibility(name: &str) -> Visibility {
    match name.chars().next() {
        Some(first) if first.is_uppercase() => Visibility::Exported,
        _ => Visibility::Unexported,
    }
}

/// Bare type name: `*pkg.List[T]` becomes `List`
fn bare_type_name(text: &str) -> &str {
    let text = text.trim_start_matches('*').trim();
    let text = text.split('[').next().unwrap_or(text);
    text.rsplit('.').next().unwrap_or(text)
}

/// One lowering pass over a single source file
struct Lowerer<'a> {
    code: &'a str,
    tracker: &'a mut NodeTrackingState,
    /// Nested statement/expression calls currently on the stack
    depth: usize,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.code)
    }

    fn handled(&mut self, node: Node) {
        self.tracker.register_handled_node(node.kind(), node.kind_id());
    }

    /// Enter one nesting level; past the bound the subtree is cut off
    fn descend(&mut self, node: Node, out: &mut Vec<SyntaxNode>) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            out.push(nesting_limit_node(node));
            return false;
        }
        self.depth += 1;
        true
    }

    fn source_file(&mut self, root: Node) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        for child in root.named_children(&mut root.walk()) {
            self.top_level(child, &mut out);
        }
        out
    }

    fn top_level(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "package_clause" => {
                self.handled(node);
                let name = node
                    .named_children(&mut node.walk())
                    .find(|child| child.kind() == "package_identifier")
                    .map(|child| self.text(child));
                let mut package = SyntaxNode::new(SyntaxKind::Package, Range::from_node(&node));
                package.name = name.map(str::to_string);
                out.push(package);
            }
            "import_declaration" => self.import_declaration(node, out),
            "function_declaration" => out.push(self.function_declaration(node)),
            "method_declaration" => {
                if let Some(method) = self.method_declaration(node) {
                    out.push(method);
                }
            }
            "type_declaration" => self.type_declaration(node, out),
            "var_declaration" => self.value_declaration(node, true, false, out),
            "const_declaration" => self.value_declaration(node, false, false, out),
            "comment" => out.push(self.comment(node)),
            "ERROR" => {
                // Keep whatever declarations survived error recovery
                for child in node.named_children(&mut node.walk()) {
                    if matches!(
                        child.kind(),
                        "package_clause"
                            | "import_declaration"
                            | "function_declaration"
                            | "method_declaration"
                            | "type_declaration"
                            | "var_declaration"
                            | "const_declaration"
                            | "ERROR"
                    ) {
                        self.top_level(child, out);
                    }
                }
            }
            kind => out.push(SyntaxNode::new(
                SyntaxKind::Unknown {
                    raw_kind: kind.to_string(),
                },
                Range::from_node(&node),
            )),
        }
    }

    fn comment(&self, node: Node) -> SyntaxNode {
        let text = self.text(node);
        SyntaxNode::new(
            SyntaxKind::Comment {
                block: text.starts_with("/*"),
            },
            Range::from_node(&node),
        )
        .with_text(text)
    }

    fn import_declaration(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let mut specs = Vec::new();
        for child in node.named_children(&mut node.walk()) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => specs.extend(
                    child
                        .named_children(&mut child.walk())
                        .filter(|spec| spec.kind() == "import_spec"),
                ),
                _ => {}
            }
        }

        for spec in specs {
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };
            let path = self.text(path_node).trim_matches(|c| c == '"' || c == '`');
            let alias = spec
                .child_by_field_name("name")
                .map(|name| self.text(name))
                .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path));
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Import {
                        alias: alias.to_string(),
                    },
                    Range::from_node(&spec),
                )
                .named(path),
            );
        }
    }

    /// Parameters and result arity of a callable
    fn signature(&self, params: Option<Node>, result: Option<Node>) -> Signature {
        let mut signature = Signature::default();
        if let Some(list) = params {
            for decl in list.named_children(&mut list.walk()) {
                if !matches!(
                    decl.kind(),
                    "parameter_declaration" | "variadic_parameter_declaration"
                ) {
                    continue;
                }
                if decl.kind() == "variadic_parameter_declaration" {
                    signature.variadic = true;
                }
                let type_text = decl
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string());
                let names: Vec<String> = decl
                    .children_by_field_name("name", &mut decl.walk())
                    .map(|name| self.text(name).to_string())
                    .collect();
                if names.is_empty() {
                    signature.params.push(Param {
                        name: None,
                        type_text,
                    });
                } else {
                    signature
                        .params
                        .extend(names.into_iter().map(|name| Param {
                            name: Some(name),
                            type_text: type_text.clone(),
                        }));
                }
            }
        }

        signature.results = Some(match result {
            None => 0,
            Some(list) if list.kind() == "parameter_list" => self.signature(Some(list), None).arity(),
            Some(_) => 1,
        });
        signature
    }

    /// Param nodes for named parameters plus type references
    fn parameters(&mut self, list: Option<Node>, out: &mut Vec<SyntaxNode>) {
        let Some(list) = list else { return };
        if list.kind() != "parameter_list" {
            self.type_refs(list, out);
            return;
        }
        for decl in list.named_children(&mut list.walk()) {
            if !matches!(
                decl.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            ) {
                continue;
            }
            let type_node = decl.child_by_field_name("type");
            let type_text = type_node.map(|t| self.text(t).to_string());
            for name in decl.children_by_field_name("name", &mut decl.walk()) {
                out.push(
                    SyntaxNode::new(
                        SyntaxKind::Param {
                            type_text: type_text.clone(),
                        },
                        Range::from_node(&name),
                    )
                    .named(self.text(name)),
                );
            }
            if let Some(type_node) = type_node {
                self.type_refs(type_node, out);
            }
        }
    }

    /// TypeRef nodes for every named type inside a type expression
    fn type_refs(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if self.descend(node, out) {
            self.lower_type_refs(node, out);
            self.depth -= 1;
        }
    }

    fn lower_type_refs(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "type_identifier" | "qualified_type" => out.push(
                SyntaxNode::new(SyntaxKind::TypeRef, Range::from_node(&node)).named(self.text(node)),
            ),
            "generic_type" => {
                if let Some(base) = node.child_by_field_name("type") {
                    self.type_refs(base, out);
                }
                if let Some(args) = node.child_by_field_name("type_arguments") {
                    self.type_refs(args, out);
                }
            }
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.type_refs(child, out);
                }
            }
        }
    }

    fn function_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let signature = self.signature(
            node.child_by_field_name("parameters"),
            node.child_by_field_name("result"),
        );

        let mut children = Vec::new();
        self.parameters(node.child_by_field_name("parameters"), &mut children);
        self.parameters(node.child_by_field_name("result"), &mut children);
        if let Some(body) = node.child_by_field_name("body") {
            self.block_statements(body, &mut children);
        }

        SyntaxNode::new(
            SyntaxKind::Function {
                signature,
                is_async: false,
            },
            Range::from_node(&node),
        )
        .named(name)
        .with_visibility(determine_go_visibility(name))
        .with_children(children)
    }

    fn method_declaration(&mut self, node: Node) -> Option<SyntaxNode> {
        self.handled(node);
        let name = self.text(node.child_by_field_name("name")?);
        let receiver_list = node.child_by_field_name("receiver")?;
        let receiver_type = receiver_list
            .named_children(&mut receiver_list.walk())
            .find(|decl| decl.kind() == "parameter_declaration")
            .and_then(|decl| decl.child_by_field_name("type"))?;

        let receiver = ReceiverSpec {
            type_name: bare_type_name(self.text(receiver_type)).to_string(),
            pointer: receiver_type.kind() == "pointer_type",
        };
        let signature = self.signature(
            node.child_by_field_name("parameters"),
            node.child_by_field_name("result"),
        );

        let mut children = Vec::new();
        self.parameters(Some(receiver_list), &mut children);
        self.parameters(node.child_by_field_name("parameters"), &mut children);
        self.parameters(node.child_by_field_name("result"), &mut children);
        if let Some(body) = node.child_by_field_name("body") {
            self.block_statements(body, &mut children);
        }

        Some(
            SyntaxNode::new(
                SyntaxKind::Method {
                    receiver,
                    signature,
                    is_async: false,
                },
                Range::from_node(&node),
            )
            .named(name)
            .with_visibility(determine_go_visibility(name))
            .with_children(children),
        )
    }

    fn type_declaration(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        let single = children
            .iter()
            .filter(|child| matches!(child.kind(), "type_spec" | "type_alias"))
            .count()
            == 1;

        for child in children {
            match child.kind() {
                "type_spec" | "type_alias" => {
                    let range = if single { node } else { child };
                    if let Some(lowered) = self.type_spec(child, Range::from_node(&range)) {
                        out.push(lowered);
                    }
                }
                "comment" => out.push(self.comment(child)),
                _ => {}
            }
        }
    }

    fn type_spec(&mut self, spec: Node, range: Range) -> Option<SyntaxNode> {
        self.handled(spec);
        let name = self.text(spec.child_by_field_name("name")?);
        let type_node = spec.child_by_field_name("type")?;

        let lowered = match type_node.kind() {
            "struct_type" => {
                self.handled(type_node);
                let mut embeds = Vec::new();
                let mut fields = Vec::new();
                self.struct_fields(type_node, &mut fields, &mut embeds);
                SyntaxNode::new(SyntaxKind::TypeDecl { embeds }, range).with_children(fields)
            }
            "interface_type" => {
                self.handled(type_node);
                let mut embeds = Vec::new();
                let mut specs = Vec::new();
                self.interface_elements(type_node, &mut specs, &mut embeds);
                SyntaxNode::new(SyntaxKind::InterfaceDecl { embeds }, range).with_children(specs)
            }
            _ => {
                let mut refs = Vec::new();
                self.type_refs(type_node, &mut refs);
                SyntaxNode::new(SyntaxKind::TypeDecl { embeds: Vec::new() }, range)
                    .with_children(refs)
            }
        };

        Some(
            lowered
                .named(name)
                .with_visibility(determine_go_visibility(name)),
        )
    }

    fn struct_fields(&mut self, struct_node: Node, out: &mut Vec<SyntaxNode>, embeds: &mut Vec<String>) {
        let Some(list) = struct_node
            .named_children(&mut struct_node.walk())
            .find(|child| child.kind() == "field_declaration_list")
        else {
            return;
        };

        for field in list.named_children(&mut list.walk()) {
            match field.kind() {
                "field_declaration" => {
                    self.handled(field);
                    let Some(type_node) = field.child_by_field_name("type") else {
                        continue;
                    };
                    let type_text = self.text(type_node);
                    let names: Vec<Node> = field
                        .children_by_field_name("name", &mut field.walk())
                        .collect();

                    let mut refs = Vec::new();
                    self.type_refs(type_node, &mut refs);

                    if names.is_empty() {
                        let name = bare_type_name(type_text);
                        embeds.push(type_text.trim_start_matches('*').to_string());
                        out.push(
                            SyntaxNode::new(
                                SyntaxKind::Field {
                                    type_text: Some(type_text.to_string()),
                                    embedded: true,
                                    mutable: true,
                                },
                                Range::from_node(&field),
                            )
                            .named(name)
                            .with_visibility(determine_go_visibility(name))
                            .with_children(refs),
                        );
                        continue;
                    }

                    let single = names.len() == 1;
                    for name_node in names {
                        let name = self.text(name_node);
                        let range = if single { field } else { name_node };
                        out.push(
                            SyntaxNode::new(
                                SyntaxKind::Field {
                                    type_text: Some(type_text.to_string()),
                                    embedded: false,
                                    mutable: true,
                                },
                                Range::from_node(&range),
                            )
                            .named(name)
                            .with_visibility(determine_go_visibility(name))
                            .with_children(refs.clone()),
                        );
                    }
                }
                "comment" => out.push(self.comment(field)),
                _ => {}
            }
        }
    }

    fn interface_elements(&mut self, iface: Node, out: &mut Vec<SyntaxNode>, embeds: &mut Vec<String>) {
        for element in iface.named_children(&mut iface.walk()) {
            match element.kind() {
                "method_elem" | "method_spec" => {
                    self.handled(element);
                    let Some(name_node) = element.child_by_field_name("name") else {
                        continue;
                    };
                    let name = self.text(name_node);
                    let signature = self.signature(
                        element.child_by_field_name("parameters"),
                        element.child_by_field_name("result"),
                    );
                    out.push(
                        SyntaxNode::new(SyntaxKind::MethodSpec(signature), Range::from_node(&element))
                            .named(name)
                            .with_visibility(determine_go_visibility(name)),
                    );
                }
                "type_elem" | "constraint_elem" => {
                    // Only a lone type name is an embedding; unions and `~T` are constraints
                    let types: Vec<Node> = element.named_children(&mut element.walk()).collect();
                    if let [single] = types.as_slice()
                        && matches!(single.kind(), "type_identifier" | "qualified_type")
                        && !self.text(element).contains('~')
                    {
                        embeds.push(self.text(*single).to_string());
                    }
                }
                "type_identifier" | "qualified_type" | "interface_type_name" => {
                    embeds.push(self.text(element).to_string());
                }
                _ => {}
            }
        }
    }

    /// `var`/`const` declarations, at package level or inside a body
    fn value_declaration(&mut self, node: Node, mutable: bool, local: bool, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let mut specs = Vec::new();
        for child in node.named_children(&mut node.walk()) {
            match child.kind() {
                "var_spec" | "const_spec" => specs.push(child),
                "var_spec_list" | "const_spec_list" => {
                    for spec in child.named_children(&mut child.walk()) {
                        specs.push(spec);
                    }
                }
                "comment" => specs.push(child),
                _ => {}
            }
        }

        for spec in specs {
            if spec.kind() == "comment" {
                out.push(self.comment(spec));
            } else if matches!(spec.kind(), "var_spec" | "const_spec") {
                self.value_spec(spec, mutable, local, out);
            }
        }
    }

    /// Local names are in scope only after the whole spec, so `var x = x` reads the outer `x`
    fn value_spec(&mut self, spec: Node, mutable: bool, local: bool, out: &mut Vec<SyntaxNode>) {
        self.handled(spec);
        let type_node = spec.child_by_field_name("type");
        let type_text = type_node.map(|t| self.text(t).to_string());

        let mut extras = Vec::new();
        if let Some(type_node) = type_node {
            self.type_refs(type_node, &mut extras);
            if self.text(type_node).ends_with("WaitGroup") {
                extras.push(SyntaxNode::new(
                    SyntaxKind::Sync(SyncHint::CountingBarrier),
                    Range::from_node(&type_node),
                ));
            }
        }

        if local && let Some(value) = spec.child_by_field_name("value") {
            self.expression(value, out);
        }

        for name in spec.children_by_field_name("name", &mut spec.walk()) {
            let text = self.text(name);
            let range = if local {
                range_after(spec)
            } else {
                Range::from_node(&name)
            };
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Variable {
                        type_text: type_text.clone(),
                        mutable,
                    },
                    range,
                )
                .named(text)
                .with_visibility(determine_go_visibility(text))
                .with_children(std::mem::take(&mut extras)),
            );
        }

        if !local && let Some(value) = spec.child_by_field_name("value") {
            self.expression(value, out);
        }
    }

    /// Function bodies are unwrapped into the callable
    fn block_statements(&mut self, block: Node, out: &mut Vec<SyntaxNode>) {
        for child in block.named_children(&mut block.walk()) {
            if child.kind() == "statement_list" {
                for statement in child.named_children(&mut child.walk()) {
                    self.statement(statement, out);
                }
            } else {
                self.statement(child, out);
            }
        }
    }

    fn block(&mut self, node: Node, looping: bool) -> SyntaxNode {
        let mut children = Vec::new();
        self.block_statements(node, &mut children);
        SyntaxNode::new(SyntaxKind::Block { looping }, Range::from_node(&node)).with_children(children)
    }

    /// Variables for `a, b :=`; plain identifiers only.
    ///
    /// The names come into scope at the end of `statement`, after its right-hand side.
    fn short_bindings(&mut self, left: Node, statement: Node, out: &mut Vec<SyntaxNode>) {
        let names: Vec<Node> = if left.kind() == "identifier" {
            vec![left]
        } else {
            left.named_children(&mut left.walk())
                .filter(|child| child.kind() == "identifier")
                .collect()
        };
        for name in names {
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Variable {
                        type_text: None,
                        mutable: true,
                    },
                    range_after(statement),
                )
                .named(self.text(name)),
            );
        }
    }

    fn declares(&self, node: Node) -> bool {
        node.children(&mut node.walk())
            .any(|child| !child.is_named() && child.kind() == ":=")
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
            "short_var_declaration" => {
                self.handled(node);
                if let Some(right) = node.child_by_field_name("right") {
                    self.expression(right, out);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    self.short_bindings(left, node, out);
                }
            }
            "var_declaration" => self.value_declaration(node, true, true, out),
            "const_declaration" => self.value_declaration(node, false, true, out),
            "type_declaration" => self.type_declaration(node, out),
            "go_statement" => {
                self.handled(node);
                let mut launched = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    self.expression(child, &mut launched);
                }
                out.push(SyntaxNode::new(SyntaxKind::Spawn, Range::from_node(&node)).with_children(launched));
            }
            "send_statement" => {
                self.handled(node);
                out.push(SyntaxNode::new(
                    SyntaxKind::Sync(SyncHint::Channel),
                    Range::from_node(&node),
                ));
                for child in node.named_children(&mut node.walk()) {
                    self.expression(child, out);
                }
            }
            "receive_statement" => {
                self.handled(node);
                out.push(SyntaxNode::new(
                    SyntaxKind::Sync(SyncHint::Channel),
                    Range::from_node(&node),
                ));
                if let Some(right) = node.child_by_field_name("right") {
                    self.expression(right, out);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    if self.declares(node) {
                        self.short_bindings(left, node, out);
                    } else {
                        self.expression(left, out);
                    }
                }
            }
            "if_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                if let Some(init) = node.child_by_field_name("initializer") {
                    self.statement(init, &mut children);
                }
                if let Some(condition) = node.child_by_field_name("condition") {
                    self.expression(condition, &mut children);
                }
                if let Some(consequence) = node.child_by_field_name("consequence") {
                    children.push(self.block(consequence, false));
                }
                if let Some(alternative) = node.child_by_field_name("alternative") {
                    if alternative.kind() == "block" {
                        children.push(self.block(alternative, false));
                    } else {
                        self.statement(alternative, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "for_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    match child.kind() {
                        "for_clause" => {
                            for part in child.named_children(&mut child.walk()) {
                                self.statement(part, &mut children);
                            }
                        }
                        "range_clause" => {
                            self.handled(child);
                            if let Some(right) = child.child_by_field_name("right") {
                                self.expression(right, &mut children);
                            }
                            if let Some(left) = child.child_by_field_name("left") {
                                if self.declares(child) {
                                    self.short_bindings(left, child, &mut children);
                                } else {
                                    self.expression(left, &mut children);
                                }
                            }
                        }
                        "block" => self.block_statements(child, &mut children),
                        _ => self.expression(child, &mut children),
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "expression_switch_statement" | "type_switch_statement" | "select_statement" => {
                self.handled(node);
                let alias = node.child_by_field_name("alias");
                let header = node.child_by_field_name("value").or(alias);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    match child.kind() {
                        "expression_case" | "default_case" | "type_case" | "communication_case" => {
                            children.push(self.case_clause(child));
                        }
                        _ if Some(child.id()) == alias.map(|alias| alias.id()) => {
                            if let Some(header) = header {
                                self.short_bindings(child, header, &mut children);
                            }
                        }
                        _ => self.statement(child, &mut children),
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "block" => out.push(self.block(node, false)),
            "labeled_statement" => {
                for child in node.named_children(&mut node.walk()) {
                    if child.kind() != "label_name" {
                        self.statement(child, out);
                    }
                }
            }
            "assignment_statement" | "expression_statement" | "return_statement"
            | "defer_statement" | "inc_statement" | "dec_statement" => {
                for child in node.named_children(&mut node.walk()) {
                    self.expression(child, out);
                }
            }
            _ => self.expression(node, out),
        }
    }

    fn case_clause(&mut self, case: Node) -> SyntaxNode {
        let mut children = Vec::new();
        for child in case.named_children(&mut case.walk()) {
            if child.kind() == "statement_list" {
                for statement in child.named_children(&mut child.walk()) {
                    self.statement(statement, &mut children);
                }
            } else {
                self.statement(child, &mut children);
            }
        }
        SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&case))
            .with_children(children)
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
                let name = self.text(node);
                if name != "_" {
                    out.push(SyntaxNode::new(SyntaxKind::Ident, Range::from_node(&node)).named(name));
                }
            }
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.expression(operand, out);
                }
            }
            "call_expression" => self.call(node, out),
            "func_literal" => out.push(self.func_literal(node)),
            "unary_expression" => {
                if node
                    .child_by_field_name("operator")
                    .is_some_and(|op| self.text(op) == "<-")
                {
                    out.push(SyntaxNode::new(
                        SyntaxKind::Sync(SyncHint::Channel),
                        Range::from_node(&node),
                    ));
                }
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.expression(operand, out);
                }
            }
            "composite_literal" => {
                if let Some(type_node) = node.child_by_field_name("type") {
                    self.type_refs(type_node, out);
                    if self.text(type_node).ends_with("WaitGroup") {
                        out.push(SyntaxNode::new(
                            SyntaxKind::Sync(SyncHint::CountingBarrier),
                            Range::from_node(&node),
                        ));
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.literal_value(body, out);
                }
            }
            "type_identifier" | "qualified_type" | "generic_type" | "pointer_type"
            | "slice_type" | "array_type" | "map_type" | "channel_type" | "function_type"
            | "struct_type" | "interface_type" => self.type_refs(node, out),
            "comment" => out.push(self.comment(node)),
            "field_identifier" | "package_identifier" | "label_name" | "int_literal"
            | "float_literal" | "imaginary_literal" | "rune_literal"
            | "interpreted_string_literal" | "raw_string_literal" | "nil" | "true" | "false"
            | "iota" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, out);
                }
            }
        }
    }

    /// Struct literal keys are field names, not uses
    fn literal_value(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        if !self.descend(body, out) {
            return;
        }
        for element in body.named_children(&mut body.walk()) {
            match element.kind() {
                "keyed_element" => {
                    let parts: Vec<Node> = element.named_children(&mut element.walk()).collect();
                    for (index, part) in parts.into_iter().enumerate() {
                        let is_field_key = index == 0 && {
                            let inner = if part.kind() == "literal_element" {
                                part.named_child(0)
                            } else {
                                Some(part)
                            };
                            inner.is_some_and(|inner| {
                                matches!(inner.kind(), "identifier" | "field_identifier")
                            })
                        };
                        if !is_field_key {
                            self.expression(part, out);
                        }
                    }
                }
                "literal_value" => self.literal_value(element, out),
                _ => self.expression(element, out),
            }
        }
        self.depth -= 1;
    }

    fn call(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let arguments = node.child_by_field_name("arguments");
        let callee = self.text(function);

        let mut children = Vec::new();
        self.expression(function, &mut children);

        if callee == "make"
            && arguments
                .and_then(|args| args.named_child(0))
                .is_some_and(|first| first.kind() == "channel_type")
        {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::Channel),
                Range::from_node(&node),
            ));
        }
        if function.kind() == "selector_expression"
            && function
                .child_by_field_name("field")
                .is_some_and(|field| self.text(field) == "Wait")
        {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::CountingBarrier),
                Range::from_node(&node),
            ));
        }

        if let Some(arguments) = arguments {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }

        let named_callee = matches!(function.kind(), "identifier" | "selector_expression")
            && !callee.contains(['(', '[', '\n']);
        if named_callee {
            out.push(
                SyntaxNode::new(SyntaxKind::Call, Range::from_node(&node))
                    .named(callee)
                    .with_children(children),
            );
        } else {
            out.extend(children);
        }
    }

    fn func_literal(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let signature = self.signature(
            node.child_by_field_name("parameters"),
            node.child_by_field_name("result"),
        );
        let mut children = Vec::new();
        self.parameters(node.child_by_field_name("parameters"), &mut children);
        self.parameters(node.child_by_field_name("result"), &mut children);
        if let Some(body) = node.child_by_field_name("body") {
            self.block_statements(body, &mut children);
        }
        SyntaxNode::new(SyntaxKind::Closure { signature }, Range::from_node(&node)).with_children(children)
    }
}
