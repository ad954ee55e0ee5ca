//! Java front-end implementation
//!
//! Uses tree-sitter-java crate's LANGUAGE constant (converted via .into()).

use crate::parsing::parser::{lower_with, nesting_limit_node, node_text, range_after};
use crate::parsing::{
    FrontEnd, HandledNode, Language, MAX_NESTING_DEPTH, NodeTracker, NodeTrackingState,
    ParseOutput, SyncHint, SyntaxKind, SyntaxNode,
};
use crate::symbol::{Param, Signature, Visibility};
use crate::types::Range;
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Java language front-end
pub struct JavaParser {
    parser: Parser,
    node_tracker: NodeTrackingState,
}

impl JavaParser {
    /// Create a new Java parser
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        let lang = tree_sitter_java::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| format!("Failed to set Java language: {e}"))?;

        Ok(Self {
            parser,
            node_tracker: NodeTrackingState::new(),
        })
    }
}

impl FrontEnd for JavaParser {
    fn parse(&mut self, text: &str) -> ParseOutput {
        let tracker = &mut self.node_tracker;
        lower_with(&mut self.parser, Language::Java, text, |root, code| {
            Lowerer {
                code,
                tracker,
                depth: 0,
            }
            .program(root)
        })
    }

    fn language(&self) -> Language {
        Language::Java
    }
}

impl NodeTracker for JavaParser {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        self.node_tracker.get_handled_nodes()
    }

    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.node_tracker.register_handled_node(node_kind, node_id);
    }
}

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Executor and future entry points that run their argument concurrently
const SPAWN_METHODS: &[&str] = &[
    "submit",
    "execute",
    "runAsync",
    "supplyAsync",
    "startVirtualThread",
];

/// Calls that block until a group of tasks is done
const BARRIER_METHODS: &[&str] = &[
    "join",
    "await",
    "awaitTermination",
    "invokeAll",
    "allOf",
    "arriveAndAwaitAdvance",
];

const BARRIER_TYPES: &[&str] = &["CountDownLatch", "CyclicBarrier", "Phaser"];

/// Bare type name: `java.util.List<String>` becomes `List`
fn bare_type_name(text: &str) -> &str {
    let text = text.split('<').next().unwrap_or(text).trim();
    text.rsplit('.').next().unwrap_or(text)
}

/// Modifier keywords of one declaration
#[derive(Debug, Clone, Copy, Default)]
struct Modifiers {
    public: bool,
    protected: bool,
    is_final: bool,
}

impl Modifiers {
    /// `public` and `protected` members are visible outside the package
    fn visibility(self) -> Visibility {
        if self.public || self.protected {
            Visibility::Exported
        } else {
            Visibility::Unexported
        }
    }
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

    fn program(&mut self, root: Node) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        for child in root.named_children(&mut root.walk()) {
            self.top_level(child, &mut out);
        }
        out
    }

    fn top_level(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "package_declaration" => {
                self.handled(node);
                let name = node
                    .named_children(&mut node.walk())
                    .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"))
                    .map(|child| self.text(child));
                let mut package = SyntaxNode::new(SyntaxKind::Package, Range::from_node(&node));
                package.name = name.map(str::to_string);
                out.push(package);
            }
            "import_declaration" => out.push(self.import_declaration(node)),
            kind if TYPE_DECLARATIONS.contains(&kind) => out.push(self.type_declaration(node)),
            "line_comment" | "block_comment" => out.push(self.comment(node)),
            "ERROR" => {
                // Keep whatever declarations survived error recovery
                for child in node.named_children(&mut node.walk()) {
                    let kind = child.kind();
                    if TYPE_DECLARATIONS.contains(&kind)
                        || matches!(kind, "package_declaration" | "import_declaration" | "ERROR")
                    {
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
        SyntaxNode::new(
            SyntaxKind::Comment {
                block: node.kind() == "block_comment",
            },
            Range::from_node(&node),
        )
        .with_text(self.text(node))
    }

    /// `import a.b.C;` binds `C`; `import a.b.*;` binds nothing nameable
    fn import_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let path = node
            .named_children(&mut node.walk())
            .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"))
            .map(|child| self.text(child))
            .unwrap_or_default();
        let wildcard = node
            .named_children(&mut node.walk())
            .any(|child| child.kind() == "asterisk");
        let alias = if wildcard {
            "*"
        } else {
            path.rsplit('.').next().unwrap_or(path)
        };
        SyntaxNode::new(
            SyntaxKind::Import {
                alias: alias.to_string(),
            },
            Range::from_node(&node),
        )
        .named(path)
    }

    fn modifiers(&self, node: Node) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let Some(list) = node
            .children(&mut node.walk())
            .find(|child| child.kind() == "modifiers")
        else {
            return modifiers;
        };
        for token in list.children(&mut list.walk()) {
            match token.kind() {
                "public" => modifiers.public = true,
                "protected" => modifiers.protected = true,
                "final" => modifiers.is_final = true,
                _ => {}
            }
        }
        modifiers
    }

    fn type_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let visibility = self.modifiers(node).visibility();
        let range = Range::from_node(&node);

        let lowered = match node.kind() {
            "interface_declaration" => {
                let mut embeds = Vec::new();
                if let Some(extends) = node
                    .named_children(&mut node.walk())
                    .find(|child| child.kind() == "extends_interfaces")
                {
                    self.type_list(extends, &mut embeds);
                }
                let mut specs = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    self.interface_members(body, &mut specs);
                }
                SyntaxNode::new(SyntaxKind::InterfaceDecl { embeds }, range).with_children(specs)
            }
            "annotation_type_declaration" => SyntaxNode::new(
                SyntaxKind::Unknown {
                    raw_kind: node.kind().to_string(),
                },
                range,
            ),
            _ => {
                let mut embeds = Vec::new();
                let mut children = Vec::new();
                if let Some(superclass) = node.child_by_field_name("superclass")
                    && let Some(base) = superclass.named_child(0)
                {
                    embeds.push(bare_type_name(self.text(base)).to_string());
                }
                if let Some(interfaces) = node.child_by_field_name("interfaces") {
                    self.type_refs(interfaces, &mut children);
                }
                if node.kind() == "record_declaration"
                    && let Some(components) = node.child_by_field_name("parameters")
                {
                    self.record_components(components, &mut children);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.class_body(body, name, &mut children);
                }
                SyntaxNode::new(SyntaxKind::TypeDecl { embeds }, range).with_children(children)
            }
        };

        lowered.named(name).with_visibility(visibility)
    }

    /// Bare names from an `extends`/`implements` list
    fn type_list(&self, node: Node, names: &mut Vec<String>) {
        let list = node
            .named_children(&mut node.walk())
            .find(|child| child.kind() == "type_list")
            .unwrap_or(node);
        for entry in list.named_children(&mut list.walk()) {
            names.push(bare_type_name(self.text(entry)).to_string());
        }
    }

    /// Abstract methods only; default and static bodies are not requirements
    fn interface_members(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        for member in body.named_children(&mut body.walk()) {
            if member.kind() != "method_declaration" || member.child_by_field_name("body").is_some() {
                continue;
            }
            self.handled(member);
            let signature = self.signature(
                member.child_by_field_name("parameters"),
                member.child_by_field_name("type"),
            );
            if let Some(name) = member.child_by_field_name("name") {
                out.push(
                    SyntaxNode::new(SyntaxKind::MethodSpec(signature), Range::from_node(&member))
                        .named(self.text(name))
                        .with_visibility(Visibility::Exported),
                );
            }
        }
    }

    /// Components are final fields with a same-named accessor
    fn record_components(&mut self, components: Node, out: &mut Vec<SyntaxNode>) {
        for component in components.named_children(&mut components.walk()) {
            if component.kind() != "formal_parameter" {
                continue;
            }
            let (Some(name), type_node) = (
                component.child_by_field_name("name"),
                component.child_by_field_name("type"),
            ) else {
                continue;
            };
            let name = self.text(name);
            let type_text = type_node.map(|t| self.text(t).to_string());
            let mut refs = Vec::new();
            if let Some(type_node) = type_node {
                self.type_refs(type_node, &mut refs);
            }
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Field {
                        type_text,
                        embedded: false,
                        mutable: false,
                    },
                    Range::from_node(&component),
                )
                .named(name)
                .with_visibility(Visibility::Unexported)
                .with_children(refs),
            );
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Function {
                        signature: Signature {
                            params: Vec::new(),
                            results: Some(1),
                            variadic: false,
                        },
                        is_async: false,
                    },
                    Range::from_node(&component),
                )
                .named(name)
                .with_visibility(Visibility::Exported),
            );
        }
    }

    fn class_body(&mut self, body: Node, owner: &str, out: &mut Vec<SyntaxNode>) {
        for member in body.named_children(&mut body.walk()) {
            match member.kind() {
                "field_declaration" => self.field_declaration(member, out),
                "method_declaration" | "constructor_declaration"
                | "compact_constructor_declaration" => out.push(self.method(member, owner)),
                "enum_body_declarations" => self.class_body(member, owner, out),
                "enum_constant" => {
                    self.handled(member);
                    let Some(name) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let mut children = Vec::new();
                    if let Some(arguments) = member.child_by_field_name("arguments") {
                        self.expression(arguments, &mut children);
                    }
                    out.push(
                        SyntaxNode::new(
                            SyntaxKind::Field {
                                type_text: Some(owner.to_string()),
                                embedded: false,
                                mutable: false,
                            },
                            Range::from_node(&member),
                        )
                        .named(self.text(name))
                        .with_visibility(Visibility::Exported)
                        .with_children(children),
                    );
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => out.push(self.type_declaration(member)),
                "block" => out.push(self.block(member, false)),
                "static_initializer" => {
                    for child in member.named_children(&mut member.walk()) {
                        self.statement(child, out);
                    }
                }
                "line_comment" | "block_comment" => out.push(self.comment(member)),
                _ => {}
            }
        }
    }

    fn field_declaration(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let modifiers = self.modifiers(node);
        let type_node = node.child_by_field_name("type");
        let type_text = type_node.map(|t| self.text(t).to_string());

        for declarator in node.children_by_field_name("declarator", &mut node.walk()) {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let mut children = Vec::new();
            if let Some(type_node) = type_node {
                self.type_refs(type_node, &mut children);
            }
            if let Some(value) = declarator.child_by_field_name("value") {
                self.expression(value, &mut children);
            }
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Field {
                        type_text: type_text.clone(),
                        embedded: false,
                        mutable: !modifiers.is_final,
                    },
                    Range::from_node(&declarator),
                )
                .named(self.text(name))
                .with_visibility(modifiers.visibility())
                .with_children(children),
            );
        }
    }

    /// Parameters and result arity of a method; `void` has no result
    fn signature(&self, params: Option<Node>, result: Option<Node>) -> Signature {
        let mut signature = Signature::default();
        if let Some(list) = params {
            for param in list.named_children(&mut list.walk()) {
                match param.kind() {
                    "formal_parameter" => signature.params.push(Param {
                        name: param.child_by_field_name("name").map(|n| self.text(n).to_string()),
                        type_text: param.child_by_field_name("type").map(|t| self.text(t).to_string()),
                    }),
                    "spread_parameter" => {
                        signature.variadic = true;
                        signature.params.push(Param {
                            name: self.spread_name(param).map(str::to_string),
                            type_text: param
                                .named_child(0)
                                .map(|t| format!("{}...", self.text(t))),
                        });
                    }
                    _ => {}
                }
            }
        }
        signature.results = Some(match result {
            Some(result) if result.kind() != "void_type" => 1,
            _ => 0,
        });
        signature
    }

    fn spread_name(&self, param: Node) -> Option<&'a str> {
        param
            .named_children(&mut param.walk())
            .find(|child| child.kind() == "variable_declarator")
            .and_then(|declarator| declarator.child_by_field_name("name"))
            .map(|name| self.text(name))
    }

    /// Param nodes plus type references
    fn parameters(&mut self, list: Option<Node>, out: &mut Vec<SyntaxNode>) {
        let Some(list) = list else { return };
        for param in list.named_children(&mut list.walk()) {
            let (name, type_node) = match param.kind() {
                "formal_parameter" => (
                    param.child_by_field_name("name").map(|n| self.text(n)),
                    param.child_by_field_name("type"),
                ),
                "spread_parameter" => (self.spread_name(param), param.named_child(0)),
                _ => continue,
            };
            if let Some(name) = name {
                out.push(
                    SyntaxNode::new(
                        SyntaxKind::Param {
                            type_text: type_node.map(|t| self.text(t).to_string()),
                        },
                        Range::from_node(&param),
                    )
                    .named(name),
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
            "type_identifier" | "scoped_type_identifier" => out.push(
                SyntaxNode::new(SyntaxKind::TypeRef, Range::from_node(&node)).named(self.text(node)),
            ),
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.type_refs(child, out);
                }
            }
        }
    }

    /// Methods and constructors; the normalizer binds them to the enclosing type
    fn method(&mut self, node: Node, owner: &str) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or(owner);
        let result = node.child_by_field_name("type");
        let mut signature = self.signature(node.child_by_field_name("parameters"), result);
        if node.kind() != "method_declaration" {
            signature.results = Some(0);
        }

        let mut children = Vec::new();
        self.parameters(node.child_by_field_name("parameters"), &mut children);
        if let Some(result) = result {
            self.type_refs(result, &mut children);
        }
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
        .with_visibility(self.modifiers(node).visibility())
        .with_children(children)
    }

    /// Method bodies are unwrapped into the callable
    fn block_statements(&mut self, block: Node, out: &mut Vec<SyntaxNode>) {
        for child in block.named_children(&mut block.walk()) {
            self.statement(child, out);
        }
    }

    fn block(&mut self, node: Node, looping: bool) -> SyntaxNode {
        let mut children = Vec::new();
        self.block_statements(node, &mut children);
        SyntaxNode::new(SyntaxKind::Block { looping }, Range::from_node(&node)).with_children(children)
    }

    /// Local variable; visible after its declarator, so `int x = x;` reads the outer `x`
    fn local_variable(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let mutable = !self.modifiers(node).is_final;
        let type_node = node.child_by_field_name("type");
        let type_text = type_node.map(|t| self.text(t).to_string());
        if let Some(type_node) = type_node {
            self.type_refs(type_node, out);
        }
        for declarator in node.children_by_field_name("declarator", &mut node.walk()) {
            if let Some(value) = declarator.child_by_field_name("value") {
                self.expression(value, out);
            }
            if let Some(name) = declarator.child_by_field_name("name") {
                out.push(self.binding(name, type_text.clone(), mutable, range_after(declarator)));
            }
        }
    }

    fn binding(&self, name: Node, type_text: Option<String>, mutable: bool, range: Range) -> SyntaxNode {
        SyntaxNode::new(SyntaxKind::Variable { type_text, mutable }, range)
            .named(self.text(name))
            .with_visibility(Visibility::Unexported)
    }

    fn statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        if self.descend(node, out) {
            self.lower_statement(node, out);
            self.depth -= 1;
        }
    }

    fn lower_statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "line_comment" | "block_comment" => out.push(self.comment(node)),
            "local_variable_declaration" => self.local_variable(node, out),
            kind if TYPE_DECLARATIONS.contains(&kind) => out.push(self.type_declaration(node)),
            "block" => out.push(self.block(node, false)),
            "while_statement" | "do_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, &mut children);
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "for_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    if child.kind() == "block" {
                        self.block_statements(child, &mut children);
                    } else {
                        self.statement(child, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "enhanced_for_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                let value = node.child_by_field_name("value");
                if let Some(value) = value {
                    self.expression(value, &mut children);
                }
                let type_node = node.child_by_field_name("type");
                if let Some(type_node) = type_node {
                    self.type_refs(type_node, &mut children);
                }
                if let Some(name) = node.child_by_field_name("name") {
                    let range = value.map_or_else(|| Range::from_node(&name), range_after);
                    children.push(self.binding(
                        name,
                        type_node.map(|t| self.text(t).to_string()),
                        !self.modifiers(node).is_final,
                        range,
                    ));
                }
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "block" {
                        self.block_statements(body, &mut children);
                    } else {
                        self.statement(body, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "catch_clause" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    match child.kind() {
                        "catch_formal_parameter" => {
                            if let Some(types) = child
                                .named_children(&mut child.walk())
                                .find(|part| part.kind() == "catch_type")
                            {
                                self.type_refs(types, &mut children);
                            }
                            if let Some(name) = child.child_by_field_name("name") {
                                children.push(self.binding(name, None, true, Range::from_node(&name)));
                            }
                        }
                        "block" => self.block_statements(child, &mut children),
                        _ => {}
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "try_with_resources_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    if child.kind() == "resource_specification" {
                        for resource in child.named_children(&mut child.walk()) {
                            self.resource(resource, &mut children);
                        }
                    } else {
                        self.statement(child, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "labeled_statement" => {
                for child in node.named_children(&mut node.walk()) {
                    if child.kind() != "identifier" {
                        self.statement(child, out);
                    }
                }
            }
            "explicit_constructor_invocation" => {
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    self.expression(arguments, out);
                }
            }
            "break_statement" | "continue_statement" => {}
            kind if kind.ends_with("_statement")
                || matches!(kind, "switch_block" | "switch_block_statement_group" | "switch_rule" | "finally_clause") =>
            {
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, out);
                }
            }
            _ => self.expression(node, out),
        }
    }

    /// `try (var in = open())` binds `in` for the body
    fn resource(&mut self, resource: Node, out: &mut Vec<SyntaxNode>) {
        let Some(name) = resource.child_by_field_name("name") else {
            for child in resource.named_children(&mut resource.walk()) {
                self.expression(child, out);
            }
            return;
        };
        let type_node = resource.child_by_field_name("type");
        if let Some(type_node) = type_node {
            self.type_refs(type_node, out);
        }
        if let Some(value) = resource.child_by_field_name("value") {
            self.expression(value, out);
        }
        out.push(self.binding(
            name,
            type_node.map(|t| self.text(t).to_string()),
            false,
            range_after(resource),
        ));
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
                out.push(SyntaxNode::new(SyntaxKind::Ident, Range::from_node(&node)).named(self.text(node)));
            }
            "field_access" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.expression(object, out);
                }
            }
            "method_invocation" => self.method_invocation(node, out),
            "object_creation_expression" => self.object_creation(node, out),
            "lambda_expression" => out.push(self.lambda(node)),
            "method_reference" => {
                if let Some(target) = node.named_child(0) {
                    self.expression(target, out);
                }
            }
            "line_comment" | "block_comment" => out.push(self.comment(node)),
            "type_identifier" | "scoped_type_identifier" | "generic_type" | "array_type"
            | "integral_type" | "floating_point_type" | "boolean_type" | "void_type"
            | "type_arguments" => self.type_refs(node, out),
            "this" | "super" | "string_literal" | "character_literal" | "text_block"
            | "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" | "decimal_floating_point_literal"
            | "hex_floating_point_literal" | "true" | "false" | "null_literal" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, out);
                }
            }
        }
    }

    fn method_invocation(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);
        let object = node.child_by_field_name("object");

        let mut children = Vec::new();
        if let Some(object) = object {
            self.expression(object, &mut children);
        }
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }

        let callee = match object {
            None => Some(name.to_string()),
            Some(object) if object.kind() == "this" => Some(name.to_string()),
            Some(object)
                if matches!(object.kind(), "identifier" | "field_access" | "super")
                    && !self.text(object).contains(['(', '[', '\n']) =>
            {
                Some(format!("{}.{name}", self.text(object)))
            }
            Some(_) => None,
        };

        if BARRIER_METHODS.contains(&name) && !callee.as_deref().is_some_and(|c| c.starts_with("String.")) {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::CountingBarrier),
                Range::from_node(&node),
            ));
        }

        let call = match callee {
            Some(callee) => vec![
                SyntaxNode::new(SyntaxKind::Call, Range::from_node(&node))
                    .named(callee)
                    .with_children(children),
            ],
            None => children,
        };

        if object.is_some() && SPAWN_METHODS.contains(&name) {
            out.push(SyntaxNode::new(SyntaxKind::Spawn, Range::from_node(&node)).with_children(call));
        } else {
            out.extend(call);
        }
    }

    /// `new T(..)`; threads spawn, latches and queues synchronize
    fn object_creation(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let type_name = bare_type_name(self.text(type_node));

        let mut children = Vec::new();
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }
        if let Some(body) = node
            .named_children(&mut node.walk())
            .find(|child| child.kind() == "class_body")
        {
            self.anonymous_body(body, &mut children);
        }
        if BARRIER_TYPES.contains(&type_name) {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::CountingBarrier),
                Range::from_node(&node),
            ));
        } else if type_name.ends_with("Queue") {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::Channel),
                Range::from_node(&node),
            ));
        }

        let call = SyntaxNode::new(SyntaxKind::Call, Range::from_node(&node))
            .named(self.text(type_node).split('<').next().unwrap_or(type_name).trim())
            .with_children(children);
        if type_name == "Thread" {
            out.push(SyntaxNode::new(SyntaxKind::Spawn, Range::from_node(&node)).with_children(vec![call]));
        } else {
            out.push(call);
        }
    }

    /// Methods of an anonymous class are closures over the creating scope
    fn anonymous_body(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        for member in body.named_children(&mut body.walk()) {
            match member.kind() {
                "method_declaration" => {
                    self.handled(member);
                    let signature = self.signature(
                        member.child_by_field_name("parameters"),
                        member.child_by_field_name("type"),
                    );
                    let mut children = Vec::new();
                    self.parameters(member.child_by_field_name("parameters"), &mut children);
                    if let Some(body) = member.child_by_field_name("body") {
                        self.block_statements(body, &mut children);
                    }
                    out.push(
                        SyntaxNode::new(SyntaxKind::Closure { signature }, Range::from_node(&member))
                            .with_children(children),
                    );
                }
                "field_declaration" => {
                    for declarator in member.children_by_field_name("declarator", &mut member.walk()) {
                        if let Some(value) = declarator.child_by_field_name("value") {
                            self.expression(value, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn lambda(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let mut signature = Signature::default();
        let mut children = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            match params.kind() {
                "identifier" => {
                    signature.params.push(Param {
                        name: Some(self.text(params).to_string()),
                        type_text: None,
                    });
                    children.push(
                        SyntaxNode::new(SyntaxKind::Param { type_text: None }, Range::from_node(&params))
                            .named(self.text(params)),
                    );
                }
                "formal_parameters" => {
                    signature = self.signature(Some(params), None);
                    self.parameters(Some(params), &mut children);
                }
                _ => {
                    for name in params.named_children(&mut params.walk()) {
                        if name.kind() != "identifier" {
                            continue;
                        }
                        signature.params.push(Param {
                            name: Some(self.text(name).to_string()),
                            type_text: None,
                        });
                        children.push(
                            SyntaxNode::new(SyntaxKind::Param { type_text: None }, Range::from_node(&name))
                                .named(self.text(name)),
                        );
                    }
                }
            }
        }
        signature.results = None;

        if let Some(body) = node.child_by_field_name("body") {
            if body.kind() == "block" {
                self.block_statements(body, &mut children);
            } else {
                self.expression(body, &mut children);
            }
        }
        SyntaxNode::new(SyntaxKind::Closure { signature }, Range::from_node(&node)).with_children(children)
    }
}
