//! TypeScript/JavaScript front-end implementation
//!
//! TypeScript uses tree-sitter-typescript's TSX grammar so `.tsx` and `.ts`
//! share one parser; JavaScript uses tree-sitter-javascript.

use crate::parsing::parser::{lower_with, nesting_limit_node, node_text, range_after};
use crate::parsing::{
    FrontEnd, HandledNode, Language, MAX_NESTING_DEPTH, NodeTracker, NodeTrackingState,
    ParseOutput, SyncHint, SyntaxKind, SyntaxNode,
};
use crate::symbol::{Param, Signature, Visibility};
use crate::types::Range;
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// TypeScript/JavaScript front-end
pub struct TypeScriptParser {
    parser: Parser,
    language: Language,
    node_tracker: NodeTrackingState,
}

impl TypeScriptParser {
    /// Create a new TypeScript parser
    pub fn new() -> Result<Self, String> {
        Self::with_grammar(Language::TypeScript, tree_sitter_typescript::LANGUAGE_TSX.into())
    }

    /// Create a new JavaScript parser
    pub fn javascript() -> Result<Self, String> {
        Self::with_grammar(Language::JavaScript, tree_sitter_javascript::LANGUAGE.into())
    }

    fn with_grammar(language: Language, grammar: tree_sitter::Language) -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| format!("Failed to set {language} language: {e}"))?;

        Ok(Self {
            parser,
            language,
            node_tracker: NodeTrackingState::new(),
        })
    }
}

impl FrontEnd for TypeScriptParser {
    fn parse(&mut self, text: &str) -> ParseOutput {
        let tracker = &mut self.node_tracker;
        lower_with(&mut self.parser, self.language, text, |root, code| {
            Lowerer {
                code,
                tracker,
                depth: 0,
                bodies: 0,
            }
            .program(root)
        })
    }

    fn language(&self) -> Language {
        self.language
    }
}

impl NodeTracker for TypeScriptParser {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        self.node_tracker.get_handled_nodes()
    }

    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.node_tracker.register_handled_node(node_kind, node_id);
    }
}

/// Host functions that run their callback later, outside the current turn
const SPAWN_CALLS: &[&str] = &["setTimeout", "setImmediate", "queueMicrotask"];

/// Bare type name: `ns.Base<T>` becomes `Base`
fn bare_type_name(text: &str) -> &str {
    let text = text.split('<').next().unwrap_or(text).trim();
    text.rsplit('.').next().unwrap_or(text)
}

fn is_function_value(node: Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

fn is_async(node: Node) -> bool {
    node.children(&mut node.walk())
        .any(|child| child.kind() == "async")
}

/// The type inside a `: T` annotation
fn annotated(node: Node) -> Option<Node> {
    if node.kind() == "type_annotation" {
        node.named_child(0)
    } else {
        Some(node)
    }
}

/// One lowering pass over a single source file
struct Lowerer<'a> {
    code: &'a str,
    tracker: &'a mut NodeTrackingState,
    /// Nested statement/expression calls currently on the stack
    depth: usize,
    /// Callable bodies currently being lowered; zero at module level
    bodies: usize,
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

    /// Modules declare no package name; an unnamed marker stands in
    fn program(&mut self, root: Node) -> Vec<SyntaxNode> {
        let mut out = vec![SyntaxNode::new(SyntaxKind::Package, Range::new(0, 0, 0, 0))];
        for child in root.named_children(&mut root.walk()) {
            self.statement(child, &mut out);
        }
        out
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

    /// One Import per bound local name; side-effect imports bind nothing
    fn import_statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let source = node
            .child_by_field_name("source")
            .map(|source| self.text(source).trim_matches(|c| c == '"' || c == '\'' || c == '`'))
            .unwrap_or_default();
        let Some(clause) = node
            .named_children(&mut node.walk())
            .find(|child| child.kind() == "import_clause")
        else {
            return;
        };

        let mut aliases = Vec::new();
        for part in clause.named_children(&mut clause.walk()) {
            match part.kind() {
                "identifier" => aliases.push(part),
                "namespace_import" => aliases.extend(
                    part.named_children(&mut part.walk())
                        .filter(|child| child.kind() == "identifier"),
                ),
                "named_imports" => {
                    for specifier in part.named_children(&mut part.walk()) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        if let Some(local) = specifier
                            .child_by_field_name("alias")
                            .or_else(|| specifier.child_by_field_name("name"))
                        {
                            aliases.push(local);
                        }
                    }
                }
                _ => {}
            }
        }

        for alias in aliases {
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Import {
                        alias: self.text(alias).to_string(),
                    },
                    Range::from_node(&node),
                )
                .named(source),
            );
        }
    }

    /// `export` marks whatever the wrapped statement declares
    fn export_statement(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let mut lowered = Vec::new();
        if let Some(declaration) = node.child_by_field_name("declaration") {
            self.statement(declaration, &mut lowered);
        } else if let Some(value) = node.child_by_field_name("value") {
            self.expression(value, &mut lowered);
        }
        for declared in &mut lowered {
            if declared.kind.is_declaration() {
                declared.visibility = Visibility::Exported;
            }
        }
        out.extend(lowered);
    }

    /// Parameters and result arity; unannotated results are unknown
    fn signature(&self, params: Option<Node>, return_type: Option<Node>) -> Signature {
        let mut signature = Signature::default();
        if let Some(list) = params {
            for param in list.named_children(&mut list.walk()) {
                let (pattern, type_node) = match param.kind() {
                    "required_parameter" | "optional_parameter" => (
                        param.child_by_field_name("pattern"),
                        param.child_by_field_name("type"),
                    ),
                    "comment" => continue,
                    _ => (Some(param), None),
                };
                let Some(pattern) = pattern else { continue };
                match pattern.kind() {
                    "this" => continue,
                    "rest_pattern" => {
                        signature.variadic = true;
                        continue;
                    }
                    _ => {}
                }
                let name = match pattern.kind() {
                    "identifier" => Some(self.text(pattern).to_string()),
                    "assignment_pattern" => pattern
                        .child_by_field_name("left")
                        .filter(|left| left.kind() == "identifier")
                        .map(|left| self.text(left).to_string()),
                    _ => None,
                };
                signature.params.push(Param {
                    name,
                    type_text: type_node
                        .and_then(annotated)
                        .map(|t| self.text(t).to_string()),
                });
            }
        }
        signature.results = return_type
            .and_then(annotated)
            .map(|t| usize::from(self.text(t) != "void"));
        signature
    }

    /// Identifiers a binding pattern introduces, plus its default-value expressions
    fn pattern_names<'t>(&self, pattern: Node<'t>, names: &mut Vec<Node<'t>>, defaults: &mut Vec<Node<'t>>) {
        match pattern.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => names.push(pattern),
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                for child in pattern.named_children(&mut pattern.walk()) {
                    self.pattern_names(child, names, defaults);
                }
            }
            "pair_pattern" => {
                if let Some(value) = pattern.child_by_field_name("value") {
                    self.pattern_names(value, names, defaults);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = pattern.child_by_field_name("left") {
                    self.pattern_names(left, names, defaults);
                }
                if let Some(right) = pattern.child_by_field_name("right") {
                    defaults.push(right);
                }
            }
            _ => {}
        }
    }

    /// Param nodes plus type references and default values
    fn parameters(&mut self, list: Option<Node>, out: &mut Vec<SyntaxNode>) {
        let Some(list) = list else { return };
        for param in list.named_children(&mut list.walk()) {
            let (pattern, type_node, value) = match param.kind() {
                "required_parameter" | "optional_parameter" => (
                    param.child_by_field_name("pattern"),
                    param.child_by_field_name("type"),
                    param.child_by_field_name("value"),
                ),
                "comment" => continue,
                _ => (Some(param), None, None),
            };
            let type_text = type_node.and_then(annotated).map(|t| self.text(t).to_string());

            let mut names = Vec::new();
            let mut defaults = Vec::new();
            if let Some(pattern) = pattern {
                self.pattern_names(pattern, &mut names, &mut defaults);
            }
            defaults.extend(value);
            for default in defaults {
                self.expression(default, out);
            }
            for name in names {
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
            "type_identifier" | "nested_type_identifier" => out.push(
                SyntaxNode::new(SyntaxKind::TypeRef, Range::from_node(&node)).named(self.text(node)),
            ),
            "predefined_type" | "literal_type" | "property_identifier" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.type_refs(child, out);
                }
            }
        }
    }

    /// Signature and lowered children of anything with parameters and a body
    fn callable(&mut self, node: Node) -> (Signature, Vec<SyntaxNode>) {
        self.handled(node);
        let params = node.child_by_field_name("parameters");
        let return_type = node.child_by_field_name("return_type");
        let mut signature = self.signature(params, return_type);

        let mut children = Vec::new();
        // `x => ...` has a bare parameter
        if let Some(single) = node.child_by_field_name("parameter") {
            signature.params.push(Param {
                name: Some(self.text(single).to_string()),
                type_text: None,
            });
            children.push(
                SyntaxNode::new(SyntaxKind::Param { type_text: None }, Range::from_node(&single))
                    .named(self.text(single)),
            );
        }
        self.parameters(params, &mut children);
        if let Some(return_type) = return_type {
            self.type_refs(return_type, &mut children);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.bodies += 1;
            if body.kind() == "statement_block" {
                self.block_statements(body, &mut children);
            } else {
                self.expression(body, &mut children);
            }
            self.bodies -= 1;
        }
        (signature, children)
    }

    fn function(&mut self, node: Node, name: &str, range: Range) -> SyntaxNode {
        let (signature, children) = self.callable(node);
        SyntaxNode::new(
            SyntaxKind::Function {
                signature,
                is_async: is_async(node),
            },
            range,
        )
        .named(name)
        .with_children(children)
    }

    fn closure(&mut self, node: Node) -> SyntaxNode {
        let (signature, children) = self.callable(node);
        SyntaxNode::new(SyntaxKind::Closure { signature }, Range::from_node(&node)).with_children(children)
    }

    /// Private and protected members stay inside the class
    fn member_visibility(&self, member: Node, name: Node) -> Visibility {
        let hidden = name.kind() == "private_property_identifier"
            || member.children(&mut member.walk()).any(|child| {
                child.kind() == "accessibility_modifier"
                    && matches!(self.text(child), "private" | "protected")
            });
        if hidden {
            Visibility::Unexported
        } else {
            Visibility::Exported
        }
    }

    fn class_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or("default");

        let mut embeds = Vec::new();
        let mut children = Vec::new();
        if let Some(heritage) = node
            .named_children(&mut node.walk())
            .find(|child| child.kind() == "class_heritage")
        {
            for clause in heritage.named_children(&mut heritage.walk()) {
                match clause.kind() {
                    "extends_clause" => {
                        for value in clause.children_by_field_name("value", &mut clause.walk()) {
                            embeds.push(bare_type_name(self.text(value)).to_string());
                        }
                    }
                    "implements_clause" => self.type_refs(clause, &mut children),
                    // JavaScript: `class A extends B` has the expression directly
                    _ => embeds.push(bare_type_name(self.text(clause)).to_string()),
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.class_body(body, &mut children);
        }

        SyntaxNode::new(SyntaxKind::TypeDecl { embeds }, Range::from_node(&node))
            .named(name)
            .with_children(children)
    }

    fn class_body(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        for member in body.named_children(&mut body.walk()) {
            match member.kind() {
                "method_definition" => {
                    let Some(name) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let method = self
                        .function(member, self.text(name), Range::from_node(&member))
                        .with_visibility(self.member_visibility(member, name));
                    if self.text(name) == "constructor" {
                        self.parameter_properties(member, out);
                    }
                    out.push(method);
                }
                "public_field_definition" | "field_definition" => {
                    self.handled(member);
                    let Some(name) = member
                        .child_by_field_name("name")
                        .or_else(|| member.child_by_field_name("property"))
                    else {
                        continue;
                    };
                    let type_node = member.child_by_field_name("type");
                    let mut children = Vec::new();
                    if let Some(type_node) = type_node {
                        self.type_refs(type_node, &mut children);
                    }
                    if let Some(value) = member.child_by_field_name("value") {
                        self.expression(value, &mut children);
                    }
                    let readonly = member
                        .children(&mut member.walk())
                        .any(|child| child.kind() == "readonly");
                    out.push(
                        SyntaxNode::new(
                            SyntaxKind::Field {
                                type_text: type_node.and_then(annotated).map(|t| self.text(t).to_string()),
                                embedded: false,
                                mutable: !readonly,
                            },
                            Range::from_node(&member),
                        )
                        .named(self.text(name))
                        .with_visibility(self.member_visibility(member, name))
                        .with_children(children),
                    );
                }
                "class_static_block" => {
                    if let Some(block) = member.child_by_field_name("body") {
                        out.push(self.block(block, false));
                    }
                }
                "comment" => out.push(self.comment(member)),
                _ => {}
            }
        }
    }

    /// `constructor(private readonly repo: Repo)` declares the field `repo`
    fn parameter_properties(&mut self, constructor: Node, out: &mut Vec<SyntaxNode>) {
        let Some(params) = constructor.child_by_field_name("parameters") else {
            return;
        };
        for param in params.named_children(&mut params.walk()) {
            let modifiers: Vec<Node> = param
                .children(&mut param.walk())
                .filter(|child| matches!(child.kind(), "accessibility_modifier" | "readonly"))
                .collect();
            if modifiers.is_empty() {
                continue;
            }
            let Some(pattern) = param
                .child_by_field_name("pattern")
                .filter(|pattern| pattern.kind() == "identifier")
            else {
                continue;
            };
            let readonly = modifiers.iter().any(|m| m.kind() == "readonly");
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Field {
                        type_text: param
                            .child_by_field_name("type")
                            .and_then(annotated)
                            .map(|t| self.text(t).to_string()),
                        embedded: false,
                        mutable: !readonly,
                    },
                    Range::from_node(&param),
                )
                .named(self.text(pattern))
                .with_visibility(self.member_visibility(param, pattern)),
            );
        }
    }

    fn interface_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();

        let mut embeds = Vec::new();
        if let Some(extends) = node
            .named_children(&mut node.walk())
            .find(|child| child.kind() == "extends_type_clause")
        {
            for base in extends.named_children(&mut extends.walk()) {
                embeds.push(bare_type_name(self.text(base)).to_string());
            }
        }

        let mut specs = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in body.named_children(&mut body.walk()) {
                let Some(member_name) = member.child_by_field_name("name") else {
                    continue;
                };
                let signature = match member.kind() {
                    "method_signature" => self.signature(
                        member.child_by_field_name("parameters"),
                        member.child_by_field_name("return_type"),
                    ),
                    // `run: () => void` is a method requirement too
                    "property_signature" => {
                        let Some(function) = member
                            .child_by_field_name("type")
                            .and_then(annotated)
                            .filter(|t| t.kind() == "function_type")
                        else {
                            continue;
                        };
                        self.signature(
                            function.child_by_field_name("parameters"),
                            function.child_by_field_name("return_type"),
                        )
                    }
                    _ => continue,
                };
                self.handled(member);
                specs.push(
                    SyntaxNode::new(SyntaxKind::MethodSpec(signature), Range::from_node(&member))
                        .named(self.text(member_name))
                        .with_visibility(Visibility::Exported),
                );
            }
        }

        SyntaxNode::new(SyntaxKind::InterfaceDecl { embeds }, Range::from_node(&node))
            .named(name)
            .with_children(specs)
    }

    fn type_alias(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let mut refs = Vec::new();
        if let Some(value) = node.child_by_field_name("value") {
            self.type_refs(value, &mut refs);
        }
        SyntaxNode::new(SyntaxKind::TypeDecl { embeds: Vec::new() }, Range::from_node(&node))
            .named(
                node.child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or_default(),
            )
            .with_children(refs)
    }

    /// Members are constant fields of the enum type
    fn enum_declaration(&mut self, node: Node) -> SyntaxNode {
        self.handled(node);
        let mut fields = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in body.named_children(&mut body.walk()) {
                let (name, value) = match member.kind() {
                    "property_identifier" => (member, None),
                    "enum_assignment" => match member.child_by_field_name("name") {
                        Some(name) => (name, member.child_by_field_name("value")),
                        None => continue,
                    },
                    _ => continue,
                };
                let mut children = Vec::new();
                if let Some(value) = value {
                    self.expression(value, &mut children);
                }
                fields.push(
                    SyntaxNode::new(
                        SyntaxKind::Field {
                            type_text: None,
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
        }
        SyntaxNode::new(SyntaxKind::TypeDecl { embeds: Vec::new() }, Range::from_node(&node))
            .named(
                node.child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or_default(),
            )
            .with_children(fields)
    }

    /// `let`/`const`/`var`; a `const` bound to a function literal is a function.
    ///
    /// Locals are in scope only after their declarator, so the initializer reads outer names.
    fn variable_declaration(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let mutable = node.child(0).is_none_or(|keyword| keyword.kind() != "const");
        let local = self.bodies > 0;

        for declarator in node.named_children(&mut node.walk()) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(pattern) = declarator.child_by_field_name("name") else {
                continue;
            };
            let value = declarator.child_by_field_name("value");

            if !mutable
                && pattern.kind() == "identifier"
                && let Some(value) = value.filter(|value| is_function_value(*value))
            {
                out.push(self.function(value, self.text(pattern), Range::from_node(&node)));
                continue;
            }

            let type_node = declarator.child_by_field_name("type");
            let type_text = type_node.and_then(annotated).map(|t| self.text(t).to_string());
            let mut extras = Vec::new();
            if let Some(type_node) = type_node {
                self.type_refs(type_node, &mut extras);
            }

            let mut names = Vec::new();
            let mut defaults = Vec::new();
            self.pattern_names(pattern, &mut names, &mut defaults);
            if local {
                if let Some(value) = value {
                    self.expression(value, out);
                }
                for default in defaults.drain(..) {
                    self.expression(default, out);
                }
            }

            for name in names {
                let range = if local {
                    range_after(declarator)
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
                    .named(self.text(name))
                    .with_children(std::mem::take(&mut extras)),
                );
            }

            if !local {
                if let Some(value) = value {
                    self.expression(value, out);
                }
                for default in defaults {
                    self.expression(default, out);
                }
            }
        }
    }

    /// Bindings of a `for (const x of xs)` or `catch (e)` head, visible from `after`
    fn bindings(&mut self, pattern: Node, mutable: bool, after: Range, out: &mut Vec<SyntaxNode>) {
        let mut names = Vec::new();
        let mut defaults = Vec::new();
        self.pattern_names(pattern, &mut names, &mut defaults);
        for default in defaults {
            self.expression(default, out);
        }
        for name in names {
            out.push(
                SyntaxNode::new(
                    SyntaxKind::Variable {
                        type_text: None,
                        mutable,
                    },
                    after,
                )
                .named(self.text(name)),
            );
        }
    }

    /// Function bodies are unwrapped into the callable
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

    /// Loop bodies share the loop's scope
    fn loop_body(&mut self, body: Node, out: &mut Vec<SyntaxNode>) {
        if body.kind() == "statement_block" {
            self.block_statements(body, out);
        } else {
            self.statement(body, out);
        }
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
            "import_statement" => self.import_statement(node, out),
            "export_statement" => self.export_statement(node, out),
            "function_declaration" | "generator_function_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or("default");
                out.push(self.function(node, name, Range::from_node(&node)));
            }
            "class_declaration" | "abstract_class_declaration" => out.push(self.class_declaration(node)),
            "interface_declaration" => out.push(self.interface_declaration(node)),
            "type_alias_declaration" => out.push(self.type_alias(node)),
            "enum_declaration" => out.push(self.enum_declaration(node)),
            "lexical_declaration" | "variable_declaration" => self.variable_declaration(node, out),
            "statement_block" => out.push(self.block(node, false)),
            "for_statement" | "while_statement" | "do_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    if Some(child.id()) == node.child_by_field_name("body").map(|body| body.id()) {
                        self.loop_body(child, &mut children);
                    } else {
                        self.statement(child, &mut children);
                    }
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "for_in_statement" => {
                self.handled(node);
                let mut children = Vec::new();
                let right = node.child_by_field_name("right");
                if let Some(right) = right {
                    self.expression(right, &mut children);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    let keyword = node
                        .children(&mut node.walk())
                        .find(|child| matches!(child.kind(), "let" | "const" | "var"))
                        .map(|keyword| keyword.kind());
                    match keyword {
                        Some(keyword) => {
                            let after = right.map_or_else(|| range_after(left), range_after);
                            self.bindings(left, keyword != "const", after, &mut children);
                        }
                        None => self.expression(left, &mut children),
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.loop_body(body, &mut children);
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: true }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "catch_clause" => {
                self.handled(node);
                let mut children = Vec::new();
                if let Some(parameter) = node.child_by_field_name("parameter") {
                    self.bindings(parameter, true, Range::from_node(&parameter), &mut children);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.block_statements(body, &mut children);
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "switch_case" | "switch_default" => {
                let mut children = Vec::new();
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, &mut children);
                }
                out.push(
                    SyntaxNode::new(SyntaxKind::Block { looping: false }, Range::from_node(&node))
                        .with_children(children),
                );
            }
            "break_statement" | "continue_statement" | "empty_statement" | "debugger_statement"
            | "function_signature" | "ambient_declaration" => {}
            kind if kind.ends_with("_statement")
                || matches!(kind, "else_clause" | "finally_clause" | "switch_body" | "ERROR") =>
            {
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, out);
                }
            }
            _ => self.expression(node, out),
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
            "identifier" | "shorthand_property_identifier" => {
                out.push(SyntaxNode::new(SyntaxKind::Ident, Range::from_node(&node)).named(self.text(node)));
            }
            "member_expression" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.expression(object, out);
                }
            }
            "call_expression" => self.call(node, out),
            "new_expression" => self.new_expression(node, out),
            kind if matches!(kind, "arrow_function" | "function_expression" | "function" | "generator_function") => {
                out.push(self.closure(node));
            }
            "class" => out.push(self.class_declaration(node)),
            "comment" => out.push(self.comment(node)),
            "type_annotation" | "type_arguments" | "type_identifier" | "nested_type_identifier"
            | "generic_type" => self.type_refs(node, out),
            "this" | "super" | "string" | "number" | "regex" | "true" | "false" | "null"
            | "undefined" | "property_identifier" | "private_property_identifier"
            | "statement_identifier" | "predefined_type" => {}
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    self.statement(child, out);
                }
            }
        }
    }

    fn call(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let callee = self.text(function);
        let method = callee.rsplit('.').next().unwrap_or(callee);

        let mut children = Vec::new();
        self.expression(function, &mut children);
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }

        if matches!(callee, "Promise.all" | "Promise.allSettled") {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::CountingBarrier),
                Range::from_node(&node),
            ));
        }
        if method == "postMessage" {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::Channel),
                Range::from_node(&node),
            ));
        }

        let named_callee = matches!(function.kind(), "identifier" | "member_expression")
            && !callee.contains(['(', '[', '\n', '?']);
        if !named_callee {
            out.extend(children);
            return;
        }

        let call = SyntaxNode::new(SyntaxKind::Call, Range::from_node(&node))
            .named(callee)
            .with_children(children);
        if SPAWN_CALLS.contains(&method) {
            out.push(SyntaxNode::new(SyntaxKind::Spawn, Range::from_node(&node)).with_children(vec![call]));
        } else {
            out.push(call);
        }
    }

    /// `new Worker(..)` launches work; `new MessageChannel()` is a channel
    fn new_expression(&mut self, node: Node, out: &mut Vec<SyntaxNode>) {
        self.handled(node);
        let Some(constructor) = node.child_by_field_name("constructor") else {
            return;
        };
        let mut children = Vec::new();
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in arguments.named_children(&mut arguments.walk()) {
                self.expression(argument, &mut children);
            }
        }

        let name = self.text(constructor);
        if !matches!(constructor.kind(), "identifier" | "member_expression")
            || name.contains(['(', '[', '\n', '?'])
        {
            self.expression(constructor, out);
            out.extend(children);
            return;
        }

        let bare = bare_type_name(name);
        if bare == "MessageChannel" {
            children.push(SyntaxNode::new(
                SyntaxKind::Sync(SyncHint::Channel),
                Range::from_node(&node),
            ));
        }
        let call = SyntaxNode::new(SyntaxKind::Call, Range::from_node(&node))
            .named(name)
            .with_children(children);
        if bare == "Worker" {
            out.push(SyntaxNode::new(SyntaxKind::Spawn, Range::from_node(&node)).with_children(vec![call]));
        } else {
            out.push(call);
        }
    }
}
