//! Front-end trait
//!
//! This module defines the common interface that all language front-ends
//! implement, plus the tree-sitter helpers they share: syntax error
//! collection and handled-node tracking.

use super::{Language, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::error::ParseError;
use crate::types::Range;
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Result of running a front-end over one source text
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    /// Output for a front-end that produced nothing usable
    pub fn failed(language: Language, error: ParseError) -> Self {
        Self {
            tree: SyntaxTree::new(language, Range::new(0, 0, 0, 0)),
            errors: vec![error],
        }
    }

    /// A single unrecoverable error fails the whole unit
    pub fn is_failed(&self) -> bool {
        self.errors.iter().any(|e| !e.recoverable)
    }
}

/// Common interface for all language front-ends
pub trait FrontEnd: Send + Sync {
    /// Parse source text and lower it into a [`SyntaxTree`]
    fn parse(&mut self, text: &str) -> ParseOutput;

    /// Get the language this front-end handles
    fn language(&self) -> Language;
}

/// Run a tree-sitter parser and hand the root to a lowering function.
///
/// Localized ERROR/MISSING nodes become recoverable errors. A tree whose
/// root is in error and that yields no declaration at all is unusable.
pub(crate) fn lower_with<F>(
    parser: &mut Parser,
    language: Language,
    code: &str,
    lower: F,
) -> ParseOutput
where
    F: FnOnce(Node<'_>, &str) -> Vec<SyntaxNode>,
{
    let Some(tree) = parser.parse(code, None) else {
        return ParseOutput::failed(
            language,
            ParseError::fatal(
                format!("{language} front-end produced no syntax tree"),
                Range::new(0, 0, 0, 0),
            ),
        );
    };

    let root = tree.root_node();
    let mut output = ParseOutput {
        tree: SyntaxTree::new(language, Range::from_node(&root)),
        errors: collect_syntax_errors(root, code),
    };
    output.tree.nodes = lower(root, code);

    if root.has_error() && !code.trim().is_empty() && !output.tree.has_declarations() {
        output.errors.push(ParseError::fatal(
            "source has syntax errors and no recognizable declarations",
            Range::from_node(&root),
        ));
    }

    output
}

/// Recoverable errors for every ERROR and MISSING node.
///
/// Nested errors inside an ERROR node are reported once, at the outermost node.
pub fn collect_syntax_errors(root: Node, code: &str) -> Vec<ParseError> {
    let mut errors = Vec::new();
    if !root.has_error() {
        return errors;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            errors.push(ParseError::recoverable(
                format!("missing '{}'", node.kind()),
                Range::from_node(&node),
            ));
            continue;
        }
        if node.is_error() {
            let snippet: String = node_text(node, code).chars().take(24).collect();
            errors.push(ParseError::recoverable(
                format!("unexpected syntax near '{}'", snippet.trim()),
                Range::from_node(&node),
            ));
            continue;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let mut children: Vec<_> = node.children(&mut cursor).collect();
            children.reverse();
            stack.extend(children);
        }
    }

    errors.sort_by_key(|e| e.range.start());
    errors
}

/// Recursion bound for lowering one unit.
///
/// Front-ends stop descending past this many nested statements and
/// expressions; the normalizer applies the same bound to lowered trees.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Stand-in for a subtree nested past [`MAX_NESTING_DEPTH`]
pub(crate) fn nesting_limit_node(node: Node) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::Unknown {
            raw_kind: format!("{} (nesting limit)", node.kind()),
        },
        Range::from_node(&node),
    )
}

/// Zero-width range at the end of `node`; names bound by a statement become visible here
pub(crate) fn range_after(node: Node) -> Range {
    let end = node.end_position();
    Range::new(end.row as u32, end.column as u16, end.row as u32, end.column as u16)
}

/// Source text of a node; empty when the node lies outside `code`
pub fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    code.get(node.byte_range()).unwrap_or("")
}

/// Information about a handled AST node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandledNode {
    pub name: String,
    pub id: u16,
}

/// Extension trait for tracking which AST node types a front-end handles
///
/// Lets tests audit grammar coverage against the live grammar instead of a
/// hand-maintained list.
pub trait NodeTracker {
    /// Get the set of node types this front-end has encountered and handled
    fn get_handled_nodes(&self) -> &HashSet<HandledNode>;

    /// Register that we've handled a specific node type with its tree-sitter ID
    fn register_handled_node(&mut self, node_kind: &str, node_id: u16);
}

/// Default implementation of NodeTracker using a HashSet
#[derive(Debug, Default)]
pub struct NodeTrackingState {
    handled_nodes: HashSet<HandledNode>,
}

impl NodeTrackingState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeTracker for NodeTrackingState {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        &self.handled_nodes
    }

    #[inline]
    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.handled_nodes.insert(HandledNode {
            name: node_kind.to_string(),
            id: node_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go_parser() -> Parser {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        parser
    }

    #[test]
    fn test_clean_source_has_no_errors() {
        let code = "package main\n\nfunc main() {}\n";
        let tree = go_parser().parse(code, None).unwrap();
        assert!(collect_syntax_errors(tree.root_node(), code).is_empty());
    }

    #[test]
    fn test_broken_source_reports_recoverable_errors() {
        let code = "package main\n\nfunc main() {\n\tx := \n}\n\nfunc ok() {}\n";
        let tree = go_parser().parse(code, None).unwrap();
        let errors = collect_syntax_errors(tree.root_node(), code);
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.recoverable));
    }

    #[test]
    fn test_node_tracking_deduplicates() {
        let mut state = NodeTrackingState::new();
        state.register_handled_node("function_declaration", 7);
        state.register_handled_node("function_declaration", 7);
        state.register_handled_node("method_declaration", 8);
        assert_eq!(state.get_handled_nodes().len(), 2);
    }
}
