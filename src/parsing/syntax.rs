//! Language-neutral syntax tree produced by front-ends
//!
//! Front-ends lower their concrete tree-sitter trees into this small closed
//! vocabulary. The normalizer consumes nothing else, so grammar quirks stop
//! at the adapter boundary.

use super::Language;
use crate::symbol::{Signature, Visibility};
use crate::types::Range;

/// Synchronization hint observed in a callable body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncHint {
    CountingBarrier,
    Channel,
}

/// Python-style scope directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingDirective {
    /// Name refers to the enclosing function's binding
    Nonlocal,
    /// Name refers to the package-level binding
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverSpec {
    /// Bare type name (`Sample` for `*Sample`)
    pub type_name: String,
    pub pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    /// `name` is the declared package name
    Package,
    /// `name` is the import path; `alias` the local name it binds
    Import { alias: String },
    TypeDecl { embeds: Vec<String> },
    InterfaceDecl { embeds: Vec<String> },
    /// Method requirement inside an interface
    MethodSpec(Signature),
    Field {
        type_text: Option<String>,
        embedded: bool,
        mutable: bool,
    },
    Function { signature: Signature, is_async: bool },
    Method {
        receiver: ReceiverSpec,
        signature: Signature,
        is_async: bool,
    },
    Param { type_text: Option<String> },
    /// Variable or constant declaration; package level becomes a GlobalVariable
    Variable {
        type_text: Option<String>,
        mutable: bool,
    },
    Closure { signature: Signature },
    Block { looping: bool },
    /// Scope of its own; children start with the bindings of its targets
    Comprehension,
    /// Launch of concurrent work; children hold the launched expression
    Spawn,
    Sync(SyncHint),
    /// Identifier in value position (read or write)
    Ident,
    BindingDecl(BindingDirective),
    /// Call site; `name` is the callee as written
    Call,
    /// Type reference; `name` is the type as written
    TypeRef,
    /// `text` holds the raw comment
    Comment { block: bool },
    /// Declaration-level construct the adapter does not map
    Unknown { raw_kind: String },
}

impl SyntaxKind {
    /// Whether the normalizer may turn this node into a symbol
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            SyntaxKind::Package
                | SyntaxKind::TypeDecl { .. }
                | SyntaxKind::InterfaceDecl { .. }
                | SyntaxKind::Field { .. }
                | SyntaxKind::Function { .. }
                | SyntaxKind::Method { .. }
                | SyntaxKind::Variable { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub name: Option<String>,
    pub range: Range,
    pub visibility: Visibility,
    /// Documentation carried by the construct itself (docstrings)
    pub doc: Option<String>,
    pub text: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, range: Range) -> Self {
        Self {
            kind,
            name: None,
            range,
            visibility: Visibility::Unexported,
            doc: None,
            text: None,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Depth-first iterator over this node and its descendants
    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Lowered tree for one source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub language: Language,
    pub range: Range,
    /// Top-level nodes in source order
    pub nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new(language: Language, range: Range) -> Self {
        Self {
            language,
            range,
            nodes: Vec::new(),
        }
    }

    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes.iter().flat_map(|node| node.descendants())
    }

    /// Whether any recognizable declaration survived lowering.
    ///
    /// An unnamed package marker is synthesized by front-ends whose packages
    /// are implicit and does not count.
    pub fn has_declarations(&self) -> bool {
        self.descendants().any(|node| {
            node.kind.is_declaration() && !(node.kind == SyntaxKind::Package && node.name.is_none())
        })
    }
}
