//! # Document Model
//!
//! An arena tree of typed nodes. Blocks (paragraphs, headings, lists, code
//! blocks, rules) hold inline content (text runs, inline code spans, images,
//! line breaks and boundary placeholders).
//!
//! ## Modules
//!
//! - **`tree`**: parent/child/sibling traversal and text-run lookup
//! - **`text`**: plain-text serialization, debug outlines, text search
//!
//! ## Key Invariants
//!
//! - Node ids are stable for the lifetime of a document; detached nodes keep
//!   their id but are no longer reachable from the root
//! - Every mutation bumps [`Document::revision`], which layout caches key on
//! - Empty text blocks carry a [`NodeKind::Boundary`] so they stay addressable

pub mod text;
pub mod tree;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::NavError;
use crate::position::{Anchor, Selection};

static REVISIONS: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    REVISIONS.fetch_add(1, Ordering::Relaxed)
}

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of node kinds the navigator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    TableCell,
    List { ordered: bool, depth: usize },
    ListItem { checkbox: Option<bool> },
    CodeBlock { lang: Option<String> },
    HorizontalRule,
    TextRun { text: String },
    InlineCode,
    Image { src: String, alt: String },
    LineBreak,
    Boundary,
}

impl NodeKind {
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::BlockQuote
                | NodeKind::TableCell
                | NodeKind::List { .. }
                | NodeKind::ListItem { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::HorizontalRule
        )
    }

    /// Blocks whose own children are inline content the caret can sit in.
    #[must_use]
    pub fn is_text_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::TableCell
                | NodeKind::ListItem { .. }
                | NodeKind::CodeBlock { .. }
        )
    }

    /// Blocks that only contain other blocks.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::BlockQuote | NodeKind::List { .. }
        )
    }

    /// Inline nodes that occupy exactly one caret step.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self, NodeKind::Image { .. } | NodeKind::LineBreak)
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, NodeKind::Image { .. })
    }
}

/// Capabilities that take a node and its subtree out of navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Not exposed to assistive technology or the caret.
    pub hidden: bool,
    /// Rendered but not editable, e.g. an embedded widget.
    pub non_editable: bool,
    /// Editor chrome such as toolbars or drag handles.
    pub chrome: bool,
}

impl NodeFlags {
    pub const HIDDEN: NodeFlags = NodeFlags {
        hidden: true,
        non_editable: false,
        chrome: false,
    };

    pub const NON_EDITABLE: NodeFlags = NodeFlags {
        hidden: false,
        non_editable: true,
        chrome: false,
    };

    pub const CHROME: NodeFlags = NodeFlags {
        hidden: false,
        non_editable: false,
        chrome: true,
    };

    #[must_use]
    pub fn excludes(self) -> bool {
        self.hidden || self.non_editable || self.chrome
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    flags: NodeFlags,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            flags: NodeFlags::default(),
            parent: None,
            children: vec![],
        }
    }
}

/// A rich document: the editable root plus every node ever created in it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    revision: u64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
            revision: next_revision(),
        }
    }

    /// Parses markdown source into a document.
    pub fn from_markdown(src: &str) -> Self {
        crate::parsing::parse_markdown(src)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Changes whenever the tree changes; unique across documents.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `id` was allocated by this document (attached or not).
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes[id.0].flags
    }

    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.nodes[id.0].flags = flags;
        self.touch();
    }

    /// Text of a [`NodeKind::TextRun`], `None` for every other kind.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::TextRun { text } => Some(text),
            _ => None,
        }
    }

    /// Allocates a node that is not yet part of the tree.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        self.touch();
        id
    }

    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let index = self.nodes[parent.0].children.len();
        self.insert(parent, index, kind)
    }

    /// Inserts a new node at `index` among `parent`'s children (clamped).
    pub fn insert(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> NodeId {
        let id = self.create(kind);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.nodes[id.0].parent = Some(parent);
        id
    }

    /// Unlinks `id` from its parent. The subtree stays allocated.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root() {
            return;
        }
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.touch();
        }
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::TextRun {
                text: text.to_string(),
            },
        )
    }

    /// Appends to the trailing text run of `parent`, creating one if needed.
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeKind::TextRun { text: existing } = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            self.touch();
            return last;
        }
        self.append_text(parent, text)
    }

    /// Appends an inline code span holding `text`; returns the span node.
    pub fn append_inline_code(&mut self, parent: NodeId, text: &str) -> NodeId {
        let span = self.append(parent, NodeKind::InlineCode);
        self.append_text(span, text);
        span
    }

    pub fn append_image(&mut self, parent: NodeId, src: &str, alt: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Image {
                src: src.to_string(),
                alt: alt.to_string(),
            },
        )
    }

    /// Inserts a paragraph holding only a boundary placeholder.
    pub fn insert_empty_paragraph(&mut self, parent: NodeId, index: usize) -> NodeId {
        let paragraph = self.insert(parent, index, NodeKind::Paragraph);
        self.append(paragraph, NodeKind::Boundary);
        paragraph
    }

    /// Gives every empty text block a placeholder and every code block a
    /// text run, so each stays addressable by the caret.
    pub fn ensure_placeholders(&mut self) {
        let blocks: Vec<NodeId> = self
            .descendants(self.root())
            .filter(|id| self.kind(*id).is_text_block())
            .collect();

        for block in blocks {
            if matches!(self.kind(block), NodeKind::CodeBlock { .. }) {
                if self.first_text_run(block).is_none() {
                    self.append_text(block, "");
                }
                continue;
            }
            let has_content = self.inline_children(block).iter().any(|c| match self.kind(*c) {
                NodeKind::TextRun { text } => !text.is_empty(),
                _ => true,
            });
            if !has_content {
                self.insert(block, 0, NodeKind::Boundary);
            }
        }
    }

    /// Checks that a raw anchor points at a live node with a legal offset.
    pub fn validate_anchor(&self, anchor: &Anchor) -> Result<(), NavError> {
        if !self.contains(anchor.node) {
            return Err(NavError::Detached(anchor.node));
        }
        self.attachment(anchor.node)?;

        let max = self.max_offset(anchor.node);
        if anchor.offset > max {
            return Err(NavError::OffsetOutOfRange {
                node: anchor.node,
                offset: anchor.offset,
                max,
            });
        }
        Ok(())
    }

    pub fn validate_selection(&self, selection: &Selection) -> Result<(), NavError> {
        match selection {
            Selection::Caret(anchor) => self.validate_anchor(anchor),
            Selection::Range { anchor, focus } => {
                self.validate_anchor(anchor)?;
                self.validate_anchor(focus)
            }
            Selection::Node(node) => {
                if !self.contains(*node) {
                    return Err(NavError::Detached(*node));
                }
                self.attachment(*node)?;
                match self.kind(*node) {
                    NodeKind::Image { .. }
                    | NodeKind::HorizontalRule
                    | NodeKind::CodeBlock { .. } => Ok(()),
                    _ => Err(NavError::NotSelectable(*node)),
                }
            }
        }
    }

    /// Largest legal anchor offset inside `id`.
    pub fn max_offset(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::TextRun { text } => text.chars().count(),
            NodeKind::Image { .. }
            | NodeKind::LineBreak
            | NodeKind::HorizontalRule
            | NodeKind::Boundary => 1,
            _ => self.nodes[id.0].children.len(),
        }
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_only_root() {
        let doc = Document::new();
        assert_eq!(doc.kind(doc.root()), &NodeKind::Root);
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn mutation_bumps_revision() {
        let mut doc = Document::new();
        let before = doc.revision();
        doc.append(doc.root(), NodeKind::Paragraph);
        assert_ne!(doc.revision(), before);
    }

    #[test]
    fn revisions_are_unique_across_documents() {
        let a = Document::new();
        let b = Document::new();
        assert_ne!(a.revision(), b.revision());
    }

    #[test]
    fn push_text_extends_trailing_run() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let first = doc.push_text(p, "ab");
        let second = doc.push_text(p, "cd");
        assert_eq!(first, second);
        assert_eq!(doc.text(first), Some("abcd"));
    }

    #[test]
    fn insert_clamps_index() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), NodeKind::Paragraph);
        let b = doc.insert(doc.root(), 99, NodeKind::Paragraph);
        assert_eq!(doc.children(doc.root()), &[a, b]);
    }

    #[test]
    fn detach_unlinks_but_keeps_node() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        doc.detach(p);
        assert!(doc.contains(p));
        assert!(!doc.is_attached(p));
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn ensure_placeholders_fills_empty_blocks() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let code = doc.append(doc.root(), NodeKind::CodeBlock { lang: None });
        let full = doc.append(doc.root(), NodeKind::Paragraph);
        doc.append_text(full, "x");

        doc.ensure_placeholders();

        assert_eq!(doc.kind(doc.children(p)[0]), &NodeKind::Boundary);
        assert_eq!(doc.text(doc.children(code)[0]), Some(""));
        assert_eq!(doc.children(full).len(), 1);
    }

    #[test]
    fn empty_list_item_with_sublist_gets_placeholder_first() {
        let mut doc = Document::new();
        let list = doc.append(
            doc.root(),
            NodeKind::List {
                ordered: false,
                depth: 0,
            },
        );
        let item = doc.append(list, NodeKind::ListItem { checkbox: None });
        doc.append(
            item,
            NodeKind::List {
                ordered: false,
                depth: 1,
            },
        );

        doc.ensure_placeholders();

        assert_eq!(doc.kind(doc.children(item)[0]), &NodeKind::Boundary);
    }

    // ============ Validation tests ============

    #[test]
    fn validate_rejects_offset_past_text() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let run = doc.append_text(p, "abc");
        assert!(doc.validate_anchor(&Anchor::new(run, 3)).is_ok());
        assert_eq!(
            doc.validate_anchor(&Anchor::new(run, 4)),
            Err(NavError::OffsetOutOfRange {
                node: run,
                offset: 4,
                max: 3
            })
        );
    }

    #[test]
    fn validate_distinguishes_detached_and_outside_root() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let run = doc.append_text(p, "abc");
        doc.detach(p);
        assert_eq!(
            doc.validate_anchor(&Anchor::new(p, 0)),
            Err(NavError::Detached(p))
        );
        assert_eq!(
            doc.validate_anchor(&Anchor::new(run, 0)),
            Err(NavError::OutsideRoot(run))
        );
    }

    #[test]
    fn only_atomic_units_are_selectable() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let image = doc.append_image(p, "a.png", "a");
        assert!(doc.validate_selection(&Selection::Node(image)).is_ok());
        assert_eq!(
            doc.validate_selection(&Selection::Node(p)),
            Err(NavError::NotSelectable(p))
        );
    }
}
