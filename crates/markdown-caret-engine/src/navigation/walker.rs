//! Structural walks over the navigable blocks of a document.

use std::collections::HashMap;

use crate::document::{Document, NodeId, NodeKind};
use crate::position::stops::BlockStops;
use crate::position::{Spot, Stop};

/// Navigable blocks in document order.
///
/// A block is navigable when it is a horizontal rule or a text block with at
/// least one caret stop, and neither it nor an ancestor is excluded.
pub(crate) struct BlockWalk {
    blocks: Vec<NodeId>,
    /// Preorder index of each block in `blocks`.
    block_order: Vec<usize>,
    /// Preorder `[start, end)` of every visited block-level node.
    extents: HashMap<NodeId, (usize, usize)>,
}

impl BlockWalk {
    pub fn new(doc: &Document) -> Self {
        let mut walk = Self {
            blocks: vec![],
            block_order: vec![],
            extents: HashMap::new(),
        };
        let mut counter = 0;
        walk.visit(doc, doc.root(), &mut counter);
        walk
    }

    fn visit(&mut self, doc: &Document, node: NodeId, counter: &mut usize) {
        let start = *counter;
        *counter += 1;

        if !doc.flags(node).excludes() {
            let navigable = match doc.kind(node) {
                NodeKind::HorizontalRule => true,
                kind if kind.is_text_block() => BlockStops::collect(doc, node).is_navigable(),
                _ => false,
            };
            if navigable {
                self.blocks.push(node);
                self.block_order.push(start);
            }
            for &child in doc.children(node) {
                if doc.kind(child).is_block() {
                    self.visit(doc, child, counter);
                }
            }
        }

        self.extents.insert(node, (start, *counter));
    }

    pub fn blocks(&self) -> &[NodeId] {
        &self.blocks
    }

    pub fn last(&self) -> Option<NodeId> {
        self.blocks.last().copied()
    }

    pub fn next(&self, block: NodeId) -> Option<NodeId> {
        let i = self.blocks.iter().position(|b| *b == block)?;
        self.blocks.get(i + 1).copied()
    }

    pub fn prev(&self, block: NodeId) -> Option<NodeId> {
        let i = self.blocks.iter().position(|b| *b == block)?;
        i.checked_sub(1).and_then(|i| self.blocks.get(i).copied())
    }

    /// First navigable block at or after `node` in document order.
    pub fn at_or_after(&self, node: NodeId) -> Option<NodeId> {
        let (start, _) = self.extents.get(&node)?;
        self.from_order(*start)
    }

    /// First navigable block after `node`'s whole subtree.
    pub fn after_subtree(&self, node: NodeId) -> Option<NodeId> {
        let (_, end) = self.extents.get(&node)?;
        self.from_order(*end)
    }

    fn from_order(&self, order: usize) -> Option<NodeId> {
        let i = self.block_order.partition_point(|o| *o < order);
        self.blocks.get(i).copied()
    }
}

/// Caret spot at the start of a navigable block.
pub(crate) fn start_spot(doc: &Document, block: NodeId) -> Spot {
    match doc.kind(block) {
        NodeKind::HorizontalRule => Spot::Beside {
            node: block,
            after: false,
        },
        _ => Spot::text(block, Stop::outside(0)),
    }
}

/// Caret spot at the end of a navigable block.
pub(crate) fn end_spot(doc: &Document, block: NodeId) -> Spot {
    match doc.kind(block) {
        NodeKind::HorizontalRule => Spot::Beside {
            node: block,
            after: true,
        },
        _ => Spot::text(block, BlockStops::collect(doc, block).last()),
    }
}

/// Number of plain-text characters a block contributes.
pub(crate) fn block_len(doc: &Document, block: NodeId) -> usize {
    match doc.kind(block) {
        NodeKind::HorizontalRule => 0,
        _ => BlockStops::collect(doc, block).len(),
    }
}

/// Inserts an empty paragraph right after the outermost list around `block`.
pub(crate) fn synthesize_after_list(doc: &mut Document, block: NodeId) -> Option<NodeId> {
    let list = doc.outermost_list(block)?;
    let parent = doc.parent(list)?;
    let index = doc.index_in_parent(list)? + 1;
    Some(doc.insert_empty_paragraph(parent, index))
}

/// Inserts an empty paragraph beside `block` in its parent.
pub(crate) fn synthesize_beside(doc: &mut Document, block: NodeId, after: bool) -> Option<NodeId> {
    let parent = doc.parent(block)?;
    let index = doc.index_in_parent(block)? + usize::from(after);
    Some(doc.insert_empty_paragraph(parent, index))
}
