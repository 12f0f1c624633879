//! Structural traversal over a [`Document`].

use super::{Document, NodeId, NodeKind};
use crate::error::NavError;

impl Document {
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// `id` itself followed by its subtree in document order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.attachment(id).is_ok()
    }

    /// Explains why `id` cannot be reached from the root, if it cannot.
    pub fn attachment(&self, id: NodeId) -> Result<(), NavError> {
        if id == self.root() {
            return Ok(());
        }
        if self.parent(id).is_none() {
            return Err(NavError::Detached(id));
        }
        match self.ancestors(id).last() {
            Some(top) if top == self.root() => Ok(()),
            _ => Err(NavError::OutsideRoot(id)),
        }
    }

    /// Nearest text-bearing block at or above `id`.
    pub fn text_block_of(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.kind(*n).is_text_block())
    }

    /// The inline content a block owns directly.
    ///
    /// A list item's own content stops at its first block child, which is
    /// usually a nested list.
    pub fn inline_children(&self, block: NodeId) -> &[NodeId] {
        let children = self.children(block);
        let end = children
            .iter()
            .position(|c| self.kind(*c).is_block())
            .unwrap_or(children.len());
        &children[..end]
    }

    /// Index of the first block child, i.e. where a list item's sublist starts.
    pub fn first_block_child(&self, id: NodeId) -> Option<usize> {
        self.children(id)
            .iter()
            .position(|c| self.kind(*c).is_block())
    }

    /// First list directly nested in a list item.
    pub fn nested_list(&self, item: NodeId) -> Option<NodeId> {
        self.children(item)
            .iter()
            .copied()
            .find(|c| matches!(self.kind(*c), NodeKind::List { .. }))
    }

    pub fn enclosing_list_item(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| matches!(self.kind(*n), NodeKind::ListItem { .. }))
    }

    /// The top-most list containing `id`.
    pub fn outermost_list(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|n| matches!(self.kind(*n), NodeKind::List { .. }))
            .last()
    }

    pub fn first_text_run(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id)
            .find(|n| matches!(self.kind(*n), NodeKind::TextRun { .. }))
    }

    pub fn last_text_run(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id)
            .filter(|n| matches!(self.kind(*n), NodeKind::TextRun { .. }))
            .last()
    }

    /// The text run after `run` inside the same text block.
    pub fn next_text_run(&self, run: NodeId) -> Option<NodeId> {
        let block = self.text_block_of(run)?;
        self.descendants(block)
            .filter(|n| matches!(self.kind(*n), NodeKind::TextRun { .. }))
            .skip_while(|n| *n != run)
            .nth(1)
    }

    /// The text run before `run` inside the same text block.
    pub fn prev_text_run(&self, run: NodeId) -> Option<NodeId> {
        let block = self.text_block_of(run)?;
        self.descendants(block)
            .filter(|n| matches!(self.kind(*n), NodeKind::TextRun { .. }))
            .take_while(|n| *n != run)
            .last()
    }
}
