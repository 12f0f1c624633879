use crate::parsing::rope::span::Span;

use super::{
    classify::LineClass,
    containers::ContainerPath,
    kinds::{CodeFence, FenceKind},
    types::{BlockKind, BlockNode},
};

#[derive(Debug, Clone)]
enum LeafState {
    None,
    Paragraph {
        kind: BlockKind,
        lines: Vec<Span>,
    },
    Fence {
        kind: FenceKind,
        lang: Option<String>,
        indent: usize,
        lines: Vec<Span>,
    },
}

/// Line-at-a-time block state machine.
pub struct BlockBuilder {
    containers: ContainerPath,
    leaf: LeafState,
    out: Vec<BlockNode>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            containers: ContainerPath::default(),
            leaf: LeafState::None,
            out: vec![],
        }
    }

    pub fn push(&mut self, c: &LineClass) {
        if self.in_fence() {
            self.consume_fence_line(c);
            return;
        }

        if c.is_blank {
            self.flush_leaf();
            return;
        }

        let quote_depth = self.containers.quote_depth();
        if self.in_paragraph() && !c.opens_block() && c.quote_depth <= quote_depth {
            // Lazy continuation.
            self.extend_paragraph(c.remainder_span.skip(c.indent));
            return;
        }

        self.flush_leaf();
        self.containers.set_quote_depth(c.quote_depth, c.raw_indent);
        self.containers.close_items_deeper_than(c.indent);
        self.open_leaf(c);
    }

    pub fn finish(mut self) -> Vec<BlockNode> {
        self.flush_leaf();
        self.out
    }

    fn in_fence(&self) -> bool {
        matches!(self.leaf, LeafState::Fence { .. })
    }

    fn in_paragraph(&self) -> bool {
        matches!(self.leaf, LeafState::Paragraph { .. })
    }

    fn open_leaf(&mut self, c: &LineClass) {
        let content = c.remainder_span;
        if c.thematic_break {
            self.emit(BlockKind::ThematicBreak, vec![]);
        } else if let Some(marker) = c.list_marker {
            self.containers.push_item(&marker);
            self.leaf = LeafState::Paragraph {
                kind: BlockKind::ItemText,
                lines: vec![content.skip(marker.text_start)],
            };
        } else if let Some((level, text_start)) = c.heading {
            self.emit(BlockKind::Heading { level }, vec![content.skip(text_start)]);
        } else if let Some(kind) = c.fence_sig {
            self.leaf = LeafState::Fence {
                kind,
                lang: CodeFence::lang(&c.remainder_text),
                indent: c.indent,
                lines: vec![],
            };
        } else {
            self.leaf = LeafState::Paragraph {
                kind: BlockKind::Paragraph,
                lines: vec![content.skip(c.indent)],
            };
        }
    }

    fn consume_fence_line(&mut self, c: &LineClass) {
        if c.quote_depth < self.containers.quote_depth() {
            // The quote holding an unterminated fence ended.
            self.flush_leaf();
            self.push(c);
            return;
        }
        let LeafState::Fence {
            kind,
            indent,
            lines,
            ..
        } = &mut self.leaf
        else {
            return;
        };
        if CodeFence::closes(*kind, &c.remainder_text) {
            self.flush_leaf();
            return;
        }
        lines.push(c.remainder_span.skip(c.indent.min(*indent)));
    }

    fn extend_paragraph(&mut self, line: Span) {
        if let LeafState::Paragraph { lines, .. } = &mut self.leaf {
            lines.push(line);
        }
    }

    fn flush_leaf(&mut self) {
        match std::mem::replace(&mut self.leaf, LeafState::None) {
            LeafState::None => {}
            LeafState::Paragraph { kind, lines } => self.emit(kind, lines),
            LeafState::Fence {
                kind, lang, lines, ..
            } => self.emit(BlockKind::FencedCode { kind, lang }, lines),
        }
    }

    fn emit(&mut self, kind: BlockKind, lines: Vec<Span>) {
        self.out.push(BlockNode {
            containers: self.containers.frames().to_vec(),
            kind,
            lines,
        });
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
