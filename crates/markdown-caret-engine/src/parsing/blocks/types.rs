use crate::parsing::rope::span::Span;

use super::kinds::FenceKind;

/// A frame in the container stack. Every frame carries an id unique within
/// one parse, so consecutive siblings of the same shape stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFrame {
    BlockQuote {
        id: u32,
    },
    ListItem {
        id: u32,
        ordered: bool,
        checkbox: Option<bool>,
        /// Column of the marker.
        marker_indent: usize,
        /// Column continuation blocks must reach to stay in the item.
        content_indent: usize,
    },
}

impl ContainerFrame {
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            ContainerFrame::BlockQuote { id } | ContainerFrame::ListItem { id, .. } => *id,
        }
    }
}

/// The kind of a leaf block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// The text on a list item's marker line and its lazy continuations.
    ItemText,
    Heading {
        level: u8,
    },
    FencedCode {
        kind: FenceKind,
        lang: Option<String>,
    },
    ThematicBreak,
}

/// A leaf block with the containers it is nested in.
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub containers: Vec<ContainerFrame>,
    pub kind: BlockKind,
    /// Content span of each source line, prefixes and markers removed.
    pub lines: Vec<Span>,
}
