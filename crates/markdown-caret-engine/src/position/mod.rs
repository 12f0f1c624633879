//! # Positions
//!
//! Raw anchors as a host surface reports them, and the canonical logical
//! positions the navigator reasons about.
//!
//! ## Modules
//!
//! - **`stops`**: caret stops of a text block (`BlockStops`)
//! - **`resolver`**: anchor normalization, list-item tie-breaks, inline code
//!   boundary classification, plain-text offsets
//!
//! ## Caret stops
//!
//! Every text block is a row of visible units (characters, images, line
//! breaks). A caret stop sits between two units. At the left edge of an
//! inline code span there are two stops at the same offset: one outside the
//! span and one inside it. The right edge has a single merged stop.

pub mod resolver;
pub mod stops;

use crate::document::NodeId;

pub use resolver::{CodeBoundary, Resolver, is_ignorable, normalize, plain_offset};

/// A `(container, offset)` pair as stored by a selection surface.
///
/// Offsets count characters inside text runs, children inside containers,
/// and 0 (before) or 1 (after) on atomic nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub node: NodeId,
    pub offset: usize,
}

impl Anchor {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// What a selection surface holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Caret(Anchor),
    Range { anchor: Anchor, focus: Anchor },
    /// An atomic unit selected as a whole: an image, a horizontal rule or a
    /// code block's language label.
    Node(NodeId),
}

impl Selection {
    pub fn caret(node: NodeId, offset: usize) -> Self {
        Selection::Caret(Anchor::new(node, offset))
    }

    /// The end of the selection the caret moves from.
    #[must_use]
    pub fn focus(&self) -> Option<Anchor> {
        match self {
            Selection::Caret(a) => Some(*a),
            Selection::Range { focus, .. } => Some(*focus),
            Selection::Node(_) => None,
        }
    }
}

/// A canonical caret position. Every raw anchor resolves to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    TextOffset {
        run: NodeId,
        offset: usize,
    },
    BeforeNode(NodeId),
    AfterNode(NodeId),
    /// A text offset inside a list item's own content.
    InsideListItem {
        item: NodeId,
        run: NodeId,
        offset: usize,
    },
}

impl Position {
    /// The text run and character offset, for text positions.
    #[must_use]
    pub fn run_offset(&self) -> Option<(NodeId, usize)> {
        match *self {
            Position::TextOffset { run, offset } | Position::InsideListItem { run, offset, .. } => {
                Some((run, offset))
            }
            Position::BeforeNode(_) | Position::AfterNode(_) => None,
        }
    }
}

/// The resolved form of a whole selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Place {
    Caret(Position),
    Selected(NodeId),
}

/// Which way a tie between equivalent anchors is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// A caret stop inside a text block: offset `k` counts visible units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Stop {
    pub k: usize,
    pub inside: bool,
}

impl Stop {
    pub fn outside(k: usize) -> Self {
        Self { k, inside: false }
    }

    pub fn inside(k: usize) -> Self {
        Self { k, inside: true }
    }
}

/// The navigator's internal station model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Spot {
    Text { block: NodeId, stop: Stop },
    /// Caret beside a horizontal rule; only reachable at document edges.
    Beside { node: NodeId, after: bool },
    Selected(NodeId),
}

impl Spot {
    pub fn text(block: NodeId, stop: Stop) -> Self {
        Spot::Text { block, stop }
    }
}
