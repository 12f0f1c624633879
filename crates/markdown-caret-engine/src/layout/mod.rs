//! # Visual Layout Oracle
//!
//! Read-only access to rendered geometry. The navigator asks the oracle where
//! carets and nodes are drawn and what sits under a point; it never lays
//! anything out itself. Every answer is best effort: `None` or an empty list
//! means "no candidate" and the caller falls back to structure.
//!
//! ## Modules
//!
//! - **`lines`**: geometry types and merging client rects into visual lines
//! - **`monospace`**: a deterministic fixed-width layout for headless use

pub mod lines;
pub mod monospace;

use crate::document::{Document, NodeId};
use crate::position::Position;

pub use lines::{LineBand, Rect, merge_into_lines};
pub use monospace::{MonospaceLayout, MonospaceMetrics};

/// Vertical direction of a line move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDirection {
    Up,
    Down,
}

pub trait LayoutOracle {
    /// Where the caret is drawn for `position`.
    fn caret_rect(&self, doc: &Document, position: &Position) -> Option<Rect>;

    /// Box of an atomic node: an image, a horizontal rule or a code block's
    /// language label.
    fn node_rect(&self, doc: &Document, node: NodeId) -> Option<Rect>;

    /// Raw rectangles of a block's own content, one or more per visual line.
    fn client_rects(&self, doc: &Document, block: NodeId) -> Vec<Rect>;

    /// Visual lines of a block, top to bottom.
    fn lines(&self, doc: &Document, block: NodeId, tolerance: f32) -> Vec<LineBand> {
        merge_into_lines(&self.client_rects(doc, block), tolerance)
    }

    /// Nearest logical position under a point, if any.
    fn probe(&self, doc: &Document, x: f32, y: f32) -> Option<Position>;

    fn line_height(&self) -> f32;

    /// A host's own line-move primitive, for renderers that have one.
    fn native_line_move(
        &self,
        _doc: &Document,
        _from: &Position,
        _direction: LineDirection,
    ) -> Option<Position> {
        None
    }
}
