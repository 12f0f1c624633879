//! Caret navigation for a structured, WYSIWYG markdown editor.
//!
//! A [`Document`] is parsed from markdown into blocks and inline content,
//! drawn by something implementing [`LayoutOracle`], and edited through a
//! [`SelectionSink`]. The [`Navigator`] answers arrow keys: it reads the
//! sink's selection, picks the next caret stop and writes it back.
//!
//! ## Modules
//!
//! - **`document`**: arena tree of blocks and inline nodes
//! - **`parsing`**: markdown source to [`Document`]
//! - **`position`**: canonical positions and anchor resolution
//! - **`layout`**: the geometry oracle and a fixed-width implementation
//! - **`navigation`**: the movement operations
//! - **`selection`**: selection sinks
//! - **`tuning`**: constants for geometry-driven movement

pub mod document;
pub mod error;
pub mod layout;
pub mod navigation;
pub mod parsing;
pub mod position;
pub mod selection;
pub mod tuning;

// Re-export key types for easier usage
pub use document::{Document, NodeFlags, NodeId, NodeKind};
pub use error::NavError;
pub use layout::{LayoutOracle, LineBand, LineDirection, MonospaceLayout, MonospaceMetrics, Rect};
pub use navigation::{NavContext, Navigator};
pub use position::{
    Anchor, CodeBoundary, Direction, Place, Position, Resolver, Selection, is_ignorable, normalize,
    plain_offset,
};
pub use selection::{MemorySink, NormalizingSink, SelectionSink};
pub use tuning::NavTuning;
