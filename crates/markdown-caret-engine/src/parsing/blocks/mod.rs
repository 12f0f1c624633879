//! # Block Parsing
//!
//! 1. **Line classification** (`classify`): local facts per line (quote
//!    depth, indent, fence, heading, list marker, thematic break)
//! 2. **Block construction** (`builder`): a `BlockBuilder` keeps a stack of
//!    open containers (quotes and list items) and emits leaf `BlockNode`s
//!
//! ## Modules
//!
//! - **`types`**: `BlockNode`, `BlockKind`, `ContainerFrame`
//! - **`kinds`**: block syntax with owned delimiters
//! - **`classify`**: `MarkdownLineClassifier`
//! - **`containers`**: `ContainerPath`, the open container stack
//! - **`builder`**: `BlockBuilder`

pub mod builder;
pub mod classify;
pub mod containers;
pub mod kinds;
pub mod types;

pub use builder::BlockBuilder;
pub use classify::{LineClass, MarkdownLineClassifier};
pub use types::{BlockKind, BlockNode, ContainerFrame};
