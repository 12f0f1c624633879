//! # Markdown Loading
//!
//! Builds a [`Document`] from markdown source in three passes: lines are
//! classified, a block builder turns them into leaf blocks nested in
//! containers, and the assembler creates the tree and parses inline content.
//!
//! ## Modules
//!
//! - **`rope`**: byte spans and line iteration over an `xi_rope::Rope`
//! - **`blocks`**: line classification and the container-stack block builder
//! - **`inline`**: cursor-based inline parser (code spans, images, boundaries)
//! - **`assemble`**: leaf blocks to document nodes

pub mod assemble;
pub mod blocks;
pub mod inline;
pub mod rope;

use xi_rope::Rope;

use crate::document::Document;
use assemble::Assembler;
use blocks::{BlockBuilder, BlockNode, MarkdownLineClassifier};
use rope::lines_with_spans;

/// Leaf blocks of a markdown source, in document order.
pub fn parse_blocks(rope: &Rope) -> Vec<BlockNode> {
    let classifier = MarkdownLineClassifier;
    let mut builder = BlockBuilder::new();
    for lr in lines_with_spans(rope) {
        builder.push(&classifier.classify(&lr));
    }
    builder.finish()
}

pub fn parse_markdown(src: &str) -> Document {
    let rope = Rope::from(src);
    let mut assembler = Assembler::new(&rope);
    for block in parse_blocks(&rope) {
        assembler.push(&block);
    }
    log::trace!("parsed {} bytes", src.len());
    assembler.finish()
}
