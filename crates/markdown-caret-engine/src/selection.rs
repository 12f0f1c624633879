//! # Selection Sinks
//!
//! The live caret of an editable surface. The navigator reads the current
//! selection before each move and writes the target back. Writes see the
//! document, since real surfaces normalize against their own tree.

use crate::document::{Document, NodeKind};
use crate::position::{Anchor, Selection};

pub trait SelectionSink {
    fn selection(&self) -> Option<Selection>;

    fn set_selection(&mut self, doc: &Document, selection: Selection);
}

/// Stores exactly what it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    current: Option<Selection>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(selection: Selection) -> Self {
        Self {
            current: Some(selection),
        }
    }
}

impl SelectionSink for MemorySink {
    fn selection(&self) -> Option<Selection> {
        self.current
    }

    fn set_selection(&mut self, _doc: &Document, selection: Selection) {
        self.current = Some(selection);
    }
}

/// A surface that rewrites some selections the way browsers do.
///
/// A caret at the very start of an inline code span's text is moved out of
/// the span, and optionally an image selection becomes a caret in front of
/// the image. The navigator's pending context bridges both.
#[derive(Debug, Clone, Default)]
pub struct NormalizingSink {
    current: Option<Selection>,
    collapse_images: bool,
}

impl NormalizingSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn collapsing_images(mut self) -> Self {
        self.collapse_images = true;
        self
    }

    fn normalize(&self, doc: &Document, selection: Selection) -> Selection {
        match selection {
            Selection::Caret(anchor) if anchor.offset == 0 && doc.contains(anchor.node) => {
                let Some(code) = doc
                    .parent(anchor.node)
                    .filter(|p| matches!(doc.kind(*p), NodeKind::InlineCode))
                else {
                    return selection;
                };
                if doc.children(code).first() != Some(&anchor.node) {
                    return selection;
                }
                if let Some(prev) = doc.prev_text_run(anchor.node)
                    && doc.parent(prev) != Some(code)
                {
                    return Selection::caret(prev, doc.max_offset(prev));
                }
                match (doc.parent(code), doc.index_in_parent(code)) {
                    (Some(parent), Some(index)) => Selection::Caret(Anchor::new(parent, index)),
                    _ => selection,
                }
            }
            Selection::Node(node)
                if self.collapse_images && doc.contains(node) && doc.kind(node).is_image() =>
            {
                match (doc.parent(node), doc.index_in_parent(node)) {
                    (Some(parent), Some(index)) => Selection::Caret(Anchor::new(parent, index)),
                    _ => selection,
                }
            }
            other => other,
        }
    }
}

impl SelectionSink for NormalizingSink {
    fn selection(&self) -> Option<Selection> {
        self.current
    }

    fn set_selection(&mut self, doc: &Document, selection: Selection) {
        self.current = Some(self.normalize(doc, selection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_sink_round_trips() {
        let doc = Document::from_markdown("ab");
        let run = doc.first_text_run(doc.root()).unwrap();
        let mut sink = MemorySink::new();
        assert_eq!(sink.selection(), None);
        sink.set_selection(&doc, Selection::caret(run, 1));
        assert_eq!(sink.selection(), Some(Selection::caret(run, 1)));
    }

    #[test]
    fn code_start_caret_moves_to_previous_run() {
        let doc = Document::from_markdown("a `x`");
        let a = doc.first_text_run(doc.root()).unwrap();
        let x = doc.next_text_run(a).unwrap();
        let mut sink = NormalizingSink::new();

        sink.set_selection(&doc, Selection::caret(x, 0));
        assert_eq!(sink.selection(), Some(Selection::caret(a, 2)));

        sink.set_selection(&doc, Selection::caret(x, 1));
        assert_eq!(sink.selection(), Some(Selection::caret(x, 1)));
    }

    #[test]
    fn code_at_block_start_moves_to_parent_offset() {
        let doc = Document::from_markdown("`x` b");
        let p = doc.children(doc.root())[0];
        let x = doc.first_text_run(p).unwrap();
        let mut sink = NormalizingSink::new();

        sink.set_selection(&doc, Selection::caret(x, 0));
        assert_eq!(sink.selection(), Some(Selection::caret(p, 0)));
    }

    #[test]
    fn image_selection_collapses_when_asked() {
        let doc = Document::from_markdown("![i](i.png)");
        let p = doc.children(doc.root())[0];
        let image = doc.children(p)[0];

        let mut keeps = NormalizingSink::new();
        keeps.set_selection(&doc, Selection::Node(image));
        assert_eq!(keeps.selection(), Some(Selection::Node(image)));

        let mut collapses = NormalizingSink::new().collapsing_images();
        collapses.set_selection(&doc, Selection::Node(image));
        assert_eq!(collapses.selection(), Some(Selection::caret(p, 0)));
    }
}
