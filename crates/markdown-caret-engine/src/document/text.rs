//! Text views of a document: plain text, debug outlines and search.

use std::fmt::Write;

use super::{Document, NodeId, NodeKind};
use crate::navigation::walker::BlockWalk;
use crate::position::Anchor;
use crate::position::stops::BlockStops;

impl Document {
    /// Navigable blocks joined by `\n`.
    ///
    /// Images appear as U+FFFC, hard breaks as `\n` and horizontal rules as
    /// empty lines. Boundary markers and zero-width characters are left out.
    pub fn plain_text(&self) -> String {
        BlockWalk::new(self)
            .blocks()
            .iter()
            .map(|block| match self.kind(*block) {
                NodeKind::HorizontalRule => String::new(),
                _ => BlockStops::collect(self, *block)
                    .units
                    .iter()
                    .map(|u| u.plain(self))
                    .collect(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// An indented dump of the attached tree, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_node(self.root(), 0, &mut out);
        out.truncate(out.trim_end().len());
        out
    }

    fn outline_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let label = match self.kind(id) {
            NodeKind::Root => "Root".to_string(),
            NodeKind::Paragraph => "Paragraph".to_string(),
            NodeKind::Heading { level } => format!("Heading({level})"),
            NodeKind::BlockQuote => "BlockQuote".to_string(),
            NodeKind::TableCell => "TableCell".to_string(),
            NodeKind::List { ordered, depth } => format!(
                "List({}, depth {depth})",
                if *ordered { "ordered" } else { "bullet" }
            ),
            NodeKind::ListItem { checkbox: None } => "ListItem".to_string(),
            NodeKind::ListItem {
                checkbox: Some(checked),
            } => format!("ListItem[{}]", if *checked { 'x' } else { ' ' }),
            NodeKind::CodeBlock { lang: None } => "CodeBlock".to_string(),
            NodeKind::CodeBlock { lang: Some(lang) } => format!("CodeBlock({lang})"),
            NodeKind::HorizontalRule => "HorizontalRule".to_string(),
            NodeKind::TextRun { text } => format!("Text {text:?}"),
            NodeKind::InlineCode => "InlineCode".to_string(),
            NodeKind::Image { src, .. } => format!("Image({src})"),
            NodeKind::LineBreak => "LineBreak".to_string(),
            NodeKind::Boundary => "Boundary".to_string(),
        };

        let flags = self.flags(id);
        let mut marks = vec![];
        if flags.hidden {
            marks.push("hidden");
        }
        if flags.non_editable {
            marks.push("non-editable");
        }
        if flags.chrome {
            marks.push("chrome");
        }

        let _ = write!(out, "{:indent$}{label}", "", indent = depth * 2);
        if !marks.is_empty() {
            let _ = write!(out, " {{{}}}", marks.join(", "));
        }
        out.push('\n');

        for &child in self.children(id) {
            self.outline_node(child, depth + 1, out);
        }
    }

    /// Anchor right before the first occurrence of `needle` inside a single
    /// text run.
    pub fn find_text(&self, needle: &str) -> Option<Anchor> {
        self.descendants(self.root()).find_map(|id| {
            let text = self.text(id)?;
            let byte = text.find(needle)?;
            Some(Anchor::new(id, text[..byte].chars().count()))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, NodeFlags, NodeKind};
    use crate::position::Anchor;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_replaces_atoms() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        doc.append_text(p, "a");
        doc.append_image(p, "i.png", "i");
        doc.append(p, NodeKind::LineBreak);
        doc.append(p, NodeKind::Boundary);
        doc.append_text(p, "b\u{200B}");
        doc.append(doc.root(), NodeKind::HorizontalRule);
        let q = doc.append(doc.root(), NodeKind::Paragraph);
        doc.append_inline_code(q, "x");

        assert_eq!(doc.plain_text(), "a\u{FFFC}\nb\n\nx");
    }

    #[test]
    fn empty_paragraph_is_an_empty_line() {
        let mut doc = Document::from_markdown("a");
        doc.insert_empty_paragraph(doc.root(), 1);
        assert_eq!(doc.plain_text(), "a\n");
    }

    #[test]
    fn outline_marks_flags_and_skips_detached() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let run = doc.append_text(p, "hi");
        doc.set_flags(run, NodeFlags::HIDDEN);
        let gone = doc.append(doc.root(), NodeKind::Paragraph);
        doc.detach(gone);

        assert_eq!(
            doc.outline(),
            "Root\n  Paragraph\n    Text \"hi\" {hidden}"
        );
    }

    #[test]
    fn find_text_counts_chars() {
        let doc = Document::from_markdown("héllo world");
        let anchor = doc.find_text("world").unwrap();
        assert_eq!(anchor.offset, 6);
        assert_eq!(doc.find_text("absent"), None::<Anchor>);
    }
}
