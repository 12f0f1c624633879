//! Turns leaf blocks into a [`Document`] tree.

use xi_rope::Rope;

use crate::document::{Document, NodeId, NodeKind};

use super::blocks::kinds::Heading;
use super::blocks::{BlockKind, BlockNode, ContainerFrame};
use super::inline::{InlineNode, parse_inline};
use super::rope::{Span, slice_to_string};

pub struct Assembler<'a> {
    rope: &'a Rope,
    doc: Document,
    /// Open container frames and the nodes built for them.
    open: Vec<(u32, NodeId)>,
}

impl<'a> Assembler<'a> {
    pub fn new(rope: &'a Rope) -> Self {
        Self {
            rope,
            doc: Document::new(),
            open: vec![],
        }
    }

    pub fn push(&mut self, block: &BlockNode) {
        let parent = self.enter(&block.containers);
        let doc = &mut self.doc;
        match &block.kind {
            BlockKind::Paragraph => {
                let p = doc.append(parent, NodeKind::Paragraph);
                self.inline(p, &block.lines);
            }
            BlockKind::ItemText => self.inline(parent, &block.lines),
            BlockKind::Heading { level } => {
                let h = doc.append(parent, NodeKind::Heading { level: *level });
                if let Some(line) = block.lines.first() {
                    let raw = slice_to_string(self.rope, *line);
                    self.emit_inline(h, Heading::strip_closing(&raw));
                }
            }
            BlockKind::FencedCode { lang, .. } => {
                let code = doc.append(parent, NodeKind::CodeBlock { lang: lang.clone() });
                let text = block
                    .lines
                    .iter()
                    .map(|sp| slice_to_string(self.rope, *sp))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.doc.append_text(code, &text);
            }
            BlockKind::ThematicBreak => {
                doc.append(parent, NodeKind::HorizontalRule);
            }
        }
    }

    pub fn finish(mut self) -> Document {
        let root = self.doc.root();
        if self.doc.children(root).is_empty() {
            self.doc.insert_empty_paragraph(root, 0);
        }
        self.doc.ensure_placeholders();
        self.doc
    }

    fn current(&self) -> NodeId {
        self.open.last().map_or(self.doc.root(), |(_, n)| *n)
    }

    /// Reuses open containers the block shares and builds the rest.
    fn enter(&mut self, frames: &[ContainerFrame]) -> NodeId {
        let shared = self
            .open
            .iter()
            .zip(frames)
            .take_while(|((id, _), frame)| *id == frame.id())
            .count();
        self.open.truncate(shared);

        for frame in &frames[shared..] {
            let parent = self.current();
            let node = match frame {
                ContainerFrame::BlockQuote { .. } => self.doc.append(parent, NodeKind::BlockQuote),
                ContainerFrame::ListItem {
                    ordered, checkbox, ..
                } => {
                    let list = self.list_for(parent, *ordered);
                    self.doc.append(
                        list,
                        NodeKind::ListItem {
                            checkbox: *checkbox,
                        },
                    )
                }
            };
            self.open.push((frame.id(), node));
        }
        self.current()
    }

    /// The list a new item joins: the parent's trailing list of the same
    /// kind, or a fresh one.
    fn list_for(&mut self, parent: NodeId, ordered: bool) -> NodeId {
        let doc = &self.doc;
        if let Some(&last) = doc.children(parent).last()
            && matches!(doc.kind(last), NodeKind::List { ordered: o, .. } if *o == ordered)
        {
            return last;
        }
        let depth = std::iter::once(parent)
            .chain(doc.ancestors(parent))
            .filter(|n| matches!(doc.kind(*n), NodeKind::List { .. }))
            .count();
        self.doc.append(parent, NodeKind::List { ordered, depth })
    }

    /// Joins paragraph lines: soft wraps become a space, hard breaks
    /// (two trailing spaces or a backslash) a [`NodeKind::LineBreak`].
    fn inline(&mut self, block: NodeId, lines: &[Span]) {
        let last = lines.len().saturating_sub(1);
        let mut prev_hard = false;
        for (i, sp) in lines.iter().enumerate() {
            let raw = slice_to_string(self.rope, *sp);
            let line = if i == 0 { raw.as_str() } else { raw.trim_start() };
            let hard = i < last && (line.ends_with("  ") || line.ends_with('\\'));
            let content = match line.strip_suffix('\\') {
                Some(stripped) if hard => stripped,
                _ => line,
            }
            .trim_end_matches(' ');

            if i > 0 && !prev_hard && !content.is_empty() && !self.doc.inline_children(block).is_empty() {
                self.doc.push_text(block, " ");
            }
            self.emit_inline(block, content);
            if hard {
                self.doc.append(block, NodeKind::LineBreak);
            }
            prev_hard = hard;
        }
    }

    fn emit_inline(&mut self, block: NodeId, s: &str) {
        for node in parse_inline(0, s) {
            let slice = |sp: Span| &s[sp.start..sp.end];
            match node {
                InlineNode::Text(sp) => {
                    self.doc.push_text(block, slice(sp));
                }
                InlineNode::CodeSpan { inner, .. } => {
                    self.doc.append_inline_code(block, slice(inner));
                }
                InlineNode::Image { alt, src, .. } => {
                    self.doc.append_image(block, slice(src), slice(alt));
                }
                InlineNode::Boundary(_) => {
                    self.doc.append(block, NodeKind::Boundary);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, NodeKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn assembles_every_block_kind() {
        let doc = Document::from_markdown(
            "# Title\n\nSome `code` and ![pic](p.png)\nnext  \nline\n\n- [x] done\n- item\n  - nested\n\n> quoted\n\n```rust\nfn main() {}\n```\n\n---",
        );
        insta::assert_snapshot!(doc.outline(), @r#"
Root
  Heading(1)
    Text "Title"
  Paragraph
    Text "Some "
    InlineCode
      Text "code"
    Text " and "
    Image(p.png)
    Text " next"
    LineBreak
    Text "line"
  List(bullet, depth 0)
    ListItem[x]
      Text "done"
    ListItem
      Text "item"
      List(bullet, depth 1)
        ListItem
          Text "nested"
  BlockQuote
    Paragraph
      Text "quoted"
  CodeBlock(rust)
    Text "fn main() {}"
  HorizontalRule
"#);
    }

    #[test]
    fn empty_source_gets_an_empty_paragraph() {
        let doc = Document::from_markdown("");
        assert_eq!(doc.outline(), "Root\n  Paragraph\n    Boundary");
    }

    #[test]
    fn empty_item_with_sublist_gets_placeholder() {
        let doc = Document::from_markdown("-\n  - b");
        insta::assert_snapshot!(doc.outline(), @r#"
Root
  List(bullet, depth 0)
    ListItem
      Boundary
      List(bullet, depth 1)
        ListItem
          Text "b"
"#);
    }

    #[test]
    fn ordered_and_bullet_items_form_separate_lists() {
        let doc = Document::from_markdown("- a\n1. b");
        let kinds: Vec<NodeKind> = doc
            .children(doc.root())
            .iter()
            .map(|c| doc.kind(*c).clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::List {
                    ordered: false,
                    depth: 0
                },
                NodeKind::List {
                    ordered: true,
                    depth: 0
                },
            ]
        );
    }

    #[test]
    fn backslash_hard_break() {
        let doc = Document::from_markdown("a\\\nb");
        let p = doc.children(doc.root())[0];
        let kinds: Vec<bool> = doc
            .children(p)
            .iter()
            .map(|c| matches!(doc.kind(*c), NodeKind::LineBreak))
            .collect();
        assert_eq!(kinds, vec![false, true, false]);
        assert_eq!(doc.plain_text(), "a\nb");
    }

    #[test]
    fn soft_wrap_joins_with_space() {
        let doc = Document::from_markdown("one\ntwo");
        assert_eq!(doc.plain_text(), "one two");
    }

    #[test]
    fn closing_heading_hashes_are_dropped() {
        let doc = Document::from_markdown("## Title ##");
        assert_eq!(doc.plain_text(), "Title");
    }

    #[test]
    fn multi_line_code_block_is_one_run() {
        let doc = Document::from_markdown("```\na\n\nb\n```");
        let code = doc.children(doc.root())[0];
        assert_eq!(doc.children(code).len(), 1);
        assert_eq!(doc.plain_text(), "a\n\nb");
    }
}
