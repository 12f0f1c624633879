use crate::parsing::rope::{lines::LineRef, span::Span};

use super::kinds::{BlockQuote, CodeFence, FenceKind, Heading, ListMarker, ThematicBreak};

/// Local facts about one line, before any surrounding context is applied.
#[derive(Debug, Clone)]
pub struct LineClass {
    pub line: Span,
    /// Whitespace only after stripping quote prefixes.
    pub is_blank: bool,
    pub quote_depth: u8,
    /// Leading spaces of the raw line.
    pub raw_indent: usize,
    /// Leading spaces of the remainder.
    pub indent: usize,
    /// Line content after quote prefixes, without the line ending.
    pub remainder_span: Span,
    pub remainder_text: String,
    pub fence_sig: Option<FenceKind>,
    pub heading: Option<(u8, usize)>,
    pub thematic_break: bool,
    pub list_marker: Option<ListMarker>,
}

impl LineClass {
    /// Whether this line starts a new block even in the middle of a paragraph.
    #[must_use]
    pub fn opens_block(&self) -> bool {
        self.thematic_break
            || self.list_marker.is_some()
            || self.heading.is_some()
            || self.fence_sig.is_some()
    }
}

fn leading_spaces(s: &str) -> usize {
    s.len() - s.trim_start_matches(' ').len()
}

pub struct MarkdownLineClassifier;

impl MarkdownLineClassifier {
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let trimmed = lr.text.trim_end_matches(['\r', '\n']);
        let (quote_depth, idx) = BlockQuote::strip_prefixes(trimmed);
        let remainder = &trimmed[idx..];
        let is_blank = remainder.trim().is_empty();

        LineClass {
            line: lr.span,
            is_blank,
            quote_depth,
            raw_indent: leading_spaces(trimmed),
            indent: leading_spaces(remainder),
            remainder_span: Span::new(lr.span.start + idx, lr.span.start + trimmed.len()),
            remainder_text: remainder.to_string(),
            fence_sig: CodeFence::sig(remainder),
            heading: Heading::parse(remainder),
            thematic_break: ThematicBreak::matches(remainder),
            list_marker: ListMarker::parse(remainder),
        }
    }
}
