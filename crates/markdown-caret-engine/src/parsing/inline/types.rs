use crate::parsing::rope::span::Span;

/// An inline node. All spans are byte offsets into the parsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(Span),
    CodeSpan {
        full: Span,
        inner: Span,
    },
    Image {
        full: Span,
        alt: Span,
        src: Span,
    },
    /// A zero-width character that marks a caret boundary.
    Boundary(Span),
}

impl InlineNode {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            InlineNode::Text(sp) | InlineNode::Boundary(sp) => *sp,
            InlineNode::CodeSpan { full, .. } | InlineNode::Image { full, .. } => *full,
        }
    }
}
