use crate::parsing::rope::span::Span;

use super::{
    cursor::Cursor,
    kinds::{Boundary, CodeSpan, Image},
    types::InlineNode,
};

/// Parses one line of inline content. `base` is the byte offset of `s` in
/// its source; text between constructs comes out as [`InlineNode::Text`].
pub fn parse_inline(base: usize, s: &str) -> Vec<InlineNode> {
    let mut cur = Cursor::new(s, base);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<InlineNode>, start: usize, end: usize) {
        if end > start {
            out.push(InlineNode::Text(Span::new(start, end)));
        }
    }

    while !cur.eof() {
        let node = try_parse_code_span(&mut cur)
            .or_else(|| try_parse_image(&mut cur))
            .or_else(|| try_parse_boundary(&mut cur));
        match node {
            Some(node) => {
                flush_text(&mut out, text_start, node.span().start);
                text_start = node.span().end;
                out.push(node);
            }
            None => {
                if cur.peek() == Some(CodeSpan::TICK) {
                    // An unmatched run is literal text as a whole.
                    cur.bump_while(|c| c == CodeSpan::TICK);
                } else {
                    cur.bump();
                }
            }
        }
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// Restores the cursor when no closing run of the same length exists.
fn try_parse_code_span(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if cur.peek() != Some(CodeSpan::TICK) {
        return None;
    }
    let saved = cur.clone();
    let start = cur.pos();
    let ticks = cur.bump_while(|c| c == CodeSpan::TICK);
    let inner_start = cur.pos();

    while !cur.eof() {
        if cur.peek() == Some(CodeSpan::TICK) {
            let close_at = cur.pos();
            if cur.bump_while(|c| c == CodeSpan::TICK) == ticks {
                let inner = &cur.s[inner_start - cur.base..close_at - cur.base];
                let (lo, hi) = CodeSpan::trim_padding(inner);
                if lo == hi {
                    break;
                }
                return Some(InlineNode::CodeSpan {
                    full: Span::new(start, cur.pos()),
                    inner: Span::new(inner_start + lo, inner_start + hi),
                });
            }
        } else {
            cur.bump();
        }
    }

    *cur = saved;
    None
}

fn try_parse_image(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(Image::OPEN) {
        return None;
    }
    let saved = cur.clone();
    let start = cur.pos();
    cur.bump();
    cur.bump();
    let alt_start = cur.pos();

    let parsed = (|| {
        let alt_end = cur.skip_past(Image::MIDDLE)?;
        if cur.s[alt_start - cur.base..alt_end - cur.base].contains(['[', ']']) {
            return None;
        }
        let target_start = cur.pos();
        let target_end = cur.skip_past(")")?;
        let target = &cur.s[target_start - cur.base..target_end - cur.base];
        let lead = target.len() - target.trim_start().len();
        let src_len = target.trim_start().split_whitespace().next()?.len();
        Some(InlineNode::Image {
            full: Span::new(start, cur.pos()),
            alt: Span::new(alt_start, alt_end),
            src: Span::new(target_start + lead, target_start + lead + src_len),
        })
    })();

    if parsed.is_none() {
        *cur = saved;
    }
    parsed
}

fn try_parse_boundary(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    cur.peek().filter(|c| Boundary::is_marker(*c))?;
    let start = cur.pos();
    cur.bump();
    Some(InlineNode::Boundary(Span::new(start, cur.pos())))
}
