use xi_rope::Rope;

use super::span::Span;

/// One physical source line and its byte span (newline included).
#[derive(Debug, Clone)]
pub struct LineRef {
    pub span: Span,
    pub text: String,
}

/// Iterates the rope line by line, keeping line terminators so spans stay
/// contiguous.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span::new(start, offset),
            text: line.into_owned(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_cover_the_whole_rope() {
        let rope = Rope::from("ab\ncd\n\nef");
        let lines: Vec<LineRef> = lines_with_spans(&rope).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].span, Span::new(0, 3));
        assert_eq!(lines[2].text, "\n");
        assert_eq!(lines[3].span, Span::new(7, 9));
    }
}
