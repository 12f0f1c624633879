/// A half-open byte range `[start, end)` into the source rope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Narrows the span by `skip` bytes at the front, never past its end.
    #[must_use]
    pub fn skip(self, skip: usize) -> Self {
        Self {
            start: (self.start + skip).min(self.end),
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_clamped() {
        let sp = Span::new(2, 5);
        assert_eq!(sp.skip(1), Span::new(3, 5));
        assert_eq!(sp.skip(10), Span::new(5, 5));
        assert!(sp.skip(10).is_empty());
    }

    #[test]
    fn inverted_span_has_zero_len() {
        assert_eq!(Span::new(5, 2).len(), 0);
    }
}
