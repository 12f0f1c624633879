/// Char-aware scanning over one line of inline content.
#[derive(Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    /// Byte offset of `s` in its source, added to reported positions.
    pub base: usize,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn rest(&self) -> &'a str {
        self.s.get(self.i..).unwrap_or("")
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Consumes characters while `pred` holds; returns how many.
    pub fn bump_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut n = 0;
        while self.peek().is_some_and(&pred) {
            self.bump();
            n += 1;
        }
        n
    }

    /// Advances past the next occurrence of `pat`, returning the position
    /// where it started. Leaves the cursor untouched when absent.
    pub fn skip_past(&mut self, pat: &str) -> Option<usize> {
        let found = self.rest().find(pat)?;
        let at = self.pos() + found;
        self.i += found + pat.len();
        Some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_whole_characters() {
        let mut cur = Cursor::new("é\u{200B}x", 10);
        assert_eq!(cur.bump(), Some('é'));
        assert_eq!(cur.pos(), 12);
        assert_eq!(cur.bump(), Some('\u{200B}'));
        assert_eq!(cur.peek(), Some('x'));
    }

    #[test]
    fn bump_while_counts() {
        let mut cur = Cursor::new("```x", 0);
        assert_eq!(cur.bump_while(|c| c == '`'), 3);
        assert_eq!(cur.rest(), "x");
    }

    #[test]
    fn skip_past_reports_match_start() {
        let mut cur = Cursor::new("ab](c", 5);
        assert_eq!(cur.skip_past("]("), Some(7));
        assert_eq!(cur.rest(), "c");
        assert_eq!(cur.skip_past("zz"), None);
        assert_eq!(cur.rest(), "c");
    }

    #[test]
    fn empty_input_is_eof() {
        let mut cur = Cursor::new("", 3);
        assert!(cur.eof());
        assert_eq!(cur.bump(), None);
        assert_eq!(cur.pos(), 3);
    }
}
