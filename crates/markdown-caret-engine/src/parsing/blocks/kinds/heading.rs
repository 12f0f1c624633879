/// ATX heading syntax: one to six `#` followed by a space or end of line.
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: usize = 6;

    /// Returns `(level, byte offset of the heading text)`.
    pub fn parse(remainder: &str) -> Option<(u8, usize)> {
        let indent = remainder.len() - remainder.trim_start_matches(' ').len();
        if indent > 3 {
            return None;
        }
        let rest = &remainder[indent..];
        let level = rest.chars().take_while(|c| *c == Self::MARKER).count();
        if level == 0 || level > Self::MAX_LEVEL {
            return None;
        }
        let after = &rest[level..];
        if !after.is_empty() && !after.starts_with(' ') {
            return None;
        }
        let text_start = indent + level + (after.len() - after.trim_start_matches(' ').len());
        Some((level as u8, text_start))
    }

    /// Drops an optional closing sequence of `#`s.
    pub fn strip_closing(text: &str) -> &str {
        let text = text.trim_end();
        let without = text.trim_end_matches(Self::MARKER);
        if without.len() == text.len() {
            return text;
        }
        if without.is_empty() || without.ends_with(' ') {
            without.trim_end()
        } else {
            text
        }
    }
}
