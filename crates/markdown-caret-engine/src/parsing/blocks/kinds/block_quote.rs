/// Blockquote syntax: one or more `>` prefixes, each optionally followed by
/// a space.
pub struct BlockQuote;

impl BlockQuote {
    pub const PREFIX: u8 = b'>';

    /// Returns `(depth, byte offset of the content)`.
    pub fn strip_prefixes(s: &str) -> (u8, usize) {
        let bytes = s.as_bytes();
        let mut depth = 0u8;
        let mut i = 0usize;
        loop {
            let mut j = i;
            while j < bytes.len() && j - i < 4 && bytes[j] == b' ' {
                j += 1;
            }
            if bytes.get(j) != Some(&Self::PREFIX) {
                return (depth, i);
            }
            depth = depth.saturating_add(1);
            i = j + 1;
            if bytes.get(i) == Some(&b' ') {
                i += 1;
            }
        }
    }
}
