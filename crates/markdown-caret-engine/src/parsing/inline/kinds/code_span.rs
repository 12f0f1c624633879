/// Inline code delimited by equal-length backtick runs.
pub struct CodeSpan;

impl CodeSpan {
    pub const TICK: char = '`';

    /// Strips one padding space from each side, as long as the content is
    /// not all spaces.
    pub fn trim_padding(inner: &str) -> (usize, usize) {
        let padded = inner.len() >= 2
            && inner.starts_with(' ')
            && inner.ends_with(' ')
            && !inner.chars().all(|c| c == ' ');
        if padded {
            (1, inner.len() - 1)
        } else {
            (0, inner.len())
        }
    }
}
