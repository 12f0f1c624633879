#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

/// Fenced code syntax.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";

    /// Fence kind if the line (ignoring indentation) opens or closes a fence.
    pub fn sig(remainder: &str) -> Option<FenceKind> {
        let t = remainder.trim_start_matches(' ');
        if t.starts_with(Self::BACKTICKS) {
            Some(FenceKind::Backticks)
        } else if t.starts_with(Self::TILDES) {
            Some(FenceKind::Tildes)
        } else {
            None
        }
    }

    /// Info string of an opening fence, used as the code block language.
    pub fn lang(remainder: &str) -> Option<String> {
        let t = remainder.trim();
        let info = t
            .trim_start_matches('`')
            .trim_start_matches('~')
            .split_whitespace()
            .next()?;
        Some(info.to_string())
    }

    /// A closing fence carries no info string.
    pub fn closes(kind: FenceKind, remainder: &str) -> bool {
        if Self::sig(remainder) != Some(kind) {
            return false;
        }
        let fence_char = match kind {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        };
        remainder.trim().trim_start_matches(fence_char).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_fences_with_indent() {
        assert_eq!(CodeFence::sig("```rust"), Some(FenceKind::Backticks));
        assert_eq!(CodeFence::sig("  ~~~"), Some(FenceKind::Tildes));
        assert_eq!(CodeFence::sig("hello"), None);
    }

    #[test]
    fn reads_language() {
        assert_eq!(CodeFence::lang("```rust"), Some("rust".to_string()));
        assert_eq!(CodeFence::lang("``` js extra"), Some("js".to_string()));
        assert_eq!(CodeFence::lang("```"), None);
    }

    #[test]
    fn only_bare_matching_fence_closes() {
        assert!(CodeFence::closes(FenceKind::Backticks, "```"));
        assert!(CodeFence::closes(FenceKind::Tildes, "  ~~~~ "));
        assert!(!CodeFence::closes(FenceKind::Backticks, "~~~"));
        assert!(!CodeFence::closes(FenceKind::Backticks, "```rust"));
    }
}
