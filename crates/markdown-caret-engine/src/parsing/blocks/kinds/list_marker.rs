use std::sync::OnceLock;

use regex::Regex;

/// A list item opener: bullet or ordinal marker, optional task checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    pub checkbox: Option<bool>,
    /// Column of the marker.
    pub indent: usize,
    /// Column nested blocks must reach to belong to this item.
    pub content_indent: usize,
    /// Byte offset where the item's own text starts.
    pub text_start: usize,
}

impl ListMarker {
    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"^( *)([-*+]|\d{1,9}[.)])( +|$)(\[([ xX])\]( +|$))?")
                .expect("Invalid list marker regex")
        })
    }

    pub fn parse(remainder: &str) -> Option<Self> {
        let caps = Self::pattern().captures(remainder)?;
        let indent = caps.get(1).map_or(0, |m| m.len());
        let marker = caps.get(2)?.as_str();
        let spacing = caps.get(3).map_or(0, |m| m.end());
        let checkbox = caps.get(5).map(|m| m.as_str() != " ");
        let whole = caps.get(0).map_or(0, |m| m.end());

        Some(Self {
            ordered: marker.ends_with(['.', ')']),
            checkbox,
            indent,
            content_indent: spacing.max(indent + marker.len() + 1),
            text_start: whole,
        })
    }
}
