use xi_rope::Rope;

use super::span::Span;

/// Copies the text under `sp` out of the rope.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    rope.slice_to_cow(sp.start..sp.end).into_owned()
}
