use crate::position::stops::ZERO_WIDTH;

/// Zero-width characters that authors use to mark caret boundaries.
pub struct Boundary;

impl Boundary {
    pub fn is_marker(c: char) -> bool {
        ZERO_WIDTH.contains(&c)
    }
}
