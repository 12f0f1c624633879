//! # Inline Parsing
//!
//! A cursor-based scanner over one line of paragraph text. Code spans are
//! raw zones and are tried first; images and zero-width boundary markers
//! come next; everything else is text.

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::parse_inline;
pub use types::InlineNode;
