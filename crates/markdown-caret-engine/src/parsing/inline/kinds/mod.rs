pub mod boundary;
pub mod code_span;
pub mod image;

pub use boundary::Boundary;
pub use code_span::CodeSpan;
pub use image::Image;
