/// `![alt](src "title")`.
pub struct Image;

impl Image {
    pub const OPEN: &'static str = "![";
    pub const MIDDLE: &'static str = "](";
    pub const CLOSE: char = ')';
}
