/// A line of three or more `-`, `*` or `_`, optionally space separated.
pub struct ThematicBreak;

impl ThematicBreak {
    pub const CHARS: [char; 3] = ['-', '*', '_'];

    pub fn matches(remainder: &str) -> bool {
        let indent = remainder.len() - remainder.trim_start_matches(' ').len();
        if indent > 3 {
            return false;
        }
        let mut marks = remainder.chars().filter(|c| *c != ' ');
        let Some(first) = marks.next() else {
            return false;
        };
        if !Self::CHARS.contains(&first) {
            return false;
        }
        let mut count = 1;
        for c in marks {
            if c != first {
                return false;
            }
            count += 1;
        }
        count >= 3
    }
}
