use super::kinds::ListMarker;
use super::types::ContainerFrame;

/// The open containers, outermost first.
#[derive(Debug, Default, Clone)]
pub struct ContainerPath {
    frames: Vec<ContainerFrame>,
    next_id: u32,
}

impl ContainerPath {
    pub fn frames(&self) -> &[ContainerFrame] {
        &self.frames
    }

    #[must_use]
    pub fn quote_depth(&self) -> u8 {
        let quotes = self
            .frames
            .iter()
            .filter(|f| matches!(f, ContainerFrame::BlockQuote { .. }))
            .count();
        u8::try_from(quotes).unwrap_or(u8::MAX)
    }

    /// Opens or closes quotes until exactly `depth` are open.
    ///
    /// Closing a quote closes everything nested in it. Opening one first
    /// closes list items the raw line is not indented into.
    pub fn set_quote_depth(&mut self, depth: u8, raw_indent: usize) {
        let current = self.quote_depth();
        if depth < current {
            let cut = self
                .frames
                .iter()
                .enumerate()
                .filter(|(_, f)| matches!(f, ContainerFrame::BlockQuote { .. }))
                .nth(usize::from(depth))
                .map_or(self.frames.len(), |(i, _)| i);
            self.frames.truncate(cut);
        } else if depth > current {
            self.close_items_deeper_than(raw_indent);
            for _ in current..depth {
                let id = self.fresh_id();
                self.frames.push(ContainerFrame::BlockQuote { id });
            }
        }
    }

    /// Closes the trailing list items whose content starts right of `indent`.
    pub fn close_items_deeper_than(&mut self, indent: usize) {
        while let Some(ContainerFrame::ListItem { content_indent, .. }) = self.frames.last() {
            if *content_indent <= indent {
                break;
            }
            self.frames.pop();
        }
    }

    pub fn push_item(&mut self, marker: &ListMarker) {
        let id = self.fresh_id();
        self.frames.push(ContainerFrame::ListItem {
            id,
            ordered: marker.ordered,
            checkbox: marker.checkbox,
            marker_indent: marker.indent,
            content_indent: marker.content_indent,
        });
    }

    fn fresh_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(src: &str) -> ListMarker {
        ListMarker::parse(src).unwrap()
    }

    #[test]
    fn sibling_items_replace_each_other() {
        let mut path = ContainerPath::default();
        path.push_item(&marker("- a"));
        path.close_items_deeper_than(0);
        assert!(path.frames().is_empty());
    }

    #[test]
    fn nested_item_survives_its_own_indent() {
        let mut path = ContainerPath::default();
        path.push_item(&marker("- a"));
        path.push_item(&marker("  - b"));
        path.close_items_deeper_than(2);
        assert_eq!(path.frames().len(), 1);
    }

    #[test]
    fn closing_a_quote_closes_its_items() {
        let mut path = ContainerPath::default();
        path.set_quote_depth(1, 0);
        path.push_item(&marker("- a"));
        path.set_quote_depth(2, 0);
        assert_eq!(path.quote_depth(), 2);
        assert_eq!(path.frames().len(), 2);

        path.set_quote_depth(0, 0);
        assert!(path.frames().is_empty());
    }

    #[test]
    fn frame_ids_are_unique() {
        let mut path = ContainerPath::default();
        path.push_item(&marker("- a"));
        let first = path.frames()[0].id();
        path.close_items_deeper_than(0);
        path.push_item(&marker("- b"));
        assert_ne!(path.frames()[0].id(), first);
    }
}
