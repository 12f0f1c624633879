//! Normalizes raw anchors into canonical positions.
//!
//! Resolution never fails outright: anchors on detached nodes or outside the
//! editable root fall back to the logical end of the document, and only an
//! empty document yields nothing.

use log::debug;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::NavError;
use crate::layout::LayoutOracle;
use crate::navigation::walker::{self, BlockWalk};

use super::stops::{BlockStops, NBSP, ZERO_WIDTH};
use super::{Anchor, Direction, Place, Position, Selection, Spot, Stop};

/// Where a caret sits relative to an inline code span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBoundary {
    OutsideLeft,
    InsideLeft,
    Inside,
    OutsideRight,
}

/// Resolves raw anchors against one document and its rendered layout.
pub struct Resolver<'a> {
    doc: &'a Document,
    oracle: &'a dyn LayoutOracle,
    tolerance: f32,
}

impl<'a> Resolver<'a> {
    pub fn new(doc: &'a Document, oracle: &'a dyn LayoutOracle, tolerance: f32) -> Self {
        Self {
            doc,
            oracle,
            tolerance,
        }
    }

    /// Normalizes a raw anchor. `None` only for a document without caret
    /// positions.
    pub fn resolve(&self, anchor: &Anchor, direction: Direction) -> Option<Place> {
        let spot = self.spot_or_end(anchor, direction)?;
        encode_spot(self.doc, spot)
    }

    pub fn resolve_selection(&self, selection: &Selection, direction: Direction) -> Option<Place> {
        let spot = self.spot_for_selection(Some(selection), direction)?;
        encode_spot(self.doc, spot)
    }

    /// The list item an anchor belongs to.
    ///
    /// An anchor sitting exactly at a nested sublist is ambiguous: it is both
    /// the end of the parent item and the start of the sublist. Moving
    /// backward keeps the parent. Moving forward descends into the first
    /// nested item only when the parent's end caret overlaps that item's
    /// first rendered line.
    pub fn resolve_list_item(&self, anchor: &Anchor, direction: Direction) -> Option<NodeId> {
        let doc = self.doc;
        if !doc.contains(anchor.node) || !doc.is_attached(anchor.node) {
            return None;
        }
        let item = doc.enclosing_list_item(anchor.node)?;
        if item != anchor.node || direction == Direction::Backward {
            return Some(item);
        }
        let Some(list) = doc
            .children(item)
            .get(anchor.offset)
            .copied()
            .filter(|c| matches!(doc.kind(*c), NodeKind::List { .. }))
        else {
            return Some(item);
        };
        let Some(nested) = doc
            .children(list)
            .iter()
            .copied()
            .find(|c| matches!(doc.kind(*c), NodeKind::ListItem { .. }))
        else {
            return Some(item);
        };

        let stops = BlockStops::collect(doc, item);
        let parent_end = stops
            .encode(stops.last())
            .and_then(|p| self.oracle.caret_rect(doc, &p));
        let first_line = self.oracle.lines(doc, nested, self.tolerance).into_iter().next();

        match (parent_end, first_line) {
            (Some(caret), Some(line)) if caret.top < line.bottom && line.top < caret.bottom => {
                debug!("ambiguous list anchor descends into {nested:?}");
                Some(nested)
            }
            _ => Some(item),
        }
    }

    pub fn classify_inline_code_boundary(&self, anchor: &Anchor) -> Option<(NodeId, CodeBoundary)> {
        let Spot::Text { block, stop } = self.spot_for_anchor(anchor, Direction::Forward).ok()? else {
            return None;
        };
        let stops = BlockStops::collect(self.doc, block);
        let after = stops.code_at(stop.k);
        let before = stops.code_before(stop.k);
        if stop.inside {
            let span = after?;
            let boundary = if before == Some(span) {
                CodeBoundary::Inside
            } else {
                CodeBoundary::InsideLeft
            };
            return Some((span, boundary));
        }
        match (after, before) {
            (Some(span), _) => Some((span, CodeBoundary::OutsideLeft)),
            (None, Some(span)) => Some((span, CodeBoundary::OutsideRight)),
            (None, None) => None,
        }
    }

    pub(crate) fn spot_for_selection(
        &self,
        selection: Option<&Selection>,
        direction: Direction,
    ) -> Option<Spot> {
        match selection {
            Some(Selection::Node(node)) if selectable(self.doc, *node) => Some(Spot::Selected(*node)),
            Some(Selection::Node(node)) => self.spot_or_end(&Anchor::new(*node, 0), direction),
            Some(other) => {
                let focus = other.focus()?;
                self.spot_or_end(&focus, direction)
            }
            None => document_end(self.doc).ok(),
        }
    }

    fn spot_or_end(&self, anchor: &Anchor, direction: Direction) -> Option<Spot> {
        match self.spot_for_anchor(anchor, direction) {
            Ok(spot) => Some(spot),
            Err(err) => {
                debug!("anchor {anchor:?} unresolvable ({err}), using document end");
                document_end(self.doc).ok()
            }
        }
    }

    pub(crate) fn spot_for_anchor(&self, anchor: &Anchor, direction: Direction) -> Result<Spot, NavError> {
        let doc = self.doc;
        if !doc.contains(anchor.node) {
            return Err(NavError::Detached(anchor.node));
        }
        doc.attachment(anchor.node)?;

        if let Some(excluded) = outermost_excluded(doc, anchor.node) {
            let parent = doc.parent(excluded).ok_or(NavError::Detached(excluded))?;
            let index = doc.index_in_parent(excluded).unwrap_or(0);
            return self.spot_for_anchor(&Anchor::new(parent, index), direction);
        }

        let node = anchor.node;
        let offset = anchor.offset.min(doc.max_offset(node));

        match doc.kind(node) {
            NodeKind::HorizontalRule => Ok(Spot::Beside {
                node,
                after: offset > 0,
            }),
            NodeKind::Root | NodeKind::BlockQuote | NodeKind::List { .. } => {
                container_spot(doc, node, offset)
            }
            NodeKind::TextRun { .. } | NodeKind::Boundary => match doc.text_block_of(node) {
                Some(block) => self.position_spot(&Position::TextOffset { run: node, offset }, block),
                None => self.spot_for_anchor(&parent_anchor(doc, node)?, direction),
            },
            NodeKind::Image { .. } | NodeKind::LineBreak => {
                let block = doc.text_block_of(node).ok_or(NavError::NotSelectable(node))?;
                let position = if offset == 0 {
                    Position::BeforeNode(node)
                } else {
                    Position::AfterNode(node)
                };
                self.position_spot(&position, block)
            }
            NodeKind::InlineCode => {
                let block = doc.text_block_of(node).ok_or(NavError::NotSelectable(node))?;
                let stops = BlockStops::collect(doc, block);
                let (start, end) = stops.locate(doc, node).ok_or(NavError::NotSelectable(node))?;
                let stop = match doc.children(node).get(offset) {
                    Some(child) => {
                        let k = stops.locate(doc, *child).map_or(end, |s| s.0);
                        Stop {
                            k,
                            inside: k < end,
                        }
                    }
                    None => Stop::outside(end),
                };
                let stop = Stop {
                    k: stop.k.max(start),
                    ..stop
                };
                Ok(Spot::text(block, stops.snap(stop)))
            }
            NodeKind::ListItem { .. }
                if doc
                    .first_block_child(node)
                    .is_some_and(|first| offset >= first) =>
            {
                self.list_item_block_spot(anchor, offset, direction)
            }
            NodeKind::CodeBlock { .. } => {
                let stops = BlockStops::collect(doc, node);
                if !stops.is_navigable() {
                    return container_spot(doc, doc.parent(node).ok_or(NavError::Detached(node))?, 0);
                }
                let stop = if offset == 0 { stops.first() } else { stops.last() };
                Ok(Spot::text(node, stop))
            }
            NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::TableCell
            | NodeKind::ListItem { .. } => {
                let stops = BlockStops::collect(doc, node);
                if !stops.is_navigable() {
                    let parent = doc.parent(node).ok_or(NavError::Detached(node))?;
                    let index = doc.index_in_parent(node).unwrap_or(0);
                    return container_spot(doc, parent, index);
                }
                let k = doc
                    .inline_children(node)
                    .get(offset)
                    .and_then(|child| stops.locate(doc, *child))
                    .map_or(stops.len(), |s| s.0);
                Ok(Spot::text(node, stops.snap(Stop::outside(k))))
            }
        }
    }

    fn list_item_block_spot(&self, anchor: &Anchor, offset: usize, direction: Direction) -> Result<Spot, NavError> {
        let doc = self.doc;
        let item = anchor.node;
        let at_sublist = doc.first_block_child(item) == Some(offset)
            && doc
                .children(item)
                .get(offset)
                .is_some_and(|c| matches!(doc.kind(*c), NodeKind::List { .. }));
        if !at_sublist {
            return container_spot(doc, item, offset);
        }

        let target = self.resolve_list_item(&Anchor::new(item, offset), direction);
        let stops = BlockStops::collect(doc, item);
        match target {
            Some(t) if t == item && stops.is_navigable() => Ok(Spot::text(item, stops.last())),
            Some(t) if t != item => {
                let walk = BlockWalk::new(doc);
                walk.at_or_after(t)
                    .map(|b| walker::start_spot(doc, b))
                    .ok_or(NavError::NoCaretPositions)
            }
            _ => container_spot(doc, item, offset),
        }
    }

    fn position_spot(&self, position: &Position, block: NodeId) -> Result<Spot, NavError> {
        let stops = BlockStops::collect(self.doc, block);
        if !stops.is_navigable() {
            let parent = self.doc.parent(block).ok_or(NavError::Detached(block))?;
            let index = self.doc.index_in_parent(block).unwrap_or(0);
            return container_spot(self.doc, parent, index);
        }
        let stop = stops
            .stop_of(self.doc, position)
            .unwrap_or_else(|| stops.last());
        Ok(Spot::text(block, stop))
    }
}

fn parent_anchor(doc: &Document, node: NodeId) -> Result<Anchor, NavError> {
    let parent = doc.parent(node).ok_or(NavError::Detached(node))?;
    Ok(Anchor::new(parent, doc.index_in_parent(node).unwrap_or(0)))
}

fn outermost_excluded(doc: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .filter(|n| doc.flags(*n).excludes())
        .last()
}

/// Caret spot for `(container, index)` when the container holds blocks.
fn container_spot(doc: &Document, container: NodeId, index: usize) -> Result<Spot, NavError> {
    let walk = BlockWalk::new(doc);
    let found = match doc.children(container).get(index) {
        Some(child) => walk.at_or_after(*child),
        None => walk.after_subtree(container),
    };
    match found {
        Some(block) => Ok(walker::start_spot(doc, block)),
        None => document_end(doc),
    }
}

pub(crate) fn document_end(doc: &Document) -> Result<Spot, NavError> {
    BlockWalk::new(doc)
        .last()
        .map(|b| walker::end_spot(doc, b))
        .ok_or(NavError::NoCaretPositions)
}

/// Whether `node` can hold a whole-unit selection right now.
pub(crate) fn selectable(doc: &Document, node: NodeId) -> bool {
    if !doc.contains(node) || !doc.is_attached(node) || is_ignorable(doc, node) {
        return false;
    }
    match doc.kind(node) {
        NodeKind::HorizontalRule => true,
        NodeKind::CodeBlock { .. } => BlockStops::collect(doc, node).is_navigable(),
        NodeKind::Image { .. } => doc
            .text_block_of(node)
            .is_some_and(|b| BlockStops::collect(doc, b).unit_of(node).is_some()),
        _ => false,
    }
}

/// Canonical position of a spot inside the live tree.
pub(crate) fn resolve_position(doc: &Document, position: &Position) -> Option<Spot> {
    let anchor_node = match *position {
        Position::TextOffset { run, .. } | Position::InsideListItem { run, .. } => run,
        Position::BeforeNode(n) | Position::AfterNode(n) => n,
    };
    if !doc.contains(anchor_node) || !doc.is_attached(anchor_node) {
        return None;
    }
    if matches!(doc.kind(anchor_node), NodeKind::HorizontalRule) {
        return Some(Spot::Beside {
            node: anchor_node,
            after: matches!(position, Position::AfterNode(_)),
        });
    }
    let block = doc.text_block_of(anchor_node)?;
    let stops = BlockStops::collect(doc, block);
    let stop = stops.stop_of(doc, position)?;
    Some(Spot::text(block, stop))
}

pub(crate) fn encode_spot(doc: &Document, spot: Spot) -> Option<Place> {
    match spot {
        Spot::Text { block, stop } => BlockStops::collect(doc, block).encode(stop).map(Place::Caret),
        Spot::Beside { node, after: false } => Some(Place::Caret(Position::BeforeNode(node))),
        Spot::Beside { node, after: true } => Some(Place::Caret(Position::AfterNode(node))),
        Spot::Selected(node) => Some(Place::Selected(node)),
    }
}

pub(crate) fn place_spot(doc: &Document, place: &Place) -> Option<Spot> {
    match place {
        Place::Caret(position) => resolve_position(doc, position),
        Place::Selected(node) if selectable(doc, *node) => Some(Spot::Selected(*node)),
        Place::Selected(_) => None,
    }
}

/// Whether a spot carried over from an earlier move still addresses the
/// live tree.
pub(crate) fn spot_is_live(doc: &Document, spot: Spot) -> bool {
    let node = match spot {
        Spot::Text { block, .. } => block,
        Spot::Beside { node, .. } | Spot::Selected(node) => node,
    };
    doc.contains(node)
        && doc.is_attached(node)
        && encode_spot(doc, spot).and_then(|p| place_spot(doc, &p)) == Some(spot)
}

/// The raw selection a surface should hold for a spot.
pub(crate) fn selection_for(doc: &Document, spot: Spot) -> Option<Selection> {
    let anchor = match encode_spot(doc, spot)? {
        Place::Selected(node) => return Some(Selection::Node(node)),
        Place::Caret(position) => anchor_for(doc, &position)?,
    };
    Some(Selection::Caret(anchor))
}

pub(crate) fn anchor_for(doc: &Document, position: &Position) -> Option<Anchor> {
    match *position {
        Position::TextOffset { run, offset } | Position::InsideListItem { run, offset, .. } => {
            Some(Anchor::new(run, offset))
        }
        Position::BeforeNode(n) if matches!(doc.kind(n), NodeKind::HorizontalRule) => Some(Anchor::new(n, 0)),
        Position::AfterNode(n) if matches!(doc.kind(n), NodeKind::HorizontalRule) => Some(Anchor::new(n, 1)),
        Position::BeforeNode(n) => Some(Anchor::new(doc.parent(n)?, doc.index_in_parent(n)?)),
        Position::AfterNode(n) => Some(Anchor::new(doc.parent(n)?, doc.index_in_parent(n)? + 1)),
    }
}

/// Re-normalizes a position against the live tree. Idempotent.
pub fn normalize(doc: &Document, position: &Position) -> Option<Place> {
    let spot = resolve_position(doc, position)?;
    encode_spot(doc, spot)
}

/// Whether the caret should pass over `node` as if it were absent.
pub fn is_ignorable(doc: &Document, node: NodeId) -> bool {
    if !doc.contains(node) {
        return true;
    }
    if outermost_excluded(doc, node).is_some() {
        return true;
    }
    match doc.kind(node) {
        NodeKind::TextRun { text } => {
            if text.is_empty() || text.chars().all(|c| ZERO_WIDTH.contains(&c)) {
                return true;
            }
            let whitespace_only = text.chars().all(char::is_whitespace) && !text.contains(NBSP);
            if !whitespace_only {
                return false;
            }
            match doc.parent(node).map(|p| doc.kind(p)) {
                Some(NodeKind::ListItem { .. }) => text.contains('\n'),
                Some(kind) => !(kind.is_text_block() || matches!(kind, NodeKind::InlineCode)),
                None => true,
            }
        }
        NodeKind::Boundary => doc
            .text_block_of(node)
            .is_none_or(|b| !BlockStops::collect(doc, b).units.is_empty()),
        _ => false,
    }
}

/// Offset of a place in [`Document::plain_text`].
pub fn plain_offset(doc: &Document, place: &Place) -> Option<usize> {
    let spot = place_spot(doc, place)?;
    spot_offset(doc, spot)
}

pub(crate) fn spot_offset(doc: &Document, spot: Spot) -> Option<usize> {
    let (target, within) = match spot {
        Spot::Text { block, stop } => (block, stop.k),
        Spot::Beside { node, .. } => (node, 0),
        Spot::Selected(node) if doc.kind(node).is_image() => {
            let block = doc.text_block_of(node)?;
            (block, BlockStops::collect(doc, block).unit_of(node)?)
        }
        Spot::Selected(node) => (node, 0),
    };

    let mut base = 0;
    for block in BlockWalk::new(doc).blocks() {
        if *block == target {
            return Some(base + within);
        }
        base += walker::block_len(doc, *block) + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeFlags;
    use crate::layout::{LineBand, MonospaceLayout, MonospaceMetrics};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn oracle() -> MonospaceLayout {
        MonospaceLayout::new(MonospaceMetrics::default())
    }

    fn paragraph_with(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let run = doc.append_text(p, text);
        (p, run)
    }

    /// Fixed-width layout that can report one block's first line on another
    /// block's row, like a renderer that draws a sublist inline.
    struct RaisedBlock {
        inner: MonospaceLayout,
        block: NodeId,
        band: Option<LineBand>,
    }

    impl LayoutOracle for RaisedBlock {
        fn caret_rect(&self, doc: &Document, position: &Position) -> Option<crate::layout::Rect> {
            self.inner.caret_rect(doc, position)
        }

        fn node_rect(&self, doc: &Document, node: NodeId) -> Option<crate::layout::Rect> {
            self.inner.node_rect(doc, node)
        }

        fn client_rects(&self, doc: &Document, block: NodeId) -> Vec<crate::layout::Rect> {
            self.inner.client_rects(doc, block)
        }

        fn lines(&self, doc: &Document, block: NodeId, tolerance: f32) -> Vec<LineBand> {
            match self.band {
                Some(band) if block == self.block => vec![band],
                _ => self.inner.lines(doc, block, tolerance),
            }
        }

        fn probe(&self, doc: &Document, x: f32, y: f32) -> Option<Position> {
            self.inner.probe(doc, x, y)
        }

        fn line_height(&self) -> f32 {
            self.inner.line_height()
        }
    }

    /// `- a` with a nested `- b`: (item, outer run, nested item, nested run).
    fn nested_list(doc: &mut Document) -> (NodeId, NodeId, NodeId, NodeId) {
        let list = doc.append(
            doc.root(),
            NodeKind::List {
                ordered: false,
                depth: 0,
            },
        );
        let item = doc.append(list, NodeKind::ListItem { checkbox: None });
        let a = doc.append_text(item, "a");
        let sublist = doc.append(
            item,
            NodeKind::List {
                ordered: false,
                depth: 1,
            },
        );
        let nested = doc.append(sublist, NodeKind::ListItem { checkbox: None });
        let b = doc.append_text(nested, "b");
        (item, a, nested, b)
    }

    #[rstest]
    #[case::forward_on_separate_rows(Direction::Forward, false, false)]
    #[case::backward_on_separate_rows(Direction::Backward, false, false)]
    #[case::backward_on_shared_row(Direction::Backward, true, false)]
    #[case::forward_on_shared_row(Direction::Forward, true, true)]
    fn anchor_at_sublist_picks_item_by_geometry(
        #[case] direction: Direction,
        #[case] shared_row: bool,
        #[case] descends: bool,
    ) {
        let mut doc = Document::new();
        let (item, a, nested, b) = nested_list(&mut doc);
        let layout = RaisedBlock {
            inner: oracle(),
            block: nested,
            band: shared_row.then_some(LineBand {
                top: 0.0,
                bottom: 16.0,
                left: 0.0,
                right: 64.0,
            }),
        };
        let resolver = Resolver::new(&doc, &layout, 3.0);
        let anchor = Anchor::new(item, 1);

        let expected = if descends {
            (
                nested,
                Position::InsideListItem {
                    item: nested,
                    run: b,
                    offset: 0,
                },
            )
        } else {
            (
                item,
                Position::InsideListItem {
                    item,
                    run: a,
                    offset: 1,
                },
            )
        };
        assert_eq!(resolver.resolve_list_item(&anchor, direction), Some(expected.0));
        assert_eq!(resolver.resolve(&anchor, direction), Some(Place::Caret(expected.1)));
    }

    #[test]
    fn anchor_inside_item_text_keeps_its_item() {
        let mut doc = Document::new();
        let (item, a, nested, b) = nested_list(&mut doc);
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver.resolve_list_item(&Anchor::new(a, 1), Direction::Forward),
            Some(item)
        );
        assert_eq!(
            resolver.resolve_list_item(&Anchor::new(b, 0), Direction::Backward),
            Some(nested)
        );
    }

    #[test]
    fn text_anchor_resolves_to_itself() {
        let mut doc = Document::new();
        let (_, run) = paragraph_with(&mut doc, "abc");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver.resolve(&Anchor::new(run, 2), Direction::Forward),
            Some(Place::Caret(Position::TextOffset { run, offset: 2 }))
        );
    }

    #[test]
    fn out_of_range_offset_is_clamped() {
        let mut doc = Document::new();
        let (_, run) = paragraph_with(&mut doc, "abc");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver.resolve(&Anchor::new(run, 42), Direction::Forward),
            Some(Place::Caret(Position::TextOffset { run, offset: 3 }))
        );
    }

    #[test]
    fn detached_anchor_falls_back_to_document_end() {
        let mut doc = Document::new();
        let (_, first) = paragraph_with(&mut doc, "ab");
        let (_, last) = paragraph_with(&mut doc, "cd");
        let (gone, _) = paragraph_with(&mut doc, "zz");
        doc.detach(gone);
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_ne!(first, last);
        assert_eq!(
            resolver.resolve(&Anchor::new(gone, 0), Direction::Forward),
            Some(Place::Caret(Position::TextOffset {
                run: last,
                offset: 2
            }))
        );
    }

    #[test]
    fn empty_document_resolves_to_nothing() {
        let doc = Document::new();
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);
        assert_eq!(resolver.resolve(&Anchor::new(doc.root(), 0), Direction::Forward), None);
    }

    #[test]
    fn root_anchor_lands_at_start_of_indexed_block() {
        let mut doc = Document::new();
        paragraph_with(&mut doc, "ab");
        let (_, second) = paragraph_with(&mut doc, "cd");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver.resolve(&Anchor::new(doc.root(), 1), Direction::Forward),
            Some(Place::Caret(Position::TextOffset {
                run: second,
                offset: 0
            }))
        );
        assert_eq!(
            resolver.resolve(&Anchor::new(doc.root(), 2), Direction::Forward),
            Some(Place::Caret(Position::TextOffset {
                run: second,
                offset: 2
            }))
        );
    }

    #[test]
    fn hidden_node_climbs_to_parent_offset() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let a = doc.append_text(p, "a");
        let hidden = doc.append_text(p, "secret");
        doc.set_flags(hidden, NodeFlags::HIDDEN);
        doc.append_text(p, "b");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert!(is_ignorable(&doc, hidden));
        assert_eq!(
            resolver.resolve(&Anchor::new(hidden, 3), Direction::Forward),
            Some(Place::Caret(Position::TextOffset { run: a, offset: 1 }))
        );
    }

    #[test]
    fn image_selection_resolves_as_unit() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let image = doc.append_image(p, "a.png", "a");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver.resolve_selection(&Selection::Node(image), Direction::Forward),
            Some(Place::Selected(image))
        );
        assert_eq!(
            resolver.resolve(&Anchor::new(p, 0), Direction::Forward),
            Some(Place::Caret(Position::BeforeNode(image)))
        );
    }

    #[test]
    fn range_collapses_to_focus() {
        let mut doc = Document::new();
        let (_, run) = paragraph_with(&mut doc, "abcd");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        let range = Selection::Range {
            anchor: Anchor::new(run, 0),
            focus: Anchor::new(run, 3),
        };
        assert_eq!(
            resolver.resolve_selection(&range, Direction::Forward),
            Some(Place::Caret(Position::TextOffset { run, offset: 3 }))
        );
    }

    #[test]
    fn normalize_is_idempotent_for_code_edges() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let a = doc.append_text(p, "a");
        let code = doc.append_inline_code(p, "x");
        let x = doc.first_text_run(code).unwrap();

        let once = normalize(&doc, &Position::TextOffset { run: x, offset: 1 }).unwrap();
        assert_eq!(once, Place::Caret(Position::AfterNode(code)));
        let Place::Caret(position) = once else {
            panic!("expected caret");
        };
        assert_eq!(normalize(&doc, &position), Some(once));
        assert_eq!(
            normalize(&doc, &Position::TextOffset { run: a, offset: 1 }),
            Some(Place::Caret(Position::TextOffset { run: a, offset: 1 }))
        );
    }

    // ============ Inline code boundary tests ============

    #[rstest]
    #[case(1, 1, Some(CodeBoundary::OutsideLeft))]
    #[case(2, 0, Some(CodeBoundary::InsideLeft))]
    #[case(2, 1, Some(CodeBoundary::Inside))]
    #[case(2, 2, Some(CodeBoundary::OutsideRight))]
    #[case(1, 0, None)]
    fn classifies_code_boundaries(
        #[case] which_run: usize,
        #[case] offset: usize,
        #[case] expected: Option<CodeBoundary>,
    ) {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        let a = doc.append_text(p, "a");
        let code = doc.append_inline_code(p, "xy");
        let x = doc.first_text_run(code).unwrap();
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        let run = if which_run == 1 { a } else { x };
        let got = resolver
            .classify_inline_code_boundary(&Anchor::new(run, offset))
            .map(|(_, b)| b);
        assert_eq!(got, expected);
    }

    #[test]
    fn container_anchor_in_code_span_prefers_inside() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        doc.append_text(p, "a");
        let code = doc.append_inline_code(p, "x");
        let layout = oracle();
        let resolver = Resolver::new(&doc, &layout, 3.0);

        assert_eq!(
            resolver
                .classify_inline_code_boundary(&Anchor::new(code, 0))
                .map(|(_, b)| b),
            Some(CodeBoundary::InsideLeft)
        );
        assert_eq!(
            resolver
                .classify_inline_code_boundary(&Anchor::new(p, 1))
                .map(|(_, b)| b),
            Some(CodeBoundary::OutsideLeft)
        );
    }

    // ============ Ignorable tests ============

    #[test]
    fn whitespace_between_blocks_is_ignorable() {
        let mut doc = Document::new();
        let stray = doc.append_text(doc.root(), "\n  ");
        let (_, run) = paragraph_with(&mut doc, " ");
        assert!(is_ignorable(&doc, stray));
        assert!(!is_ignorable(&doc, run));
    }

    #[test]
    fn nbsp_placeholder_is_kept() {
        let mut doc = Document::new();
        let list = doc.append(
            doc.root(),
            NodeKind::List {
                ordered: false,
                depth: 0,
            },
        );
        let item = doc.append(list, NodeKind::ListItem { checkbox: None });
        let nbsp = doc.append_text(item, "\u{00A0}");
        let item2 = doc.append(list, NodeKind::ListItem { checkbox: None });
        doc.append_text(item2, "b");
        let formatting = doc.append_text(item2, "\n   ");

        assert!(!is_ignorable(&doc, nbsp));
        assert!(is_ignorable(&doc, formatting));
    }

    #[test]
    fn boundary_is_ignorable_only_beside_content() {
        let mut doc = Document::new();
        let empty = doc.append(doc.root(), NodeKind::Paragraph);
        let lone = doc.append(empty, NodeKind::Boundary);
        let full = doc.append(doc.root(), NodeKind::Paragraph);
        let extra = doc.append(full, NodeKind::Boundary);
        doc.append_text(full, "x");

        assert!(!is_ignorable(&doc, lone));
        assert!(is_ignorable(&doc, extra));
    }

    #[test]
    fn chrome_subtree_is_ignorable() {
        let mut doc = Document::new();
        let p = doc.append(doc.root(), NodeKind::Paragraph);
        doc.set_flags(p, NodeFlags::CHROME);
        let run = doc.append_text(p, "toolbar");
        assert!(is_ignorable(&doc, run));
    }

    // ============ Plain offset tests ============

    #[test]
    fn plain_offsets_follow_plain_text() {
        let mut doc = Document::new();
        paragraph_with(&mut doc, "ab");
        let (_, run) = paragraph_with(&mut doc, "cd");
        assert_eq!(doc.plain_text(), "ab\ncd");
        assert_eq!(
            plain_offset(&doc, &Place::Caret(Position::TextOffset { run, offset: 1 })),
            Some(4)
        );
    }
}
