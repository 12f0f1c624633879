//! # Navigation
//!
//! The [`Navigator`] turns an arrow key into a new selection. Every move
//! follows the same shape:
//!
//! 1. resolve the sink's selection (or a pending intended spot) to a spot
//! 2. compute the target with the horizontal, vertical or line-bound rules
//! 3. synthesize an empty paragraph if the move asks for one
//! 4. validate and write the target, then record any rewrite the sink made
//!
//! ## Modules
//!
//! - **`walker`**: preorder of navigable blocks and paragraph synthesis
//! - **`context`**: single-use state carried between consecutive moves
//! - **`horizontal`**: character steps
//! - **`vertical`**: line steps, geometry first and structure last
//! - **`line_bounds`**: start and end of the current line
//!
//! A move never fails. Unresolvable selections fall back to the document
//! end and a rejected target keeps the previous selection.

pub mod context;
pub(crate) mod horizontal;
pub(crate) mod line_bounds;
pub(crate) mod vertical;
pub(crate) mod walker;

pub use context::NavContext;

use log::{debug, trace};

use crate::document::{Document, NodeId, NodeKind};
use crate::layout::{LayoutOracle, LineDirection};
use crate::position::resolver::{
    document_end, encode_spot, selection_for, spot_is_live, spot_offset,
};
use crate::position::stops::BlockStops;
use crate::position::{Direction, Place, Resolver, Selection, Spot};
use crate::selection::SelectionSink;
use crate::tuning::NavTuning;

use context::Carried;
use vertical::Vertical;
use walker::BlockWalk;

/// What a single move decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    To(Spot),
    /// Append an empty paragraph after the outermost list around the block
    /// and move into it.
    AppendAfterList(NodeId),
    /// Insert an empty paragraph next to the block and move into it.
    InsertBeside { block: NodeId, after: bool },
    Stay,
}

/// Caret navigation over a [`Document`] rendered by a [`LayoutOracle`].
pub struct Navigator<O: LayoutOracle> {
    oracle: O,
    tuning: NavTuning,
    ctx: NavContext,
}

impl<O: LayoutOracle> Navigator<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_tuning(oracle, NavTuning::default())
    }

    pub fn with_tuning(oracle: O, tuning: NavTuning) -> Self {
        Self {
            oracle,
            tuning,
            ctx: NavContext::new(),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn tuning(&self) -> &NavTuning {
        &self.tuning
    }

    pub fn context(&self) -> &NavContext {
        &self.ctx
    }

    /// Drops anything carried over from earlier moves, e.g. after the host
    /// changed the selection behind the navigator's back.
    pub fn reset(&mut self) {
        self.ctx.clear();
    }

    pub fn resolver<'a>(&'a self, doc: &'a Document) -> Resolver<'a> {
        Resolver::new(doc, &self.oracle, self.tuning.line_merge_tolerance)
    }

    /// One step right. `on_mutate` runs after the document was changed to
    /// make room for the caret.
    pub fn move_cursor_forward<S>(&mut self, doc: &mut Document, sink: &mut S, on_mutate: impl FnMut()) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_horizontal(doc, sink, Direction::Forward, on_mutate)
    }

    /// One step left.
    pub fn move_cursor_backward<S>(&mut self, doc: &mut Document, sink: &mut S, on_mutate: impl FnMut()) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_horizontal(doc, sink, Direction::Backward, on_mutate)
    }

    pub fn move_cursor_up<S>(&mut self, doc: &mut Document, sink: &mut S, on_mutate: impl FnMut()) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_vertical(doc, sink, LineDirection::Up, on_mutate)
    }

    pub fn move_cursor_down<S>(&mut self, doc: &mut Document, sink: &mut S, on_mutate: impl FnMut()) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_vertical(doc, sink, LineDirection::Down, on_mutate)
    }

    pub fn move_cursor_to_line_start<S>(&mut self, doc: &Document, sink: &mut S) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_line_bound(doc, sink, false)
    }

    pub fn move_cursor_to_line_end<S>(&mut self, doc: &Document, sink: &mut S) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        self.step_line_bound(doc, sink, true)
    }

    /// The canonical place of the caret as the next move would see it.
    pub fn place<S>(&self, doc: &Document, sink: &S) -> Option<Place>
    where
        S: SelectionSink + ?Sized,
    {
        encode_spot(doc, self.current_spot(doc, sink)?)
    }

    /// Offset of the caret in [`Document::plain_text`].
    pub fn plain_offset<S>(&self, doc: &Document, sink: &S) -> Option<usize>
    where
        S: SelectionSink + ?Sized,
    {
        spot_offset(doc, self.current_spot(doc, sink)?)
    }

    /// A short human-readable rendering of where the caret is, e.g.
    /// `Paragraph "ab|c"` or `selected HorizontalRule`.
    pub fn describe<S>(&self, doc: &Document, sink: &S) -> String
    where
        S: SelectionSink + ?Sized,
    {
        match self.current_spot(doc, sink) {
            Some(spot) => describe_spot(doc, spot),
            None => "no selection".to_string(),
        }
    }

    fn current_spot<S>(&self, doc: &Document, sink: &S) -> Option<Spot>
    where
        S: SelectionSink + ?Sized,
    {
        let current = sink.selection();
        self.ctx
            .peek(current.as_ref())
            .origin
            .filter(|spot| spot_is_live(doc, *spot))
            .or_else(|| {
                self.resolver(doc)
                    .spot_for_selection(current.as_ref(), Direction::Forward)
            })
    }

    /// Where a move starts. Consumes the pending context.
    fn origin<S>(&mut self, doc: &Document, sink: &S, bias: Direction) -> (Option<Spot>, Carried)
    where
        S: SelectionSink + ?Sized,
    {
        let current = sink.selection();
        let carried = self.ctx.begin(current.as_ref());
        let origin = carried
            .origin
            .filter(|spot| spot_is_live(doc, *spot))
            .or_else(|| self.resolver(doc).spot_for_selection(current.as_ref(), bias));
        trace!("move from {origin:?} (carried {carried:?})");
        (origin, carried)
    }

    fn step_horizontal<S>(
        &mut self,
        doc: &mut Document,
        sink: &mut S,
        direction: Direction,
        mut on_mutate: impl FnMut(),
    ) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        let prior = sink.selection();
        let (origin, carried) = self.origin(doc, sink, direction);
        let Some(origin) = origin else {
            self.ensure_selection(doc, sink);
            return false;
        };

        let walk = BlockWalk::new(doc);
        let step = match direction {
            Direction::Forward => horizontal::forward(doc, &walk, origin),
            Direction::Backward => horizontal::backward(doc, &walk, origin),
        };
        debug!("{direction:?}: {origin:?} -> {step:?}");

        let moved = self.apply(doc, sink, origin, step, prior, &carried, &mut on_mutate);
        self.ensure_selection(doc, sink);
        moved
    }

    fn step_vertical<S>(
        &mut self,
        doc: &mut Document,
        sink: &mut S,
        direction: LineDirection,
        mut on_mutate: impl FnMut(),
    ) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        let prior = sink.selection();
        let bias = match direction {
            LineDirection::Down => Direction::Forward,
            LineDirection::Up => Direction::Backward,
        };
        let (origin, carried) = self.origin(doc, sink, bias);
        let Some(origin) = origin else {
            self.ensure_selection(doc, sink);
            return false;
        };

        let walk = BlockWalk::new(doc);
        let planned = Vertical {
            doc,
            oracle: &self.oracle,
            tuning: &self.tuning,
            walk: &walk,
            direction,
        }
        .run(origin, carried.code_column);
        debug!("{direction:?}: {origin:?} -> {:?}", planned.step);

        let moved = self.apply(doc, sink, origin, planned.step, prior, &carried, &mut on_mutate);
        if moved
            && let Some(column) = planned.code_column
            && let Some(observed) = sink.selection()
        {
            self.ctx.remember_code_column(observed, column);
        }
        self.ensure_selection(doc, sink);
        moved
    }

    fn step_line_bound<S>(&mut self, doc: &Document, sink: &mut S, to_end: bool) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        let prior = sink.selection();
        let bias = if to_end {
            Direction::Forward
        } else {
            Direction::Backward
        };
        let (origin, carried) = self.origin(doc, sink, bias);
        let Some(origin) = origin else {
            self.ensure_selection(doc, sink);
            return false;
        };

        let target = if to_end {
            line_bounds::line_end(doc, &self.oracle, origin)
        } else {
            line_bounds::line_start(doc, origin)
        };
        let moved = match target {
            Some(spot) if spot != origin => self.commit(doc, sink, spot, prior),
            _ => {
                self.keep(doc, sink, origin, prior, &carried);
                false
            }
        };
        self.ensure_selection(doc, sink);
        moved
    }

    #[allow(clippy::too_many_arguments)]
    fn apply<S>(
        &mut self,
        doc: &mut Document,
        sink: &mut S,
        origin: Spot,
        step: Step,
        prior: Option<Selection>,
        carried: &Carried,
        on_mutate: &mut impl FnMut(),
    ) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        let target = match step {
            Step::To(spot) => spot,
            Step::AppendAfterList(block) => match walker::synthesize_after_list(doc, block) {
                Some(paragraph) => {
                    debug!("appended {paragraph:?} after the list around {block:?}");
                    on_mutate();
                    walker::start_spot(doc, paragraph)
                }
                None => {
                    self.keep(doc, sink, origin, prior, carried);
                    return false;
                }
            },
            Step::InsertBeside { block, after } => match walker::synthesize_beside(doc, block, after) {
                Some(paragraph) => {
                    debug!("inserted {paragraph:?} beside {block:?} (after: {after})");
                    on_mutate();
                    walker::start_spot(doc, paragraph)
                }
                None => {
                    self.keep(doc, sink, origin, prior, carried);
                    return false;
                }
            },
            Step::Stay => {
                self.keep(doc, sink, origin, prior, carried);
                return false;
            }
        };
        self.commit(doc, sink, target, prior)
    }

    /// A move that goes nowhere. A carried spot is written back so the next
    /// move still starts from it.
    fn keep<S>(&mut self, doc: &Document, sink: &mut S, origin: Spot, prior: Option<Selection>, carried: &Carried)
    where
        S: SelectionSink + ?Sized,
    {
        if carried.origin.is_some() {
            self.commit(doc, sink, origin, prior);
        }
    }

    /// Validates and writes a target, recording any rewrite by the sink.
    fn commit<S>(&mut self, doc: &Document, sink: &mut S, spot: Spot, prior: Option<Selection>) -> bool
    where
        S: SelectionSink + ?Sized,
    {
        let Some(selection) = selection_for(doc, spot) else {
            debug!("no selection encodes {spot:?}");
            self.restore(doc, sink, prior);
            return false;
        };
        if let Err(err) = doc.validate_selection(&selection) {
            debug!("rejected target {selection:?}: {err}");
            self.restore(doc, sink, prior);
            return false;
        }

        sink.set_selection(doc, selection);
        if let Some(observed) = sink.selection()
            && observed != selection
        {
            debug!("sink rewrote {selection:?} to {observed:?}");
            match spot {
                Spot::Selected(node) if doc.kind(node).is_image() => self.ctx.remember_image(observed, node),
                _ => self.ctx.remember_boundary(observed, spot),
            }
        }
        true
    }

    fn restore<S>(&self, doc: &Document, sink: &mut S, prior: Option<Selection>)
    where
        S: SelectionSink + ?Sized,
    {
        match prior {
            Some(selection) if doc.validate_selection(&selection).is_ok() => sink.set_selection(doc, selection),
            _ => self.ensure_selection(doc, sink),
        }
    }

    /// The sink never ends a move without a selection.
    fn ensure_selection<S>(&self, doc: &Document, sink: &mut S)
    where
        S: SelectionSink + ?Sized,
    {
        if sink.selection().is_some() {
            return;
        }
        match document_end(doc) {
            Ok(end) => {
                if let Some(selection) = selection_for(doc, end) {
                    sink.set_selection(doc, selection);
                }
            }
            Err(err) => debug!("cannot place a caret: {err}"),
        }
    }
}

fn block_label(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Heading { level } => format!("Heading({level})"),
        NodeKind::ListItem { .. } => "ListItem".to_string(),
        NodeKind::CodeBlock { .. } => "CodeBlock".to_string(),
        NodeKind::TableCell => "TableCell".to_string(),
        NodeKind::HorizontalRule => "HorizontalRule".to_string(),
        _ => "Paragraph".to_string(),
    }
}

fn describe_spot(doc: &Document, spot: Spot) -> String {
    match spot {
        Spot::Text { block, stop } => {
            let stops = BlockStops::collect(doc, block);
            let mut text = String::new();
            for (i, unit) in stops.units.iter().enumerate() {
                if i == stop.k {
                    text.push('|');
                }
                text.push_str(unit.plain(doc));
            }
            if stop.k >= stops.len() {
                text.push('|');
            }
            let in_code = stop.inside
                || stops
                    .code_at(stop.k)
                    .is_some_and(|span| stops.code_before(stop.k) == Some(span));
            let suffix = if in_code { " (in code)" } else { "" };
            format!("{} {text:?}{suffix}", block_label(doc.kind(block)))
        }
        Spot::Selected(node) => match doc.kind(node) {
            NodeKind::Image { src, .. } => format!("selected Image({src})"),
            NodeKind::CodeBlock { .. } => "selected CodeBlock label".to_string(),
            kind => format!("selected {}", block_label(kind)),
        },
        Spot::Beside { node, after } => {
            let side = if after { "after" } else { "before" };
            format!("{side} {}", block_label(doc.kind(node)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceLayout;
    use crate::selection::{MemorySink, NormalizingSink};
    use pretty_assertions::assert_eq;

    fn navigator() -> Navigator<MonospaceLayout> {
        Navigator::new(MonospaceLayout::default())
    }

    fn at(doc: &Document, needle: &str) -> MemorySink {
        let anchor = doc.find_text(needle).expect("needle in document");
        MemorySink::at(Selection::Caret(anchor))
    }

    #[test]
    fn forward_walks_characters() {
        let mut doc = Document::from_markdown("abc");
        let mut nav = navigator();
        let mut sink = at(&doc, "a");
        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || {}));
        assert_eq!(nav.describe(&doc, &sink), "Paragraph \"a|bc\"");
        assert_eq!(nav.plain_offset(&doc, &sink), Some(1));
    }

    #[test]
    fn sink_rewrite_at_code_edge_is_bridged() {
        let mut doc = Document::from_markdown("a`x`b");
        let mut nav = navigator();
        let mut sink = NormalizingSink::new();
        let a = doc.find_text("a").expect("a");
        sink.set_selection(&doc, Selection::caret(a.node, 1));

        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || {}));
        assert!(nav.context().has_pending_boundary());
        assert_eq!(nav.describe(&doc, &sink), "Paragraph \"a|xb\" (in code)");

        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || {}));
        assert_eq!(nav.describe(&doc, &sink), "Paragraph \"ax|b\"");
        assert!(!nav.context().has_pending_boundary());
    }

    #[test]
    fn forward_off_a_list_appends_a_paragraph() {
        let mut doc = Document::from_markdown("- a");
        let mut nav = navigator();
        let mut sink = at(&doc, "a");
        assert!(nav.move_cursor_to_line_end(&doc, &mut sink));

        let mut mutated = 0;
        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || mutated += 1));
        assert_eq!(mutated, 1);
        assert_eq!(nav.describe(&doc, &sink), "Paragraph \"|\"");
    }

    #[test]
    fn document_edges_are_no_ops() {
        let mut doc = Document::from_markdown("ab");
        let mut nav = navigator();
        let mut sink = at(&doc, "a");
        let before = sink.selection();
        assert!(!nav.move_cursor_backward(&mut doc, &mut sink, || {}));
        assert_eq!(sink.selection(), before);
    }

    #[test]
    fn missing_selection_lands_at_document_end() {
        let mut doc = Document::from_markdown("ab\n\ncd");
        let mut nav = navigator();
        let mut sink = MemorySink::new();
        nav.move_cursor_up(&mut doc, &mut sink, || {});
        assert!(sink.selection().is_some());
    }

    #[test]
    fn describes_selected_units() {
        let mut doc = Document::from_markdown("a![i](i.png)");
        let mut nav = navigator();
        let a = doc.find_text("a").expect("a");
        let mut sink = MemorySink::at(Selection::caret(a.node, 1));
        nav.move_cursor_forward(&mut doc, &mut sink, || {});
        assert_eq!(nav.describe(&doc, &sink), "selected Image(i.png)");
    }

    #[test]
    fn degraded_image_selection_still_steps_over_the_image() {
        let mut doc = Document::from_markdown("a![i](i.png)b");
        let mut nav = navigator();
        let mut sink = NormalizingSink::new().collapsing_images();
        let a = doc.find_text("a").expect("a");
        sink.set_selection(&doc, Selection::caret(a.node, 1));

        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || {}));
        assert!(matches!(sink.selection(), Some(Selection::Caret(_))));
        assert!(nav.context().has_pending_image());
        assert_eq!(nav.describe(&doc, &sink), "selected Image(i.png)");

        assert!(nav.move_cursor_forward(&mut doc, &mut sink, || {}));
        assert_eq!(nav.plain_offset(&doc, &sink), Some(2));
    }
}
