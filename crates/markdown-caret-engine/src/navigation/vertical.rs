//! Line-granularity movement.
//!
//! Candidates are tried in order until one is accepted:
//!
//! 1. code block lines, split at line feeds, with a remembered column
//! 2. the neighbouring visual line of the same block
//! 3. the oracle's native line move
//! 4. probing at the caret x, one line height further each time
//! 5. the neighbouring navigable block
//!
//! Geometry answers are only ever hints. A candidate must resolve inside the
//! root, differ from the origin, move strictly in the requested direction and
//! stay within the jump guard, or the next tier runs.

use log::{debug, trace};

use crate::document::{Document, NodeId, NodeKind};
use crate::layout::{LayoutOracle, LineBand, LineDirection, Rect};
use crate::position::resolver::resolve_position;
use crate::position::stops::BlockStops;
use crate::position::{Position, Spot, Stop};
use crate::tuning::NavTuning;

use super::Step;
use super::walker::BlockWalk;

/// Outcome of a vertical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VerticalMove {
    pub step: Step,
    /// Column to keep for the next move through a code block.
    pub code_column: Option<usize>,
}

impl From<Step> for VerticalMove {
    fn from(step: Step) -> Self {
        Self {
            step,
            code_column: None,
        }
    }
}

pub(crate) struct Vertical<'a> {
    pub doc: &'a Document,
    pub oracle: &'a dyn LayoutOracle,
    pub tuning: &'a NavTuning,
    pub walk: &'a BlockWalk,
    pub direction: LineDirection,
}

impl Vertical<'_> {
    pub fn run(&self, from: Spot, code_column: Option<usize>) -> VerticalMove {
        match from {
            Spot::Selected(node) => self.from_selected(node),
            Spot::Beside { node, after } => self.from_beside(node, after).into(),
            Spot::Text { block, stop } if self.is_code(block) => self.code_lines(block, stop, code_column),
            Spot::Text { block, stop } => self.from_text(block, stop).into(),
        }
    }

    fn down(&self) -> bool {
        self.direction == LineDirection::Down
    }

    fn is_code(&self, block: NodeId) -> bool {
        matches!(self.doc.kind(block), NodeKind::CodeBlock { .. })
    }

    fn from_selected(&self, node: NodeId) -> VerticalMove {
        let doc = self.doc;
        match doc.kind(node) {
            NodeKind::Image { .. } => {
                let Some(block) = doc.text_block_of(node) else {
                    return Step::Stay.into();
                };
                let Some(k) = BlockStops::collect(doc, block).unit_of(node) else {
                    return Step::Stay.into();
                };
                let k = if self.down() { k + 1 } else { k };
                self.from_text(block, Stop::outside(k)).into()
            }
            NodeKind::CodeBlock { .. } if self.down() => VerticalMove {
                step: Step::To(Spot::text(node, Stop::outside(0))),
                code_column: Some(0),
            },
            NodeKind::CodeBlock { .. } => {
                let x = self.oracle.node_rect(doc, node).map(|r| r.left);
                match self.walk.prev(node) {
                    Some(prev) => Step::To(self.enter_from_below(prev, x)).into(),
                    None => Step::Stay.into(),
                }
            }
            _ => {
                let neighbour = if self.down() {
                    self.walk.next(node)
                } else {
                    self.walk.prev(node)
                };
                match neighbour {
                    Some(block) => Step::To(self.enter(block, None)).into(),
                    None => Step::To(Spot::Beside {
                        node,
                        after: self.down(),
                    })
                    .into(),
                }
            }
        }
    }

    fn from_beside(&self, node: NodeId, after: bool) -> Step {
        if after != self.down() {
            return Step::To(Spot::Selected(node));
        }
        match self.structural_neighbour(node) {
            Some(block) => Step::To(self.enter(block, None)),
            None => Step::Stay,
        }
    }

    /// Moves between the line-feed separated lines of a code block.
    fn code_lines(&self, code: NodeId, stop: Stop, remembered: Option<usize>) -> VerticalMove {
        let doc = self.doc;
        let stops = BlockStops::collect(doc, code);
        let mut lines = vec![];
        let mut start = 0;
        for (i, unit) in stops.units.iter().enumerate() {
            if unit.is_break(doc) {
                lines.push((start, i));
                start = i + 1;
            }
        }
        lines.push((start, stops.len()));

        let k = stop.k.min(stops.len());
        let current = lines
            .iter()
            .position(|(s, e)| *s <= k && k <= *e)
            .unwrap_or(0);
        let column = remembered.unwrap_or(k - lines[current].0);

        let target = if self.down() {
            let last_content = lines
                .iter()
                .rposition(|(s, e)| {
                    stops.units[*s..*e]
                        .iter()
                        .any(|u| !u.plain(doc).trim().is_empty())
                })
                .unwrap_or(0);
            (current < last_content).then_some(current + 1)
        } else {
            current.checked_sub(1)
        };

        match target {
            Some(t) => {
                let (s, e) = lines[t];
                trace!("code line {current} -> {t} at column {column}");
                VerticalMove {
                    step: Step::To(Spot::text(code, Stop::outside(s + column.min(e - s)))),
                    code_column: Some(column),
                }
            }
            None => self.leave_code(code, stop).into(),
        }
    }

    fn leave_code(&self, code: NodeId, stop: Stop) -> Step {
        let x = self.caret_of(code, stop).map(|r| r.left);
        match self.structural_neighbour(code) {
            Some(block) => Step::To(self.enter(block, x)),
            None => Step::InsertBeside {
                block: code,
                after: self.down(),
            },
        }
    }

    fn from_text(&self, block: NodeId, stop: Stop) -> Step {
        let origin = Spot::text(block, stop);
        let Some(caret) = self.caret_of(block, stop) else {
            debug!("no caret geometry for {origin:?}, falling back to structure");
            return self.structural(block, None);
        };

        if let Some(spot) = self.intra_block(block, &caret) {
            return Step::To(spot);
        }
        if let Some(spot) = self.native(origin, &caret) {
            return Step::To(spot);
        }
        if let Some(spot) = self.probe_outward(origin, &caret) {
            return Step::To(spot);
        }
        self.structural(block, Some(caret.left))
    }

    fn caret_of(&self, block: NodeId, stop: Stop) -> Option<Rect> {
        let position = BlockStops::collect(self.doc, block).encode(stop)?;
        self.oracle.caret_rect(self.doc, &position)
    }

    /// Tier 2: the next visual line of a wrapped block.
    fn intra_block(&self, block: NodeId, caret: &Rect) -> Option<Spot> {
        let lines = self
            .oracle
            .lines(self.doc, block, self.tuning.line_merge_tolerance);
        if lines.len() < 2 {
            return None;
        }
        let current = lines.iter().position(|l| l.contains_y(caret.mid_y()))?;
        let target = if self.down() {
            lines.get(current + 1)?
        } else {
            lines.get(current.checked_sub(1)?)?
        };
        let at_line_start = (caret.left - lines[current].left).abs() <= self.tuning.line_start_epsilon;
        self.land_on_line(block, target, caret.left, at_line_start)
    }

    /// Tier 3: the host's own primitive.
    fn native(&self, origin: Spot, caret: &Rect) -> Option<Spot> {
        let position = BlockStops::collect(self.doc, block_of(origin)?).encode(stop_of(origin)?)?;
        let candidate = self
            .oracle
            .native_line_move(self.doc, &position, self.direction)?;
        let accepted = self.accept(origin, caret, &candidate, caret.mid_y());
        if accepted.is_none() {
            debug!("native line move to {candidate:?} rejected");
        }
        accepted
    }

    /// Tier 4: probe at growing distances from the caret.
    fn probe_outward(&self, origin: Spot, caret: &Rect) -> Option<Spot> {
        let lh = self.oracle.line_height();
        let sign = if self.down() { 1.0 } else { -1.0 };
        for k in 1..=self.tuning.max_probe_steps {
            let y = caret.mid_y() + sign * k as f32 * lh;
            for dx in &self.tuning.probe_x_jitter {
                let Some(candidate) = self.oracle.probe(self.doc, caret.left + dx, y) else {
                    continue;
                };
                if let Some(spot) = self.accept(origin, caret, &candidate, y) {
                    trace!("probe step {k} accepted {candidate:?}");
                    return Some(spot);
                }
            }
        }
        None
    }

    /// Validates a geometry candidate and shapes it into a station.
    fn accept(&self, origin: Spot, caret: &Rect, candidate: &Position, reference_y: f32) -> Option<Spot> {
        let spot = resolve_position(self.doc, candidate)?;
        if spot == origin {
            return None;
        }
        let rect = self.oracle.caret_rect(self.doc, candidate)?;
        let moved = if self.down() {
            rect.mid_y() > caret.mid_y()
        } else {
            rect.mid_y() < caret.mid_y()
        };
        let guard = self.tuning.jump_guard_line_heights * self.oracle.line_height();
        if !moved || (rect.mid_y() - reference_y).abs() > guard {
            return None;
        }

        Some(match spot {
            Spot::Beside { node, .. } => Spot::Selected(node),
            Spot::Text { block, .. }
                if self.down() && self.is_code(block) && Some(block) != block_of(origin) =>
            {
                Spot::Selected(block)
            }
            other => other,
        })
    }

    /// Tier 5.
    fn structural(&self, block: NodeId, x: Option<f32>) -> Step {
        match self.structural_neighbour(block) {
            Some(next) => Step::To(self.enter(next, x)),
            None => Step::Stay,
        }
    }

    fn structural_neighbour(&self, block: NodeId) -> Option<NodeId> {
        if self.down() {
            self.walk.next(block)
        } else {
            self.walk.prev(block)
        }
    }

    fn enter(&self, block: NodeId, x: Option<f32>) -> Spot {
        if self.down() {
            self.enter_from_above(block, x)
        } else {
            self.enter_from_below(block, x)
        }
    }

    fn enter_from_above(&self, block: NodeId, x: Option<f32>) -> Spot {
        match self.doc.kind(block) {
            NodeKind::HorizontalRule | NodeKind::CodeBlock { .. } => Spot::Selected(block),
            _ => {
                let lines = self
                    .oracle
                    .lines(self.doc, block, self.tuning.line_merge_tolerance);
                x.zip(lines.first())
                    .and_then(|(x, line)| self.land_on_line(block, line, x, false))
                    .unwrap_or(Spot::text(block, Stop::outside(0)))
            }
        }
    }

    fn enter_from_below(&self, block: NodeId, x: Option<f32>) -> Spot {
        match self.doc.kind(block) {
            NodeKind::HorizontalRule => Spot::Selected(block),
            _ => {
                let lines = self
                    .oracle
                    .lines(self.doc, block, self.tuning.line_merge_tolerance);
                x.zip(lines.last())
                    .and_then(|(x, line)| self.land_on_line(block, line, x, false))
                    .unwrap_or_else(|| Spot::text(block, BlockStops::collect(self.doc, block).last()))
            }
        }
    }

    /// A caret spot of `block` on `line` near `x`.
    fn land_on_line(&self, block: NodeId, line: &LineBand, x: f32, prefer_left: bool) -> Option<Spot> {
        let y = line.mid_y();
        let left = prefer_left.then_some(line.left);
        left.into_iter()
            .chain(self.tuning.probe_x_jitter.iter().map(|dx| x + dx))
            .filter_map(|x| self.oracle.probe(self.doc, x, y))
            .filter_map(|p| resolve_position(self.doc, &p))
            .find(|spot| block_of(*spot) == Some(block))
    }
}

fn block_of(spot: Spot) -> Option<NodeId> {
    match spot {
        Spot::Text { block, .. } => Some(block),
        _ => None,
    }
}

fn stop_of(spot: Spot) -> Option<Stop> {
    match spot {
        Spot::Text { stop, .. } => Some(stop),
        _ => None,
    }
}
