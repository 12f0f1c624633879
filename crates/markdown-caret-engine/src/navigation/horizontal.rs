//! Character-granularity movement.
//!
//! Inside a text block the caret walks the block's stops, so inline code
//! costs one extra step on its left edge and an image is a single unit that
//! gets selected on the way across. Between blocks the caret follows the
//! preorder of navigable blocks, which descends into nested list items and
//! climbs back out of them. Rules and code block labels are selected on the
//! way in.

use crate::document::{Document, NodeId, NodeKind};
use crate::position::stops::{BlockStops, Unit};
use crate::position::{Spot, Stop};

use super::Step;
use super::walker::BlockWalk;

pub(crate) fn image_at(doc: &Document, stops: &BlockStops, k: usize) -> Option<NodeId> {
    match stops.units.get(k) {
        Some(Unit::Atom(n)) if doc.kind(*n).is_image() => Some(*n),
        _ => None,
    }
}

/// Spot taken when arriving at `block` from the block before it.
pub(crate) fn enter_forward(doc: &Document, block: NodeId) -> Spot {
    match doc.kind(block) {
        NodeKind::HorizontalRule | NodeKind::CodeBlock { .. } => Spot::Selected(block),
        _ => Spot::text(block, Stop::outside(0)),
    }
}

/// Spot taken when arriving at `block` from the block after it.
pub(crate) fn enter_backward(doc: &Document, block: NodeId) -> Spot {
    match doc.kind(block) {
        NodeKind::HorizontalRule => Spot::Selected(block),
        _ => Spot::text(block, BlockStops::collect(doc, block).last()),
    }
}

pub(crate) fn forward(doc: &Document, walk: &BlockWalk, from: Spot) -> Step {
    match from {
        Spot::Text { block, stop } => {
            let stops = BlockStops::collect(doc, block);
            let stop = stops.snap(stop);
            if !stop.inside
                && let Some(image) = image_at(doc, &stops, stop.k)
            {
                return Step::To(Spot::Selected(image));
            }
            let all = stops.stops();
            match all.iter().position(|s| *s == stop).and_then(|i| all.get(i + 1)) {
                Some(next) => Step::To(Spot::text(block, *next)),
                None => leave_forward(doc, walk, block),
            }
        }
        Spot::Selected(node) => match doc.kind(node) {
            NodeKind::Image { .. } => after_image(doc, node),
            NodeKind::CodeBlock { .. } => Step::To(Spot::text(node, Stop::outside(0))),
            _ => match walk.next(node) {
                Some(next) => Step::To(enter_forward(doc, next)),
                None => Step::To(Spot::Beside { node, after: true }),
            },
        },
        Spot::Beside { node, after: false } => Step::To(Spot::Selected(node)),
        Spot::Beside { node, after: true } => match walk.next(node) {
            Some(next) => Step::To(enter_forward(doc, next)),
            None => Step::Stay,
        },
    }
}

pub(crate) fn backward(doc: &Document, walk: &BlockWalk, from: Spot) -> Step {
    match from {
        Spot::Text { block, stop } => {
            let stops = BlockStops::collect(doc, block);
            let stop = stops.snap(stop);
            if !stop.inside
                && let Some(image) = stop.k.checked_sub(1).and_then(|k| image_at(doc, &stops, k))
            {
                return Step::To(Spot::Selected(image));
            }
            let all = stops.stops();
            let prev = all
                .iter()
                .position(|s| *s == stop)
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| all.get(i));
            match prev {
                Some(prev) => Step::To(Spot::text(block, *prev)),
                None if matches!(doc.kind(block), NodeKind::CodeBlock { .. }) => {
                    Step::To(Spot::Selected(block))
                }
                None => leave_backward(doc, walk, block),
            }
        }
        Spot::Selected(node) => match doc.kind(node) {
            NodeKind::Image { .. } => before_image(doc, node),
            _ => leave_backward(doc, walk, node),
        },
        Spot::Beside { node, after: true } => Step::To(Spot::Selected(node)),
        Spot::Beside { node, after: false } => leave_backward(doc, walk, node),
    }
}

fn leave_forward(doc: &Document, walk: &BlockWalk, block: NodeId) -> Step {
    match walk.next(block) {
        Some(next) => Step::To(enter_forward(doc, next)),
        None if doc.outermost_list(block).is_some() => Step::AppendAfterList(block),
        None => Step::Stay,
    }
}

fn leave_backward(doc: &Document, walk: &BlockWalk, block: NodeId) -> Step {
    match walk.prev(block) {
        Some(prev) => Step::To(enter_backward(doc, prev)),
        None => Step::Stay,
    }
}

fn image_spot(doc: &Document, image: NodeId, after: bool) -> Step {
    let Some(block) = doc.text_block_of(image) else {
        return Step::Stay;
    };
    let stops = BlockStops::collect(doc, block);
    match stops.unit_of(image) {
        Some(k) => Step::To(Spot::text(block, Stop::outside(k + usize::from(after)))),
        None => Step::Stay,
    }
}

fn after_image(doc: &Document, image: NodeId) -> Step {
    image_spot(doc, image, true)
}

fn before_image(doc: &Document, image: NodeId) -> Step {
    image_spot(doc, image, false)
}
