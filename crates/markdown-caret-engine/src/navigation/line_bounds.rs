//! Start and end of the caret's line.
//!
//! Lines are the logical lines of a block, split at hard breaks and code
//! line feeds. The end stop never lands strictly inside an inline code span.

use crate::document::{Document, NodeId};
use crate::layout::LayoutOracle;
use crate::position::stops::BlockStops;
use crate::position::{Spot, Stop};

use super::horizontal::image_at;

pub(crate) fn line_start(doc: &Document, from: Spot) -> Option<Spot> {
    let (block, k) = text_position(doc, from)?;
    let stops = BlockStops::collect(doc, block);
    let (start, _) = stops.segment(doc, k);
    Some(Spot::text(block, stops.outside_left_of(start)))
}

pub(crate) fn line_end(doc: &Document, oracle: &dyn LayoutOracle, from: Spot) -> Option<Spot> {
    let (block, k) = text_position(doc, from)?;
    let stops = BlockStops::collect(doc, block);
    let (_, end) = stops.segment(doc, k);

    // Before or on an image that closes its visual line: stop just past it.
    if let Some(image) = image_at(doc, &stops, k)
        && ends_visual_line(doc, oracle, &stops, image, k + 1, end)
    {
        return Some(Spot::text(block, Stop::outside(k + 1)));
    }
    Some(Spot::text(block, stops.outside_left_of(end)))
}

/// Block and unit offset for spots that sit on a text line.
fn text_position(doc: &Document, spot: Spot) -> Option<(NodeId, usize)> {
    match spot {
        Spot::Text { block, stop } => Some((block, stop.k)),
        Spot::Selected(node) if doc.kind(node).is_image() => {
            let block = doc.text_block_of(node)?;
            let k = BlockStops::collect(doc, block).unit_of(node)?;
            Some((block, k))
        }
        _ => None,
    }
}

fn ends_visual_line(
    doc: &Document,
    oracle: &dyn LayoutOracle,
    stops: &BlockStops,
    image: NodeId,
    after: usize,
    segment_end: usize,
) -> bool {
    if after >= segment_end {
        return true;
    }
    let Some(image_rect) = oracle.node_rect(doc, image) else {
        return false;
    };
    stops
        .encode(Stop::outside(after))
        .and_then(|p| oracle.caret_rect(doc, &p))
        .is_some_and(|next| next.mid_y() > image_rect.bottom)
}
