//! Fixed-width line breaking for headless layout.
//!
//! Every grapheme cluster occupies its Unicode display width in cells (a
//! combining mark shares the cell of the letter it decorates), images a
//! fixed number of cells, and text wraps at a column limit. Carets at a wrap
//! point are drawn at the start of the following row.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::document::{Document, NodeId, NodeKind};
use crate::position::resolver::resolve_position;
use crate::position::stops::{BlockStops, Unit};
use crate::position::{Position, Spot, Stop};

use super::{LayoutOracle, Rect};

/// Cell geometry of the fixed-width layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonospaceMetrics {
    pub wrap_columns: usize,
    pub cell_width: f32,
    pub line_height: f32,
    /// Extra indent of a nested block inside a list item.
    pub list_indent_columns: usize,
    pub marker_columns: usize,
    pub checkbox_columns: usize,
    pub image_columns: usize,
    pub quote_indent_columns: usize,
    /// Empty rows between consecutive leaf blocks.
    pub block_spacing_rows: usize,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            wrap_columns: 80,
            cell_width: 8.0,
            line_height: 16.0,
            list_indent_columns: 2,
            marker_columns: 2,
            checkbox_columns: 4,
            image_columns: 4,
            quote_indent_columns: 2,
            block_spacing_rows: 0,
        }
    }
}

/// Right-hand cells of a wide cluster.
const CONTINUATION: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    row: usize,
    col: usize,
}

#[derive(Debug, Clone, Copy)]
struct RowExtent {
    row: usize,
    left: usize,
    right: usize,
}

#[derive(Debug, Clone)]
enum Shape {
    Text {
        carets: Vec<Cell>,
        units: Vec<(Cell, usize)>,
        rows: Vec<RowExtent>,
    },
    Rule(RowExtent),
}

#[derive(Debug, Clone)]
struct BlockBox {
    shape: Shape,
    label: Option<RowExtent>,
}

#[derive(Debug, Default)]
struct Frame {
    revision: u64,
    boxes: HashMap<NodeId, BlockBox>,
    owners: Vec<Option<NodeId>>,
    grid: Vec<Vec<String>>,
}

struct Painter<'a> {
    doc: &'a Document,
    metrics: &'a MonospaceMetrics,
    frame: Frame,
    leaves: usize,
}

impl<'a> Painter<'a> {
    fn paint(doc: &'a Document, metrics: &'a MonospaceMetrics) -> Frame {
        let mut painter = Painter {
            doc,
            metrics,
            frame: Frame {
                revision: doc.revision(),
                ..Frame::default()
            },
            leaves: 0,
        };
        painter.blocks(doc.root(), 0);
        painter.frame
    }

    fn new_row(&mut self, owner: Option<NodeId>) -> usize {
        self.frame.grid.push(vec![]);
        self.frame.owners.push(owner);
        self.frame.grid.len() - 1
    }

    fn put(&mut self, row: usize, col: usize, glyph: impl Into<String>) {
        let glyph = glyph.into();
        let line = &mut self.frame.grid[row];
        if line.len() <= col {
            line.resize(col + 1, " ".to_string());
        }
        let cell = &mut line[col];
        if !cell.is_empty() && cell.width() == 0 {
            cell.push_str(&glyph);
        } else {
            *cell = glyph;
        }
    }

    /// Draws a zero-width cluster onto the cell before `col`.
    fn attach(&mut self, row: usize, col: usize, glyph: &str) {
        match col.checked_sub(1) {
            Some(prev) if prev < self.frame.grid[row].len() => {
                self.frame.grid[row][prev].push_str(glyph);
            }
            _ => self.put(row, col, glyph),
        }
    }

    fn put_str(&mut self, row: usize, col: usize, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.put(row, col + i, ch);
        }
    }

    fn begin_leaf(&mut self) {
        if self.leaves > 0 {
            for _ in 0..self.metrics.block_spacing_rows {
                self.new_row(None);
            }
        }
        self.leaves += 1;
    }

    fn blocks(&mut self, parent: NodeId, indent: usize) {
        let doc = self.doc;
        for &child in doc.children(parent) {
            if doc.kind(child).is_block() && !doc.flags(child).excludes() {
                self.block(child, indent);
            }
        }
    }

    fn block(&mut self, node: NodeId, indent: usize) {
        let doc = self.doc;
        match doc.kind(node) {
            NodeKind::BlockQuote => {
                let first = self.frame.grid.len();
                self.blocks(node, indent + self.metrics.quote_indent_columns);
                for row in first..self.frame.grid.len() {
                    self.put(row, indent, '│');
                }
            }
            NodeKind::List { ordered, .. } => {
                let mut n = 0;
                for &item in doc.children(node) {
                    if matches!(doc.kind(item), NodeKind::ListItem { .. }) && !doc.flags(item).excludes() {
                        n += 1;
                        self.list_item(item, indent, *ordered, n);
                    }
                }
            }
            NodeKind::ListItem { .. } => self.list_item(node, indent, false, 1),
            NodeKind::HorizontalRule => {
                self.begin_leaf();
                let row = self.new_row(Some(node));
                let right = self.metrics.wrap_columns.max(indent + 1);
                for col in indent..right {
                    self.put(row, col, '─');
                }
                self.frame.boxes.insert(
                    node,
                    BlockBox {
                        shape: Shape::Rule(RowExtent {
                            row,
                            left: indent,
                            right,
                        }),
                        label: None,
                    },
                );
            }
            NodeKind::CodeBlock { lang } => {
                self.begin_leaf();
                let row = self.new_row(Some(node));
                let label = format!("```{}", lang.as_deref().unwrap_or(""));
                self.put_str(row, indent, &label);
                let extent = RowExtent {
                    row,
                    left: indent,
                    right: indent + label.chars().count(),
                };
                self.text(node, indent, indent, "", Some(extent));
            }
            NodeKind::Heading { level } => {
                self.begin_leaf();
                let prefix = format!("{} ", "#".repeat(usize::from(*level)));
                let content = indent + prefix.chars().count();
                self.text(node, indent, content, &prefix, None);
            }
            NodeKind::Paragraph | NodeKind::TableCell => {
                self.begin_leaf();
                self.text(node, indent, indent, "", None);
            }
            _ => {}
        }
    }

    fn list_item(&mut self, item: NodeId, indent: usize, ordered: bool, n: usize) {
        let doc = self.doc;
        let m = self.metrics;
        self.begin_leaf();

        let marker: String = if ordered {
            format!("{n}.")
        } else {
            "•".to_string()
        };
        let mut prefix: String = marker.chars().take(m.marker_columns).collect();
        let mut content = indent + m.marker_columns;
        if let NodeKind::ListItem {
            checkbox: Some(checked),
        } = doc.kind(item)
        {
            prefix = format!("{prefix:<width$}", width = m.marker_columns);
            prefix.push_str(if *checked { "[x]" } else { "[ ]" });
            content += m.checkbox_columns;
        }
        self.text(item, indent, content, &prefix, None);

        for &child in doc.children(item) {
            if doc.kind(child).is_block() && !doc.flags(child).excludes() {
                self.block(child, indent + m.list_indent_columns);
            }
        }
    }

    fn text(
        &mut self,
        block: NodeId,
        indent: usize,
        content: usize,
        prefix: &str,
        label: Option<RowExtent>,
    ) {
        let doc = self.doc;
        let stops = BlockStops::collect(doc, block);
        let limit = self.metrics.wrap_columns.max(content + 1);

        let first = self.new_row(Some(block));
        self.put_str(first, indent, prefix);
        let (mut row, mut col) = (first, content);
        let mut carets = Vec::with_capacity(stops.len() + 1);
        let mut units = Vec::with_capacity(stops.len());

        for unit in &stops.units {
            let is_break = unit.is_break(doc);
            let width = match unit {
                _ if is_break => 0,
                Unit::Char { .. } => unit.plain(doc).width(),
                Unit::Atom(_) => self.metrics.image_columns.max(1),
            };
            if !is_break && col > content && col + width > limit {
                row = self.new_row(Some(block));
                col = content;
            }
            carets.push(Cell { row, col });
            units.push((Cell { row, col }, width));

            match unit {
                _ if is_break => {}
                Unit::Char { .. } if width == 0 => self.attach(row, col, unit.plain(doc)),
                Unit::Char { .. } => {
                    self.put(row, col, unit.plain(doc));
                    for extra in 1..width {
                        self.put(row, col + extra, CONTINUATION);
                    }
                }
                Unit::Atom(_) => {
                    for extra in 0..width {
                        self.put(row, col + extra, '▣');
                    }
                }
            }

            if is_break {
                row = self.new_row(Some(block));
                col = content;
            } else {
                col += width;
            }
        }
        carets.push(Cell { row, col });

        let rows = (first..=row)
            .map(|r| {
                let right = units
                    .iter()
                    .filter(|(c, _)| c.row == r)
                    .map(|(c, w)| c.col + w)
                    .chain(carets.iter().filter(|c| c.row == r).map(|c| c.col))
                    .max()
                    .unwrap_or(content)
                    .max(content + 1);
                RowExtent {
                    row: r,
                    left: content,
                    right,
                }
            })
            .collect();

        self.frame.boxes.insert(
            block,
            BlockBox {
                shape: Shape::Text {
                    carets,
                    units,
                    rows,
                },
                label,
            },
        );
    }
}

/// Deterministic [`LayoutOracle`] over a fixed-width grid.
#[derive(Debug)]
pub struct MonospaceLayout {
    metrics: MonospaceMetrics,
    cache: RefCell<Option<Rc<Frame>>>,
}

impl MonospaceLayout {
    pub fn new(metrics: MonospaceMetrics) -> Self {
        Self {
            metrics,
            cache: RefCell::new(None),
        }
    }

    pub fn metrics(&self) -> &MonospaceMetrics {
        &self.metrics
    }

    /// The document drawn as text rows, one string per visual line.
    pub fn render_rows(&self, doc: &Document) -> Vec<String> {
        self.frame(doc)
            .grid
            .iter()
            .map(|line| {
                line.concat()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn frame(&self, doc: &Document) -> Rc<Frame> {
        if let Some(frame) = self.cache.borrow().as_ref()
            && frame.revision == doc.revision()
        {
            return Rc::clone(frame);
        }
        log::trace!("laying out revision {}", doc.revision());
        let frame = Rc::new(Painter::paint(doc, &self.metrics));
        *self.cache.borrow_mut() = Some(Rc::clone(&frame));
        frame
    }

    fn caret_at(&self, cell: Cell) -> Rect {
        let x = cell.col as f32 * self.metrics.cell_width;
        let y = cell.row as f32 * self.metrics.line_height;
        Rect::new(x, y, x, y + self.metrics.line_height)
    }

    fn extent_rect(&self, e: &RowExtent) -> Rect {
        let m = &self.metrics;
        Rect::new(
            e.left as f32 * m.cell_width,
            e.row as f32 * m.line_height,
            e.right as f32 * m.cell_width,
            (e.row + 1) as f32 * m.line_height,
        )
    }
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self::new(MonospaceMetrics::default())
    }
}

impl LayoutOracle for MonospaceLayout {
    fn caret_rect(&self, doc: &Document, position: &Position) -> Option<Rect> {
        let frame = self.frame(doc);
        match resolve_position(doc, position)? {
            Spot::Text { block, stop } => match &frame.boxes.get(&block)?.shape {
                Shape::Text { carets, .. } => carets.get(stop.k).map(|c| self.caret_at(*c)),
                Shape::Rule(_) => None,
            },
            Spot::Beside { node, after } => match &frame.boxes.get(&node)?.shape {
                Shape::Rule(e) => Some(self.caret_at(Cell {
                    row: e.row,
                    col: if after { e.right } else { e.left },
                })),
                Shape::Text { .. } => None,
            },
            Spot::Selected(_) => None,
        }
    }

    fn node_rect(&self, doc: &Document, node: NodeId) -> Option<Rect> {
        if !doc.contains(node) {
            return None;
        }
        let frame = self.frame(doc);
        match doc.kind(node) {
            NodeKind::Image { .. } => {
                let block = doc.text_block_of(node)?;
                let k = BlockStops::collect(doc, block).unit_of(node)?;
                let Shape::Text { units, .. } = &frame.boxes.get(&block)?.shape else {
                    return None;
                };
                let (cell, width) = units.get(k)?;
                Some(self.extent_rect(&RowExtent {
                    row: cell.row,
                    left: cell.col,
                    right: cell.col + width,
                }))
            }
            NodeKind::CodeBlock { .. } => frame.boxes.get(&node)?.label.map(|e| self.extent_rect(&e)),
            _ => match &frame.boxes.get(&node)?.shape {
                Shape::Rule(e) => Some(self.extent_rect(e)),
                Shape::Text { rows, .. } => {
                    let rects: Vec<Rect> = rows.iter().map(|e| self.extent_rect(e)).collect();
                    let first = rects.first()?;
                    Some(rects.iter().fold(*first, |acc, r| {
                        Rect::new(
                            acc.left.min(r.left),
                            acc.top.min(r.top),
                            acc.right.max(r.right),
                            acc.bottom.max(r.bottom),
                        )
                    }))
                }
            },
        }
    }

    fn client_rects(&self, doc: &Document, block: NodeId) -> Vec<Rect> {
        let frame = self.frame(doc);
        match frame.boxes.get(&block).map(|b| &b.shape) {
            Some(Shape::Text { rows, .. }) => rows.iter().map(|e| self.extent_rect(e)).collect(),
            Some(Shape::Rule(e)) => vec![self.extent_rect(e)],
            None => vec![],
        }
    }

    fn probe(&self, doc: &Document, x: f32, y: f32) -> Option<Position> {
        if !(y >= 0.0) || x.is_nan() {
            return None;
        }
        let frame = self.frame(doc);
        let row = (y / self.metrics.line_height) as usize;
        let owner = frame.owners.get(row).copied().flatten()?;
        let bx = frame.boxes.get(&owner)?;
        if bx.label.is_some_and(|l| l.row == row) {
            return None;
        }

        match &bx.shape {
            Shape::Rule(e) => {
                let mid = (e.left + e.right) as f32 / 2.0 * self.metrics.cell_width;
                Some(if x < mid {
                    Position::BeforeNode(owner)
                } else {
                    Position::AfterNode(owner)
                })
            }
            Shape::Text { carets, .. } => {
                let cw = self.metrics.cell_width;
                let (k, _) = carets
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.row == row)
                    .min_by(|(_, a), (_, b)| {
                        let da = (a.col as f32 * cw - x).abs();
                        let db = (b.col as f32 * cw - x).abs();
                        da.total_cmp(&db)
                    })?;
                let stops = BlockStops::collect(doc, owner);
                stops.encode(stops.snap(Stop::outside(k)))
            }
        }
    }

    fn line_height(&self) -> f32 {
        self.metrics.line_height
    }
}
