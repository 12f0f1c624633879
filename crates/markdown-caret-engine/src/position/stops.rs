use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::document::{Document, NodeId, NodeKind};

use super::{Position, Stop};

/// Characters that mark a boundary but never render.
pub const ZERO_WIDTH: [char; 2] = ['\u{200B}', '\u{FEFF}'];

/// Keeps an otherwise empty list item addressable.
pub const NBSP: char = '\u{00A0}';

/// One visible step of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    /// An extended grapheme cluster of a text run.
    Char {
        run: NodeId,
        /// Char offset of the cluster in the run.
        index: usize,
        /// Chars in the cluster.
        len: usize,
        /// Byte range of the cluster in the run.
        bytes: (usize, usize),
        ch: char,
        code: Option<NodeId>,
    },
    Atom(NodeId),
}

impl Unit {
    pub fn code(&self) -> Option<NodeId> {
        match self {
            Unit::Char { code, .. } => *code,
            Unit::Atom(_) => None,
        }
    }

    pub fn atom(&self) -> Option<NodeId> {
        match self {
            Unit::Atom(n) => Some(*n),
            Unit::Char { .. } => None,
        }
    }

    /// Hard line breaks and code-block line feeds.
    pub fn is_break(&self, doc: &Document) -> bool {
        match self {
            Unit::Char { ch, code, .. } => matches!(ch, '\n' | '\r') && code.is_none(),
            Unit::Atom(n) => matches!(doc.kind(*n), NodeKind::LineBreak),
        }
    }

    /// How the unit appears in plain text.
    pub fn plain<'d>(&self, doc: &'d Document) -> &'d str {
        match self {
            Unit::Char {
                run,
                bytes: (start, end),
                ..
            } => match doc.kind(*run) {
                NodeKind::TextRun { text } => text.get(*start..*end).unwrap_or_default(),
                _ => "",
            },
            Unit::Atom(n) if doc.kind(*n).is_image() => "\u{FFFC}",
            Unit::Atom(_) => "\n",
        }
    }
}

/// Visible units and caret stops of one text block.
#[derive(Debug, Clone)]
pub(crate) struct BlockStops {
    pub block: NodeId,
    pub units: Vec<Unit>,
    pub placeholder: Option<NodeId>,
    list_item: bool,
    spans: HashMap<NodeId, (usize, usize)>,
}

impl BlockStops {
    pub fn collect(doc: &Document, block: NodeId) -> Self {
        let mut stops = Self {
            block,
            units: vec![],
            placeholder: None,
            list_item: matches!(doc.kind(block), NodeKind::ListItem { .. }),
            spans: HashMap::new(),
        };

        if matches!(doc.kind(block), NodeKind::CodeBlock { .. }) {
            if let Some(run) = doc.first_text_run(block) {
                stops.visit(doc, run, None);
            }
        } else {
            for &child in doc.inline_children(block) {
                stops.visit(doc, child, None);
            }
        }

        if !stops.units.is_empty() {
            stops.placeholder = None;
        }
        stops
    }

    fn visit(&mut self, doc: &Document, node: NodeId, code: Option<NodeId>) {
        let start = self.units.len();
        if !doc.flags(node).excludes() {
            match doc.kind(node) {
                NodeKind::TextRun { text } => self.visit_run(doc, node, text, code),
                NodeKind::InlineCode => {
                    for &child in doc.children(node) {
                        self.visit(doc, child, Some(node));
                    }
                }
                NodeKind::Image { .. } | NodeKind::LineBreak => self.units.push(Unit::Atom(node)),
                NodeKind::Boundary => {
                    self.placeholder.get_or_insert(node);
                }
                _ => {}
            }
        }
        self.spans.insert(node, (start, self.units.len()));
    }

    fn visit_run(&mut self, doc: &Document, run: NodeId, text: &str, code: Option<NodeId>) {
        let is_code_block = matches!(doc.kind(self.block), NodeKind::CodeBlock { .. });
        if is_code_block && text.is_empty() {
            self.placeholder.get_or_insert(run);
            return;
        }
        if self.list_item && code.is_none() && text.chars().all(char::is_whitespace) {
            if text.contains(NBSP) {
                self.placeholder.get_or_insert(run);
            }
            // Formatting whitespace between a list item's text and its sublist.
            if text.contains(NBSP) || text.contains('\n') {
                return;
            }
        }
        let mut index = 0;
        for (byte, cluster) in text.grapheme_indices(true) {
            let len = cluster.chars().count();
            let start = index;
            index += len;
            let Some(ch) = cluster.chars().find(|c| !ZERO_WIDTH.contains(c)) else {
                continue;
            };
            self.units.push(Unit::Char {
                run,
                index: start,
                len,
                bytes: (byte, byte + cluster.len()),
                ch,
                code,
            });
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the caret can rest anywhere in this block.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        !self.units.is_empty() || self.placeholder.is_some()
    }

    /// Code span of the unit right after offset `k`.
    pub fn code_at(&self, k: usize) -> Option<NodeId> {
        self.units.get(k).and_then(Unit::code)
    }

    /// Code span of the unit right before offset `k`.
    pub fn code_before(&self, k: usize) -> Option<NodeId> {
        k.checked_sub(1)
            .and_then(|i| self.units.get(i))
            .and_then(Unit::code)
    }

    /// Stops at offset `k`, outside before inside.
    pub fn stops_at(&self, k: usize) -> Vec<Stop> {
        match self.code_at(k) {
            Some(span) if self.code_before(k) != Some(span) => {
                vec![Stop::outside(k), Stop::inside(k)]
            }
            Some(_) => vec![Stop::inside(k)],
            None => vec![Stop::outside(k)],
        }
    }

    /// Every stop of the block in order.
    pub fn stops(&self) -> Vec<Stop> {
        (0..=self.len()).flat_map(|k| self.stops_at(k)).collect()
    }

    pub fn first(&self) -> Stop {
        Stop::outside(0)
    }

    pub fn last(&self) -> Stop {
        Stop::outside(self.len())
    }

    /// `stop` if it exists, otherwise the other stop at the same offset.
    pub fn snap(&self, stop: Stop) -> Stop {
        let k = stop.k.min(self.len());
        let at = self.stops_at(k);
        at.iter()
            .copied()
            .find(|s| s.inside == stop.inside)
            .unwrap_or(at[0])
    }

    /// The nearest outside stop at or before `k`; steps out of a code span
    /// to its left edge.
    pub fn outside_left_of(&self, k: usize) -> Stop {
        let mut k = k.min(self.len());
        while let Some(span) = self.code_before(k) {
            if self.code_at(k) != Some(span) {
                break;
            }
            k -= 1;
        }
        Stop::outside(k)
    }

    /// Unit offsets covered by `node`, climbing to the nearest recorded
    /// ancestor for nodes inside skipped subtrees.
    pub fn locate(&self, doc: &Document, node: NodeId) -> Option<(usize, usize)> {
        std::iter::once(node)
            .chain(doc.ancestors(node))
            .take_while(|n| *n != self.block)
            .find_map(|n| self.spans.get(&n).copied())
    }

    /// The logical line (between breaks) containing offset `k`.
    pub fn segment(&self, doc: &Document, k: usize) -> (usize, usize) {
        let k = k.min(self.len());
        let start = self.units[..k]
            .iter()
            .rposition(|u| u.is_break(doc))
            .map_or(0, |i| i + 1);
        let end = self.units[k..]
            .iter()
            .position(|u| u.is_break(doc))
            .map_or(self.len(), |i| k + i);
        (start, end)
    }

    /// Offset of the unit that is `node`, for atoms.
    pub fn unit_of(&self, node: NodeId) -> Option<usize> {
        self.units.iter().position(|u| u.atom() == Some(node))
    }

    /// Canonical position for a stop.
    pub fn encode(&self, stop: Stop) -> Option<Position> {
        let k = stop.k;
        let prev = k.checked_sub(1).and_then(|i| self.units.get(i));
        let next = self.units.get(k);

        let position = if stop.inside {
            match next {
                Some(Unit::Char { run, index, .. }) => Position::TextOffset {
                    run: *run,
                    offset: *index,
                },
                _ => return None,
            }
        } else {
            match (prev, next) {
                (
                    Some(Unit::Char {
                        run,
                        index,
                        len,
                        code: None,
                        ..
                    }),
                    _,
                ) => Position::TextOffset {
                    run: *run,
                    offset: index + len,
                },
                (
                    _,
                    Some(Unit::Char {
                        run,
                        index,
                        code: None,
                        ..
                    }),
                ) => Position::TextOffset {
                    run: *run,
                    offset: *index,
                },
                (Some(Unit::Atom(n)), _) => Position::AfterNode(*n),
                (_, Some(Unit::Atom(n))) => Position::BeforeNode(*n),
                (
                    Some(Unit::Char {
                        code: Some(span), ..
                    }),
                    _,
                ) => Position::AfterNode(*span),
                (
                    _,
                    Some(Unit::Char {
                        code: Some(span), ..
                    }),
                ) => Position::BeforeNode(*span),
                (None, None) => Position::TextOffset {
                    run: self.placeholder?,
                    offset: 0,
                },
            }
        };

        Some(match position {
            Position::TextOffset { run, offset } if self.list_item => Position::InsideListItem {
                item: self.block,
                run,
                offset,
            },
            other => other,
        })
    }

    /// The stop a canonical or raw position lands on inside this block.
    pub fn stop_of(&self, doc: &Document, position: &Position) -> Option<Stop> {
        let stop = match *position {
            Position::TextOffset { run, offset } | Position::InsideListItem { run, offset, .. } => {
                let (start, end) = self.locate(doc, run)?;
                let visible = self.units[start..end]
                    .iter()
                    .filter(|u| matches!(u, Unit::Char { run: r, index, .. } if *r == run && *index < offset))
                    .count();
                let k = start + visible;
                let in_code = doc
                    .parent(run)
                    .is_some_and(|p| matches!(doc.kind(p), NodeKind::InlineCode));
                Stop {
                    k,
                    inside: in_code && k < end,
                }
            }
            Position::BeforeNode(n) => Stop::outside(self.locate(doc, n)?.0),
            Position::AfterNode(n) => Stop::outside(self.locate(doc, n)?.1),
        };
        Some(self.snap(stop))
    }
}
