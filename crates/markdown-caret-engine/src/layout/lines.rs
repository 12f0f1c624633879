/// An axis-aligned rectangle in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn mid_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// Zero-size artifacts carry no line information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Length of the shared vertical extent; negative when disjoint.
    #[must_use]
    pub fn vertical_overlap(&self, top: f32, bottom: f32) -> f32 {
        self.bottom.min(bottom) - self.top.max(top)
    }
}

/// One visual line: the union of rectangles sharing a vertical band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBand {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl LineBand {
    fn from_rect(r: &Rect) -> Self {
        Self {
            top: r.top,
            bottom: r.bottom,
            left: r.left,
            right: r.right,
        }
    }

    #[must_use]
    pub fn mid_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    #[must_use]
    pub fn contains_y(&self, y: f32) -> bool {
        self.top <= y && y <= self.bottom
    }

    fn absorb(&mut self, r: &Rect) {
        self.top = self.top.min(r.top);
        self.bottom = self.bottom.max(r.bottom);
        self.left = self.left.min(r.left);
        self.right = self.right.max(r.right);
    }
}

/// Groups rectangles into visual lines.
///
/// Two rects share a line when their vertical overlap is within `tolerance`
/// of the smaller height. Bidi runs and ligatures often produce several
/// slightly offset rects for what is visually one line.
pub fn merge_into_lines(rects: &[Rect], tolerance: f32) -> Vec<LineBand> {
    let mut sorted: Vec<&Rect> = rects.iter().filter(|r| !r.is_empty()).collect();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.left.total_cmp(&b.left)));

    let mut lines: Vec<LineBand> = vec![];
    for r in sorted {
        if let Some(line) = lines.last_mut() {
            let overlap = r.vertical_overlap(line.top, line.bottom);
            let min_height = r.height().min(line.bottom - line.top);
            if overlap > 0.0 && overlap >= min_height - tolerance {
                line.absorb(r);
                continue;
            }
        }
        lines.push(LineBand::from_rect(r));
    }
    lines
}
