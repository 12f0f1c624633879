//! Cross-call navigation memory.
//!
//! Some gestures span two keystrokes while the surface in between holds a
//! selection that cannot express the intended caret (a browser moves a caret
//! at the start of inline code out of the span, and may turn a selected image
//! into a caret). Each slot remembers the selection the surface reported
//! right after the write; the slot only applies while the surface still
//! reports exactly that selection.

use log::debug;

use crate::document::NodeId;
use crate::position::{Selection, Spot};

/// The caret was meant to sit at a spot the surface rewrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingBoundaryEntry {
    pub observed: Selection,
    pub intended: Spot,
}

/// An image was selected but the surface reports a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingImageStep {
    pub observed: Selection,
    pub image: NodeId,
}

/// Column to keep while moving through code block lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CodeColumn {
    pub observed: Selection,
    pub column: usize,
}

/// What a call may take over from the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Carried {
    pub origin: Option<Spot>,
    pub code_column: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct NavContext {
    boundary: Option<PendingBoundaryEntry>,
    image: Option<PendingImageStep>,
    code_column: Option<CodeColumn>,
}

impl NavContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_pending_boundary(&self) -> bool {
        self.boundary.is_some()
    }

    #[must_use]
    pub fn has_pending_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Starts a call: drops every slot whose observed selection no longer
    /// matches `current` and hands out what is left. All slots are
    /// single-use.
    pub(crate) fn begin(&mut self, current: Option<&Selection>) -> Carried {
        let carried = self.peek(current);
        if self.boundary.is_some() || self.image.is_some() || self.code_column.is_some() {
            if carried == Carried::default() {
                debug!("selection changed since last move, dropping pending navigation state");
            }
            self.clear();
        }
        carried
    }

    /// What [`NavContext::begin`] would hand out, without consuming it.
    pub(crate) fn peek(&self, current: Option<&Selection>) -> Carried {
        let matches = |observed: &Selection| current == Some(observed);
        let origin = self
            .boundary
            .filter(|b| matches(&b.observed))
            .map(|b| b.intended)
            .or_else(|| {
                self.image
                    .filter(|i| matches(&i.observed))
                    .map(|i| Spot::Selected(i.image))
            });
        let code_column = self
            .code_column
            .filter(|c| matches(&c.observed))
            .map(|c| c.column);
        Carried {
            origin,
            code_column,
        }
    }

    pub(crate) fn remember_boundary(&mut self, observed: Selection, intended: Spot) {
        self.boundary = Some(PendingBoundaryEntry { observed, intended });
    }

    pub(crate) fn remember_image(&mut self, observed: Selection, image: NodeId) {
        self.image = Some(PendingImageStep { observed, image });
    }

    pub(crate) fn remember_code_column(&mut self, observed: Selection, column: usize) {
        self.code_column = Some(CodeColumn { observed, column });
    }
}
