use serde::{Deserialize, Serialize};

/// Visual-fidelity constants used by vertical movement.
///
/// None of these change what a move means, only how eagerly geometry
/// candidates are accepted before the structural fallback takes over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavTuning {
    /// Rectangles whose vertical overlap is within this many pixels of the
    /// smaller height are merged into one visual line.
    pub line_merge_tolerance: f32,
    /// Largest accepted jump, in line heights, for a geometry candidate.
    pub jump_guard_line_heights: f32,
    /// How many line heights past the origin coordinate probing reaches.
    pub max_probe_steps: u32,
    /// Horizontal offsets tried around the caret x when probing a line.
    pub probe_x_jitter: Vec<f32>,
    /// Distance under which a caret counts as sitting at its line's start.
    pub line_start_epsilon: f32,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            line_merge_tolerance: 3.0,
            jump_guard_line_heights: 1.65,
            max_probe_steps: 6,
            probe_x_jitter: vec![0.0, 1.0, -1.0, 2.0, -2.0],
            line_start_epsilon: 1.0,
        }
    }
}
