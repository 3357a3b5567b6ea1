//! Scroll edges watched by refresh controllers

use serde::{Deserialize, Serialize};

/// Boundary of the scrollable content being monitored
///
/// `Top` drives pull-to-refresh, `Bottom` drives infinite scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 2] = [Edge::Top, Edge::Bottom];

    /// Has the offset moved past the threshold, away from the content?
    ///
    /// The top edge arms on offsets more negative than the threshold, the
    /// bottom edge on offsets greater than it.
    pub fn is_past(self, offset_y: f32, threshold: f32) -> bool {
        match self {
            Edge::Top => offset_y < threshold,
            Edge::Bottom => offset_y > threshold,
        }
    }

    /// Has the offset come back to the content side of the threshold?
    ///
    /// Not the exact negation of [`Edge::is_past`]: for the bottom edge an
    /// offset sitting exactly on the threshold is neither.
    pub fn has_returned(self, offset_y: f32, threshold: f32) -> bool {
        match self {
            Edge::Top => offset_y >= threshold,
            Edge::Bottom => offset_y < threshold,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
