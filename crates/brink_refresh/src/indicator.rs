//! Activity indicator model
//!
//! Rendering the spinner is up to the host; this tracks what it should show.

use brink_core::{Color, Point};
use serde::{Deserialize, Serialize};

/// Built-in spinner styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStyle {
    #[default]
    Gray,
    White,
    WhiteLarge,
}

/// Cosmetic change requested through the container API
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorAppearance {
    Color(Color),
    Style(IndicatorStyle),
}

impl From<Color> for IndicatorAppearance {
    fn from(color: Color) -> Self {
        IndicatorAppearance::Color(color)
    }
}

impl From<IndicatorStyle> for IndicatorAppearance {
    fn from(style: IndicatorStyle) -> Self {
        IndicatorAppearance::Style(style)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityIndicator {
    style: IndicatorStyle,
    color: Option<Color>,
    animating: bool,
    hides_when_stopped: bool,
    /// Center within the affordance's bounds
    center: Point,
}

impl ActivityIndicator {
    pub fn new(hides_when_stopped: bool) -> Self {
        Self {
            style: IndicatorStyle::default(),
            color: None,
            animating: false,
            hides_when_stopped,
            center: Point::ZERO,
        }
    }

    pub fn start_animating(&mut self) {
        self.animating = true;
    }

    pub fn stop_animating(&mut self) {
        self.animating = false;
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn hides_when_stopped(&self) -> bool {
        self.hides_when_stopped
    }

    pub fn set_hides_when_stopped(&mut self, hides: bool) {
        self.hides_when_stopped = hides;
    }

    /// Would the spinner be drawn right now?
    pub fn is_visible(&self) -> bool {
        self.animating || !self.hides_when_stopped
    }

    pub fn style(&self) -> IndicatorStyle {
        self.style
    }

    /// Explicit tint, overriding the style's color
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn apply(&mut self, appearance: IndicatorAppearance) {
        match appearance {
            IndicatorAppearance::Color(color) => self.color = Some(color),
            IndicatorAppearance::Style(style) => self.style = style,
        }
    }
}
