//! Edge controller configuration
//!
//! Defaults match the classic iOS affordance: a 60pt indicator, a bottom
//! edge that arms 40pt before the true end of the content, and 0.3s
//! ease-in-out inset transitions.
//!
//! ```rust
//! use brink_refresh::config::RefreshConfig;
//!
//! let config = RefreshConfig::from_toml_str(
//!     r#"
//!     [bottom]
//!     slack = 80.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.bottom.slack, 80.0);
//! assert_eq!(config.top.indicator_height, 60.0);
//! ```

use brink_animation::Easing;
use brink_core::Edge;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Height of the indicator strip
pub const DEFAULT_INDICATOR_HEIGHT: f32 = 60.0;

/// How far before the end of the content the bottom edge arms
pub const DEFAULT_SLACK: f32 = 40.0;

/// Duration of inset and auto-scroll transitions, in seconds
pub const DEFAULT_TRANSITION_DURATION: f32 = 0.3;

/// Configuration for one edge controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Height of the affordance, fixed for the controller's lifetime
    pub indicator_height: f32,
    /// Bottom edge arming slack (ignored by the top edge)
    pub slack: f32,
    /// Inset reservation/restore transition duration in seconds
    pub inset_duration: f32,
    /// Curve for inset transitions
    pub easing: Easing,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            indicator_height: DEFAULT_INDICATOR_HEIGHT,
            slack: DEFAULT_SLACK,
            inset_duration: DEFAULT_TRANSITION_DURATION,
            easing: Easing::EaseInOut,
        }
    }
}

impl EdgeConfig {
    /// Inset changes land on the next frame
    pub fn instant() -> Self {
        Self {
            inset_duration: 0.0,
            ..Default::default()
        }
    }

    /// Smaller indicator for dense lists
    pub fn compact() -> Self {
        Self {
            indicator_height: 44.0,
            slack: 24.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.indicator_height.is_finite() || self.indicator_height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "indicator_height must be positive, got {}",
                self.indicator_height
            )));
        }
        if !self.slack.is_finite() {
            return Err(ConfigError::Invalid("slack must be finite".into()));
        }
        if !self.inset_duration.is_finite() || self.inset_duration < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "inset_duration must be non-negative, got {}",
                self.inset_duration
            )));
        }
        Ok(())
    }
}

/// Configuration for both edges of a container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub top: EdgeConfig,
    pub bottom: EdgeConfig,
}

impl RefreshConfig {
    /// Same configuration for both edges
    pub fn uniform(config: EdgeConfig) -> Self {
        Self {
            top: config,
            bottom: config,
        }
    }

    pub fn for_edge(&self, edge: Edge) -> EdgeConfig {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// Parse from TOML; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RefreshConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.top.validate()?;
        self.bottom.validate()
    }
}
