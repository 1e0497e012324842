#![forbid(unsafe_code)]

//! Roller configuration.
//!
//! Every tunable of the roller lives in one [`RollerConfig`] that can be
//! loaded from TOML or JSON at startup.
//!
//! ```toml
//! # roller.toml
//! max_height = 400
//! wrap = false
//! arranger = "top_bottom"
//!
//! [markers]
//! resting = "normal"
//! editing = "editing"
//! ```
//!
//! ```rust,ignore
//! let config = RollerConfig::from_toml_file("roller.toml")?;
//! ```
//!
//! Missing keys fall back to [`RollerConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arranger::{Arranger, CardArranger, LeftRightArranger, TopBottomArranger};
use crate::error::ConfigError;

/// Top-level roller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollerConfig {
    /// Viewport extent along the arrangement axis, in cells.
    pub max_height: u16,

    /// Whether stepping past either end of the stack wraps around.
    pub wrap: bool,

    /// Arrangement strategy for the panel stack.
    pub arranger: ArrangerKind,

    /// Marker carried by the container regardless of state.
    pub container_class: String,

    /// Kind name given to every created panel.
    pub panel_kind: String,

    /// Presentation marker names.
    pub markers: MarkerConfig,
}

impl Default for RollerConfig {
    fn default() -> Self {
        Self {
            max_height: 400,
            wrap: false,
            arranger: ArrangerKind::default(),
            container_class: "roller-container".into(),
            panel_kind: "roller-panel".into(),
            markers: MarkerConfig::default(),
        }
    }
}

impl RollerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every field. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_height == 0 {
            errors.push("max_height must be > 0".into());
        }
        if self.panel_kind.trim().is_empty() {
            errors.push("panel_kind must not be empty".into());
        }
        if self.markers.resting.trim().is_empty() {
            errors.push("markers.resting must not be empty".into());
        }
        if self.markers.editing.trim().is_empty() {
            errors.push("markers.editing must not be empty".into());
        }
        if self.markers.resting == self.markers.editing {
            errors.push(format!(
                "markers.resting and markers.editing must differ, both are {:?}",
                self.markers.editing
            ));
        }
        if self.container_class == self.markers.resting
            || self.container_class == self.markers.editing
        {
            errors.push(format!(
                "container_class {:?} collides with a presentation marker",
                self.container_class
            ));
        }

        errors
    }
}

/// Names of the two mutually exclusive presentation markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub resting: String,
    pub editing: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            resting: "normal".into(),
            editing: "editing".into(),
        }
    }
}

/// Built-in arrangement strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangerKind {
    /// Panels stacked vertically; the active one scrolled into view.
    #[default]
    TopBottom,
    /// Panels side by side horizontally.
    LeftRight,
    /// Panels on top of each other; only the active one visible.
    Card,
}

impl ArrangerKind {
    /// Instantiate the strategy.
    #[must_use]
    pub fn build(self) -> Box<dyn Arranger> {
        match self {
            Self::TopBottom => Box::new(TopBottomArranger),
            Self::LeftRight => Box::new(LeftRightArranger),
            Self::Card => Box::new(CardArranger),
        }
    }
}
