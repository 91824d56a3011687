//! Presentation tuning for the engine.
//!
//! Every field has a default, so a partial JSON document is enough when the
//! `serde` feature is on.

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    camera::{CameraPose, CameraProjection},
    highlight::DEFAULT_DIMMED_OPACITY,
    label::LabelStyle,
};

fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    pub ground: Vec3,
    pub building: Vec3,
    pub label: Vec3,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ground: rgb(0x6f6f6f),
            building: rgb(0x0166b1),
            label: Vec3::ONE,
        }
    }
}

/// Where a building's name sits: near the top of the corner facing -X/+Z,
/// pulled `inset` inside the walls and `drop` below the roof, turned to
/// face a point `lift` above itself.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LabelLayout {
    pub inset: f32,
    pub drop: f32,
    pub lift: f32,
    pub style: LabelStyle,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            inset: 1.0,
            drop: 1.9,
            lift: 10.0,
            style: LabelStyle::default(),
        }
    }
}

impl LabelLayout {
    /// Label position and look-at anchor for a box of `extent`, in the box's
    /// own space.
    pub fn anchors(&self, extent: Vec3) -> (Vec3, Vec3) {
        let position = Vec3::new(
            -extent.x / 2.0 + self.inset,
            extent.y / 2.0 - self.drop,
            extent.z / 2.0 - self.inset,
        );
        (position, position + Vec3::Y * self.lift)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub dimmed_opacity: f32,
    pub focus_duration_ms: f32,
    /// Camera offset from a focused building's center
    pub closeup_offset: Vec3,
    pub overview: CameraPose,
    pub projection: CameraProjection,
    pub label: LabelLayout,
    pub palette: Palette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimmed_opacity: DEFAULT_DIMMED_OPACITY,
            focus_duration_ms: 700.0,
            closeup_offset: Vec3::new(0.0, 10.0, 20.0),
            overview: CameraPose::new(Vec3::new(0.0, 70.0, 0.0), Vec3::ZERO),
            projection: CameraProjection::default(),
            label: LabelLayout::default(),
            palette: Palette::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.dimmed_opacity) {
            return Err(ConfigError::DimmedOpacity(self.dimmed_opacity));
        }
        if !(self.focus_duration_ms.is_finite() && self.focus_duration_ms >= 0.0) {
            return Err(ConfigError::FocusDuration(self.focus_duration_ms));
        }
        if !self.closeup_offset.is_finite() {
            return Err(ConfigError::NotFinite("closeup_offset"));
        }
        if self.closeup_offset == Vec3::ZERO {
            return Err(ConfigError::ZeroCloseupOffset);
        }
        if !(self.overview.position.is_finite() && self.overview.look_at.is_finite()) {
            return Err(ConfigError::NotFinite("overview"));
        }
        if self.overview.position == self.overview.look_at {
            return Err(ConfigError::DegenerateOverview);
        }
        if let CameraProjection::Perspective { yfov, .. } = self.projection {
            if !(yfov > 0.0 && yfov < 180.0) {
                return Err(ConfigError::FieldOfView(yfov));
            }
        }
        if !(self.label.style.size > 0.0) {
            return Err(ConfigError::LabelSize(self.label.style.size));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    DimmedOpacity(f32),
    FocusDuration(f32),
    NotFinite(&'static str),
    ZeroCloseupOffset,
    DegenerateOverview,
    FieldOfView(f32),
    LabelSize(f32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DimmedOpacity(value) => {
                write!(f, "Dimmed opacity must be within 0..=1, got {}", value)
            }
            ConfigError::FocusDuration(value) => write!(f, "Bad focus duration: {}ms", value),
            ConfigError::NotFinite(field) => write!(f, "Non-finite value in {}", field),
            ConfigError::ZeroCloseupOffset => {
                write!(f, "Close-up offset would put the camera inside the building")
            }
            ConfigError::DegenerateOverview => {
                write!(f, "Overview camera looks at its own position")
            }
            ConfigError::FieldOfView(value) => write!(f, "Bad field of view: {}", value),
            ConfigError::LabelSize(value) => write!(f, "Bad label size: {}", value),
        }
    }
}

impl Error for ConfigError {}
