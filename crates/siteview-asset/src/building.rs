#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Building {
    pub id: String,
    pub name: String,
    pub width_x: f32,
    pub width_z: f32,
    pub height_y: f32,
    /// Footprint center on the ground plane
    pub origin_x: f32,
    pub origin_z: f32,
}

impl Building {
    /// The footprint center lifted to half the height, so a box of this
    /// size placed there rests on the ground plane.
    pub fn center(&self) -> [f32; 3] {
        [self.origin_x, self.height_y / 2.0, self.origin_z]
    }

    pub fn extent(&self) -> [f32; 3] {
        [self.width_x, self.height_y, self.width_z]
    }
}
