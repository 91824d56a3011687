#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::building::Building;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Site {
    pub id: String,
    pub name: String,
    pub width_x: f32,
    pub width_z: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub buildings: Vec<Building>,
}

impl Site {
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|building| building.id == id)
    }
}
