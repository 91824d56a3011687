use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use glam::{Quat, Vec3};
use log::info;
use siteview_asset::{Building, Site};

use crate::{
    config::{LabelLayout, Palette},
    graph::{GraphError, SceneGraph},
    node::{LabelText, NodeKind, SceneNode},
};

/// Height of the ground slab.
pub const GROUND_THICKNESS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidModelError {
    Site {
        id: String,
        field: &'static str,
        value: f32,
    },
    Building {
        id: String,
        field: &'static str,
        value: f32,
    },
    DuplicateId(String),
    Scene(GraphError),
}

impl Display for InvalidModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidModelError::Site { id, field, value } => {
                write!(f, "Site {} has invalid {}: {}", id, field, value)
            }
            InvalidModelError::Building { id, field, value } => {
                write!(f, "Building {} has invalid {}: {}", id, field, value)
            }
            InvalidModelError::DuplicateId(id) => write!(f, "Duplicate id {} in site", id),
            InvalidModelError::Scene(error) => write!(f, "Failed to assemble scene: {}", error),
        }
    }
}

impl Error for InvalidModelError {}

impl From<GraphError> for InvalidModelError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::DuplicateId(id) => Self::DuplicateId(id),
            error => Self::Scene(error),
        }
    }
}

pub fn label_id(building_id: &str) -> String {
    format!("{}#label", building_id)
}

fn check_dimension(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Turns a site into a scene graph rooted at the ground slab.
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    label_layout: LabelLayout,
    palette: Palette,
}

impl SceneBuilder {
    pub fn new(label_layout: LabelLayout, palette: Palette) -> Self {
        Self {
            label_layout,
            palette,
        }
    }

    pub fn build(&self, site: &Site) -> Result<SceneGraph, InvalidModelError> {
        validate_site(site)?;

        let ground = SceneNode::new(site.id.as_str(), NodeKind::Site)
            .with_extent(Vec3::new(site.width_x, GROUND_THICKNESS, site.width_z))
            .with_color(self.palette.ground);
        let mut graph = SceneGraph::new(ground);
        let root = graph.root();

        for building in &site.buildings {
            let extent = Vec3::from_array(building.extent());
            let node = SceneNode::new(building.id.as_str(), NodeKind::Building)
                .with_extent(extent)
                .with_translation(Vec3::from_array(building.center()))
                .with_color(self.palette.building);
            let index = graph.add_node(root, node)?;
            graph.add_node(index, self.label_node(building, extent))?;
        }

        info!(
            "Built scene for site {} ({}) with {} buildings",
            site.id,
            site.name,
            site.buildings.len()
        );
        Ok(graph)
    }

    fn label_node(&self, building: &Building, extent: Vec3) -> SceneNode {
        let (position, look_at) = self.label_layout.anchors(extent);
        let facing = (look_at - position).normalize_or(Vec3::Z);
        SceneNode::new(label_id(&building.id), NodeKind::Label)
            .with_translation(position)
            .with_rotation(Quat::from_rotation_arc(Vec3::Z, facing))
            .with_color(self.palette.label)
            .with_label(LabelText {
                text: building.name.clone(),
                look_at,
            })
    }
}

fn validate_site(site: &Site) -> Result<(), InvalidModelError> {
    for (field, value) in [("widthX", site.width_x), ("widthZ", site.width_z)] {
        if !check_dimension(value) {
            return Err(InvalidModelError::Site {
                id: site.id.clone(),
                field,
                value,
            });
        }
    }
    for building in &site.buildings {
        let dimensions = [
            ("widthX", building.width_x),
            ("widthZ", building.width_z),
            ("heightY", building.height_y),
        ];
        for (field, value) in dimensions {
            if !check_dimension(value) {
                return Err(InvalidModelError::Building {
                    id: building.id.clone(),
                    field,
                    value,
                });
            }
        }
        for (field, value) in [("originX", building.origin_x), ("originZ", building.origin_z)] {
            if !value.is_finite() {
                return Err(InvalidModelError::Building {
                    id: building.id.clone(),
                    field,
                    value,
                });
            }
        }
    }
    Ok(())
}
