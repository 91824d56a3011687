use glam::{Vec2, Vec3};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    camera::{Camera, CameraProjection},
    graph::SceneGraph,
    node::{NodeIndex, NodeKind},
};

/// Bounding rectangle of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Client coordinates to normalized device coordinates, +Y up.
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            (client_x - self.left) / self.width * 2.0 - 1.0,
            -(client_y - self.top) / self.height * 2.0 + 1.0,
        ))
    }

    pub fn from_ndc(&self, ndc: Vec2) -> (f32, f32) {
        (
            self.left + (ndc.x + 1.0) / 2.0 * self.width,
            self.top + (1.0 - ndc.y) / 2.0 * self.height,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray through a point given in normalized device coordinates.
    pub fn from_camera(camera: &Camera, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let inverse = camera.view_projection(aspect).inverse();
        if !inverse.is_finite() {
            return None;
        }
        let ray = match camera.projection {
            CameraProjection::Perspective { .. } => {
                let origin = camera.pose.position;
                let through = inverse.project_point3(ndc.extend(0.5));
                Ray {
                    origin,
                    direction: (through - origin).normalize_or_zero(),
                }
            }
            CameraProjection::Orthographic { .. } => Ray {
                origin: inverse.project_point3(ndc.extend(0.0)),
                direction: camera.pose.forward(),
            },
        };
        (ray.direction != Vec3::ZERO && ray.origin.is_finite()).then_some(ray)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub index: NodeIndex,
    pub id: String,
    pub kind: NodeKind,
    pub distance: f32,
    pub point: Vec3,
}

/// Resolves pointer positions to the nearest site or building node.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayPicker;

impl RayPicker {
    pub fn pick(
        &self,
        pointer_ndc: Vec2,
        camera: &Camera,
        aspect: f32,
        graph: &SceneGraph,
    ) -> Option<PickHit> {
        let ray = Ray::from_camera(camera, pointer_ndc, aspect)?;
        self.cast(&ray, graph)
    }

    /// Nearest hit along the ray. On equal distance the node met first in
    /// traversal order wins. Boxes around the ray origin are seen from the
    /// inside and never hit.
    pub fn cast(&self, ray: &Ray, graph: &SceneGraph) -> Option<PickHit> {
        let mut nearest: Option<(NodeIndex, f32)> = None;
        for (index, node) in graph.iter() {
            if !node.kind().is_pickable() {
                continue;
            }
            let Some(bounds) = graph.world_bounds(index) else {
                continue;
            };
            let Some(distance) = bounds.intersect_ray(ray.origin, ray.direction) else {
                continue;
            };
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((index, distance));
            }
        }

        let (index, distance) = nearest?;
        let node = graph.node(index)?;
        debug!("Picked {} {} at distance {:.3}", node.kind(), node.id(), distance);
        Some(PickHit {
            index,
            id: node.id().to_string(),
            kind: node.kind(),
            distance,
            point: ray.at(distance),
        })
    }
}
