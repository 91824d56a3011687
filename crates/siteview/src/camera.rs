use glam::{Mat4, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CameraProjection {
    Perspective {
        aspect: Option<f32>,
        yfov: f32,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        zfar: f32,
        znear: f32,
    },
}

impl Default for CameraProjection {
    fn default() -> Self {
        CameraProjection::Perspective {
            aspect: None,
            yfov: 75.0,
            znear: 0.01,
            zfar: Some(1000.0),
        }
    }
}

impl CameraProjection {
    pub fn update_aspect(&mut self, new_aspect: f32) {
        if let CameraProjection::Perspective { aspect, .. } = self {
            *aspect = Some(new_aspect);
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, CameraProjection::Perspective { .. })
    }

    pub fn matrix(&self, default_aspect: f32) -> Mat4 {
        match self {
            CameraProjection::Perspective {
                aspect,
                yfov,
                znear,
                zfar,
            } => {
                let aspect = aspect.unwrap_or(default_aspect);
                if let Some(zfar) = zfar {
                    Mat4::perspective_rh(yfov.to_radians(), aspect, *znear, *zfar)
                } else {
                    Mat4::perspective_infinite_rh(yfov.to_radians(), aspect, *znear)
                }
            }
            CameraProjection::Orthographic {
                xmag,
                ymag,
                zfar,
                znear,
            } => Mat4::orthographic_rh(
                -*xmag / 2.0,
                *xmag / 2.0,
                -*ymag / 2.0,
                *ymag / 2.0,
                *znear,
                *zfar,
            ),
        }
    }
}

/// Where the camera sits and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or(Vec3::NEG_Z)
    }

    // Looking straight up or down makes +Y useless as an up vector
    fn up(&self) -> Vec3 {
        let forward = self.forward();
        if forward.cross(Vec3::Y).length_squared() <= 1.0e-6 {
            if forward.y < 0.0 {
                Vec3::NEG_Z
            } else {
                Vec3::Z
            }
        } else {
            Vec3::Y
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up())
    }

    /// Position and look-at blended independently.
    pub fn lerp(&self, other: &CameraPose, progress: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, progress),
            look_at: self.look_at.lerp(other.look_at, progress),
        }
    }

    pub fn abs_diff_eq(&self, other: &CameraPose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && self.look_at.abs_diff_eq(other.look_at, max_abs_diff)
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub pose: CameraPose,
    pub projection: CameraProjection,
}

impl Camera {
    pub fn new(pose: CameraPose, projection: CameraProjection) -> Self {
        Self { pose, projection }
    }

    pub fn update_aspect(&mut self, new_aspect: f32) {
        self.projection.update_aspect(new_aspect);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.pose.matrix()
    }

    pub fn view_projection(&self, default_aspect: f32) -> Mat4 {
        let proj = self.projection.matrix(default_aspect);
        let view = self.pose.matrix();
        proj * view
    }
}

#[cfg(test)]
mod test {
    use glam::{Vec3, Vec4Swizzles};

    use super::{Camera, CameraPose, CameraProjection};

    #[test]
    fn test_look_down_is_not_degenerate() {
        let pose = CameraPose::new(Vec3::new(0.0, 70.0, 0.0), Vec3::ZERO);
        let matrix = pose.matrix();
        assert!(matrix.is_finite());
        let center = matrix.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 0.0, -70.0), 1e-4));
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::new(
            CameraPose::new(Vec3::new(5.0, 20.0, 25.0), Vec3::new(5.0, 10.0, 5.0)),
            CameraProjection::default(),
        );
        let clip = camera.view_projection(1.5) * Vec3::new(5.0, 10.0, 5.0).extend(1.0);
        let ndc = clip.xy() / clip.w;
        assert!(ndc.abs_diff_eq(glam::Vec2::ZERO, 1e-5));
    }

    #[test]
    fn test_lerp_blends_independently() {
        let from = CameraPose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        let to = CameraPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        let half = from.lerp(&to, 0.5);
        assert_eq!(half.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(half.look_at, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_update_aspect_only_perspective() {
        let mut projection = CameraProjection::Orthographic {
            xmag: 10.0,
            ymag: 10.0,
            zfar: 100.0,
            znear: 0.1,
        };
        projection.update_aspect(2.0);
        assert!(!projection.is_perspective());

        let mut projection = CameraProjection::default();
        projection.update_aspect(2.0);
        assert!(matches!(
            projection,
            CameraProjection::Perspective {
                aspect: Some(2.0),
                ..
            }
        ));
    }
}
