use glam::Vec3;

// Direction components smaller than this are treated as parallel to a slab
const PARALLEL_EPSILON: f32 = 1e-8;

/// World space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        let half = extent.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab test against the outward faces only. Returns the ray parameter
    /// where the ray enters the box; a ray starting inside never enters it.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (min, max) = (self.min[axis], self.max[axis]);
            if d.abs() < PARALLEL_EPSILON {
                if o < min || o > max {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = ((min - o) * inv, (max - o) * inv);
            let (t0, t1) = if t0 > t1 { (t1, t0) } else { (t0, t1) };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_near >= 0.0 {
            Some(t_near)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use glam::Vec3;

    use super::Aabb;

    fn unit_box() -> Aabb {
        Aabb::from_center_extent(Vec3::ZERO, Vec3::splat(2.0))
    }

    #[test]
    fn test_hit_from_outside() {
        let t = unit_box().intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn test_miss_behind_origin() {
        let t = unit_box().intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(t, None);
    }

    #[test]
    fn test_parallel_ray_outside_slab() {
        let t = unit_box().intersect_ray(Vec3::new(0.0, 3.0, 5.0), Vec3::NEG_Z);
        assert_eq!(t, None);
    }

    #[test]
    fn test_origin_inside_is_no_hit() {
        assert_eq!(unit_box().intersect_ray(Vec3::ZERO, Vec3::X), None);
        assert_eq!(unit_box().intersect_ray(Vec3::new(0.5, 0.9, 0.0), Vec3::Y), None);
    }

    #[test]
    fn test_diagonal_ray() {
        let direction = Vec3::new(-1.0, -1.0, 0.0).normalize();
        let t = unit_box()
            .intersect_ray(Vec3::new(3.0, 3.0, 0.0), direction)
            .unwrap();
        let hit = Vec3::new(3.0, 3.0, 0.0) + direction * t;
        assert!(hit.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_contains() {
        let aabb = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, -1.0));
        assert!(aabb.contains(Vec3::new(0.0, 0.5, 0.0)));
        assert!(!aabb.contains(Vec3::new(0.0, 1.5, 0.0)));
        assert_eq!(aabb.center(), Vec3::new(0.0, 0.5, 0.0));
    }
}
