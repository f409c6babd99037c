//! # Ray Picking
//!
//! Turns pointer positions into world-space rays and intersects them with the
//! ground plane and with item bounding boxes.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: the input system maps window pixels to -1..1
//! 2. **NDC to Ray**: near and far clip points are unprojected through the
//!    inverse view-projection matrix
//! 3. **Intersection**: the ray is tested against a finite horizontal plane
//!
//! ## Usage
//!
//! ```rust
//! use garden_designer::config::SceneConfig;
//! use garden_designer::gfx::camera::PerspectiveCamera;
//! use garden_designer::gfx::picking::{GroundPlane, Ray};
//!
//! let camera = PerspectiveCamera::new(&SceneConfig::default(), 1.5);
//! let ray = Ray::from_ndc(0.0, 0.0, &camera);
//! let hit = GroundPlane::new(10.0).intersect(&ray).unwrap();
//! assert!(hit.x.abs() < 0.05 && hit.z.abs() < 0.05);
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::camera::PerspectiveCamera;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Builds the world-space ray through normalized device coordinates
    ///
    /// # Arguments
    /// * `ndc_x` - Horizontal position, -1 (left) to 1 (right)
    /// * `ndc_y` - Vertical position, -1 (bottom) to 1 (top)
    /// * `camera` - Camera the pointer is looking through
    pub fn from_ndc(ndc_x: f32, ndc_y: f32, camera: &PerspectiveCamera) -> Self {
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let inv_view_proj = view_proj.invert().unwrap_or(Matrix4::from_scale(1.0));

        let unproject = |z: f32| {
            let world = inv_view_proj * Vector4::new(ndc_x, ndc_y, z, 1.0);
            world.truncate() / world.w
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);

        Ray::new(near, far - near)
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::from(vertices[0]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::from(*vertex);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> Self {
        Self::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.min.y, self.min.z],
            [self.min.x, self.max.y, self.min.z],
            [self.min.x, self.min.y, self.max.z],
            [self.max.x, self.max.y, self.min.z],
            [self.max.x, self.min.y, self.max.z],
            [self.min.x, self.max.y, self.max.z],
            [self.max.x, self.max.y, self.max.z],
        ];

        let transformed: Vec<[f32; 3]> = corners
            .iter()
            .map(|c| {
                let p = matrix * Vector4::new(c[0], c[1], c[2], 1.0);
                [p.x / p.w, p.y / p.w, p.z / p.w]
            })
            .collect();

        Self::from_vertices(&transformed)
    }
}

/// Finite horizontal plane at `y`, spanning ±`half_extent` on X and Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub y: f32,
    pub half_extent: f32,
}

impl GroundPlane {
    pub fn new(half_extent: f32) -> Self {
        Self {
            y: 0.0,
            half_extent,
        }
    }

    /// Point where `ray` hits the plane, if it does so in front of its origin
    /// and inside the plane's extent
    pub fn intersect(&self, ray: &Ray) -> Option<Vector3<f32>> {
        if ray.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.y - ray.origin.y) / ray.direction.y;
        if t < 0.0 {
            return None;
        }

        let mut point = ray.point_at(t);
        point.y = self.y;
        let inside = point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent;
        inside.then_some(point)
    }
}
