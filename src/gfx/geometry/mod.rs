//! # Procedural Geometry Generation
//!
//! Every mesh in the garden is assembled from a handful of primitives. A
//! [`Shape`] names a primitive together with its parameters and doubles as the
//! cache key the asset manager memoizes geometry under.
//!
//! ## Supported Primitives
//!
//! - **Box**: axis-aligned cuboid
//! - **Sphere**: UV sphere with configurable resolution
//! - **Cylinder / Cone**: capped frustum along Y
//! - **Plane / Ring**: flat XY shapes facing +Z
//!
//! ## Usage
//!
//! ```rust
//! use garden_designer::gfx::geometry::Shape;
//!
//! let trunk = Shape::cylinder(0.2, 0.3, 2.0, 8).generate();
//! assert!(trunk.triangle_count() > 0);
//! ```

pub mod primitives;

use std::hash::{Hash, Hasher};

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions, normals and UVs into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<crate::gfx::scene::vertex::Vertex3D> {
        use crate::gfx::scene::vertex::Vertex3D;

        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

/// A primitive and its parameters
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
    },
}

impl Shape {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Box {
            width,
            height,
            depth,
        }
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Shape::Sphere {
            radius,
            width_segments,
            height_segments,
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        Shape::Cylinder {
            radius_top,
            radius_bottom,
            height,
            segments,
        }
    }

    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        Shape::Cone {
            radius,
            height,
            segments,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Shape::Plane { width, height }
    }

    pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Self {
        Shape::Ring {
            inner_radius,
            outer_radius,
            segments,
        }
    }

    pub fn generate(&self) -> GeometryData {
        match *self {
            Shape::Box {
                width,
                height,
                depth,
            } => generate_box(width, height, depth),
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => generate_sphere(radius, width_segments, height_segments),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => generate_cylinder(radius_top, radius_bottom, height, segments),
            Shape::Cone {
                radius,
                height,
                segments,
            } => generate_cone(radius, height, segments),
            Shape::Plane { width, height } => generate_plane(width, height, 1, 1),
            Shape::Ring {
                inner_radius,
                outer_radius,
                segments,
            } => generate_ring(inner_radius, outer_radius, segments),
        }
    }

    /// Discriminant plus raw parameter bits, used for equality and hashing
    fn bits(&self) -> (u8, [u32; 4]) {
        match *self {
            Shape::Box {
                width,
                height,
                depth,
            } => (0, [width.to_bits(), height.to_bits(), depth.to_bits(), 0]),
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => (1, [radius.to_bits(), width_segments, height_segments, 0]),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => (
                2,
                [
                    radius_top.to_bits(),
                    radius_bottom.to_bits(),
                    height.to_bits(),
                    segments,
                ],
            ),
            Shape::Cone {
                radius,
                height,
                segments,
            } => (3, [radius.to_bits(), height.to_bits(), segments, 0]),
            Shape::Plane { width, height } => (4, [width.to_bits(), height.to_bits(), 0, 0]),
            Shape::Ring {
                inner_radius,
                outer_radius,
                segments,
            } => (5, [inner_radius.to_bits(), outer_radius.to_bits(), segments, 0]),
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shapes_key_by_parameters() {
        let mut keys = HashSet::new();
        keys.insert(Shape::sphere(0.8, 8, 6));
        keys.insert(Shape::sphere(0.8, 8, 6));
        keys.insert(Shape::sphere(0.3, 8, 6));
        keys.insert(Shape::cone(0.3, 0.8, 6));
        keys.insert(Shape::cylinder(0.0, 0.3, 0.8, 6));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_vertex_interleave() {
        let data = Shape::plane(1.0, 1.0).generate();
        let vertices = data.to_vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3].tex_coords, [1.0, 1.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }
}
