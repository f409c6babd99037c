//! Mesh groups: shared geometry/material parts plus owned point lights

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use super::transform::Transform;
use crate::gfx::picking::AABB;
use crate::gfx::resources::{rgb_from_hex, Geometry, Material};

/// One drawable primitive inside a [`Group`]
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
    /// Placement relative to the owning group
    pub local: Matrix4<f32>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Overrides the material's emissive color for this part only
    pub emissive: Option<[f32; 3]>,
    /// Role marker for parts that change with the lighting mode
    pub tag: Option<&'static str>,
}

impl MeshPart {
    pub fn new(geometry: Arc<Geometry>, material: Arc<Material>, local: Matrix4<f32>) -> Self {
        Self {
            geometry,
            material,
            local,
            cast_shadow: false,
            receive_shadow: false,
            emissive: None,
            tag: None,
        }
    }

    pub fn emissive_color(&self) -> [f32; 3] {
        self.emissive.unwrap_or(self.material.emissive)
    }
}

/// Point light carried by a group, positioned in group space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light has faded out
    pub range: f32,
    pub position: Vector3<f32>,
    pub visible: bool,
}

impl PointLight {
    pub fn new(color: u32, intensity: f32, range: f32, position: Vector3<f32>) -> Self {
        Self {
            color: rgb_from_hex(color),
            intensity,
            range,
            position,
            visible: true,
        }
    }
}

/// A node made of mesh parts and lights, drawn with one world matrix
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub parts: Vec<MeshPart>,
    pub lights: Vec<PointLight>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, part: MeshPart) -> usize {
        self.parts.push(part);
        self.parts.len() - 1
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.lights.is_empty()
    }

    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        for part in &mut self.parts {
            part.cast_shadow = cast;
            part.receive_shadow = receive;
        }
    }

    pub fn parts_tagged<'a>(&'a mut self, tag: &'a str) -> impl Iterator<Item = &'a mut MeshPart> + 'a {
        self.parts.iter_mut().filter(move |p| p.tag == Some(tag))
    }

    /// Bounds of every part in group space
    pub fn bounds(&self) -> Option<AABB> {
        self.parts
            .iter()
            .map(|part| part.geometry.bounds.transform(&part.local))
            .reduce(|a, b| a.union(&b))
    }

    /// Re-parents every part under `parent`, as if this group were nested in it
    pub fn transformed(&self, parent: &Transform) -> Vec<MeshPart> {
        let matrix = parent.matrix();
        self.parts
            .iter()
            .map(|part| MeshPart {
                local: matrix * part.local,
                ..part.clone()
            })
            .collect()
    }

    /// Drops every part and light
    ///
    /// # Returns
    /// Number of parts released
    pub fn release(&mut self) -> usize {
        let released = self.parts.len();
        self.parts.clear();
        self.lights.clear();
        released
    }
}

/// Light position in world space
pub fn light_world_position(world: &Matrix4<f32>, light: &PointLight) -> Vector3<f32> {
    let p = world * Vector4::new(light.position.x, light.position.y, light.position.z, 1.0);
    p.truncate()
}

/// Identity matrix shorthand for parts placed at the group origin
pub fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::Shape;
    use crate::gfx::resources::{AssetManager, MaterialDesc};

    fn part(assets: &mut AssetManager, at: Transform) -> MeshPart {
        MeshPart::new(
            assets.geometry(Shape::cuboid(1.0, 1.0, 1.0)),
            assets.material(&MaterialDesc::lambert(0x8B4513)),
            at.matrix(),
        )
    }

    #[test]
    fn test_bounds_cover_all_parts() {
        let mut assets = AssetManager::with_seed(0);
        let mut group = Group::new();
        group.add(part(&mut assets, Transform::at(0.0, 0.5, 0.0)));
        group.add(part(&mut assets, Transform::at(2.0, 0.5, 0.0)));

        let bounds = group.bounds().unwrap();
        assert_eq!(bounds.min, Vector3::new(-0.5, 0.0, -0.5));
        assert_eq!(bounds.max, Vector3::new(2.5, 1.0, 0.5));
        assert!(Group::new().bounds().is_none());
    }

    #[test]
    fn test_release_counts_parts_once() {
        let mut assets = AssetManager::with_seed(0);
        let mut group = Group::new();
        group.add(part(&mut assets, Transform::default()));
        group.add_light(PointLight::new(0xFFFF99, 0.8, 4.0, Vector3::new(0.0, 2.0, 0.0)));

        assert_eq!(group.release(), 1);
        assert_eq!(group.release(), 0);
        assert!(group.is_empty());
    }

    #[test]
    fn test_emissive_override() {
        let mut assets = AssetManager::with_seed(0);
        let mut p = part(&mut assets, Transform::default());
        assert_eq!(p.emissive_color(), [0.0; 3]);
        p.emissive = Some([0.2, 0.2, 0.0]);
        assert_eq!(p.emissive_color(), [0.2, 0.2, 0.0]);
    }

    #[test]
    fn test_light_follows_world_matrix() {
        let light = PointLight::new(0xFFFFFF, 1.0, 4.0, Vector3::new(0.0, 2.0, 0.0));
        let world = Transform::at(3.0, 0.0, 1.0).matrix();
        assert_eq!(light_world_position(&world, &light), Vector3::new(3.0, 2.0, 1.0));
    }
}
