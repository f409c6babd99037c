//! The placement surface: grass ground, border ring and the bounds check

use std::f32::consts::FRAC_PI_2;

use cgmath::Vector3;

use crate::config::GardenConfig;
use crate::gfx::geometry::Shape;
use crate::gfx::picking::GroundPlane;
use crate::gfx::rendering::RenderTarget;
use crate::gfx::resources::{AssetManager, MaterialDesc};
use crate::gfx::scene::object::{identity, Group, MeshPart};
use crate::gfx::scene::{ObjectId, Scene, Transform};

pub struct Garden {
    config: GardenConfig,
    objects: Vec<ObjectId>,
}

impl Garden {
    pub fn new(config: &GardenConfig) -> Self {
        Self {
            config: config.clone(),
            objects: Vec::new(),
        }
    }

    /// Square grass plane lying flat at `y = 0`
    pub fn ground_mesh(&self, assets: &mut AssetManager) -> (Group, Transform) {
        if assets.texture(AssetManager::GRASS).is_none() {
            assets.create_grass_texture(self.config.texture_repeat);
        }

        let mut part = MeshPart::new(
            assets.geometry(Shape::plane(self.config.size, self.config.size)),
            assets.material(
                &MaterialDesc::lambert(self.config.ground_color).with_map(AssetManager::GRASS),
            ),
            identity(),
        );
        part.receive_shadow = true;

        let mut group = Group::new();
        group.add(part);
        (group, Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0))
    }

    /// Wooden ring just outside the ground edge, lifted to avoid z-fighting
    pub fn border_mesh(&self, assets: &mut AssetManager) -> (Group, Transform) {
        let mut group = Group::new();
        group.add(MeshPart::new(
            assets.geometry(Shape::ring(
                self.config.border_inner_radius,
                self.config.border_outer_radius,
                self.config.border_segments,
            )),
            assets.material(&MaterialDesc::lambert(self.config.border_color)),
            identity(),
        ));
        let at = Transform::at(0.0, self.config.border_height, 0.0).with_rotation(-FRAC_PI_2, 0.0, 0.0);
        (group, at)
    }

    /// Adds the ground and border to `scene`
    pub fn attach<R: RenderTarget>(&mut self, scene: &mut Scene<R>, assets: &mut AssetManager) {
        self.detach(scene);

        let (ground, at) = self.ground_mesh(assets);
        self.objects.push(scene.add_object("ground", ground, at));
        let (border, at) = self.border_mesh(assets);
        self.objects.push(scene.add_object("border", border, at));
    }

    /// Removes and releases whatever [`attach`](Self::attach) added
    pub fn detach<R: RenderTarget>(&mut self, scene: &mut Scene<R>) {
        for id in self.objects.drain(..) {
            scene.remove_object(id);
        }
    }

    /// True on the closed square `[-boundary, boundary]` in X and Z
    pub fn is_within_bounds(&self, position: Vector3<f32>) -> bool {
        let b = self.config.boundary;
        (-b..=b).contains(&position.x) && (-b..=b).contains(&position.z)
    }

    /// Pick target covering the whole ground plane
    pub fn ground_plane(&self) -> GroundPlane {
        GroundPlane::new(self.config.size / 2.0)
    }

    pub fn size(&self) -> f32 {
        self.config.size
    }

    pub fn boundary(&self) -> f32 {
        self.config.boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LightingConfig, SceneConfig};
    use crate::gfx::rendering::HeadlessTarget;

    fn garden() -> Garden {
        Garden::new(&GardenConfig::default())
    }

    #[test]
    fn test_bounds_are_closed() {
        let garden = garden();
        assert!(garden.is_within_bounds(Vector3::new(9.0, 0.0, 9.0)));
        assert!(garden.is_within_bounds(Vector3::new(-9.0, 3.0, -9.0)));
        assert!(garden.is_within_bounds(Vector3::new(0.0, 0.0, 0.0)));
        assert!(!garden.is_within_bounds(Vector3::new(9.01, 0.0, 0.0)));
        assert!(!garden.is_within_bounds(Vector3::new(0.0, 0.0, -9.5)));
    }

    #[test]
    fn test_ground_lies_flat() {
        let mut assets = AssetManager::with_seed(0);
        let (ground, at) = garden().ground_mesh(&mut assets);
        let bounds = ground.bounds().unwrap().transform(&at.matrix());

        assert!(bounds.size().y.abs() < 1e-4);
        assert!((bounds.size().x - 20.0).abs() < 1e-4);
        assert!((bounds.size().z - 20.0).abs() < 1e-4);
        assert!(ground.parts[0].material.map.is_some());
    }

    #[test]
    fn test_attach_and_detach() {
        let mut assets = AssetManager::with_seed(0);
        let mut scene = Scene::new(
            &SceneConfig::default(),
            &LightingConfig::default(),
            HeadlessTarget::new(100, 100),
        );
        let mut garden = garden();

        garden.attach(&mut scene, &mut assets);
        garden.attach(&mut scene, &mut assets);
        assert_eq!(scene.object_count(), 2);

        garden.detach(&mut scene);
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_ground_plane_spans_garden() {
        let plane = garden().ground_plane();
        assert_eq!(plane.half_extent, 10.0);
        assert_eq!(plane.y, 0.0);
    }
}
