//! Memoized geometry, material and texture cache
//!
//! Items ask for primitives by [`Shape`] and looks by [`MaterialDesc`]; equal
//! requests return the same shared `Arc`. The cache itself holds one reference,
//! so anything with a strong count of one is unused and can be collected.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::material::{Material, MaterialDesc};
use super::texture::{GrassPattern, Texture};
use super::AssetId;
use crate::gfx::geometry::{GeometryData, Shape};
use crate::gfx::picking::AABB;

/// Generated mesh data with its cache identity
pub struct Geometry {
    pub id: AssetId,
    pub shape: Shape,
    pub data: GeometryData,
    pub bounds: AABB,
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("vertices", &self.data.vertex_count())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetStats {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

pub struct AssetManager {
    geometries: HashMap<Shape, Arc<Geometry>>,
    materials: HashMap<MaterialDesc, Arc<Material>>,
    textures: HashMap<String, Arc<Texture>>,
    next_id: AssetId,
    rng: StdRng,
}

impl AssetManager {
    pub const GRASS: &'static str = "grass";

    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic texture generation for tests and reproducible scenes
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            geometries: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            next_id: 1,
            rng,
        }
    }

    fn allocate_id(&mut self) -> AssetId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns the cached geometry for `shape`, generating it on first use
    pub fn geometry(&mut self, shape: Shape) -> Arc<Geometry> {
        if let Some(geometry) = self.geometries.get(&shape) {
            return geometry.clone();
        }

        let data = shape.generate();
        let geometry = Arc::new(Geometry {
            id: self.allocate_id(),
            shape,
            bounds: AABB::from_vertices(&data.vertices),
            data,
        });
        self.geometries.insert(shape, geometry.clone());
        geometry
    }

    /// Returns the cached material for `desc`, creating it on first use
    ///
    /// A map naming an unknown texture leaves the material untextured.
    pub fn material(&mut self, desc: &MaterialDesc) -> Arc<Material> {
        if let Some(material) = self.materials.get(desc) {
            return material.clone();
        }

        let map = desc.map.as_deref().and_then(|name| {
            let texture = self.textures.get(name).cloned();
            if texture.is_none() {
                log::warn!("Material requested unknown texture '{}'", name);
            }
            texture
        });
        let material = Arc::new(Material::from_desc(self.allocate_id(), desc, map));
        self.materials.insert(desc.clone(), material.clone());
        material
    }

    /// Paints and registers the grass texture under [`Self::GRASS`]
    pub fn create_grass_texture(&mut self, repeat: f32) -> Arc<Texture> {
        let pattern = GrassPattern::default();
        let pixels = pattern.paint(&mut self.rng);
        let texture = Arc::new(Texture {
            id: self.allocate_id(),
            name: Self::GRASS.to_string(),
            width: pattern.size,
            height: pattern.size,
            pixels,
            repeat,
        });
        self.textures
            .insert(Self::GRASS.to_string(), texture.clone());
        texture
    }

    pub fn texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    /// Generates the textures every scene needs up front
    pub fn preload(&mut self, grass_repeat: f32) {
        if !self.textures.contains_key(Self::GRASS) {
            self.create_grass_texture(grass_repeat);
        }
        log::debug!("Assets preloaded: {:?}", self.stats());
    }

    pub fn stats(&self) -> AssetStats {
        AssetStats {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        }
    }

    /// Evicts entries nobody outside the cache still references
    ///
    /// # Returns
    /// Number of evicted entries
    pub fn collect_garbage(&mut self) -> usize {
        let before = self.geometries.len() + self.materials.len() + self.textures.len();
        // materials first: they hold references to textures
        self.materials.retain(|_, m| Arc::strong_count(m) > 1);
        self.geometries.retain(|_, g| Arc::strong_count(g) > 1);
        self.textures.retain(|_, t| Arc::strong_count(t) > 1);
        let after = self.geometries.len() + self.materials.len() + self.textures.len();
        before - after
    }

    /// Drops every cached asset
    pub fn dispose(&mut self) {
        let stats = self.stats();
        self.geometries.clear();
        self.materials.clear();
        self.textures.clear();
        log::debug!("Asset manager disposed ({:?})", stats);
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_is_memoized() {
        let mut assets = AssetManager::with_seed(1);
        let a = assets.geometry(Shape::sphere(0.8, 8, 6));
        let b = assets.geometry(Shape::sphere(0.8, 8, 6));
        let c = assets.geometry(Shape::sphere(0.5, 8, 6));

        assert!(Arc::ptr_eq(&a, &b));
        assert_ne!(a.id, c.id);
        assert_eq!(assets.stats().geometries, 2);
    }

    #[test]
    fn test_material_resolves_texture_map() {
        let mut assets = AssetManager::with_seed(1);
        assets.preload(4.0);
        let ground = assets.material(&MaterialDesc::lambert(0x4A904A).with_map(AssetManager::GRASS));
        let texture = ground.map.as_ref().expect("grass map");
        assert_eq!(texture.repeat, 4.0);
        assert_eq!(texture.width, 100);

        let missing = assets.material(&MaterialDesc::lambert(0).with_map("gravel"));
        assert!(missing.map.is_none());
    }

    #[test]
    fn test_collect_garbage_keeps_referenced_assets() {
        let mut assets = AssetManager::with_seed(1);
        let kept = assets.geometry(Shape::cuboid(1.0, 1.0, 1.0));
        assets.geometry(Shape::cuboid(2.0, 1.0, 1.0));
        let material = assets.material(&MaterialDesc::lambert(0x8B4513));
        assets.material(&MaterialDesc::lambert(0x696969));

        assert_eq!(assets.collect_garbage(), 2);
        let stats = assets.stats();
        assert_eq!((stats.geometries, stats.materials), (1, 1));

        drop(kept);
        drop(material);
        assert_eq!(assets.collect_garbage(), 2);
        assert_eq!(assets.stats(), AssetStats::default());
    }

    #[test]
    fn test_dispose_empties_everything() {
        let mut assets = AssetManager::with_seed(1);
        assets.preload(4.0);
        assets.geometry(Shape::plane(20.0, 20.0));
        assets.dispose();
        assert_eq!(assets.stats(), AssetStats::default());
        assert!(assets.texture(AssetManager::GRASS).is_none());
    }
}
