//! Procedural mesh recipes, one module per item family
//!
//! A recipe is a pure function of the item kind and a seed: every random
//! offset is drawn from a [`StdRng`] seeded with it, so rebuilding an item
//! from its saved record yields the same mesh.

mod decoration;
mod flower;
mod furniture;
mod tree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::kind::ItemKind;
use crate::gfx::geometry::Shape;
use crate::gfx::resources::{AssetManager, MaterialDesc};
use crate::gfx::scene::object::{Group, MeshPart};
use crate::gfx::scene::Transform;

/// Segments for spheres built without explicit detail
pub(crate) const SPHERE_SEGMENTS: (u32, u32) = (16, 12);
/// Radial segments for cylinders built without explicit detail
pub(crate) const CYLINDER_SEGMENTS: u32 = 16;

/// Builds the mesh group for `kind`
pub fn build(kind: ItemKind, assets: &mut AssetManager, seed: u64) -> Group {
    let mut ctx = BuildContext::new(assets, seed);
    match kind {
        ItemKind::Tree(tree) => tree::build(&mut ctx, tree),
        ItemKind::Flower(flower) => flower::build(&mut ctx, flower),
        ItemKind::Furniture(furniture) => furniture::build(&mut ctx, furniture),
        ItemKind::Decoration(decoration) => decoration::build(&mut ctx, decoration),
    }
    let mut group = ctx.finish();
    group.set_shadows(true, true);
    group
}

/// Asset access, seeded randomness and the group under construction
pub(crate) struct BuildContext<'a> {
    assets: &'a mut AssetManager,
    rng: StdRng,
    group: Group,
}

impl<'a> BuildContext<'a> {
    fn new(assets: &'a mut AssetManager, seed: u64) -> Self {
        Self {
            assets,
            rng: StdRng::seed_from_u64(seed),
            group: Group::new(),
        }
    }

    /// Adds a part and returns it for further tweaks
    pub fn part(&mut self, shape: Shape, material: &MaterialDesc, at: Transform) -> &mut MeshPart {
        let geometry = self.assets.geometry(shape);
        let material = self.assets.material(material);
        let index = self.group.add(MeshPart::new(geometry, material, at.matrix()));
        &mut self.group.parts[index]
    }

    pub fn sphere(radius: f32) -> Shape {
        Shape::sphere(radius, SPHERE_SEGMENTS.0, SPHERE_SEGMENTS.1)
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32) -> Shape {
        Shape::cylinder(radius_top, radius_bottom, height, CYLINDER_SEGMENTS)
    }

    /// Uniform value in `0..1`
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform value in `-0.5..0.5`, scaled by `spread`
    pub fn jitter(&mut self, spread: f32) -> f32 {
        (self.random() - 0.5) * spread
    }

    pub fn count(&mut self, range: std::ops::RangeInclusive<usize>) -> usize {
        self.rng.random_range(range)
    }

    pub fn group_mut(&mut self) -> &mut Group {
        &mut self.group
    }

    fn finish(self) -> Group {
        self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_mesh() {
        let mut assets = AssetManager::with_seed(0);
        for kind in ItemKind::ALL {
            let a = build(kind, &mut assets, 7);
            let b = build(kind, &mut assets, 7);
            assert_eq!(a.parts.len(), b.parts.len(), "{}", kind);
            for (pa, pb) in a.parts.iter().zip(&b.parts) {
                assert_eq!(pa.local, pb.local, "{}", kind);
                assert_eq!(pa.geometry.id, pb.geometry.id);
            }
        }
    }

    #[test]
    fn test_every_part_casts_and_receives_shadows() {
        let mut assets = AssetManager::with_seed(0);
        for kind in ItemKind::ALL {
            let group = build(kind, &mut assets, 1);
            assert!(!group.parts.is_empty(), "{} has no parts", kind);
            assert!(group.parts.iter().all(|p| p.cast_shadow && p.receive_shadow));
        }
    }

    #[test]
    fn test_parts_share_cached_assets() {
        let mut assets = AssetManager::with_seed(0);
        build(ItemKind::ALL[0], &mut assets, 1);
        let after_first = assets.stats();
        build(ItemKind::ALL[0], &mut assets, 2);
        assert_eq!(assets.stats(), after_first);
    }
}
