use cgmath::Vector3;

use super::BuildContext;
use crate::gfx::geometry::Shape;
use crate::gfx::resources::MaterialDesc;
use crate::gfx::scene::object::PointLight;
use crate::gfx::scene::Transform;
use crate::items::item::GLASS_TAG;
use crate::items::kind::DecorationKind;

const METAL: u32 = 0x2F4F4F;
const GLASS: u32 = 0xFFFFFF;
const GLASS_OPACITY: f32 = 0.8;
const LAMP_LIGHT: u32 = 0xFFFF99;
const LAMP_HEIGHT: f32 = 2.0;
const STONE: u32 = 0x696969;
const MOSS: u32 = 0x228B22;
const PAVING: u32 = 0xD2B48C;
const EDGING: u32 = 0xA0522D;

pub(super) fn build(ctx: &mut BuildContext<'_>, kind: DecorationKind) {
    match kind {
        DecorationKind::Lamp => lamp(ctx),
        DecorationKind::Stone => stones(ctx),
        DecorationKind::Path => path(ctx),
    }
}

/// Pole, base, housing and glass globe with a point light that stays off
/// until night mode
fn lamp(ctx: &mut BuildContext<'_>) {
    let metal = MaterialDesc::lambert(METAL);

    ctx.part(BuildContext::cylinder(0.05, 0.05, 2.0), &metal, Transform::at(0.0, 1.0, 0.0));
    ctx.part(BuildContext::cylinder(0.15, 0.15, 0.1), &metal, Transform::at(0.0, 0.05, 0.0));
    ctx.part(Shape::sphere(0.25, 8, 6), &metal, Transform::at(0.0, LAMP_HEIGHT, 0.0));
    ctx.part(
        BuildContext::sphere(0.2),
        &MaterialDesc::lambert(GLASS).transparent(GLASS_OPACITY),
        Transform::at(0.0, LAMP_HEIGHT, 0.0),
    )
    .tag = Some(GLASS_TAG);

    let mut light = PointLight::new(LAMP_LIGHT, 0.8, 4.0, Vector3::new(0.0, LAMP_HEIGHT, 0.0));
    light.visible = false;
    ctx.group_mut().add_light(light);
}

/// Three to five flattened stones with one to three moss patches
fn stones(ctx: &mut BuildContext<'_>) {
    let stone = MaterialDesc::lambert(STONE);

    for _ in 0..ctx.count(3..=5) {
        let size = 0.15 + ctx.random() * 0.1;
        let at = Transform::at(ctx.jitter(0.6), size * 0.5, ctx.jitter(0.6))
            .with_scale(
                0.8 + ctx.random() * 0.4,
                0.4 + ctx.random() * 0.3,
                0.8 + ctx.random() * 0.4,
            )
            .with_rotation(ctx.jitter(0.3), 0.0, ctx.jitter(0.3));
        ctx.part(Shape::sphere(size, 6, 4), &stone, at);
    }

    let moss = MaterialDesc::lambert(MOSS);
    for _ in 0..ctx.count(1..=3) {
        let at = Transform::at(ctx.jitter(0.4), 0.05, ctx.jitter(0.4)).with_scale(1.0, 0.3, 1.0);
        ctx.part(BuildContext::sphere(0.03), &moss, at);
    }
}

/// Square paving slab with edging on every side and scattered joints
fn path(ctx: &mut BuildContext<'_>) {
    let edging = MaterialDesc::lambert(EDGING);

    ctx.part(
        Shape::cuboid(0.8, 0.05, 0.8),
        &MaterialDesc::lambert(PAVING),
        Transform::at(0.0, 0.025, 0.0),
    );

    for (x, z) in [(0.0, 0.4), (0.0, -0.4), (0.4, 0.0), (-0.4, 0.0)] {
        let along_x = z != 0.0;
        let shape = if along_x {
            Shape::cuboid(0.8, 0.02, 0.05)
        } else {
            Shape::cuboid(0.05, 0.02, 0.8)
        };
        ctx.part(shape, &edging, Transform::at(x, 0.03, z));
    }

    for _ in 0..6 {
        let at = Transform::at(ctx.jitter(0.6), 0.06, ctx.jitter(0.6));
        ctx.part(BuildContext::cylinder(0.02, 0.02, 0.06), &edging, at);
    }
}

#[cfg(test)]
mod tests {
    use super::super::build as build_kind;
    use crate::gfx::resources::AssetManager;
    use crate::items::item::GLASS_TAG;
    use crate::items::kind::{DecorationKind, ItemKind};

    #[test]
    fn test_lamp_has_hidden_light_and_tagged_glass() {
        let mut assets = AssetManager::with_seed(0);
        let lamp = build_kind(ItemKind::Decoration(DecorationKind::Lamp), &mut assets, 1);
        assert_eq!(lamp.parts.len(), 4);
        assert_eq!(lamp.lights.len(), 1);
        assert!(!lamp.lights[0].visible);
        assert_eq!(lamp.lights[0].range, 4.0);

        let glass: Vec<_> = lamp.parts.iter().filter(|p| p.tag == Some(GLASS_TAG)).collect();
        assert_eq!(glass.len(), 1);
        assert!(glass[0].material.transparent);
    }

    #[test]
    fn test_stone_counts_stay_in_range() {
        let mut assets = AssetManager::with_seed(0);
        for seed in 0..32 {
            let stones = build_kind(ItemKind::Decoration(DecorationKind::Stone), &mut assets, seed);
            // 3..=5 stones plus 1..=3 moss patches
            assert!((4..=8).contains(&stones.parts.len()), "seed {}", seed);
            assert!(stones.lights.is_empty());
        }
    }

    #[test]
    fn test_path_layout() {
        let mut assets = AssetManager::with_seed(0);
        let path = build_kind(ItemKind::Decoration(DecorationKind::Path), &mut assets, 1);
        assert_eq!(path.parts.len(), 1 + 4 + 6);
        let bounds = path.bounds().unwrap();
        assert!((bounds.size().x - 0.85).abs() < 1e-4);
    }
}
