use std::f32::consts::TAU;

use super::BuildContext;
use crate::gfx::geometry::Shape;
use crate::gfx::resources::MaterialDesc;
use crate::gfx::scene::Transform;
use crate::items::kind::FlowerKind;

const STEM: u32 = 0x228B22;
const LEAF: u32 = 0x32CD32;
const CENTER: u32 = 0xFFFF00;

fn petal_color(kind: FlowerKind) -> u32 {
    match kind {
        FlowerKind::Rose => 0xFF1493,
        FlowerKind::Tulip => 0xFF69B4,
        FlowerKind::Sunflower => 0xFFD700,
        FlowerKind::Lily => 0xFFFFFF,
    }
}

/// Stem with two leaves, a head with its centre and a ring of petals
///
/// Roses get eight petals, the rest six. Tulips grow in a clump: two smaller
/// copies of the flower are planted next to the first.
pub(super) fn build(ctx: &mut BuildContext<'_>, kind: FlowerKind) {
    let color = MaterialDesc::lambert(petal_color(kind));

    ctx.part(
        BuildContext::cylinder(0.02, 0.02, 0.5),
        &MaterialDesc::lambert(STEM),
        Transform::at(0.0, 0.25, 0.0),
    );
    for i in 0..2 {
        let side = if i == 0 { -0.1 } else { 0.1 };
        ctx.part(
            Shape::sphere(0.08, 8, 4),
            &MaterialDesc::lambert(LEAF),
            Transform::at(side, 0.15 + i as f32 * 0.1, 0.0).with_scale(2.0, 0.5, 0.5),
        );
    }

    ctx.part(BuildContext::sphere(0.15), &color, Transform::at(0.0, 0.5, 0.0));
    ctx.part(
        BuildContext::sphere(0.05),
        &MaterialDesc::lambert(CENTER),
        Transform::at(0.0, 0.52, 0.0),
    );

    let petals = if kind == FlowerKind::Rose { 8 } else { 6 };
    for i in 0..petals {
        let angle = i as f32 / petals as f32 * TAU;
        ctx.part(
            BuildContext::sphere(0.08),
            &color,
            Transform::at(angle.cos() * 0.15, 0.5, angle.sin() * 0.15).with_scale(0.7, 0.5, 1.2),
        );
    }

    if kind == FlowerKind::Tulip {
        let single = ctx.group_mut().clone();
        for _ in 0..2 {
            let offset = Transform::at(ctx.jitter(0.3), 0.0, ctx.jitter(0.3)).with_scale(0.8, 0.9, 0.8);
            let copies = single.transformed(&offset);
            ctx.group_mut().parts.extend(copies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::build as build_kind;
    use crate::gfx::resources::AssetManager;
    use crate::items::kind::{FlowerKind, ItemKind};

    #[test]
    fn test_petal_counts() {
        let mut assets = AssetManager::with_seed(0);
        let count = |kind, assets: &mut AssetManager| {
            build_kind(ItemKind::Flower(kind), assets, 5).parts.len()
        };
        // stem + 2 leaves + head + centre + petals
        assert_eq!(count(FlowerKind::Rose, &mut assets), 5 + 8);
        assert_eq!(count(FlowerKind::Lily, &mut assets), 5 + 6);
        assert_eq!(count(FlowerKind::Tulip, &mut assets), 3 * (5 + 6));
    }

    #[test]
    fn test_tulip_copies_are_smaller() {
        let mut assets = AssetManager::with_seed(0);
        let tulip = build_kind(ItemKind::Flower(FlowerKind::Tulip), &mut assets, 5);
        let single = build_kind(ItemKind::Flower(FlowerKind::Lily), &mut assets, 5);
        let top = |g: &crate::gfx::scene::Group| g.bounds().unwrap().max.y;
        assert!((top(&tulip) - top(&single)).abs() < 1e-4, "copies never outgrow the first");
    }
}
