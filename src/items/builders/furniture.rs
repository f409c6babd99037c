use std::f32::consts::{FRAC_PI_2, TAU};

use super::BuildContext;
use crate::gfx::geometry::Shape;
use crate::gfx::resources::MaterialDesc;
use crate::gfx::scene::Transform;
use crate::items::kind::FurnitureKind;

const WOOD: u32 = 0x8B4513;
const STONE: u32 = 0x708090;
const WATER: u32 = 0x4682B4;
const WATER_OPACITY: f32 = 0.7;

pub(super) fn build(ctx: &mut BuildContext<'_>, kind: FurnitureKind) {
    match kind {
        FurnitureKind::Bench => bench(ctx),
        FurnitureKind::Table => table(ctx),
        FurnitureKind::Fountain => fountain(ctx),
    }
}

fn bench(ctx: &mut BuildContext<'_>) {
    let wood = MaterialDesc::lambert(WOOD);

    ctx.part(Shape::cuboid(1.2, 0.1, 0.4), &wood, Transform::at(0.0, 0.4, 0.0));
    ctx.part(Shape::cuboid(1.2, 0.6, 0.1), &wood, Transform::at(0.0, 0.7, -0.15));

    for (x, z) in [(-0.5, -0.15), (0.5, -0.15), (-0.5, 0.15), (0.5, 0.15)] {
        ctx.part(
            BuildContext::cylinder(0.03, 0.03, 0.4),
            &wood,
            Transform::at(x, 0.2, z),
        );
    }

    // backrest slats
    for i in 0..5 {
        ctx.part(
            Shape::cuboid(1.1, 0.08, 0.03),
            &wood,
            Transform::at(0.0, 0.4 + i as f32 * 0.08, -0.12),
        );
    }
}

fn table(ctx: &mut BuildContext<'_>) {
    let wood = MaterialDesc::lambert(WOOD);

    ctx.part(BuildContext::cylinder(0.6, 0.6, 0.05), &wood, Transform::at(0.0, 0.7, 0.0));
    ctx.part(BuildContext::cylinder(0.03, 0.03, 0.7), &wood, Transform::at(0.0, 0.35, 0.0));
    ctx.part(
        Shape::ring(0.25, 0.3, 16),
        &wood,
        Transform::at(0.0, 0.2, 0.0).with_rotation(FRAC_PI_2, 0.0, 0.0),
    );
}

/// Stone basin with a translucent pool, a centre pole and droplets around it
fn fountain(ctx: &mut BuildContext<'_>) {
    let stone = MaterialDesc::lambert(STONE);
    let water = MaterialDesc::lambert(WATER).transparent(WATER_OPACITY);

    ctx.part(BuildContext::cylinder(0.8, 0.8, 0.2), &stone, Transform::at(0.0, 0.1, 0.0));
    ctx.part(BuildContext::cylinder(0.75, 0.75, 0.05), &water, Transform::at(0.0, 0.22, 0.0));
    ctx.part(BuildContext::cylinder(0.1, 0.1, 0.8), &stone, Transform::at(0.0, 0.5, 0.0));
    ctx.part(BuildContext::sphere(0.15), &water, Transform::at(0.0, 0.9, 0.0));

    for i in 0..8 {
        let angle = i as f32 / 8.0 * TAU;
        let y = 0.4 + ctx.random() * 0.3;
        ctx.part(
            BuildContext::sphere(0.02),
            &water,
            Transform::at(angle.cos() * 0.3, y, angle.sin() * 0.3),
        );
    }
}
